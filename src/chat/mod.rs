//! Chat transcript and query dispatch.

pub mod backend;
pub mod message;
pub mod session;

pub use backend::QueryBackend;
pub use message::{Message, MessageAttachment, Role};
pub use session::{ChatSession, SubmitOutcome, QUERY_ERROR_MESSAGE};
