//! Multi-modal upload: classify dropped files and drive sequential uploads.

pub mod classify;
pub mod handler;
pub mod panel;
pub mod source;

pub use classify::{classify, FileCategory};
pub use handler::UploadHandler;
pub use panel::{UploadPanel, UploadResult, UploadStatus, GENERIC_UPLOAD_ERROR};
pub use source::UploadFile;
