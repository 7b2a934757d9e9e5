//! Presentational views over backend analysis payloads. No computation
//! beyond formatting, sorting and per-category statistics.

pub mod chart;
pub mod format;
pub mod links;

pub use chart::{ChartTab, ChartView};
pub use links::{ConfidenceLevel, LinkBoard, LinkFilter, LinkSort, RelationshipSummary};
