//! Visitor analytics engine
//!
//! Ingestion-side building blocks (user agent classification, daily-salted
//! visitor hashing, request header extraction) together with the reporting
//! side (time range resolution and dashboard composition).

pub mod range;
pub mod reports;
pub mod request_info;
pub mod ua;
pub mod visitor;

// Re-export commonly used types
pub use range::TimeRange;
pub use reports::{GlobalDashboard, ProfileDashboard};
pub use visitor::hash_visitor;
