pub mod data_service;
pub mod http_handlers;
pub mod report_aggregators;

pub use http_handlers::{ReportQuery, configure};
