mod image_service;
pub mod report_filter;
mod report_service;

pub use image_service::{DeletionSummary, ImageService};
pub use report_service::{ensure_owner, ReportAction, ReportService};
