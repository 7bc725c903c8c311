pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use handlers::ReportState;
pub use services::{ImageService, ReportService};
