mod report;

pub use report::{CatGender, CreateReport, Report, ReportStatus};
