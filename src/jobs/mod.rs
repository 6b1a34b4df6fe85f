//! Job list input/output and row parsing

pub mod dataset;
pub mod record;

pub use dataset::{DatasetWriter, JobDataset, JobRow};
pub use record::{JobRecord, JobType, TableFormat, TableRef};
