//! CLI command handlers

pub mod commands;
pub mod job;

pub use commands::{export, import, sheets};
pub use job::{load_job, ExportJob, JobMerge, JobSheet};
