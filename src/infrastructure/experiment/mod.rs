//! Infrastructure layer for listing experiments
//!
//! Storage-backed repositories for experiment records and reports.

mod storage_record_repository;
mod storage_report_repository;

pub use storage_record_repository::StorageExperimentRecordRepository;
pub use storage_report_repository::StorageExperimentReportRepository;
