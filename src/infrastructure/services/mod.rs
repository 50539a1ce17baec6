//! Infrastructure services

mod experiment_lifecycle;
mod quality_service;

pub use experiment_lifecycle::{
    ExperimentDefaults, ExperimentLifecycle, RunExperimentRequest, DEFAULT_DURATION_DAYS,
    DEFAULT_TRAFFIC_SPLIT,
};
pub use quality_service::QualityService;
