//! Experiment platform domain module
//!
//! The seller platform is an external collaborator reached through a
//! connector that opens one authenticated session at a time.

mod session;
mod types;

pub use session::{with_session, ExperimentPlatform, PlatformConnector};
pub use types::{CreateExperimentParams, ExperimentMetadata, ExperimentSummary};

#[cfg(test)]
pub use session::mock;
