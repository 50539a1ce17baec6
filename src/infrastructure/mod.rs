//! Infrastructure layer - storage, platform and content adapters plus the
//! services that tie them to the domain

pub mod content;
pub mod experiment;
pub mod logging;
pub mod platform;
pub mod services;
pub mod storage;
