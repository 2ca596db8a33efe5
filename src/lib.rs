pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod manifest;
pub mod publisher;
pub mod storage;

pub use discovery::build_manifest;
pub use error::PublisherError;
pub use manifest::Manifest;
pub use publisher::{PublishReport, publish_manifest, run_pipeline, verify_publish};
