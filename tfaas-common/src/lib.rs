//! TFaaS Common Types
//!
//! Shared types used by the runner and its clients.

pub mod model;
pub mod predict;

pub use model::ModelDescriptor;
pub use predict::{ClassifyResult, LabelResult, Row};
