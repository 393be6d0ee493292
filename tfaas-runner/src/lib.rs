//! TFaaS Runner - serves predictions from frozen TensorFlow graphs.
//!
//! Models live in a model area (`<dir>/<model>/params.json` plus graph and
//! labels files), are loaded at most once into a [`ModelRegistry`] and
//! executed per request by the [`Classifier`].

pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod model;
pub mod ranking;
pub mod service;
pub mod state;
pub mod test_util;

pub use config::Config;
pub use error::{Error, Result};
pub use graph::{GraphRunner, ImageFormat};
pub use model::{FsModelStore, LoadedModel, ModelRegistry, ModelStore};
pub use service::{Classifier, ImageUpload};
pub use state::AppState;
