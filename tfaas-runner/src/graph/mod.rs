//! Graph execution: model inference and image preprocessing.

pub mod preprocess;
mod runner;

pub use preprocess::{build_graph, transform, ImageFormat, TransformGraph};
pub use runner::{first_row, GraphRunner};
