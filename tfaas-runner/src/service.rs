//! Classification pipeline: resolve model, preprocess, run, rank.

use std::sync::Arc;
use std::time::Duration;

use tfaas_common::{ClassifyResult, LabelResult, Row};

use crate::error::{Error, Result};
use crate::graph::{self, GraphRunner, ImageFormat};
use crate::model::{LoadedModel, ModelRegistry};
use crate::ranking;

/// An uploaded image to classify.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub model: Option<String>,
    pub top_n: Option<usize>,
}

/// Classifies feature rows and images against registered models.
pub struct Classifier {
    registry: Arc<ModelRegistry>,
    runner: GraphRunner,
    default_model: Option<String>,
    timeout: Duration,
}

impl Classifier {
    pub fn new(
        registry: Arc<ModelRegistry>,
        default_model: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            registry,
            runner: GraphRunner::new(),
            default_model,
            timeout,
        }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Classify a row of feature values.
    pub async fn classify_row(&self, row: Row) -> Result<ClassifyResult> {
        if row.values.is_empty() {
            return Err(Error::InvalidRequest("values must not be empty".to_string()));
        }

        let name = self.model_name(row.model_name())?;
        let model = self.registry.resolve(&name).await?;
        tracing::debug!(model = %name, row = %row, "Classifying row");

        let runner = self.runner;
        let values = row.values;
        let probs = self
            .blocking(Arc::clone(&model), move |model| runner.predict(model, &values))
            .await?;

        Ok(ClassifyResult {
            filename: name,
            labels: select(&model, &probs, row.top_n)?,
        })
    }

    /// Classify an encoded image.
    pub async fn classify_image(&self, upload: ImageUpload) -> Result<ClassifyResult> {
        let name = self.model_name(upload.model.as_deref())?;
        let model = self.registry.resolve(&name).await?;
        tracing::debug!(
            model = %name,
            filename = %upload.filename,
            format = %upload.format,
            bytes = upload.bytes.len(),
            "Classifying image"
        );

        let runner = self.runner;
        let (bytes, format) = (upload.bytes, upload.format);
        let probs = self
            .blocking(Arc::clone(&model), move |model| {
                let input = graph::transform(&bytes, format)?;
                let descriptor = model.descriptor();
                let output = runner.run(
                    model,
                    &descriptor.input_node,
                    input,
                    &descriptor.output_node,
                )?;
                graph::first_row(&output)
            })
            .await?;

        Ok(ClassifyResult {
            filename: upload.filename,
            labels: select(&model, &probs, upload.top_n)?,
        })
    }

    fn model_name(&self, requested: Option<&str>) -> Result<String> {
        match requested.filter(|name| !name.trim().is_empty()) {
            Some(name) => Ok(name.trim().to_string()),
            None => self.default_model.clone().ok_or_else(|| {
                Error::InvalidRequest("no model given and no default model configured".to_string())
            }),
        }
    }

    /// Run graph work on the blocking pool under the request deadline.
    async fn blocking<T, F>(&self, model: Arc<LoadedModel>, work: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&LoadedModel) -> Result<T> + Send + 'static,
    {
        let task = tokio::task::spawn_blocking(move || work(&model));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(joined) => {
                joined.map_err(|e| Error::Internal(format!("inference task failed: {}", e)))?
            }
            Err(_) => Err(Error::Timeout(self.timeout.as_secs())),
        }
    }
}

fn select(model: &LoadedModel, probs: &[f32], top_n: Option<usize>) -> Result<Vec<LabelResult>> {
    match top_n {
        Some(n) => ranking::rank(model.labels(), probs, n),
        None => Ok(ranking::rank_all(model.labels(), probs)),
    }
}
