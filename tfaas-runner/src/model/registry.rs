//! Registry of loaded models.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::RwLock;

use super::{LoadedModel, ModelStore};
use crate::error::{Error, Result};

/// Outcome of one load, cloned out to every caller that waited on it.
type LoadOutcome = std::result::Result<Arc<LoadedModel>, Arc<Error>>;
type PendingLoad = Shared<BoxFuture<'static, LoadOutcome>>;

enum Slot {
    Loading(PendingLoad),
    Ready(Arc<LoadedModel>),
}

/// Cache of loaded models keyed by model name.
///
/// The map lock is only held to look up or swap a slot, never while a model
/// loads, so loads of different names run independently. Callers resolving
/// the same uncached name await one shared load and all get its result,
/// success or failure.
pub struct ModelRegistry {
    store: Arc<dyn ModelStore>,
    models: RwLock<HashMap<String, Slot>>,
}

impl ModelRegistry {
    pub fn new(store: Arc<dyn ModelStore>) -> Self {
        Self {
            store,
            models: RwLock::new(HashMap::new()),
        }
    }

    /// Get a model, loading it on first use.
    ///
    /// A failed load is reported to every caller that joined it and then
    /// forgotten, so a later call retries.
    pub async fn resolve(&self, name: &str) -> Result<Arc<LoadedModel>> {
        let pending = match self.pending(name).await {
            Slot::Ready(model) => return Ok(model),
            Slot::Loading(pending) => pending,
        };

        let outcome = pending.clone().await;
        self.settle(name, &pending, &outcome).await;
        outcome.map_err(|source| Error::load(name, source))
    }

    /// Load every model in the store.
    ///
    /// Stops at the first failure: a partially loaded model area is not served.
    pub async fn discover(&self) -> Result<usize> {
        let store = Arc::clone(&self.store);
        let names = tokio::task::spawn_blocking(move || store.list_models())
            .await
            .map_err(|e| Error::Internal(format!("model discovery task failed: {}", e)))??;

        tracing::info!(count = names.len(), "Discovered models");
        for name in &names {
            self.resolve(name).await?;
        }
        Ok(names.len())
    }

    /// Whether `name` is loaded.
    pub async fn contains(&self, name: &str) -> bool {
        let models = self.models.read().await;
        matches!(models.get(name), Some(Slot::Ready(_)))
    }

    /// All loaded models, sorted by name.
    pub async fn cached(&self) -> Vec<Arc<LoadedModel>> {
        let models = self.models.read().await;
        let mut loaded: Vec<Arc<LoadedModel>> = models
            .values()
            .filter_map(|slot| match slot {
                Slot::Ready(model) => Some(Arc::clone(model)),
                Slot::Loading(_) => None,
            })
            .collect();
        loaded.sort_by(|a, b| a.name().cmp(b.name()));
        loaded
    }

    /// Number of loaded models.
    pub async fn len(&self) -> usize {
        let models = self.models.read().await;
        models
            .values()
            .filter(|slot| matches!(slot, Slot::Ready(_)))
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// The cached model, or the load to wait on (started here if none runs).
    async fn pending(&self, name: &str) -> Slot {
        {
            let models = self.models.read().await;
            match models.get(name) {
                Some(Slot::Ready(model)) => return Slot::Ready(Arc::clone(model)),
                Some(Slot::Loading(pending)) => return Slot::Loading(pending.clone()),
                None => {}
            }
        }

        let mut models = self.models.write().await;
        let slot = models
            .entry(name.to_string())
            .or_insert_with(|| Slot::Loading(self.start_load(name)));
        match slot {
            Slot::Ready(model) => Slot::Ready(Arc::clone(model)),
            Slot::Loading(pending) => Slot::Loading(pending.clone()),
        }
    }

    fn start_load(&self, name: &str) -> PendingLoad {
        let store = Arc::clone(&self.store);
        let name = name.to_string();
        async move { load(store, name).await.map_err(Arc::new) }
            .boxed()
            .shared()
    }

    /// Publish the outcome of `pending` if its slot has not been settled yet.
    async fn settle(&self, name: &str, pending: &PendingLoad, outcome: &LoadOutcome) {
        let mut models = self.models.write().await;
        let current = match models.get(name) {
            Some(Slot::Loading(current)) => current,
            _ => return,
        };
        if !current.ptr_eq(pending) {
            return;
        }

        match outcome {
            Ok(model) => {
                models.insert(name.to_string(), Slot::Ready(Arc::clone(model)));
            }
            Err(_) => {
                models.remove(name);
            }
        }
    }
}

async fn load(store: Arc<dyn ModelStore>, name: String) -> Result<Arc<LoadedModel>> {
    let start = Instant::now();
    let key = name.clone();

    let model = tokio::task::spawn_blocking(move || LoadedModel::load(store.as_ref(), &key))
        .await
        .map_err(|e| Error::Internal(format!("model loader task failed: {}", e)))?
        .map_err(|e| {
            tracing::warn!(model = %name, error = %e, "Failed to load model");
            e
        })?;

    tracing::debug!(
        model = %name,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Model cached"
    );
    Ok(Arc::new(model))
}
