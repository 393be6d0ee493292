//! Execution of loaded model graphs.

use tract_tensorflow::prelude::*;

use crate::error::{Error, Result};
use crate::model::LoadedModel;

/// Runs inference against loaded models.
///
/// Every call compiles its own plan from the shared graph and drops it
/// before returning, so concurrent requests never share execution state.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphRunner;

impl GraphRunner {
    pub fn new() -> Self {
        Self
    }

    /// Bind `input` to `input_node`, run the graph and return the tensor
    /// produced at `output_node`.
    pub fn run(
        &self,
        model: &LoadedModel,
        input_node: &str,
        input: Tensor,
        output_node: &str,
    ) -> Result<Tensor> {
        let shape: TVec<usize> = input.shape().iter().copied().collect();
        let fact = InferenceFact::dt_shape(input.datum_type(), shape);

        let session = model
            .graph()
            .clone()
            .with_input_names([input_node])?
            .with_output_names([output_node])?
            .with_input_fact(0, fact)?
            .into_optimized()?
            .into_runnable()?;

        let mut outputs = session.run(tvec!(input.into()))?;
        let output = outputs
            .pop()
            .ok_or_else(|| Error::Execution(format!("node {} produced no output", output_node)))?;
        Ok(output.into_tensor())
    }

    /// Run a feature row through `model` and return its probability vector.
    ///
    /// The values become a single 1xK row. Their count is not checked
    /// against the graph; a mismatch fails inside the engine.
    pub fn predict(&self, model: &LoadedModel, values: &[f32]) -> Result<Vec<f32>> {
        let input = Tensor::from_shape(&[1, values.len()], values)?;
        let descriptor = model.descriptor();
        let output = self.run(model, &descriptor.input_node, input, &descriptor.output_node)?;
        first_row(&output)
    }
}

/// First row of a batched output, or the whole vector for rank-1 outputs.
pub fn first_row(output: &Tensor) -> Result<Vec<f32>> {
    let output = output.cast_to::<f32>()?;
    let values = output.as_slice::<f32>()?;

    match output.shape() {
        [] => Err(Error::Execution("graph produced a scalar output".to_string())),
        [_] => Ok(values.to_vec()),
        [0, ..] => Err(Error::Execution("graph produced an empty batch".to_string())),
        [batch, ..] => {
            let row = values.len() / batch;
            Ok(values[..row].to_vec())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FsModelStore;
    use crate::test_util;

    fn fixture(labels: &[&str]) -> (tempfile::TempDir, LoadedModel) {
        let tmp = tempfile::tempdir().unwrap();
        test_util::write_model(tmp.path(), "animals", labels);
        let store = FsModelStore::new(tmp.path());
        let model = LoadedModel::load(&store, "animals").unwrap();
        (tmp, model)
    }

    #[test]
    fn test_first_row() {
        let t = Tensor::from_shape(&[2, 3], &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(first_row(&t).unwrap(), vec![1.0, 2.0, 3.0]);

        let t = Tensor::from_shape(&[2], &[0.25f32, 0.75]).unwrap();
        assert_eq!(first_row(&t).unwrap(), vec![0.25, 0.75]);

        let t = Tensor::from_shape(&[0, 3], &[] as &[f32]).unwrap();
        assert!(matches!(first_row(&t), Err(Error::Execution(_))));
    }

    #[test]
    fn test_predict_width_matches_labels() {
        let (_tmp, model) = fixture(&["cat", "dog", "fish"]);
        let probs = GraphRunner::new().predict(&model, &[0.2, 0.7, 0.1]).unwrap();
        assert_eq!(probs.len(), model.labels().len());
        assert_eq!(probs, vec![0.2, 0.7, 0.1]);
    }

    #[test]
    fn test_predict_applies_graph() {
        let (_tmp, model) = fixture(&["a", "b"]);
        let probs = GraphRunner::new().predict(&model, &[-1.0, 0.5]).unwrap();
        assert_eq!(probs, vec![0.0, 0.5]);
    }

    #[test]
    fn test_missing_node_is_execution_error() {
        let (_tmp, model) = fixture(&["a"]);
        let input = Tensor::from_shape(&[1, 1], &[1.0f32]).unwrap();
        let err = GraphRunner::new()
            .run(&model, "no_such_node", input, test_util::OUTPUT_NODE)
            .unwrap_err();
        assert!(matches!(err, Error::Execution(_)));
    }

    #[test]
    fn test_model_usable_after_failed_run() {
        let (_tmp, model) = fixture(&["a", "b"]);
        let runner = GraphRunner::new();
        let input = Tensor::from_shape(&[1, 2], &[1.0f32, 2.0]).unwrap();
        assert!(runner.run(&model, test_util::INPUT_NODE, input, "missing").is_err());
        assert_eq!(runner.predict(&model, &[1.0, 2.0]).unwrap(), vec![1.0, 2.0]);
    }
}
