//! Image preprocessing: encoded PNG/JPEG bytes to a batched float tensor.

use std::path::Path;
use std::str::FromStr;

use tract_core::ops::cast::cast;
use tract_core::ops::change_axes::AxisOp;
use tract_tensorflow::prelude::*;

use crate::error::{Error, Result};

/// Channels produced by the decoders (RGB).
pub const CHANNELS: usize = 3;

/// Supported image codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Format implied by a file name's extension.
    pub fn from_filename(filename: &str) -> Result<Self> {
        Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| Error::UnsupportedFormat(filename.to_string()))?
            .parse()
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        }
    }
}

impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "jpeg" | "jpg" => Ok(ImageFormat::Jpeg),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageFormat::Png => write!(f, "png"),
            ImageFormat::Jpeg => write!(f, "jpeg"),
        }
    }
}

/// The auxiliary graph turning decoded pixels into model input.
pub struct TransformGraph {
    pub graph: TypedModel,
    pub input: OutletId,
    pub output: OutletId,
}

/// Build `expand_dims(cast<f32>(image), 0)` for an HxWx3 `u8` image.
///
/// tract has no image codec ops, so the graph starts from decoded pixels:
/// [`transform`] decodes with the declared format first, and the graph is
/// keyed on the image shape instead of the format.
pub fn build_graph(height: usize, width: usize) -> Result<TransformGraph> {
    let mut graph = TypedModel::default();
    let input = graph.add_source("image", u8::fact([height, width, CHANNELS]))?;
    let decoded = graph.wire_node("cast", cast(f32::datum_type()), &[input])?;
    let batched = graph.wire_node("make_batch", AxisOp::Add(0), &decoded)?;
    graph.set_output_outlets(&batched)?;

    Ok(TransformGraph {
        graph,
        input,
        output: batched[0],
    })
}

/// Decode `buffer` as `format` and return it as a `[1, H, W, 3]` float tensor.
///
/// The buffer is always decoded with the declared codec.
pub fn transform(buffer: &[u8], format: ImageFormat) -> Result<Tensor> {
    let pixels = image::load_from_memory_with_format(buffer, format.codec())
        .map_err(|e| Error::Decode(format!("{} image: {}", format, e)))?
        .to_rgb8();

    let (height, width) = (pixels.height() as usize, pixels.width() as usize);
    let input = Tensor::from_shape(&[height, width, CHANNELS], pixels.as_raw())?;

    let transform = build_graph(height, width)?;
    let session = transform.graph.into_runnable()?;
    let mut outputs = session.run(tvec!(input.into()))?;
    let output = outputs
        .pop()
        .ok_or_else(|| Error::Execution("image transform produced no output".to_string()))?;

    tracing::debug!(format = %format, height, width, "Decoded image");
    Ok(output.into_tensor())
}
