use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use dynbatch_proto::onnx::ModelProto;
use prost::Message;
use tempfile::NamedTempFile;
use tracing::debug;

/// Reads and decodes an ONNX model file.
pub fn load_model(path: &Path) -> Result<ModelProto> {
    let raw = fs::read(path)
        .with_context(|| format!("failed to read model file {}", path.display()))?;

    let model = ModelProto::decode(Bytes::from(raw))
        .with_context(|| format!("failed to decode ONNX model {}", path.display()))?;

    debug!(path = %path.display(), "model loaded");
    Ok(model)
}

/// Encodes the model and replaces `path` with it.
///
/// The bytes go to a temporary file in the target's directory first; the
/// original file is only replaced once the write has fully succeeded.
pub fn save_model(path: &Path, model: &ModelProto) -> Result<()> {
    let mut buf = Vec::with_capacity(model.encoded_len());
    model
        .encode(&mut buf)
        .context("failed to encode ONNX model")?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file in {}", dir.display()))?;
    tmp.write_all(&buf)
        .context("failed to write encoded model")?;
    tmp.persist(path)
        .with_context(|| format!("failed to replace model file {}", path.display()))?;

    debug!(path = %path.display(), bytes = buf.len(), "model saved");
    Ok(())
}
