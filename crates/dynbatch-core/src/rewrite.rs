use anyhow::{bail, Context, Result};
use dynbatch_proto::onnx::tensor_shape_proto::dimension::Value as DimValue;
use dynbatch_proto::onnx::tensor_shape_proto::Dimension;
use dynbatch_proto::onnx::{type_proto, ModelProto, ValueInfoProto};
use tracing::debug;

use crate::spec::Dim;

/// Symbolic size written into rewritten batch dimensions.
pub const DYNAMIC_BATCH_PARAM: &str = "?";

/// Prior state of one rewritten leading dimension.
#[derive(Clone, Debug)]
pub struct DimChange {
    pub tensor: String,
    pub before: Dim,
}

impl DimChange {
    pub fn was_dynamic(&self) -> bool {
        self.before.is_dynamic()
    }
}

#[derive(Clone, Debug)]
pub struct RewriteReport {
    pub input: DimChange,
    pub output: DimChange,
}

/// Forces the leading dimension of the first graph input and the first
/// graph output to the symbolic size [`DYNAMIC_BATCH_PARAM`].
///
/// The assignment is unconditional, so re-running it on an already
/// rewritten model changes nothing. Everything else in the model is left
/// untouched.
pub fn mark_batch_dynamic(model: &mut ModelProto) -> Result<RewriteReport> {
    let graph = model.graph.as_mut().context("model has no graph")?;

    let input = graph
        .input
        .first_mut()
        .context("model declares no inputs")?;
    let input_change = force_symbolic_batch(input)?;

    let output = graph
        .output
        .first_mut()
        .context("model declares no outputs")?;
    let output_change = force_symbolic_batch(output)?;

    Ok(RewriteReport {
        input: input_change,
        output: output_change,
    })
}

fn force_symbolic_batch(io: &mut ValueInfoProto) -> Result<DimChange> {
    let tensor = io.name.clone();
    let dim = batch_dim_mut(io).with_context(|| format!("cannot rewrite tensor {tensor:?}"))?;

    let before = Dim::from_proto(dim);
    dim.value = Some(DimValue::DimParam(DYNAMIC_BATCH_PARAM.to_string()));
    debug!(tensor = %tensor, before = %before, "leading dimension marked dynamic");

    Ok(DimChange { tensor, before })
}

fn batch_dim_mut(io: &mut ValueInfoProto) -> Result<&mut Dimension> {
    let ty = io.r#type.as_mut().context("missing type")?;

    let Some(type_proto::Value::TensorType(tensor)) = ty.value.as_mut() else {
        bail!("unsupported non-tensor IO value type");
    };

    let shape = tensor.shape.as_mut().context("missing tensor shape")?;
    shape
        .dim
        .first_mut()
        .context("tensor shape has no dimensions")
}
