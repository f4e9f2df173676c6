use anyhow::{bail, Context, Result};
use dynbatch_proto::onnx::tensor_shape_proto::dimension::Value as DimValue;
use dynbatch_proto::onnx::{tensor_proto, tensor_shape_proto, type_proto, ModelProto, ValueInfoProto};
use smallvec::SmallVec;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IOName(pub String);

/// One axis of a declared tensor shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dim {
    Fixed(i64),
    Symbolic(String),
    Unknown,
}

impl Dim {
    pub fn from_proto(dim: &tensor_shape_proto::Dimension) -> Self {
        match &dim.value {
            Some(DimValue::DimValue(n)) => Dim::Fixed(*n),
            Some(DimValue::DimParam(p)) => Dim::Symbolic(p.clone()),
            None => Dim::Unknown,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Dim::Fixed(_))
    }
}

impl std::fmt::Display for Dim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dim::Fixed(n) => write!(f, "{n}"),
            Dim::Symbolic(p) => write!(f, "{p}"),
            Dim::Unknown => write!(f, "?"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TensorSpec {
    pub name: IOName,
    pub elem_type: i32,
    pub dims: SmallVec<[Dim; 6]>,
}

impl TensorSpec {
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn dtype_name(&self) -> String {
        match tensor_proto::DataType::try_from(self.elem_type) {
            Ok(dtype) => dtype.as_str_name().to_string(),
            Err(_) => format!("UNKNOWN({})", self.elem_type),
        }
    }

    pub fn shape_string(&self) -> String {
        let dims: Vec<String> = self.dims.iter().map(|d| d.to_string()).collect();
        format!("[{}]", dims.join(", "))
    }
}

#[derive(Clone, Debug)]
pub struct ModelSpec {
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}

impl ModelSpec {
    /// Summarizes the declared IO of a model graph.
    pub fn from_model(model: &ModelProto) -> Result<ModelSpec> {
        let graph = model.graph.as_ref().context("model has no graph")?;

        let inputs = graph
            .input
            .iter()
            .map(tensor_spec_from_value_info)
            .collect::<Result<Vec<_>>>()?;

        let outputs = graph
            .output
            .iter()
            .map(tensor_spec_from_value_info)
            .collect::<Result<Vec<_>>>()?;

        Ok(ModelSpec { inputs, outputs })
    }
}

fn tensor_spec_from_value_info(io: &ValueInfoProto) -> Result<TensorSpec> {
    let ty = io
        .r#type
        .as_ref()
        .with_context(|| format!("IO tensor {:?} has no declared type", io.name))?;

    let Some(type_proto::Value::TensorType(tensor)) = ty.value.as_ref() else {
        bail!("unsupported non-tensor IO value type");
    };

    let dims = match tensor.shape.as_ref() {
        Some(shape) => shape.dim.iter().map(Dim::from_proto).collect(),
        None => SmallVec::new(),
    };

    Ok(TensorSpec {
        name: IOName(io.name.clone()),
        elem_type: tensor.elem_type,
        dims,
    })
}
