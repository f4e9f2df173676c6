use std::fs;

use anyhow::Result;
use dynbatch_core::{load_model, mark_batch_dynamic, save_model, Dim, ModelSpec};
use dynbatch_proto::onnx::tensor_shape_proto::dimension::Value as DimValue;
use dynbatch_proto::onnx::tensor_shape_proto::Dimension;
use dynbatch_proto::onnx::{
    type_proto, GraphProto, ModelProto, TensorProto, TensorShapeProto, TypeProto, ValueInfoProto,
};

#[test]
fn save_then_load_roundtrip() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("best.onnx");

    let model = detector_model();
    save_model(&path, &model)?;
    let reloaded = load_model(&path)?;

    assert_eq!(reloaded, model);
    Ok(())
}

#[test]
fn rewrite_in_place_on_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("best.onnx");
    save_model(&path, &detector_model())?;

    let mut model = load_model(&path)?;
    mark_batch_dynamic(&mut model)?;
    save_model(&path, &model)?;

    let reloaded = load_model(&path)?;
    let spec = ModelSpec::from_model(&reloaded)?;
    assert_eq!(spec.inputs[0].dims[0], Dim::Symbolic("?".to_string()));
    assert_eq!(spec.outputs[0].dims[0], Dim::Symbolic("?".to_string()));
    assert_eq!(
        &spec.inputs[0].dims[1..],
        &[Dim::Fixed(3), Dim::Fixed(640), Dim::Fixed(640)]
    );
    assert_eq!(&spec.outputs[0].dims[1..], &[Dim::Fixed(25200), Dim::Fixed(85)]);

    // Weights survive untouched.
    let graph = reloaded.graph.as_ref().unwrap();
    assert_eq!(graph.initializer[0].raw_data, detector_weight_bytes());
    Ok(())
}

#[test]
fn failed_rewrite_leaves_file_untouched() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("best.onnx");

    let mut broken = detector_model();
    broken.graph.as_mut().unwrap().output.clear();
    save_model(&path, &broken)?;
    let on_disk = fs::read(&path)?;

    let mut model = load_model(&path)?;
    assert!(mark_batch_dynamic(&mut model).is_err());

    assert_eq!(fs::read(&path)?, on_disk);
    Ok(())
}

#[test]
fn missing_file_fails() {
    let err = load_model("./no-such-model.onnx".as_ref()).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn garbage_file_fails() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("best.onnx");
    fs::write(&path, [0xffu8; 16])?;

    let err = load_model(&path).unwrap_err();
    assert!(err.to_string().contains("failed to decode"));
    Ok(())
}

// ---- helpers

fn fixed_dim(n: i64) -> Dimension {
    Dimension {
        value: Some(DimValue::DimValue(n)),
        ..Default::default()
    }
}

fn tensor_value_info(name: &str, dims: Vec<Dimension>) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: 1,
                shape: Some(TensorShapeProto { dim: dims }),
            })),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn detector_weight_bytes() -> Vec<u8> {
    (0..16u8).collect()
}

/// Detector-shaped model: f32 [1, 3, 640, 640] -> f32 [1, 25200, 85].
fn detector_model() -> ModelProto {
    ModelProto {
        ir_version: 8,
        producer_name: "pytorch".to_string(),
        graph: Some(GraphProto {
            name: "detector".to_string(),
            initializer: vec![TensorProto {
                name: "conv.weight".to_string(),
                data_type: 1,
                dims: vec![4],
                raw_data: detector_weight_bytes().into(),
                ..Default::default()
            }],
            input: vec![tensor_value_info(
                "images",
                vec![fixed_dim(1), fixed_dim(3), fixed_dim(640), fixed_dim(640)],
            )],
            output: vec![tensor_value_info(
                "output0",
                vec![fixed_dim(1), fixed_dim(25200), fixed_dim(85)],
            )],
            ..Default::default()
        }),
        ..Default::default()
    }
}
