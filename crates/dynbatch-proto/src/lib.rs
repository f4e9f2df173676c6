//! Protobuf bindings for the ONNX model format, generated at build time
//! from `src/onnx.proto3`.

pub mod onnx {
    include!(concat!(env!("OUT_DIR"), "/onnx.rs"));
}
