fn main() -> Result<(), Box<dyn std::error::Error>> {
    // `protoc` is not available in this environment; fall back to the vendored
    // binary shipped by `protoc-bin-vendored` so the proto compilation step can run.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(path) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", path);
        }
    }
    prost_build::Config::new()
        .bytes(["."])
        .compile_protos(&["src/onnx.proto3"], &["src"])?;
    Ok(())
}
