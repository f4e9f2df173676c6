mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use dynbatch_core::{load_model, mark_batch_dynamic, save_model, DimChange, ModelSpec};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Dynamic { model_path, log } => {
            init_logging(&log);
            dynamic(model_path.into())
        }
        Command::Info { model_path, log } => {
            init_logging(&log);
            show_info(model_path.into())
        }
    }
}

fn init_logging(log: &str) {
    std::env::set_var("RUST_LOG", log);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
}

fn dynamic(model_path: PathBuf) -> Result<()> {
    let mut model = load_model(&model_path)?;
    let report = mark_batch_dynamic(&mut model)?;
    save_model(&model_path, &model)?;

    log_change("input", &report.input);
    log_change("output", &report.output);
    info!(path = %model_path.display(), "model rewritten in place");
    Ok(())
}

fn log_change(kind: &str, change: &DimChange) {
    if change.was_dynamic() {
        info!(tensor = %change.tensor, before = %change.before, "{kind} batch dimension was already dynamic");
    } else {
        info!(tensor = %change.tensor, before = %change.before, "{kind} batch dimension is now dynamic");
    }
}

fn show_info(model_path: PathBuf) -> Result<()> {
    let model = load_model(&model_path)?;
    let spec = ModelSpec::from_model(&model)?;

    println!("Model: {}", model_path.display());
    println!("IR version: {}", model.ir_version);
    if !model.producer_name.is_empty() {
        println!("Producer: {} {}", model.producer_name, model.producer_version);
    }
    for opset in &model.opset_import {
        let domain = if opset.domain.is_empty() {
            "ai.onnx"
        } else {
            opset.domain.as_str()
        };
        println!("Opset: {} v{}", domain, opset.version);
    }

    println!();
    println!("Inputs:");
    for tensor in &spec.inputs {
        println!(
            "  {}: {} {}",
            tensor.name.0,
            tensor.dtype_name(),
            tensor.shape_string()
        );
    }
    println!("Outputs:");
    for tensor in &spec.outputs {
        println!(
            "  {}: {} {}",
            tensor.name.0,
            tensor.dtype_name(),
            tensor.shape_string()
        );
    }
    Ok(())
}
