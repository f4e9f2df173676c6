use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "dynbatch", version, about = "ONNX dynamic-batch rewriter")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Mark the leading batch dimension of the first input and first output
    /// as dynamic, rewriting the model file in place
    Dynamic {
        /// Path to ONNX model file
        #[arg(long, default_value = "./best.onnx")]
        model_path: String,

        /// Log level (RUST_LOG)
        #[arg(long, default_value = "info")]
        log: String,
    },

    /// Print the model's declared inputs and outputs
    Info {
        /// Path to ONNX model file
        #[arg(long, default_value = "./best.onnx")]
        model_path: String,

        /// Log level (RUST_LOG)
        #[arg(long, default_value = "info")]
        log: String,
    },
}
