use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bpmn-modeler")]
#[command(about = "Replay BPMN modeling scripts with undo and redo", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply a script of modeling operations to a diagram
    Replay(ReplayArgs),
    /// Summarize a diagram file
    Inspect {
        #[arg(value_name = "DIAGRAM")]
        diagram: String,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct ReplayArgs {
    /// JSON array of operations
    #[arg(value_name = "SCRIPT")]
    pub script: String,

    /// Diagram to start from (or set BPMN_DIAGRAM env var); a new process otherwise
    #[arg(long, value_name = "FILE", env = "BPMN_DIAGRAM")]
    pub diagram: Option<String>,

    /// Write the resulting diagram to this file instead of the response
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<String>,

    /// Config file to use instead of the user config
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,
}
