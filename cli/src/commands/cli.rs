use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ollama-task", version, about = "Run Ollama command tasks with a persistent model cache")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// App config file. Defaults to ~/.ollama-task/config.toml, then ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct RunArgs {
    /// Task definition (TOML).
    pub task: PathBuf,

    /// Template variables for the task's properties (KEY=VALUE).
    /// Can be specified multiple times.
    #[arg(long = "var", action = clap::ArgAction::Append)]
    pub vars: Vec<String>,

    /// Keep the run's working directory.
    #[arg(long, default_value_t = false)]
    pub keep_workdir: bool,

    /// Print the result as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute the task.
    Run(RunArgs),
    /// Print the planned execution request without running anything.
    Plan(RunArgs),
}
