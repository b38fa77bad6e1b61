use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CONFIG_CONTAINER_NAME;

#[derive(Debug, Parser)]
#[command(name = "datastacks")]
#[command(about = "Generate and manage data workloads for the Stacks data platform")]
pub struct Cli {
    /// Log level for CLI output
    #[arg(long, short = 'l', global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new data workload
    #[command(subcommand)]
    Generate(GenerateCommands),

    /// Perform a data quality check
    Dq {
        /// Path to a JSON config inside an Azure Blob container
        #[arg(long)]
        config_path: String,

        /// Name of the container for storing configurations
        #[arg(long, default_value = CONFIG_CONTAINER_NAME)]
        container: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum GenerateCommands {
    /// Generate a new data ingest workload
    Ingest {
        /// Path to the YAML config file
        #[arg(long, short)]
        config: PathBuf,

        /// Include data quality components in the generated workload
        #[arg(long = "data-quality", short = 'd')]
        data_quality: bool,
    },

    /// Generate a new data processing workload
    Processing {
        /// Path to the YAML config file
        #[arg(long, short)]
        config: PathBuf,

        /// Include data quality components in the generated workload
        #[arg(long = "data-quality", short = 'd')]
        data_quality: bool,
    },
}
