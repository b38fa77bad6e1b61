use clap::Parser;

use stacks_data::generate::{
    generate_pipeline, validate_yaml_config, IngestWorkloadConfig, ProcessingWorkloadConfig,
    TerminalPrompt,
};
use stacks_data::quality::{data_quality_main, DataQualityOptions};
use stacks_data::utils::logger;
use stacks_data::{Cli, Commands, EtlSession, GenerateCommands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(&cli.log_level);

    match cli.command {
        Commands::Generate(generate) => match generate {
            GenerateCommands::Ingest { config, data_quality } => {
                let validated_config: IngestWorkloadConfig = validate_yaml_config(&config)?;
                generate_pipeline(&validated_config, data_quality, &TerminalPrompt)?;
            }
            GenerateCommands::Processing { config, data_quality } => {
                let validated_config: ProcessingWorkloadConfig = validate_yaml_config(&config)?;
                generate_pipeline(&validated_config, data_quality, &TerminalPrompt)?;
            }
        },
        Commands::Dq { config_path, container } => {
            let session = EtlSession::from_env()?;
            data_quality_main(&session, &config_path, &container, DataQualityOptions::default()).await?;
        }
    }

    Ok(())
}
