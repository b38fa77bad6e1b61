pub mod azure;
pub mod config;
pub mod etl;
pub mod fabric;
pub mod generate;
pub mod quality;
pub mod utils;

pub use azure::adls::AdlsClient;
pub use azure::auth::{ClientSecretCredential, StaticTokenProvider, TokenProvider};
pub use azure::blob::BlobStorageClient;
pub use azure::data_factory::DataFactoryClient;
pub use azure::datalake::DatalakeClient;
pub use config::cli::{Cli, Commands, GenerateCommands};
pub use etl::EtlSession;
pub use fabric::lakehouse::LakehouseClient;
pub use fabric::pipeline::DataPipelineClient;
pub use utils::error::{Result, StacksError};
