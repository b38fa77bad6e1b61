use thiserror::Error;

#[derive(Error, Debug)]
pub enum StacksError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML config error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Template rendering error: {0}")]
    RenderError(#[from] handlebars::RenderError),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Azure request to {endpoint} returned {status}: {message}")]
    AzureError {
        endpoint: String,
        status: u16,
        message: String,
    },

    #[error("The following environment variables are not set: {}", .variables.join(", "))]
    MissingEnvironment { variables: Vec<String> },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("No rundate directories found under {path}")]
    NoRundateDirectories { path: String },

    #[error("Directory name {name} does not contain a parseable rundate")]
    InvalidRundate { name: String },

    #[error("Pipeline run {run_id} did not complete within {timeout_secs}s (last status: {status})")]
    PipelineTimeout {
        run_id: String,
        status: String,
        timeout_secs: u64,
    },

    #[error("Expected files missing from {directory}: {}", .missing.join(", "))]
    MissingFiles {
        directory: String,
        missing: Vec<String>,
    },
}

pub type Result<T> = std::result::Result<T, StacksError>;
