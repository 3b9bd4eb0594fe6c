use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("a connect attempt is already in progress")]
    ConnectInProgress,
    #[error("backend rejected the connection: {0}")]
    Backend(#[from] anyhow::Error),
}

#[derive(Debug, Error)]
pub enum AttachmentOpenError {
    #[error("unable to open file: URL is missing")]
    MissingUrl,
    #[error("cannot open this file type on this device")]
    UnsupportedScheme,
    #[error("failed to open file: {0}")]
    OpenFailed(#[source] anyhow::Error),
}

/// Produced by the external markup renderer. Never escapes the pipeline;
/// rendering degrades to plain text instead.
#[derive(Debug, Clone, Error)]
#[error("markup render failed: {0}")]
pub struct RenderError(pub String);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration key: {0}")]
    Missing(&'static str),
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}
