use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Failed to spawn backend: {0}")]
    BackendSpawn(String),

    #[error("Backend IO error: {0}")]
    BackendIo(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
