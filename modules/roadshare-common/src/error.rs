use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoadshareError {
    #[error("Configuration error: {0}")]
    Config(String),
}
