#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid container id: {0:?}")]
    InvalidContainerID(String),
    #[error("invalid pod log directory name: {0:?}")]
    InvalidPodDirectory(String),
}
pub type Result<T> = std::result::Result<T, Error>;
