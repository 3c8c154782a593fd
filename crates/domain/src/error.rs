/// Shared error type used across all IdGate crates.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Key material that is missing, malformed, or the wrong length.
    #[error("key material: {0}")]
    Key(String),
}

pub type Result<T> = std::result::Result<T, Error>;
