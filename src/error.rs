use std::path::PathBuf;

use thiserror::Error;

use crate::camera::Movement;

/// Errors surfaced while configuring the viewer or preparing its shader.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("unable to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {origin}: {source}")]
    ConfigParse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("unable to serialize configuration")]
    ConfigSerialize(#[from] toml::ser::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
    #[error("key {key} is bound to both {first:?} and {second:?}")]
    DuplicateBinding {
        key: String,
        first: Movement,
        second: Movement,
    },
    #[error("shader {name} failed to compile:\n{message}")]
    Shader { name: String, message: String },
}

pub type Result<T, E = ViewerError> = std::result::Result<T, E>;
