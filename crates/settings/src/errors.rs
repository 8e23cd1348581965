use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file {path:?}: {source}")]
    Parse {
        path: Option<PathBuf>,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize defaults: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value in section [{section}]: {source}")]
    Section {
        section: &'static str,
        #[source]
        source: toml::de::Error,
    },

    #[error("section [{0}] must be a table")]
    NotATable(&'static str),

    #[error("section [{0}] is not registered")]
    NotRegistered(&'static str),

    #[error("section [{0}] is already registered")]
    AlreadyRegistered(&'static str),
}
