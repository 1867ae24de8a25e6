//! Error types for pool-meta

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] pool_fs::Error),

    /// A document failed shape or type validation
    #[error("Schema error in {document}: {message}")]
    Schema { document: String, message: String },

    /// A size or duration string could not be parsed
    #[error("Invalid {kind} {input:?}: {message}")]
    Parse {
        kind: &'static str,
        input: String,
        message: String,
    },

    #[error("Invalid cloud {value:?} - use aws,gcp")]
    InvalidProvider { value: String },

    #[error("Unknown architecture {value:?} - use x64,arm64")]
    InvalidArchitecture { value: String },

    #[error("Invalid machine catalog: {message}")]
    Catalog { message: String },
}

impl Error {
    pub fn schema(document: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            document: document.into(),
            message: message.into(),
        }
    }

    pub(crate) fn parse(kind: &'static str, input: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            input: input.to_string(),
            message: message.into(),
        }
    }
}
