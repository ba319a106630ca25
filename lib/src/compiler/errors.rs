use thiserror::Error;

use crate::re;

/// Errors returned by the compiler.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The pattern of some signature is invalid. The underlying cause is
    /// available through [`std::error::Error::source`] and
    /// [`Error::cause`].
    #[error("invalid signature `{name}` (pattern: `{pattern}`)")]
    SignatureCompilation {
        name: String,
        pattern: String,
        #[source]
        source: re::Error,
    },

    /// A signature with the same name was already added.
    #[error("duplicate signature `{name}`")]
    DuplicateSignature { name: String },
}

impl Error {
    /// Name of the signature that produced the error.
    pub fn signature_name(&self) -> &str {
        match self {
            Error::SignatureCompilation { name, .. } => name,
            Error::DuplicateSignature { name } => name,
        }
    }

    /// The pattern error that caused the compilation to fail, if any.
    pub fn cause(&self) -> Option<&re::Error> {
        match self {
            Error::SignatureCompilation { source, .. } => Some(source),
            Error::DuplicateSignature { .. } => None,
        }
    }
}
