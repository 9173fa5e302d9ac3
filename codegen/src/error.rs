use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0:?} is not a valid Rust identifier")]
    InvalidIdentifier(String),

    #[error("Error generating Rust source")]
    Syntax(#[from] syn::Error),

    #[error("Unable to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub(crate) fn io<P: Into<PathBuf>>(path: P) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
