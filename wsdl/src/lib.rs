use std::path::Path;
use url::Url;

pub mod error;
pub mod import;
pub mod loader;
pub mod xml;

pub use import::{ImportResolver, Resolved};
pub use loader::{DocumentLoader, MemoryLoader, UrlLoader};
pub use xml::Element;

/// Turns a URL or a filesystem path into a URL, canonicalizing relative paths.
pub fn resolve_url<S: AsRef<str>>(location: S) -> Result<Url, error::Error> {
    match Url::parse(location.as_ref()) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let path = Path::new(location.as_ref())
                .canonicalize()
                .map_err(|err| error::Error::PathConversionError(Some(err)))?;

            Url::from_file_path(&path).map_err(|()| error::Error::PathConversionError(None))
        }
        Err(err) => Err(err.into()),
    }
}

/// Loads the document at `url` with all of its imports inlined.
pub fn load<L: DocumentLoader>(loader: L, url: Url) -> Result<Resolved, error::Error> {
    ImportResolver::new(loader, url).load()
}
