use std::{collections::HashMap, fs};
use tracing::debug;
use url::Url;

use super::{error, xml::Element};

/// Fetches and parses one document. Implementations decide where documents come
/// from; retrying transient failures is also up to them.
pub trait DocumentLoader {
    fn load(&self, url: &Url) -> Result<Element, error::Error>;
}

impl<L: DocumentLoader + ?Sized> DocumentLoader for &L {
    fn load(&self, url: &Url) -> Result<Element, error::Error> {
        (**self).load(url)
    }
}

/// Loads `file:` URLs from disk and `http:`/`https:` URLs over the network.
#[derive(Default, Debug, Clone, Copy)]
pub struct UrlLoader;

impl DocumentLoader for UrlLoader {
    fn load(&self, url: &Url) -> Result<Element, error::Error> {
        debug!(%url, "loading document");

        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| error::Error::PathConversionError(None))?;
                let contents = fs::read(path).map_err(error::Error::FileOpenError)?;
                super::xml::parse_bytes(&contents)
            }

            "http" | "https" => {
                let response = reqwest::blocking::get(url.clone())?.error_for_status()?;
                let contents = response.bytes()?;
                super::xml::parse_bytes(&contents)
            }

            other => Err(error::Error::UnsupportedScheme(other.into())),
        }
    }
}

/// Serves documents registered ahead of time, keyed by URL.
#[derive(Default, Debug, Clone)]
pub struct MemoryLoader {
    documents: HashMap<Url, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, url: Url, document: S) -> &mut Self {
        self.documents.insert(url, document.into());
        self
    }

    pub fn with<S: Into<String>>(mut self, url: &str, document: S) -> Result<Self, error::Error> {
        self.insert(Url::parse(url)?, document);
        Ok(self)
    }
}

impl DocumentLoader for MemoryLoader {
    fn load(&self, url: &Url) -> Result<Element, error::Error> {
        match self.documents.get(url) {
            Some(document) => super::xml::parse_str(document),
            None => Err(error::Error::FileOpenError(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no document registered for {}", url),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_files_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "<definitions name=\"disk\"/>").unwrap();

        let url = Url::from_file_path(file.path()).unwrap();
        let root = UrlLoader.load(&url).unwrap();

        assert_eq!(root.attribute("name"), Some("disk"));
    }

    #[test]
    fn missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let url = Url::from_file_path(dir.path().join("absent.wsdl")).unwrap();

        assert!(matches!(
            UrlLoader.load(&url),
            Err(error::Error::FileOpenError(_))
        ));
    }

    #[test]
    fn rejects_unknown_schemes() {
        let url = Url::parse("ftp://example.com/service.wsdl").unwrap();

        assert!(matches!(
            UrlLoader.load(&url),
            Err(error::Error::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
    }

    #[test]
    fn memory_loader_serves_registered_documents() {
        let loader = MemoryLoader::new()
            .with("mem://root/a.xsd", "<schema/>")
            .unwrap();

        assert!(loader.load(&Url::parse("mem://root/a.xsd").unwrap()).is_ok());
        assert!(loader.load(&Url::parse("mem://root/b.xsd").unwrap()).is_err());
    }
}
