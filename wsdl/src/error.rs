use std::error::Error as StdError;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to parse provided URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unable to convert provided path")]
    PathConversionError(Option<std::io::Error>),

    #[error("Unable to open file")]
    FileOpenError(#[source] std::io::Error),

    #[error("Unable to get file from server")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Unsupported URL scheme {0}")]
    UnsupportedScheme(String),

    #[error("Error parsing XML input")]
    XmlParseError(#[from] quick_xml::Error),

    #[error("Document has no root element")]
    EmptyDocument,

    #[error("WSDL document {url} is unavailable")]
    DocumentUnavailable {
        url: Url,
        #[source]
        source: Box<Error>,
    },

    #[error("Imported WSDL document {location} is unavailable")]
    ImportUnavailable {
        location: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Imported schema {location} is unavailable")]
    SchemaImportMissing {
        location: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Message of this error followed by the messages of its causes.
    pub fn chain(&self) -> String {
        let mut message = self.to_string();
        let mut source = StdError::source(self);

        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = StdError::source(cause);
        }

        message
    }
}
