use thiserror::Error;
use wsdlc_wsdl as wsdl;

use super::transform;

/// Fatal failure of an interpretation run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Error loading WSDL document ({})", .0.chain())]
    Load(#[from] wsdl::error::Error),

    #[error("Error interpreting WSDL document ({0})")]
    TransformFailure(#[from] transform::Error),
}
