//! Interpretation of WSDL documents into class and service models.

use tracing::{info, warn};
use url::Url;
use wsdlc_wsdl::{self as wsdl, DocumentLoader, Element};

pub mod builder;
pub mod context;
pub mod error;
pub mod model;
pub mod naming;
pub mod options;
pub mod transform;
pub mod typemap;

pub use builder::ModelBuilder;
pub use context::InterpretationContext;
pub use error::Error;
pub use options::Options;
pub use transform::{SchemaTransform, WsdlTransform};

/// Runs the whole pipeline for the document at `url`: imports are inlined,
/// the merged document is reduced by `transform` and the result is built into
/// a fresh [`InterpretationContext`].
pub fn interpret<L, T>(url: Url, options: Options, loader: L, transform: &T) -> Result<InterpretationContext, Error>
where
    L: DocumentLoader,
    T: SchemaTransform + ?Sized,
{
    info!(%url, "loading WSDL document");
    let resolved = wsdl::load(loader, url.clone())?;

    for skipped in &resolved.skipped {
        warn!("{}", skipped.chain());
    }

    let mut context = InterpretationContext::new(options, url.as_str());
    context.skipped_imports = resolved.skipped;

    build(&mut context, &resolved.document, transform)?;
    Ok(context)
}

/// Reduces an already merged document and builds its model into `context`.
pub fn build<T>(context: &mut InterpretationContext, document: &Element, transform: &T) -> Result<(), Error>
where
    T: SchemaTransform + ?Sized,
{
    context.service_namespace = document.find_attribute("targetNamespace").map(ToOwned::to_owned);

    info!("transforming WSDL document");
    let simplified = transform.transform(document)?;

    ModelBuilder::new(context).build(&simplified);
    Ok(())
}
