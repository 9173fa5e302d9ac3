use std::sync::Arc;
use wsdlc_wsdl as wsdl;

use super::{
    model::{ClassModel, Classmap, ServiceModel},
    options::Options,
};

/// Everything one interpretation run produces.
///
/// Each run owns its own registries; nothing is shared between runs.
#[derive(Debug)]
pub struct InterpretationContext {
    pub options: Options,
    pub wsdl_location: String,
    /// First `targetNamespace` declared by the root document.
    pub service_namespace: Option<String>,
    pub classes: ClassModel,
    pub services: ServiceModel,
    pub classmap: Arc<Classmap>,
    /// Schema imports that could not be loaded and were left unresolved.
    pub skipped_imports: Vec<wsdl::error::Error>,
}

impl InterpretationContext {
    pub fn new<S: Into<String>>(options: Options, wsdl_location: S) -> Self {
        Self {
            options,
            wsdl_location: wsdl_location.into(),
            service_namespace: None,
            classes: ClassModel::default(),
            services: ServiceModel::default(),
            classmap: Arc::new(Classmap::default()),
            skipped_imports: Vec::new(),
        }
    }
}
