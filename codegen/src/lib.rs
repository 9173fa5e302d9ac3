//! Rendering of interpreted models as Rust source.

use std::{cell::RefCell, collections::HashMap};
use tracing::debug;
use wsdlc_interpreter::model::{BaseClassDef, BaseServiceDef, DerivedClassDef, DerivedServiceDef};

mod codegen;
pub mod error;
pub mod output;

pub use error::Error;
pub use output::{write, OutputDirs, Report};

/// One renderable unit of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity<'a> {
    /// Default parent of base classes, by name.
    RootClass(&'a str),
    DerivedClass(&'a DerivedClassDef),
    BaseClass(&'a BaseClassDef),
    DerivedService(&'a DerivedServiceDef),
    BaseService(&'a BaseServiceDef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    RootClass,
    DerivedClass,
    BaseClass,
    DerivedService,
    BaseService,
}

impl Entity<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::RootClass(_) => EntityKind::RootClass,
            Entity::DerivedClass(_) => EntityKind::DerivedClass,
            Entity::BaseClass(_) => EntityKind::BaseClass,
            Entity::DerivedService(_) => EntityKind::DerivedService,
            Entity::BaseService(_) => EntityKind::BaseService,
        }
    }

    /// Final class or service name.
    pub fn name(&self) -> &str {
        match self {
            Entity::RootClass(name) => name,
            Entity::DerivedClass(class) => &class.class_name,
            Entity::BaseClass(class) => &class.class_name,
            Entity::DerivedService(service) => &service.name,
            Entity::BaseService(service) => &service.name,
        }
    }
}

pub trait Emitter {
    fn render(&self, entity: Entity<'_>) -> Result<String, Error>;
}

impl<E: Emitter + ?Sized> Emitter for &E {
    fn render(&self, entity: Entity<'_>) -> Result<String, Error> {
        (**self).render(entity)
    }
}

/// Emits formatted Rust source.
///
/// Rendered content is memoized by entity kind and name, so one emitter should
/// only be used with the models of a single run.
#[derive(Debug, Default)]
pub struct RustEmitter {
    cache: RefCell<HashMap<(EntityKind, String), String>>,
}

impl RustEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rendered entities held in the cache.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl Emitter for RustEmitter {
    fn render(&self, entity: Entity<'_>) -> Result<String, Error> {
        let key = (entity.kind(), entity.name().to_owned());

        if let Some(content) = self.cache.borrow().get(&key) {
            return Ok(content.clone());
        }

        let content = codegen::render(&entity)?;
        debug!(entity = %key.1, kind = ?key.0, "rendered entity");

        self.cache.borrow_mut().insert(key, content.clone());
        Ok(content)
    }
}
