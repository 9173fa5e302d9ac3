//! Inlining of `wsdl:import`, `xsd:import` and `xsd:include`.
//!
//! Every import node is replaced, in place, by the children of the imported
//! document's root element. WSDL imports resolve against the importing
//! document; schema locations always resolve against the root document.
//! A WSDL import that cannot be loaded aborts resolution, a schema import that
//! cannot be loaded stays in the tree and is reported in [`Resolved::skipped`].

use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

use super::{
    error,
    loader::DocumentLoader,
    xml::{Element, Node, WSDL_NAMESPACE, XSD_NAMESPACE},
};

#[derive(Debug)]
pub struct Resolved {
    pub document: Element,
    /// Schema imports left unresolved, as `SchemaImportMissing` errors.
    pub skipped: Vec<error::Error>,
}

enum ImportKind {
    Wsdl,
    Schema,
}

pub struct ImportResolver<L> {
    loader: L,
    root: Url,
    visited: HashSet<Url>,
    skipped: Vec<error::Error>,
}

enum Action {
    Keep,
    Remove,
    Splice(Vec<Node>),
}

impl<L: DocumentLoader> ImportResolver<L> {
    pub fn new(loader: L, root: Url) -> Self {
        Self {
            loader,
            root,
            visited: HashSet::new(),
            skipped: Vec::new(),
        }
    }

    /// Loads the root document and resolves all of its imports.
    pub fn load(mut self) -> Result<Resolved, error::Error> {
        let root = self.root.clone();
        let document = self
            .loader
            .load(&root)
            .map_err(|source| error::Error::DocumentUnavailable {
                url: root.clone(),
                source: Box::new(source),
            })?;

        self.visited.insert(root.clone());
        let document = self.resolve_document(document, &root)?;

        Ok(Resolved {
            document,
            skipped: self.skipped,
        })
    }

    fn resolve_document(&mut self, mut document: Element, base: &Url) -> Result<Element, error::Error> {
        self.resolve_children(&mut document, base)?;
        Ok(document)
    }

    fn resolve_children(&mut self, parent: &mut Element, base: &Url) -> Result<(), error::Error> {
        let children = std::mem::take(&mut parent.children);
        let mut resolved = Vec::with_capacity(children.len());

        for child in children {
            let mut element = match child {
                Node::Element(element) => element,
                text => {
                    resolved.push(text);
                    continue;
                }
            };

            match self.import_action(&element, base)? {
                Action::Keep => {
                    self.resolve_children(&mut element, base)?;
                    resolved.push(Node::Element(element));
                }
                Action::Remove => (),
                Action::Splice(nodes) => resolved.extend(nodes),
            }
        }

        parent.children = resolved;
        Ok(())
    }

    fn import_action(&mut self, element: &Element, base: &Url) -> Result<Action, error::Error> {
        let kind = if element.is(WSDL_NAMESPACE, "import") {
            ImportKind::Wsdl
        } else if element.is(XSD_NAMESPACE, "import") || element.is(XSD_NAMESPACE, "include") {
            ImportKind::Schema
        } else {
            return Ok(Action::Keep);
        };

        match kind {
            ImportKind::Wsdl => self.wsdl_import(element, base),
            ImportKind::Schema => Ok(self.schema_import(element)),
        }
    }

    fn wsdl_import(&mut self, element: &Element, base: &Url) -> Result<Action, error::Error> {
        let location = element.attribute("location").unwrap_or_default().to_owned();
        let unavailable = |source: error::Error| error::Error::ImportUnavailable {
            location: location.clone(),
            source: Box::new(source),
        };

        let url = base.join(&location).map_err(|err| unavailable(err.into()))?;
        if !self.visited.insert(url.clone()) {
            debug!(%url, "WSDL document already imported");
            return Ok(Action::Remove);
        }

        debug!(%url, "importing WSDL document");
        let document = self.loader.load(&url).map_err(unavailable)?;
        let document = self.resolve_document(document, &url)?;

        Ok(Action::Splice(document.children))
    }

    fn schema_import(&mut self, element: &Element) -> Action {
        let location = match element.attribute("schemaLocation") {
            Some(location) => location.to_owned(),
            None => return Action::Keep,
        };

        let url = match self.root.join(&location) {
            Ok(url) => url,
            Err(err) => {
                self.skip(location, err.into());
                return Action::Keep;
            }
        };

        if !self.visited.insert(url.clone()) {
            debug!(%url, "schema already imported");
            return Action::Remove;
        }

        debug!(%url, "importing schema");
        let document = match self.loader.load(&url) {
            Ok(document) => document,
            Err(err) => {
                // Allow a later import of the same location to try again.
                self.visited.remove(&url);
                self.skip(location, err);
                return Action::Keep;
            }
        };

        let root = self.root.clone();
        match self.resolve_document(document, &root) {
            Ok(document) => Action::Splice(document.children),
            Err(err) => {
                self.visited.remove(&url);
                self.skip(location, err);
                Action::Keep
            }
        }
    }

    fn skip(&mut self, location: String, source: error::Error) {
        warn!(%location, error = %source.chain(), "skipping unavailable schema import");

        self.skipped.push(error::Error::SchemaImportMissing {
            location,
            source: Box::new(source),
        });
    }
}
