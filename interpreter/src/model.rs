//! Intermediate model handed to emitters.

use indexmap::IndexMap;
use std::{fmt, sync::Arc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Integer,
    Float,
    String,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(Primitive),
    Complex,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    pub base_name: String,
    pub kind: TypeKind,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyDef {
    pub name: String,
    pub ty: TypeReference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDef {
    pub name: String,
    pub ty: TypeReference,
}

/// Index of a base entity in its model's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BaseId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedClassDef {
    pub file_name: String,
    pub class_name: String,
    pub base_class_name: String,
    pub base_id: BaseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseClassDef {
    pub id: BaseId,
    pub file_name: String,
    pub class_name: String,
    pub parent_class_name: String,
    pub properties: Vec<PropertyDef>,
    /// Type name as declared in the WSDL.
    pub wsdl_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: String,
    pub parameters: Vec<ParameterDef>,
    /// `None` for functions that return nothing.
    pub return_type: Option<TypeReference>,
    pub exceptions: Vec<String>,
}

/// WSDL type name to derived class name, shared by every service of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classmap(IndexMap<String, String>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedServiceDef {
    pub file_name: String,
    pub name: String,
    pub base_name: String,
    pub base_id: BaseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseServiceDef {
    pub id: BaseId,
    pub file_name: String,
    pub name: String,
    pub parent_transport_class_name: String,
    pub functions: IndexMap<String, FunctionDef>,
    pub wsdl_location: String,
    pub remote_service_name: Option<String>,
    pub endpoint: Option<String>,
    pub service_namespace: Option<String>,
    pub classmap: Arc<Classmap>,
}

/// Something with a derived/base split that can be registered in a [`Registry`].
pub trait Split {
    type Derived: fmt::Debug + Clone + PartialEq + Eq;
    type Base: fmt::Debug + Clone + PartialEq + Eq;

    fn base_id(derived: &Self::Derived) -> BaseId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry<'a, D, B> {
    Derived(&'a D),
    Base(&'a B),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<D> {
    Derived(D),
    Base(BaseId),
}

/// Registry of generated entities keyed by final name.
///
/// Base entities live in an arena addressed by [`BaseId`]; derived entities
/// point at their base through that id. Registering a name twice replaces the
/// earlier entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry<S: Split> {
    bases: Vec<S::Base>,
    entries: IndexMap<String, Slot<S::Derived>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Services;

pub type ClassModel = Registry<Classes>;
pub type ServiceModel = Registry<Services>;

pub type ClassEntry<'a> = Entry<'a, DerivedClassDef, BaseClassDef>;
pub type ServiceEntry<'a> = Entry<'a, DerivedServiceDef, BaseServiceDef>;

impl Split for Classes {
    type Derived = DerivedClassDef;
    type Base = BaseClassDef;

    fn base_id(derived: &DerivedClassDef) -> BaseId {
        derived.base_id
    }
}

impl Split for Services {
    type Derived = DerivedServiceDef;
    type Base = BaseServiceDef;

    fn base_id(derived: &DerivedServiceDef) -> BaseId {
        derived.base_id
    }
}

impl TypeReference {
    pub fn is_primitive(&self) -> bool {
        matches!(self.kind, TypeKind::Primitive(_))
    }
}

impl fmt::Display for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            write!(f, "{}[]", self.base_name)
        } else {
            write!(f, "{}", self.base_name)
        }
    }
}

impl Primitive {
    /// Canonical name used as the base name of primitive type references.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Integer => "int",
            Primitive::Float => "double",
            Primitive::String => "string",
            Primitive::Boolean => "boolean",
        }
    }
}

impl Classmap {
    pub fn insert(&mut self, wsdl_name: String, class_name: String) {
        self.0.insert(wsdl_name, class_name);
    }

    pub fn get(&self, wsdl_name: &str) -> Option<&str> {
        self.0.get(wsdl_name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FunctionDef {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: None,
            exceptions: Vec::new(),
        }
    }
}

impl<S: Split> Default for Registry<S> {
    fn default() -> Self {
        Self {
            bases: Vec::new(),
            entries: IndexMap::new(),
        }
    }
}

impl<S: Split> Registry<S> {
    pub fn next_id(&self) -> BaseId {
        BaseId(self.bases.len())
    }

    /// Registers a base entity under `name`, returning `true` if an earlier
    /// entry with the same name was replaced.
    pub fn insert_base(&mut self, name: String, base: S::Base) -> bool {
        let id = self.next_id();
        self.bases.push(base);
        self.entries.insert(name, Slot::Base(id)).is_some()
    }

    /// Registers a derived entity under `name`, returning `true` if an earlier
    /// entry with the same name was replaced.
    pub fn insert_derived(&mut self, name: String, derived: S::Derived) -> bool {
        self.entries.insert(name, Slot::Derived(derived)).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Entry<'_, S::Derived, S::Base>> {
        self.entries.get(name).map(|slot| self.entry(slot))
    }

    pub fn base(&self, id: BaseId) -> Option<&S::Base> {
        self.bases.get(id.0)
    }

    /// Base entity a derived entity was generated with.
    pub fn base_of(&self, derived: &S::Derived) -> Option<&S::Base> {
        self.base(S::base_id(derived))
    }

    /// Registered entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Entry<'_, S::Derived, S::Base>)> {
        self.entries
            .iter()
            .map(move |(name, slot)| (name.as_str(), self.entry(slot)))
    }

    pub fn derived(&self) -> impl Iterator<Item = &S::Derived> {
        self.entries.values().filter_map(|slot| match slot {
            Slot::Derived(derived) => Some(derived),
            Slot::Base(_) => None,
        })
    }

    pub fn bases(&self) -> impl Iterator<Item = &S::Base> {
        self.entries.values().filter_map(move |slot| match slot {
            Slot::Base(id) => self.base(*id),
            Slot::Derived(_) => None,
        })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry<'a>(&'a self, slot: &'a Slot<S::Derived>) -> Entry<'a, S::Derived, S::Base> {
        match slot {
            Slot::Derived(derived) => Entry::Derived(derived),
            // Ids are only handed out by `insert_base`, so they always index the arena.
            Slot::Base(id) => Entry::Base(&self.bases[id.0]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_class(id: BaseId, name: &str) -> BaseClassDef {
        BaseClassDef {
            id,
            file_name: name.to_owned(),
            class_name: format!("Base{}", name),
            parent_class_name: "WsObject".to_owned(),
            properties: Vec::new(),
            wsdl_name: name.to_owned(),
        }
    }

    #[test]
    fn derived_resolves_its_base_by_id() {
        let mut classes = ClassModel::default();

        let id = classes.next_id();
        classes.insert_base("BaseOrder".to_owned(), base_class(id, "Order"));
        classes.insert_derived(
            "Order".to_owned(),
            DerivedClassDef {
                file_name: "Order".to_owned(),
                class_name: "Order".to_owned(),
                base_class_name: "BaseOrder".to_owned(),
                base_id: id,
            },
        );

        let derived = match classes.get("Order") {
            Some(Entry::Derived(derived)) => derived,
            other => panic!("unexpected entry {:?}", other),
        };

        assert_eq!(classes.base_of(derived).unwrap().class_name, "BaseOrder");
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut classes = ClassModel::default();

        let first = classes.next_id();
        assert!(!classes.insert_base("BaseOrder".to_owned(), base_class(first, "first")));
        let second = classes.next_id();
        assert!(classes.insert_base("BaseOrder".to_owned(), base_class(second, "second")));

        assert_eq!(classes.len(), 1);
        match classes.get("BaseOrder") {
            Some(Entry::Base(base)) => assert_eq!(base.wsdl_name, "second"),
            other => panic!("unexpected entry {:?}", other),
        }

        // The replaced base stays reachable for derived entities pointing at it.
        assert_eq!(classes.base(first).unwrap().wsdl_name, "first");
    }

    #[test]
    fn type_reference_display_reapplies_array_marker() {
        let reference = TypeReference {
            base_name: "ShopItem".to_owned(),
            kind: TypeKind::Complex,
            is_array: true,
        };

        assert_eq!(reference.to_string(), "ShopItem[]");
    }
}
