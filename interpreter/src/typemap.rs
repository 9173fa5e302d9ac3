//! Classification of WSDL/XSD type names.

use super::{
    model::{Primitive, TypeKind, TypeReference},
    naming,
};

const INTEGERS: &[&str] = &[
    "int",
    "integer",
    "long",
    "byte",
    "short",
    "negativeinteger",
    "nonnegativeinteger",
    "nonpositiveinteger",
    "positiveinteger",
    "unsignedbyte",
    "unsignedint",
    "unsignedlong",
    "unsignedshort",
];

// "long" is also listed with the integers, which are tested first.
const FLOATS: &[&str] = &["float", "long", "double", "decimal"];

const STRINGS: &[&str] = &["string", "token", "normalizedstring", "hexbinary"];

const BOOLEANS: &[&str] = &["boolean", "bool"];

const ARRAY_SUFFIX: &str = "[]";
const ARRAY_PREFIX: &str = "ArrayOf";
const ARRAY_PREFIX_SEPARATORS: &[char] = &['_', '-', '.'];

/// Maps raw type names to [`TypeReference`]s, qualifying complex types with the
/// class namespace.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    class_namespace: String,
}

impl TypeMapper {
    pub fn new<S: Into<String>>(class_namespace: S) -> Self {
        Self {
            class_namespace: class_namespace.into(),
        }
    }

    pub fn classify(&self, raw_type: &str) -> TypeReference {
        let (name, is_array) = strip_array_markers(raw_type);

        let kind = match primitive(name) {
            Some(primitive) => TypeKind::Primitive(primitive),
            None => TypeKind::Complex,
        };

        let base_name = match kind {
            TypeKind::Primitive(primitive) => primitive.name().to_owned(),
            TypeKind::Complex => format!("{}{}", self.class_namespace, naming::normalize(name, true)),
        };

        TypeReference {
            base_name,
            kind,
            is_array,
        }
    }
}

fn strip_array_markers(raw_type: &str) -> (&str, bool) {
    let mut name = raw_type;
    let mut is_array = false;

    if let Some(stripped) = name.strip_suffix(ARRAY_SUFFIX) {
        name = stripped;
        is_array = true;
    }

    if let Some(stripped) = name.strip_prefix(ARRAY_PREFIX) {
        name = stripped
            .strip_prefix(ARRAY_PREFIX_SEPARATORS)
            .unwrap_or(stripped);
        is_array = true;
    }

    (name, is_array)
}

fn primitive(name: &str) -> Option<Primitive> {
    let name = name.to_lowercase();
    let name = name.as_str();

    if INTEGERS.contains(&name) {
        Some(Primitive::Integer)
    } else if FLOATS.contains(&name) {
        Some(Primitive::Float)
    } else if STRINGS.contains(&name) {
        Some(Primitive::String)
    } else if BOOLEANS.contains(&name) {
        Some(Primitive::Boolean)
    } else {
        None
    }
}
