use proc_macro2::{Ident, TokenStream};
use quote::{format_ident, quote, ToTokens};
use wsdlc_interpreter::model::{
    BaseClassDef, BaseServiceDef, DerivedClassDef, DerivedServiceDef, FunctionDef, Primitive,
    PropertyDef, TypeKind, TypeReference,
};

use super::{error::Error, Entity};

const BASE_HEADER: &str = " Generated by wsdlc. Regenerated on every run, do not edit.";
const DERIVED_HEADER: &str = " Generated once by wsdlc. Safe to edit, never overwritten.";

pub trait Codegen {
    fn codegen(&self) -> Result<TokenStream, Error>;
}

/// Default parent of generated base classes.
pub struct RootClass<'a>(pub &'a str);

/// Renders one entity to formatted Rust source.
pub fn render(entity: &Entity<'_>) -> Result<String, Error> {
    let tokens = match entity {
        Entity::RootClass(name) => RootClass(name).codegen()?,
        Entity::DerivedClass(class) => class.codegen()?,
        Entity::BaseClass(class) => class.codegen()?,
        Entity::DerivedService(service) => service.codegen()?,
        Entity::BaseService(service) => service.codegen()?,
    };

    let file = syn::parse2::<syn::File>(tokens)?;
    Ok(prettyplease::unparse(&file))
}

/// Identifier for a declared name, falling back to a raw identifier for
/// keywords. Keywords that cannot be raw, such as `self`, get a trailing
/// underscore.
pub fn ident(name: &str) -> Result<Ident, Error> {
    syn::parse_str::<Ident>(name)
        .or_else(|_| syn::parse_str::<Ident>(&format!("r#{}", name)))
        .or_else(|_| syn::parse_str::<Ident>(&format!("{}_", name)))
        .map_err(|_| Error::InvalidIdentifier(name.to_owned()))
}

/// Path to a configured type such as a root or transport class.
fn type_path(name: &str) -> Result<syn::Path, Error> {
    syn::parse_str::<syn::Path>(name).map_err(|_| Error::InvalidIdentifier(name.to_owned()))
}

fn primitive_type(primitive: Primitive) -> TokenStream {
    match primitive {
        Primitive::Integer => quote! { i64 },
        Primitive::Float => quote! { f64 },
        Primitive::String => quote! { String },
        Primitive::Boolean => quote! { bool },
    }
}

fn codegen_all<'a, T: Codegen + 'a>(all: impl IntoIterator<Item = &'a T>) -> Result<Vec<TokenStream>, Error> {
    all.into_iter().map(Codegen::codegen).collect()
}

fn optional_str(value: Option<&str>) -> TokenStream {
    match value {
        Some(value) => quote! { Some(#value) },
        None => quote! { None },
    }
}

fn deref_impls(name: &Ident, target: impl ToTokens, field: impl ToTokens) -> TokenStream {
    quote! {
        impl std::ops::Deref for #name {
            type Target = #target;

            fn deref(&self) -> &Self::Target {
                &self.#field
            }
        }

        impl std::ops::DerefMut for #name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.#field
            }
        }
    }
}

impl Codegen for TypeReference {
    fn codegen(&self) -> Result<TokenStream, Error> {
        let ty = match self.kind {
            TypeKind::Primitive(primitive) => primitive_type(primitive),
            TypeKind::Complex => {
                let name = ident(&self.base_name)?;
                quote! { #name }
            }
        };

        // Single complex values are boxed so recursive types stay sized.
        Ok(if self.is_array {
            quote! { Vec<#ty> }
        } else if self.is_primitive() {
            ty
        } else {
            quote! { Option<Box<#ty>> }
        })
    }
}

impl Codegen for PropertyDef {
    fn codegen(&self) -> Result<TokenStream, Error> {
        let name = ident(&self.name)?;
        let ty = self.ty.codegen()?;

        Ok(quote! {
            pub #name: #ty,
        })
    }
}

impl Codegen for RootClass<'_> {
    fn codegen(&self) -> Result<TokenStream, Error> {
        let name = ident(self.0)?;

        Ok(quote! {
            #![doc = #DERIVED_HEADER]

            #[derive(Debug, Clone, Default, PartialEq)]
            pub struct #name;
        })
    }
}

impl Codegen for BaseClassDef {
    fn codegen(&self) -> Result<TokenStream, Error> {
        let name = ident(&self.class_name)?;
        let parent = type_path(&self.parent_class_name)?;
        let wsdl_name = &self.wsdl_name;
        let properties = codegen_all(&self.properties)?;
        let deref = deref_impls(&name, &parent, quote! { parent });

        Ok(quote! {
            #![doc = #BASE_HEADER]

            #[derive(Debug, Clone, Default)]
            pub struct #name {
                pub parent: #parent,
                #(#properties)*
            }

            impl #name {
                pub const WSDL_NAME: &'static str = #wsdl_name;
            }

            #deref
        })
    }
}

impl Codegen for DerivedClassDef {
    fn codegen(&self) -> Result<TokenStream, Error> {
        let name = ident(&self.class_name)?;
        let base = ident(&self.base_class_name)?;
        let deref = deref_impls(&name, &base, quote! { 0 });

        Ok(quote! {
            #![doc = #DERIVED_HEADER]

            #[derive(Debug, Clone, Default)]
            pub struct #name(pub #base);

            impl From<#base> for #name {
                fn from(base: #base) -> Self {
                    Self(base)
                }
            }

            #deref
        })
    }
}

impl Codegen for FunctionDef {
    fn codegen(&self) -> Result<TokenStream, Error> {
        let name = ident(&self.name)?;
        let operation = &self.name;

        let mut parameters = Vec::new();
        let mut arguments = Vec::new();
        for parameter in &self.parameters {
            let argument = ident(&parameter.name)?;
            let ty = parameter.ty.codegen()?;

            parameters.push(quote! { #argument: #ty });
            arguments.push(argument);
        }

        let output = match &self.return_type {
            Some(ty) => {
                let ty = ty.codegen()?;
                quote! { -> #ty }
            }
            None => quote! {},
        };

        let docs = self.exceptions.iter().map(|exception| {
            let doc = format!(" Fails with the `{}` fault.", exception);
            quote! { #[doc = #doc] }
        });

        Ok(quote! {
            #(#docs)*
            pub fn #name(&self, #(#parameters),*) #output {
                self.hooks.before_call(Self::CLASS_NAME, #operation, &(#(&#arguments,)*));
                let result = self.transport.call(#operation, (#(#arguments,)*));
                self.hooks.after_call(Self::CLASS_NAME, #operation, &result);
                result
            }
        })
    }
}

impl Codegen for BaseServiceDef {
    fn codegen(&self) -> Result<TokenStream, Error> {
        let name = ident(&self.name)?;
        let hooks = format_ident!("{}Hooks", name);
        let class_name = &self.name;
        let transport = type_path(&self.parent_transport_class_name)?;
        let functions = codegen_all(self.functions.values())?;

        let wsdl = &self.wsdl_location;
        let service_name = optional_str(self.remote_service_name.as_deref());
        let endpoint = optional_str(self.endpoint.as_deref());
        let namespace = optional_str(self.service_namespace.as_deref());
        let classmap = self
            .classmap
            .iter()
            .map(|(wsdl_name, class_name)| quote! { (#wsdl_name, #class_name) });

        Ok(quote! {
            #![doc = #BASE_HEADER]

            /// Called around every remote call. Implement it on a type of the
            /// derived service and install it with `with_hooks`.
            pub trait #hooks {
                fn before_call(&self, _class: &str, _function: &str, _arguments: &dyn std::fmt::Debug) {}

                fn after_call(&self, _class: &str, _function: &str, _result: &dyn std::fmt::Debug) {}
            }

            impl #hooks for () {}

            pub struct #name {
                transport: #transport,
                hooks: Box<dyn #hooks>,
            }

            impl #name {
                pub const CLASS_NAME: &'static str = #class_name;
                pub const WSDL: &'static str = #wsdl;
                pub const SERVICE_NAME: Option<&'static str> = #service_name;
                pub const ENDPOINT: Option<&'static str> = #endpoint;
                pub const NAMESPACE: Option<&'static str> = #namespace;

                /// WSDL type names and the classes they deserialize into.
                pub const CLASSMAP: &'static [(&'static str, &'static str)] = &[#(#classmap),*];

                pub fn new(transport: #transport) -> Self {
                    Self {
                        transport,
                        hooks: Box::new(()),
                    }
                }

                pub fn with_hooks<H: #hooks + 'static>(mut self, hooks: H) -> Self {
                    self.hooks = Box::new(hooks);
                    self
                }

                pub fn transport(&self) -> &#transport {
                    &self.transport
                }

                /// Sets one SOAP header in the service namespace.
                pub fn set_soap_header(&mut self, key: &str, value: &str) {
                    self.transport.set_headers(Self::NAMESPACE, &[(key, value)]);
                }

                /// Replaces the SOAP headers sent with every call.
                pub fn set_soap_headers(&mut self, headers: &[(&str, &str)]) {
                    self.transport.set_headers(Self::NAMESPACE, headers);
                }

                #(#functions)*
            }
        })
    }
}

impl Codegen for DerivedServiceDef {
    fn codegen(&self) -> Result<TokenStream, Error> {
        let name = ident(&self.name)?;
        let base = ident(&self.base_name)?;
        let deref = deref_impls(&name, &base, quote! { 0 });

        Ok(quote! {
            #![doc = #DERIVED_HEADER]

            pub struct #name(pub #base);

            impl From<#base> for #name {
                fn from(base: #base) -> Self {
                    Self(base)
                }
            }

            #deref
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(base_name: &str, kind: TypeKind, is_array: bool) -> TypeReference {
        TypeReference {
            base_name: base_name.to_owned(),
            kind,
            is_array,
        }
    }

    #[test]
    fn keywords_become_raw_identifiers() {
        assert_eq!(ident("type").unwrap().to_string(), "r#type");
        assert_eq!(ident("order").unwrap().to_string(), "order");
    }

    #[test]
    fn keywords_that_cannot_be_raw_get_a_suffix() {
        assert_eq!(ident("self").unwrap().to_string(), "self_");
        assert_eq!(ident("Self").unwrap().to_string(), "Self_");
        assert_eq!(ident("super").unwrap().to_string(), "super_");
        assert_eq!(ident("crate").unwrap().to_string(), "crate_");
    }

    #[test]
    fn invalid_identifiers_are_rejected() {
        assert!(matches!(ident(""), Err(Error::InvalidIdentifier(_))));
        assert!(matches!(ident("9lives"), Err(Error::InvalidIdentifier(_))));
    }

    #[test]
    fn type_references_map_to_rust_types() {
        let cases = [
            (reference("int", TypeKind::Primitive(Primitive::Integer), false), "i64"),
            (reference("double", TypeKind::Primitive(Primitive::Float), true), "Vec<f64>"),
            (reference("ShopOrder", TypeKind::Complex, false), "Option<Box<ShopOrder>>"),
            (reference("ShopOrder", TypeKind::Complex, true), "Vec<ShopOrder>"),
        ];

        for (reference, expected) in cases {
            let tokens = reference.codegen().unwrap().to_string();
            assert_eq!(tokens.replace(' ', ""), expected);
        }
    }
}
