//! Construction of the class and service models from a simplified document.

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use wsdlc_wsdl::xml::Element;

use super::{
    context::InterpretationContext,
    model::{
        BaseClassDef, BaseServiceDef, Classmap, DerivedClassDef, DerivedServiceDef, FunctionDef,
        ParameterDef, PropertyDef, TypeReference,
    },
    naming::{self, EntityNames},
    typemap::TypeMapper,
};

const SERVICE_SUFFIX: &str = "Service";

pub struct ModelBuilder<'a> {
    context: &'a mut InterpretationContext,
    types: TypeMapper,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(context: &'a mut InterpretationContext) -> Self {
        let types = TypeMapper::new(context.options.class_namespace.clone());
        Self { context, types }
    }

    /// Registers every `class` and then every `service` of `simplified`.
    ///
    /// The classmap is complete before the first service is built, so all
    /// services of the run share the same one.
    pub fn build(mut self, simplified: &Element) {
        let mut classmap = Classmap::default();
        for class in simplified.descendants("class") {
            self.class(class, &mut classmap);
        }
        self.context.classmap = Arc::new(classmap);

        for service in simplified.descendants("service") {
            self.service(service);
        }

        info!(
            classes = self.context.classes.len(),
            services = self.context.services.len(),
            "built model"
        );
    }

    fn names(&self, wsdl_name: &str) -> EntityNames {
        let options = &self.context.options;
        EntityNames::new(wsdl_name, &options.class_namespace, &options.base_namespace)
    }

    fn class(&mut self, class: &Element, classmap: &mut Classmap) {
        let wsdl_name = class.attribute("name").unwrap_or_default();
        let names = self.names(wsdl_name);

        let parent_class_name = match class
            .descendant("extends")
            .map(|extends| extends.text())
            .filter(|extends| !extends.trim().is_empty())
        {
            Some(extends) => self.names(extends.trim()).base,
            None => self.context.options.root_class.clone(),
        };

        let properties = self
            .typed_entries(class)
            .into_iter()
            .map(|(name, ty)| PropertyDef { name, ty })
            .collect();

        let classes = &mut self.context.classes;
        let id = classes.next_id();

        let base = BaseClassDef {
            id,
            file_name: names.file_name.clone(),
            class_name: names.base.clone(),
            parent_class_name,
            properties,
            wsdl_name: wsdl_name.to_owned(),
        };
        if classes.insert_base(names.base.clone(), base) {
            warn!(class = %names.base, "replacing previously registered class");
        }

        let derived = DerivedClassDef {
            file_name: names.file_name,
            class_name: names.derived.clone(),
            base_class_name: names.base,
            base_id: id,
        };
        if classes.insert_derived(names.derived.clone(), derived) {
            warn!(class = %names.derived, "replacing previously registered class");
        }

        debug!(wsdl_name, class = %names.derived, "registered class");
        classmap.insert(wsdl_name.to_owned(), names.derived);
    }

    fn service(&mut self, service: &Element) {
        let name = service.attribute("name").unwrap_or_default();
        let mut names = self.names(name);

        // Classes and services share the output directories and the namespace.
        if self.context.classes.get(&names.derived).is_some() {
            let renamed = self.names(&format!("{}{}", name, SERVICE_SUFFIX));
            warn!(service = name, renamed = %renamed.derived, "service name clashes with a class, renaming");
            names = renamed;
        }

        let mut functions = IndexMap::new();
        for function in service.descendants("function") {
            let function = self.function(function);
            if functions.insert(function.name.clone(), function).is_some() {
                warn!(service = name, "replacing function with duplicate name");
            }
        }

        let context = &mut *self.context;
        let id = context.services.next_id();

        let base = BaseServiceDef {
            id,
            file_name: names.file_name.clone(),
            name: names.base.clone(),
            parent_transport_class_name: context.options.transport_class.clone(),
            functions,
            wsdl_location: context.wsdl_location.clone(),
            remote_service_name: service.attribute("port").map(ToOwned::to_owned),
            endpoint: service.attribute("location").map(ToOwned::to_owned),
            service_namespace: context.service_namespace.clone(),
            classmap: Arc::clone(&context.classmap),
        };
        if context.services.insert_base(names.base.clone(), base) {
            warn!(service = %names.base, "replacing previously registered service");
        }

        let derived = DerivedServiceDef {
            file_name: names.file_name,
            name: names.derived.clone(),
            base_name: names.base,
            base_id: id,
        };
        if context.services.insert_derived(names.derived.clone(), derived) {
            warn!(service = %names.derived, "replacing previously registered service");
        }

        debug!(service = %names.derived, "registered service");
    }

    fn function(&self, function: &Element) -> FunctionDef {
        let name = naming::normalize(function.attribute("name").unwrap_or_default(), false);
        let mut result = FunctionDef::new(name);

        if let Some(parameters) = function.descendant("parameters") {
            result.parameters = self
                .typed_entries(parameters)
                .into_iter()
                .map(|(name, ty)| ParameterDef { name, ty })
                .collect();
        }

        // Only the first return value and the first exception are kept.
        result.return_type = first_entry(function, "returns")
            .map(|entry| self.types.classify(entry.attribute("type").unwrap_or_default()));

        result.exceptions = first_entry(function, "exceptions")
            .and_then(|entry| entry.attribute("type"))
            .map(|ty| vec![ty.to_owned()])
            .unwrap_or_default();

        result
    }

    /// Descendant `entry` elements keyed by normalized name. A repeated name
    /// keeps its first position and takes the later type.
    fn typed_entries(&self, parent: &Element) -> IndexMap<String, TypeReference> {
        let mut entries = IndexMap::new();

        for entry in parent.descendants("entry") {
            let name = naming::normalize(entry.attribute("name").unwrap_or_default(), false);
            let ty = self.types.classify(entry.attribute("type").unwrap_or_default());
            entries.insert(name, ty);
        }

        entries
    }
}

fn first_entry<'e>(function: &'e Element, wrapper: &str) -> Option<&'e Element> {
    function
        .descendant(wrapper)
        .and_then(|wrapper| wrapper.descendant("entry"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{Entry, Primitive, TypeKind},
        options::Options,
    };
    use wsdlc_wsdl::xml::parse_str;

    const MODEL: &str = r#"<model>
  <class name="Address">
    <entry name="street" type="string"/>
    <entry name="zip-code" type="unsignedInt"/>
  </class>
  <class name="purchaseOrder">
    <extends>Document</extends>
    <entry name="lines" type="ArrayOfOrderLine"/>
    <entry name="total" type="double"/>
    <entry name="shipTo" type="Address"/>
  </class>
  <service name="Echo" port="EchoPort" location="http://localhost/echo">
    <function name="echo">
      <parameters><entry name="msg" type="string"/></parameters>
      <returns><entry name="return" type="string"/></returns>
    </function>
    <function name="fail">
      <exceptions>
        <entry name="invalid" type="InvalidInput"/>
        <entry name="other" type="Other"/>
      </exceptions>
    </function>
  </service>
</model>"#;

    fn build(source: &str) -> InterpretationContext {
        let mut context = InterpretationContext::new(Options::new("Shop", "ShopBase"), "file:///shop.wsdl");
        context.service_namespace = Some("urn:shop".to_owned());
        ModelBuilder::new(&mut context).build(&parse_str(source).unwrap());
        context
    }

    fn base_class<'c>(context: &'c InterpretationContext, name: &str) -> &'c BaseClassDef {
        match context.classes.get(name) {
            Some(Entry::Base(base)) => base,
            other => panic!("expected base class {}, got {:?}", name, other),
        }
    }

    fn base_service<'c>(context: &'c InterpretationContext, name: &str) -> &'c BaseServiceDef {
        match context.services.get(name) {
            Some(Entry::Base(base)) => base,
            other => panic!("expected base service {}, got {:?}", name, other),
        }
    }

    #[test]
    fn classes_are_split_into_derived_and_base() {
        let context = build(MODEL);

        let derived = match context.classes.get("ShopAddress") {
            Some(Entry::Derived(derived)) => derived,
            other => panic!("unexpected entry {:?}", other),
        };
        let base = context.classes.base_of(derived).unwrap();

        assert_eq!(derived.file_name, "Address");
        assert_eq!(base.file_name, "Address");
        assert_eq!(derived.base_class_name, base.class_name);
        assert_eq!(base.class_name, "ShopBaseAddress");
        assert_eq!(base.id, derived.base_id);
    }

    #[test]
    fn parent_class_defaults_to_root_class() {
        let context = build(MODEL);
        assert_eq!(base_class(&context, "ShopBaseAddress").parent_class_name, "ShopWsObject");
    }

    #[test]
    fn extends_resolves_to_base_form() {
        let context = build(MODEL);
        assert_eq!(
            base_class(&context, "ShopBasePurchaseOrder").parent_class_name,
            "ShopBaseDocument"
        );
    }

    #[test]
    fn properties_keep_document_order() {
        let context = build(MODEL);
        let order = base_class(&context, "ShopBasePurchaseOrder");

        let names: Vec<_> = order.properties.iter().map(|property| property.name.as_str()).collect();
        assert_eq!(names, ["lines", "total", "shipTo"]);

        assert_eq!(order.properties[0].ty.to_string(), "ShopOrderLine[]");
        assert_eq!(order.properties[1].ty.kind, TypeKind::Primitive(Primitive::Float));
        assert_eq!(order.properties[2].ty.base_name, "ShopAddress");
    }

    #[test]
    fn property_names_are_normalized_without_camelizing() {
        let context = build(MODEL);
        let address = base_class(&context, "ShopBaseAddress");

        assert_eq!(address.properties[1].name, "zipcode");
        assert_eq!(address.properties[1].ty.kind, TypeKind::Primitive(Primitive::Integer));
    }

    #[test]
    fn repeated_property_replaces_in_place() {
        let context = build(
            r#"<model><class name="Pair">
                <entry name="first" type="string"/>
                <entry name="second" type="string"/>
                <entry name="first" type="int"/>
            </class></model>"#,
        );
        let pair = base_class(&context, "ShopBasePair");

        assert_eq!(pair.properties.len(), 2);
        assert_eq!(pair.properties[0].name, "first");
        assert_eq!(pair.properties[0].ty.base_name, "int");
    }

    #[test]
    fn classmap_maps_wsdl_names_to_derived_classes() {
        let context = build(MODEL);
        let classmap: Vec<_> = context.classmap.iter().collect();

        assert_eq!(
            classmap,
            [("Address", "ShopAddress"), ("purchaseOrder", "ShopPurchaseOrder")]
        );
    }

    #[test]
    fn echo_and_fail_functions() {
        let context = build(MODEL);
        let service = base_service(&context, "ShopBaseEcho");

        assert_eq!(service.functions.len(), 2);

        let echo = &service.functions["echo"];
        assert_eq!(echo.parameters.len(), 1);
        assert_eq!(echo.parameters[0].name, "msg");
        assert_eq!(echo.parameters[0].ty.kind, TypeKind::Primitive(Primitive::String));
        assert_eq!(echo.return_type.as_ref().map(ToString::to_string).as_deref(), Some("string"));
        assert!(echo.exceptions.is_empty());

        let fail = &service.functions["fail"];
        assert!(fail.parameters.is_empty());
        assert!(fail.return_type.is_none());
        assert_eq!(fail.exceptions, ["InvalidInput"]);
    }

    #[test]
    fn services_carry_run_information() {
        let context = build(MODEL);
        let service = base_service(&context, "ShopBaseEcho");

        assert_eq!(service.parent_transport_class_name, "SoapClient");
        assert_eq!(service.wsdl_location, "file:///shop.wsdl");
        assert_eq!(service.remote_service_name.as_deref(), Some("EchoPort"));
        assert_eq!(service.endpoint.as_deref(), Some("http://localhost/echo"));
        assert_eq!(service.service_namespace.as_deref(), Some("urn:shop"));
        assert!(Arc::ptr_eq(&service.classmap, &context.classmap));

        match context.services.get("ShopEcho") {
            Some(Entry::Derived(derived)) => assert_eq!(derived.base_name, "ShopBaseEcho"),
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn classmap_is_shared_by_every_service() {
        let context = build(
            r#"<model>
                <class name="Item"/>
                <service name="First"/>
                <service name="Second"/>
            </model>"#,
        );

        let first = base_service(&context, "ShopBaseFirst");
        let second = base_service(&context, "ShopBaseSecond");

        assert!(Arc::ptr_eq(&first.classmap, &second.classmap));
        assert_eq!(first.classmap.get("Item"), Some("ShopItem"));
    }

    #[test]
    fn services_named_like_a_class_are_renamed() {
        let context = build(
            r#"<model>
                <class name="Calc"><entry name="total" type="double"/></class>
                <service name="Calc"><function name="add"/></service>
            </model>"#,
        );

        assert_eq!(base_class(&context, "ShopBaseCalc").file_name, "Calc");

        let service = base_service(&context, "ShopBaseCalcService");
        assert_eq!(service.file_name, "CalcService");
        assert!(context.services.get("ShopCalc").is_none());

        match context.services.get("ShopCalcService") {
            Some(Entry::Derived(derived)) => {
                assert_eq!(derived.file_name, "CalcService");
                assert_eq!(derived.base_name, "ShopBaseCalcService");
            }
            other => panic!("unexpected entry {:?}", other),
        }
    }

    #[test]
    fn colliding_class_names_keep_the_last() {
        let context = build(
            r#"<model>
                <class name="order"><entry name="a" type="string"/></class>
                <class name="Order"><entry name="b" type="string"/></class>
            </model>"#,
        );

        assert_eq!(context.classes.len(), 2);
        let order = base_class(&context, "ShopBaseOrder");
        assert_eq!(order.properties[0].name, "b");
        assert_eq!(order.wsdl_name, "Order");
    }

    #[test]
    fn colliding_function_names_keep_the_last() {
        let context = build(
            r#"<model><service name="S">
                <function name="get"><returns><entry name="r" type="string"/></returns></function>
                <function name="get"><returns><entry name="r" type="int"/></returns></function>
            </service></model>"#,
        );
        let service = base_service(&context, "ShopBaseS");

        assert_eq!(service.functions.len(), 1);
        assert_eq!(service.functions["get"].return_type.as_ref().unwrap().base_name, "int");
    }

    #[test]
    fn building_twice_is_deterministic() {
        let first = build(MODEL);
        let second = build(MODEL);

        assert_eq!(first.classes, second.classes);
        assert_eq!(first.services, second.services);
        assert_eq!(first.classmap, second.classmap);
    }
}
