/// Root class name appended to the class namespace when none is configured.
pub const DEFAULT_ROOT_CLASS: &str = "WsObject";

/// Transport class generated service bases are built on when none is configured.
pub const DEFAULT_TRANSPORT_CLASS: &str = "SoapClient";

/// Inputs of one interpretation run besides the WSDL location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub class_namespace: String,
    pub base_namespace: String,
    /// Parent of generated base classes that declare no `extends`.
    pub root_class: String,
    /// Parent of generated service base classes.
    pub transport_class: String,
}

impl Options {
    pub fn new<C: Into<String>, B: Into<String>>(class_namespace: C, base_namespace: B) -> Self {
        let class_namespace = class_namespace.into();

        Self {
            root_class: format!("{}{}", class_namespace, DEFAULT_ROOT_CLASS),
            class_namespace,
            base_namespace: base_namespace.into(),
            transport_class: DEFAULT_TRANSPORT_CLASS.to_owned(),
        }
    }

    pub fn with_root_class<S: Into<String>>(mut self, root_class: S) -> Self {
        self.root_class = root_class.into();
        self
    }

    pub fn with_transport_class<S: Into<String>>(mut self, transport_class: S) -> Self {
        self.transport_class = transport_class.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_class_namespace() {
        let options = Options::new("Shop", "ShopBase");

        assert_eq!(options.root_class, "ShopWsObject");
        assert_eq!(options.transport_class, "SoapClient");
    }

    #[test]
    fn overrides_replace_defaults() {
        let options = Options::new("Shop", "ShopBase")
            .with_root_class("Entity")
            .with_transport_class("HttpTransport");

        assert_eq!(options.root_class, "Entity");
        assert_eq!(options.transport_class, "HttpTransport");
    }
}
