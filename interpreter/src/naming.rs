//! Identifier normalization for names taken from WSDL documents.

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c >= '\u{7f}'
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// Strips everything that cannot appear in an identifier.
///
/// Leading characters that cannot start an identifier are dropped first, then
/// any remaining character that cannot appear in one. Non-ASCII characters are
/// always kept. With `camelize` the first character is upper-cased. Never
/// fails; fully invalid input yields an empty string.
pub fn normalize(name: &str, camelize: bool) -> String {
    let value: String = name
        .trim_start_matches(|c: char| !is_identifier_start(c))
        .chars()
        .filter(|c| is_identifier_part(*c))
        .collect();

    if camelize {
        capitalize(&value)
    } else {
        value
    }
}

/// Upper-cases the first character if it is an ASCII letter.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();

    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Names under which one WSDL entity is generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNames {
    pub file_name: String,
    pub derived: String,
    pub base: String,
}

impl EntityNames {
    pub fn new(wsdl_name: &str, class_namespace: &str, base_namespace: &str) -> Self {
        let file_name = normalize(wsdl_name, true);

        Self {
            derived: format!("{}{}", class_namespace, file_name),
            base: format!("{}{}", base_namespace, file_name),
            file_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_invalid_leading_characters() {
        assert_eq!(normalize("123abc", false), "abc");
        assert_eq!(normalize("--_private", false), "_private");
        assert_eq!(normalize("9_9", false), "_9");
    }

    #[test]
    fn strips_invalid_inner_characters() {
        assert_eq!(normalize("get-Order.Status", false), "getOrderStatus");
        assert_eq!(normalize("tns:Order", false), "tnsOrder");
        assert_eq!(normalize("a b\tc", false), "abc");
    }

    #[test]
    fn keeps_non_ascii_characters() {
        assert_eq!(normalize("1élément", false), "élément");
        assert_eq!(normalize("größe-2", true), "Größe2");
    }

    #[test]
    fn camelize_uppercases_first_letter_only() {
        assert_eq!(normalize("purchaseOrder", true), "PurchaseOrder");
        assert_eq!(normalize("_order", true), "_order");
        assert_eq!(normalize("élan", true), "élan");
    }

    #[test]
    fn fully_invalid_input_is_empty() {
        assert_eq!(normalize("", false), "");
        assert_eq!(normalize("1234-:.", true), "");
    }

    #[test]
    fn is_idempotent() {
        let inputs = [
            "", "abc", "123abc", "a-b-c", "__x__", "9lives", "tns:Type", "über_Größe", " x y ",
            "ArrayOf_Item", "\u{7f}del", "@#!",
        ];

        for input in inputs {
            for camelize in [false, true] {
                let once = normalize(input, camelize);
                assert_eq!(normalize(&once, camelize), once, "input {:?}", input);
            }
        }
    }

    #[test]
    fn entity_names_share_file_name() {
        let names = EntityNames::new("purchase-order", "Shop", "ShopBase");

        assert_eq!(names.file_name, "Purchaseorder");
        assert_eq!(names.derived, "ShopPurchaseorder");
        assert_eq!(names.base, "ShopBasePurchaseorder");
    }
}
