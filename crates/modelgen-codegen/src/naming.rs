//! Identifier and type mapping rules
//!
//! These rules decide every name in the generated module, so changing them
//! changes generated code for every user.

/// `order_item` -> `OrderItem`
///
/// Underscores are dropped and the character following each one (and the
/// first character) is uppercased. Everything else is kept verbatim.
pub fn to_type_name(identifier: &str) -> String {
    let mut result = String::with_capacity(identifier.len());
    let mut upper = true;

    for c in identifier.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            result.extend(c.to_uppercase());
            upper = false;
        } else {
            result.push(c);
        }
    }

    result
}

/// `order_item` -> `ORDER_ITEM`
pub fn to_constant_name(identifier: &str) -> String {
    identifier.to_uppercase()
}

/// Map a catalog type name to a TypeScript type.
///
/// Unknown catalog types pass through unchanged.
pub fn to_output_type(catalog_type: &str) -> &str {
    match catalog_type {
        "integer" | "numeric" => "number",
        "character" | "character varying" | "text" => "string",
        "date" | "timestamp without time zone" => "Date",
        other => other,
    }
}
