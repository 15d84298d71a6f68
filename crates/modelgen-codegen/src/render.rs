//! TypeScript module rendering

use crate::naming::{to_constant_name, to_output_type, to_type_name};
use modelgen_core::TableDefinition;

const IMPORT_LINE: &str = "import { Field, FieldImpl, Table, TableImpl } from 'tsooq';\n\n";

/// Escape a value for a single-quoted TypeScript string literal
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Render one table class
fn render_table(table: &TableDefinition) -> String {
    let class_name = to_type_name(&table.table_name);
    let mut s = String::new();

    s.push_str(&format!("export class {} extends TableImpl {{\n", class_name));
    s.push_str(&format!(
        "  private static readonly _TABLE_NAME = '{}';\n",
        quote(&table.table_name)
    ));

    for field in &table.fields {
        let ts_type = to_output_type(&field.data_type);
        s.push_str(&format!(
            "  static readonly {}: Field<{}> = new FieldImpl<{}>({}._TABLE_NAME, {}, '{}', undefined, '{}', {}, {});\n",
            to_constant_name(&field.field_name),
            ts_type,
            ts_type,
            class_name,
            field.ordinal,
            quote(&field.field_name),
            quote(&field.data_type),
            field.is_nullable,
            field.has_default,
        ));
    }

    let field_refs: Vec<String> = table
        .fields
        .iter()
        .map(|f| format!("{}.{}", class_name, to_constant_name(&f.field_name)))
        .collect();
    s.push_str(&format!(
        "  private static readonly _FIELDS: Field<any>[] = [{}];\n\n",
        field_refs.join(", ")
    ));

    s.push_str("  constructor() {\n");
    s.push_str(&format!(
        "    super({}._TABLE_NAME, undefined, {}._FIELDS);\n",
        class_name, class_name
    ));
    s.push_str("  }\n");
    s.push_str("}\n\n");

    s
}

/// Render the `Tables` registry
fn render_registry(tables: &[TableDefinition]) -> String {
    let mut s = String::from("export class Tables {\n");
    for table in tables {
        s.push_str(&format!(
            "  static readonly {}: Table = new {}();\n",
            to_constant_name(&table.table_name),
            to_type_name(&table.table_name)
        ));
    }
    s.push_str("}\n");
    s
}

/// Render the complete module: import, one class per table, then the registry.
///
/// Tables and fields are emitted in the order given; output is a pure
/// function of the input.
pub fn render_module(tables: &[TableDefinition]) -> String {
    let mut s = String::from(IMPORT_LINE);
    for table in tables {
        s.push_str(&render_table(table));
    }
    s.push_str(&render_registry(tables));
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelgen_core::FieldDefinition;
    use pretty_assertions::assert_eq;

    fn order_item() -> TableDefinition {
        TableDefinition::new(
            "public",
            "order_item",
            vec![
                FieldDefinition::new(1, "id", "integer"),
                FieldDefinition::new(2, "qty", "numeric").with_default(true),
                FieldDefinition::new(3, "note", "text").nullable(true),
            ],
        )
    }

    #[test]
    fn renders_order_item_module() {
        let expected = "\
import { Field, FieldImpl, Table, TableImpl } from 'tsooq';

export class OrderItem extends TableImpl {
  private static readonly _TABLE_NAME = 'order_item';
  static readonly ID: Field<number> = new FieldImpl<number>(OrderItem._TABLE_NAME, 1, 'id', undefined, 'integer', false, false);
  static readonly QTY: Field<number> = new FieldImpl<number>(OrderItem._TABLE_NAME, 2, 'qty', undefined, 'numeric', false, true);
  static readonly NOTE: Field<string> = new FieldImpl<string>(OrderItem._TABLE_NAME, 3, 'note', undefined, 'text', true, false);
  private static readonly _FIELDS: Field<any>[] = [OrderItem.ID, OrderItem.QTY, OrderItem.NOTE];

  constructor() {
    super(OrderItem._TABLE_NAME, undefined, OrderItem._FIELDS);
  }
}

export class Tables {
  static readonly ORDER_ITEM: Table = new OrderItem();
}
";
        assert_eq!(render_module(&[order_item()]), expected);
    }

    #[test]
    fn empty_schema_renders_empty_registry() {
        assert_eq!(render_module(&[]), format!("{}export class Tables {{\n}}\n", IMPORT_LINE));
    }

    #[test]
    fn field_order_is_not_resorted() {
        let table = TableDefinition::new(
            "public",
            "t",
            vec![
                FieldDefinition::new(1, "zeta", "text"),
                FieldDefinition::new(2, "alpha", "text"),
            ],
        );

        let module = render_module(&[table]);
        assert!(module.contains("_FIELDS: Field<any>[] = [T.ZETA, T.ALPHA];"));
        assert!(module.find("static readonly ZETA").unwrap() < module.find("static readonly ALPHA").unwrap());
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote("it's"), "it\\'s");
        assert_eq!(quote("a\\b"), "a\\\\b");
    }
}
