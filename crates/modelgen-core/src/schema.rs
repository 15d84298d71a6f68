//! Catalog metadata types

use serde::{Deserialize, Serialize};

/// A column as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// 1-based position assigned by the catalog
    pub ordinal: u32,

    /// Column name
    pub field_name: String,

    /// Catalog type name (e.g. "integer", "character varying")
    pub data_type: String,

    /// Whether the column accepts NULL
    pub is_nullable: bool,

    /// Whether the column has a default expression
    pub has_default: bool,
}

impl FieldDefinition {
    /// Create a non-nullable column without a default
    pub fn new(ordinal: u32, field_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            ordinal,
            field_name: field_name.into(),
            data_type: data_type.into(),
            is_nullable: false,
            has_default: false,
        }
    }

    /// Set nullability
    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// Set whether a default expression exists
    pub fn with_default(mut self, has_default: bool) -> Self {
        self.has_default = has_default;
        self
    }
}

/// A base table and its columns in catalog ordinal order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Schema the table lives in
    pub schema_name: String,

    /// Table name, unique within the schema
    pub table_name: String,

    /// Columns, in the order the catalog reported them
    pub fields: Vec<FieldDefinition>,
}

impl TableDefinition {
    pub fn new(
        schema_name: impl Into<String>,
        table_name: impl Into<String>,
        fields: Vec<FieldDefinition>,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            table_name: table_name.into(),
            fields,
        }
    }

    /// Get a field by name
    pub fn find_field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    /// Get field names in emission order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field_name.as_str()).collect()
    }

    /// `schema.table`
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_builder() {
        let field = FieldDefinition::new(2, "qty", "numeric").with_default(true);
        assert_eq!(field.ordinal, 2);
        assert!(!field.is_nullable);
        assert!(field.has_default);
    }

    #[test]
    fn table_keeps_field_order() {
        let table = TableDefinition::new(
            "public",
            "order_item",
            vec![
                FieldDefinition::new(1, "id", "integer"),
                FieldDefinition::new(2, "qty", "numeric"),
                FieldDefinition::new(3, "note", "text").nullable(true),
            ],
        );

        assert_eq!(table.field_names(), vec!["id", "qty", "note"]);
        assert_eq!(table.qualified_name(), "public.order_item");
        assert!(table.find_field("note").unwrap().is_nullable);
        assert!(table.find_field("missing").is_none());
    }
}
