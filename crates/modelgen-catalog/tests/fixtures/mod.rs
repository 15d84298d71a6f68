//! Test fixtures for catalog adapter integration tests
//!
//! Table definitions as `information_schema` reports them for small,
//! realistic schemas.

use modelgen_core::{FieldDefinition, TableDefinition};

/// DDL for the order_item table used across tests
pub const ORDER_ITEM_DDL: &str = "CREATE TABLE order_item (
    id integer NOT NULL,
    qty numeric NOT NULL DEFAULT 1,
    note text NULL
);";

/// Catalog view of `ORDER_ITEM_DDL`
pub fn order_item_table() -> TableDefinition {
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

/// A customers table whose columns are deliberately not in name order
pub fn customer_table() -> TableDefinition {
    TableDefinition::new(
        "public",
        "customer",
        vec![
            FieldDefinition::new(1, "id", "integer").with_default(true),
            FieldDefinition::new(2, "name", "character varying"),
            FieldDefinition::new(3, "created_at", "timestamp without time zone").with_default(true),
            FieldDefinition::new(4, "birthday", "date").nullable(true),
        ],
    )
}
