//! Integration tests for writing generated modules

use modelgen_codegen::{emit, output_path, EmitError};
use modelgen_core::{FieldDefinition, TableDefinition};
use pretty_assertions::assert_eq;

fn schema_tables() -> Vec<TableDefinition> {
    vec![
        TableDefinition::new(
            "public",
            "customer",
            vec![
                FieldDefinition::new(1, "id", "integer").with_default(true),
                FieldDefinition::new(2, "name", "character varying"),
                FieldDefinition::new(3, "external_id", "uuid").nullable(true),
            ],
        ),
        TableDefinition::new(
            "public",
            "order_item",
            vec![
                FieldDefinition::new(1, "id", "integer"),
                FieldDefinition::new(2, "qty", "numeric").with_default(true),
                FieldDefinition::new(3, "note", "text").nullable(true),
            ],
        ),
    ]
}

#[test]
fn test_emit_creates_nested_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().join("src").join("generated");

    let path = emit(&schema_tables(), &output_dir, "public").unwrap();

    assert_eq!(path, output_dir.join("public.ts"));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("import { Field, FieldImpl, Table, TableImpl } from 'tsooq';\n"));
    assert!(contents.contains("export class Customer extends TableImpl {"));
    assert!(contents.contains(
        "static readonly EXTERNAL_ID: Field<uuid> = new FieldImpl<uuid>(Customer._TABLE_NAME, 3, 'external_id', undefined, 'uuid', true, false);"
    ));
    assert!(contents.ends_with(
        "export class Tables {\n  static readonly CUSTOMER: Table = new Customer();\n  static readonly ORDER_ITEM: Table = new OrderItem();\n}\n"
    ));
}

#[test]
fn test_emit_is_byte_identical_across_runs() {
    let dir = tempfile::tempdir().unwrap();

    let path = emit(&schema_tables(), dir.path(), "public").unwrap();
    let first = std::fs::read(&path).unwrap();

    emit(&schema_tables(), dir.path(), "public").unwrap();
    let second = std::fs::read(&path).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_emit_leaves_no_temporary_files() {
    let dir = tempfile::tempdir().unwrap();
    emit(&schema_tables(), dir.path(), "public").unwrap();

    let entries: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["public.ts"]);
}

#[test]
fn test_emit_into_unwritable_dir_fails_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, "plain file").unwrap();
    let output_dir = blocker.join("generated");

    let result = emit(&schema_tables(), &output_dir, "public");

    assert!(matches!(result, Err(EmitError::CreateDir { .. })));
    assert!(!output_path(&output_dir, "public").exists());
}

#[test]
fn test_emit_fails_when_target_is_a_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("public.ts")).unwrap();

    let result = emit(&schema_tables(), dir.path(), "public");

    assert!(matches!(result, Err(EmitError::Write { .. })));
    assert!(!dir.path().join(".public.ts.tmp").exists());
}
