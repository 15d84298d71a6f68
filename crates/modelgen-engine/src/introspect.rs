//! Schema introspection

use crate::error::PipelineError;
use modelgen_catalog::CatalogAdapter;
use modelgen_core::TableDefinition;

/// Describe every base table of `schema`, sorted by table name.
pub async fn introspect_schema(
    catalog: &dyn CatalogAdapter,
    schema: &str,
) -> Result<Vec<TableDefinition>, PipelineError> {
    let mut names = catalog
        .list_tables(schema)
        .await
        .map_err(PipelineError::Introspection)?;
    names.sort();

    tracing::info!("Found {} table(s) in schema {}", names.len(), schema);

    let mut tables = Vec::with_capacity(names.len());
    for name in &names {
        let table = catalog
            .describe_table(schema, name)
            .await
            .map_err(PipelineError::Introspection)?;
        tracing::debug!("{}: {} column(s)", table.qualified_name(), table.fields.len());
        tables.push(table);
    }

    Ok(tables)
}
