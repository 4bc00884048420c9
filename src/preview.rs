//! The baseline schema as seen through a pending plan.

use crate::plan::{Plan, RenameOperation};
use crate::schema::BaselineSchema;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaPreview {
    pub tables: Vec<TablePreview>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TablePreview {
    pub original: String,
    pub name: String,
    pub schema_name: Option<String>,
    pub renamed: bool,
    pub columns: Vec<ColumnPreview>,
    pub indexes: Vec<IndexPreview>,
    pub foreign_keys: Vec<ForeignKeyPreview>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPreview {
    /// `None` for columns added by the plan.
    pub original: Option<String>,
    pub name: String,
    pub sql_type: String,
    pub nullable: bool,
    pub is_pk: bool,
    pub is_fk: bool,
    pub renamed: bool,
    pub retyped: bool,
    pub added: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexPreview {
    pub is_primary: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyPreview {
    pub column_name: String,
    pub references_table: String,
    pub references_column: String,
}

impl TablePreview {
    pub fn column(&self, name: &str) -> Option<&ColumnPreview> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl SchemaPreview {
    pub fn table(&self, name: &str) -> Option<&TablePreview> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Current name of `table`.`column` under `plan`.
fn column_name<'a>(plan: &'a Plan, table: &str, column: &'a str) -> &'a str {
    plan.column_edit(table, column)
        .and_then(RenameOperation::renamed_column)
        .unwrap_or(column)
}

fn table_name<'a>(plan: &'a Plan, table: &'a str) -> &'a str {
    plan.table_rename(table).unwrap_or(table)
}

/// Apply `plan` to `schema` without touching either.
///
/// Operations naming tables or columns absent from the baseline are ignored,
/// except add-column entries on known tables, which are appended in plan order.
pub fn preview(schema: &BaselineSchema, plan: &Plan) -> SchemaPreview {
    let tables = schema
        .tables
        .iter()
        .map(|t| {
            let mut columns: Vec<ColumnPreview> = t
                .columns
                .iter()
                .map(|c| {
                    let new_type = match plan.column_edit(&t.name, &c.name) {
                        Some(RenameOperation::ColumnEdit { new_type, .. }) => new_type.as_deref(),
                        _ => None,
                    };
                    let name = column_name(plan, &t.name, &c.name);
                    ColumnPreview {
                        original: Some(c.name.clone()),
                        name: name.to_string(),
                        sql_type: new_type.unwrap_or(&c.sql_type).to_string(),
                        nullable: c.nullable,
                        is_pk: t.primary_key().contains(&c.name),
                        is_fk: t.is_foreign_key(&c.name),
                        renamed: name != c.name,
                        retyped: new_type.is_some_and(|ty| ty != c.sql_type),
                        added: false,
                    }
                })
                .collect();

            columns.extend(plan.added_columns(&t.name).filter_map(|op| match op {
                RenameOperation::AddColumn {
                    column_to,
                    new_type,
                    ..
                } => Some(ColumnPreview {
                    original: None,
                    name: column_to.clone(),
                    sql_type: new_type.clone(),
                    nullable: true,
                    is_pk: false,
                    is_fk: false,
                    renamed: false,
                    retyped: false,
                    added: true,
                }),
                _ => None,
            }));

            let indexes = t
                .indexes
                .iter()
                .map(|i| IndexPreview {
                    is_primary: i.is_primary,
                    columns: i
                        .columns
                        .iter()
                        .map(|c| column_name(plan, &t.name, c).to_string())
                        .collect(),
                })
                .collect();

            let foreign_keys = t
                .foreign_keys
                .iter()
                .map(|fk| ForeignKeyPreview {
                    column_name: column_name(plan, &t.name, &fk.column_name).to_string(),
                    references_table: table_name(plan, &fk.references_table).to_string(),
                    references_column: column_name(plan, &fk.references_table, &fk.references_column)
                        .to_string(),
                })
                .collect();

            let name = table_name(plan, &t.name);
            TablePreview {
                original: t.name.clone(),
                name: name.to_string(),
                schema_name: t.schema_name.clone(),
                renamed: name != t.name,
                columns,
                indexes,
                foreign_keys,
            }
        })
        .collect();

    SchemaPreview { tables }
}
