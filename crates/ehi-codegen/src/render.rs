//! Typed row struct rendering.
//!
//! One struct per physical table, every column a nullable scalar chosen
//! from the schema catalog, with a `from_row` constructor going through
//! the runtime guard. The cheapest ColumnSafety layer: a reference to a
//! nonexistent column fails at edit time, before the code ever runs.

use std::fmt::Write as _;

use ehi_store::{ColumnType, SchemaCatalog, TableSchema};

/// Rust keywords a column name may collide with after snake-casing.
const KEYWORDS: [&str; 14] = [
    "as", "else", "fn", "if", "impl", "in", "let", "loop", "match", "mod", "move", "ref", "type",
    "use",
];

fn field_ident(column: &str) -> String {
    let mut ident = String::with_capacity(column.len());
    for ch in column.chars() {
        if ch.is_ascii_alphanumeric() {
            ident.push(ch.to_ascii_lowercase());
        } else {
            ident.push('_');
        }
    }
    if ident.chars().next().map(|ch| ch.is_ascii_digit()).unwrap_or(true) {
        ident.insert(0, '_');
    }
    if KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

fn struct_ident(table: &str) -> String {
    let mut ident = String::with_capacity(table.len());
    let mut upper_next = true;
    for ch in table.chars() {
        if ch.is_ascii_alphanumeric() {
            if upper_next {
                ident.push(ch.to_ascii_uppercase());
            } else {
                ident.push(ch.to_ascii_lowercase());
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    if ident.chars().next().map(|ch| ch.is_ascii_digit()).unwrap_or(true) {
        ident.insert(0, 'T');
    }
    ident.push_str("Row");
    ident
}

fn field_type(column_type: ColumnType) -> &'static str {
    match column_type {
        ColumnType::Text | ColumnType::Datetime => "Option<String>",
        ColumnType::Integer => "Option<i64>",
        ColumnType::Float => "Option<f64>",
    }
}

fn field_reader(column: &str, column_type: ColumnType) -> String {
    match column_type {
        ColumnType::Text | ColumnType::Datetime => {
            format!("row.get(\"{column}\")?.as_str().map(str::to_string)")
        }
        ColumnType::Integer => {
            format!("row.get(\"{column}\")?.as_number().map(|number| number as i64)")
        }
        ColumnType::Float => format!("row.get(\"{column}\")?.as_number()"),
    }
}

/// Render the struct and guard-backed constructor for one table.
pub fn render_table(schema: &TableSchema) -> String {
    let name = struct_ident(&schema.table);
    let mut out = String::new();
    let _ = writeln!(out, "/// Row of `{}`.", schema.table);
    let _ = writeln!(out, "#[derive(Debug, Clone, Default)]");
    let _ = writeln!(out, "pub struct {name} {{");
    for column in &schema.columns {
        let _ = writeln!(
            out,
            "    pub {}: {},",
            field_ident(&column.name),
            field_type(column.data_type)
        );
    }
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "impl {name} {{");
    let _ = writeln!(out, "    pub const TABLE: &'static str = \"{}\";", schema.table);
    let column_list = schema
        .columns
        .iter()
        .map(|column| format!("\"{}\"", column.name))
        .collect::<Vec<_>>()
        .join(", ");
    let _ = writeln!(
        out,
        "    pub const COLUMNS: &'static [&'static str] = &[{column_list}];"
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "    pub fn from_row(row: &GuardedRow<'_>) -> Result<Self> {{"
    );
    let _ = writeln!(out, "        Ok(Self {{");
    for column in &schema.columns {
        let _ = writeln!(
            out,
            "            {}: {},",
            field_ident(&column.name),
            field_reader(&column.name, column.data_type)
        );
    }
    let _ = writeln!(out, "        }})");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
    out
}

/// Render the whole generated module, one struct per catalog table, in
/// catalog (name) order.
pub fn render_module(catalog: &SchemaCatalog) -> String {
    let mut out = String::new();
    out.push_str("//! Generated from the export schema catalog. Do not edit.\n");
    out.push('\n');
    out.push_str("use ehi_hydrate::GuardedRow;\n");
    out.push_str("use ehi_model::Result;\n");
    for schema in catalog.tables() {
        out.push('\n');
        out.push_str(&render_table(schema));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ehi_store::ColumnInfo;

    fn schema() -> TableSchema {
        TableSchema {
            table: "ORDER_RESULTS".to_string(),
            columns: vec![
                ColumnInfo {
                    name: "ORDER_ID".to_string(),
                    data_type: ColumnType::Integer,
                    note: None,
                },
                ColumnInfo {
                    name: "ORD_NUM_VALUE".to_string(),
                    data_type: ColumnType::Float,
                    note: None,
                },
                ColumnInfo {
                    name: "COMPONENT_NAME".to_string(),
                    data_type: ColumnType::Text,
                    note: None,
                },
                ColumnInfo {
                    name: "RESULT_TIME".to_string(),
                    data_type: ColumnType::Datetime,
                    note: None,
                },
            ],
        }
    }

    #[test]
    fn renders_nullable_scalar_per_column() {
        let source = render_table(&schema());
        assert!(source.contains("pub struct OrderResultsRow {"));
        assert!(source.contains("pub order_id: Option<i64>,"));
        assert!(source.contains("pub ord_num_value: Option<f64>,"));
        assert!(source.contains("pub component_name: Option<String>,"));
        assert!(source.contains("pub result_time: Option<String>,"));
        assert!(source.contains("pub const TABLE: &'static str = \"ORDER_RESULTS\";"));
        assert!(source.contains("row.get(\"ORD_NUM_VALUE\")?.as_number()"));
    }

    #[test]
    fn identifiers_sanitize_digits_and_keywords() {
        assert_eq!(field_ident("TYPE"), "type_");
        assert_eq!(field_ident("2ND_LINE"), "_2nd_line");
        assert_eq!(struct_ident("PATIENT_3"), "Patient3Row");
    }

    #[test]
    fn module_rendering_is_deterministic() {
        let catalog = SchemaCatalog::new(vec![schema()]);
        assert_eq!(render_module(&catalog), render_module(&catalog));
        assert!(render_module(&catalog).starts_with("//! Generated"));
    }
}
