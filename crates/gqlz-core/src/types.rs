//! Core types for GQLZ

use serde::{Deserialize, Serialize};

/// One row returned by the SQL endpoint. The gateway renders every cell as
/// text, with SQL NULL as JSON null.
pub type SqlRow = Vec<Option<String>>;

/// Payload of a successful SQL query.
///
/// The first row is the column header row; it is kept in `rows` as-is and is
/// not separated from the data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "resultKind", rename_all = "camelCase")]
pub enum SqlPayload {
    Rows { rows: Vec<SqlRow> },
}

impl SqlPayload {
    pub fn result_kind(&self) -> &'static str {
        match self {
            SqlPayload::Rows { .. } => "rows",
        }
    }

    pub fn rows(&self) -> &[SqlRow] {
        match self {
            SqlPayload::Rows { rows } => rows,
        }
    }

    /// Number of rows including the header row
    pub fn row_count(&self) -> usize {
        self.rows().len()
    }
}

/// Options for a raw SQL request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlOptions {
    /// Allow statements that write. Requests are read-only unless set.
    pub allow_mutations: bool,
}

impl SqlOptions {
    pub fn read_only() -> Self {
        Self::default()
    }

    pub fn allowing_mutations() -> Self {
        Self {
            allow_mutations: true,
        }
    }
}

/// Variables passed alongside a GraphQL query
pub type GraphQlVariables = serde_json::Map<String, serde_json::Value>;
