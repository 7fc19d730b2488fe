//! Catalog metadata reading
//!
//! This module provides access to the database's catalog views describing
//! tables, columns, routines, and parameters. Each supported database has
//! its own feature-gated submodule.

use crate::prelude::{ColumnInfo, ParameterInfo, SqlSharpError};

/// Trait for catalog reader implementations
///
/// All listings come back in a stable order: entities by name, fields by
/// catalog ordinal position. Any query failure aborts the run.
pub trait Catalog {
    /// List base table names (views excluded)
    fn list_tables(&mut self) -> Result<Vec<String>, SqlSharpError>;

    /// List a table's columns in ordinal order
    fn list_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>, SqlSharpError>;

    /// List stored procedure names
    fn list_procedures(&mut self) -> Result<Vec<String>, SqlSharpError>;

    /// List a procedure's parameters in ordinal order, partitioned into
    /// (inputs, outputs)
    fn list_parameters(
        &mut self,
        procedure: &str,
    ) -> Result<(Vec<ParameterInfo>, Vec<ParameterInfo>), SqlSharpError>;
}

/// Strip the bound-variable sigil from a catalog parameter name.
///
/// SQL Server catalogs report parameter names with a leading `@`; other
/// engines report them bare.
pub fn strip_parameter_sigil(name: &str) -> &str {
    name.strip_prefix('@').unwrap_or(name)
}

// Feature-gated database implementations
#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::PostgresCatalog;
