use postgres::Client;
use tracing::{error, trace};

use super::{strip_parameter_sigil, Catalog};
use crate::prelude::SqlSharpError;
use crate::schema::{ColumnInfo, Direction, ParameterInfo};

/// PostgreSQL catalog reader
///
/// Reads the ANSI information-schema views, scoped to one schema. The
/// client is exclusively owned by the generation run; dropping it closes
/// the connection on every exit path.
pub struct PostgresCatalog<'a> {
    client: &'a mut Client,
    schema: String,
}

impl<'a> PostgresCatalog<'a> {
    pub fn new(client: &'a mut Client, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
        }
    }
}

impl Catalog for PostgresCatalog<'_> {
    fn list_tables(&mut self) -> Result<Vec<String>, SqlSharpError> {
        query_tables(self.client, &self.schema)
    }

    fn list_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>, SqlSharpError> {
        query_columns(self.client, &self.schema, table)
    }

    fn list_procedures(&mut self) -> Result<Vec<String>, SqlSharpError> {
        query_procedures(self.client, &self.schema)
    }

    fn list_parameters(
        &mut self,
        procedure: &str,
    ) -> Result<(Vec<ParameterInfo>, Vec<ParameterInfo>), SqlSharpError> {
        query_parameters(self.client, &self.schema, procedure)
    }
}

/// Query base table names in a schema
fn query_tables(client: &mut Client, schema: &str) -> Result<Vec<String>, SqlSharpError> {
    trace!(schema = ?schema, "Querying tables");

    // information_schema columns are domain types; cast them so the
    // driver sees plain text/int values.
    let sql = r#"
        SELECT table_name::text AS table_name
        FROM information_schema.tables
        WHERE table_schema = $1
            AND table_type = 'BASE TABLE'
        ORDER BY table_name
    "#;

    let rows = client.query(sql, &[&schema]).map_err(|e| {
        error!(schema = ?schema, error = ?e, "Failed to query tables");
        SqlSharpError::Catalog {
            entity: schema.to_string(),
            message: format!("Failed to query tables: {}", e),
        }
    })?;

    let tables = rows.iter().map(|row| row.get("table_name")).collect();
    trace!(tables = ?tables, "Tables found");
    Ok(tables)
}

/// Query a table's columns in ordinal order
fn query_columns(
    client: &mut Client,
    schema: &str,
    table: &str,
) -> Result<Vec<ColumnInfo>, SqlSharpError> {
    trace!(schema = ?schema, table = ?table, "Querying columns");

    let sql = r#"
        SELECT column_name::text AS column_name,
            data_type::text AS data_type,
            character_maximum_length::int AS character_maximum_length,
            is_nullable::text AS is_nullable
        FROM information_schema.columns
        WHERE table_schema = $1
            AND table_name = $2
        ORDER BY ordinal_position
    "#;

    let rows = client.query(sql, &[&schema, &table]).map_err(|e| {
        error!(schema = ?schema, table = ?table, error = ?e, "Failed to query columns");
        SqlSharpError::Catalog {
            entity: table.to_string(),
            message: format!("Failed to query columns for table '{}': {}", table, e),
        }
    })?;

    let mut columns = Vec::with_capacity(rows.len());
    for row in rows {
        let name: String = row.get("column_name");
        let sql_type: String = row.get("data_type");
        let max_length: Option<i32> = row.get("character_maximum_length");
        let is_nullable: String = row.get("is_nullable");

        trace!(
            column = ?name,
            data_type = ?sql_type,
            max_length = ?max_length,
            is_nullable = ?is_nullable,
            "Found column"
        );

        columns.push(ColumnInfo {
            name,
            sql_type,
            max_length: max_length.unwrap_or(-1),
            nullable: is_nullable == "YES",
        });
    }

    Ok(columns)
}

/// Query stored procedure names in a schema
fn query_procedures(client: &mut Client, schema: &str) -> Result<Vec<String>, SqlSharpError> {
    trace!(schema = ?schema, "Querying procedures");

    let sql = r#"
        SELECT routine_name::text AS routine_name
        FROM information_schema.routines
        WHERE routine_schema = $1
            AND routine_type = 'PROCEDURE'
        ORDER BY routine_name
    "#;

    let rows = client.query(sql, &[&schema]).map_err(|e| {
        error!(schema = ?schema, error = ?e, "Failed to query procedures");
        SqlSharpError::Catalog {
            entity: schema.to_string(),
            message: format!("Failed to query procedures: {}", e),
        }
    })?;

    let procedures = rows.iter().map(|row| row.get("routine_name")).collect();
    trace!(procedures = ?procedures, "Procedures found");
    Ok(procedures)
}

/// Query a procedure's parameters in ordinal order, partitioned by
/// direction
fn query_parameters(
    client: &mut Client,
    schema: &str,
    procedure: &str,
) -> Result<(Vec<ParameterInfo>, Vec<ParameterInfo>), SqlSharpError> {
    trace!(schema = ?schema, procedure = ?procedure, "Querying parameters");

    let sql = r#"
        SELECT p.parameter_name::text AS parameter_name,
            p.data_type::text AS data_type,
            p.character_maximum_length::int AS character_maximum_length,
            p.parameter_mode::text AS parameter_mode
        FROM information_schema.parameters p
        JOIN information_schema.routines r ON r.specific_name = p.specific_name
        WHERE r.routine_schema = $1
            AND r.routine_name = $2
        ORDER BY p.ordinal_position
    "#;

    let rows = client.query(sql, &[&schema, &procedure]).map_err(|e| {
        error!(
            schema = ?schema,
            procedure = ?procedure,
            error = ?e,
            "Failed to query parameters"
        );
        SqlSharpError::Catalog {
            entity: procedure.to_string(),
            message: format!(
                "Failed to query parameters for procedure '{}': {}",
                procedure, e
            ),
        }
    })?;

    let mut inputs = Vec::new();
    let mut outputs = Vec::new();
    for row in rows {
        let name: Option<String> = row.get("parameter_name");
        let name = name.ok_or_else(|| SqlSharpError::Catalog {
            entity: procedure.to_string(),
            message: "Procedure has an unnamed parameter".to_string(),
        })?;
        let sql_type: String = row.get("data_type");
        let max_length: Option<i32> = row.get("character_maximum_length");
        let mode: String = row.get("parameter_mode");

        let direction = Direction::from_mode(&mode);
        let parameter = ParameterInfo {
            name: strip_parameter_sigil(&name).to_string(),
            sql_type,
            max_length: max_length.unwrap_or(-1),
            direction,
        };

        trace!(
            parameter = ?parameter.name,
            data_type = ?parameter.sql_type,
            mode = ?mode,
            "Found parameter"
        );

        match direction {
            Direction::Input => inputs.push(parameter),
            Direction::Output => outputs.push(parameter),
        }
    }

    Ok((inputs, outputs))
}
