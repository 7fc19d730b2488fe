//! SQL to C# type mapping
//!
//! A fixed lookup table plus the two nullable-suffix rules. The table flow
//! and the procedure flow annotate nullability differently; both rules are
//! kept separate on purpose.

/// Map a catalog type name to its base C# type.
///
/// Unrecognized names fall back to `object` rather than failing. Keys
/// cover both SQL Server catalog spellings and the ANSI information-schema
/// spellings an equivalent catalog reports.
fn base_type(sql_type: &str) -> &'static str {
    match sql_type.to_lowercase().as_str() {
        "int" | "integer" | "int4" => "int",
        "bigint" | "int8" => "long",
        "smallint" | "int2" => "short",
        "tinyint" => "byte",
        "bit" | "boolean" | "bool" => "bool",
        "decimal" | "numeric" => "decimal",
        "float" | "real" | "double precision" => "float",
        "datetime" | "smalldatetime" | "date" | "timestamp without time zone"
        | "timestamp with time zone" => "DateTime",
        "char" | "varchar" | "text" | "nchar" | "nvarchar" | "ntext" | "character"
        | "character varying" => "string",
        _ => "object",
    }
}

/// Map a table column's type, applying the table-flow nullability rule.
///
/// The `?` suffix goes on nullable columns when `use_nullable_types` is
/// set, except on `string`, which stays bare. `max_length` is part of the
/// column contract but does not influence this path.
pub fn table_type(
    sql_type: &str,
    _max_length: i32,
    nullable: bool,
    use_nullable_types: bool,
) -> String {
    let cs_type = base_type(sql_type);
    if nullable && cs_type != "string" && use_nullable_types {
        format!("{}?", cs_type)
    } else {
        cs_type.to_string()
    }
}

/// Map a procedure parameter's type, applying the parameter-flow
/// nullability rule.
///
/// Only unbounded text gets the `?` suffix: the mapped type must be
/// `string` and the catalog must report no character length. This rule
/// deliberately differs from [`table_type`]'s.
pub fn parameter_type(sql_type: &str, max_length: i32) -> String {
    let cs_type = base_type(sql_type);
    if cs_type == "string" && max_length <= 0 {
        format!("{}?", cs_type)
    } else {
        cs_type.to_string()
    }
}
