//! C# class generation
//!
//! Renders one model class per table and request/result classes per stored
//! procedure, then writes them to the configured output directories.

use std::fs;

use minijinja::Environment;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::GeneratorConfig;
use crate::error::SqlSharpError;
use crate::schema::{ColumnInfo, ParameterInfo, Property};
use crate::typemap;

/// Output filename for a table model class
pub fn table_file_name(table: &str) -> String {
    format!("{}.cs", table)
}

/// Output filename for a procedure's request (input) class
pub fn request_file_name(procedure: &str) -> String {
    format!("SqlRequest{}.cs", procedure)
}

/// Output filename for a procedure's result (output) class
pub fn result_file_name(procedure: &str) -> String {
    format!("SqlResult{}.cs", procedure)
}

/// Map table columns to class properties, preserving ordinal order
fn column_properties(columns: &[ColumnInfo], use_nullable_types: bool) -> Vec<Property> {
    columns
        .iter()
        .map(|col| {
            Property::new(
                typemap::table_type(&col.sql_type, col.max_length, col.nullable, use_nullable_types),
                col.name.clone(),
            )
        })
        .collect()
}

/// Map procedure parameters to class properties, preserving ordinal order
fn parameter_properties(parameters: &[ParameterInfo]) -> Vec<Property> {
    parameters
        .iter()
        .map(|param| {
            Property::new(
                typemap::parameter_type(&param.sql_type, param.max_length),
                param.name.clone(),
            )
        })
        .collect()
}

/// C# model class generator
pub struct CsharpGenerator {
    env: Environment<'static>,
}

impl CsharpGenerator {
    pub fn new() -> Self {
        let mut env = Environment::new();
        // Generated files end with a newline, like the templates do.
        env.set_keep_trailing_newline(true);

        env.add_template("table_class", include_str!("templates/table_class.cs.jinja"))
            .expect("Failed to load table class template");
        env.add_template(
            "procedure_class",
            include_str!("templates/procedure_class.cs.jinja"),
        )
        .expect("Failed to load procedure class template");

        Self { env }
    }

    /// Generate one model class file per base table.
    ///
    /// Existing files are overwritten.
    pub fn generate_tables(
        &self,
        catalog: &mut dyn Catalog,
        config: &GeneratorConfig,
    ) -> Result<(), SqlSharpError> {
        info!(output = ?config.table_output_path, "Generating table models");

        fs::create_dir_all(&config.table_output_path)?;
        debug!(path = ?config.table_output_path, "Created output directory");

        let tables = catalog.list_tables()?;
        debug!(count = tables.len(), "Found tables");

        for table in &tables {
            let columns = catalog.list_columns(table)?;
            let properties = column_properties(&columns, config.use_nullable_types);

            let code = self.render_table_class(table, &properties)?;
            let file_path = config.table_output_path.join(table_file_name(table));
            fs::write(&file_path, code)?;
            info!(table = ?table, path = ?file_path, "Generated table model");
        }

        info!(tables = tables.len(), "Table model generation complete");
        Ok(())
    }

    /// Generate request/result class files per stored procedure.
    ///
    /// A procedure yields a request class only when it has input parameters
    /// and a result class only when it has output parameters, so it may
    /// produce zero, one, or two files. Existing files are overwritten.
    pub fn generate_procedures(
        &self,
        catalog: &mut dyn Catalog,
        config: &GeneratorConfig,
    ) -> Result<(), SqlSharpError> {
        info!(
            requests = ?config.input_output_path,
            results = ?config.output_output_path,
            "Generating procedure models"
        );

        fs::create_dir_all(&config.input_output_path)?;
        fs::create_dir_all(&config.output_output_path)?;

        let procedures = catalog.list_procedures()?;
        debug!(count = procedures.len(), "Found procedures");

        for procedure in &procedures {
            let (inputs, outputs) = catalog.list_parameters(procedure)?;

            if !inputs.is_empty() {
                let class_name = format!("{}Input", procedure);
                let properties = parameter_properties(&inputs);
                if let Some(code) = self.render_procedure_class(
                    &class_name,
                    &properties,
                    config.generate_empty_classes,
                )? {
                    let file_path = config.input_output_path.join(request_file_name(procedure));
                    fs::write(&file_path, code)?;
                    info!(procedure = ?procedure, path = ?file_path, "Generated request model");
                }
            }

            if !outputs.is_empty() {
                let class_name = format!("{}Output", procedure);
                let properties = parameter_properties(&outputs);
                if let Some(code) = self.render_procedure_class(
                    &class_name,
                    &properties,
                    config.generate_empty_classes,
                )? {
                    let file_path = config.output_output_path.join(result_file_name(procedure));
                    fs::write(&file_path, code)?;
                    info!(procedure = ?procedure, path = ?file_path, "Generated result model");
                }
            }
        }

        info!(
            procedures = procedures.len(),
            "Procedure model generation complete"
        );
        Ok(())
    }

    /// Render a table model class
    fn render_table_class(
        &self,
        class_name: &str,
        properties: &[Property],
    ) -> Result<String, SqlSharpError> {
        self.render("table_class", class_name, properties)
    }

    /// Render a procedure request/result class.
    ///
    /// Returns `None` when the class would have no properties and empty
    /// classes are not requested.
    fn render_procedure_class(
        &self,
        class_name: &str,
        properties: &[Property],
        generate_empty: bool,
    ) -> Result<Option<String>, SqlSharpError> {
        if properties.is_empty() && !generate_empty {
            debug!(class = ?class_name, "Skipping empty class");
            return Ok(None);
        }

        self.render("procedure_class", class_name, properties)
            .map(Some)
    }

    fn render(
        &self,
        template_name: &str,
        class_name: &str,
        properties: &[Property],
    ) -> Result<String, SqlSharpError> {
        let template =
            self.env
                .get_template(template_name)
                .map_err(|e| SqlSharpError::Render {
                    class: class_name.to_string(),
                    message: format!("Template error: {}", e),
                })?;

        let ctx = minijinja::context! {
            class_name => class_name,
            properties => properties.iter().map(|prop| {
                minijinja::context! {
                    name => &prop.name,
                    cs_type => &prop.cs_type,
                }
            }).collect::<Vec<_>>(),
        };

        template.render(ctx).map_err(|e| SqlSharpError::Render {
            class: class_name.to_string(),
            message: format!("Render error: {}", e),
        })
    }
}

impl Default for CsharpGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Direction;
    use std::path::Path;
    use std::path::PathBuf;

    fn test_config(dir: &Path) -> GeneratorConfig {
        GeneratorConfig {
            server: "localhost".to_string(),
            port: 5432,
            database: "testdb".to_string(),
            username: "testuser".to_string(),
            password: "testpass".to_string(),
            generate_empty_classes: false,
            use_nullable_types: true,
            table_output_path: dir.join("TableModels"),
            input_output_path: dir.join("Requests"),
            output_output_path: dir.join("Results"),
        }
    }

    fn column(name: &str, sql_type: &str, max_length: i32, nullable: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            max_length,
            nullable,
        }
    }

    fn parameter(name: &str, sql_type: &str, max_length: i32, direction: Direction) -> ParameterInfo {
        ParameterInfo {
            name: name.to_string(),
            sql_type: sql_type.to_string(),
            max_length,
            direction,
        }
    }

    /// In-memory catalog over fixed metadata
    struct FixedCatalog {
        tables: Vec<(String, Vec<ColumnInfo>)>,
        procedures: Vec<(String, Vec<ParameterInfo>, Vec<ParameterInfo>)>,
    }

    impl Catalog for FixedCatalog {
        fn list_tables(&mut self) -> Result<Vec<String>, SqlSharpError> {
            Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
        }

        fn list_columns(&mut self, table: &str) -> Result<Vec<ColumnInfo>, SqlSharpError> {
            Ok(self
                .tables
                .iter()
                .find(|(name, _)| name == table)
                .map(|(_, columns)| columns.clone())
                .unwrap_or_default())
        }

        fn list_procedures(&mut self) -> Result<Vec<String>, SqlSharpError> {
            Ok(self
                .procedures
                .iter()
                .map(|(name, _, _)| name.clone())
                .collect())
        }

        fn list_parameters(
            &mut self,
            procedure: &str,
        ) -> Result<(Vec<ParameterInfo>, Vec<ParameterInfo>), SqlSharpError> {
            Ok(self
                .procedures
                .iter()
                .find(|(name, _, _)| name == procedure)
                .map(|(_, inputs, outputs)| (inputs.clone(), outputs.clone()))
                .unwrap_or_default())
        }
    }

    #[test]
    fn test_render_table_class() {
        let generator = CsharpGenerator::new();
        let properties = vec![
            Property::new("int", "Id"),
            Property::new("string", "Name"),
        ];

        let code = generator.render_table_class("Customer", &properties).unwrap();

        assert_eq!(
            code,
            "\npublic partial class Customer\n{\n    public int Id { get; set; }\n    public string Name { get; set; }\n}\n"
        );
    }

    #[test]
    fn test_render_table_class_without_columns() {
        let generator = CsharpGenerator::new();

        let code = generator.render_table_class("Empty", &[]).unwrap();

        assert_eq!(code, "\npublic partial class Empty\n{\n}\n");
    }

    #[test]
    fn test_render_procedure_class_is_sealed() {
        let generator = CsharpGenerator::new();
        let properties = vec![Property::new("int", "CustomerId")];

        let code = generator
            .render_procedure_class("GetCustomerInput", &properties, false)
            .unwrap()
            .unwrap();

        assert_eq!(
            code,
            "\npublic sealed partial class GetCustomerInput\n{\n    public int CustomerId { get; set; }\n}\n"
        );
    }

    #[test]
    fn test_render_procedure_class_suppresses_empty() {
        let generator = CsharpGenerator::new();

        let code = generator.render_procedure_class("NopInput", &[], false).unwrap();

        assert!(code.is_none());
    }

    #[test]
    fn test_render_procedure_class_empty_when_requested() {
        let generator = CsharpGenerator::new();

        let code = generator
            .render_procedure_class("NopInput", &[], true)
            .unwrap()
            .unwrap();

        assert_eq!(code, "\npublic sealed partial class NopInput\n{\n}\n");
    }

    /// Rendering then re-parsing the property declarations recovers the
    /// same (type, name) pairs in the same order.
    #[test]
    fn test_rendered_properties_round_trip() {
        let generator = CsharpGenerator::new();
        let properties = vec![
            Property::new("int", "Id"),
            Property::new("string", "Name"),
        ];

        let code = generator.render_table_class("Customer", &properties).unwrap();

        let parsed: Vec<Property> = code
            .lines()
            .filter_map(|line| {
                let decl = line
                    .trim()
                    .strip_prefix("public ")?
                    .strip_suffix(" { get; set; }")?;
                let (cs_type, name) = decl.split_once(' ')?;
                Some(Property::new(cs_type, name))
            })
            .collect();

        assert_eq!(parsed, properties);
    }

    #[test]
    fn test_file_names() {
        assert_eq!(table_file_name("Customer"), "Customer.cs");
        assert_eq!(request_file_name("GetCustomer"), "SqlRequestGetCustomer.cs");
        assert_eq!(result_file_name("GetCustomer"), "SqlResultGetCustomer.cs");
    }

    #[test]
    fn test_generate_tables_customer_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut catalog = FixedCatalog {
            tables: vec![(
                "Customer".to_string(),
                vec![
                    column("Id", "int", -1, false),
                    column("Email", "nvarchar", 200, true),
                ],
            )],
            procedures: vec![],
        };

        CsharpGenerator::new()
            .generate_tables(&mut catalog, &config)
            .unwrap();

        let code = std::fs::read_to_string(config.table_output_path.join("Customer.cs")).unwrap();
        assert_eq!(
            code,
            "\npublic partial class Customer\n{\n    public int Id { get; set; }\n    public string Email { get; set; }\n}\n"
        );
    }

    #[test]
    fn test_generate_tables_nullable_column_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut catalog = FixedCatalog {
            tables: vec![(
                "Order".to_string(),
                vec![
                    column("Id", "int", -1, false),
                    column("ShippedAt", "datetime", -1, true),
                ],
            )],
            procedures: vec![],
        };

        CsharpGenerator::new()
            .generate_tables(&mut catalog, &config)
            .unwrap();

        let code = std::fs::read_to_string(config.table_output_path.join("Order.cs")).unwrap();
        assert!(code.contains("public DateTime? ShippedAt { get; set; }"));
        assert!(code.contains("public int Id { get; set; }"));
    }

    #[test]
    fn test_generate_tables_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let generator = CsharpGenerator::new();
        let mut catalog = FixedCatalog {
            tables: vec![(
                "Customer".to_string(),
                vec![
                    column("Id", "int", -1, false),
                    column("Email", "nvarchar", 200, true),
                ],
            )],
            procedures: vec![],
        };

        generator.generate_tables(&mut catalog, &config).unwrap();
        let first = std::fs::read(config.table_output_path.join("Customer.cs")).unwrap();

        generator.generate_tables(&mut catalog, &config).unwrap();
        let second = std::fs::read(config.table_output_path.join("Customer.cs")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_procedures_input_only() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut catalog = FixedCatalog {
            tables: vec![],
            procedures: vec![(
                "GetCustomer".to_string(),
                vec![parameter("CustomerId", "int", -1, Direction::Input)],
                vec![],
            )],
        };

        CsharpGenerator::new()
            .generate_procedures(&mut catalog, &config)
            .unwrap();

        let request_path = config.input_output_path.join("SqlRequestGetCustomer.cs");
        let code = std::fs::read_to_string(&request_path).unwrap();
        assert_eq!(
            code,
            "\npublic sealed partial class GetCustomerInput\n{\n    public int CustomerId { get; set; }\n}\n"
        );

        assert!(!config
            .output_output_path
            .join("SqlResultGetCustomer.cs")
            .exists());
    }

    #[test]
    fn test_generate_procedures_both_groups() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut catalog = FixedCatalog {
            tables: vec![],
            procedures: vec![(
                "CreateOrder".to_string(),
                vec![
                    parameter("CustomerId", "int", -1, Direction::Input),
                    parameter("Comment", "nvarchar", -1, Direction::Input),
                ],
                vec![parameter("OrderId", "int", -1, Direction::Output)],
            )],
        };

        CsharpGenerator::new()
            .generate_procedures(&mut catalog, &config)
            .unwrap();

        let request =
            std::fs::read_to_string(config.input_output_path.join("SqlRequestCreateOrder.cs"))
                .unwrap();
        // Unbounded text parameters carry the nullable suffix; ints do not.
        assert_eq!(
            request,
            "\npublic sealed partial class CreateOrderInput\n{\n    public int CustomerId { get; set; }\n    public string? Comment { get; set; }\n}\n"
        );

        let result =
            std::fs::read_to_string(config.output_output_path.join("SqlResultCreateOrder.cs"))
                .unwrap();
        assert_eq!(
            result,
            "\npublic sealed partial class CreateOrderOutput\n{\n    public int OrderId { get; set; }\n}\n"
        );
    }

    #[test]
    fn test_generate_procedures_skips_parameterless() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let mut catalog = FixedCatalog {
            tables: vec![],
            procedures: vec![("Housekeeping".to_string(), vec![], vec![])],
        };

        CsharpGenerator::new()
            .generate_procedures(&mut catalog, &config)
            .unwrap();

        assert!(!config
            .input_output_path
            .join("SqlRequestHousekeeping.cs")
            .exists());
        assert!(!config
            .output_output_path
            .join("SqlResultHousekeeping.cs")
            .exists());
    }

    #[test]
    fn test_generate_tables_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let file_path: PathBuf = config.table_output_path.join("Customer.cs");

        std::fs::create_dir_all(&config.table_output_path).unwrap();
        std::fs::write(&file_path, "stale content").unwrap();

        let mut catalog = FixedCatalog {
            tables: vec![(
                "Customer".to_string(),
                vec![column("Id", "int", -1, false)],
            )],
            procedures: vec![],
        };

        CsharpGenerator::new()
            .generate_tables(&mut catalog, &config)
            .unwrap();

        let code = std::fs::read_to_string(&file_path).unwrap();
        assert!(!code.contains("stale content"));
        assert!(code.contains("public int Id { get; set; }"));
    }
}
