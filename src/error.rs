use thiserror::Error;

/// sqlsharp errors
#[derive(Error, Debug)]
pub enum SqlSharpError {
    #[error("Failed to connect to database: {0}")]
    Connection(String),

    #[error("Catalog query failed for '{entity}': {message}")]
    Catalog { entity: String, message: String },

    #[error("Rendering failed for class '{class}': {message}")]
    Render { class: String, message: String },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
