use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("schema: {0} must be a list")]
    NotAList(&'static str),

    #[error("schema: {field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("schema: {0}")]
    Invalid(#[from] serde_json::Error),
}
