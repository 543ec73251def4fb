use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Invalid {field} '{value}'. Please select from {allowed}")]
    InvalidValue {
        field: String,
        value: String,
        allowed: String,
    },
}
