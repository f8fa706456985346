use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    Config { field: String, message: String },

    #[error("Record has no field {field:?}")]
    MissingField { field: String },

    #[error("Field {field:?} does not hold text")]
    FieldType { field: String },

    #[error("Cannot parse {value:?} in field {field:?} as an identifier")]
    ParseId { field: String, value: String },

    #[error("Insert into {table:?} failed: {message}")]
    Insert { table: String, message: String },

    #[error("Remote service returned {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Stage worker failed: {message}")]
    Worker { message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;
