use thiserror::Error;

#[derive(Error, Debug)]
pub enum AisGuardError {
    #[error("Input table is missing required columns: {missing:?}")]
    Schema { missing: Vec<String> },

    #[error("Invalid value {value:?} for field `{field}` at record {record}")]
    InvalidField {
        record: usize,
        field: &'static str,
        value: String,
    },

    #[error("Invalid detection parameter: {0}")]
    InvalidDetectionParameter(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("KML writer error: {0}")]
    Xml(String),
}

impl PartialEq for AisGuardError {
    fn eq(&self, other: &Self) -> bool {
        use AisGuardError::*;
        match (self, other) {
            (Schema { missing: a }, Schema { missing: b }) => a == b,
            (
                InvalidField {
                    record: ra,
                    field: fa,
                    value: va,
                },
                InvalidField {
                    record: rb,
                    field: fb,
                    value: vb,
                },
            ) => ra == rb && fa == fb && va == vb,
            (InvalidDetectionParameter(a), InvalidDetectionParameter(b)) => a == b,
            (Xml(a), Xml(b)) => a == b,

            // wrapped library errors are not comparable: same variant is enough
            (Csv(_), Csv(_)) => true,
            (Io(_), Io(_)) => true,
            (Json(_), Json(_)) => true,

            _ => false,
        }
    }
}
