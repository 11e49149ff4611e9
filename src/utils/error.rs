use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Failed to load dataset from '{source_name}': {message}")]
    DatasetLoad {
        source_name: String,
        message: String,
    },

    #[error("Dataset has no '{collection}' collection")]
    MissingCollection { collection: String },

    #[error("Record #{index} in '{collection}' is missing field '{field}'")]
    MissingField {
        collection: String,
        index: usize,
        field: String,
    },

    #[error("Record #{index} in '{collection}' is invalid: {reason}")]
    InvalidRecord {
        collection: String,
        index: usize,
        reason: String,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV writing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Dataset,
    Record,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FlowError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            FlowError::DatasetLoad { .. } | FlowError::MissingCollection { .. } => {
                ErrorCategory::Dataset
            }
            FlowError::MissingField { .. } | FlowError::InvalidRecord { .. } => {
                ErrorCategory::Record
            }
            FlowError::ZipError(_)
            | FlowError::CsvError(_)
            | FlowError::IoError(_)
            | FlowError::SerializationError(_) => ErrorCategory::Output,
            FlowError::ConfigValidationError { .. }
            | FlowError::InvalidConfigValueError { .. }
            | FlowError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單筆記錄錯誤只會跳過該筆
            FlowError::MissingField { .. } | FlowError::InvalidRecord { .. } => ErrorSeverity::Low,
            // 只影響單一圖表
            FlowError::MissingCollection { .. } => ErrorSeverity::Medium,
            FlowError::DatasetLoad { .. }
            | FlowError::ConfigValidationError { .. }
            | FlowError::InvalidConfigValueError { .. }
            | FlowError::MissingConfigError { .. } => ErrorSeverity::High,
            FlowError::ZipError(_)
            | FlowError::CsvError(_)
            | FlowError::IoError(_)
            | FlowError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// Errors that only invalidate a single record and never abort a build.
    pub fn is_record_level(&self) -> bool {
        self.category() == ErrorCategory::Record
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            FlowError::DatasetLoad { source_name, .. } => format!(
                "Check that '{}' is reachable and contains a JSON object",
                source_name
            ),
            FlowError::MissingCollection { collection } => format!(
                "Add a '{}' array to the dataset; the diagram is left empty until then",
                collection
            ),
            FlowError::MissingField { field, .. } => {
                format!("Add '{}' to the record or remove the record", field)
            }
            FlowError::InvalidRecord { .. } => {
                "Fix the record's values; amounts must be non-negative numbers".to_string()
            }
            FlowError::ZipError(_) | FlowError::CsvError(_) | FlowError::IoError(_) => {
                "Check that the output directory is writable and has free space".to_string()
            }
            FlowError::SerializationError(_) => {
                "Report this as a bug; the graph could not be serialized".to_string()
            }
            FlowError::ConfigValidationError { field, .. }
            | FlowError::InvalidConfigValueError { field, .. }
            | FlowError::MissingConfigError { field } => {
                format!("Review the '{}' setting", field)
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Dataset => format!("Could not read the budget dataset: {}", self),
            ErrorCategory::Record => format!("Skipped a record: {}", self),
            ErrorCategory::Output => format!("Could not write diagram output: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_errors_are_low_severity() {
        let err = FlowError::MissingField {
            collection: "student-costs".to_string(),
            index: 3,
            field: "name".to_string(),
        };
        assert!(err.is_record_level());
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(
            err.to_string(),
            "Record #3 in 'student-costs' is missing field 'name'"
        );
    }

    #[test]
    fn test_missing_collection_is_not_fatal_for_the_run() {
        let err = FlowError::MissingCollection {
            collection: "jmu-athletics".to_string(),
        };
        assert!(!err.is_record_level());
        assert_eq!(err.category(), ErrorCategory::Dataset);
        assert!(err.severity() < ErrorSeverity::High);
    }

    #[test]
    fn test_dataset_load_message() {
        let err = FlowError::DatasetLoad {
            source_name: "data/jmu.json".to_string(),
            message: "not found".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.user_friendly_message().contains("data/jmu.json"));
        assert!(err.recovery_suggestion().contains("data/jmu.json"));
    }
}
