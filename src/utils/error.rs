use crate::utils::units::ByteSizeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UsageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unable to determine volume state on volume {volume:?} in project {project:?} with no size config key")]
    MissingVolumeSize { volume: String, project: String },

    #[error("Failed to get root disk size for instance {instance:?} in project {project:?}")]
    MissingRootDiskSize { instance: String, project: String },

    #[error("{context}: invalid size {value:?}: {source}")]
    InvalidSize {
        value: String,
        context: String,
        #[source]
        source: ByteSizeError,
    },

    #[error("Total storage size overflows in project {project:?}")]
    SizeOverflow { project: String },

    #[error("Unexpected instance type {kind:?}")]
    UnexpectedInstanceType { kind: String },

    #[error("Instance {instance:?} in project {project:?} has no {key:?} config, either directly or via a profile")]
    MissingLimit {
        instance: String,
        project: String,
        key: String,
    },

    #[error("Parse {key:?} for instance {instance:?} in project {project:?}: {reason}")]
    InvalidLimit {
        key: String,
        instance: String,
        project: String,
        reason: String,
    },

    #[error("No printer registered for {key:?}")]
    MissingPrinter { key: String },

    #[error("Project store error: {message}")]
    StoreError { message: String },

    #[error("Project {project:?}: failed to {stage}: {source}")]
    Collaborator {
        stage: &'static str,
        project: String,
        #[source]
        source: Box<UsageError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 快照或 CLI 設定錯誤
    Configuration,
    /// 專案資料缺少必要欄位或格式錯誤
    InvalidInput,
    /// 資料模型不一致，通常代表上游資料損毀
    DataCorruption,
    /// 載入、展開或加總等協作元件失敗
    Collaborator,
    /// 程式設定錯誤
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl UsageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            UsageError::IoError(_)
            | UsageError::SerializationError(_)
            | UsageError::TomlError(_)
            | UsageError::ConfigValidationError { .. }
            | UsageError::MissingConfigError { .. }
            | UsageError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            UsageError::MissingVolumeSize { .. }
            | UsageError::MissingRootDiskSize { .. }
            | UsageError::InvalidSize { .. }
            | UsageError::SizeOverflow { .. }
            | UsageError::MissingLimit { .. }
            | UsageError::InvalidLimit { .. } => ErrorCategory::InvalidInput,
            UsageError::UnexpectedInstanceType { .. } => ErrorCategory::DataCorruption,
            UsageError::StoreError { .. } | UsageError::Collaborator { .. } => {
                ErrorCategory::Collaborator
            }
            UsageError::MissingPrinter { .. } => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::InvalidInput => ErrorSeverity::High,
            ErrorCategory::Collaborator => match self {
                UsageError::Collaborator { source, .. } => source.severity(),
                _ => ErrorSeverity::High,
            },
            ErrorCategory::DataCorruption | ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    /// Innermost error, skipping the stage wrappers added by the engine.
    pub fn root_cause(&self) -> &UsageError {
        match self {
            UsageError::Collaborator { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.root_cause() {
            UsageError::IoError(_) => {
                "Check that the snapshot file exists and is readable".to_string()
            }
            UsageError::SerializationError(_) | UsageError::TomlError(_) => {
                "Check the snapshot file syntax".to_string()
            }
            UsageError::ConfigValidationError { field, .. }
            | UsageError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}'", field)
            }
            UsageError::MissingConfigError { field } => format!("Provide a value for '{}'", field),
            UsageError::MissingVolumeSize { volume, .. } => {
                format!("Set the 'size' config key on volume '{}'", volume)
            }
            UsageError::MissingRootDiskSize { instance, .. } => format!(
                "Set a 'size' on the root disk of instance '{}' or one of its profiles",
                instance
            ),
            UsageError::InvalidSize { value, .. } => format!(
                "Use a byte size such as '10GB' or '512MiB' instead of '{}'",
                value
            ),
            UsageError::SizeOverflow { .. } => {
                "Check the project for unrealistically large sizes".to_string()
            }
            UsageError::MissingLimit { instance, key, .. } => {
                format!("Set '{}' on instance '{}' or one of its profiles", key, instance)
            }
            UsageError::InvalidLimit { key, .. } => format!("Fix the value of '{}'", key),
            UsageError::UnexpectedInstanceType { .. } => {
                "The instance database looks inconsistent, inspect the stored instance types"
                    .to_string()
            }
            UsageError::StoreError { .. } | UsageError::Collaborator { .. } => {
                "Retry once the project store is reachable".to_string()
            }
            UsageError::MissingPrinter { .. } => "This is a bug, please report it".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::InvalidInput => format!("Project data is incomplete: {}", self),
            ErrorCategory::DataCorruption => format!("Project data is inconsistent: {}", self),
            ErrorCategory::Collaborator => format!("Unable to read project data: {}", self),
            ErrorCategory::Internal => format!("Internal error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, UsageError>;
