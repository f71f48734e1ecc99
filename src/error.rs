use thiserror::Error;

pub type GanttResult<T> = Result<T, GanttError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GanttError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("structural error at node `{id}`: {reason}")]
    Structural { id: String, reason: String },

    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("json contract error: {0}")]
    Json(String),
}

impl GanttError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn structural(id: impl ToString, reason: impl Into<String>) -> Self {
        Self::Structural {
            id: id.to_string(),
            reason: reason.into(),
        }
    }

    /// Coarse classification used when a failure is captured as a row fault.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Structural { .. } => ErrorKind::Structural,
            Self::InvalidViewport { .. } | Self::InvalidData(_) | Self::Json(_) => {
                ErrorKind::InvalidData
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Structural,
    InvalidData,
}
