use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline stage a fatal error surfaced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collect,
    Normalize,
    Snapshot,
    Load,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Collect => "collect",
            Stage::Normalize => "normalize",
            Stage::Snapshot => "snapshot",
            Stage::Load => "load",
        };
        write!(f, "{}", name)
    }
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response for {location}: {message}")]
    MalformedResponse { location: String, message: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing required data: {0}")]
    MissingData(String),
}

impl PipelineError {
    /// Tag an error with the stage it aborted.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            already @ PipelineError::Stage { .. } => already,
            other => PipelineError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Extension for attaching a [`Stage`] to a fallible result.
pub trait StageExt<T> {
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|e| e.in_stage(stage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wrapping_names_the_stage() {
        let err = PipelineError::MissingData("current".to_string()).in_stage(Stage::Collect);
        assert_eq!(err.stage(), Some(Stage::Collect));
        assert_eq!(
            err.to_string(),
            "collect stage failed: Missing required data: current"
        );
    }

    #[test]
    fn test_stage_is_not_rewrapped() {
        let err = PipelineError::MissingData("x".to_string())
            .in_stage(Stage::Load)
            .in_stage(Stage::Collect);
        assert_eq!(err.stage(), Some(Stage::Load));
    }
}
