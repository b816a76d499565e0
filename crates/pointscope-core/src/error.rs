use thiserror::Error;

/// Top-level error type for a point-annotation scene.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Fatal errors while loading the model or the point list.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {locator}: {reason}")]
    Fetch { locator: String, reason: String },

    #[error("failed to load model {locator}: {reason}")]
    Model { locator: String, reason: String },

    #[error("invalid point list: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors raised by the point registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("duplicate point id in point list: {id}")]
    DuplicateId { id: String },

    #[error("point id already in use: {id}")]
    IdConflict { id: String },

    #[error("point not found: {id}")]
    NotFound { id: String },
}

/// Validation errors for an edit commit. The commit is rejected as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("no point is selected")]
    NothingSelected,

    #[error("{axis} must be a finite number, got {value:?}")]
    InvalidCoordinate { axis: char, value: String },

    #[error("point id must not be empty")]
    EmptyId,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// The external point list and the registry disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("point list has no record for id {id}")]
    MissingRecord { id: String },
}

/// Errors in scene configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Convenience type alias for results using [`SceneError`].
pub type Result<T> = std::result::Result<T, SceneError>;
