use thiserror::Error;

#[cfg(test)]
mod tests;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database operation failed: {0}")]
    DatabaseOperation(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("hub not found: {id}")]
    HubNotFound { id: i64 },
    #[error("professional {professional_id} has no active hub binding")]
    NotBound { professional_id: String },
    #[error("professional {professional_id} is already bound to hub {hub_id}")]
    AlreadyBound {
        professional_id: String,
        hub_id: i64,
    },
    #[error("check-in at {distance_meters:.0}m exceeds the hub radius of {allowed_radius_meters:.0}m")]
    DistanceExceeded {
        distance_meters: f64,
        allowed_radius_meters: f64,
    },
    #[error("professional {professional_id} is already waiting at position {position}")]
    AlreadyInQueue {
        professional_id: String,
        position: i32,
    },
    #[error("professional {professional_id} has no queue entry")]
    NotInQueue { professional_id: String },
    #[error("hub {hub_id} still has {entries} queue entries")]
    HubHasActiveEntries { hub_id: i64, entries: i64 },
    #[error("role is not allowed to perform {action}")]
    PermissionDenied { action: String },
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

impl DispatchError {
    pub fn database_error<S: Into<String>>(msg: S) -> Self {
        Self::DatabaseOperation(msg.into())
    }
    pub fn validation_error<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }
    pub fn hub_not_found(id: i64) -> Self {
        Self::HubNotFound { id }
    }
    pub fn not_bound<S: Into<String>>(professional_id: S) -> Self {
        Self::NotBound {
            professional_id: professional_id.into(),
        }
    }
    pub fn not_in_queue<S: Into<String>>(professional_id: S) -> Self {
        Self::NotInQueue {
            professional_id: professional_id.into(),
        }
    }
    pub fn permission_denied<S: Into<String>>(action: S) -> Self {
        Self::PermissionDenied {
            action: action.into(),
        }
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Stable taxonomy tag surfaced to API clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Database(_) | Self::DatabaseOperation(_) => "DATABASE_ERROR",
            Self::Validation(_) => "VALIDATION",
            Self::HubNotFound { .. } => "HUB_NOT_FOUND",
            Self::NotBound { .. } => "NOT_BOUND",
            Self::AlreadyBound { .. } => "ALREADY_BOUND",
            Self::DistanceExceeded { .. } => "DISTANCE_EXCEEDED",
            Self::AlreadyInQueue { .. } => "ALREADY_IN_QUEUE",
            Self::NotInQueue { .. } => "NOT_IN_QUEUE",
            Self::HubHasActiveEntries { .. } => "HUB_HAS_ACTIVE_ENTRIES",
            Self::PermissionDenied { .. } => "PERMISSION_DENIED",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Persistence-layer failures the caller may re-issue; domain rejections
    /// are final until the underlying state changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::DatabaseOperation(_))
    }

    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(_) => "Dados da requisição inválidos",
            Self::HubNotFound { .. } => "Central não encontrada",
            Self::NotBound { .. } => "Profissional não está vinculado a nenhuma central",
            Self::AlreadyBound { .. } => "Profissional já possui vínculo ativo com outra central",
            Self::DistanceExceeded { .. } => "Você está fora do raio de entrada da central",
            Self::AlreadyInQueue { .. } => "Profissional já está na fila",
            Self::NotInQueue { .. } => "Profissional não está na fila",
            Self::HubHasActiveEntries { .. } => {
                "A central possui profissionais na fila e não pode ser removida"
            }
            Self::PermissionDenied { .. } => "Você não tem permissão para executar esta operação",
            _ => "Sistema indisponível, tente novamente",
        }
    }
}

impl From<serde_json::Error> for DispatchError {
    fn from(err: serde_json::Error) -> Self {
        DispatchError::Serialization(err.to_string())
    }
}

impl From<anyhow::Error> for DispatchError {
    fn from(err: anyhow::Error) -> Self {
        DispatchError::Internal(err.to_string())
    }
}
