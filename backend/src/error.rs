//! Engine-level error taxonomy.
//!
//! Store failures arrive as [`RepositoryError`] and are folded into one of the
//! four [`ImpactError`] kinds. Missing data is never an error: it is carried
//! as empty [`MetricWithCI`](crate::models::MetricWithCI) components instead.

use crate::db::repository::{ErrorContext, RepositoryError};

/// Result type for engine operations.
pub type ImpactEngineResult<T> = Result<T, ImpactError>;

/// Errors raised while computing scenario impact.
#[derive(Debug, thiserror::Error)]
pub enum ImpactError {
    /// No impact provider is configured, or a provider was asked for a
    /// capability it does not offer.
    #[error("Configuration error: {message} {context}")]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    /// Unknown age group or scenario, or a nonsensical year range.
    #[error("Invalid input: {message} {context}")]
    InvalidInput {
        message: String,
        context: ErrorContext,
    },

    /// Source data holds duplicate or ambiguous rows for one (area, year).
    /// Always aborts the whole request.
    #[error("Data consistency error: {message} {context}")]
    DataConsistency {
        message: String,
        context: ErrorContext,
    },

    /// The provider's backing store (or a collaborator store) failed.
    #[error("Provider unavailable: {message} {context}")]
    ProviderUnavailable {
        message: String,
        context: ErrorContext,
    },
}

impl ImpactError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn invalid_input_with_context(message: impl Into<String>, context: ErrorContext) -> Self {
        Self::InvalidInput {
            message: message.into(),
            context,
        }
    }

    pub fn data_consistency(message: impl Into<String>) -> Self {
        Self::DataConsistency {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    pub fn data_consistency_with_context(
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Self::DataConsistency {
            message: message.into(),
            context,
        }
    }

    pub fn provider_unavailable(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
            context: ErrorContext::default(),
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "IMPACT_UNAVAILABLE",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::DataConsistency { .. } => "DATA_CONSISTENCY",
            Self::ProviderUnavailable { .. } => "PROVIDER_UNAVAILABLE",
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Configuration { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::DataConsistency { context, .. }
            | Self::ProviderUnavailable { context, .. } => context,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message, .. }
            | Self::InvalidInput { message, .. }
            | Self::DataConsistency { message, .. }
            | Self::ProviderUnavailable { message, .. } => message,
        }
    }

    /// Add or update the operation in the error context.
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        match &mut self {
            Self::Configuration { context, .. }
            | Self::InvalidInput { context, .. }
            | Self::DataConsistency { context, .. }
            | Self::ProviderUnavailable { context, .. } => {
                context.operation = Some(operation.into());
            }
        }
        self
    }
}

impl From<RepositoryError> for ImpactError {
    fn from(err: RepositoryError) -> Self {
        let message = err.message().to_string();
        let context = err.context().clone();
        match err {
            RepositoryError::NotFound { .. } | RepositoryError::ValidationError { .. } => {
                Self::InvalidInput { message, context }
            }
            RepositoryError::ConfigurationError { .. } => Self::Configuration { message, context },
            RepositoryError::ConnectionError { .. }
            | RepositoryError::QueryError { .. }
            | RepositoryError::InternalError { .. }
            | RepositoryError::TimeoutError { .. } => {
                Self::ProviderUnavailable { message, context }
            }
        }
    }
}
