pub mod attachment_service;
pub mod catalog;
pub mod comment_service;
pub mod group_service;
pub mod issue_input;
pub mod issue_service;
pub mod permission;
pub mod project_service;
pub mod screens;
pub mod user_service;
pub mod workflow_service;

use std::collections::HashMap;
use thiserror::Error;

/// Error shared by the service layer. Handlers convert it into HTTP
/// responses via `ApiError`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    FieldValidation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        ServiceError::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn field_validation(
        message: impl Into<String>,
        field_errors: HashMap<String, String>,
    ) -> Self {
        ServiceError::FieldValidation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ServiceError::Conflict(msg.into())
    }
}
