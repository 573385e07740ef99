use std::{borrow::Cow, collections::BTreeMap};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::{ApiResponse, Meta};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    NotAvailable(String),

    #[error("Bad Request {0}")]
    BadRequest(String),

    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("{message}")]
    Unauthorized {
        message: String,
        login_path: Option<&'static str>,
    },

    #[error("ORM error")]
    OrmError(#[from] sea_orm::DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized {
            message: message.into(),
            login_path: None,
        }
    }

    /// Single-field validation failure, shaped like the derive output.
    pub fn field(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(
            field,
            validator::ValidationError::new("invalid").with_message(message.into()),
        );
        AppError::Validation(errors)
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    login: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound | AppError::NotAvailable(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::OrmError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        match &self {
            AppError::OrmError(err) => tracing::error!(error = %err, "database failure"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal failure"),
            _ => {}
        }

        let data = ErrorData {
            error: self.to_string(),
            fields: match &self {
                AppError::Validation(errors) => Some(field_messages(errors)),
                _ => None,
            },
            login: match &self {
                AppError::Unauthorized { login_path, .. } => *login_path,
                _ => None,
            },
        };

        let body = ApiResponse {
            message: self.to_string(),
            data: Some(data),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                })
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

pub type AppResult<T> = Result<T, AppError>;
