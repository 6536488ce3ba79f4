use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::i18n::{Language, Msg};

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub language: Language,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            language: Language::default(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow::anyhow!(message.into()))
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    /// Classifies a write error: unique and foreign key violations are the
    /// caller's fault, anything else is a server error.
    pub fn from_write(err: sqlx::Error, conflict_message: &str) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::bad_request(anyhow::anyhow!(conflict_message.to_string()));
            }
            if db_err.is_foreign_key_violation() {
                return Self::bad_request(anyhow::anyhow!(
                    "Referenced record does not exist or is still in use"
                ));
            }
            if db_err.is_check_violation() {
                return Self::unprocessable(anyhow::anyhow!(db_err.message().to_string()));
            }
        }
        Self::database(err)
    }

    pub fn localized(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// The message sent to the client. Server errors never leak internals.
    pub fn public_message(&self) -> String {
        if self.is_server_error() {
            Msg::LoadError.text(self.language).to_string()
        } else {
            self.error.to_string()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(status = %self.status, error = ?self.error, "Request failed");
        } else {
            tracing::warn!(status = %self.status, error = %self.error, "Request rejected");
        }

        let body = Json(json!({
            "error": self.public_message()
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_keep_their_message() {
        let err = AppError::bad_request(anyhow::anyhow!("Email already exists"));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Email already exists");
    }

    #[test]
    fn server_errors_are_masked_and_localized() {
        let err = AppError::internal_error("connection reset by peer");
        assert_eq!(
            err.public_message(),
            "Erreur lors du chargement des données"
        );

        let err = AppError::internal_error("boom").localized(Language::Ar);
        assert_eq!(err.public_message(), "خطأ في تحميل البيانات");
    }

    #[test]
    fn status_constructors() {
        assert_eq!(AppError::unauthorized("x").status, StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").status, StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::not_found(anyhow::anyhow!("x")).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unprocessable(anyhow::anyhow!("x")).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn non_database_write_error_is_internal() {
        let err = AppError::from_write(sqlx::Error::RowNotFound, "duplicate");
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
