use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use crate::validation::FieldErrors;

#[derive(Debug)]
pub enum AppError {
    DatabaseError(sqlx::Error),
    ConfigError(String),
    InternalError(String),
    Validation(FieldErrors),
    NotFound(String),
    BadRequest(String),
    ConstraintViolation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::Validation(errors) => write!(f, "Validation failed: {}", errors),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ConstraintViolation(msg) => write!(f, "Constraint violation: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::DatabaseError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_foreign_key_violation() {
                return AppError::ConstraintViolation(match db_err.constraint() {
                    Some(name) => format!("foreign key constraint {} violated", name),
                    None => "referenced record does not exist or is still referenced".to_string(),
                });
            }

            if db_err.is_unique_violation() {
                return AppError::ConstraintViolation(match db_err.constraint() {
                    Some(name) => format!("unique constraint {} violated", name),
                    None => "record already exists".to_string(),
                });
            }

            if db_err.is_check_violation() {
                return AppError::ConstraintViolation(match db_err.constraint() {
                    Some(name) => format!("check constraint {} violated", name),
                    None => "value rejected by a check constraint".to_string(),
                });
            }
        }

        AppError::DatabaseError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::InternalError(format!("migration failed: {}", err))
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::DatabaseError(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            AppError::ConfigError(ref msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error",
                )
            }
            AppError::InternalError(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str())
            }
            AppError::Validation(errors) => {
                let body = Json(json!({
                    "message": "Validation failed",
                    "errors": errors,
                }));

                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ConstraintViolation(ref msg) => (StatusCode::CONFLICT, msg.as_str()),
        };

        let body = Json(json!({
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;
    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug)]
    enum Violation {
        ForeignKey,
        Unique,
        Check,
        Other,
    }

    #[derive(Debug)]
    struct PgViolation {
        violation: Violation,
        constraint: Option<&'static str>,
    }

    impl fmt::Display for PgViolation {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:?} violation", self.violation)
        }
    }

    impl std::error::Error for PgViolation {}

    impl DatabaseError for PgViolation {
        fn message(&self) -> &str {
            "violation"
        }

        fn constraint(&self) -> Option<&str> {
            self.constraint
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.violation {
                Violation::ForeignKey => ErrorKind::ForeignKeyViolation,
                Violation::Unique => ErrorKind::UniqueViolation,
                Violation::Check => ErrorKind::CheckViolation,
                Violation::Other => ErrorKind::Other,
            }
        }
    }

    fn database_error(violation: Violation, constraint: Option<&'static str>) -> AppError {
        AppError::from(sqlx::Error::Database(Box::new(PgViolation {
            violation,
            constraint,
        })))
    }

    #[test]
    fn integrity_errors_become_constraint_violations() {
        let err = database_error(Violation::ForeignKey, Some("products_category_id_fkey"));
        assert!(
            matches!(err, AppError::ConstraintViolation(ref msg) if msg.contains("products_category_id_fkey"))
        );

        let err = database_error(Violation::Unique, Some("categories_name_key"));
        assert!(
            matches!(err, AppError::ConstraintViolation(ref msg) if msg.contains("categories_name_key"))
        );

        let err = database_error(Violation::Check, None);
        assert!(matches!(err, AppError::ConstraintViolation(_)));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn other_database_errors_stay_server_errors() {
        let err = database_error(Violation::Other, None);
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn client_errors_map_to_client_status_codes() {
        let cases = [
            (
                AppError::Validation(FieldErrors::from(vec![FieldError::new(
                    "price",
                    "must be greater than zero",
                )])),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::NotFound("Product not found".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::ConstraintViolation("category still has products".to_string()),
                StatusCode::CONFLICT,
            ),
            (
                AppError::BadRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn server_errors_map_to_500() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::DatabaseError(_)));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let err = AppError::ConfigError("DB_URL not set".to_string());
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
