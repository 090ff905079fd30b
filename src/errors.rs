use actix_web::{error::ResponseError, HttpResponse};
use derive_more::Display;
use diesel::result::{DatabaseErrorKind, Error as DBError};
use std::convert::From;

#[derive(Debug, Display, PartialEq)]
pub enum ServiceError {
    #[display(fmt = "Internal Server Error")]
    InternalServerError,

    #[display(fmt = "BadRequest: {}", _0)]
    BadRequest(String),

    #[display(fmt = "Conflict: {}", _0)]
    Conflict(String),

    #[display(fmt = "Not Found")]
    NotFound,
}

// impl ResponseError trait allows to convert our errors into http responses with appropriate data
impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InternalServerError => {
                HttpResponse::InternalServerError().json("Internal Server Error, Please try later")
            }
            ServiceError::BadRequest(ref message) => HttpResponse::BadRequest().json(message),
            ServiceError::NotFound => HttpResponse::NotFound().json("Not Found"),
            ServiceError::Conflict(ref message) => HttpResponse::Conflict().json(message),
        }
    }
}

impl From<DBError> for ServiceError {
    fn from(error: DBError) -> ServiceError {
        match error {
            DBError::NotFound => ServiceError::NotFound,
            DBError::DatabaseError(kind, info) => {
                let message = info.details().unwrap_or_else(|| info.message()).to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => ServiceError::Conflict(message),
                    DatabaseErrorKind::ForeignKeyViolation => ServiceError::BadRequest(message),
                    _ => {
                        error!("db error: {}", message);
                        ServiceError::InternalServerError
                    }
                }
            }
            _ => {
                error!("db error: {}", error);
                ServiceError::InternalServerError
            }
        }
    }
}

impl From<r2d2::Error> for ServiceError {
    fn from(error: r2d2::Error) -> ServiceError {
        error!("r2d2 connection pool error: {}", error);
        ServiceError::InternalServerError
    }
}

impl From<actix_threadpool::BlockingError<ServiceError>> for ServiceError {
    fn from(error: actix_threadpool::BlockingError<ServiceError>) -> ServiceError {
        match error {
            actix_threadpool::BlockingError::Error(error) => error,
            actix_threadpool::BlockingError::Canceled => {
                error!("actix threadpool pool error: blocking operation was canceled");
                ServiceError::InternalServerError
            }
        }
    }
}

impl From<actix::MailboxError> for ServiceError {
    fn from(error: actix::MailboxError) -> ServiceError {
        error!("actix mailbox error: {}", error);
        ServiceError::InternalServerError
    }
}

impl From<actix_web::Error> for ServiceError {
    fn from(error: actix_web::Error) -> ServiceError {
        error!("actix web error: {}", error);
        ServiceError::InternalServerError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn missing_rows_become_not_found() {
        let error: ServiceError = DBError::NotFound.into();

        assert_eq!(error, ServiceError::NotFound);
        assert_eq!(error.error_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn blocking_errors_keep_their_cause() {
        let error: ServiceError =
            actix_threadpool::BlockingError::Error(ServiceError::Conflict("full".into())).into();

        assert_eq!(error, ServiceError::Conflict("full".into()));
        assert_eq!(error.error_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn canceled_blocking_calls_are_internal_errors() {
        let error: ServiceError = actix_threadpool::BlockingError::Canceled.into();

        assert_eq!(
            error.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn bad_requests_carry_their_message() {
        let error = ServiceError::BadRequest("name is too short".into());

        assert_eq!(error.to_string(), "BadRequest: name is too short");
        assert_eq!(error.error_response().status(), StatusCode::BAD_REQUEST);
    }
}
