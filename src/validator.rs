use crate::errors::ServiceError;
use serde::de::DeserializeOwned;

/// Wraps a request body so it can only be used after it passed validation
#[derive(Deserialize)]
pub struct Validator<T>(T);

pub trait Validate<T> {
    fn validate(&self) -> Result<(), ServiceError>;
}

impl<T> Validator<T> {
    pub fn new(i: T) -> Validator<T> {
        Validator::<T>(i)
    }
}

impl<T> Validator<T>
where
    T: Validate<T>,
    T: DeserializeOwned,
{
    pub fn validate(self) -> Result<T, ServiceError> {
        self.0.validate()?;
        Ok(self.0)
    }
}

/// validates a display name for players and teams
pub fn validate_name(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        bad_request!(format!("{} is too short", field));
    }

    if value.trim().chars().count() > MAX_NAME_LENGTH {
        bad_request!(format!(
            "{} is too long, maximum {} characters",
            field, MAX_NAME_LENGTH
        ));
    }

    Ok(())
}

pub const MAX_NAME_LENGTH: usize = 40;
