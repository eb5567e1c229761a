/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Token login/logout
/// - `users`: Registration, profiles, password change, subscriptions
/// - `ingredients`: Ingredient reference data
/// - `tags`: Tag reference data
/// - `recipes`: Recipe CRUD, favorite/cart toggling, shopping list

pub mod auth;
pub mod health;
pub mod ingredients;
pub mod recipes;
pub mod tags;
pub mod users;

use crate::error::{ApiError, ValidationErrorDetail};

/// Maps `validator` derive failures to the field-level 400 response
pub(crate) fn validation_error(e: validator::ValidationErrors) -> ApiError {
    let errors: Vec<ValidationErrorDetail> = e
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| ValidationErrorDetail {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "Validation failed".to_string()),
            })
        })
        .collect();
    ApiError::ValidationError(errors)
}
