use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::contact::ContactRequest;
use crate::repository;
use crate::utils::error::AppError;
use crate::utils::response::empty_success;
use crate::AppState;

pub async fn submit(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<Response, AppError> {
    validate(&req)?;

    repository::contact::insert(&state.pool, &req).await?;

    Ok(empty_success("Thanks for reaching out, we will reply soon"))
}

fn validate(req: &ContactRequest) -> Result<(), AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::ValidationError("Name is required".to_string()));
    }
    if !looks_like_email(&req.email) {
        return Err(AppError::ValidationError(
            "A valid email address is required".to_string(),
        ));
    }
    if req.message.trim().is_empty() {
        return Err(AppError::ValidationError("Message is required".to_string()));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, email: &str, message: &str) -> ContactRequest {
        ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn accepts_a_complete_message() {
        assert!(validate(&request("Ana", "ana@example.com", "Hello there")).is_ok());
    }

    #[test]
    fn rejects_blank_fields() {
        assert!(validate(&request("  ", "ana@example.com", "Hi")).is_err());
        assert!(validate(&request("Ana", "ana@example.com", "")).is_err());
    }

    #[test]
    fn rejects_malformed_emails() {
        for email in ["", "ana", "ana@", "@example.com", "ana@localhost", "a@.com"] {
            assert!(
                validate(&request("Ana", email, "Hi")).is_err(),
                "{email} should be rejected"
            );
        }
    }
}
