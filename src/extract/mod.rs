//! Identity extractors. Authentication itself is delegated to the external
//! provider; the reverse proxy in front of this service verifies the session
//! and injects the caller's identity as headers.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::user::User;
use crate::repository::users;
use crate::utils::error::AppError;
use crate::AppState;

const USER_ID_HEADER: &str = "x-user-id";
const USER_EMAIL_HEADER: &str = "x-user-email";
const USER_NAME_HEADER: &str = "x-user-name";

/// The calling user's profile, provisioned on first sight.
pub struct AuthUser(pub User);

/// An [`AuthUser`] that must hold the admin role.
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, USER_ID_HEADER)
            .ok_or_else(|| AppError::AuthError("Missing identity header".to_string()))?;
        let id = Uuid::parse_str(id)
            .map_err(|_| AppError::AuthError("Malformed identity header".to_string()))?;

        let email = header_value(parts, USER_EMAIL_HEADER)
            .ok_or_else(|| AppError::AuthError("Missing identity header".to_string()))?
            .to_string();

        let display_name = match header_value(parts, USER_NAME_HEADER) {
            Some(name) => name.to_string(),
            None => email.split('@').next().unwrap_or_default().to_string(),
        };

        let user = users::get_or_create(&state.pool, id, &email, &display_name).await?;

        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AppError::Forbidden(
                "Administrator access required".to_string(),
            ));
        }

        Ok(AdminUser(user))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn header_value_trims_and_drops_empty() {
        let parts = parts_with(&[("x-user-id", "  abc  "), ("x-user-email", "   ")]);

        assert_eq!(header_value(&parts, USER_ID_HEADER), Some("abc"));
        assert_eq!(header_value(&parts, USER_EMAIL_HEADER), None);
        assert_eq!(header_value(&parts, USER_NAME_HEADER), None);
    }
}
