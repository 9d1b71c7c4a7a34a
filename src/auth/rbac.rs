//! Role checks for protected handlers.
//!
//! Each protected handler calls [`require_role`] before touching any payload,
//! so a caller with the wrong role gets 403 regardless of what they sent.

use super::AuthUser;
use crate::entities::UserRole;
use crate::errors::ServiceError;
use tracing::warn;

/// Fails with `Forbidden` unless `user` holds exactly `role`
pub fn require_role(user: &AuthUser, role: UserRole) -> Result<(), ServiceError> {
    if user.has_role(role) {
        return Ok(());
    }

    warn!(
        user_id = user.id,
        actual = %user.role,
        required = %role,
        "Role check failed"
    );
    Err(ServiceError::Forbidden(denied_message(role).to_string()))
}

fn denied_message(role: UserRole) -> &'static str {
    match role {
        UserRole::Buyer => "Only buyers can perform this action",
        UserRole::Seller => "Only sellers can perform this action",
        UserRole::Admin => "Only admins can perform this action",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            id: 1,
            email: "someone@example.com".into(),
            role,
        }
    }

    #[rstest]
    #[case(UserRole::Buyer, UserRole::Buyer, true)]
    #[case(UserRole::Seller, UserRole::Seller, true)]
    #[case(UserRole::Admin, UserRole::Admin, true)]
    #[case(UserRole::Buyer, UserRole::Seller, false)]
    #[case(UserRole::Admin, UserRole::Seller, false)]
    #[case(UserRole::Seller, UserRole::Buyer, false)]
    #[case(UserRole::Seller, UserRole::Admin, false)]
    fn role_must_match_exactly(
        #[case] actual: UserRole,
        #[case] required: UserRole,
        #[case] allowed: bool,
    ) {
        assert_eq!(require_role(&user(actual), required).is_ok(), allowed);
    }

    #[test]
    fn denial_names_required_role() {
        assert_matches!(
            require_role(&user(UserRole::Buyer), UserRole::Admin),
            Err(ServiceError::Forbidden(msg)) if msg == "Only admins can perform this action"
        );
    }
}
