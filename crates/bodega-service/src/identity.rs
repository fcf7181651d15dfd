//! # Caller Identity
//!
//! Authentication happens in the host application against an external
//! provider; services only ever see the result. Operations that require a
//! signed-in user take `Option<&Identity>` and fail typed when it's absent.

use serde::{Deserialize, Serialize};

/// The authenticated caller, as established by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Auth provider user id. Matches `Profile::id` and is recorded as
    /// `Transaction::user_id` on checkout.
    pub id: String,

    /// Email, when the provider shares it. Display only.
    pub email: Option<String>,
}

impl Identity {
    /// Creates an identity with just a user id.
    pub fn new(id: impl Into<String>) -> Self {
        Identity {
            id: id.into(),
            email: None,
        }
    }

    /// Sets the email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let identity = Identity::new("auth-1").with_email("mari@bodega.mx");
        assert_eq!(identity.id, "auth-1");
        assert_eq!(identity.email.as_deref(), Some("mari@bodega.mx"));
    }
}
