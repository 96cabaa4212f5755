use serde::{Deserialize, Serialize};

/// User identity supplied by the host application's identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Opaque session value passed explicitly into the form components.
///
/// The core only branches on presence or absence of a user; it never
/// inspects tokens or talks to the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    SignedIn(SessionUser),
}

impl Session {
    /// Build from the provider's `{user: {name, email}}` object, if any
    pub fn from_provider(user: Option<SessionUser>) -> Self {
        match user {
            Some(user) => Session::SignedIn(user),
            None => Session::Anonymous,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, Session::SignedIn(_))
    }

    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Session::SignedIn(user) => Some(user),
            Session::Anonymous => None,
        }
    }

    /// Short label for log fields
    pub fn label(&self) -> &str {
        self.user()
            .and_then(|u| u.email.as_deref().or(u.name.as_deref()))
            .unwrap_or("anonymous")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_object_parses() {
        let raw = r#"{"name": "Tim", "email": "tim@example.com"}"#;
        let user: SessionUser = serde_json::from_str(raw).unwrap();
        let session = Session::from_provider(Some(user));
        assert!(session.is_signed_in());
        assert_eq!(session.label(), "tim@example.com");
    }

    #[test]
    fn test_absent_user_is_anonymous() {
        let session = Session::from_provider(None);
        assert!(!session.is_signed_in());
        assert_eq!(session.label(), "anonymous");
    }
}
