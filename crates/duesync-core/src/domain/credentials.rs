//! Platform login credentials.

use std::fmt;

/// One platform's login pair.
///
/// Lives for the duration of a single authentication attempt and is never
/// persisted. `Debug` redacts the secret so request logging cannot leak it.
#[derive(Clone)]
pub struct Credentials {
    /// Login identity (email or student id, depending on the platform).
    pub identity: String,
    /// Plaintext secret, handed to the adapter exactly once.
    pub secret: String,
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("student@example.edu", "hunter2");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("student@example.edu"));
        assert!(!rendered.contains("hunter2"));
    }
}
