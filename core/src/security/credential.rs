//! Shared-secret credential check
//!
//! Every gated route (management header, file token, login body) goes
//! through [`AuthSecret::check`]. The comparison is exact, byte for byte.

use std::fmt;

use subtle::ConstantTimeEq;

/// Password used when none is configured and the fallback is allowed
pub const DEFAULT_PASSWORD: &str = "admin";

/// Why a credential was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No usable secret: the deployment cannot authenticate anyone
    NotConfigured,
    /// Credential missing or different from the secret
    Mismatch,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::NotConfigured => write!(f, "auth password not configured"),
            AuthError::Mismatch => write!(f, "unauthorized"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Exact equality of two credential strings
///
/// Constant time over the shorter length; differing lengths never match.
pub fn credentials_match(secret: &str, candidate: &str) -> bool {
    secret.as_bytes().ct_eq(candidate.as_bytes()).into()
}

/// The resolved server secret
#[derive(Clone)]
pub struct AuthSecret {
    secret: Option<String>,
    using_default: bool,
}

impl fmt::Debug for AuthSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSecret")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("using_default", &self.using_default)
            .finish()
    }
}

impl AuthSecret {
    /// Resolve the configured password
    ///
    /// An unset or empty password falls back to [`DEFAULT_PASSWORD`] when
    /// `allow_default` is true, and leaves the secret unconfigured otherwise.
    pub fn resolve(configured: Option<&str>, allow_default: bool) -> Self {
        match configured {
            Some(s) if !s.is_empty() => Self {
                secret: Some(s.to_string()),
                using_default: false,
            },
            _ if allow_default => Self {
                secret: Some(DEFAULT_PASSWORD.to_string()),
                using_default: true,
            },
            _ => Self {
                secret: None,
                using_default: false,
            },
        }
    }

    /// True when the built-in default password is in effect
    pub fn is_default(&self) -> bool {
        self.using_default
    }

    /// True when a secret is available
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Allow iff `candidate` equals the secret exactly
    pub fn check(&self, candidate: Option<&str>) -> Result<(), AuthError> {
        let secret = self.secret.as_deref().ok_or(AuthError::NotConfigured)?;
        match candidate {
            Some(c) if credentials_match(secret, c) => Ok(()),
            _ => Err(AuthError::Mismatch),
        }
    }

    /// Allow if any of the offered credentials matches
    ///
    /// Used where a token may come from a header or the query string.
    pub fn check_any<'a>(
        &self,
        candidates: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Result<(), AuthError> {
        if !self.is_configured() {
            return Err(AuthError::NotConfigured);
        }
        for candidate in candidates {
            if self.check(candidate).is_ok() {
                return Ok(());
            }
        }
        Err(AuthError::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_only() {
        assert!(credentials_match("hunter2", "hunter2"));
        assert!(!credentials_match("hunter2", "Hunter2"));
        assert!(!credentials_match("hunter2", "hunter2 "));
        assert!(!credentials_match("hunter2", "hunter"));
        assert!(!credentials_match("hunter2", ""));
    }

    #[test]
    fn test_configured_secret() {
        let secret = AuthSecret::resolve(Some("s3cret"), true);
        assert!(!secret.is_default());
        assert_eq!(secret.check(Some("s3cret")), Ok(()));
        assert_eq!(secret.check(Some("S3CRET")), Err(AuthError::Mismatch));
        assert_eq!(secret.check(Some("")), Err(AuthError::Mismatch));
        assert_eq!(secret.check(None), Err(AuthError::Mismatch));
        // The default no longer applies once a secret is set
        assert_eq!(secret.check(Some(DEFAULT_PASSWORD)), Err(AuthError::Mismatch));
    }

    #[test]
    fn test_default_fallback() {
        let secret = AuthSecret::resolve(None, true);
        assert!(secret.is_default());
        assert_eq!(secret.check(Some("admin")), Ok(()));

        let empty = AuthSecret::resolve(Some(""), true);
        assert!(empty.is_default());
    }

    #[test]
    fn test_strict_mode_without_secret() {
        let secret = AuthSecret::resolve(None, false);
        assert!(!secret.is_configured());
        assert_eq!(secret.check(Some("admin")), Err(AuthError::NotConfigured));
        assert_eq!(secret.check(None), Err(AuthError::NotConfigured));
    }

    #[test]
    fn test_check_any() {
        let secret = AuthSecret::resolve(Some("tok"), false);
        assert_eq!(secret.check_any([None, Some("tok")]), Ok(()));
        assert_eq!(secret.check_any([Some("tok"), None]), Ok(()));
        assert_eq!(secret.check_any([Some("bad"), None]), Err(AuthError::Mismatch));
        assert_eq!(secret.check_any(Vec::<Option<&str>>::new()), Err(AuthError::Mismatch));

        let unset = AuthSecret::resolve(None, false);
        assert_eq!(unset.check_any([Some("tok")]), Err(AuthError::NotConfigured));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let secret = AuthSecret::resolve(Some("very-secret"), false);
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
