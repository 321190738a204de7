//! User-facing messages for authentication error codes.
//!
//! The mapping is pure and total: every code yields a message, unknown codes
//! fall through to the category default, and a missing or blank code is
//! treated as `"default"`.

/// Code used when the provider round-trip fails.
pub const OAUTH_CALLBACK: &str = "oauthcallback";

/// Code used when the provider or user denies access.
pub const ACCESS_DENIED: &str = "accessdenied";

/// Code used when an unhandled server error is redirected to the error page.
pub const AUTH_ERROR: &str = "auth-error";

/// Code used when the account is linked to a different sign-in method.
pub const ACCOUNT_NOT_LINKED: &str = "oauthaccountnotlinked";

/// Code substituted for a missing or blank code.
pub const DEFAULT_CODE: &str = "default";

/// Which page a code is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Message shown above the provider list on the sign-in page.
    SignIn,
    /// Message shown on the standalone authentication error page.
    Auth,
}

impl ErrorCategory {
    /// Returns the category name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignIn => "signin-error",
            Self::Auth => "auth-error",
        }
    }
}

/// Heading and body text for an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthMessage {
    pub heading: &'static str,
    pub message: &'static str,
}

/// Returns the code to look up, substituting `"default"` for blank input.
#[must_use]
pub fn normalize_code(code: Option<&str>) -> &str {
    match code {
        Some(c) if !c.trim().is_empty() => c,
        _ => DEFAULT_CODE,
    }
}

/// Maps an error code to the message shown for it.
#[must_use]
pub fn error_message(code: Option<&str>, category: ErrorCategory) -> AuthMessage {
    let code = normalize_code(code);

    match (category, code) {
        (ErrorCategory::SignIn, ACCOUNT_NOT_LINKED) => AuthMessage {
            heading: "Account Not Linked",
            message: "To confirm your identity, sign in with the same account you used originally.",
        },
        (ErrorCategory::SignIn, _) => AuthMessage {
            heading: "Sign-in Failed",
            message: "Try signing in with a different account.",
        },
        (ErrorCategory::Auth, ACCESS_DENIED) => AuthMessage {
            heading: "Access Denied",
            message: "You do not have permission to sign in.",
        },
        (ErrorCategory::Auth, _) => AuthMessage {
            heading: "Authentication Error",
            message: "An unexpected error occurred. Please try again.",
        },
    }
}

/// Heading shown when sign-out fails.
pub const LOGOUT_ERROR_HEADING: &str = "Logout unsuccessful";

/// Message shown when sign-out fails without a reason.
pub const LOGOUT_ERROR_DEFAULT: &str = "Unable to logout at this time.";

/// Returns the heading and message for the logout error page.
#[must_use]
pub fn logout_error_message(reason: Option<&str>) -> (&'static str, String) {
    let message = match reason {
        Some(r) if !r.trim().is_empty() => r.to_string(),
        _ => LOGOUT_ERROR_DEFAULT.to_string(),
    };
    (LOGOUT_ERROR_HEADING, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signin_account_not_linked() {
        let msg = error_message(Some("oauthaccountnotlinked"), ErrorCategory::SignIn);
        assert_eq!(msg.heading, "Account Not Linked");
        assert_eq!(
            msg.message,
            "To confirm your identity, sign in with the same account you used originally."
        );
    }

    #[test]
    fn signin_other_codes_fall_back() {
        for code in [Some("oauthcallback"), Some("accessdenied"), Some("whatever"), None] {
            let msg = error_message(code, ErrorCategory::SignIn);
            assert_eq!(msg.heading, "Sign-in Failed");
            assert_eq!(msg.message, "Try signing in with a different account.");
        }
    }

    #[test]
    fn auth_access_denied() {
        let msg = error_message(Some("accessdenied"), ErrorCategory::Auth);
        assert_eq!(msg.heading, "Access Denied");
        assert_eq!(msg.message, "You do not have permission to sign in.");
    }

    #[test]
    fn auth_other_codes_fall_back() {
        for code in [
            Some("oauthcallback"),
            Some("auth-error"),
            Some("oauthaccountnotlinked"),
            Some("AccessDenied"),
        ] {
            let msg = error_message(code, ErrorCategory::Auth);
            assert_eq!(msg.heading, "Authentication Error");
            assert_eq!(
                msg.message,
                "An unexpected error occurred. Please try again."
            );
        }
    }

    #[test]
    fn missing_and_blank_codes_equal_default() {
        for category in [ErrorCategory::SignIn, ErrorCategory::Auth] {
            let default = error_message(Some("default"), category);
            assert_eq!(error_message(None, category), default);
            assert_eq!(error_message(Some(""), category), default);
            assert_eq!(error_message(Some("   "), category), default);
        }
    }

    #[test]
    fn category_names() {
        assert_eq!(ErrorCategory::SignIn.as_str(), "signin-error");
        assert_eq!(ErrorCategory::Auth.as_str(), "auth-error");
    }

    #[test]
    fn logout_error_uses_reason_or_default() {
        assert_eq!(
            logout_error_message(Some("provider unreachable")),
            ("Logout unsuccessful", "provider unreachable".to_string())
        );
        assert_eq!(
            logout_error_message(None),
            ("Logout unsuccessful", "Unable to logout at this time.".to_string())
        );
        assert_eq!(
            logout_error_message(Some(" ")).1,
            "Unable to logout at this time."
        );
    }
}
