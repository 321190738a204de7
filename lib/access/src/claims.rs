//! Claims about the authenticated subject.
//!
//! Claims arrive from the provider's user-info endpoint as a JSON object.
//! They are kept as a flat, ordered map of claim name to string value so the
//! profile page can show them exactly as stored.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Claim carrying the subject identifier.
pub const SUBJECT_CLAIM: &str = "sub";

/// Claim used as the principal's display name.
pub const NAME_CLAIM: &str = "name";

/// Claim carrying the subject's email address.
pub const EMAIL_CLAIM: &str = "email";

/// Key-value assertions about the authenticated subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, String>);

impl Claims {
    /// Creates an empty claim set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a claim set from a user-info JSON object.
    ///
    /// String members are stored as-is. `null` members are dropped. Every
    /// other value (numbers, booleans, arrays, nested objects such as
    /// project role grants) keeps its compact JSON text.
    #[must_use]
    pub fn from_json_object(object: Map<String, Value>) -> Self {
        let claims = object
            .into_iter()
            .filter_map(|(name, value)| match value {
                Value::Null => None,
                Value::String(s) => Some((name, s)),
                other => Some((name, other.to_string())),
            })
            .collect();
        Self(claims)
    }

    /// Sets a claim, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Returns the value of a claim.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Returns the subject identifier.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.get(SUBJECT_CLAIM)
    }

    /// Returns the display name, taken from the `name` claim.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.get(NAME_CLAIM).filter(|n| !n.trim().is_empty())
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.get(EMAIL_CLAIM)
    }

    /// Number of claims.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates claims in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serializes the claim set as indented JSON for display.
    #[must_use]
    pub fn to_pretty_json(&self) -> String {
        // A map of strings always serializes.
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| "{}".to_string())
    }
}

impl<K, V> FromIterator<(K, V)> for Claims
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_object_flattens_values() {
        let object = json!({
            "sub": "2134",
            "name": "Alice Example",
            "email_verified": true,
            "updated_at": 1700000000,
            "urn:zitadel:iam:org:project:roles": {"admin": {"org1": "example.com"}},
            "locale": null
        });
        let Value::Object(map) = object else {
            panic!("expected object");
        };

        let claims = Claims::from_json_object(map);

        assert_eq!(claims.subject(), Some("2134"));
        assert_eq!(claims.display_name(), Some("Alice Example"));
        assert_eq!(claims.get("email_verified"), Some("true"));
        assert_eq!(claims.get("updated_at"), Some("1700000000"));
        assert_eq!(
            claims.get("urn:zitadel:iam:org:project:roles"),
            Some(r#"{"admin":{"org1":"example.com"}}"#)
        );
        assert_eq!(claims.get("locale"), None);
        assert_eq!(claims.len(), 5);
    }

    #[test]
    fn blank_name_is_not_a_display_name() {
        let claims: Claims = [("sub", "1"), ("name", "  ")].into_iter().collect();
        assert_eq!(claims.display_name(), None);
    }

    #[test]
    fn pretty_json_is_indented_and_ordered() {
        let claims: Claims = [("sub", "1"), ("email", "a@example.com")]
            .into_iter()
            .collect();

        let json = claims.to_pretty_json();

        assert_eq!(json, "{\n  \"email\": \"a@example.com\",\n  \"sub\": \"1\"\n}");
    }

    #[test]
    fn empty_claims_render_as_empty_object() {
        assert_eq!(Claims::new().to_pretty_json(), "{}");
        assert!(Claims::new().is_empty());
    }
}
