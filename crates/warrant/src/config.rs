//! Authorizer configuration.

use serde::{Deserialize, Serialize};
use warrant_core::TenantPolicy;

/// Configuration for the Authorizer.
///
/// Deserializable so a host can embed it in its own config file:
///
/// ```
/// let config: warrant::AuthorizerConfig =
///     serde_json::from_str(r#"{ "tenant_policy": "strict" }"#).unwrap();
/// assert_eq!(config.fallback_locale, "en");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizerConfig {
    /// How role tenants are checked on assignment.
    pub tenant_policy: TenantPolicy,
    /// Locale used when a role has no translation for the requested one.
    pub fallback_locale: String,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            tenant_policy: TenantPolicy::Context,
            fallback_locale: "en".to_owned(),
        }
    }
}
