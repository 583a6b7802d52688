use std::env;

use crate::error::ConfigError;

/// Agent that handles both expense processing and policy questions.
pub const DEFAULT_AGENT_ID: &str = "expense-policy-agent";

/// Caller identity reported to the agent service.
pub const DEFAULT_USER_ID: &str = "expense-portal";

/// Connection settings for the remote agent and upload endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub api_url: String,
    pub upload_url: String,
    pub api_key: Option<String>,
    pub agent_id: String,
    pub user_id: String,
}

impl AgentConfig {
    pub fn new(api_url: impl Into<String>, upload_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            upload_url: upload_url.into(),
            api_key: None,
            agent_id: DEFAULT_AGENT_ID.to_string(),
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key).and_then(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
        };

        let api_url = get("AGENT_API_URL").ok_or(ConfigError::Missing("AGENT_API_URL"))?;
        let upload_url = get("UPLOAD_API_URL").ok_or(ConfigError::Missing("UPLOAD_API_URL"))?;

        Ok(Self {
            api_url,
            upload_url,
            api_key: get("AGENT_API_KEY"),
            agent_id: get("AGENT_ID").unwrap_or_else(|| DEFAULT_AGENT_ID.to_string()),
            user_id: get("AGENT_USER_ID").unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AgentConfig::from_lookup(lookup(&[
            ("AGENT_API_URL", "http://agent.local/chat"),
            ("UPLOAD_API_URL", "http://agent.local/upload"),
        ]))
        .unwrap();

        assert_eq!(config.agent_id, DEFAULT_AGENT_ID);
        assert_eq!(config.user_id, DEFAULT_USER_ID);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_missing_api_url() {
        let err = AgentConfig::from_lookup(lookup(&[("UPLOAD_API_URL", "http://x")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("AGENT_API_URL"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = AgentConfig::from_lookup(lookup(&[
            ("AGENT_API_URL", "http://agent.local/chat"),
            ("UPLOAD_API_URL", "http://agent.local/upload"),
            ("AGENT_API_KEY", "   "),
            ("AGENT_ID", "custom-agent"),
        ]))
        .unwrap();

        assert!(config.api_key.is_none());
        assert_eq!(config.agent_id, "custom-agent");
    }
}
