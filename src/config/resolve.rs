//! Environment variable substitution and value resolution.

use std::time::Duration;

use super::types::{Config, ProviderEntry};

use crate::constants::{
    DEFAULT_KB_MIN_SCORE, DEFAULT_KB_RESULTS, DEFAULT_MAX_TURNS, HTTP_DEFAULT_TIMEOUT_SECS,
    HTTP_MAX_RESPONSE_BYTES,
};

impl Config {
    /// Resolve {env:VAR_NAME} patterns in string fields.
    pub(super) fn resolve_substitutions(&mut self) {
        self.model = Self::resolve_str(&self.model);
        if let Some(ref mut sp) = self.system_prompt {
            *sp = Self::resolve_str(sp);
        }
        if let Some(ref mut dp) = self.default_provider {
            *dp = Self::resolve_str(dp);
        }
        if let Some(ref mut id) = self.knowledge_base.id {
            *id = Self::resolve_str(id);
        }
        if let Some(ref mut region) = self.knowledge_base.region {
            *region = Self::resolve_str(region);
        }
        Self::resolve_provider_entry(&mut self.provider.openai);
        Self::resolve_provider_entry(&mut self.provider.anthropic);
        Self::resolve_provider_entry(&mut self.provider.ollama);
        Self::resolve_provider_entry(&mut self.provider.openrouter);
    }

    fn resolve_provider_entry(entry: &mut Option<ProviderEntry>) {
        if let Some(ref mut e) = entry {
            if let Some(ref mut key) = e.api_key {
                *key = Self::resolve_str(key);
            }
            if let Some(ref mut url) = e.base_url {
                *url = Self::resolve_str(url);
            }
        }
    }

    /// Replace {env:VAR} with the environment variable value.
    ///
    /// Unset variables resolve to the empty string.
    fn resolve_str(s: &str) -> String {
        let mut result = s.to_string();
        while let Some(start) = result.find("{env:") {
            let Some(end) = result[start..].find('}') else {
                break;
            };
            let var_name = &result[start + 5..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!("{}{}{}", &result[..start], value, &result[start + end + 1..]);
        }
        result
    }

    /// Resolve API key for a provider: env var first, then config value.
    pub fn resolve_api_key(&self, provider: &str) -> Option<String> {
        let env_key = format!("{}_API_KEY", provider.to_uppercase());
        if let Ok(val) = std::env::var(&env_key) {
            if !val.is_empty() {
                return Some(val);
            }
        }

        let entry = match provider {
            "openai" => &self.provider.openai,
            "anthropic" => &self.provider.anthropic,
            "ollama" => &self.provider.ollama,
            "openrouter" => &self.provider.openrouter,
            _ => &None,
        };
        entry
            .as_ref()
            .and_then(|e| e.api_key.clone())
            .filter(|k| !k.is_empty())
    }

    /// Get the configured default provider name, if any.
    pub fn provider_name(&self) -> Option<&str> {
        self.default_provider.as_deref()
    }

    /// Get the model name from config, stripping provider prefix if present.
    /// Returns None if the model is the compile-time default.
    pub fn model_name(&self) -> Option<String> {
        let m = &self.model;
        if m == crate::constants::DEFAULT_MODEL {
            return None;
        }
        if let Some((_prov, model)) = m.split_once('/') {
            Some(model.to_string())
        } else {
            Some(m.to_string())
        }
    }

    /// Configured knowledge base id, ignoring blank values.
    pub fn knowledge_base_id(&self) -> Option<&str> {
        self.knowledge_base
            .id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn knowledge_base_results(&self) -> i32 {
        self.knowledge_base
            .number_of_results
            .unwrap_or(DEFAULT_KB_RESULTS)
    }

    pub fn knowledge_base_min_score(&self) -> f64 {
        self.knowledge_base.min_score.unwrap_or(DEFAULT_KB_MIN_SCORE)
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns.unwrap_or(DEFAULT_MAX_TURNS)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs.unwrap_or(HTTP_DEFAULT_TIMEOUT_SECS))
    }

    pub fn http_max_response_bytes(&self) -> usize {
        self.http
            .max_response_bytes
            .unwrap_or(HTTP_MAX_RESPONSE_BYTES)
    }
}
