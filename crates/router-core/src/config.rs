//! Router configuration, with a working default for every field so the
//! router runs against in-memory fakes with zero environment setup.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Minimum FAQ similarity, on a 0.0–1.0 scale where higher is more
    /// relevant, required before routing to FAQ on evidence alone.
    pub faq_similarity_threshold: f32,
    /// Per-call timeout for each evidence backend (product store count,
    /// FAQ top-k).
    pub evidence_deadline: Duration,
    /// Overall deadline for a single routing call.
    pub request_deadline: Duration,
    /// How often the entity registry refreshes itself from the product
    /// store in the background.
    pub registry_refresh_interval: Duration,
    /// How long a session's conversation memory survives without activity.
    pub session_ttl: Duration,
    /// Utterances (lowercased, trimmed) treated as greetings and
    /// short-circuited before the pipeline runs.
    pub greetings: Vec<String>,
    /// Canned reply emitted for a greeting short-circuit (§4.5 step 1) —
    /// never routed to the LLM.
    pub greeting_response: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            faq_similarity_threshold: 0.60,
            evidence_deadline: Duration::from_millis(100),
            request_deadline: Duration::from_secs(2),
            registry_refresh_interval: Duration::from_secs(60),
            session_ttl: Duration::from_secs(30 * 60),
            greetings: vec![
                "hi".to_string(),
                "hello".to_string(),
                "hey".to_string(),
                "good morning".to_string(),
                "good afternoon".to_string(),
                "good evening".to_string(),
            ],
            greeting_response: "Hello! Ask me about bank products — counts, listings, \
                comparisons, or how to apply."
                .to_string(),
        }
    }
}

impl RouterConfig {
    /// Overlay environment variables onto the defaults. Every variable is
    /// optional; a missing or unparsable value simply keeps the default
    /// and logs a warning rather than failing startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = env_f32("ROUTER_FAQ_SIMILARITY_THRESHOLD") {
            config.faq_similarity_threshold = v;
        }
        if let Some(v) = env_millis("ROUTER_EVIDENCE_DEADLINE_MS") {
            config.evidence_deadline = v;
        }
        if let Some(v) = env_millis("ROUTER_REQUEST_DEADLINE_MS") {
            config.request_deadline = v;
        }
        if let Some(v) = env_secs("ROUTER_REGISTRY_REFRESH_SECS") {
            config.registry_refresh_interval = v;
        }
        if let Some(v) = env_secs("ROUTER_SESSION_TTL_SECS") {
            config.session_ttl = v;
        }

        config
    }
}

fn env_f32(key: &str) -> Option<f32> {
    std::env::var(key).ok().and_then(|v| match v.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %v, "ignoring unparsable environment override");
            None
        }
    })
}

fn env_millis(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_values() {
        let config = RouterConfig::default();
        assert_eq!(config.faq_similarity_threshold, 0.60);
        assert_eq!(config.evidence_deadline, Duration::from_millis(100));
        assert_eq!(config.request_deadline, Duration::from_secs(2));
        assert_eq!(config.session_ttl, Duration::from_secs(1800));
        assert!(config.greetings.contains(&"hi".to_string()));
    }
}
