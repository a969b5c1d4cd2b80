//! Explicit execution-session state. Each session owns its variable
//! bindings; nothing is process-global, and two sessions never observe each
//! other's state. Callers pass a session by mutable reference into every
//! execution call that needs it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An isolated variable-binding environment for one execution context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecSession {
    bindings: HashMap<String, serde_json::Value>,
    executions: u64,
    created_at: DateTime<Utc>,
}

impl ExecSession {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
            executions: 0,
            created_at: Utc::now(),
        }
    }

    /// Bind a name, replacing any previous value
    pub fn bind(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.bindings.get(name)
    }

    pub fn unbind(&mut self, name: &str) -> Option<serde_json::Value> {
        self.bindings.remove(name)
    }

    /// Record one execution against this session and return its sequence
    /// number (1-based)
    pub fn record_execution(&mut self) -> u64 {
        self.executions += 1;
        self.executions
    }

    pub fn executions(&self) -> u64 {
        self.executions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Current bindings, cloned for inspection or persistence
    pub fn snapshot(&self) -> HashMap<String, serde_json::Value> {
        self.bindings.clone()
    }

    /// Drop all bindings and the execution count, keeping the session's
    /// identity (creation time)
    pub fn reset(&mut self) {
        self.bindings.clear();
        self.executions = 0;
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for ExecSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bind_and_get_round_trip() {
        let mut session = ExecSession::new();
        session.bind("rainfall_mm", json!(142.5));

        assert_eq!(session.get("rainfall_mm"), Some(&json!(142.5)));
        assert_eq!(session.get("missing"), None);
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn rebinding_replaces_the_value() {
        let mut session = ExecSession::new();
        session.bind("district", json!("Wayanad"));
        session.bind("district", json!("Idukki"));

        assert_eq!(session.get("district"), Some(&json!("Idukki")));
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn sessions_do_not_share_state() {
        let mut first = ExecSession::new();
        let second = ExecSession::new();

        first.bind("shared?", json!(true));

        assert!(first.get("shared?").is_some());
        assert!(second.get("shared?").is_none());
        assert!(second.is_empty());
    }

    #[test]
    fn execution_counter_is_per_session() {
        let mut session = ExecSession::new();
        assert_eq!(session.record_execution(), 1);
        assert_eq!(session.record_execution(), 2);

        let mut other = ExecSession::new();
        assert_eq!(other.record_execution(), 1);
    }

    #[test]
    fn reset_clears_bindings_and_count() {
        let mut session = ExecSession::new();
        session.bind("x", json!(1));
        session.record_execution();

        session.reset();

        assert!(session.is_empty());
        assert_eq!(session.executions(), 0);
    }
}
