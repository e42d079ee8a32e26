use crate::common::constants::{MILLIS_PER_MIN, MILLIS_PER_SEC};
use crate::error::{QueryError, QueryResult};
use crate::labels::Matcher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

pub const REMOTE_TIMEOUT_MIN_MS: u64 = 100;
pub const REMOTE_TIMEOUT_MAX_MS: u64 = 10 * MILLIS_PER_MIN;
pub const REMOTE_TIMEOUT_DEFAULT_MS: u64 = MILLIS_PER_MIN;

pub const QUERY_TIMEOUT_MIN_MS: u64 = MILLIS_PER_SEC;
pub const QUERY_TIMEOUT_MAX_MS: u64 = 60 * MILLIS_PER_MIN;

fn default_remote_timeout_ms() -> u64 {
    REMOTE_TIMEOUT_DEFAULT_MS
}

/// Settings for one remote read backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReadConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,
    /// Label pairs a selector must contain for this backend to be queried.
    #[serde(default)]
    pub required_matchers: BTreeMap<String, String>,
    /// Whether the backend should also be asked for recent data. Not interpreted by the
    /// read path; the client factory receives it with the rest of this config.
    #[serde(default)]
    pub read_recent: bool,
}

impl RemoteReadConfig {
    pub fn new<N: Into<String>, U: Into<String>>(name: N, url: U) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            remote_timeout_ms: REMOTE_TIMEOUT_DEFAULT_MS,
            required_matchers: BTreeMap::new(),
            read_recent: false,
        }
    }

    pub fn with_required_matcher<N: Into<String>, V: Into<String>>(
        mut self,
        name: N,
        value: V,
    ) -> Self {
        self.required_matchers.insert(name.into(), value.into());
        self
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }

    /// The required label pairs as equality matchers, ordered by label name.
    pub fn required_equality_matchers(&self) -> Vec<Matcher> {
        self.required_matchers
            .iter()
            .map(|(name, value)| Matcher::equals(name.as_str(), value.as_str()))
            .collect()
    }

    pub fn validate(&self) -> QueryResult<()> {
        if self.name.is_empty() {
            return Err(invalid("remote read backend name must not be empty"));
        }
        if self.url.is_empty() {
            return Err(invalid(format!(
                "backend \"{}\": url must not be empty",
                self.name
            )));
        }
        check_range(
            &format!("backend \"{}\": remote_timeout_ms", self.name),
            self.remote_timeout_ms,
            REMOTE_TIMEOUT_MIN_MS,
            REMOTE_TIMEOUT_MAX_MS,
        )?;
        if self.required_matchers.keys().any(|name| name.is_empty()) {
            return Err(invalid(format!(
                "backend \"{}\": required matcher names must not be empty",
                self.name
            )));
        }
        Ok(())
    }
}

/// The set of backends a federated query reads from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederationConfig {
    pub backends: Vec<RemoteReadConfig>,
    /// Upper bound for a whole federated query. Unbounded if missing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_timeout_ms: Option<u64>,
}

impl FederationConfig {
    pub fn new(backends: Vec<RemoteReadConfig>) -> Self {
        Self {
            backends,
            query_timeout_ms: None,
        }
    }

    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> QueryResult<Self> {
        let config: FederationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> QueryResult<()> {
        if self.backends.is_empty() {
            return Err(invalid("at least one remote read backend is required"));
        }
        let mut names = HashSet::with_capacity(self.backends.len());
        for backend in &self.backends {
            backend.validate()?;
            if !names.insert(backend.name.as_str()) {
                return Err(invalid(format!(
                    "duplicate remote read backend name \"{}\"",
                    backend.name
                )));
            }
        }
        if let Some(timeout) = self.query_timeout_ms {
            check_range(
                "query_timeout_ms",
                timeout,
                QUERY_TIMEOUT_MIN_MS,
                QUERY_TIMEOUT_MAX_MS,
            )?;
        }
        Ok(())
    }
}

fn invalid<S: Into<String>>(msg: S) -> QueryError {
    QueryError::InvalidConfiguration(msg.into())
}

fn check_range(name: &str, value: u64, min: u64, max: u64) -> QueryResult<()> {
    if !(min..=max).contains(&value) {
        return Err(invalid(format!("{name} must be between {min} and {max}")));
    }
    Ok(())
}
