//! Environment variable abstraction.
//!
//! Read-only on purpose: maila only consults the environment during
//! config discovery, so no mutation API is exposed.

/// Platform-agnostic environment variable access.
pub trait Environment: Send + Sync {
    /// Get the value of an environment variable, or `None` if it is not set.
    fn get_var(&self, name: &str) -> Option<String>;
}

/// Native environment implementation using [`std::env`].
#[cfg(feature = "native")]
pub struct NativeEnvironment;

#[cfg(feature = "native")]
impl Environment for NativeEnvironment {
    fn get_var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }
}

/// In-memory environment, handy for tests and embedding.
#[derive(Debug, Default, Clone)]
pub struct MapEnvironment {
    vars: std::collections::HashMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MapEnvironment {
    fn get_var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_get_var_existing() {
        // PATH is universally available
        assert!(NativeEnvironment.get_var("PATH").is_some());
    }

    #[test]
    fn native_get_var_missing() {
        assert!(NativeEnvironment.get_var("MAILA_DEFINITELY_NOT_SET_12345").is_none());
    }

    #[test]
    fn map_environment_lookup() {
        let env = MapEnvironment::new().with_var("MAILA_CONFIG", "/tmp/x.json");
        assert_eq!(env.get_var("MAILA_CONFIG").as_deref(), Some("/tmp/x.json"));
        assert!(env.get_var("HOME").is_none());
    }
}
