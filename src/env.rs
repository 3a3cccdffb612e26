//! Environment variable access with default substitution.
//!
//! Handlers read the environment through [`EnvSource`] so tests can supply a
//! fixed map instead of mutating the process environment.

/// Source of named string values, normally the process environment.
pub trait EnvSource: Send + Sync {
    /// Raw lookup. `None` when the variable is unset.
    fn var(&self, name: &str) -> Option<String>;

    /// Returns the value of `name`, or `fallback` when it is unset or empty.
    fn get_value(&self, name: &str, fallback: &str) -> String {
        or_default(self.var(name).as_deref().unwrap_or_default(), fallback).to_string()
    }
}

/// Reads from the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        // Non-unicode values are treated the same as unset ones
        std::env::var(name).ok()
    }
}

/// Substitutes `fallback` for an empty value.
pub fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MapEnv;
    use super::*;

    #[test]
    fn test_get_value_set() {
        let env = MapEnv::default().with("MY_POD_NAME", "web-0");
        assert_eq!(env.get_value("MY_POD_NAME", "empty"), "web-0");
    }

    #[test]
    fn test_get_value_unset_uses_fallback() {
        let env = MapEnv::default();
        assert_eq!(env.get_value("MY_POD_NAME", "empty"), "empty");
    }

    #[test]
    fn test_get_value_empty_uses_fallback() {
        let env = MapEnv::default().with("PORT", "");
        assert_eq!(env.get_value("PORT", "8080"), "8080");
    }

    #[test]
    fn test_or_default() {
        assert_eq!(or_default("", "empty"), "empty");
        assert_eq!(or_default("example.com", "empty"), "example.com");
    }

    #[test]
    fn test_process_env_reads_variable() {
        std::env::set_var("PODECHO_TEST_PROCESS_ENV", "present");
        assert_eq!(
            ProcessEnv.get_value("PODECHO_TEST_PROCESS_ENV", "empty"),
            "present"
        );
        assert_eq!(
            ProcessEnv.get_value("PODECHO_TEST_PROCESS_ENV_UNSET", "empty"),
            "empty"
        );
    }
}
