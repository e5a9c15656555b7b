//! Engine-wide configuration.

use crate::profiling::{ProfilingBackend, init_profiling};

/// Configuration shared by every render root in the process.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub benchmark: BenchmarkMode,
    /// Install the fmt subscriber from [`crate::logging::init`].
    pub install_logger: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BenchmarkMode {
    /// Profiling scopes are compiled in but not recorded.
    #[default]
    Off,
    /// Profiling scopes are recorded and served to `puffin_viewer`.
    WithWebserver,
}

impl Config {
    /// Build a configuration from `ARBOR_PROFILE` and `ARBOR_LOG`.
    ///
    /// Either variable enables its feature when set to anything but `0` or
    /// the empty string.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = |key: &str| lookup(key).is_some_and(|value| !value.is_empty() && value != "0");
        Self {
            benchmark: if enabled("ARBOR_PROFILE") {
                BenchmarkMode::WithWebserver
            } else {
                BenchmarkMode::Off
            },
            install_logger: enabled("ARBOR_LOG"),
        }
    }

    /// Apply the process-wide parts of the configuration.
    ///
    /// Call once at startup, before the first render root is built.
    pub fn apply(&self) {
        if self.install_logger {
            crate::logging::init();
        }
        match self.benchmark {
            BenchmarkMode::Off => {}
            BenchmarkMode::WithWebserver => init_profiling(ProfilingBackend::PuffinHttp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_inert() {
        let config = Config::default();
        assert_eq!(config.benchmark, BenchmarkMode::Off);
        assert!(!config.install_logger);
        config.apply();
    }

    #[test]
    fn test_from_lookup_reads_toggles() {
        let config = Config::from_lookup(|key| match key {
            "ARBOR_PROFILE" => Some("1".to_owned()),
            "ARBOR_LOG" => Some("0".to_owned()),
            _ => None,
        });
        assert_eq!(config.benchmark, BenchmarkMode::WithWebserver);
        assert!(!config.install_logger);

        let config = Config::from_lookup(|_| None);
        assert_eq!(config.benchmark, BenchmarkMode::Off);
        assert!(!config.install_logger);
    }
}
