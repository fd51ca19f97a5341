//! Runtime configuration

use std::time::Duration;

use byoclock_core::{ClockError, ClockResult};

/// Environment variable for the tick interval (humantime, e.g. `100ms`)
pub const ENV_TICK_INTERVAL: &str = "BYOCLOCK_TICK_INTERVAL";
/// Environment variable for the inbound snapshot buffer size
pub const ENV_SNAPSHOT_BUFFER: &str = "BYOCLOCK_SNAPSHOT_BUFFER";

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(10);
const MAX_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Runtime configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Re-evaluation interval while a clock runs
    pub tick_interval: Duration,
    /// Inbound snapshot channel capacity
    pub snapshot_buffer: usize,
    /// Control command channel capacity
    pub command_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        // ~10 Hz
        RuntimeConfig {
            tick_interval: Duration::from_millis(100),
            snapshot_buffer: 32,
            command_buffer: 16,
        }
    }
}

impl RuntimeConfig {
    /// Smoother display at the cost of more wakeups
    pub fn smooth() -> Self {
        RuntimeConfig {
            tick_interval: Duration::from_millis(50),
            ..Self::default()
        }
    }

    /// Read overrides from the process environment
    pub fn from_env() -> ClockResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `lookup`; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> ClockResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_TICK_INTERVAL) {
            config.tick_interval = humantime::parse_duration(raw.trim()).map_err(|e| {
                ClockError::InvalidConfig(format!("{}={:?}: {}", ENV_TICK_INTERVAL, raw, e))
            })?;
        }

        if let Some(raw) = lookup(ENV_SNAPSHOT_BUFFER) {
            config.snapshot_buffer = raw.trim().parse().map_err(|e| {
                ClockError::InvalidConfig(format!("{}={:?}: {}", ENV_SNAPSHOT_BUFFER, raw, e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ClockResult<()> {
        if !(MIN_TICK_INTERVAL..=MAX_TICK_INTERVAL).contains(&self.tick_interval) {
            return Err(ClockError::InvalidConfig(format!(
                "tick interval {} outside {}..={}",
                humantime::format_duration(self.tick_interval),
                humantime::format_duration(MIN_TICK_INTERVAL),
                humantime::format_duration(MAX_TICK_INTERVAL),
            )));
        }
        if self.snapshot_buffer == 0 || self.command_buffer == 0 {
            return Err(ClockError::InvalidConfig("channel buffers must be non-zero".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.tick_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_overrides() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            (ENV_TICK_INTERVAL, "250ms"),
            (ENV_SNAPSHOT_BUFFER, " 8 "),
        ]))
        .unwrap();

        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.snapshot_buffer, 8);
    }

    #[test]
    fn test_invalid_values() {
        let bad_interval = RuntimeConfig::from_lookup(lookup(&[(ENV_TICK_INTERVAL, "fast")]));
        assert!(matches!(bad_interval, Err(ClockError::InvalidConfig(_))));

        let too_slow = RuntimeConfig::from_lookup(lookup(&[(ENV_TICK_INTERVAL, "5s")]));
        assert!(matches!(too_slow, Err(ClockError::InvalidConfig(_))));

        let zero_buffer = RuntimeConfig::from_lookup(lookup(&[(ENV_SNAPSHOT_BUFFER, "0")]));
        assert!(matches!(zero_buffer, Err(ClockError::InvalidConfig(_))));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var(ENV_TICK_INTERVAL, "50ms");
        let config = RuntimeConfig::from_env();
        std::env::remove_var(ENV_TICK_INTERVAL);

        assert_eq!(config.unwrap(), RuntimeConfig::smooth());
    }
}
