use anyhow::Result;
use std::time::Duration;

const DEFAULT_VERSION_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(300);
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(150);

#[derive(Debug, Clone)]
pub struct Config {
    /// Bound on each `--version` style probe.
    pub version_timeout: Duration,
    /// Bound on each update command; the subprocess is killed on expiry.
    pub update_timeout: Duration,
    /// Redraw cadence of the status renderer.
    pub tick_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version_timeout: DEFAULT_VERSION_TIMEOUT,
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(secs) = read_env_u64("AIUP_VERSION_TIMEOUT_SECS") {
            config.version_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env_u64("AIUP_UPDATE_TIMEOUT_SECS") {
            config.update_timeout = Duration::from_secs(secs);
        }
        if let Some(millis) = read_env_u64("AIUP_TICK_MILLIS") {
            config.tick_interval = Duration::from_millis(millis);
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.update_timeout < Duration::from_secs(10) {
            eprintln!(
                "⚠️  WARNING: update timeout of {}s is very short; slow package managers will be killed mid-run",
                self.update_timeout.as_secs()
            );
        }
        Ok(())
    }
}

fn read_env_u64(name: &str) -> Option<u64> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            eprintln!("⚠️  WARNING: ignoring invalid {name}={raw:?} (expected a positive integer)");
            None
        }
    }
}
