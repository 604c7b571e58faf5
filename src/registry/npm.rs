use std::path::Path;
use std::time::Duration;

use log::info;

use crate::config::RegistryConfig;
use crate::error::Result;
use crate::process;

/// Publishes through the npm CLI (or any command configured in its place)
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl NpmRegistry {
    pub fn new(config: &RegistryConfig, timeout: Duration) -> Self {
        NpmRegistry {
            command: config.command.clone(),
            args: config.args.clone(),
            timeout,
        }
    }
}

impl super::Registry for NpmRegistry {
    fn publish(&self, package_dir: &Path) -> Result<()> {
        let operation = format!("{} {}", self.command, self.args.join(" "));
        process::run_bounded(&operation, &self.command, &self.args, package_dir, self.timeout)?;
        info!("published {}", package_dir.display());
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use tempfile::TempDir;

    fn registry(command: &str, args: &[&str]) -> NpmRegistry {
        let config = RegistryConfig {
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        };
        NpmRegistry::new(&config, Duration::from_secs(10))
    }

    #[test]
    fn test_publish_runs_in_package_directory() {
        let temp = TempDir::new().unwrap();
        let registry = registry("sh", &["-c", "touch published.marker"]);

        registry.publish(temp.path()).unwrap();

        assert!(temp.path().join("published.marker").exists());
    }

    #[test]
    fn test_publish_failure_is_external() {
        let temp = TempDir::new().unwrap();
        let registry = registry("sh", &["-c", "exit 1"]);

        let err = registry.publish(temp.path()).unwrap_err();
        assert!(err.is_external());
    }
}
