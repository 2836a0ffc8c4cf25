//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::abi::Address;
use crate::guard::Guard;

/// Note attached to every event emitted while bootstrapping
pub const BOOTSTRAP_NOTE: &str = "bootstrap";

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub guard: GuardConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuardConfig {
    /// Governance identity; the only address that may change the policy
    #[serde(default)]
    pub governance: String,
    /// Policy snapshot file
    #[serde(default = "default_policy_file")]
    pub policy_file: String,
    /// JSON-lines audit trail of policy events
    #[serde(default = "default_audit_log")]
    pub audit_log: String,
}

/// Initial policy applied by `guard init`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    /// Hot wallets allowed to send (and to receive swap output)
    #[serde(default)]
    pub senders: Vec<String>,
    #[serde(default)]
    pub withdraw_destinations: Vec<String>,
    /// Tokens allowed as swap legs
    #[serde(default)]
    pub assets: Vec<String>,
    /// Tokens whose transfer/approve call sites are allowed
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Routers whose swap call site and approvals are allowed
    #[serde(default)]
    pub routers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value functions
fn default_policy_file() -> String {
    "policy.json".to_string()
}

fn default_audit_log() -> String {
    "audit.jsonl".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_env(path.as_ref(), None)
    }

    /// Load with an explicit environment map instead of the process environment
    fn load_with_env(path: &Path, env: Option<config::Map<String, String>>) -> Result<Self> {
        let settings = config::Config::builder()
            // Start with defaults
            .set_default("guard.policy_file", default_policy_file())?
            .set_default("guard.audit_log", default_audit_log())?
            .set_default("logging.level", default_log_level())?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (GUARD__<SECTION>__<KEY>).
            // Values stay strings: bare-hex addresses can be all digits.
            .add_source(
                config::Environment::with_prefix("GUARD")
                    .separator("__")
                    .source(env),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.guard.governance.trim().is_empty() {
            anyhow::bail!("guard.governance must be set");
        }
        self.governance()?;

        if self.guard.policy_file.trim().is_empty() {
            anyhow::bail!("guard.policy_file cannot be empty");
        }

        let b = &self.bootstrap;
        for (field, list) in [
            ("senders", &b.senders),
            ("withdraw_destinations", &b.withdraw_destinations),
            ("assets", &b.assets),
            ("tokens", &b.tokens),
            ("routers", &b.routers),
        ] {
            parse_addresses(list).with_context(|| format!("Invalid bootstrap.{}", field))?;
        }

        Ok(())
    }

    /// Parsed governance address
    pub fn governance(&self) -> Result<Address> {
        self.guard
            .governance
            .parse()
            .with_context(|| format!("Invalid guard.governance: {}", self.guard.governance))
    }

    /// Build a fresh guard and apply the bootstrap lists as governance
    pub fn bootstrap_guard(&self) -> Result<Guard> {
        let governance = self.governance()?;
        let mut guard = Guard::new(governance);
        let b = &self.bootstrap;

        for sender in parse_addresses(&b.senders)? {
            guard.allow_sender(governance, sender, BOOTSTRAP_NOTE)?;
        }
        for destination in parse_addresses(&b.withdraw_destinations)? {
            guard.allow_withdraw_destination(governance, destination, BOOTSTRAP_NOTE)?;
        }
        for asset in parse_addresses(&b.assets)? {
            guard.allow_asset(governance, asset, BOOTSTRAP_NOTE)?;
        }
        for token in parse_addresses(&b.tokens)? {
            guard.whitelist_token(governance, token, BOOTSTRAP_NOTE)?;
        }
        for router in parse_addresses(&b.routers)? {
            guard.whitelist_router(governance, router, BOOTSTRAP_NOTE)?;
        }

        Ok(guard)
    }

    /// Get configuration for display
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  Guard:
    governance: {}
    policy_file: {}
    audit_log: {}
  Bootstrap:
    senders: {}
    withdraw_destinations: {}
    assets: {}
    tokens: {}
    routers: {}
  Logging:
    level: {}
    json: {}
"#,
            self.guard.governance,
            self.guard.policy_file,
            self.guard.audit_log,
            self.bootstrap.senders.len(),
            self.bootstrap.withdraw_destinations.len(),
            self.bootstrap.assets.len(),
            self.bootstrap.tokens.len(),
            self.bootstrap.routers.len(),
            self.logging.level,
            self.logging.json,
        )
    }
}

fn parse_addresses(list: &[String]) -> Result<Vec<Address>> {
    list.iter()
        .map(|s| {
            s.parse::<Address>()
                .with_context(|| format!("Invalid address: {}", s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::SELECTORS;

    const GOV: &str = "0x0101010101010101010101010101010101010101";

    fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("guard.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_load_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, &format!("[guard]\ngovernance = \"{}\"\n", GOV));

        let config = Config::load(&path).unwrap();
        assert_eq!(config.guard.policy_file, "policy.json");
        assert_eq!(config.guard.audit_log, "audit.jsonl");
        assert_eq!(config.logging.level, "info");
        assert!(config.bootstrap.senders.is_empty());
    }

    #[test]
    fn test_env_override_keeps_digit_only_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, &format!("[guard]\ngovernance = \"{}\"\n", GOV));

        let mut env = config::Map::new();
        env.insert(
            "GUARD__GUARD__GOVERNANCE".to_string(),
            "0000000000000000000000000000000000000001".to_string(),
        );
        env.insert("GUARD__LOGGING__JSON".to_string(), "true".to_string());

        let config = Config::load_with_env(&path, Some(env)).unwrap();
        assert_eq!(config.governance().unwrap(), Address::with_last_byte(1));
        assert!(config.logging.json);
    }

    #[test]
    fn test_invalid_bootstrap_address_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            &format!(
                "[guard]\ngovernance = \"{}\"\n[bootstrap]\nsenders = [\"0x1234\"]\n",
                GOV
            ),
        );

        let err = Config::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("bootstrap.senders"));
    }

    #[test]
    fn test_bootstrap_guard() {
        let dir = tempfile::tempdir().unwrap();
        let router = "0x5252525252525252525252525252525252525252";
        let token = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let hot = "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e";
        let path = write_config(
            &dir,
            &format!(
                r#"
[guard]
governance = "{gov}"

[bootstrap]
senders = ["{hot}"]
assets = ["{token}"]
tokens = ["{token}"]
routers = ["{router}"]
"#,
                gov = GOV,
                hot = hot,
                token = token,
                router = router
            ),
        );

        let config = Config::load(&path).unwrap();
        let guard = config.bootstrap_guard().unwrap();
        let policy = guard.policy();
        let router: Address = router.parse().unwrap();
        let token: Address = token.parse().unwrap();

        assert_eq!(guard.owner(), config.governance().unwrap());
        assert!(policy.is_allowed_sender(hot.parse().unwrap()));
        assert!(policy.is_allowed_asset(token));
        assert!(policy.is_allowed_call_site(token, SELECTORS::TRANSFER));
        assert!(policy.is_allowed_call_site(router, SELECTORS::SWAP_TOKENS_FOR_EXACT_TOKENS));
        assert!(policy.is_allowed_approval_destination(router));
        assert_eq!(policy.call_site_count(), 3);
        assert!(guard.events().iter().all(|e| e.note == BOOTSTRAP_NOTE));
    }
}
