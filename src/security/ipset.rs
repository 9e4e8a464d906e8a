use crate::core::error::BlockError;
use crate::security::blocklist::Blocklist;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Blocklist backed by a Linux `ipset` set with per-entry timeouts
///
/// The set is expected to be referenced by an iptables/nftables DROP rule;
/// this type only manages membership.
#[derive(Debug, Clone)]
pub struct IpsetBlocklist {
    set_name: String,
    program: String,
}

impl IpsetBlocklist {
    pub fn new(set_name: impl Into<String>) -> Self {
        Self::with_program(set_name, "ipset")
    }

    /// Use a different executable in place of `ipset`
    pub fn with_program(set_name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            set_name: set_name.into(),
            program: program.into(),
        }
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    pub fn add_args(&self, address: &str, timeout_secs: u64) -> Vec<String> {
        vec![
            "add".to_string(),
            self.set_name.clone(),
            address.to_string(),
            "timeout".to_string(),
            timeout_secs.to_string(),
            "-exist".to_string(),
        ]
    }

    pub fn create_args(&self, default_timeout_secs: u64) -> Vec<String> {
        vec![
            "create".to_string(),
            self.set_name.clone(),
            "hash:ip".to_string(),
            "timeout".to_string(),
            default_timeout_secs.to_string(),
            "-exist".to_string(),
        ]
    }

    /// Create the set if it does not exist yet
    pub async fn ensure_set(&self, default_timeout_secs: u64) -> Result<(), BlockError> {
        self.run(&self.create_args(default_timeout_secs)).await?;
        info!(set = %self.set_name, "ipset set ready");
        Ok(())
    }

    async fn run(&self, args: &[String]) -> Result<(), BlockError> {
        debug!(program = %self.program, args = ?args, "Running blocklist command");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(BlockError::Rejected {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Blocklist for IpsetBlocklist {
    async fn block(&self, address: &str, timeout_secs: u64) -> Result<(), BlockError> {
        self.run(&self.add_args(address, timeout_secs)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_args() {
        let ipset = IpsetBlocklist::new("xunlei_blacklist");
        assert_eq!(
            ipset.add_args("203.0.113.9", 86400),
            vec!["add", "xunlei_blacklist", "203.0.113.9", "timeout", "86400", "-exist"]
        );
    }

    #[test]
    fn test_create_args() {
        let ipset = IpsetBlocklist::new("leechers");
        assert_eq!(
            ipset.create_args(3600),
            vec!["create", "leechers", "hash:ip", "timeout", "3600", "-exist"]
        );
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let ipset = IpsetBlocklist::with_program("set", "/nonexistent/peer-guard-ipset");
        let result = ipset.block("203.0.113.9", 60).await;
        assert!(matches!(result, Err(BlockError::Spawn(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_rejected() {
        let ipset = IpsetBlocklist::with_program("set", "false");
        let result = ipset.block("203.0.113.9", 60).await;
        assert!(matches!(result, Err(BlockError::Rejected { code: Some(1), .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_is_applied() {
        let ipset = IpsetBlocklist::with_program("set", "true");
        assert!(ipset.block("203.0.113.9", 60).await.is_ok());
        assert!(ipset.ensure_set(60).await.is_ok());
    }
}
