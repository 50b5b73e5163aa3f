//! Configuration types.

use std::time::Duration;

/// What happens when a sandbox session is created for a user/environment
/// pair that already has an active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupersedePolicy {
    /// End the prior session implicitly (last writer wins).
    Replace,
    /// Refuse the new session with `SandboxError::SessionAlreadyActive`.
    Reject,
}

/// Sandbox tutorial engine configuration.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// How long a sandbox session lives before lazy expiry.
    pub session_ttl: Duration,
    /// Behavior when a second session is created for the same
    /// (user, environment) pair.
    pub supersede: SupersedePolicy,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::from_secs(1800), // 30 minutes
            supersede: SupersedePolicy::Replace,
        }
    }
}
