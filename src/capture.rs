use std::sync::{Arc, RwLock};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Lifecycle of the capture device permission. Sampling may only run while
/// the capability is `Granted`; every other state refuses a session start.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CaptureCapability {
    Unavailable,
    Requesting,
    Granted,
    Denied,
}

impl Default for CaptureCapability {
    fn default() -> Self {
        CaptureCapability::Unavailable
    }
}

/// Shared gate the embedder drives as the platform permission flow resolves.
/// The sampler only ever reads it.
#[derive(Clone, Default)]
pub struct CaptureGate {
    inner: Arc<RwLock<CaptureCapability>>,
}

impl CaptureGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> CaptureCapability {
        *self.inner.read().unwrap()
    }

    /// Begin the permission flow; resolves later via `grant` or `deny`.
    pub fn request(&self) {
        *self.inner.write().unwrap() = CaptureCapability::Requesting;
    }

    pub fn grant(&self) {
        *self.inner.write().unwrap() = CaptureCapability::Granted;
    }

    pub fn deny(&self) {
        *self.inner.write().unwrap() = CaptureCapability::Denied;
    }

    /// Device went away (unplugged, revoked mid-session).
    pub fn revoke(&self) {
        *self.inner.write().unwrap() = CaptureCapability::Unavailable;
    }

    pub fn is_granted(&self) -> bool {
        self.current() == CaptureCapability::Granted
    }

    pub fn ensure_granted(&self) -> Result<()> {
        match self.current() {
            CaptureCapability::Granted => Ok(()),
            CaptureCapability::Denied => {
                bail!("capture permission denied; check device permissions")
            }
            CaptureCapability::Requesting => bail!("capture permission request still pending"),
            CaptureCapability::Unavailable => bail!("no capture device available"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unavailable() {
        let gate = CaptureGate::new();
        assert_eq!(gate.current(), CaptureCapability::Unavailable);
        assert!(!gate.is_granted());
    }

    #[test]
    fn full_grant_flow() {
        let gate = CaptureGate::new();
        gate.request();
        assert!(gate.ensure_granted().is_err());
        gate.grant();
        assert!(gate.ensure_granted().is_ok());
        gate.revoke();
        assert!(!gate.is_granted());
    }

    #[test]
    fn denied_gate_refuses() {
        let gate = CaptureGate::new();
        gate.request();
        gate.deny();
        let err = gate.ensure_granted().unwrap_err();
        assert!(err.to_string().contains("denied"));
    }
}
