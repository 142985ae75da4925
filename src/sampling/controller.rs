use anyhow::{bail, Context, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::loop_worker::{sampling_loop, SamplerContext};

/// Owns the one live sampling task. Starting while a previous loop is still
/// alive is refused, and stopping cancels and then joins the task, so no
/// tick armed before a stop can fire after a restart.
pub(crate) struct SamplerController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl SamplerController {
    pub(crate) fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub(crate) fn start_sampling(&mut self, ctx: SamplerContext) -> Result<()> {
        // A finished handle is a loop that stopped itself (capability loss);
        // clear it so the session can be restarted.
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                self.handle = Some(handle);
                bail!("sampler already active");
            }
        }

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(sampling_loop(ctx, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    /// Idempotent: stopping with no live loop is a no-op.
    pub(crate) async fn stop_sampling(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("sampling loop task failed to join")?;
        }
        Ok(())
    }
}
