use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    capture::CaptureGate,
    feedback::FeedbackQueue,
    history::SessionLog,
    metrics::MetricStore,
    session::{EngineEvent, SessionState, SessionStatus},
};

use super::detector::DetectionSource;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

// Import the logging macros (exported at crate root)
use crate::{log_info, log_warn};

/// Everything one sampling run needs, cloned out of the controller so the
/// spawned task owns its handles outright.
pub(crate) struct SamplerContext {
    pub(crate) state: Arc<Mutex<SessionState>>,
    pub(crate) metrics: MetricStore,
    pub(crate) feedback: FeedbackQueue,
    pub(crate) capture: CaptureGate,
    pub(crate) history: SessionLog,
    pub(crate) detector: Arc<Mutex<Box<dyn DetectionSource>>>,
    pub(crate) events: broadcast::Sender<EngineEvent>,
    pub(crate) tick_interval: Duration,
    pub(crate) heartbeat_every_ticks: u32,
}

/// Drives one tick per interval until cancelled, the session leaves Running,
/// or the capture capability goes away. The first tick lands one full
/// interval after start, matching the dashboard's cadence.
pub(crate) async fn sampling_loop(ctx: SamplerContext, cancel_token: CancellationToken) {
    let mut ticker = time::interval_at(Instant::now() + ctx.tick_interval, ctx.tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !ctx.capture.is_granted() {
                    log_warn!("capture capability lost, stopping sampler");
                    let elapsed_secs = {
                        let mut state = ctx.state.lock().await;
                        state.stop();
                        state.elapsed_secs
                    };
                    let _ = ctx.events.send(EngineEvent::StateChanged {
                        status: SessionStatus::Stopped,
                        elapsed_secs,
                    });
                    break;
                }

                let elapsed_secs = {
                    let mut state = ctx.state.lock().await;
                    if state.status != SessionStatus::Running {
                        break;
                    }
                    state.tick()
                };

                ticks = ticks.wrapping_add(1);
                let score = perform_sample(&ctx).await;

                if ticks % ctx.heartbeat_every_ticks == 0 {
                    let _ = ctx.events.send(EngineEvent::Heartbeat { elapsed_secs, score });
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("sampling loop shutting down");
                break;
            }
        }
    }
}

/// One measurement: pull a detection, fold it into the metric store, queue
/// the advisory, publish the score. Returns the updated score.
async fn perform_sample(ctx: &SamplerContext) -> u8 {
    let detection = {
        let mut detector = ctx.detector.lock().await;
        detector.sample()
    };

    ctx.history.note_detection(&detection.label).await;

    let reading = ctx.metrics.apply_sample(&detection).await;
    // Fire-and-forget: the score sink owes us no acknowledgment.
    let _ = ctx.events.send(EngineEvent::ScoreUpdated {
        score: reading.score,
    });

    if let Some(message) = detection.advisory {
        ctx.feedback.push(message.clone()).await;
        let _ = ctx.events.send(EngineEvent::FeedbackIssued { message });
    }

    reading.score
}
