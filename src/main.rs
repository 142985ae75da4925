use std::time::Duration;

use anyhow::Result;
use log::info;

use postura::{MockDetectionSource, PostureApp, SettingsStore};

/// Headless demo: grant the capture capability, run a short mock-driven
/// session, and log what the dashboard surfaces would render.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("postura demo starting up...");

    let settings_path = std::env::temp_dir().join("postura-settings.json");
    let settings = SettingsStore::new(settings_path)?;
    let app = PostureApp::new(settings, Box::new(MockDetectionSource::from_entropy()));

    let capture = app.session().capture();
    capture.request();
    capture.grant();

    let mut events = app.session().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            info!("event: {:?}", event);
        }
    });

    app.start_analysis().await?;
    tokio::time::sleep(Duration::from_secs(5)).await;
    let record = app.stop_analysis().await?;

    info!(
        "session {} finished: {}s, avg score {:.1}, best {}",
        record.id, record.duration_secs, record.avg_score, record.best_score
    );

    let snapshot = app.session().snapshot().await;
    for item in &snapshot.feedback {
        info!("advisory: {}", item.message);
    }

    let stats = app.dashboard_stats().await;
    info!(
        "dashboard: score {}%, {} sessions today, {} alerts, {} day streak",
        stats.posture_score, stats.sessions_today, stats.active_alerts, stats.streak_days
    );

    Ok(())
}
