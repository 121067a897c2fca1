//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use news_sentinel::adapters::ai::GeminiAdapter;
use news_sentinel::adapters::persistence::{MemoryReportStore, SqliteRepo};
use news_sentinel::adapters::ui::tui::TuiInputPort;
use news_sentinel::domain::KeyPool;
use news_sentinel::ports::{ClassifierGateway, InputPort, ReportStore};
use news_sentinel::shared::config::{AppConfig, StorageKind};
use news_sentinel::usecases::{ClassificationClient, DetectionService, ReportService, RetryPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config could not be loaded; using defaults");
        AppConfig::default()
    });

    let keys = Arc::new(KeyPool::new(cfg.api_keys()).map_err(|e| {
        anyhow::anyhow!(
            "{}; GEMINI_API_KEY_1..9 and NEWS_SENTINEL_GEMINI_API_KEYS are also read",
            e
        )
    })?);
    info!(keys = keys.len(), "API key pool ready");

    news_sentinel::adapters::ui::init_ui(keys.len());

    // --- Gateway + resilient client ---
    let gateway: Arc<dyn ClassifierGateway> = Arc::new(GeminiAdapter::new(
        cfg.gemini_api_url_or_default(),
        cfg.gemini_model_or_default(),
        Duration::from_secs(cfg.request_timeout_secs_or_default()),
    ));
    let (jitter_min, jitter_max) = cfg.fallback_jitter_ms_or_default();
    let policy = RetryPolicy {
        max_key_attempts: cfg.max_key_attempts_or_default(),
        retry_delay: Duration::from_millis(cfg.retry_delay_ms_or_default()),
        fallback_jitter_min: Duration::from_millis(jitter_min),
        fallback_jitter_max: Duration::from_millis(jitter_max),
    };
    info!(
        model = %cfg.gemini_model_or_default(),
        max_key_attempts = policy.max_key_attempts,
        max_concurrent_calls = cfg.max_concurrent_calls_or_default(),
        "classification client configured"
    );
    let client = Arc::new(ClassificationClient::new(
        gateway,
        Arc::clone(&keys),
        policy,
        cfg.max_concurrent_calls_or_default(),
    ));

    // --- Report store ---
    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let store: Arc<dyn ReportStore> = match cfg.storage_kind() {
        StorageKind::Sqlite => Arc::new(
            SqliteRepo::connect(&data_path)
                .await
                .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
        ),
        StorageKind::Memory => {
            warn!("in-memory report store: reports are lost on exit");
            Arc::new(MemoryReportStore::new())
        }
    };

    // --- Services ---
    let detection = Arc::new(DetectionService::new(client, Arc::clone(&store)));
    let reports = Arc::new(ReportService::new(store, data_path.join("reports")));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        detection,
        reports,
        cfg.stats_days_or_default(),
        cfg.recent_limit_or_default(),
    ));

    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
