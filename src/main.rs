use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hu_notebook::api::VocabularyApiClient;
use hu_notebook::config::{CardSource, Config};
use hu_notebook::db::{self, LogOnError};
use hu_notebook::handlers;
use hu_notebook::scheduler::{
  BackgroundTasks, CardStateSource, LocalCardStates, ReviewScheduler, ScheduleCache, TracingNotifier,
};
use hu_notebook::state::AppState;

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hu_notebook=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::load();

  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");
  {
    let conn = pool.lock().expect("Database lock failed during startup");
    let seeded = db::seed_vocabulary_cards(&conn).log_warn_default("Failed to seed cards");
    if seeded > 0 {
      tracing::info!("Seeded {} starter cards", seeded);
    }
  }

  let source: Arc<dyn CardStateSource> = match config.card_source {
    CardSource::Local => Arc::new(LocalCardStates::new(pool.clone())),
    CardSource::Remote => Arc::new(
      VocabularyApiClient::from_config(&config).expect("Failed to build vocabulary API client"),
    ),
  };
  tracing::info!("Reading card states from {} source", source.name());

  let scheduler = Arc::new(ReviewScheduler::new(
    pool.clone(),
    source,
    Arc::new(TracingNotifier),
    Arc::new(ScheduleCache::new()),
    config.utc_offset(),
  ));
  let mut tasks = BackgroundTasks::spawn(scheduler.clone());

  let app = handlers::router(AppState::new(pool, scheduler)).layer(TraceLayer::new_for_http());

  let bind_addr = config.bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config.port);

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("Server failed to start");

  tasks.shutdown();
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("Failed to listen for shutdown signal: {}", e);
    std::future::pending::<()>().await;
  }
  tracing::info!("Shutting down");
}
