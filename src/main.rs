use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use icp_assess::config::AppConfig;
use icp_assess::db::LogOnError;
use icp_assess::state::AppState;
use icp_assess::{auth, db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "icp_assess=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load();
  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  {
    let conn = pool.lock().expect("Database lock failed during startup");
    db::seed_default_assessment(&conn).expect("Failed to seed default assessment");

    if let Some(purged) =
      auth::db::cleanup_expired_sessions(&conn).log_warn("Failed to purge expired sessions")
    {
      tracing::debug!("Purged {} expired sessions", purged);
    }
  }

  let bind_addr = config.bind_addr.clone();
  let app = handlers::router(AppState::new(pool, config));

  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://{}", bind_addr);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
