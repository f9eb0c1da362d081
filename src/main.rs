//! Mawaheb Backend - Education Tracking Server
//! Mission: Student records, GPA roll-ups, and admin reporting over REST

use anyhow::{Context, Result};
use dotenv::dotenv;
use mawaheb_backend::api::{create_router, AppState};
use mawaheb_backend::auth::{JwtHandler, UserStore};
use mawaheb_backend::config::Config;
use mawaheb_backend::mailer::{HttpMailer, LogMailer, Mailer};
use mawaheb_backend::store::{
    RecordStore, ReportStore, ScholarshipStore, SemesterStore, TicketStore, UniversityStore,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mawaheb_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    info!("🎓 Starting Mawaheb backend on {}", config.bind_addr);

    let users = Arc::new(UserStore::new(&config.database_path)?);
    let records = Arc::new(RecordStore::new(&config.database_path)?);
    let semesters = Arc::new(SemesterStore::new(&config.database_path)?);
    let universities = Arc::new(UniversityStore::new(&config.database_path)?);
    let scholarships = Arc::new(ScholarshipStore::new(&config.database_path)?);
    let tickets = Arc::new(TicketStore::new(&config.database_path)?);
    let reports = Arc::new(ReportStore::new(&config.database_path)?);

    info!("✅ Database ready at {}", config.database_path);

    let jwt = Arc::new(JwtHandler::with_expiration(
        config.jwt_secret.clone(),
        config.jwt_expires_hours,
    ));

    let mailer: Arc<dyn Mailer> = match &config.mail_api_url {
        Some(api_url) => {
            let client = reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .context("Failed to build HTTP client")?;
            Arc::new(HttpMailer::new(
                client,
                api_url.clone(),
                config.mail_from.clone(),
            ))
        }
        None => Arc::new(LogMailer),
    };

    let state = AppState {
        users,
        records,
        semesters,
        universities,
        scholarships,
        tickets,
        reports,
        jwt,
        mailer,
        reset_link_base: config.reset_link_base.clone(),
    };

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    info!("🚀 Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
