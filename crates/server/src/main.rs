mod api;
mod seed;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use dunner_channels::email::SmtpEmailGateway;
use dunner_channels::http::{HttpSmsGateway, HttpWhatsAppGateway};
use dunner_channels::noop::LogGateway;
use dunner_channels::{ActionDispatcher, ChannelSet, EmailGateway, SmsGateway, WhatsAppGateway};
use dunner_core::Config;
use dunner_engine::{
    CaseQuery, Clock, InMemoryCaseStore, InMemoryExecutionStore, InMemoryScheduleStore,
    InMemoryStrategyStore, Orchestrator, SchedulerLoop, SystemClock,
};

/// dunner server — strategy engine API and scheduler loop.
#[derive(Parser, Debug)]
#[command(name = "server", version, about)]
struct Cli {
    /// Synthetic allocated cases to seed into the in-memory case store.
    #[arg(long, env = "DUNNER_SEED_CASES", default_value_t = 0)]
    seed_cases: usize,
}

/// Wire channel gateways from config. Anything without vendor settings
/// degrades to the log-only gateway so the engine stays runnable in dev.
fn build_channels(config: &Config) -> ChannelSet {
    let sms: Arc<dyn SmsGateway> = match &config.sms.gateway_url {
        Some(url) => Arc::new(HttpSmsGateway::new(
            url.clone(),
            config.sms.api_key.clone(),
            config.sms.sender_id.clone(),
        )),
        None => {
            warn!("SMS_GATEWAY_URL not set, SMS actions will be logged only");
            Arc::new(LogGateway::new("sms-log"))
        }
    };

    let whatsapp: Arc<dyn WhatsAppGateway> = match &config.whatsapp.gateway_url {
        Some(url) => Arc::new(HttpWhatsAppGateway::new(
            url.clone(),
            config.whatsapp.api_key.clone(),
        )),
        None => {
            warn!("WHATSAPP_GATEWAY_URL not set, WhatsApp actions will be logged only");
            Arc::new(LogGateway::new("whatsapp-log"))
        }
    };

    let email: Arc<dyn EmailGateway> = match SmtpEmailGateway::from_config(&config.smtp) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            warn!(error = %e, "SMTP not configured, email actions will be logged only");
            Arc::new(LogGateway::new("email-log"))
        }
    };

    ChannelSet {
        sms,
        email,
        whatsapp,
        // Extension points: no vendor integration yet.
        notice: Arc::new(LogGateway::new("notice")),
        call: Arc::new(LogGateway::new("call")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    dunner_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();
    let cli = Cli::parse();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cases = Arc::new(InMemoryCaseStore::new());
    if cli.seed_cases > 0 {
        cases.extend(seed::demo_cases(cli.seed_cases)).await;
        info!(count = cli.seed_cases, "seeded demo cases");
    }

    let strategies = Arc::new(InMemoryStrategyStore::new());
    let executions = Arc::new(InMemoryExecutionStore::new());
    let schedules = Arc::new(InMemoryScheduleStore::new());
    let dispatcher = Arc::new(ActionDispatcher::new(build_channels(&config)));

    let orchestrator = Arc::new(Orchestrator::new(
        strategies.clone(),
        executions.clone(),
        cases.clone(),
        dispatcher.clone(),
        clock.clone(),
    ));

    // The scheduler loop runs for the life of the process; each due job
    // is dispatched on its own task inside the loop.
    let scheduler = Arc::new(SchedulerLoop::new(
        schedules.clone(),
        orchestrator.clone(),
        clock.clone(),
        Duration::from_secs(config.scheduler.tick_secs),
    ));
    tokio::spawn(scheduler.run());

    let state = Arc::new(state::AppState {
        config: config.clone(),
        strategies,
        executions,
        schedules,
        cases: cases.clone(),
        query: CaseQuery::new(cases),
        orchestrator,
        dispatcher,
        clock,
    });

    let app = Router::new()
        .route("/health", get(api::health))
        .route("/strategies", get(api::strategies_list).post(api::strategies_create))
        .route(
            "/strategies/{id}",
            get(api::strategies_get)
                .put(api::strategies_update)
                .delete(api::strategies_delete),
        )
        .route("/strategies/{id}/status", post(api::strategies_set_status))
        .route("/strategies/{id}/execute", post(api::strategy_execute))
        .route("/strategies/{id}/simulate", post(api::strategy_simulate))
        .route(
            "/strategies/{id}/scheduler",
            get(api::scheduler_get).post(api::scheduler_configure),
        )
        .route("/executions", get(api::executions_list))
        .route("/executions/{id}", get(api::executions_get))
        .route("/dashboard", get(api::dashboard))
        .route("/channels/{channel}/test", post(api::channel_test))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
