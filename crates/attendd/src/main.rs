//! attendd - geofence-triggered attendance service
//!
//! Wires together:
//! - Configuration loading
//! - Store (session token, audit log)
//! - Attendance service client
//! - Location and notification adapters (Linux)
//! - Reconciliation engine and scheduler

use anyhow::{Context, Result, bail};
use attend_api::render_log_table;
use attend_config::{Settings, load_config};
use attend_core::{
    AttendanceEngine, LocationSampler, Notifier, PassReport, Scheduler, SchedulerHandle, Session,
};
use attend_host_linux::{CommandNotificationSink, location_provider};
use attend_remote::{AttendanceApi, HttpAttendanceApi};
use attend_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use attend_util::{SessionToken, database_path, default_config_path, default_data_dir};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::signal::unix::{SignalKind, signal};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// attendd - automatic office check-in and check-out
#[derive(Parser, Debug)]
#[command(name = "attendd")]
#[command(about = "Checks you in and out of the office based on your location", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/attendd/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Data directory override (or set ATTEND_DATA_DIR env var)
    #[arg(short, long, env = "ATTEND_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run the service (default)
    Run,

    /// Save a session token issued by the authentication service
    Login {
        /// Employee token (or set ATTEND_TOKEN env var)
        #[arg(long, env = "ATTEND_TOKEN", hide_env_values = true)]
        token: String,
    },

    /// Remove the saved session token
    Logout,

    /// Run a single pass now and print the result
    Check,

    /// Print the attendance log
    Log,

    /// Print recent audit events
    Audit {
        /// Number of events to show
        #[arg(short = 'n', long, default_value_t = 20)]
        limit: usize,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,
    },
}

/// Open the store in the directory chosen by flag, config, or default
fn open_store(data_dir: &Path) -> Result<Arc<dyn Store>> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    let db_path = database_path(data_dir);
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("Failed to open database {:?}", db_path))?;
    if !store.is_healthy() {
        bail!("Database {:?} failed its health check", db_path);
    }

    info!(db_path = %db_path.display(), "Store initialized");
    Ok(Arc::new(store))
}

fn load_settings(args: &Args) -> Result<Settings> {
    let settings = load_config(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    info!(
        config_path = %args.config.display(),
        api = %settings.service.api_base_url,
        radius_meters = settings.office.radius_meters,
        "Configuration loaded"
    );
    Ok(settings)
}

/// Data directory for commands that do not need the rest of the config
fn data_dir_for(args: &Args) -> Result<PathBuf> {
    if let Some(dir) = &args.data_dir {
        return Ok(dir.clone());
    }
    if args.config.exists() {
        return Ok(load_settings(args)?.service.data_dir);
    }
    Ok(default_data_dir())
}

fn http_api(settings: &Settings) -> Result<Arc<HttpAttendanceApi>> {
    let api = HttpAttendanceApi::new(
        settings.service.api_base_url.clone(),
        settings.service.request_timeout,
    )
    .context("Failed to create attendance service client")?;
    Ok(Arc::new(api))
}

fn build_engine(settings: &Settings, store: Arc<dyn Store>) -> Result<Arc<AttendanceEngine>> {
    let provider = location_provider(&settings.location);
    if !provider.is_available() {
        warn!("No location provider configured, passes will report geolocation as unsupported");
    }

    let sampler = LocationSampler::new(provider, settings.service.location_timeout);
    let notifier = Notifier::new(Arc::new(CommandNotificationSink::new(&settings.notifications)));

    Ok(Arc::new(AttendanceEngine::new(
        settings.office,
        sampler,
        http_api(settings)?,
        notifier,
        store,
    )))
}

fn audit(store: &dyn Store, event: AuditEventType) {
    if let Err(e) = store.append_audit(AuditEvent::new(event)) {
        warn!(error = %e, "Failed to record audit event");
    }
}

/// Main service state
struct Service {
    settings: Settings,
    engine: Arc<AttendanceEngine>,
    store: Arc<dyn Store>,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let settings = load_settings(args)?;
        let data_dir = args
            .data_dir
            .clone()
            .unwrap_or_else(|| settings.service.data_dir.clone());

        let store = open_store(&data_dir)?;
        store.append_audit(AuditEvent::new(AuditEventType::ServiceStarted))?;

        let engine = build_engine(&settings, store.clone())?;

        Ok(Self {
            settings,
            engine,
            store,
        })
    }

    /// Start a session from the saved token and schedule passes for it
    fn start_session(&self) -> Result<(Arc<Session>, SchedulerHandle)> {
        let token = self.store.load_token().context("Failed to load session token")?;
        let session = Arc::new(Session::new(token));
        if !session.has_token() {
            info!("No session token saved, run `attendd login` to enable auto attendance");
        }
        audit(
            self.store.as_ref(),
            AuditEventType::SessionStarted {
                session_id: session.id().clone(),
            },
        );

        let handle = Scheduler::start(
            self.engine.clone(),
            session.clone(),
            self.settings.service.poll_interval,
        );
        Ok((session, handle))
    }

    async fn end_session(&self, session: &Session, handle: SchedulerHandle, reason: &str) {
        session.end();
        handle.stop().await;
        info!(
            session_id = %session.id(),
            started_at = %attend_util::format_datetime_full(&session.started_at()),
            reason,
            "Session closed"
        );
        audit(
            self.store.as_ref(),
            AuditEventType::SessionEnded {
                session_id: session.id().clone(),
                reason: reason.to_string(),
            },
        );
    }

    async fn run(self) -> Result<()> {
        let mut sigterm =
            signal(SignalKind::terminate()).context("Failed to create SIGTERM handler")?;
        let mut sigint =
            signal(SignalKind::interrupt()).context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup()).context("Failed to create SIGHUP handler")?;

        let (mut session, mut handle) = self.start_session()?;

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }

                // SIGHUP - pick up a token saved by `attendd login` / removed by `attendd logout`
                _ = sighup.recv() => {
                    info!("Received SIGHUP, reloading session");
                    self.end_session(&session, handle, "reload").await;
                    (session, handle) = self.start_session()?;
                }
            }
        }

        info!("Shutting down attendd");
        self.end_session(&session, handle, "shutdown").await;

        if let Err(e) = self
            .store
            .append_audit(AuditEvent::new(AuditEventType::ServiceStopped))
        {
            warn!(error = %e, "Failed to log service shutdown");
        }

        info!("Shutdown complete");
        Ok(())
    }
}

fn login(args: &Args, token: &str) -> Result<()> {
    let Some(token) = SessionToken::new(token) else {
        bail!("Token must not be empty");
    };

    let store = open_store(&data_dir_for(args)?)?;
    store.save_token(&token).context("Failed to save session token")?;
    audit(store.as_ref(), AuditEventType::TokenSaved);

    println!("Token saved. Send SIGHUP to a running attendd to pick it up.");
    Ok(())
}

fn logout(args: &Args) -> Result<()> {
    let store = open_store(&data_dir_for(args)?)?;
    if store.clear_token().context("Failed to remove session token")? {
        audit(store.as_ref(), AuditEventType::TokenCleared);
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

async fn check(args: &Args) -> Result<()> {
    let settings = load_settings(args)?;
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| settings.service.data_dir.clone());
    let store = open_store(&data_dir)?;

    let engine = build_engine(&settings, store.clone())?;
    let session = Session::new(store.load_token()?);

    let report = engine.run_pass(&session).await;
    let snapshot = engine.snapshot();
    let (latitude, longitude) = snapshot.location_lines();

    println!("{}", snapshot.status);
    println!("Latitude:  {}", latitude);
    println!("Longitude: {}", longitude);
    match &report {
        PassReport::Completed(outcome) => {
            println!(
                "Distance:  {:.1} m (radius {} m), action: {:?}",
                outcome.distance_meters,
                engine.office().radius_meters,
                outcome.action
            );
        }
        PassReport::Failed(e) => println!("Pass failed: {}", e),
        _ => {}
    }
    if let Some(banner) = &snapshot.banner {
        println!("{}: {}", banner.title, banner.body);
    }
    if !snapshot.log.is_empty() {
        println!();
        print!("{}", render_log_table(&snapshot.log));
    }
    Ok(())
}

async fn show_log(args: &Args) -> Result<()> {
    let settings = load_settings(args)?;
    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(|| settings.service.data_dir.clone());
    let store = open_store(&data_dir)?;

    let Some(token) = store.load_token()? else {
        bail!("Please log in or register to enable auto attendance.");
    };

    let records = http_api(&settings)?
        .list_attendance(&token)
        .await
        .context("Failed to fetch attendance log")?;
    print!("{}", render_log_table(&records));
    Ok(())
}

fn show_audit(args: &Args, limit: usize, json: bool) -> Result<()> {
    let store = open_store(&data_dir_for(args)?)?;
    let events = store.get_recent_audits(limit)?;

    for event in events.iter().rev() {
        if json {
            println!("{}", serde_json::to_string(event)?);
        } else {
            println!(
                "{}  {}",
                attend_util::format_datetime_full(&event.timestamp),
                event.event
            );
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match &args.command {
        None | Some(Cmd::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "attendd starting");
            let service = Service::new(&args)?;
            service.run().await
        }
        Some(Cmd::Login { token }) => login(&args, token),
        Some(Cmd::Logout) => logout(&args),
        Some(Cmd::Check) => check(&args).await,
        Some(Cmd::Log) => show_log(&args).await,
        Some(Cmd::Audit { limit, json }) => show_audit(&args, *limit, *json),
    }
}
