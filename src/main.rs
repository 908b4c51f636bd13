//! TheLab - laboratory management data layer, driven from the command line.

use std::path::PathBuf;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use thelab as app;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use app::config::{AppConfig, ConfigLoadResult};
use app::context::AppContext;
use app::export;

/// Laboratory management: documents, bookings, quality and safety records.
#[derive(Parser)]
#[command(name = "thelab", version)]
struct Cli {
    /// Dev mode: config.toml from current directory, in-memory storage, dev user
    #[arg(long)]
    dev: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Treat the platform as preferring dark mode
    #[arg(long)]
    dark: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and keep the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show or toggle the theme
    Theme {
        #[arg(long)]
        toggle: bool,
    },
    /// List controlled documents
    Documents,
    /// Revision history of one document
    Revisions { document: String },
    /// Bookable slots of an instrument on a day
    Slots { instrument: String, date: String },
    /// Export a dataset as CSV
    Export {
        dataset: Dataset,
        /// File name without extension
        #[arg(long)]
        name: Option<String>,
    },
    /// Export the current view as PDF
    ExportPdf {
        #[arg(long, default_value = "report")]
        element: String,
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Dataset {
    Documents,
    Revisions,
    NonConformities,
    Incidents,
    Instruments,
    Bookings,
    Tasks,
}

impl Dataset {
    fn prefix(self) -> &'static str {
        match self {
            Dataset::Documents => "documents",
            Dataset::Revisions => "revisions",
            Dataset::NonConformities => "non_conformities",
            Dataset::Incidents => "incidents",
            Dataset::Instruments => "instruments",
            Dataset::Bookings => "bookings",
            Dataset::Tasks => "tasks",
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = match (&cli.config, cli.dev) {
        (Some(path), _) => path.clone(),
        (None, true) => PathBuf::from("config.toml"),
        (None, false) => AppConfig::default_path(),
    };

    let (mut config, load_note) = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => (config, None),
        ConfigLoadResult::Missing => (AppConfig::default(), None),
        ConfigLoadResult::Invalid(e) => (AppConfig::default(), Some(e.to_string())),
    };
    if cli.dev {
        config.auth.dev_mode = true;
    }
    if cli.dark {
        config.ui.prefer_dark = true;
    }

    let _log_guard = init_logging(&config);

    tracing::info!("TheLab starting...");
    tracing::info!("Config path: {:?}", config_path);
    match load_note {
        Some(e) => tracing::warn!("Config invalid, using defaults: {}", e),
        None if config_path.exists() => tracing::info!("Config loaded successfully"),
        None => tracing::info!("Config missing, using defaults"),
    }

    let ctx = AppContext::open(config).context("Failed to open application context")?;
    ctx.init().await;

    run(&ctx, cli.command).await
}

/// Console logging plus an optional daily log file. The guard must outlive `main`'s work.
fn init_logging(config: &AppConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let console = fmt::layer().with_writer(std::io::stderr);

    let (file, guard) = if config.logging.file {
        let appender = tracing_appender::rolling::daily(config.data_dir(), "thelab.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry().with(filter).with(console).with(file).init();
    guard
}

async fn run(ctx: &AppContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            if !ctx.auth.login(&email, &password).await {
                bail!(ctx.auth.error().unwrap_or_else(|| "Login failed".to_string()));
            }
            if let Some(user) = ctx.auth.current_user() {
                println!("Signed in as {} ({})", user.name, user.role);
            }
        }
        Command::Logout => {
            ctx.auth.logout().await;
            println!("Signed out");
        }
        Command::Theme { toggle } => {
            let dark = if toggle { ctx.theme.toggle() } else { ctx.theme.is_dark() };
            println!("{}", if dark { "dark" } else { "light" });
        }
        command => {
            require_login(ctx)?;
            run_authenticated(ctx, command)?;
        }
    }
    Ok(())
}

fn require_login(ctx: &AppContext) -> anyhow::Result<()> {
    if let Some(error) = ctx.auth.error() {
        tracing::warn!("Session restore reported: {}", error);
    }
    if !ctx.auth.is_authenticated() {
        bail!("Not signed in. Run `thelab login` first.");
    }
    Ok(())
}

fn run_authenticated(ctx: &AppContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Whoami => {
            if let Some(user) = ctx.auth.current_user() {
                println!("{} <{}> [{}]", user.name, user.email, user.role);
            }
        }
        Command::Documents => {
            for doc in ctx.documents.documents() {
                println!(
                    "{:<13} {:<12} v{:<5} {:<18} {}",
                    doc.id,
                    doc.status.as_str(),
                    doc.version,
                    doc.doc_type.as_str(),
                    doc.title
                );
            }
        }
        Command::Revisions { document } => {
            if ctx.documents.get(&document).is_none() {
                bail!("Document {} not found", document);
            }
            for rev in ctx.documents.get_revisions(&document) {
                println!("{} v{:<5} {} {:<20} {}", rev.id, rev.version, rev.changed_at, rev.changed_by, rev.summary);
            }
        }
        Command::Slots { instrument, date } => {
            let day = parse_flexible_date(&date).with_context(|| format!("Invalid date: {date}"))?;
            let Some(inst) = ctx.bookings.get_instrument(&instrument) else {
                bail!("Instrument {} not found", instrument);
            };
            println!("{} on {}", inst.name, day);
            for slot in ctx.bookings.time_slots(&instrument, day) {
                let state = match (&slot.booking, slot.available) {
                    (Some(b), _) => format!("booked by {}", b.user_name),
                    (None, true) => "free".to_string(),
                    (None, false) => "unavailable".to_string(),
                };
                println!("  {} - {}  {}", slot.start.format("%H:%M"), slot.end.format("%H:%M"), state);
            }
        }
        Command::Export { dataset, name } => {
            let filename = name.unwrap_or_else(|| export::generate_export_filename(dataset.prefix()));
            let dir = ctx.config.export_dir();
            let written = match dataset {
                Dataset::Documents => export::export_to_csv(&ctx.documents.documents(), &filename, &dir)?,
                Dataset::Revisions => export::export_to_csv(&ctx.documents.revisions(), &filename, &dir)?,
                Dataset::NonConformities => {
                    export::export_to_csv(&ctx.quality.non_conformities(), &filename, &dir)?
                }
                Dataset::Incidents => export::export_to_csv(&ctx.safety.incidents(), &filename, &dir)?,
                Dataset::Instruments => export::export_to_csv(&ctx.bookings.instruments(), &filename, &dir)?,
                Dataset::Bookings => export::export_to_csv(&ctx.bookings.bookings(), &filename, &dir)?,
                Dataset::Tasks => export::export_to_csv(&ctx.kanban.tasks(), &filename, &dir)?,
            };
            match written {
                Some(path) => println!("Wrote {}", path.display()),
                None => println!("No data to export"),
            }
        }
        Command::ExportPdf { element, name } => {
            let filename = name.unwrap_or_else(|| export::generate_export_filename("report"));
            if let Err(e) = export::export_to_pdf(&element, &filename) {
                println!("{}", e.user_message());
            }
        }
        Command::Login { .. } | Command::Logout | Command::Theme { .. } => {}
    }
    Ok(())
}

/// Parse a date typed in any of the usual separators (`2026-02-16`, `2026/02/16`, `2026.02.16`).
fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    for fmt in &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return Some(date);
        }
    }
    None
}
