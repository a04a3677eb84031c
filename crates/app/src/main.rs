use std::fmt;

use services::{
    ApiConfig, AppServices, Clock, ControllerSignal, ShowcaseConfig, ShowcaseController,
};
use showcase_core::model::{AccessToken, RefreshToken, Session, UserId};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ui::vm::IndexPageVm;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user-id value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  showcase browse [--query <text>] [--category <code>]");
    eprintln!("  showcase login  --user-id <id> --name <name> --access <token> --refresh <token>");
    eprintln!("  showcase logout");
    eprintln!("  showcase watch");
    eprintln!();
    eprintln!("Common flags:");
    eprintln!("  --db <sqlite_url>   --api <base_url>");
    eprintln!();
    eprintln!("In watch mode every stdin line is a search query; `:cat <code>` picks a category.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SHOWCASE_API_URL, SHOWCASE_DB_URL, SHOWCASE_RENEW_INTERVAL_SECS,");
    eprintln!("  SHOWCASE_ACCESS_TTL_SECS, SHOWCASE_LOGO_BASE, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Browse,
    Login,
    Logout,
    Watch,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "browse" => Some(Self::Browse),
            "login" => Some(Self::Login),
            "logout" => Some(Self::Logout),
            "watch" => Some(Self::Watch),
            _ => None,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    db_url: Option<String>,
    api_url: Option<String>,
    query: Option<String>,
    category: Option<String>,
    user_id: Option<UserId>,
    name: Option<String>,
    access: Option<String>,
    refresh: Option<String>,
}

impl Args {
    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match (cmd, arg.as_str()) {
                (_, "--db") => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = Some(normalize_sqlite_url(value));
                }
                (_, "--api") => parsed.api_url = Some(require_value(args, "--api")?),
                (Command::Browse, "--query") => {
                    parsed.query = Some(require_value(args, "--query")?);
                }
                (Command::Browse, "--category") => {
                    parsed.category = Some(require_value(args, "--category")?);
                }
                (Command::Login, "--user-id") => {
                    let value = require_value(args, "--user-id")?;
                    let id = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    parsed.user_id = Some(id);
                }
                (Command::Login, "--name") => parsed.name = Some(require_value(args, "--name")?),
                (Command::Login, "--access") => {
                    parsed.access = Some(require_value(args, "--access")?);
                }
                (Command::Login, "--refresh") => {
                    parsed.refresh = Some(require_value(args, "--refresh")?);
                }
                (_, "--help" | "-h") => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if cmd == Command::Login {
            for (flag, present) in [
                ("--user-id", parsed.user_id.is_some()),
                ("--name", parsed.name.is_some()),
                ("--access", parsed.access.is_some()),
                ("--refresh", parsed.refresh.is_some()),
            ] {
                if !present {
                    return Err(ArgsError::MissingFlag { flag });
                }
            }
        }
        Ok(parsed)
    }

    fn apply_to(&self, config: &mut ShowcaseConfig) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(db_url) = &self.db_url {
            config.db_url.clone_from(db_url);
        }
        if let Some(api_url) = &self.api_url {
            config.api = ApiConfig::new(api_url)?;
        }
        Ok(())
    }

    fn session(&self) -> Result<Session, Box<dyn std::error::Error>> {
        let (Some(user_id), Some(name), Some(access), Some(refresh)) =
            (self.user_id, &self.name, &self.access, &self.refresh)
        else {
            return Err(ArgsError::MissingFlag { flag: "--user-id" }.into());
        };
        Ok(Session::new(
            user_id,
            name.as_str(),
            AccessToken::new(access.as_str())?,
            RefreshToken::new(refresh.as_str())?,
        ))
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// `SQLite` refuses to open a missing file, so create it (and its directory) first.
fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url.starts_with("sqlite::memory:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_page(page: &IndexPageVm) {
    if let Some(name) = &page.signed_in_as {
        println!("signed in as {name}");
    }
    if page.is_loading() {
        println!("Loading...");
        return;
    }
    if page.tiles().is_empty() {
        println!("(no matching projects)");
    }
    for tile in page.tiles() {
        println!(
            "#{:<5} [{}] {} - {}  {}  {}",
            tile.id.value(), tile.category, tile.name, tile.blurb, tile.href, tile.logo_src
        );
    }
    println!("categories: {}", page.category_options.join(", "));
}

/// One stdin line in watch mode: `:cat <code>` picks a category, anything else is a query.
#[derive(Debug, PartialEq, Eq)]
enum WatchInput<'a> {
    Category(&'a str),
    Query(&'a str),
}

fn parse_watch_line(line: &str) -> WatchInput<'_> {
    let trimmed = line.trim_start();
    let (command, rest) = trimmed
        .split_once(char::is_whitespace)
        .unwrap_or((trimmed, ""));
    if command == ":cat" {
        WatchInput::Category(rest.trim())
    } else {
        WatchInput::Query(line)
    }
}

async fn watch(
    controller: &mut ShowcaseController,
    logo_base: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    print_page(&IndexPageVm::from_controller(controller, logo_base));
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_watch_line(&line) {
                    WatchInput::Category(code) => controller.select_category(code),
                    WatchInput::Query(query) => controller.search_input(query),
                }
                print_page(&IndexPageVm::from_controller(controller, logo_base));
            }
            event = controller.next_session_event() => {
                let Some(event) = event else {
                    break;
                };
                if controller.handle_session_event(&event).await == Some(ControllerSignal::Reloaded) {
                    println!("session expired; showcase reloaded");
                    print_page(&IndexPageVm::from_controller(controller, logo_base));
                }
            }
            signal = &mut shutdown => {
                if let Err(err) = signal {
                    warn!(error = %err, "failed to listen for ctrl-c");
                }
                break;
            }
        }
    }
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Without a subcommand the showcase is browsed.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Browse,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Browse,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let mut config = ShowcaseConfig::from_env()?;
    parsed.apply_to(&mut config)?;
    prepare_sqlite_file(&config.db_url)?;

    let services = AppServices::from_config(&config, Clock::default_clock()).await?;
    let sessions = services.sessions();

    match cmd {
        Command::Browse => {
            let mut controller = services.controller();
            controller.mount().await;
            if let Some(category) = &parsed.category {
                controller.select_category(category);
            }
            if let Some(query) = &parsed.query {
                controller.search_input(query);
            }
            print_page(&IndexPageVm::from_controller(&controller, &config.logo_base));
            controller.unmount().await;
        }
        Command::Login => {
            let session = parsed.session()?;
            sessions.login(session).await?;
            sessions.shutdown().await;
            info!("session saved");
        }
        Command::Logout => {
            sessions.logout().await?;
            info!("session cleared");
        }
        Command::Watch => {
            let mut controller = services.controller();
            let report = controller.mount().await;
            info!(session = ?report.session, catalog_loaded = report.catalog_loaded, "mounted");
            let result = watch(&mut controller, &config.logo_base).await;
            controller.unmount().await;
            result?;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
