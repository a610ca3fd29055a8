//! Guestbook CLI
//!
//! Command-line guest for a running guestbook server:
//! - Sign the guestbook
//! - List and watch entries live
//! - Delete your own entries
//! - Show the invitation, e-ticket and countdown

use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use guestbook::config::{generate_default_config, Config};
use guestbook::identity::{SessionCache, SessionContext, SessionOrigin};
use guestbook::invitation::{ticking, GuestName, TimeLeft, GUEST_PARAM};
use guestbook::store::Attendance;
use guestbook::sync::{EntryView, GuestForm, GuestbookSynchronizer};
use guestbook::RemoteGuestbook;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const FIRST_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "guestbook")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Sign and follow a wedding guestbook")]
#[command(long_about = "Guestbook is a live RSVP and well-wishes wall.\nLeave your wishes, see everyone else's as they arrive.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Guestbook server URL (default: from config)
    #[arg(long, alias = "api-url", global = true)]
    pub server: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,

    /// Session cache file (default: data dir)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Establish (or reuse) an anonymous session
    Session {
        /// Forget the cached identity first
        #[arg(long)]
        reset: bool,
    },

    /// Sign the guestbook
    Sign {
        /// Your name
        #[arg(short, long)]
        name: Option<String>,
        /// Invitation guest name; fills in and locks the name
        #[arg(long)]
        to: Option<String>,
        /// Attendance: yes or no
        #[arg(short, long)]
        attendance: Option<Attendance>,
        /// Your wishes
        #[arg(short, long)]
        message: String,
    },

    /// List entries, newest first
    List {
        /// Entries to show (default: from config)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Show every entry
        #[arg(long)]
        all: bool,
    },

    /// Follow the guestbook live
    Watch,

    /// Delete one of your own entries
    Delete {
        /// Entry ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the invitation for a guest
    Invite {
        /// Guest name, as in the invitation link
        #[arg(long)]
        to: Option<String>,
    },

    /// Time left until the wedding
    Countdown {
        /// Keep updating every second
        #[arg(long)]
        follow: bool,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "guestbook=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_default();

    let mut remote_config = config.client.to_remote_config();
    if let Some(server) = &cli.server {
        remote_config.base_url = server.clone();
    }
    let cache = cli
        .session_file
        .clone()
        .map(SessionCache::new)
        .unwrap_or_else(SessionCache::default_location);
    let sync_config = config.guestbook.to_sync_config();

    match cli.command {
        Commands::Session { reset } => {
            if reset {
                cache.clear()?;
            }
            let remote = RemoteGuestbook::new(remote_config)?;
            let session = establish(&remote, &cache).await;
            match (session.identity(), session.origin()) {
                (Some(identity), Some(SessionOrigin::Issued)) => {
                    println!("Session: {}", identity);
                    println!("Cached at {:?}", cache.path());
                }
                (Some(identity), _) => {
                    println!("Session: {} (temporary)", identity);
                    eprintln!(
                        "Identity service unavailable: {}",
                        session.error().unwrap_or("unknown error")
                    );
                }
                (None, _) => {
                    eprintln!("No session could be established");
                    std::process::exit(1);
                }
            }
        }

        Commands::Sign {
            name,
            to,
            attendance,
            message,
        } => {
            let remote = Arc::new(RemoteGuestbook::new(remote_config)?);
            let session = establish(remote.as_ref(), &cache).await;
            warn_if_degraded(&session);

            let mut form = match to.as_deref() {
                Some(guest) => GuestForm::for_guest(&GuestName::from_param(Some(guest))),
                None => GuestForm::new(),
            };
            if let Some(name) = name {
                if !form.set_name(name) {
                    eprintln!("Name is set by the invitation: {}", form.name());
                }
            }
            if let Some(attendance) = attendance {
                form.set_attendance(attendance);
            }
            form.set_message(message);

            let mut guestbook = GuestbookSynchronizer::new(remote, session, sync_config)
                .with_form(form);

            match guestbook.submit().await {
                Ok(id) => {
                    print_status(&guestbook);
                    println!("Entry ID: {}", id);
                }
                Err(_) => {
                    print_status(&guestbook);
                    std::process::exit(1);
                }
            }
        }

        Commands::List { limit, all } => {
            let remote = Arc::new(RemoteGuestbook::new(remote_config)?);
            let session = establish(remote.as_ref(), &cache).await;

            let mut sync_config = sync_config;
            if let Some(limit) = limit {
                sync_config.initial_limit = limit;
            }
            let mut guestbook = GuestbookSynchronizer::new(remote, session, sync_config);
            guestbook.start()?;
            if let Err(e) = first_snapshot(&mut guestbook).await {
                eprintln!("Cannot load guestbook from {}: {}", cli_server(&cli.server, &config), e);
                std::process::exit(1);
            }

            if all {
                while guestbook.show_more() > 0 {}
            }

            if cli.format == "json" {
                let visible: Vec<_> = guestbook
                    .entries()
                    .iter()
                    .take(guestbook.display_limit().current())
                    .cloned()
                    .collect();
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else {
                print_entries(&guestbook.visible_entries());
                if guestbook.has_more() {
                    println!();
                    println!(
                        "Showing {} of {} entries (use --all to see everything)",
                        guestbook.display_limit().current(),
                        guestbook.total()
                    );
                }
            }
        }

        Commands::Watch => {
            let remote = Arc::new(RemoteGuestbook::new(remote_config)?);
            let session = establish(remote.as_ref(), &cache).await;
            warn_if_degraded(&session);

            let retries = sync_config.reconnect.max_reconnects;
            let mut guestbook = GuestbookSynchronizer::new(remote, session, sync_config);
            guestbook.start()?;

            println!("Watching guestbook (Ctrl+C to stop)...");
            let mut seen = 0;
            loop {
                tokio::select! {
                    changed = guestbook.changed() => {
                        if !changed {
                            break;
                        }
                    }
                    _ = tokio::signal::ctrl_c() => break,
                }

                let feed = guestbook.feed();
                if feed.error.is_some() {
                    if let Some(banner) = guestbook.banner() {
                        eprintln!("{}", banner);
                    }
                    if retries == 0 {
                        std::process::exit(1);
                    }
                    continue;
                }
                if feed.snapshots_received > seen {
                    seen = feed.snapshots_received;
                    println!();
                    println!("--- {} entries ---", guestbook.total());
                    print_entries(&guestbook.visible_entries());
                }
            }
            guestbook.stop();
        }

        Commands::Delete { id, yes } => {
            let remote = Arc::new(RemoteGuestbook::new(remote_config)?);
            let session = establish(remote.as_ref(), &cache).await;

            let mut guestbook = GuestbookSynchronizer::new(remote, session, sync_config);
            guestbook.start()?;
            if let Err(e) = first_snapshot(&mut guestbook).await {
                eprintln!("Cannot load guestbook: {}", e);
                std::process::exit(1);
            }

            if let Err(e) = guestbook.request_delete(&id) {
                eprintln!("{}", e);
                std::process::exit(1);
            }

            if !yes && !confirm(&guestbook)? {
                guestbook.cancel_delete();
                println!("Cancelled");
                return Ok(());
            }

            let result = guestbook.confirm_delete().await;
            print_status(&guestbook);
            if result.is_err() {
                std::process::exit(1);
            }
        }

        Commands::Invite { to } => {
            let client = reqwest::Client::new();
            let mut request = client.get(format!(
                "{}/api/v1/invitation",
                remote_config.base_url.trim_end_matches('/')
            ));
            if let Some(to) = &to {
                request = request.query(&[(GUEST_PARAM, to)]);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) => {
                    eprintln!("Cannot connect to guestbook server at {}", remote_config.base_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin guestbook");
                    std::process::exit(1);
                }
            };
            if !response.status().is_success() {
                eprintln!("Server returned error: {}", response.status());
                std::process::exit(1);
            }

            let view: serde_json::Value = response.json().await?;
            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_invitation(&view);
            }
        }

        Commands::Countdown { follow } => {
            let target = config.invitation.wedding_at;
            if follow {
                let mut ticks = Box::pin(ticking(target));
                loop {
                    tokio::select! {
                        next = ticks.next() => match next {
                            Some(left) => {
                                print!("\r{}  ", left);
                                std::io::stdout().flush()?;
                            }
                            None => break,
                        },
                        _ = tokio::signal::ctrl_c() => break,
                    }
                }
                println!();
            } else {
                let left = TimeLeft::until(target);
                if left.is_zero() {
                    println!("The day has come!");
                } else {
                    println!("{}", left);
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();

            if let Some(path) = output {
                std::fs::write(&path, &content)?;
                println!("Config written to {:?}", path);
            } else {
                print!("{}", content);
            }
        }
    }

    Ok(())
}

/// Establish a session, reusing and refreshing the cached identity
async fn establish(remote: &RemoteGuestbook, cache: &SessionCache) -> SessionContext {
    let cached = cache.load();
    let session = SessionContext::establish(remote, cached.as_ref()).await;

    if let (Some(identity), Some(SessionOrigin::Issued)) = (session.identity(), session.origin()) {
        if cached.as_ref() != Some(identity) {
            if let Err(e) = cache.store(identity) {
                tracing::warn!(error = %e, path = ?cache.path(), "Failed to cache session");
            }
        }
    }
    session
}

/// Wait for the first snapshot or the first feed error
async fn first_snapshot(guestbook: &mut GuestbookSynchronizer) -> Result<(), String> {
    let wait = async {
        loop {
            let feed = guestbook.feed();
            if feed.snapshots_received > 0 {
                return Ok(());
            }
            if let Some(error) = feed.error {
                return Err(error);
            }
            if !guestbook.changed().await {
                return Err("live feed closed".to_string());
            }
        }
    };

    tokio::time::timeout(FIRST_SNAPSHOT_TIMEOUT, wait)
        .await
        .unwrap_or_else(|_| Err("timed out waiting for entries".to_string()))
}

fn warn_if_degraded(session: &SessionContext) {
    if session.is_degraded() {
        eprintln!(
            "Warning: using a temporary identity ({}). You will not be able to delete this entry later.",
            session.error().unwrap_or("identity service unavailable")
        );
    }
}

fn print_status(guestbook: &GuestbookSynchronizer) {
    let status = guestbook.status();
    if let Some(message) = status.message() {
        if status.is_error() {
            eprintln!("{}", message);
        } else {
            println!("{}", message);
        }
    }
}

fn confirm(guestbook: &GuestbookSynchronizer) -> std::io::Result<bool> {
    let prompt = guestbook
        .status()
        .message()
        .unwrap_or_else(|| "Delete this message?".to_string());
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn cli_server(server: &Option<String>, config: &Config) -> String {
    server
        .clone()
        .unwrap_or_else(|| config.client.server_url.clone())
}

fn print_entries(entries: &[EntryView]) {
    if entries.is_empty() {
        println!("No entries yet. Be the first to sign:");
        println!("  guestbook-cli sign --name <name> --attendance yes --message <wishes>");
        return;
    }

    for entry in entries {
        let marker = if entry.deletable { " *" } else { "" };
        println!(
            "{} · {} · {}{}",
            entry.author_name, entry.attendance_label, entry.submitted_label, marker
        );
        println!("  {}", entry.message);
        println!("  id: {}", entry.id);
    }
}

fn print_invitation(view: &serde_json::Value) {
    let profile = &view["profile"];
    println!(
        "The wedding of {} & {}",
        profile["bride"].as_str().unwrap_or("-"),
        profile["groom"].as_str().unwrap_or("-")
    );
    println!();
    println!("Dear {}", view["guest"]["name"].as_str().unwrap_or("-"));
    println!("Countdown: {}", view["countdown"].as_str().unwrap_or("-"));

    if let Some(events) = profile["events"].as_array() {
        println!();
        for event in events {
            println!(
                "{:<12} {} {}",
                event["name"].as_str().unwrap_or("-"),
                event["date"].as_str().unwrap_or("-"),
                event["time"].as_str().unwrap_or("-")
            );
        }
    }

    let ticket = &view["ticket"];
    println!();
    println!("{}", ticket["title"].as_str().unwrap_or("E-Ticket"));
    if let Some(id) = ticket["ticket_id"].as_str() {
        println!("Ticket: {}", id);
    }
    println!("QR: {}", ticket["image_url"].as_str().unwrap_or("-"));
    println!("{}", ticket["caption"].as_str().unwrap_or(""));

    if let Some(deadline) = profile["rsvp_deadline"].as_str() {
        println!();
        println!("{}", deadline);
    }
}
