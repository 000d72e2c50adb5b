mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tally_core::{KioskConfig, KioskSession};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tally-kiosk")]
#[command(about = "Live poll kiosk: results, voting and backend health")]
#[command(version)]
struct Cli {
    /// JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Polling service origin; overrides the config file and TALLY_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,
    /// Kiosk page URL carrying `referral` and `conf` query parameters.
    #[arg(long)]
    page_url: Option<String>,
    /// Log every request and response.
    #[arg(long)]
    log_requests: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Follow live results until interrupted.
    Results,
    /// Cast this session's vote.
    Vote { choice: Option<String> },
    /// Check liveness, readiness and database pool usage.
    Health {
        /// Keep polling the pool until interrupted.
        #[arg(long)]
        watch: bool,
    },
    /// Clear all votes of the current demo session.
    Reset {
        #[arg(long)]
        yes: bool,
    },
    /// Show server version and conference branding.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut config = KioskConfig::load(cli.config.as_deref()).await?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(page_url) = &cli.page_url {
        config.apply_page_url(page_url)?;
    }
    config.log_requests |= cli.log_requests;

    info!("Kiosk talking to {}", config.base_url);
    let session = KioskSession::new(config)?;

    match cli.command {
        Command::Results => follow_results(&session).await?,
        Command::Vote { choice } => vote(&session, choice).await?,
        Command::Health { watch } => health(&session, watch).await?,
        Command::Reset { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear all votes without --yes");
            }
            session.reset().await?;
            println!("All votes cleared.");
        }
        Command::Version => {
            let branding = session.branding().await?;
            println!("tally-kiosk {}", env!("CARGO_PKG_VERSION"));
            println!("{}", render::branding(&branding));
        }
    }

    session.shutdown();
    Ok(())
}

async fn follow_results(session: &KioskSession) -> anyhow::Result<()> {
    let mut board = session.board().subscribe();
    let mut connection = session.stream().health();
    let mut pool = session.poller().status();

    session.start_health();
    if let Err(failure) = session.start_results().await {
        warn!("Initial results unavailable: {}", failure);
    }
    print!("{}", render::board(&board.borrow_and_update()));

    loop {
        tokio::select! {
            changed = board.changed() => {
                changed?;
                print!("{}", render::board(&board.borrow_and_update()));
            }
            changed = connection.changed() => {
                changed?;
                println!("[{}]", render::connection(&connection.borrow_and_update()));
            }
            changed = pool.changed() => {
                changed?;
                if let Some(status) = *pool.borrow_and_update() {
                    println!("{}", render::pool(&status));
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn vote(session: &KioskSession, choice: Option<String>) -> anyhow::Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let choice = match choice {
        Some(choice) => choice,
        None => {
            print!("{}", render::menu(session.board().catalog()));
            read_answer(&mut input).await?
        }
    };

    let submitter = session.submitter();
    let mut attempt = session.vote(choice.trim()).await?;
    loop {
        println!("{}", render::vote(&attempt.state, submitter.confirmed_label()));
        if attempt.failure().is_none() {
            return Ok(());
        }
        if !read_answer(&mut input).await?.eq_ignore_ascii_case("y") {
            anyhow::bail!("vote not recorded");
        }
        attempt = submitter.retry().await?;
    }
}

async fn read_answer(input: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<String> {
    Ok(input.next_line().await?.unwrap_or_default().trim().to_string())
}

async fn health(session: &KioskSession, watch: bool) -> anyhow::Result<()> {
    let probe = session.probe();
    for (name, outcome) in [
        ("health", probe.check_health().await),
        ("ready", probe.check_ready().await),
    ] {
        match outcome {
            Ok(()) => println!("{}: ok", name),
            Err(failure) => println!("{}: {}", name, failure),
        }
    }

    match session.poller().poll_once().await {
        Some(status) => println!("{}", render::pool(&status)),
        None => println!("DB pool: metrics unavailable"),
    }
    if !watch {
        return Ok(());
    }

    let mut pool = session.poller().status();
    session.start_health();
    loop {
        tokio::select! {
            changed = pool.changed() => {
                changed?;
                if let Some(status) = *pool.borrow_and_update() {
                    println!("{}", render::pool(&status));
                }
            }
            _ = tokio::signal::ctrl_c() => return Ok(()),
        }
    }
}
