use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{Ballot, Kiosk, KioskEvent, KioskInput, StationClient};
use shared::domain::VoterId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod console;

use console::{parse_line, ConsoleLine, ConsoleSpeech, TypedMicrophone};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    #[arg(long)]
    voter_id: String,
    /// TOML file with a `[[candidates]]` table per candidate.
    #[arg(long)]
    ballot: Option<PathBuf>,
}

fn load_ballot(path: Option<&PathBuf>) -> Result<Ballot> {
    let ballot = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read ballot '{}'", path.display()))?;
            toml::from_str(&raw)
                .with_context(|| format!("failed to parse ballot '{}'", path.display()))?
        }
        None => Ballot::demo(),
    };
    ballot.validate()?;
    Ok(ballot)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let ballot = load_ballot(args.ballot.as_ref())?;
    let station = StationClient::new(&args.server_url)?.with_voter(VoterId::new(args.voter_id));
    let microphone = Arc::new(TypedMicrophone::new());
    let kiosk = Kiosk::new(
        ballot.candidates,
        Arc::new(ConsoleSpeech),
        Arc::clone(&microphone) as Arc<dyn client_core::SpeechInput>,
        Arc::new(station),
    );
    let handle = kiosk.handle();
    let mut events = handle.subscribe_events();
    let kiosk_task = tokio::spawn(kiosk.run());

    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                KioskEvent::ScreenChanged(screen) => println!("== {screen:?} =="),
                KioskEvent::CountdownTick { remaining } => println!("({remaining})"),
                KioskEvent::FocusChanged { .. } => {}
                KioskEvent::VoteAcknowledged(_) => println!("(vote recorded)"),
                KioskEvent::VoteFailed(_) => println!("(vote was not recorded)"),
            }
        }
    });

    println!("keys: up/down/left/right, enter, space, back, esc, home, end, digits, click N, say <words>, quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            ConsoleLine::Input(input) => handle.send(input).await?,
            ConsoleLine::Say(transcript) => microphone.hear(&transcript),
            ConsoleLine::Quit => break,
            ConsoleLine::Unknown => warn!(line = %line.trim(), "unrecognised input"),
        }
    }

    handle.send(KioskInput::Shutdown).await?;
    kiosk_task.await??;
    info!("kiosk exited");
    Ok(())
}
