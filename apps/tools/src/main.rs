use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::StationClient;
use shared::domain::VoterId;
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/voting.db")]
    database_url: String,
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    RegisterVoter {
        #[arg(required = true)]
        voter_ids: Vec<String>,
    },
    VoterStatus {
        voter_id: String,
    },
    CountVotes,
    ListRecords {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
    OpenStation,
    CloseStation,
    StationStatus,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::RegisterVoter { voter_ids } => {
            let storage = Storage::new(&cli.database_url).await?;
            for voter_id in voter_ids {
                let voter_id = VoterId::new(voter_id);
                if storage.register_voter(&voter_id).await? {
                    println!("registered voter_id={voter_id}");
                } else {
                    println!("voter_id={voter_id} already registered");
                }
            }
        }
        Command::VoterStatus { voter_id } => {
            let storage = Storage::new(&cli.database_url).await?;
            match storage.find_voter(&VoterId::new(voter_id.as_str())).await? {
                Some(voter) => println!("voter_id={} has_voted={}", voter.voter_id, voter.has_voted),
                None => println!("voter_id={voter_id} not registered"),
            }
        }
        Command::CountVotes => {
            let storage = Storage::new(&cli.database_url).await?;
            println!("vote_records={}", storage.count_vote_records().await?);
        }
        Command::ListRecords { limit } => {
            let storage = Storage::new(&cli.database_url).await?;
            for record in storage.list_vote_records(limit).await? {
                println!(
                    "{} {} {}",
                    record.record_id,
                    record.cast_at.to_rfc3339(),
                    record.vote_hash
                );
            }
        }
        Command::OpenStation => {
            let started = StationClient::new(&cli.server_url)?.start_session().await?;
            println!("station session_id={}", started.session_id);
        }
        Command::CloseStation => {
            let reset = StationClient::new(&cli.server_url)?.reset_session().await?;
            println!("{}", reset.message);
        }
        Command::StationStatus => {
            let status = StationClient::new(&cli.server_url)?.session_status().await?;
            match status.session_id {
                Some(session_id) if status.active => println!("active session_id={session_id}"),
                _ => println!("inactive"),
            }
        }
    }

    Ok(())
}
