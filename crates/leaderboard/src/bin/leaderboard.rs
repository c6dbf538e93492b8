use clap::{Parser, Subcommand};
use leaderboard::{
    MessageEvent, MessageKind, MonthPolicy, OcrDistanceExtractor, OllamaClient, Snapshot,
    SourceKind, SystemClock, UpdateEngine, codec, ocr::distance_from_lines,
};
use leaderboard::ocr::TextRecognizer;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use storage::{Database, LeaderboardStore, MemoryStore, repository::ImageQueueRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Conversation id used when a snapshot file is updated offline
const OFFLINE_CHAT_ID: &str = "offline";

#[derive(Parser)]
#[command(name = "leaderboard")]
#[command(about = "Running challenge leaderboard tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "OLLAMA_URL", default_value = leaderboard::ocr::ollama_client::DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    #[arg(long, env = "OLLAMA_MODEL", default_value = leaderboard::ocr::ollama_client::DEFAULT_OLLAMA_MODEL)]
    ollama_model: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-render a snapshot file in canonical order
    Render { file: PathBuf },
    /// Apply one update command such as "John+5" to a snapshot file
    Apply {
        file: PathBuf,

        message: String,

        #[arg(
            long,
            env = "MONTH_HOUR_OFFSET",
            default_value_t = leaderboard::month::DEFAULT_HOUR_OFFSET,
            allow_negative_numbers = true,
            value_parser = clap::value_parser!(i64).range(leaderboard::month::HOUR_OFFSET_RANGE)
        )]
        hour_offset: i64,

        /// Write the result back to the file
        #[arg(long)]
        write: bool,
    },
    /// Read the run distance off a screenshot
    Ocr { image: PathBuf },
    /// Load a {chat_id: snapshot} JSON export into the database
    ImportSnapshots {
        file: PathBuf,

        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,

        #[arg(long)]
        validate_only: bool,
    },
    /// Delete expired image queue entries
    PurgeQueue {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("leaderboard={},storage={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let ollama = || OllamaClient::new(cli.ollama_url.clone(), cli.ollama_model.clone());

    match &cli.command {
        Commands::Render { file } => {
            handle_render(file).await?;
        }
        Commands::Apply {
            file,
            message,
            hour_offset,
            write,
        } => {
            handle_apply(file, message, *hour_offset, *write, ollama()).await?;
        }
        Commands::Ocr { image } => {
            handle_ocr(image, ollama()).await?;
        }
        Commands::ImportSnapshots {
            file,
            database_url,
            validate_only,
        } => {
            handle_import(file, database_url.as_deref(), *validate_only).await?;
        }
        Commands::PurgeQueue { database_url } => {
            handle_purge(database_url).await?;
        }
    }

    Ok(())
}

async fn read_lines(file: &PathBuf) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(file).await?;
    Ok(content.trim().split('\n').map(String::from).collect())
}

async fn handle_render(file: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let lines = read_lines(file).await?;
    let rendered = codec::render(&lines, None, Decimal::ZERO);

    if !codec::is_snapshot(&rendered) {
        return Err(rendered.into());
    }

    println!("{}", rendered);
    Ok(())
}

async fn handle_apply(
    file: &PathBuf,
    message: &str,
    hour_offset: i64,
    write: bool,
    ollama: OllamaClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    let content = tokio::fs::read_to_string(file).await?;
    store.put_snapshot(OFFLINE_CHAT_ID, content.trim()).await?;

    let engine = UpdateEngine::new(store.clone(), Arc::new(OcrDistanceExtractor::new(ollama)))
        .with_month_policy(MonthPolicy::new(hour_offset, Arc::new(SystemClock)));

    // No sender, so the name registry stays out of it
    let event = MessageEvent {
        reply_token: String::new(),
        source: SourceKind::Group {
            group_id: OFFLINE_CHAT_ID.to_string(),
            user_id: None,
        },
        message: MessageKind::Text(message.to_string()),
    };

    let replies = engine.handle_event(&event).await?;
    if replies.is_empty() {
        tracing::warn!("'{}' is not an update command, nothing changed", message);
    }
    for reply in &replies {
        println!("{}", reply);
    }

    if write && let Some(updated) = store.snapshot(OFFLINE_CHAT_ID).await {
        tokio::fs::write(file, format!("{}\n", updated)).await?;
        tracing::info!("Wrote {}", file.display());
    }

    Ok(())
}

async fn handle_ocr(
    image: &PathBuf,
    ollama: OllamaClient,
) -> Result<(), Box<dyn std::error::Error>> {
    if !ollama.health_check().await? {
        return Err("Ollama is not reachable".into());
    }
    if !ollama.verify_model().await? {
        tracing::warn!("Model {} is not pulled on the Ollama server", ollama.model());
    }

    let bytes = tokio::fs::read(image).await?;
    tracing::info!("Read image file: {} ({} bytes)", image.display(), bytes.len());

    let lines = ollama.recognize_lines(&bytes).await?;
    for line in &lines {
        tracing::debug!("  | {}", line);
    }

    let distance = distance_from_lines(&lines);
    if distance.is_zero() {
        tracing::warn!("No single distance found in {} text lines", lines.len());
    }
    println!("{}", distance);

    Ok(())
}

async fn handle_import(
    file: &PathBuf,
    database_url: Option<&str>,
    validate_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Loading snapshots from: {}", file.display());

    let json_content = tokio::fs::read_to_string(file).await?;
    let snapshots: BTreeMap<String, String> = serde_json::from_str(&json_content)?;
    tracing::info!("Found {} snapshot(s)", snapshots.len());

    let mut valid = Vec::new();
    let mut error_count = 0;

    for (chat_id, stats) in &snapshots {
        let lines: Vec<&str> = stats.trim().split('\n').collect();
        match Snapshot::parse(&lines) {
            Ok(snapshot) if codec::is_snapshot(&snapshot.title) => {
                tracing::debug!("  ✓ {} ({} entries)", chat_id, snapshot.entries.len());
                valid.push((chat_id, snapshot.encode()));
            }
            Ok(snapshot) => {
                error_count += 1;
                tracing::error!("  ✗ {}: title '{}' lacks the === marker", chat_id, snapshot.title);
            }
            Err(e) => {
                error_count += 1;
                tracing::error!("  ✗ {}: {}", chat_id, e);
            }
        }
    }

    tracing::info!("Validation: {} valid, {} invalid", valid.len(), error_count);

    if validate_only {
        return if error_count > 0 {
            Err(format!("{} snapshot(s) failed validation", error_count).into())
        } else {
            Ok(())
        };
    }

    let database_url = database_url.ok_or("DATABASE_URL is required unless --validate-only is set")?;

    tracing::info!("Connecting to database...");
    let database = Database::new(database_url).await?;
    database.run_migrations().await?;

    for (chat_id, stats) in &valid {
        database.put_snapshot(chat_id, stats).await?;
    }

    tracing::info!("✓ Imported {} snapshot(s), skipped {}", valid.len(), error_count);

    Ok(())
}

async fn handle_purge(database_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Connecting to database...");
    let database = Database::new(database_url).await?;

    let removed = ImageQueueRepository::new(database.pool())
        .purge_expired()
        .await?;
    tracing::info!("Purged {} expired image queue entries", removed);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply_offset(args: &[&str]) -> Result<i64, clap::Error> {
        let cli = Cli::try_parse_from(
            ["leaderboard", "apply", "board.txt", "John+5"]
                .iter()
                .chain(args),
        )?;
        match cli.command {
            Commands::Apply { hour_offset, .. } => Ok(hour_offset),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_hour_offset_is_bounded() {
        assert_eq!(apply_offset(&["--hour-offset", "-5"]).unwrap(), -5);
        assert_eq!(apply_offset(&["--hour-offset", "24"]).unwrap(), 24);
        assert!(apply_offset(&["--hour-offset", "25"]).is_err());
        assert!(apply_offset(&["--hour-offset", "9223372036854775807"]).is_err());
    }
}
