use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::terminal;
use reelbin::config::Config;
use reelbin::core::{AssumeYes, Confirm};
use reelbin::utils::{format_bytes, format_duration};
use reelbin::{
    BroadcastBus, ClearOutcome, FfmpegProbe, HttpPutTransport, JsonFileStore, UploadEvent, UploadId,
    UploadOutcome, UploadPipeline, VideoFile,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "reelbin", about = "Upload video clips and manage the uploaded gallery")]
struct Cli {
    /// Path to the TOML config (defaults to ./reelbin.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload up to five video files
    Upload { files: Vec<PathBuf> },
    /// List uploaded videos
    List,
    /// Print the timeline "add video" command for an uploaded video
    Promote { id: Uuid },
    /// Remove one uploaded video
    Remove { id: Uuid },
    /// Clear uploaded videos
    Clear {
        /// Also delete the on-disk video cache
        #[arg(long)]
        all: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// 终端中按键确认
struct TerminalConfirm;

#[async_trait]
impl Confirm for TerminalConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || read_yes_no(&prompt))
            .await
            .unwrap_or(false)
    }
}

fn read_yes_no(prompt: &str) -> bool {
    println!("{}", prompt);
    print!("[y/N] ");
    let _ = std::io::stdout().flush();

    if terminal::enable_raw_mode().is_err() {
        return false;
    }

    let answer = loop {
        match event::read() {
            Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) => {
                break matches!(code, KeyCode::Char('y') | KeyCode::Char('Y'));
            }
            Ok(_) => continue,
            Err(_) => break false,
        }
    };

    let _ = terminal::disable_raw_mode();
    println!();
    answer
}

async fn collect_files(paths: &[PathBuf]) -> anyhow::Result<Vec<VideoFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = VideoFile::from_path(path)
            .await
            .with_context(|| format!("Can't read {}", path.display()))?;

        if !file.has_accepted_extension() {
            tracing::warn!(file_name = %file.name, "Skipping file with unsupported extension");
            continue;
        }
        files.push(file);
    }
    Ok(files)
}

fn print_events(pipeline: &UploadPipeline) -> tokio::task::JoinHandle<()> {
    let mut events = pipeline.subscribe();
    tokio::spawn(async move {
        let mut names: HashMap<UploadId, String> = HashMap::new();
        while let Ok(event) = events.recv().await {
            match event {
                UploadEvent::TaskAdded { upload_id, file_name } => {
                    names.insert(upload_id, file_name);
                }
                UploadEvent::Progress { upload_id, percent } => {
                    let name = names.get(&upload_id).map(String::as_str).unwrap_or("?");
                    println!("{:>3}%  {}", percent, name);
                }
                UploadEvent::Removed { upload_id } => {
                    names.remove(&upload_id);
                }
                UploadEvent::Completed { .. } | UploadEvent::Failed { .. } => {}
            }
        }
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref())?;

    let store = Arc::new(JsonFileStore::open(&config.store_path).await?);
    let bus = Arc::new(BroadcastBus::default());
    let pipeline = UploadPipeline::builder()
        .config(config.pipeline.clone())
        .probe(Arc::new(FfmpegProbe::new(&config.ffprobe_path, &config.ffmpeg_path)))
        .negotiator(config.negotiator())
        .transport(Arc::new(HttpPutTransport::new()))
        .store(store)
        .bus(bus.clone())
        .build();

    match cli.command {
        Command::Upload { files } => {
            let files = collect_files(&files).await?;
            let total: u64 = files.iter().map(|f| f.size).sum();
            println!("Uploading {} file(s), {}", files.len(), format_bytes(total));
            let printer = print_events(&pipeline);

            let outcomes = pipeline.submit(files).await?;
            for outcome in &outcomes {
                match outcome {
                    UploadOutcome::Completed(record) => {
                        println!("uploaded  {}  {}  {}", record.id, record.file_name, record.source_url);
                    }
                    UploadOutcome::Failed { file_name, error, .. } => {
                        println!("failed    {}  {}", file_name, error);
                    }
                }
            }

            drop(pipeline);
            // 等待事件打印完毕
            let _ = tokio::time::timeout(Duration::from_secs(1), printer).await;
        }
        Command::List => {
            let records = pipeline.uploaded_videos().await?;
            if records.is_empty() {
                println!("No uploaded videos");
            }
            for record in records {
                let duration = Duration::from_secs_f64(record.duration_ms.max(0.0) / 1000.0);
                println!(
                    "{}  {:>8}  {}  {}",
                    record.id,
                    format_duration(duration),
                    record.file_name,
                    record.source_url
                );
            }
        }
        Command::Promote { id } => {
            let record = pipeline
                .uploaded_videos()
                .await?
                .into_iter()
                .find(|r| r.id == UploadId(id))
                .ok_or_else(|| anyhow!("No uploaded video with id {}", id))?;

            let mut commands = bus.subscribe();
            pipeline.promote_to_timeline(&record);
            let command = commands.recv().await?;
            println!("{}", serde_json::to_string_pretty(&command)?);
        }
        Command::Remove { id } => match pipeline.remove_uploaded(UploadId(id)).await? {
            Some(record) => println!("removed  {}", record.file_name),
            None => println!("No uploaded video with id {}", id),
        },
        Command::Clear { all, yes } => {
            let confirm: &dyn Confirm = if yes { &AssumeYes } else { &TerminalConfirm };
            let outcome = if all {
                pipeline.clear_all_data(confirm).await?
            } else {
                pipeline.clear_uploaded(confirm).await?
            };

            match outcome {
                ClearOutcome::NothingToClear => println!("No uploaded videos to clear."),
                ClearOutcome::Declined => println!("Cancelled"),
                ClearOutcome::Cleared(count) => {
                    println!("Cleared {} uploaded video(s)", count);
                    if all {
                        println!("Video storage data removed");
                    }
                }
            }
        }
    }

    Ok(())
}
