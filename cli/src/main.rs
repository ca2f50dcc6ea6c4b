use clap::{Parser, Subcommand};
use std::io::Write;
use tracing_subscriber::EnvFilter;
use waystone_cli::CliContext;
use waystone_cli::commands;
use waystone_cli::readline;

#[tokio::main]
async fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let ctx = CliContext::new();

    // Auto-follow the configured log file if there is one
    let configured = ctx.config.read().await.log_file.clone();
    if let Some(path) = configured {
        commands::follow_log(&path.to_string_lossy(), &ctx).await;
    } else {
        println!("No log file configured; use set-log-file <path>");
    }

    loop {
        let line = readline()?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx).await {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                write!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    ctx.tasks.lock().await.abort_all().await;
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "cli")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap from a log file and tail it
    FollowLog {
        #[arg(short, long)]
        path: String,
    },
    /// Current map and latest XP reading
    Status,
    /// Recently completed maps
    Maps,
    /// Recent XP snapshots
    Snapshots,
    /// Record a manual XP snapshot
    Xp { value: u64 },
    Pause,
    Unpause,
    Config,
    SetLogFile {
        #[arg(short, long)]
        path: String,
    },
    Exit,
}

async fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "waystone".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::FollowLog { path }) => commands::follow_log(path, ctx).await,
        Some(Commands::Status) => commands::show_status(ctx).await,
        Some(Commands::Maps) => commands::list_maps(ctx).await,
        Some(Commands::Snapshots) => commands::list_snapshots(ctx).await,
        Some(Commands::Xp { value }) => commands::take_xp_snapshot(ctx, *value).await,
        Some(Commands::Pause) => commands::pause(ctx).await,
        Some(Commands::Unpause) => commands::unpause(ctx).await,
        Some(Commands::Config) => commands::show_settings(ctx).await,
        Some(Commands::SetLogFile { path }) => commands::set_log_file(path, ctx).await,
        Some(Commands::Exit) => {
            commands::exit();
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
