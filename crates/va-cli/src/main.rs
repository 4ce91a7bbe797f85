use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use va_cli::commands::save::DraftInput;
use va_cli::commands::{list, objects, remove, save, status, window};
use va_cli::{Cli, Commands, Config, ObjectsAction};
use va_store::Session;

/// Load config and open the session of a video by replaying its event log.
fn open_session(config_path: Option<&Path>, video: &Path) -> Result<(Session, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let paths = config.session_paths(video);
    let session = Session::open(config.task.clone(), &paths, config.debug)
        .with_context(|| format!("failed to open session for {}", video.display()))?;
    Ok((session, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let video = cli
        .video
        .as_deref()
        .context("no video given, pass --video <path>")?;
    let (mut session, config) = open_session(cli.config.as_deref(), video)?;
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Status => {
            status::run(&mut stdout, &session, &config.session_paths(video))?;
        }
        Commands::Save {
            start,
            end,
            predicate,
            arguments,
            properties,
            tier,
        } => {
            let input =
                DraftInput::parse(start, end, predicate, arguments, properties, tier.as_deref())?;
            save::run(&mut stdout, &mut session, input)?;
        }
        Commands::Remove { id } => {
            remove::run(&mut stdout, &mut session, id)?;
        }
        Commands::Objects { action } => match action {
            ObjectsAction::Add { object_type, ids } => {
                objects::add(&mut stdout, &mut session, object_type, ids)?;
            }
            ObjectsAction::Remove { object_type, ids } => {
                objects::remove(&mut stdout, &mut session, object_type, ids)?;
            }
            ObjectsAction::List { object_type } => {
                objects::list(&mut stdout, &session, object_type.as_deref())?;
            }
        },
        Commands::List { search, json } => {
            list::run(&mut stdout, &session, search.as_deref(), *json)?;
        }
        Commands::Window { at } => {
            let fetcher = window::directory_fetcher(config.frames_dir(video));
            window::run(
                &mut stdout,
                &session,
                &fetcher,
                at,
                config.context_size,
                config.context_step_ms,
            )?;
        }
    }

    Ok(())
}
