use std::path::{Path, PathBuf};
use std::sync::Arc;

use architech::config::{ConfigError, EditorConfig};
use architech::engine::EngineCore;
use architech::input::EditorEvent;
use architech::io::{self, ImportError};
use architech::persist::{FileStore, ProjectId, ProjectStore, StoreError};
use architech::scene::Scene;
use architech::session::{EditorSession, LoadState, SessionKey, UserId};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("export failed: {0}")]
    Export(serde_json::Error),
    #[error("script line {line}: {source}")]
    Script { line: usize, source: serde_json::Error },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("project {0} could not be loaded")]
    Unavailable(String),
}

#[derive(Parser, Debug)]
#[command(name = "architech", about = "ArchiTech floor-plan engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct StoreArgs {
    /// Directory holding the project store.
    #[arg(long, env = "ARCHITECH_STORE_DIR")]
    store: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a project file.
    Inspect { file: PathBuf },
    /// Apply a script of editor events to a file or blank scene and export the result.
    Replay {
        #[arg(long)]
        input: Option<PathBuf>,
        /// Newline-delimited JSON editor events.
        #[arg(long)]
        script: PathBuf,
        /// Write the result here instead of stdout. A directory receives
        /// `my-project.ArchiTech`.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        read_only: bool,
    },
    /// Create an empty project and print its id.
    New {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long, default_value = architech::consts::DEFAULT_PROJECT_NAME)]
        name: String,
    },
    /// Enable sharing for a project and print the share id.
    Share {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long)]
        project: String,
    },
    /// Open a stored project, apply a script with autosave on, and close.
    Edit {
        #[command(flatten)]
        store: StoreArgs,
        #[arg(long)]
        project: String,
        #[arg(long)]
        script: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect { file } => run_inspect(&file).await,
        Command::Replay { input, script, out, read_only } => {
            run_replay(input.as_deref(), &script, out.as_deref(), read_only).await
        }
        Command::New { store, name } => run_new(&store, &name).await,
        Command::Share { store, project } => run_share(&store, project).await,
        Command::Edit { store, project, script } => run_edit(&store, project, &script).await,
    }
}

async fn run_inspect(file: &Path) -> Result<(), CliError> {
    let scene = read_scene(file).await?;
    println!("objects:   {}", scene.objects().len());
    println!("walls:     {}", scene.walls().len());
    println!("shapes:    {}", scene.shapes().len());
    println!("symbols:   {}", scene.symbols().len());
    println!("textboxes: {}", scene.textboxes().len());
    for room in scene.objects() {
        let (width, height) = room.dimension_labels();
        println!("room {}  {width} x {height}", room.id);
    }
    for wall in scene.walls() {
        println!("wall {}  {}  {:.1}deg", wall.id, wall.length_label(), wall.rotation);
    }
    Ok(())
}

async fn run_replay(
    input: Option<&Path>,
    script: &Path,
    out: Option<&Path>,
    read_only: bool,
) -> Result<(), CliError> {
    let config = EditorConfig::from_env()?;
    let mut engine = EngineCore::with_config(&config);
    if let Some(input) = input {
        engine.hydrate(read_scene(input).await?);
    }
    engine.set_read_only(read_only);

    for (line, event) in parse_script(&read_file(script).await?)? {
        let actions = engine.dispatch(event);
        debug!(line, actions = actions.len(), "event applied");
    }
    write_scene(engine.scene(), out).await
}

async fn run_new(args: &StoreArgs, name: &str) -> Result<(), CliError> {
    let store = FileStore::new(&args.store);
    let id = store.create_project(name).await?;
    println!("{id}");
    Ok(())
}

async fn run_share(args: &StoreArgs, project: String) -> Result<(), CliError> {
    let store = FileStore::new(&args.store);
    let share_id = store.enable_sharing(&ProjectId(project)).await?;
    println!("{share_id}");
    Ok(())
}

async fn run_edit(args: &StoreArgs, project: String, script: &Path) -> Result<(), CliError> {
    let config = EditorConfig::from_env()?;
    let events = parse_script(&read_file(script).await?)?;
    let store: Arc<dyn ProjectStore> = Arc::new(FileStore::new(&args.store));
    let key = SessionKey::Owned { project_id: ProjectId(project.clone()), user: Some(UserId("cli".into())) };

    let mut session = EditorSession::open(store, key, &config).await;
    if session.state() != LoadState::Ready {
        return Err(CliError::Unavailable(project));
    }
    let count = events.len();
    for (line, event) in events {
        let actions = session.dispatch(event);
        debug!(line, actions = actions.len(), "event applied");
    }
    let entities = session.engine().scene().len();
    session.close().await;
    info!(project_id = %project, events = count, entities, "edit complete");
    Ok(())
}

/// Parse newline-delimited events. Blank lines and `#` comments are skipped.
fn parse_script(raw: &str) -> Result<Vec<(usize, EditorEvent)>, CliError> {
    raw.lines()
        .enumerate()
        .map(|(i, text)| (i + 1, text.trim()))
        .filter(|(_, text)| !text.is_empty() && !text.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text)
                .map(|event| (line, event))
                .map_err(|source| CliError::Script { line, source })
        })
        .collect()
}

async fn read_scene(path: &Path) -> Result<Scene, CliError> {
    debug!(path = %path.display(), project_file = io::is_project_file(path), "importing");
    Ok(io::import_json(&read_file(path).await?)?)
}

async fn read_file(path: &Path) -> Result<String, CliError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Io { path: path.display().to_string(), source })
}

async fn write_scene(scene: &Scene, out: Option<&Path>) -> Result<(), CliError> {
    let json = io::export_json(scene).map_err(CliError::Export)?;
    match out {
        Some(out) => {
            let path = io::export_path(out);
            tokio::fs::write(&path, json)
                .await
                .map_err(|source| CliError::Io { path: path.display().to_string(), source })?;
            info!(path = %path.display(), "exported");
            Ok(())
        }
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
