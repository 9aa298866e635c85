use anidb_season::{
    AnidbSeasonError, ApplicationPaths, CancellationToken, MetadataProvider, ProviderIds,
    RemoteMetadataProvider, SeasonInfo, import_series, offline_season_provider,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Resolve AniDB season metadata from locally cached series data
#[derive(Debug, Parser)]
#[command(name = "anidb-season", version, about)]
struct Cli {
    /// Cache root directory (defaults to the platform cache directory)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the season metadata result as JSON
    Resolve(SeasonArgs),
    /// Print the search results for a season as JSON
    Search(SeasonArgs),
    /// Store a series record (JSON) in the cache under an AniDB id
    Import {
        /// AniDB id of the series
        anidb_id: String,
        /// JSON file containing the series record
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
struct SeasonArgs {
    /// Season directory, may contain an [anidb-<id>] tag
    path: Option<PathBuf>,

    /// Season name as known to the library
    #[arg(long)]
    name: Option<String>,

    /// Season number
    #[arg(long)]
    index: Option<i32>,

    /// Explicit AniDB series id, takes precedence over the path tag
    #[arg(long)]
    anidb_id: Option<String>,
}

impl SeasonArgs {
    fn into_season_info(self) -> SeasonInfo {
        let mut provider_ids = ProviderIds::new();
        if let Some(id) = self.anidb_id {
            provider_ids.insert(MetadataProvider::AniDb, id);
        }

        SeasonInfo {
            name: self.name,
            index_number: self.index,
            path: self.path,
            provider_ids,
        }
    }
}

fn write_json<T: Serialize>(
    out: &mut impl Write,
    value: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(value).map_err(AnidbSeasonError::Output)?;
    writeln!(out, "{}", json)?;
    Ok(())
}

/// Executes the parsed command, writing its output to `out`
async fn run(
    cli: Cli,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let paths = match cli.cache_dir {
        Some(dir) => ApplicationPaths::new(dir),
        None => ApplicationPaths::from_project_dirs()?,
    };

    tracing::debug!("Using cache directory {}", paths.cache_path().display());

    match cli.command {
        Command::Resolve(args) => {
            let provider = offline_season_provider(&paths)?;
            let result = provider
                .get_metadata(&args.into_season_info(), cancel)
                .await?;
            write_json(out, &result)?;
        }
        Command::Search(args) => {
            let provider = offline_season_provider(&paths)?;
            let results = provider
                .get_search_results(&args.into_season_info(), cancel)
                .await?;
            write_json(out, &results)?;
        }
        Command::Import { anidb_id, file } => {
            let content = std::fs::read_to_string(&file)?;
            let series = import_series(&paths, &anidb_id, &content)?;
            writeln!(
                out,
                "Imported '{}' as AniDB id {}",
                series.name.as_deref().unwrap_or("Unknown"),
                anidb_id
            )?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, cancelling");
                cancel.cancel();
            }
        }
    });

    if let Err(e) = run(cli, &cancel, &mut std::io::stdout().lock()).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
