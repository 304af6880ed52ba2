use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use tv_tagger::importer::{DEFAULT_IMPORT_PROGRAM, DEFAULT_IMPORT_SCRIPT};
use tv_tagger::{
    ApiConfig, DryRunImporter, FixedChooser, HttpTransport, LibraryImporter, MatchResult,
    ScriptImporter, ShowChooser, TaggerError, TerminalChooser, tag_show,
};

/// Tags media by querying the TVDB API.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory containing media to be tagged
    #[arg(long)]
    show_dir: PathBuf,

    /// Base URL of TheTVDB API
    #[arg(long, env = "TVDB_API_URL")]
    api_url: Option<String>,

    /// Series id to use when the show name matches several series
    #[arg(long)]
    series_id: Option<u64>,

    /// Program that adds a file to the library
    #[arg(long, default_value = DEFAULT_IMPORT_PROGRAM)]
    importer: PathBuf,

    /// Argument passed to the importer before the episode arguments (repeatable).
    /// Defaults to the import script next to this executable.
    #[arg(long = "importer-arg")]
    importer_args: Vec<OsString>,

    /// Log the import commands instead of running them
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "tv_tagger=debug"
    } else {
        "tv_tagger=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Path of the import script shipped next to the executable
fn default_importer_args() -> Vec<OsString> {
    let script = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_IMPORT_SCRIPT)))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_IMPORT_SCRIPT));
    vec![script.into_os_string()]
}

fn run(cli: Cli) -> Result<Vec<MatchResult>, TaggerError> {
    let mut config = ApiConfig::from_env()?;
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }

    let show_dir = std::path::absolute(&cli.show_dir).unwrap_or(cli.show_dir);
    let transport = HttpTransport::new(&config.base_url);

    let chooser: Box<dyn ShowChooser> = match cli.series_id {
        Some(id) => Box::new(FixedChooser::new(Some(id))),
        None => Box::new(TerminalChooser),
    };

    let importer_args = if cli.importer_args.is_empty() {
        default_importer_args()
    } else {
        cli.importer_args
    };
    let script_importer = ScriptImporter::new(cli.importer, importer_args);
    let importer: Box<dyn LibraryImporter> = if cli.dry_run {
        Box::new(DryRunImporter::new(script_importer))
    } else {
        Box::new(script_importer)
    };

    tag_show(
        &show_dir,
        &config,
        &transport,
        chooser.as_ref(),
        importer.as_ref(),
    )
}

fn print_summary(show_dir: &Path, matches: &[MatchResult]) {
    println!("\n=== Tagged {} ===\n", show_dir.display());

    if matches.is_empty() {
        println!("No episode files found.");
        return;
    }

    for match_result in matches {
        println!(
            "  {} -> {}",
            match_result.file.path.display(),
            match_result.episode
        );
    }
    println!("\nSuccessfully tagged {} file(s)!", matches.len());
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.show_dir.is_dir() {
        eprintln!(
            "Error: Show directory does not exist: {}",
            cli.show_dir.display()
        );
        process::exit(1);
    }

    let show_dir = cli.show_dir.clone();
    match run(cli) {
        Ok(matches) => print_summary(&show_dir, &matches),
        Err(e) => {
            tracing::error!("{}", e);
            process::exit(1);
        }
    }
}
