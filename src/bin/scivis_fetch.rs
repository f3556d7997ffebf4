use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::{ArgGroup, Parser};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use scivis_fetch::app::App;
use scivis_fetch::client::ScivisHttpClient;
use scivis_fetch::config::ConfigLoader;
use scivis_fetch::error::ScivisError;
use scivis_fetch::output::{JsonOutput, OutputMode, TextOutput};
use scivis_fetch::store::Store;

#[derive(Parser)]
#[command(name = "scivis-fetch")]
#[command(about = "Fetch volumes and metadata from the Open SciVis Datasets index")]
#[command(version, author)]
#[command(group(ArgGroup::new("mode").required(true).args(["list", "dataset"])))]
struct Cli {
    #[arg(short, long, help = "List available datasets with size estimates")]
    list: bool,

    #[arg(
        short,
        long,
        value_name = "NAME",
        help = "Fetch a dataset by lowercase, underscore-separated name"
    )]
    dataset: Option<String>,

    #[arg(short, long, value_name = "DIR", help = "Directory for fetched files")]
    output_dir: Option<Utf8PathBuf>,

    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    #[arg(long, help = "Print results as JSON")]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<ScivisError>() {
            return ExitCode::from(error.exit_code());
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Text
    };

    let config = ConfigLoader::resolve(cli.config.as_deref())?;
    let output_dir = cli.output_dir.or(config.output_dir);
    let store = match output_dir {
        Some(dir) => Store::new_with_root(dir),
        None => Store::new()?,
    };

    let client = ScivisHttpClient::with_timeout(config.timeout)?;
    let app = App::new(store, client, config.catalog_url);

    match (cli.list, cli.dataset) {
        (true, _) => run_list(&app, output_mode),
        (false, Some(name)) => run_fetch(&app, &name, output_mode),
        (false, None) => Err(miette::Report::msg("either --list or --dataset is required")),
    }
}

fn run_list(app: &App<ScivisHttpClient>, output_mode: OutputMode) -> miette::Result<()> {
    match output_mode {
        OutputMode::Json => {
            let result = app.list(&JsonOutput)?;
            JsonOutput::print_list(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result = app.list(&TextOutput)?;
            TextOutput::print_list(&result).into_diagnostic()
        }
    }
}

fn run_fetch(
    app: &App<ScivisHttpClient>,
    name: &str,
    output_mode: OutputMode,
) -> miette::Result<()> {
    match output_mode {
        OutputMode::Json => {
            let result = app.fetch(name, &JsonOutput)?;
            JsonOutput::print_fetch(&result).into_diagnostic()
        }
        OutputMode::Text => {
            let result = app.fetch(name, &TextOutput)?;
            TextOutput::print_fetch(&result).into_diagnostic()
        }
    }
}
