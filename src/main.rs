use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use tracing::error;

use folio::app::{BuildOptions, FolioApp, PackOptions};
use folio::state::{Filter, Language};

#[derive(Parser)]
#[command(author, version, about = "Static portfolio builder with a masonry project grid", long_about = None)]
struct Cli {
    /// Config file (default: ./folio.toml, then the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the grid pages and every project page
    Build {
        #[arg(long, default_value = "projects.json")]
        catalog: PathBuf,
        /// Site root holding media and static assets
        #[arg(long, default_value = ".")]
        root: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Jitter seed; random when omitted
        #[arg(long)]
        seed: Option<u64>,
        /// Language shown initially (de or en)
        #[arg(long)]
        lang: Option<Language>,
    },
    /// Pack the grid and print the rows as JSON
    Pack {
        #[arg(long, default_value = "projects.json")]
        catalog: PathBuf,
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// "all" or a category key; defaults to the stored filter
        #[arg(long)]
        filter: Option<Filter>,
        #[arg(long)]
        seed: Option<u64>,
        /// Container width in pixels
        #[arg(long)]
        width: Option<u32>,
    },
    /// Inspect or change the persisted language and filter
    State {
        #[command(subcommand)]
        command: StateCommands,
    },
}

#[derive(Subcommand)]
enum StateCommands {
    /// Print the stored state
    Show,
    /// Store the language (de or en)
    SetLanguage { language: Language },
    /// Store the grid filter ("all" or a category key)
    SetFilter { filter: Filter },
    /// Forget stored choices
    Clear,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = format!("folio={}", level).parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut app = FolioApp::from_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Build {
            catalog,
            root,
            out,
            seed,
            lang,
        } => {
            let report = app.build(&BuildOptions {
                catalog,
                root,
                out,
                seed,
                language: lang,
            })?;
            println!(
                "Built {} project pages and {} grid pages into {}",
                report.project_pages,
                report.grid_pages,
                report.output_dir.display()
            );
            if report.copied_files > 0 {
                println!("Copied {} static files", report.copied_files);
            }
            for media in &report.missing_media {
                println!("missing: {}", media);
            }
        }
        Commands::Pack {
            catalog,
            root,
            filter,
            seed,
            width,
        } => {
            let output = app.pack(&PackOptions {
                catalog,
                root,
                filter,
                seed,
                width,
            })?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::State { command } => match command {
            StateCommands::Show => {
                let state = app.render_state();
                println!("language: {}", state.language);
                println!("filter: {}", state.filter);
            }
            StateCommands::SetLanguage { language } => app.set_language(language)?,
            StateCommands::SetFilter { filter } => app.set_filter(filter)?,
            StateCommands::Clear => app.clear_state()?,
        },
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
