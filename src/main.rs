use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use imslp_scores::{format, model};

#[derive(Parser, Debug)]
#[command(
    name = "imslp-scores",
    version,
    about = "Discover downloadable scores on IMSLP work pages",
    long_about = "A command-line tool for listing downloadable PDF scores on IMSLP work\n\
        pages and resolving Special:ImagefromIndex links to direct PDF URLs.\n\n\
        Examples:\n  \
        imslp-scores scores \"https://imslp.org/wiki/Nocturnes_(Chopin,_Frederic)\"\n  \
        imslp-scores pdf-url \"https://imslp.org/wiki/Special:ImagefromIndex/56734/xxyz\""
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "json",
        help = "Output format",
        long_help = "Output format.\n  json     — JSON (default, best for programmatic use)\n  markdown — Human-readable markdown"
    )]
    format: OutputFormat,

    #[arg(long, short, global = true, help = "Log skipped entries and fetch details to stderr")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(ValueEnum, Clone, Debug)]
enum OutputFormat {
    Json,
    Markdown,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List downloadable PDF scores on an IMSLP work page
    ///
    /// Entries are sorted (urtext first, then publisher, then title) and
    /// deduplicated by file id. An empty list means no scores were found or
    /// the page could not be fetched.
    Scores {
        /// Work page URL: https://imslp.org/wiki/<piece>
        wiki_url: String,
    },

    /// Resolve a Special:ImagefromIndex URL to a direct PDF link
    ///
    /// Exit code 0 = resolved, 1 = download unavailable (links on IMSLP
    /// expire and rate-limit; retry later or fetch manually).
    PdfUrl {
        /// Index URL: https://imslp.org/wiki/Special:ImagefromIndex/<id>/<token>
        index_url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "imslp_scores=debug"
    } else {
        "imslp_scores=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Scores { wiki_url } => {
            let scores = imslp_scores::get_scores_by_wiki_url(&wiki_url).await;
            let result = model::ScoresResult { wiki_url, scores };
            print_output(&cli.format, &result, format::scores)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::PdfUrl { index_url } => {
            let pdf_url = imslp_scores::get_pdf_url_by_index(&index_url).await;
            let found = pdf_url.is_some();
            let result = model::PdfUrlResult { index_url, pdf_url };
            print_output(&cli.format, &result, format::pdf_url)?;
            Ok(if found {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
    }
}

/// Print output in the requested format
fn print_output<T: serde::Serialize>(
    fmt: &OutputFormat,
    value: &T,
    markdown_fn: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    match fmt {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Markdown => {
            print!("{}", markdown_fn(value));
        }
    }
    Ok(())
}
