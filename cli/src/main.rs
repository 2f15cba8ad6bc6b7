//! sempdf CLI - extract the logical structure of scientific PDFs

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use sempdf::serialize::{self, OutputFormat};
use sempdf::{Error, ExtractionUnit, PipelineOptions, SemanticRole};

/// Exit code for usage errors.
const EXIT_USAGE: u8 = 1;
/// Exit code for PDF parse errors.
const EXIT_PARSE: u8 = 2;
/// Exit code for I/O errors.
const EXIT_IO: u8 = 3;
/// Exit code for cancelled runs.
const EXIT_CANCELLED: u8 = 4;

#[derive(Parser)]
#[command(name = "sempdf")]
#[command(version)]
#[command(about = "Extract paragraphs, roles and geometry from PDFs", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Serialization format: xml, json or txt
    #[arg(short, long, default_value = "xml")]
    format: String,

    /// Extraction unit to emit (repeatable): character, word,
    /// paragraph, figure, shape, page
    #[arg(long = "unit", value_name = "UNIT")]
    units: Vec<String>,

    /// Semantic role to include (repeatable): title, heading, body,
    /// abstract, reference, ... (all roles if not specified)
    #[arg(long = "include-role", value_name = "ROLE")]
    roles: Vec<String>,

    /// Process pages sequentially instead of in parallel
    #[arg(long)]
    sequential: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(EXIT_USAGE);
        }
    };

    env_logger::init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err((code, message)) => {
            eprintln!("{} {}", "error:".red().bold(), message);
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<(), (u8, String)> {
    let format: OutputFormat = cli.format.parse().map_err(|e: String| (EXIT_USAGE, e))?;

    let units: HashSet<ExtractionUnit> = if cli.units.is_empty() {
        serialize::default_units()
    } else {
        cli.units
            .iter()
            .map(|u| u.parse())
            .collect::<Result<_, String>>()
            .map_err(|e| (EXIT_USAGE, e))?
    };

    let roles: HashSet<SemanticRole> = if cli.roles.is_empty() {
        serialize::default_roles()
    } else {
        cli.roles
            .iter()
            .map(|r| r.parse())
            .collect::<Result<_, String>>()
            .map_err(|e| (EXIT_USAGE, e))?
    };

    let data =
        fs::read(&cli.input).map_err(|e| (EXIT_IO, format!("{}: {}", cli.input.display(), e)))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}").expect("valid template"));
    spinner.set_message(format!("extracting {}", cli.input.display()));

    let mut options = PipelineOptions::new();
    if cli.sequential {
        options = options.sequential();
    }

    let doc = sempdf::extract_bytes_with_options(&data, options).map_err(map_error)?;

    spinner.set_message("serializing");
    let mut serializer = serialize::create(format, units, roles);
    let bytes = serializer.serialize(&doc).map_err(map_error)?;
    spinner.finish_and_clear();

    match cli.output {
        Some(path) => {
            fs::write(&path, bytes).map_err(|e| (EXIT_IO, format!("{}: {}", path.display(), e)))?
        }
        None => std::io::stdout()
            .write_all(&bytes)
            .map_err(|e| (EXIT_IO, e.to_string()))?,
    }

    Ok(())
}

fn map_error(err: Error) -> (u8, String) {
    let code = match err {
        Error::Parse { .. } | Error::UnsupportedFeature { .. } => EXIT_PARSE,
        Error::Cancelled => EXIT_CANCELLED,
        Error::Io(_) | Error::Serialize(_) => EXIT_IO,
    };
    (code, err.to_string())
}
