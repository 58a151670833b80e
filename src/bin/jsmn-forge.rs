//! jsmn-forge CLI
//!
//! Command-line interface for normalizing, joining, diffing and flattening
//! OpenAPI / JSON Schema documents.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jsmn_forge::{
    build_registry, diff, flatten, join, load_document, normalize, Grammar, Scheme,
    DEFAULT_EXTENSION, DEFAULT_SCHEME,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "jsmn-forge")]
#[command(about = "Normalize, merge, diff and flatten OpenAPI / JSON Schema documents")]
#[command(version)]
struct Cli {
    /// Enable verbose logging (sets log level to debug)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize one document into canonical form
    Normalize {
        file: PathBuf,

        #[command(flatten)]
        grammar: GrammarArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Normalize and merge documents, in order, into one
    Join {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        grammar: GrammarArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Structurally compare two documents (exit 1 when they differ)
    Diff {
        left: PathBuf,
        right: PathBuf,

        /// Normalize both documents before comparing
        #[arg(long)]
        normalize: bool,

        #[command(flatten)]
        grammar: GrammarArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Lower named object schemas to the struct IR (exit 1 on schema errors)
    Flatten {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        grammar: GrammarArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List every document registered by the given workspaces
    Discover {
        #[arg(required = true)]
        dirs: Vec<PathBuf>,

        /// Scheme of assigned document identities
        #[arg(long, default_value = DEFAULT_SCHEME)]
        scheme: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
struct GrammarArgs {
    /// Document grammar
    #[arg(long, value_enum, default_value_t = GrammarArg::Openapi)]
    grammar: GrammarArg,

    /// Reference scheme rewritten to sibling files
    #[arg(long, default_value = DEFAULT_SCHEME)]
    scheme: String,

    /// Extension of the files scheme references rewrite to
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    extension: String,
}

impl GrammarArgs {
    fn grammar(&self) -> Grammar {
        match self.grammar {
            GrammarArg::Openapi => Grammar::openapi_3_1(),
            GrammarArg::JsonSchema => Grammar::json_schema(),
        }
    }

    fn scheme(&self) -> Scheme {
        Scheme::new(self.scheme.as_str()).extension(self.extension.as_str())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum GrammarArg {
    Openapi,
    JsonSchema,
}

#[derive(Args)]
struct OutputArgs {
    /// Output file (stdout if not specified)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // logs go to stderr so stdout stays clean for documents
    let log_level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Normalize {
            file,
            grammar,
            output,
        } => run_normalize(&file, &grammar, &output),
        Commands::Join {
            files,
            grammar,
            output,
        } => run_join(&files, &grammar, &output),
        Commands::Diff {
            left,
            right,
            normalize,
            grammar,
            output,
        } => run_diff(&left, &right, normalize, &grammar, &output),
        Commands::Flatten {
            files,
            grammar,
            output,
        } => run_flatten(&files, &grammar, &output),
        Commands::Discover {
            dirs,
            scheme,
            output,
        } => run_discover(&dirs, &scheme, &output),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn load(path: &Path) -> Result<Value, u8> {
    load_document(path).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn run_normalize(file: &Path, args: &GrammarArgs, output: &OutputArgs) -> Result<(), u8> {
    let doc = load(file)?;
    let normalized = normalize(&doc, &args.grammar(), &args.scheme());
    emit(&normalized, output)
}

fn run_join(files: &[PathBuf], args: &GrammarArgs, output: &OutputArgs) -> Result<(), u8> {
    let result = join(files, &args.grammar(), &args.scheme());

    for conflict in &result.conflicts {
        eprintln!(
            "Conflict: {} at {}: destination {}, source {}",
            conflict.file.display(),
            conflict.location,
            conflict.destination,
            conflict.source
        );
    }
    for error in &result.errors {
        eprintln!("Error: {}", error);
    }

    if let Some(value) = &result.value {
        emit(value, output)?;
    }
    match result.errors.first() {
        Some(error) => Err(error.exit_code() as u8),
        None => Ok(()),
    }
}

fn run_diff(
    left: &Path,
    right: &Path,
    normalize_first: bool,
    args: &GrammarArgs,
    output: &OutputArgs,
) -> Result<(), u8> {
    let mut a = load(left)?;
    let mut b = load(right)?;
    if normalize_first {
        let (grammar, scheme) = (args.grammar(), args.scheme());
        a = normalize(&a, &grammar, &scheme);
        b = normalize(&b, &grammar, &scheme);
    }

    let differences = diff(&a, &b);
    if differences.is_empty() {
        return Ok(());
    }
    emit(&differences, output)?;
    Err(1)
}

fn run_flatten(files: &[PathBuf], args: &GrammarArgs, output: &OutputArgs) -> Result<(), u8> {
    let docs = files
        .iter()
        .map(|file| load(file))
        .collect::<Result<Vec<_>, _>>()?;

    let result = flatten(&args.grammar(), &docs);
    for error in &result.errors {
        eprintln!("Error: {}", error);
    }
    emit(&result, output)?;
    if result.is_ok() {
        Ok(())
    } else {
        Err(1)
    }
}

fn run_discover(dirs: &[PathBuf], scheme: &str, output: &OutputArgs) -> Result<(), u8> {
    let result = build_registry(&Scheme::new(scheme), dirs);
    for error in &result.errors {
        eprintln!("Error: {}", error);
    }

    let listing: Vec<Value> = result
        .registry
        .iter()
        .map(|(id, entry)| {
            json!({
                "id": id.to_string(),
                "path": entry.path.display().to_string(),
            })
        })
        .collect();
    emit(&listing, output)?;
    if result.errors.is_empty() {
        Ok(())
    } else {
        Err(1)
    }
}

/// Write `value` to the output file or stdout in the requested format.
fn emit<T: Serialize>(value: &T, output: &OutputArgs) -> Result<(), u8> {
    let text = match output.format {
        OutputFormat::Json if output.pretty => {
            serde_json::to_string_pretty(value).map_err(|e| e.to_string())
        }
        OutputFormat::Json => serde_json::to_string(value).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match &output.output {
        Some(path) => {
            std::fs::write(path, &text).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", text.trim_end());
        }
    }

    Ok(())
}
