use std::env;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use layercfg::{Document, Value, ValueKind};
use layercfg::discover::{LayerSource, discover_layers, load_layers, merge_layers};

#[derive(Parser)]
#[command(name = "layercfg")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Options shared by every command
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Config files to layer, lowest precedence first
    #[arg(short, long = "file", env = "LAYERCFG_FILES", value_delimiter = ':', global = true)]
    files: Vec<PathBuf>,

    /// File name to discover when no files are given
    #[arg(long, default_value = "setup.cfg", global = true)]
    name: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a single typed value
    Get {
        section: String,
        key: String,

        /// How to interpret the raw value
        #[arg(long = "as", value_enum, default_value_t = Kind::Scalar)]
        kind: Kind,

        /// Expand %(name)s references (scalar values only)
        #[arg(long)]
        interpolate: bool,
    },

    /// Print the merged document in canonical form
    Dump,

    /// Print section names
    Sections,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    Scalar,
    List,
    Rules,
    Bool,
    Int,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let document = load(&cli.global)?;

    match cli.command {
        Commands::Get {
            section,
            key,
            kind,
            interpolate,
        } => get(&document, &section, &key, kind, interpolate)?,
        Commands::Dump => print!("{document}"),
        Commands::Sections => {
            for section in document.sections() {
                println!("{}", section.name());
            }
        }
    }

    Ok(())
}

// Level is overridden by `RUST_LOG`. Logs go to stderr so stdout only carries values.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load(opts: &GlobalOpts) -> anyhow::Result<Document> {
    let paths = if opts.files.is_empty() {
        let cwd = env::current_dir().context("failed to read the working directory")?;
        let found = discover_layers(&cwd, &opts.name);
        if found.is_empty() {
            bail!("no {} found in {} or its parents", opts.name, cwd.display());
        }
        found
    } else {
        opts.files
            .iter()
            .map(|path| (path.clone(), LayerSource::Explicit))
            .collect()
    };

    let layers = load_layers(paths).context("failed to load configuration")?;
    for layer in &layers {
        if let Some(path) = &layer.path {
            info!(path = %path.display(), source = %layer.source, "layer");
        }
    }

    Ok(merge_layers(&layers))
}

fn get(
    document: &Document,
    section: &str,
    key: &str,
    kind: Kind,
    interpolate: bool,
) -> anyhow::Result<()> {
    if !document.contains_key(section, key) {
        bail!("[{section}] {key} is not set");
    }
    if interpolate && kind != Kind::Scalar {
        bail!("--interpolate only applies to scalar values");
    }

    if interpolate {
        let value = document.get_interpolated(section, key)?.unwrap_or_default();
        println!("{value}");
        return Ok(());
    }

    let value_kind = match kind {
        Kind::Scalar => ValueKind::Scalar,
        Kind::List => ValueKind::List,
        Kind::Rules => ValueKind::RuleSet,
        Kind::Bool => {
            println!("{}", document.get_bool(section, key, false)?);
            return Ok(());
        }
        Kind::Int => {
            println!("{}", document.get_int(section, key, 0)?);
            return Ok(());
        }
    };

    match document.get(section, key, value_kind)? {
        Some(Value::Scalar(value)) => println!("{value}"),
        Some(Value::List(items)) => {
            for item in items {
                println!("{item}");
            }
        }
        Some(Value::RuleSet(rules)) => {
            for code in rules.iter() {
                println!("{code}");
            }
        }
        Some(other) => bail!("[{section}] {key}: unsupported value {other:?}"),
        None => bail!("[{section}] {key} is not set"),
    }

    Ok(())
}
