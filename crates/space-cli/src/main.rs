//! space: command line client for an HTTP space.
//!
//! Logs go to stderr so `cat` output can be piped.

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use space_core::{Encoding, FileData, FileMeta, LoggingHooks, Space};
use space_http::{HttpSpace, HttpSpaceConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "space")]
#[command(about = "Read and write files in a remote space")]
struct Cli {
    /// Root URL of the space
    #[arg(long, env = "SPACE_URL")]
    url: String,

    /// Server-side space path to verify when listing
    #[arg(long, env = "SPACE_PATH")]
    space_path: Option<String>,

    /// User name (only used together with --password)
    #[arg(long, env = "SPACE_USER")]
    user: Option<String>,

    /// Password (only used together with --user)
    #[arg(long, env = "SPACE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all files
    Ls,

    /// Print a file to stdout
    Cat {
        name: String,
        /// binary, text or dataurl
        #[arg(long, default_value = "binary")]
        encoding: Encoding,
    },

    /// Upload a file from disk or stdin
    Put {
        name: String,
        /// Local file to upload; stdin when omitted or "-"
        source: Option<PathBuf>,
        /// How the source is interpreted: binary, text or dataurl
        #[arg(long, default_value = "binary")]
        encoding: Encoding,
        /// Modification time to keep, in ms since epoch
        #[arg(long)]
        last_modified: Option<i64>,
    },

    /// Delete a file
    Rm { name: String },

    /// Show file metadata as JSON
    Stat { name: String },
}

impl Cli {
    fn space_config(&self) -> HttpSpaceConfig {
        let mut config = HttpSpaceConfig::new(&self.url);
        if let Some(path) = &self.space_path {
            config = config.with_expected_space_path(path);
        }
        if let (Some(user), Some(password)) = (&self.user, &self.password) {
            config = config.with_credentials(user, password);
        }
        config
    }
}

fn read_source(source: Option<&PathBuf>) -> Result<Vec<u8>> {
    match source {
        Some(path) if path.as_os_str() != "-" => {
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
        }
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn to_file_data(bytes: Vec<u8>, encoding: Encoding) -> Result<FileData> {
    Ok(match encoding {
        Encoding::Binary => FileData::Binary(bytes),
        Encoding::Text => FileData::Text(String::from_utf8(bytes).context("Source is not valid UTF-8")?),
        Encoding::DataUrl => FileData::DataUrl(
            String::from_utf8(bytes)
                .context("Source is not a data URL")?
                .trim()
                .to_string(),
        ),
    })
}

fn format_entry(meta: &FileMeta) -> String {
    format!(
        "{}  {:>10}  {:>13}  {}",
        meta.perm.as_str(),
        meta.size,
        meta.last_modified,
        meta.name
    )
}

async fn run(cli: Cli) -> Result<()> {
    let space = HttpSpace::new(cli.space_config(), LoggingHooks::shared())
        .context("Invalid space configuration")?;
    info!("Using space at {}", space.base_url());

    match cli.command {
        Command::Ls => {
            let files = space.fetch_file_list().await?;
            debug!("{} file(s)", files.len());
            let mut out = std::io::stdout().lock();
            for meta in &files {
                writeln!(out, "{}", format_entry(meta))?;
            }
        }
        Command::Cat { name, encoding } => {
            let content = space.read_file(&name, encoding).await?;
            let mut out = std::io::stdout().lock();
            match content.data {
                FileData::Binary(bytes) => out.write_all(&bytes)?,
                FileData::Text(text) | FileData::DataUrl(text) => out.write_all(text.as_bytes())?,
            }
            out.flush()?;
        }
        Command::Put {
            name,
            source,
            encoding,
            last_modified,
        } => {
            let data = to_file_data(read_source(source.as_ref())?, encoding)?;
            let meta = space.write_file(&name, data, last_modified).await?;
            info!("Wrote {} ({} bytes)", meta.name, meta.size);
        }
        Command::Rm { name } => {
            space.delete_file(&name).await?;
            info!("Deleted {}", name);
        }
        Command::Stat { name } => {
            let meta = space.get_file_meta(&name).await?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging - respects RUST_LOG env var, defaults to warn (or debug with --verbose)
    let default_filter = if cli.verbose {
        "debug,space_cli=debug,space_http=debug"
    } else {
        "warn,space_cli=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if cli.user.is_some() != cli.password.is_some() {
        bail!("--user and --password must be given together");
    }

    run(cli).await
}
