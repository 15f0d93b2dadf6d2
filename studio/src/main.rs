mod command;
mod config;
mod studio;

use {
    crate::{command::Command, config::Config, studio::Studio},
    clap::{Parser, Subcommand},
    color_eyre::Report,
    eyre::WrapErr,
    std::{
        fs::File,
        io::{BufRead, BufReader},
        path::PathBuf,
    },
    tracing_subscriber::{fmt, prelude::*, EnvFilter},
};

/// Headless avatar posing studio.
#[derive(Parser, Debug)]
#[command(name = "mannequin-studio", version, about)]
struct Args {
    /// Configuration file path, overrides MANNEQUIN_CONFIG_PATH
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Command script, read from stdin when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Tool>,
}

#[derive(Subcommand, Debug)]
enum Tool {
    /// Write full body SMPLX pose library
    Author {
        /// Output file
        path: PathBuf,
    },
}

fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(tracing_error::ErrorLayer::default())
        .init();

    let args = Args::parse();

    if let Some(Tool::Author { path }) = &args.command {
        mannequin::authoring::write_library(path)?;
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };
    tracing::info!("Config loaded: {:?}", config);

    let mut studio = Studio::new(&config)?;

    let stdin = std::io::stdin();
    let input: Box<dyn BufRead + '_> = match &args.script {
        Some(path) => Box::new(BufReader::new(File::open(path).wrap_err_with(
            || format!("Failed to open script '{}'", path.display()),
        )?)),
        None => Box::new(stdin.lock()),
    };

    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match line.parse::<Command>() {
            Ok(command) => studio.execute(command),
            Err(err) => tracing::error!("Line {}: {:#}", number + 1, err),
        }
    }

    Ok(())
}
