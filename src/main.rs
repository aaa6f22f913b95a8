//! dtsx command line interface.
//!
//! # Enabling Debug Logging
//!
//! Set the `DTSX_LOG` environment variable to enable tracing, or pass
//! `--verbose`:
//!
//! ```bash
//! DTSX_LOG=debug dtsx generate
//! ```
//!
//! Log levels: error, warn, info, debug, trace

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dtsx::config::DtsxConfig;
use dtsx::generate::{generate, GenerateOptions, Generated};
use dtsx_extract::{extract, ExtractOptions};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "dtsx", version, about = "Generate .d.ts declaration files from TypeScript sources")]
struct Cli {
    /// Enable verbose debug logging (or set DTSX_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate declaration files for the project
    Generate {
        /// Path to the config file (default: ./dtsx.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Source root the entrypoints are matched under
        #[arg(long)]
        root: Option<PathBuf>,
        /// Entrypoint glob patterns, relative to the root
        #[arg(long, num_args = 1..)]
        entrypoints: Option<Vec<String>>,
        /// Output directory
        #[arg(short, long)]
        outdir: Option<PathBuf>,
        /// Generate declarations for a single file only
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Clean output directory before generating
        #[arg(long)]
        clean: bool,
        /// Drop doc comments from the output
        #[arg(long)]
        no_comments: bool,
    },
    /// Print the declarations for one file to stdout
    Extract {
        /// Source file to extract from
        file: PathBuf,
        /// Drop doc comments from the output
        #[arg(long)]
        no_comments: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("DTSX_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Generate {
            config,
            root,
            entrypoints,
            outdir,
            file,
            clean,
            no_comments,
        } => load_config(config.as_deref()).and_then(|config| {
            let mut options = GenerateOptions::from_config(&config.dts);
            if let Some(root) = root {
                options = options.with_root(root);
            }
            if let Some(entrypoints) = entrypoints {
                options = options.with_entrypoints(entrypoints);
            }
            if let Some(outdir) = outdir {
                options = options.with_outdir(outdir);
            }
            if let Some(file) = file {
                options = options.with_file(file);
            }
            if clean {
                options = options.with_clean(true);
            }
            if no_comments {
                options = options.with_comments(false);
            }
            run_generate(&options)
        }),
        Command::Extract { file, no_comments } => run_extract(&file, no_comments),
    };

    if let Err(err) = result {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<DtsxConfig> {
    let config = match path {
        Some(path) => DtsxConfig::load_from_path(path)?,
        None => DtsxConfig::load()?,
    };
    Ok(config)
}

fn run_generate(options: &GenerateOptions) -> Result<()> {
    let generated = generate(options)?;
    print_summary(&generated).context("failed to write summary")
}

fn run_extract(file: &Path, no_comments: bool) -> Result<()> {
    let options = ExtractOptions::default().with_comments(!no_comments);
    let dts = extract(file, &options)?;
    println!("{dts}");
    Ok(())
}

fn print_summary(generated: &[Generated]) -> std::io::Result<()> {
    let choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let mut stdout = StandardStream::stdout(choice);
    for item in generated {
        stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
        write!(stdout, "  Generated")?;
        stdout.reset()?;
        writeln!(stdout, " {} -> {}", item.source.display(), item.output.display())?;
    }
    writeln!(
        stdout,
        "Generated {} declaration file{}",
        generated.len(),
        if generated.len() == 1 { "" } else { "s" }
    )
}
