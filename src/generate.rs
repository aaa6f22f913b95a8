//! Generation of `.d.ts` files for a whole project.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dtsx_extract::{extract, ExtractOptions};
use tracing::{debug, info};

use crate::config::DtsConfig;
use crate::discover::{discover, output_path};

/// Resolved settings for one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub root: PathBuf,
    pub entrypoints: Vec<String>,
    pub outdir: PathBuf,
    /// A single source file, used instead of the entrypoints.
    pub file: Option<PathBuf>,
    pub clean: bool,
    pub keep_comments: bool,
}

impl GenerateOptions {
    pub fn from_config(config: &DtsConfig) -> Self {
        Self {
            root: config.root(),
            entrypoints: config.entrypoints(),
            outdir: config.outdir(),
            file: None,
            clean: config.clean(),
            keep_comments: config.keep_comments(),
        }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_entrypoints(mut self, entrypoints: Vec<String>) -> Self {
        self.entrypoints = entrypoints;
        self
    }

    pub fn with_outdir(mut self, outdir: impl Into<PathBuf>) -> Self {
        self.outdir = outdir.into();
        self
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn with_comments(mut self, keep: bool) -> Self {
        self.keep_comments = keep;
        self
    }
}

/// One source file and the declaration file written for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub source: PathBuf,
    pub output: PathBuf,
}

/// Extract declarations for every selected source and write them under
/// the output directory.
pub fn generate(options: &GenerateOptions) -> Result<Vec<Generated>> {
    let sources = match &options.file {
        Some(file) => vec![file.clone()],
        None => discover(&options.root, &options.entrypoints)?,
    };

    if options.clean && options.outdir.exists() {
        debug!(outdir = %options.outdir.display(), "cleaning output directory");
        fs::remove_dir_all(&options.outdir).with_context(|| {
            format!("failed to clean output directory {}", options.outdir.display())
        })?;
    }

    let extract_options = ExtractOptions::default().with_comments(options.keep_comments);
    let mut generated = Vec::with_capacity(sources.len());
    for source in sources {
        let output = output_path(&options.root, &options.outdir, &source);
        let dts = extract(&source, &extract_options)?;
        write_output(&output, &dts)?;
        info!(source = %source.display(), output = %output.display(), "generated declarations");
        generated.push(Generated { source, output });
    }

    Ok(generated)
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("failed to write {}", path.display()))
}
