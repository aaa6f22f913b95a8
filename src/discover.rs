//! Source file discovery from entrypoint glob patterns.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use indexmap::IndexSet;
use tracing::debug;

/// Resolve `patterns` under `root` into a sorted, de-duplicated list of
/// TypeScript sources. Existing declaration files are never inputs.
pub fn discover(root: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let base = Pattern::escape(&root.to_string_lossy());
    let mut files = IndexSet::new();

    for pattern in patterns {
        let full = format!("{}/{}", base.trim_end_matches('/'), pattern);
        let matches = glob(&full).with_context(|| format!("invalid entrypoint pattern `{pattern}`"))?;
        for entry in matches {
            let path = entry.with_context(|| format!("failed to read a match of `{pattern}`"))?;
            if path.is_file() && !is_declaration_file(&path) {
                files.insert(path);
            }
        }
    }

    files.sort();
    debug!(root = %root.display(), count = files.len(), "discovered sources");
    Ok(files.into_iter().collect())
}

/// `foo.d.ts`, `foo.d.mts` and `foo.d.cts`.
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(".d.ts") || n.ends_with(".d.mts") || n.ends_with(".d.cts"))
}

/// Where the declaration for `source` is written: its path relative to
/// `root`, mirrored under `outdir`, with a `.d.ts` extension. Sources
/// outside `root` land directly in `outdir`.
pub fn output_path(root: &Path, outdir: &Path, source: &Path) -> PathBuf {
    let source = normalize(source);
    let relative = source
        .strip_prefix(normalize(root))
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| source.file_name().map(PathBuf::from).unwrap_or_default());
    let mut output = outdir.join(relative);
    output.set_extension("d.ts");
    output
}

fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
