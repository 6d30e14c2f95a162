//! `mdr render` command implementation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use mdr_page::{PageBundle, PageError};
use mdr_renderer::Registry;
use mdr_renderer::html::Element;
use rayon::prelude::*;

use super::{CommonArgs, registry_for};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Page bundle JSON files.
    #[arg(required = true)]
    bundles: Vec<PathBuf>,

    /// Output directory for rendered pages (overrides config; default: stdout).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Validate and render without writing anything.
    #[arg(long)]
    check: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// Bundles are rendered in parallel; results are reported in argument
    /// order. A failing bundle does not stop the others.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the output directory cannot
    /// be created, or any bundle fails to render or be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(self.output_dir)?;
        let registry = registry_for(&config);
        let out_dir = if self.check {
            None
        } else {
            config.output_resolved.dir.clone()
        };

        if let Some(dir) = &out_dir {
            check_unique_stems(&self.bundles)?;
            std::fs::create_dir_all(dir)?;
            output.info(&format!("Output: {}", dir.display()));
        }

        let results: Vec<_> = self
            .bundles
            .par_iter()
            .map(|path| render_bundle(path, &registry))
            .collect();

        let total = results.len();
        let mut failed = 0;
        for (path, result) in self.bundles.iter().zip(results) {
            let html = match result {
                Ok(html) => html,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "Failed to render page bundle");
                    output.error(&format!("{}: {err}", path.display()));
                    failed += 1;
                    continue;
                }
            };
            if self.check {
                output.success(&format!("OK {}", path.display()));
            } else if let Some(target) = config.output_resolved.page_path(&stem(path)) {
                match std::fs::write(&target, html) {
                    Ok(()) => {
                        output.success(&format!("{} -> {}", path.display(), target.display()));
                    }
                    Err(err) => {
                        tracing::warn!(path = %target.display(), error = %err, "Failed to write page");
                        output.error(&format!("{}: {err}", target.display()));
                        failed += 1;
                    }
                }
            } else {
                output.result(&html)?;
            }
        }

        if failed > 0 {
            return Err(CliError::Validation(format!(
                "{failed} of {total} page bundles failed"
            )));
        }
        if out_dir.is_some() || self.check {
            output.highlight(&format!("Rendered {total} page(s)"));
        }
        Ok(())
    }
}

/// Load, validate and render one bundle to an HTML fragment.
fn render_bundle(path: &Path, registry: &Arc<Registry<Element>>) -> Result<String, PageError> {
    let bundle = PageBundle::load(path)?;
    bundle.validate()?;
    let page = bundle.render(registry)?;
    tracing::info!(path = %path.display(), title = %page.title, "Rendered page");
    Ok(page.to_html())
}

/// Output file stem of a bundle.
fn stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "index".to_owned(), |s| s.to_string_lossy().into_owned())
}

/// Reject bundles that would overwrite each other's output.
fn check_unique_stems(bundles: &[PathBuf]) -> Result<(), CliError> {
    let mut seen = HashSet::new();
    for path in bundles {
        let stem = stem(path);
        if !seen.insert(stem.clone()) {
            return Err(CliError::Validation(format!(
                "more than one bundle would be written as '{stem}'"
            )));
        }
    }
    Ok(())
}
