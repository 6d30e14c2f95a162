//! `mdr resolve` command implementation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mdr_page::{PageBundle, PageError};
use mdr_renderer::html::Element;
use mdr_renderer::{Registry, Resolution, build_with};

use super::{CommonArgs, registry_for};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the resolve command.
#[derive(Args)]
pub(crate) struct ResolveArgs {
    /// Page bundle JSON file.
    bundle: PathBuf,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ResolveArgs {
    /// Execute the resolve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or the bundle cannot be loaded, or
    /// the content tree does not build.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config(None)?;
        let registry = registry_for(&config);
        let bundle = PageBundle::load(&self.bundle)?;

        let usages = collect_usages(&bundle, &registry)?;

        output.highlight(&format!(
            "Tag resolution for '{}' ({})",
            bundle.title(),
            self.bundle.display()
        ));
        let width = usages.keys().map(|key| key.label().len()).max().unwrap_or(0);
        let mut fallbacks = 0;
        for (key, count) in &usages {
            let mut line = format!("{:width$} -> {} (x{count})", key.label(), key.resolved);
            if key.fallback {
                line.push_str(" [passthrough]");
                fallbacks += 1;
            }
            output.result(&line)?;
        }
        if fallbacks > 0 {
            output.warning(&format!(
                "{fallbacks} tag(s) have no renderer and render literally"
            ));
        }
        Ok(())
    }
}

/// A tag, the parent tag it appeared under, and what it resolved to there.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UsageKey {
    parent: Option<String>,
    tag: String,
    /// Tag handed to the renderer (the alias target, if any).
    resolved: String,
    /// Resolved to the built-in passthrough renderer.
    fallback: bool,
}

impl UsageKey {
    fn label(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{parent} > {}", self.tag),
            None => self.tag.clone(),
        }
    }
}

impl From<&Resolution<'_>> for UsageKey {
    fn from(resolution: &Resolution<'_>) -> Self {
        Self {
            parent: resolution.parent.map(str::to_owned),
            tag: resolution.tag.to_owned(),
            resolved: resolution.resolved.to_owned(),
            fallback: resolution.passthrough,
        }
    }
}

/// Build the page tree, counting each distinct resolution.
fn collect_usages(
    bundle: &PageBundle,
    registry: &Arc<Registry<Element>>,
) -> Result<BTreeMap<UsageKey, usize>, CliError> {
    let mut usages = BTreeMap::new();
    build_with(&bundle.root(), registry, &mut |resolution: &Resolution<'_>| {
        *usages.entry(UsageKey::from(resolution)).or_insert(0) += 1;
    })
    .map_err(PageError::from)?;
    Ok(usages)
}
