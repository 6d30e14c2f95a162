//! CLI command implementations.

pub(crate) mod render;
pub(crate) mod resolve;

pub(crate) use render::RenderArgs;
pub(crate) use resolve::ResolveArgs;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mdr_config::{CliSettings, Config};
use mdr_renderer::html::{self, Element, HtmlOptions};
use mdr_renderer::{Overrides, Registry};

use crate::error::CliError;

/// Arguments shared by all commands.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover mdr.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Component alias TAG=TARGET, applied over the config (repeatable).
    #[arg(long = "component", value_name = "TAG=TARGET", value_parser = parse_component)]
    components: Vec<(String, String)>,

    /// Omit icons from admonition headings.
    #[arg(long)]
    no_admonition_icons: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load config with these arguments (and `output_dir`) applied.
    fn load_config(&self, output_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            output_dir,
            admonition_icons: self.no_admonition_icons.then_some(false),
            components: self.components.clone(),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(path = %path.display(), "Loaded configuration");
        }
        Ok(config)
    }
}

/// Parse a `TAG=TARGET` component alias.
fn parse_component(value: &str) -> Result<(String, String), String> {
    let (tag, target) = value
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=TARGET, got '{value}'"))?;
    let (tag, target) = (tag.trim(), target.trim());
    if tag.is_empty() || target.is_empty() {
        return Err(format!("expected TAG=TARGET, got '{value}'"));
    }
    Ok((tag.to_owned(), target.to_owned()))
}

/// HTML registry for a configuration.
///
/// Shares the process-wide default registry when the config keeps the
/// default renderer options; component aliases are layered on top.
fn registry_for(config: &Config) -> Arc<Registry<Element>> {
    let options = HtmlOptions {
        admonition_icons: config.render.admonition_icons,
    };
    let base = if options.admonition_icons {
        Arc::clone(html::default_registry())
    } else {
        Arc::new(html::new_registry(options))
    };
    Registry::extend(&base, &Overrides::aliases(&config.components))
}

#[cfg(test)]
mod tests {
    use mdr_renderer::{NodeDescription, build};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_component() {
        assert_eq!(
            parse_component("inline-code=kbd"),
            Ok(("inline-code".to_owned(), "kbd".to_owned()))
        );
        assert_eq!(
            parse_component(" table.td = cell "),
            Ok(("table.td".to_owned(), "cell".to_owned()))
        );
    }

    #[test]
    fn test_parse_component_invalid() {
        assert!(parse_component("inline-code").is_err());
        assert!(parse_component("=kbd").is_err());
        assert!(parse_component("inline-code=").is_err());
    }

    #[test]
    fn test_registry_for_default_config_is_shared() {
        let registry = registry_for(&Config::default());
        assert!(Arc::ptr_eq(&registry, html::default_registry()));
    }

    #[test]
    fn test_registry_for_applies_components() {
        let mut config = Config::default();
        config.components.insert("inline-code".to_owned(), "kbd".to_owned());
        config.render.admonition_icons = false;

        let registry = registry_for(&config);
        let code = NodeDescription::new("inline-code").with_child(NodeDescription::text("x"));
        assert_eq!(build(&code, &registry).unwrap().to_html(), "<kbd>x</kbd>");

        let note = NodeDescription::new("admonition");
        let html = build(&note, &registry).unwrap().to_html();
        assert!(!html.contains("<svg"));
    }
}
