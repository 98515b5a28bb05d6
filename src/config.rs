use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use slidedeck_compile::RuleRegistry;

use crate::rules::TemplateRule;

/// Top-level slidedeck.json schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckConfig {
    /// Where generated modules go. Defaults to next to each source file.
    #[serde(default)]
    pub out_dir: Option<String>,

    /// File extensions treated as decks when scanning directories.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Custom element rules: type tag → template.
    #[serde(default)]
    pub rules: BTreeMap<String, String>,
}

fn default_extensions() -> Vec<String> {
    vec!["yaml".to_string(), "yml".to_string()]
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            out_dir: None,
            extensions: default_extensions(),
            rules: BTreeMap::new(),
        }
    }
}

impl DeckConfig {
    /// Build the rule registry described by `rules`.
    pub fn registry(&self) -> RuleRegistry {
        let mut registry = RuleRegistry::new();
        for (tag, template) in &self.rules {
            registry.register(tag.as_str(), TemplateRule::new(template));
        }
        registry
    }

    pub fn is_deck(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Load config from a slidedeck.json file, or return defaults if missing.
pub fn load_config(config_path: &Path) -> Result<DeckConfig> {
    if config_path.exists() {
        let raw = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: DeckConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        tracing::info!(path = %config_path.display(), rules = config.rules.len(), "Loaded config");
        Ok(config)
    } else {
        Ok(DeckConfig::default())
    }
}
