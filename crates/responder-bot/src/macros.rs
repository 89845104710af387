//! Macro registry setup from configuration.

use crate::config::MacrosConfig;
use response_macros::builtin::{WikiMacro, XkcdMacro, XkcdMode};
use response_macros::{MacroRegistry, RegistryError};
use std::sync::Arc;
use tracing::info;

/// Build the registry: local macros first, then the enabled lookups.
pub fn build_registry(config: &MacrosConfig) -> Result<MacroRegistry, RegistryError> {
    let mut registry = MacroRegistry::with_local_builtins()?;

    if config.xkcd.enabled {
        registry.register(Arc::new(XkcdMacro::new(
            config.xkcd.base_url.clone(),
            XkcdMode::Numbered,
        )))?;
        registry.register(Arc::new(XkcdMacro::new(
            config.xkcd.base_url.clone(),
            XkcdMode::Random,
        )))?;
    }

    if config.wiki.enabled {
        registry.register(Arc::new(WikiMacro::new(config.wiki.api_url.clone())))?;
    }

    info!(tokens = ?registry.list_tokens(), "Registered macros");
    Ok(registry)
}
