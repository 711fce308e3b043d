use crate::cli::ScrollArgs;
use std::path::Path;
use vlist_core::{ListConfig, ListResult};

/// Settings a command runs with: the config file (or the user's default
/// config) with command-line overrides applied on top.
pub struct CliContext {
    pub config: ListConfig,
}

impl CliContext {
    pub fn load(config_path: Option<&Path>) -> ListResult<Self> {
        let config = match config_path {
            Some(path) => {
                tracing::debug!("Loading list config from {}", path.display());
                ListConfig::load_from(path)?
            }
            None => ListConfig::load(),
        };
        Ok(Self { config })
    }

    /// Apply the scroll overrides and validate the result.
    pub fn apply_overrides(&mut self, args: &ScrollArgs) -> ListResult<()> {
        if let Some(page_size) = args.page_size {
            self.config.page_size = page_size;
        }
        if let Some(pool_pages) = args.pool_pages {
            self.config.pool_pages = pool_pages;
        }
        if let Some(element_height) = args.element_height {
            self.config.element_height = element_height;
        }
        if let Some(margin) = args.margin {
            self.config.margin = margin;
        }
        self.config.validate()
    }
}
