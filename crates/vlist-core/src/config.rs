use crate::error::VirtualListError;
use crate::result::ListResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Standard margin between elements, in pixels.
pub const DEFAULT_MARGIN: f64 = 16.0;

/// Default element height, in pixels.
pub const DEFAULT_ELEMENT_HEIGHT: f64 = 96.0;

/// Number of pages the pool holds before it starts recycling.
pub const DEFAULT_POOL_PAGES: usize = 2;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_element_height")]
    pub element_height: f64,
    #[serde(default = "default_margin")]
    pub margin: f64,
    #[serde(default = "default_pool_pages")]
    pub pool_pages: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_element_height() -> f64 {
    DEFAULT_ELEMENT_HEIGHT
}

fn default_margin() -> f64 {
    DEFAULT_MARGIN
}

fn default_pool_pages() -> usize {
    DEFAULT_POOL_PAGES
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            element_height: DEFAULT_ELEMENT_HEIGHT,
            margin: DEFAULT_MARGIN,
            pool_pages: DEFAULT_POOL_PAGES,
        }
    }
}

impl ListConfig {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }

    pub fn with_element_height(mut self, element_height: f64) -> Self {
        self.element_height = element_height;
        self
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_pool_pages(mut self, pool_pages: usize) -> Self {
        self.pool_pages = pool_pages;
        self
    }

    /// Maximum number of elements the pool may hold.
    pub fn pool_limit(&self) -> usize {
        self.page_size * self.pool_pages
    }

    /// Distance between the tops of two consecutive slots.
    pub fn slot_stride(&self) -> f64 {
        self.element_height + self.margin
    }

    pub fn validate(&self) -> ListResult<()> {
        if self.page_size == 0 {
            return Err(VirtualListError::InvalidConfig(
                "page_size must be a positive integer".to_string(),
            ));
        }
        if self.pool_pages < 2 {
            return Err(VirtualListError::InvalidConfig(format!(
                "pool_pages must be at least 2, got {}",
                self.pool_pages
            )));
        }
        if !self.element_height.is_finite() || self.element_height <= 0.0 {
            return Err(VirtualListError::InvalidConfig(format!(
                "element_height must be a positive number, got {}",
                self.element_height
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(VirtualListError::InvalidConfig(format!(
                "margin must be a non-negative number, got {}",
                self.margin
            )));
        }
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/vlist/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("vlist/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("vlist\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load the user config, falling back to defaults when it is missing or unreadable.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                if let Ok(config) = Self::load_from(&config_path) {
                    return config;
                }
            }
        }
        Self::default()
    }

    pub fn load_from(path: &Path) -> ListResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> ListResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}
