use query_core::TranslatorConfig;
use serde::{Deserialize, Serialize};

/// Configuration for the devcamper module (`modules.devcamper`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DevcamperConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// Sort applied to list endpoints when the request has none.
    #[serde(default = "default_sort")]
    pub default_sort: String,
    /// Prefix all REST routes are mounted under.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
}

impl Default for DevcamperConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            default_sort: default_sort(),
            api_prefix: default_api_prefix(),
        }
    }
}

fn default_page_size() -> u64 {
    25
}

fn default_max_page_size() -> u64 {
    1000
}

fn default_sort() -> String {
    "-createdAt,-name".to_string()
}

fn default_api_prefix() -> String {
    "/api/v1".to_string()
}

impl DevcamperConfig {
    pub fn translator(&self) -> TranslatorConfig {
        TranslatorConfig {
            max_limit: self.max_page_size.max(1),
            ..TranslatorConfig::default()
        }
        .with_default_limit(self.default_page_size)
        .with_default_sort(self.default_sort.clone())
    }
}
