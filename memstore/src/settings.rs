use crate::error::{invalid_argument, Result};

pub const CACHE_SIZE_UNLIMITED: i64 = -1;

const DEFAULT_HOST: &str = "memstore.local";
const DEFAULT_CACHE_SIZE_BYTES: i64 = 100 * 1024 * 1024;

/// Store configuration. The embedded engine keeps everything in memory, but
/// the settings surface matches what a networked SDK would expose so callers
/// can configure both the same way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub persistence_enabled: bool,
    pub ssl_enabled: bool,
    pub cache_size_bytes: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            persistence_enabled: true,
            ssl_enabled: true,
            cache_size_bytes: DEFAULT_CACHE_SIZE_BYTES,
        }
    }
}

impl Settings {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(invalid_argument("settings host must not be empty"));
        }
        if self.cache_size_bytes != CACHE_SIZE_UNLIMITED && self.cache_size_bytes <= 0 {
            return Err(invalid_argument(
                "cache size must be positive or CACHE_SIZE_UNLIMITED",
            ));
        }
        Ok(())
    }
}

/// Read routing preference.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Source {
    #[default]
    Default,
    Server,
    Cache,
}

/// Filter comparison operators.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    ArrayContains,
}

/// Sort direction for ordered queries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}
