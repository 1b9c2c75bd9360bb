/// Sentinel for [`FirestoreSettings::cache_size_bytes`] disabling the cache
/// size limit entirely.
pub const CACHE_SIZE_UNLIMITED: i64 = -1;

const DEFAULT_HOST: &str = "firestore.googleapis.com";
const DEFAULT_CACHE_SIZE_BYTES: i64 = 100 * 1024 * 1024;

/// Client configuration shared across platforms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FirestoreSettings {
    pub host: String,
    pub persistence_enabled: bool,
    pub ssl_enabled: bool,
    pub cache_size_bytes: i64,
}

impl Default for FirestoreSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            persistence_enabled: true,
            ssl_enabled: true,
            cache_size_bytes: DEFAULT_CACHE_SIZE_BYTES,
        }
    }
}

/// Where a read should be served from.
///
/// Non-exhaustive on purpose: new preferences may be added, and adapters map
/// anything they do not recognize to the native default rather than failing
/// a read over a routing hint.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Source {
    #[default]
    Default,
    Server,
    Cache,
}

/// Comparison applied by a query filter.
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

/// Sort direction for an ordered query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}
