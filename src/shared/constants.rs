/// Default page size when a page is requested without an explicit limit
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Number of hex characters in a generated resource id suffix
pub const RESOURCE_ID_SUFFIX_LEN: usize = 12;
