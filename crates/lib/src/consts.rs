pub const APP_NAME: &str = "depcache";

/// Extension of the per-library lock file kept next to its build directory.
pub const LOCK_EXTENSION: &str = "lock";

/// Version of the JSON metadata written into lock files.
pub const LOCK_METADATA_VERSION: u32 = 1;
