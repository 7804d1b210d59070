//! Configuration and constants for the importer and CLI.

/// Current report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Async thread names are "<prefix>:<task label>"
pub const EXT4_THREAD_PREFIX: &str = "ext4";
pub const F2FS_THREAD_PREFIX: &str = "f2fs";
pub const BLOCK_THREAD_PREFIX: &str = "block";

/// Sector value the block layer reports for requests with no sector (flushes)
pub const NO_SECTOR: u64 = u64::MAX;

/// Leading character of ftrace header/comment lines
pub const COMMENT_PREFIX: char = '#';
