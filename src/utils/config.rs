//! Configuration and constants for log parsing.

/// Tag prefixing every memory counter record in the job log
pub const MEMORY_RECORD_PREFIX: &str = " *MEMCOUNTER* ";

/// Tag prefixing every module timer record in the job log
pub const TIMING_RECORD_PREFIX: &str = " *MODULETIMER* ";

/// Steps whose identifier starts with this prefix are per-event processing
/// steps; everything else is one-time setup (construction, begin/end hooks)
pub const EVENT_STEP_PREFIX: &str = "event";

/// The monitored job reports aggregate per-event overhead as a synthetic
/// module with this name and type
pub const EVENT_TOTAL_MODULE: &str = "EVENT";

// Scale factors for normalizing raw counter values.
// Memory counters report raw bytes, timers report picosecond ticks,
// RSS samples report kilobytes.
pub const BYTES_PER_MIB: f64 = 1_048_576.0;
pub const TICKS_PER_SECOND: f64 = 1_000_000_000_000.0;
pub const KB_PER_MB: f64 = 1024.0;

/// Minimum comma-separated fields in a memory record:
/// step, name, type, held bytes, peak bytes, held allocations, peak allocations
pub const MIN_MEMORY_COLUMNS: usize = 7;

/// Minimum comma-separated fields in a timing record:
/// step, name, type, real ticks, user ticks, sys ticks
pub const MIN_TIMING_COLUMNS: usize = 6;

/// A memory record with this many fields also carries a deferred
/// product-size attachment: an earlier step identifier plus a byte count
pub const PRODUCT_COLUMNS: usize = 9;

// RSS sample layout. These lines come from an external monitor interleaved
// in the log, so recognition is purely positional: the whitespace-split
// token count must match and four literal marker tokens must be in place.
pub const RSS_TOKEN_COUNTS: [usize; 2] = [13, 15];
pub const RSS_LITERAL_TOKENS: &[(usize, &str)] = &[(6, "mem"), (8, "kb"), (9, "pid"), (11, "node")];
pub const RSS_VALUE_INDEX: usize = 7;

/// Current archive format version
pub const ARCHIVE_VERSION: &str = "1.0.0";

/// File extension used for saved model archives
pub const ARCHIVE_EXTENSION: &str = "jobinfo.gz";
