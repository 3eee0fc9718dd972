//! Structured logging schema and field name constants for cubby.
//!
//! All crates use these constants for consistent structured logging fields
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue (index sync failure, sentinel identity) |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration (chunks, search hits) |

/// Correlation ID propagated across a request's sub-calls. Format: UUIDv7.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "storage", "index"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "upload", "modify_file", "search_files", "upsert"
pub const OPERATION: &str = "op";

/// Owning user identity for the operation.
pub const OWNER: &str = "owner";

/// Filename being operated on.
pub const FILENAME: &str = "filename";

/// Stable document id tying a file to its index chunks.
pub const DOCUMENT_ID: &str = "document_id";

/// Byte length of file content.
pub const SIZE_BYTES: &str = "size_bytes";

/// Number of chunks sent to the index for one document.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Number of results returned by a search.
pub const RESULT_COUNT: &str = "result_count";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
