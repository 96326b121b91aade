//! Log processing for ocmscope
//!
//! This crate provides the container log buffer, ANSI stripping, the
//! keyword search indexer behind the log viewer's search bar, and a
//! cancellable log fetcher with bounded retries.

mod ansi;
mod buffer;
mod fetch;
mod search;

pub use ansi::strip_ansi;
pub use buffer::LogBuffer;
pub use fetch::{
    FetchEvent, FileLogSource, KubeLogSource, LogFetcher, LogSource, RetryPolicy, fetch_with_retry,
};
pub use search::{DEFAULT_MIN_SEARCH_CHARS, KeywordMatcher, LogSearch, search_indexes};

// Re-export types used in our public API
pub use ocmscope_types::{LogRequest, SearchMatch};
