//! Error types for the store.
//!
//! Mirrors the shape of the teacher's `quick_error!`-based error enums (see
//! `core/src/alloc/manager.rs`): a flat enum with a `Display` message per variant and an
//! automatic `From<std::io::Error>` conversion for the I/O-facing variant.

use std::io;

use quick_error::quick_error;

quick_error! {
    /// Everything that can go wrong while operating on a `Store`.
    ///
    /// `NotFound` is deliberately absent: lookups that find nothing return `Option::None`
    /// or `false`, not an error (see `store.rs`).
    #[derive(Debug)]
    pub enum Error {
        /// Allocation failure.
        ///
        /// Not raised by any path in this crate today (Rust aborts the process on
        /// allocator exhaustion by default), but kept for API completeness and to mirror
        /// the teacher's `OutOfSpace`/`OutOfClusters` variants for resource exhaustion.
        OutOfMemory {
            display("out of memory")
        }
        /// A log or snapshot line that could not be parsed during replay or load.
        MalformedLogRecord(line: String, reason: String) {
            display("malformed log record {:?}: {}", line, reason)
        }
        /// A stream read/write failure while appending to, replaying, or snapshotting the log.
        Io(err: io::Error) {
            from()
            display("I/O error: {}", err)
        }
    }
}
