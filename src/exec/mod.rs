//! Execution data codec and merge stores.
//!
//! This module handles:
//! - Decoding and encoding binary execution data files
//! - Merging per-class probe data across files
//! - Computing class identifiers from class file bytes

pub mod crc64;
pub mod loader;
pub mod mutf8;
pub mod reader;
pub mod store;
pub mod writer;

// Re-export main types
pub use loader::{ExecFileLoader, ExecutionDataLoader};
pub use reader::{ExecutionDataReader, ExecutionDataVisitor, RecordList};
pub use store::{
    Accumulator, ExecutionData, ExecutionDataStore, MergedCoverage, SessionInfo, SessionInfoStore,
};
pub use writer::{write_merged, ExecutionDataWriter};
