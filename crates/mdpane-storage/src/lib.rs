//! Storage abstraction for the mdpane document session.
//!
//! This crate provides a [`Storage`] trait for reading and writing the bytes
//! behind an open document. The session core only ever talks to this trait,
//! which enables:
//!
//! - **Unit testing** without touching the real filesystem
//! - **Host flexibility** (local filesystem, editor virtual filesystems)
//! - **Clean separation** between session state and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Storage`] trait with `read()`, `write()`, and `exists()` methods
//! - [`FsStorage`] implementation for the local filesystem
//! - [`MockStorage`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use mdpane_storage::{FsStorage, Storage};
//!
//! let storage = FsStorage::new();
//! let bytes = storage.read(Path::new("notes/todo.md"))?;
//! storage.write(Path::new("notes/todo.md"), b"# Todo\n")?;
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod storage;

pub use fs::FsStorage;
#[cfg(feature = "mock")]
pub use mock::MockStorage;
pub use storage::{Storage, StorageError, StorageErrorKind};
