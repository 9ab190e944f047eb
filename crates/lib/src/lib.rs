//! depcache-lib: building third-party C++ libraries into an on-disk cache.
//!
//! This crate drives external tools rather than reimplementing them:
//! - `process`: running commands and streaming their output
//! - `cache`: cache directory layout and per-library locking
//! - `library`: clone, configure, build, and install orchestration
//! - `protoc`: protocol-buffer binding generation

pub mod cache;
pub mod consts;
pub mod library;
pub mod process;
pub mod protoc;
pub mod util;
