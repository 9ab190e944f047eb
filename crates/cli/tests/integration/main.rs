//! Integration tests that run depcache against fake `git`, `cmake`, and
//! `protoc` scripts placed first on `PATH`.

#![cfg(unix)]

mod common;
mod install_tests;
mod protoc_tests;
