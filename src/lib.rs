//! Linkshelf: a bookmark service that de-duplicates URLs by canonical form,
//! classifies them with user-defined rules, and reads and writes Netscape
//! bookmark files.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
