//! avatars library
//!
//! This library exposes the service internals for the binary and for
//! integration tests.

pub mod api;
pub mod app;
pub mod config;
pub mod database;
pub mod error;
pub mod services;
pub mod storage;
