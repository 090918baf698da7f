//! `SecureChat` terminal client library.
//!
//! Keeps a local view of a `SecureChat` server's message log in sync by
//! polling, renders it (decrypting encrypted bodies with the session key),
//! and submits composed messages.

pub mod api;
pub mod app;
pub mod config;
pub mod crypto;
pub mod session;
pub mod sync;
pub mod ui;
pub mod view;
