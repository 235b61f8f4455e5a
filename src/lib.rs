//! Muguet YouTube Library
//!
//! Cached, authenticated access to the YouTube Data and Analytics APIs:
//! OAuth account linking, a two-level TTL cache, typed channel/video/report
//! data, and resumable upload session creation.

pub mod auth;
pub mod cache;
pub mod cli;
pub mod data;
