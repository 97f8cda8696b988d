//! Shard Worker Library
//!
//! Serves one vector-index shard over gRPC (`shard.v1.ShardService`).
//!
//! - [`config`]: environment-driven configuration
//! - [`context`]: configuration and build info passed from `run()` downward
//! - [`service`]: gRPC handlers
//! - [`server`]: startup and two-phase shutdown
//! - [`sync`]: periodic persistence

pub mod config;
pub mod context;
pub mod server;
pub mod service;
pub mod sync;

pub use server::{run, serve};
