//! Shard Frontend Library
//!
//! Validates client calls against the collection dimensions and forwards them
//! to a downstream shard worker chosen by a [`PlacementStrategy`].

pub mod config;
pub mod placement;
pub mod server;
pub mod service;

pub use placement::{PlacementStrategy, SingleShard};
pub use server::{run, serve};
pub use service::FrontendServiceImpl;
