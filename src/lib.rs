//! Aggregation and ranking layer for an anime recommendation service.
//!
//! Sits between a presentation layer and an upstream recommendation backend:
//! normalizes the backend's heterogeneous candidate records into canonical
//! `{ name, correlation }` items, filters out titles the user has already
//! seen, ranks by similarity, and serves the result over HTTP. Also provides
//! the debounced incremental title search that drives the seen-title picker.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
