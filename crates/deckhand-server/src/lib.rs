//! HTTP surface for the card dealer.
//!
//! Stateless draws, shared games, and the static frontend, served with axum.

pub mod api;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
