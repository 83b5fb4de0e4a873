//! `mesa-api` — HTTP surface of the order backend.

pub mod app;
pub mod context;
pub mod middleware;
