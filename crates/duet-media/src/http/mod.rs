//! REST client for a hosted SFU.
//!
//! Rooms are created with `POST /rooms` and join tokens minted with
//! `POST /meeting-tokens`, authenticated with a bearer API key read from
//! the environment.

mod api;
mod client;
mod config;

pub use client::HttpMediaProvider;
pub use config::HttpMediaConfig;
