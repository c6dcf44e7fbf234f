//! Core of the skyblock island plugin.
//!
//! The interesting part lives in [`teleport`]: delayed island teleports that
//! are cancelled when the player walks away before the countdown finishes.
//! Everything the plugin needs from the game server is expressed as traits in
//! [`host`] and [`events`].

pub mod config;
pub mod events;
pub mod host;
pub mod player;
pub mod teleport;
