//! Tournament bot built on `tell-dispatch`.

pub mod commands;
pub mod config;
pub mod console;
pub mod error;
pub mod replies;
pub mod roster;
