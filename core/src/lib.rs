//! Board-state engine: generation with a safe first click, flood-fill and chorded reveals, and win detection.
#![no_std]

extern crate alloc;

pub use cell::*;
pub use config::*;
pub use error::*;
pub use generator::*;
pub use grid::*;
pub use reveal::*;
pub use types::*;
pub use win::*;

mod cell;
mod config;
mod error;
mod generator;
mod grid;
mod reveal;
mod types;
mod win;
