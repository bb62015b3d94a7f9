#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! alfred-emoji — look up emojis by keyword from Alfred.

pub mod cli;
pub mod commands;
pub mod emoji;
pub mod logging;
pub mod types;
pub mod workflow;
