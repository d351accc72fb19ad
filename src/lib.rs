//! anmkit - Library for importing `.anm` sprite animation patterns
//!
//! This library provides functionality to:
//! - Parse and write `.anm` pattern files
//! - Slice each frame out of its source image as a sprite
//! - Build one timeline per pattern and a selector state machine over them
//! - Reconcile generated artifacts into an `.asset` container, keeping ids stable

pub mod build;
pub mod cli;
pub mod config;
pub mod encoding;
pub mod fmt;
pub mod models;
pub mod parser;
pub mod reconcile;
pub mod resolve;
pub mod store;
pub mod synth;
