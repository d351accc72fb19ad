//! Import pipeline module for anmkit
//!
//! Turns `.anm` sources into destination containers, one source at a time
//! or for a whole project.
//!
//! # Overview
//!
//! - **Discovery**: find `.anm` files under the configured source directory
//! - **Import**: parse, synthesize and reconcile one source into its `.asset`
//! - **Build**: import every discovered source, optionally in parallel
//!
//! # Example
//!
//! ```ignore
//! use anmkit::build::{BuildContext, BuildPipeline};
//! use anmkit::config::load_config;
//!
//! let config = load_config(None)?;
//! let context = BuildContext::new(config, project_root);
//! let result = BuildPipeline::new(context).build()?;
//! println!("{}", result.summary());
//! ```

pub mod context;
pub mod discovery;
pub mod import;
pub mod pipeline;
pub mod result;

pub use context::*;
pub use discovery::*;
pub use import::*;
pub use pipeline::*;
pub use result::*;
