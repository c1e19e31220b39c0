#![cfg_attr(docsrs, feature(doc_cfg))]

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]
//! <br><br>
//!
//! ## You're probably looking for:
//! * [`Logger`](Logger)
//! * [`LoggerFactory`](LoggerFactory)
//! * [`LoggerRegistry`](LoggerRegistry)

pub mod prelude;
pub mod error;
pub mod levels;
pub mod logger;
pub mod factory;
pub mod sink;
pub mod stream;
pub mod tracing_adapter;
pub(crate) mod sync;

pub use prelude::*;
