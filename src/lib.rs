//! A multi-dialect, SSA-based compiler-construction kernel: an IR with
//! user-extensible dialects, a generic forward dataflow (abstract
//! interpretation) driver, a fuel-limited concrete interpreter, and a
//! monotone rewrite engine, plus a handful of demonstration dialects
//! (`arith`, `func`, `cf`) wiring all of it together end to end.

pub mod analysis;
pub mod dialects;
pub mod rewrite;

mod core;
pub use self::core::*;

#[macro_use]
extern crate lazy_static;
extern crate tracing;
extern crate tracing_subscriber;
