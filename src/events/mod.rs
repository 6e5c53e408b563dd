//! # Event values.
//!
//! This module provides [`Event`], the immutable value every other
//! component of the crate moves around: groups fan events out, sinks
//! encode them, readers decode them.

mod event;

pub use event::Event;
