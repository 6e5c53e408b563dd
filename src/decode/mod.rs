//! # Decoding: the consuming side of the protocol.
//!
//! This module provides [`EventReader`], which turns the byte stream a
//! sink produced back into discrete [`Event`](crate::Event)s, along
//! with the reconnection metadata (`last_event_id`, retry advice) a
//! client needs to resume after a dropped connection.

mod reader;

pub use reader::EventReader;
