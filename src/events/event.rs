//! # Pushed events.
//!
//! [`Event`] is the unit of data moving through the crate: a producer
//! hands events to a [`Group`](crate::Group), sinks encode them onto
//! the wire, and [`EventReader`](crate::EventReader) parses them back
//! on the consuming side.
//!
//! ## Field semantics
//! - `id == ""`: no id is sent on the wire.
//! - `id == " "` (single space): reserved sentinel; the rich wire
//!   variant emits a bare `id` line, resetting the client's remembered
//!   last-event-id.
//! - `kind == ""`: omitted on encode; a decoder defaults it to
//!   `"message"`.
//! - `data == ""`: a value-less marker on the rich variant, not an
//!   absent event.
//!
//! ## Example
//! ```rust
//! use eventvisor::Event;
//!
//! let ev = Event::message("price moved")
//!     .with_id("42")
//!     .with_kind("ticker");
//!
//! assert_eq!(ev.id, "42");
//! assert_eq!(ev.kind, "ticker");
//! assert_eq!(ev.data, "price moved");
//! ```

/// One unit of pushed data with optional id and type tag.
///
/// Events are immutable values; cloning is cheap enough for the
/// history sizes this crate targets (tens to low hundreds retained).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Event {
    /// Identifier used for replay after reconnects. Empty means
    /// "no id"; a single space is the reset sentinel.
    pub id: String,
    /// Event type tag. Empty means the default `"message"` type.
    pub kind: String,
    /// Payload text. May span multiple lines.
    pub data: String,
}

impl Event {
    /// Creates an event without a type or id, carrying only data.
    #[inline]
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }

    /// Attaches an identifier.
    #[inline]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Attaches a type tag.
    #[inline]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}
