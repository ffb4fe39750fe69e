//! Pure decoders for upstream payloads.
//!
//! Nothing in here performs I/O; the client hands over response bodies and
//! gets typed values back.

pub mod name_page;
pub mod quote_summary;
