//! Rule document parser
//!
//! Turns one rule document's raw text into a structured [`Rule`] plus a list
//! of diagnostics. The parser never panics and never fails fast: every
//! structural problem it can find is reported in a single pass, and a
//! best-effort `Rule` is always produced so validation can add its own
//! findings on top.

mod document;

pub use document::{parse_document, ParseOutcome};
