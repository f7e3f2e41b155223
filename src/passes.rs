//! The individual transformation passes.
//!
//! Every pass is a method on the call-scoped [`crate::engine::Transform`]
//! context with the uniform `(&mut self, &str) -> String` shape, so the
//! gamut tables can hold plain function pointers. Passes never fail: a
//! malformed construct is left as literal text and falls through to
//! paragraph formation.

pub(crate) mod abbreviations;
pub(crate) mod blocks;
pub(crate) mod deflists;
pub(crate) mod fenced;
pub(crate) mod footnotes;
pub(crate) mod headers;
pub(crate) mod links;
pub(crate) mod spans;
pub(crate) mod tables;
