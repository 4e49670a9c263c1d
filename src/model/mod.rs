//! Document model types for structured content representation.
//!
//! This module defines the canonical hierarchical representation produced
//! by the markdown parser and consumed by the JSON serializer and the
//! table/CSV exporter. The model is format-agnostic and immutable once a
//! conversion call has built it.

mod block;
mod document;
mod section;

pub use block::{CodeBlock, ContentBlock, ImageRef, LinkRef, ListBlock, ListItem, TableBlock};
pub use document::{DocumentMetadata, DocumentModel};
pub use section::DocumentSection;
