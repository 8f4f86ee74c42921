//! Turn existing glyphs of a font into OpenType ligatures.
//!
//! Given a decoded [`TableSet`] and a [`LigatureMapping`] from character
//! sequences to glyph names, [`Ligaturizer::transform`] edits the tables so
//! that typing a sequence renders its glyph:
//!
//! - every trigger character gets an empty placeholder glyph, a cmap entry,
//!   a glyph order slot, a zero-width metric and a base glyph class;
//! - cmap entries already sitting on a trigger character's code are moved
//!   into the private use area;
//! - every glyph already classified in GDEF becomes a ligature;
//! - GPOS is replaced by a minimal stub;
//! - GSUB is replaced by a single `liga` lookup, longest match first.
//!
//! The engine never reads or writes binary font data; see `ligafont-codec`
//! for decoding and encoding.
//!
//! # Example
//!
//! ```no_run
//! use ligafont_engine::{LigatureMapping, Ligaturizer, TableSet};
//!
//! # fn decode() -> TableSet { TableSet::default() }
//! let mut tables = decode();
//! let mapping: LigatureMapping =
//!     [("home", "house"), ("star", "star-filled")].into_iter().collect();
//! let report = Ligaturizer::default().transform(&mut tables, &mapping).unwrap();
//! println!("{report}");
//! ```

mod allocator;
mod error;
mod glyph_order;
mod mapping;
mod placeholder;
pub mod tables;
mod transform;
mod types;

pub use allocator::{CAPACITY, CodeAllocator, PRIVATE_USE_BASE};
pub use error::{Error, Result};
pub use font_types::Tag;
pub use glyph_order::{GlyphName, GlyphOrder, append_placeholders};
pub use mapping::LigatureMapping;
pub use placeholder::{
    OutlineKind, PlaceholderGlyph, PlaceholderOutline, insert_placeholders, make_glyph,
};
pub use tables::TableSet;
pub use transform::Ligaturizer;
pub use types::{Options, TransformReport};

/// Applies `mapping` to `tables` with default options.
pub fn ligaturize(tables: &mut TableSet, mapping: &LigatureMapping) -> Result<TransformReport> {
    Ligaturizer::default().transform(tables, mapping)
}
