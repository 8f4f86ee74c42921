use std::{io, result};

use ligafont_engine::GlyphName;
use read_fonts::{ReadError, tables::postscript};
use write_fonts::BuilderError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("failed to build font: {0}")]
    Build(#[from] BuilderError),

    #[error("failed to serialize table: {0}")]
    Write(#[from] write_fonts::error::Error),

    #[error("required table '{0}' not found")]
    MissingTable(&'static str),

    /// A glyph in the glyph order has no outline or metric.
    #[error("glyph '{glyph}' has no {table} data")]
    MissingGlyphData { glyph: GlyphName, table: &'static str },

    /// A table refers to a glyph that is not in the glyph order.
    #[error("{table} refers to unknown glyph '{glyph}'")]
    UnknownGlyph { glyph: GlyphName, table: &'static str },

    #[error("font has {0} glyphs, the limit is 65535")]
    TooManyGlyphs(usize),

    #[error("{0} does not fit its format's size limits")]
    TableOverflow(&'static str),

    #[error("malformed CFF table: {0}")]
    MalformedCff(&'static str),

    #[error("failed to parse CFF data: {0}")]
    CffParse(String),

    #[error("CID-keyed CFF fonts are not supported")]
    CidKeyedCffNotSupported,

    #[error("unrecognized font container")]
    UnknownContainer,

    #[error("WOFF2 input is not supported; decompress it to TTF/OTF first")]
    Woff2Input,

    #[error("malformed WOFF file: {0}")]
    MalformedWoff(&'static str),

    #[error("WOFF2 compression failed: {0}")]
    Woff2(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<postscript::Error> for Error {
    fn from(err: postscript::Error) -> Self {
        Error::CffParse(err.to_string())
    }
}

pub type Result<T> = result::Result<T, Error>;
