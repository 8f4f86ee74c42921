//! Per-table decoding and encoding.

pub mod cff;
pub mod cmap;
pub mod gdef;
pub mod glyf;
pub mod hmtx;
pub mod layout;
pub mod post;

use font_types::Tag;

pub const CMAP: Tag = Tag::new(b"cmap");
pub const GLYF: Tag = Tag::new(b"glyf");
pub const LOCA: Tag = Tag::new(b"loca");
pub const CFF: Tag = Tag::new(b"CFF ");
pub const HEAD: Tag = Tag::new(b"head");
pub const HHEA: Tag = Tag::new(b"hhea");
pub const HMTX: Tag = Tag::new(b"hmtx");
pub const MAXP: Tag = Tag::new(b"maxp");
pub const OS2: Tag = Tag::new(b"OS/2");
pub const POST: Tag = Tag::new(b"post");
pub const GDEF: Tag = Tag::new(b"GDEF");
pub const GSUB: Tag = Tag::new(b"GSUB");
pub const GPOS: Tag = Tag::new(b"GPOS");
