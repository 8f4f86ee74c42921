//! post glyph names.

use font_types::{GlyphId16, Version16Dot16};
use ligafont_engine::GlyphOrder;
use log::info;
use read_fonts::{FontData, FontRead, FontRef, TableProvider, tables::post::Post as ReadPost};
use write_fonts::tables::post::Post;

use crate::error::Result;

/// Per-glyph names from `post`, `None` where the table has none.
pub fn glyph_names(font: &FontRef, num_glyphs: u16) -> Vec<Option<String>> {
    let post = font.post().ok();
    (0..num_glyphs)
        .map(|gid| {
            post.as_ref().and_then(|p| p.glyph_name(GlyphId16::new(gid))).map(str::to_owned)
        })
        .collect()
}

/// Rewrites `post` as version 2.0 with names for the whole glyph order.
///
/// For CFF fonts the charset carries the names, so `post` is only rewritten
/// when it already was version 2.0; otherwise `None` is returned and the
/// original table is kept. TrueType fonts of any other version are upgraded
/// so the added glyphs keep their names.
pub fn build(original: &[u8], order: &GlyphOrder, is_cff: bool) -> Result<Option<Post>> {
    let post = ReadPost::read(FontData::new(original))?;
    let version = post.version();
    if version != Version16Dot16::VERSION_2_0 {
        if is_cff {
            return Ok(None);
        }
        info!("post: upgrading version {version} to 2.0 to store {} glyph names", order.len());
    }

    let glyph_names: Vec<&str> = order.iter().map(|(_, name)| name.as_str()).collect();
    let mut new_post = Post::new_v2(glyph_names);

    new_post.italic_angle = post.italic_angle();
    new_post.underline_position = post.underline_position();
    new_post.underline_thickness = post.underline_thickness();
    new_post.is_fixed_pitch = post.is_fixed_pitch();
    new_post.min_mem_type42 = post.min_mem_type42();
    new_post.max_mem_type42 = post.max_mem_type42();
    new_post.min_mem_type1 = post.min_mem_type1();
    new_post.max_mem_type1 = post.max_mem_type1();

    Ok(Some(new_post))
}

#[cfg(test)]
mod tests {
    use ligafont_engine::GlyphName;
    use pretty_assertions::assert_eq;

    use super::*;

    fn order() -> GlyphOrder {
        [".notdef", "house", "h"].into_iter().map(GlyphName::new).collect()
    }

    /// A 32-byte version 3.0 header with a 50 unit underline.
    fn version_3() -> Vec<u8> {
        let mut data = vec![0u8; 32];
        data[..4].copy_from_slice(&0x0003_0000u32.to_be_bytes());
        data[10..12].copy_from_slice(&50i16.to_be_bytes());
        data
    }

    #[test]
    fn test_truetype_version_3_gets_names() {
        let post = build(&version_3(), &order(), false).unwrap().unwrap();
        let bytes = write_fonts::dump_table(&post).unwrap();
        let read = ReadPost::read(FontData::new(&bytes)).unwrap();

        assert_eq!(read.version(), Version16Dot16::VERSION_2_0);
        assert_eq!(read.glyph_name(GlyphId16::new(2)), Some("h"));
        assert_eq!(read.underline_thickness(), font_types::FWord::new(50));
    }

    #[test]
    fn test_cff_version_3_is_kept() {
        assert!(build(&version_3(), &order(), true).unwrap().is_none());
    }
}
