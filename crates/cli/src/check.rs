//! Post-encode checks on the built sfnt.

use anyhow::{Context, Result, bail};
use ligafont_engine::LigatureMapping;
use log::debug;
use skrifa::{
    FontRef, MetadataProvider,
    instance::{LocationRef, Size},
};

/// Every trigger character must reach a glyph with zero advance.
pub fn verify_triggers(sfnt: &[u8], mapping: &LigatureMapping) -> Result<()> {
    let font = FontRef::new(sfnt).context("Encoded font does not parse")?;
    let charmap = font.charmap();
    let metrics = font.glyph_metrics(Size::unscaled(), LocationRef::default());

    for c in mapping.trigger_chars() {
        let Some(gid) = charmap.map(c) else {
            bail!("'{c}' (U+{:04X}) is not mapped in the encoded font", c as u32);
        };
        match metrics.advance_width(gid) {
            Some(advance) if advance == 0.0 => {}
            advance => bail!("placeholder for '{c}' has advance {advance:?}, expected 0"),
        }
    }
    debug!("Verified {} trigger characters", mapping.trigger_chars().len());
    Ok(())
}
