use log::debug;
use ttf2woff2::BrotliQuality;

use crate::error::{Error, Result};

/// Compresses an sfnt into WOFF2.
pub fn compress(sfnt: &[u8]) -> Result<Vec<u8>> {
    let woff2 = ttf2woff2::encode(sfnt, BrotliQuality::default())
        .map_err(|e| Error::Woff2(e.to_string()))?;
    debug!("WOFF2: {} -> {} bytes", sfnt.len(), woff2.len());
    Ok(woff2)
}
