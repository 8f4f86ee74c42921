//! hmtx decoding and compaction.

use ligafont_engine::{
    GlyphOrder,
    tables::hmtx::{HorizontalMetrics, Metric},
};
use read_fonts::{FontRef, TableProvider};
use write_fonts::tables::hmtx::{Hmtx, LongMetric};

use crate::error::{Error, Result};

pub fn read(font: &FontRef, order: &GlyphOrder) -> Result<HorizontalMetrics> {
    let hhea = font.hhea()?;
    let hmtx = font.hmtx()?;
    let num_h_metrics = hhea.number_of_h_metrics() as usize;
    let long = hmtx.h_metrics();
    let last_advance = num_h_metrics
        .checked_sub(1)
        .and_then(|idx| long.get(idx))
        .map(|m| m.advance.get())
        .unwrap_or(0);

    let mut metrics = HorizontalMetrics::default();
    for (gid, name) in order.iter() {
        let gid = gid as usize;
        let metric = match long.get(gid).filter(|_| gid < num_h_metrics) {
            Some(m) => Metric { advance: m.advance.get(), side_bearing: m.side_bearing.get() },
            None => {
                let side_bearing = gid
                    .checked_sub(num_h_metrics)
                    .and_then(|idx| hmtx.left_side_bearings().get(idx))
                    .map(|b| b.get())
                    .unwrap_or(0);
                Metric { advance: last_advance, side_bearing }
            }
        };
        metrics.metrics.insert(name.clone(), metric);
    }
    Ok(metrics)
}

/// Builds hmtx in glyph order and returns it with its number of long metrics.
///
/// A trailing run of equal advances is stored as side bearings only.
pub fn build(hmtx: &HorizontalMetrics, order: &GlyphOrder) -> Result<(Hmtx, u16)> {
    let mut metrics = Vec::with_capacity(order.len());
    for (_, name) in order.iter() {
        let metric = hmtx
            .get(name)
            .ok_or_else(|| Error::MissingGlyphData { glyph: name.clone(), table: "hmtx" })?;
        metrics.push(metric);
    }

    let mut num_long = metrics.len();
    while num_long > 1 && metrics[num_long - 1].advance == metrics[num_long - 2].advance {
        num_long -= 1;
    }

    let h_metrics = metrics[..num_long]
        .iter()
        .map(|m| LongMetric { advance: m.advance, side_bearing: m.side_bearing })
        .collect();
    let left_side_bearings = metrics[num_long..].iter().map(|m| m.side_bearing).collect();
    Ok((Hmtx { h_metrics, left_side_bearings }, num_long as u16))
}
