//! WOFF 1.0 wrapping and unwrapping.

use std::io::{Read, Write};

use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use font_types::Tag;
use log::debug;
use read_fonts::{FontData, FontRef, TableProvider};
use write_fonts::FontBuilder;

use crate::error::{Error, Result};

const SIGNATURE: &[u8; 4] = b"wOFF";
const HEADER_LEN: usize = 44;
const ENTRY_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_ENTRY_LEN: usize = 16;

struct Entry {
    tag: Tag,
    checksum: u32,
    orig_len: usize,
    stored: Vec<u8>,
}

/// Recovers the sfnt stored in a WOFF file.
pub fn unwrap(data: &[u8]) -> Result<Vec<u8>> {
    if data.get(..4) != Some(SIGNATURE.as_slice()) {
        return Err(Error::MalformedWoff("bad signature"));
    }
    let woff = FontData::new(data);
    let flavor: u32 = woff.read_at(4)?;
    let num_tables: u16 = woff.read_at(12)?;

    let mut builder = FontBuilder::new();
    for i in 0..num_tables as usize {
        let entry = HEADER_LEN + i * ENTRY_LEN;
        let tag: Tag = woff.read_at(entry)?;
        let offset = woff.read_at::<u32>(entry + 4)? as usize;
        let comp_len = woff.read_at::<u32>(entry + 8)? as usize;
        let orig_len = woff.read_at::<u32>(entry + 12)? as usize;

        let stored = data
            .get(offset..offset + comp_len)
            .ok_or(Error::MalformedWoff("table data out of bounds"))?;
        let table = match comp_len.cmp(&orig_len) {
            std::cmp::Ordering::Less => inflate(stored, orig_len)?,
            std::cmp::Ordering::Equal => stored.to_vec(),
            std::cmp::Ordering::Greater => {
                return Err(Error::MalformedWoff("compressed table larger than original"));
            }
        };
        builder.add_raw(tag, table);
    }

    let mut sfnt = builder.build();
    sfnt[..4].copy_from_slice(&flavor.to_be_bytes());
    debug!("WOFF: unwrapped {num_tables} tables, {} bytes", sfnt.len());
    Ok(sfnt)
}

/// Wraps an sfnt in WOFF 1.0, zlib-compressing each table that shrinks.
pub fn wrap(sfnt: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(sfnt)?;
    let flavor = FontData::new(sfnt).read_at::<u32>(0)?;
    let (major, minor) = match font.head() {
        Ok(head) => {
            let bits = head.font_revision().to_bits();
            ((bits >> 16) as u16, (bits & 0xFFFF) as u16)
        }
        Err(_) => (1, 0),
    };

    let mut entries = Vec::new();
    for record in font.table_directory.table_records() {
        let tag = record.tag();
        let Some(table) = font.table_data(tag) else {
            continue;
        };
        let orig = table.as_bytes();
        let compressed = deflate(orig)?;
        let stored = if compressed.len() < orig.len() { compressed } else { orig.to_vec() };
        entries.push(Entry { tag, checksum: record.checksum(), orig_len: orig.len(), stored });
    }

    let total_sfnt_size = SFNT_HEADER_LEN
        + SFNT_ENTRY_LEN * entries.len()
        + entries.iter().map(|e| round4(e.orig_len)).sum::<usize>();

    let mut out = Vec::with_capacity(total_sfnt_size);
    out.extend_from_slice(SIGNATURE);
    out.extend_from_slice(&flavor.to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes()); // length, patched below
    out.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    out.extend_from_slice(&major.to_be_bytes());
    out.extend_from_slice(&minor.to_be_bytes());
    // no metadata or private block
    out.extend_from_slice(&[0u8; 20]);

    let mut offset = HEADER_LEN + ENTRY_LEN * entries.len();
    for entry in &entries {
        out.extend_from_slice(&entry.tag.to_be_bytes());
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(entry.stored.len() as u32).to_be_bytes());
        out.extend_from_slice(&(entry.orig_len as u32).to_be_bytes());
        out.extend_from_slice(&entry.checksum.to_be_bytes());
        offset += round4(entry.stored.len());
    }
    for entry in &entries {
        out.extend_from_slice(&entry.stored);
        out.resize(round4(out.len()), 0);
    }

    let length = out.len() as u32;
    out[8..12].copy_from_slice(&length.to_be_bytes());
    debug!("WOFF: {} -> {} bytes", sfnt.len(), out.len());
    Ok(out)
}

fn inflate(stored: &[u8], orig_len: usize) -> Result<Vec<u8>> {
    let mut table = Vec::with_capacity(orig_len);
    ZlibDecoder::new(stored).read_to_end(&mut table)?;
    if table.len() != orig_len {
        return Err(Error::MalformedWoff("decompressed size mismatch"));
    }
    Ok(table)
}

fn deflate(table: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(table)?;
    Ok(encoder.finish()?)
}

fn round4(len: usize) -> usize {
    (len + 3) & !3
}
