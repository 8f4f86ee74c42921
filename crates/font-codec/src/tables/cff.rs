//! CFF (version 1) glyph names, charstrings and rebuilding.
//!
//! Reading goes through the `read-fonts` PostScript parsers. Rebuilding keeps
//! the Name INDEX, Global Subrs and Local Subrs byte for byte, appends new
//! glyph names to the String INDEX, and writes a fresh format 0 charset,
//! CharStrings INDEX and Private DICT. Top DICT entries other than the offsets
//! are copied as they were encoded.
//!
//! CID-keyed fonts are rejected.

use std::{collections::HashMap, ops::Range};

use font_types::GlyphId;
use ligafont_engine::{
    GlyphName, GlyphOrder,
    tables::outlines::{CharString, CharStrings},
};
use log::debug;
use read_fonts::{
    FontData, ReadError,
    tables::postscript::{Charset, Index, StringId, dict},
};

use crate::{
    error::{Error, Result},
    names,
};

const CHARSET: u16 = 15;
const ENCODING: u16 = 16;
const CHARSTRINGS: u16 = 17;
const PRIVATE: u16 = 18;
const SUBRS: u16 = 19;
/// Two-byte operators are stored as `1200 + second byte`.
const ESCAPE: u8 = 12;

/// Offset-valued Top DICT entries, each written as a 5-byte integer.
const TOP_DICT_OFFSETS_LEN: usize = (5 + 1) + (5 + 1) + (5 + 5 + 1);

/// Glyph names from the charset, in glyph id order.
pub fn glyph_names(data: &[u8]) -> Result<Vec<Option<String>>> {
    let cff = SourceCff::parse(data)?;
    let num_glyphs = cff.charstrings.count();
    let charset = Charset::new(FontData::new(data), cff.charset_offset, num_glyphs)?;
    (0..num_glyphs)
        .map(|gid| Ok(cff.string(charset.string_id(GlyphId::new(gid))?)))
        .collect()
}

pub fn charstrings(data: &[u8], order: &GlyphOrder) -> Result<CharStrings> {
    let cff = SourceCff::parse(data)?;
    let mut charstrings = CharStrings::default();
    for (gid, name) in order.iter() {
        let program = cff.charstrings.get(gid as usize)?;
        charstrings.glyphs.insert(name.clone(), CharString(program.to_vec()));
    }
    Ok(charstrings)
}

/// Rebuilds `original` with the charstrings and charset of `order`.
pub fn rebuild(original: &[u8], order: &GlyphOrder, charstrings: &CharStrings) -> Result<Vec<u8>> {
    let cff = SourceCff::parse(original)?;

    let mut strings = StringTable::new(&cff.strings)?;
    let mut charset = vec![0u8];
    for (_, name) in order.iter().skip(1) {
        charset.extend_from_slice(&strings.sid(name)?.to_be_bytes());
    }

    let mut programs = Vec::with_capacity(order.len());
    for (_, name) in order.iter() {
        let program = charstrings
            .glyphs
            .get(name)
            .ok_or_else(|| Error::MissingGlyphData { glyph: name.clone(), table: "CFF " })?;
        programs.push(program.0.as_slice());
    }

    let top_dict = parse_dict(cff.top_dict)?
        .into_iter()
        .filter(|op| match op.operator {
            CHARSET | CHARSTRINGS | PRIVATE => false,
            ENCODING if cff.encoding > 1 => {
                debug!("CFF: dropping custom encoding at offset {}", cff.encoding);
                false
            }
            _ => true,
        })
        .collect();
    let private_dict = parse_dict(cff.private_dict()?)?
        .into_iter()
        .filter(|op| op.operator != SUBRS)
        .collect();

    debug!(
        "CFF: rebuilding with {} glyphs and {} strings ({} added)",
        order.len(),
        strings.strings.len(),
        strings.added
    );

    FontParts {
        header: cff.header,
        names: cff.names,
        top_dict,
        strings: strings.strings,
        global_subrs: cff.global_subrs,
        charset,
        charstrings: programs,
        private_dict,
        local_subrs: cff.local_subrs,
    }
    .assemble()
}

/// A parsed single-font CFF table.
struct SourceCff<'a> {
    data: &'a [u8],
    header: &'a [u8],
    names: &'a [u8],
    top_dict: &'a [u8],
    strings: Index<'a>,
    global_subrs: &'a [u8],
    charset_offset: usize,
    encoding: usize,
    charstrings: Index<'a>,
    private: Range<usize>,
    local_subrs: Option<&'a [u8]>,
}

impl<'a> SourceCff<'a> {
    fn parse(data: &'a [u8]) -> Result<Self> {
        let header_size = *data.get(2).ok_or(Error::MalformedCff("truncated header"))? as usize;
        let header = data.get(..header_size).ok_or(Error::MalformedCff("truncated header"))?;

        let (names, name_index, pos) = index_at(data, header_size)?;
        if name_index.count() != 1 {
            return Err(Error::MalformedCff("expected exactly one font in the font set"));
        }
        let (_, top_dicts, pos) = index_at(data, pos)?;
        let top_dict = top_dicts.get(0)?;
        let (_, strings, pos) = index_at(data, pos)?;
        let (global_subrs, _, _) = index_at(data, pos)?;

        let mut charset_offset = 0;
        let mut encoding = 0;
        let mut charstrings_offset = None;
        let mut private = None;
        for entry in dict::entries(top_dict, None) {
            match entry? {
                dict::Entry::Charset(offset) => charset_offset = offset,
                dict::Entry::Encoding(offset) => encoding = offset,
                dict::Entry::CharstringsOffset(offset) => charstrings_offset = Some(offset),
                dict::Entry::PrivateDictRange(range) => private = Some(range),
                dict::Entry::Ros { .. }
                | dict::Entry::FdArrayOffset(_)
                | dict::Entry::FdSelectOffset(_) => return Err(Error::CidKeyedCffNotSupported),
                _ => {}
            }
        }
        let charstrings_offset =
            charstrings_offset.ok_or(Error::MalformedCff("missing CharStrings offset"))?;
        let (_, charstrings, _) = index_at(data, charstrings_offset)?;
        let private = private.ok_or(Error::MalformedCff("missing Private DICT"))?;

        let mut cff = Self {
            data,
            header,
            names,
            top_dict,
            strings,
            global_subrs,
            charset_offset,
            encoding,
            charstrings,
            private,
            local_subrs: None,
        };
        for entry in dict::entries(cff.private_dict()?, None) {
            if let dict::Entry::SubrsOffset(offset) = entry? {
                let (subrs, _, _) = index_at(data, cff.private.start + offset)?;
                cff.local_subrs = Some(subrs);
            }
        }
        Ok(cff)
    }

    fn private_dict(&self) -> Result<&'a [u8]> {
        Ok(self.data.get(self.private.clone()).ok_or(ReadError::OutOfBounds)?)
    }

    fn string(&self, sid: StringId) -> Option<String> {
        match sid.standard_string() {
            Ok(name) => Some(name.chars().collect()),
            Err(idx) => self.strings.get(idx).ok().map(names::decode_bytes),
        }
    }
}

/// Returns the raw bytes of the INDEX at `pos`, the parsed INDEX, and the
/// position following it.
fn index_at(data: &[u8], pos: usize) -> Result<(&[u8], Index<'_>, usize)> {
    let rest = data.get(pos..).ok_or(ReadError::OutOfBounds)?;
    let index = Index::new(rest, false)?;
    let len = index.size_in_bytes()?;
    let raw = rest.get(..len).ok_or(ReadError::OutOfBounds)?;
    Ok((raw, index, pos + len))
}

/// String INDEX contents plus a reverse lookup over standard and custom
/// strings.
struct StringTable {
    strings: Vec<Vec<u8>>,
    ids: HashMap<Vec<u8>, u16>,
    standard_count: usize,
    added: usize,
}

impl StringTable {
    fn new(index: &Index) -> Result<Self> {
        let mut ids = HashMap::new();
        let mut standard_count = 0;
        while let Ok(name) = StringId::new(standard_count as u16).standard_string() {
            ids.insert(name.chars().map(|c| c as u8).collect(), standard_count as u16);
            standard_count += 1;
        }

        let mut strings = Vec::with_capacity(index.count() as usize);
        for idx in 0..index.count() as usize {
            let string = index.get(idx)?.to_vec();
            let sid = u16::try_from(standard_count + idx)
                .map_err(|_| Error::TableOverflow("CFF "))?;
            ids.entry(string.clone()).or_insert(sid);
            strings.push(string);
        }
        Ok(Self { strings, ids, standard_count, added: 0 })
    }

    /// The string id for `name`, appending it to the String INDEX if needed.
    fn sid(&mut self, name: &GlyphName) -> Result<u16> {
        let bytes = name.as_bytes();
        if let Some(&sid) = self.ids.get(bytes) {
            return Ok(sid);
        }
        let sid = u16::try_from(self.standard_count + self.strings.len())
            .map_err(|_| Error::TableOverflow("CFF "))?;
        self.strings.push(bytes.to_vec());
        self.ids.insert(bytes.to_vec(), sid);
        self.added += 1;
        Ok(sid)
    }
}

/// One DICT entry: the operator and its operands as originally encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DictOp<'a> {
    operator: u16,
    operands: &'a [u8],
}

impl DictOp<'_> {
    fn encoded_len(&self) -> usize {
        self.operands.len() + if self.operator >= 1200 { 2 } else { 1 }
    }

    fn write_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.operands);
        push_operator(out, self.operator);
    }
}

fn parse_dict(data: &[u8]) -> Result<Vec<DictOp<'_>>> {
    let mut ops = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < data.len() {
        match data[pos] {
            ESCAPE => {
                let second = *data.get(pos + 1).ok_or(Error::MalformedCff("truncated DICT"))?;
                ops.push(DictOp { operator: 1200 + second as u16, operands: &data[start..pos] });
                pos += 2;
                start = pos;
            }
            b0 @ 0..=21 => {
                ops.push(DictOp { operator: b0 as u16, operands: &data[start..pos] });
                pos += 1;
                start = pos;
            }
            28 => pos += 3,
            29 => pos += 5,
            30 => {
                pos += 1;
                loop {
                    let nibbles = *data.get(pos).ok_or(Error::MalformedCff("truncated DICT"))?;
                    pos += 1;
                    if nibbles & 0x0f == 0x0f || nibbles & 0xf0 == 0xf0 {
                        break;
                    }
                }
            }
            32..=246 => pos += 1,
            247..=254 => pos += 2,
            _ => return Err(Error::MalformedCff("reserved byte in DICT")),
        }
    }
    if start < data.len() {
        return Err(Error::MalformedCff("DICT operands without an operator"));
    }
    Ok(ops)
}

fn push_operator(out: &mut Vec<u8>, operator: u16) {
    if operator >= 1200 {
        out.extend_from_slice(&[ESCAPE, (operator - 1200) as u8]);
    } else {
        out.push(operator as u8);
    }
}

/// Pushes `value` as a 5-byte DICT integer.
fn push_offset(out: &mut Vec<u8>, value: usize) -> Result<()> {
    let value = i32::try_from(value).map_err(|_| Error::TableOverflow("CFF "))?;
    out.push(29);
    out.extend_from_slice(&value.to_be_bytes());
    Ok(())
}

fn offset_size(max_offset: usize) -> u8 {
    match max_offset {
        0..=0xFF => 1,
        0x100..=0xFFFF => 2,
        0x1_0000..=0xFF_FFFF => 3,
        _ => 4,
    }
}

fn index_len(item_lens: &[usize]) -> usize {
    if item_lens.is_empty() {
        return 2;
    }
    let data_len: usize = item_lens.iter().sum();
    let off_size = offset_size(data_len + 1) as usize;
    2 + 1 + (item_lens.len() + 1) * off_size + data_len
}

fn write_index<T: AsRef<[u8]>>(items: &[T]) -> Result<Vec<u8>> {
    let count = u16::try_from(items.len()).map_err(|_| Error::TableOverflow("CFF "))?;
    let mut out = Vec::new();
    out.extend_from_slice(&count.to_be_bytes());
    if items.is_empty() {
        return Ok(out);
    }

    let data_len: usize = items.iter().map(|item| item.as_ref().len()).sum();
    if data_len + 1 > u32::MAX as usize {
        return Err(Error::TableOverflow("CFF "));
    }
    let off_size = offset_size(data_len + 1);
    out.push(off_size);
    let mut offset = 1usize;
    let push = |out: &mut Vec<u8>, offset: usize| {
        let bytes = (offset as u32).to_be_bytes();
        out.extend_from_slice(&bytes[4 - off_size as usize..]);
    };
    push(&mut out, offset);
    for item in items {
        offset += item.as_ref().len();
        push(&mut out, offset);
    }
    for item in items {
        out.extend_from_slice(item.as_ref());
    }
    Ok(out)
}

/// The pieces of a CFF table in output order.
struct FontParts<'a> {
    header: &'a [u8],
    names: &'a [u8],
    /// Top DICT entries without charset, CharStrings and Private.
    top_dict: Vec<DictOp<'a>>,
    strings: Vec<Vec<u8>>,
    global_subrs: &'a [u8],
    charset: Vec<u8>,
    charstrings: Vec<&'a [u8]>,
    /// Private DICT entries without Subrs.
    private_dict: Vec<DictOp<'a>>,
    local_subrs: Option<&'a [u8]>,
}

impl FontParts<'_> {
    fn assemble(&self) -> Result<Vec<u8>> {
        let top_dict_len =
            self.top_dict.iter().map(DictOp::encoded_len).sum::<usize>() + TOP_DICT_OFFSETS_LEN;
        let strings = write_index(&self.strings)?;
        let charstrings = write_index(&self.charstrings)?;

        let charset_offset = self.header.len()
            + self.names.len()
            + index_len(&[top_dict_len])
            + strings.len()
            + self.global_subrs.len();
        let charstrings_offset = charset_offset + self.charset.len();
        let private_offset = charstrings_offset + charstrings.len();

        let mut private_dict = Vec::new();
        for op in &self.private_dict {
            op.write_into(&mut private_dict);
        }
        if self.local_subrs.is_some() {
            // Local Subrs follow the Private DICT directly.
            let private_len = private_dict.len() + 5 + 1;
            push_offset(&mut private_dict, private_len)?;
            push_operator(&mut private_dict, SUBRS);
        }

        let mut top_dict = Vec::with_capacity(top_dict_len);
        for op in &self.top_dict {
            op.write_into(&mut top_dict);
        }
        push_offset(&mut top_dict, charset_offset)?;
        push_operator(&mut top_dict, CHARSET);
        push_offset(&mut top_dict, charstrings_offset)?;
        push_operator(&mut top_dict, CHARSTRINGS);
        push_offset(&mut top_dict, private_dict.len())?;
        push_offset(&mut top_dict, private_offset)?;
        push_operator(&mut top_dict, PRIVATE);

        let mut out = Vec::with_capacity(private_offset + private_dict.len());
        out.extend_from_slice(self.header);
        out.extend_from_slice(self.names);
        out.extend_from_slice(&write_index(&[top_dict])?);
        out.extend_from_slice(&strings);
        out.extend_from_slice(self.global_subrs);
        out.extend_from_slice(&self.charset);
        out.extend_from_slice(&charstrings);
        out.extend_from_slice(&private_dict);
        if let Some(subrs) = self.local_subrs {
            out.extend_from_slice(subrs);
        }
        Ok(out)
    }
}
