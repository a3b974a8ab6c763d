//! WOFF 1.0 containers: a table directory of zlib-compressed sfnt tables.

use std::io::{Read, Write};

use flate2::{Compression, read::ZlibDecoder, write::ZlibEncoder};
use read_fonts::{FontData, FontRef, types::Tag};
use write_fonts::FontBuilder;

use crate::error::{Error, Result};

pub(crate) const SIGNATURE: u32 = 0x774F_4646;
const HEADER_LEN: usize = 44;
const ENTRY_LEN: usize = 20;
const SFNT_HEADER_LEN: usize = 12;
const SFNT_RECORD_LEN: usize = 16;

fn round4(len: usize) -> usize {
    (len + 3) & !3
}

struct Entry {
    tag: Tag,
    offset: usize,
    comp_length: usize,
    orig_length: usize,
}

/// Unpack a WOFF file into sfnt bytes.
pub(crate) fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let font_data = FontData::new(data);
    if font_data.read_at::<u32>(0)? != SIGNATURE {
        return Err(Error::InvalidWoff("bad signature".into()));
    }
    let flavor = font_data.read_at::<u32>(4)?;
    let num_tables = font_data.read_at::<u16>(12)? as usize;

    let mut entries = Vec::with_capacity(num_tables);
    for i in 0..num_tables {
        let pos = HEADER_LEN + i * ENTRY_LEN;
        entries.push(Entry {
            tag: font_data.read_at::<Tag>(pos)?,
            offset: font_data.read_at::<u32>(pos + 4)? as usize,
            comp_length: font_data.read_at::<u32>(pos + 8)? as usize,
            orig_length: font_data.read_at::<u32>(pos + 12)? as usize,
        });
    }

    let mut tables = Vec::with_capacity(num_tables);
    for entry in &entries {
        let tag = entry.tag;
        let stored = data
            .get(entry.offset..entry.offset + entry.comp_length)
            .ok_or_else(|| Error::InvalidWoff(format!("table '{tag}' out of bounds")))?;

        let table = if entry.comp_length < entry.orig_length {
            let mut table = Vec::with_capacity(entry.orig_length);
            ZlibDecoder::new(stored).read_to_end(&mut table)?;
            table
        } else if entry.comp_length == entry.orig_length {
            stored.to_vec()
        } else {
            return Err(Error::InvalidWoff(format!(
                "table '{tag}' is larger compressed than uncompressed"
            )));
        };

        if table.len() != entry.orig_length {
            return Err(Error::InvalidWoff(format!(
                "table '{tag}' decompressed to {} bytes, expected {}",
                table.len(),
                entry.orig_length
            )));
        }
        tables.push((tag, table));
    }

    let mut builder = FontBuilder::new();
    for (tag, table) in tables {
        builder.add_raw(tag, table);
    }
    let mut sfnt = builder.build();
    sfnt[..4].copy_from_slice(&flavor.to_be_bytes());
    Ok(sfnt)
}

/// Pack sfnt bytes into a WOFF file.
///
/// Each table is zlib compressed and stored compressed only when that
/// saves space.
pub(crate) fn encode(sfnt: &[u8]) -> Result<Vec<u8>> {
    let font = FontRef::new(sfnt)?;
    let mut records: Vec<_> = font.table_directory.table_records().iter().collect();
    records.sort_by_key(|record| record.tag());

    let num_tables = records.len();
    let mut directory = Vec::with_capacity(num_tables * ENTRY_LEN);
    let mut body = Vec::new();
    let mut total_sfnt_size = SFNT_HEADER_LEN + num_tables * SFNT_RECORD_LEN;
    let data_start = HEADER_LEN + num_tables * ENTRY_LEN;

    for record in records {
        let tag = record.tag();
        let table = font
            .table_data(tag)
            .ok_or_else(|| Error::InvalidWoff(format!("table '{tag}' out of bounds")))?;
        let table = table.as_bytes();

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(table)?;
        let compressed = encoder.finish()?;
        let stored = if compressed.len() < table.len() { &compressed[..] } else { table };

        directory.extend_from_slice(&tag.to_be_bytes());
        directory.extend_from_slice(&((data_start + body.len()) as u32).to_be_bytes());
        directory.extend_from_slice(&(stored.len() as u32).to_be_bytes());
        directory.extend_from_slice(&(table.len() as u32).to_be_bytes());
        directory.extend_from_slice(&record.checksum().to_be_bytes());

        body.extend_from_slice(stored);
        body.resize(round4(body.len()), 0);
        total_sfnt_size += round4(table.len());
    }

    let length = data_start + body.len();
    let mut woff = Vec::with_capacity(length);
    woff.extend_from_slice(&SIGNATURE.to_be_bytes());
    woff.extend_from_slice(&font.table_directory.sfnt_version().to_be_bytes());
    woff.extend_from_slice(&(length as u32).to_be_bytes());
    woff.extend_from_slice(&(num_tables as u16).to_be_bytes());
    woff.extend_from_slice(&0u16.to_be_bytes());
    woff.extend_from_slice(&(total_sfnt_size as u32).to_be_bytes());
    // version 1.0
    woff.extend_from_slice(&1u16.to_be_bytes());
    woff.extend_from_slice(&0u16.to_be_bytes());
    // no metadata or private block
    woff.extend_from_slice(&[0u8; 20]);
    woff.extend_from_slice(&directory);
    woff.extend_from_slice(&body);
    Ok(woff)
}
