//! Generic font table manipulation utilities.
//!
//! Every helper works on raw sfnt bytes: the source is parsed with
//! `read-fonts`, untouched tables are copied verbatim and the replaced ones
//! are serialized with `write-fonts`.

mod error;

use std::collections::BTreeMap;

pub use error::{Error, Result};
use read_fonts::{
    FontRef, ReadError, TableProvider,
    tables::name::{Encoding, MacRomanMapping},
};
use write_fonts::{FontBuilder, types::Tag};

/// Windows platform, Unicode BMP encoding, US English.
///
/// Records added for name ids that don't exist yet use this triple.
pub const WINDOWS_ENGLISH: (u16, u16, u16) = (3, 1, 0x409);

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MAC: u16 = 1;
const PLATFORM_WINDOWS: u16 = 3;

/// Rewrite font data by applying a transformation function.
///
/// Copies all tables from the source font, then calls `f` to modify or add tables.
/// The function receives a reference to the source font and a mutable builder
/// that already contains all original tables.
pub fn rewrite_font<E>(
    data: &[u8],
    f: impl FnOnce(&FontRef, &mut FontBuilder) -> std::result::Result<(), E>,
) -> std::result::Result<Vec<u8>, E>
where
    E: From<ReadError>,
{
    let font = FontRef::new(data)?;
    let mut builder = FontBuilder::new();

    for record in font.table_directory.table_records() {
        let tag = record.tag();
        if let Some(table_data) = font.table_data(tag) {
            builder.add_raw(tag, table_data);
        }
    }

    f(&font, &mut builder)?;
    Ok(build_with_sfnt_version(&font, &mut builder))
}

/// Build the font keeping the source's sfnt version.
///
/// `FontBuilder` always writes the TrueType version, which would turn
/// `OTTO` fonts into `.ttf` files.
pub fn build_with_sfnt_version(source: &FontRef, builder: &mut FontBuilder) -> Vec<u8> {
    let mut data = builder.build();
    let version = source.table_directory.sfnt_version().to_be_bytes();
    if data.len() >= 4 {
        data[..4].copy_from_slice(&version);
    }
    data
}

/// A `name` table held as encoded strings.
///
/// `write-fonts` can only encode Unicode and Mac Roman records, so this
/// writes the table itself. Records in any other encoding are carried over
/// byte for byte.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameTable {
    records: Vec<EncodedName>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct EncodedName {
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    name_id: u16,
    bytes: Vec<u8>,
}

impl EncodedName {
    fn sort_key(&self) -> (u16, u16, u16, u16) {
        (self.platform_id, self.encoding_id, self.language_id, self.name_id)
    }
}

impl NameTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serialize as a version 0 table.
    ///
    /// Identical strings share storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        let count = self.records.len() as u16;
        let mut out = Vec::with_capacity(6 + 12 * self.records.len());
        out.extend(0u16.to_be_bytes());
        out.extend(count.to_be_bytes());
        out.extend((6 + 12 * count).to_be_bytes());

        let mut storage: Vec<u8> = Vec::new();
        let mut offsets: BTreeMap<&[u8], u16> = BTreeMap::new();
        for record in &self.records {
            let offset = *offsets.entry(record.bytes.as_slice()).or_insert_with(|| {
                let offset = storage.len() as u16;
                storage.extend(&record.bytes);
                offset
            });
            for field in [
                record.platform_id,
                record.encoding_id,
                record.language_id,
                record.name_id,
                record.bytes.len() as u16,
                offset,
            ] {
                out.extend(field.to_be_bytes());
            }
        }
        out.extend(storage);
        out
    }

    /// Replace the font's `name` table with this one.
    pub fn add_to(&self, builder: &mut FontBuilder) {
        builder.add_raw(Tag::new(b"name"), self.to_bytes());
    }
}

/// Encode `value` for a platform/encoding pair, if it is one we can write.
fn encode_name(platform_id: u16, encoding_id: u16, value: &str) -> Option<Vec<u8>> {
    match Encoding::new(platform_id, encoding_id) {
        Encoding::Utf16Be => Some(value.encode_utf16().flat_map(u16::to_be_bytes).collect()),
        Encoding::MacRoman => {
            Some(value.chars().map(|c| MacRomanMapping.encode(c).unwrap_or(b'?')).collect())
        }
        Encoding::Unknown => None,
    }
}

/// Apply a batch of name updates.
///
/// For every `(id, value)` pair:
/// - `Some(value)` replaces the string of all existing records with that id,
///   or appends a [`WINDOWS_ENGLISH`] record if the font has none;
/// - `None` removes every record with that id.
///
/// Records without an update keep their original bytes, whatever their
/// encoding. A record in an encoding we can't write is dropped when its id
/// gets a new value. Fonts without a name table get a fresh one.
pub fn update_name_records(
    font: &FontRef,
    updates: &BTreeMap<u16, Option<String>>,
) -> std::result::Result<NameTable, ReadError> {
    let mut records = Vec::new();
    let mut present: Vec<u16> = Vec::new();

    if let Ok(name) = font.name() {
        let storage = name.string_data();
        for record in name.name_record() {
            let (platform_id, encoding_id) = (record.platform_id(), record.encoding_id());
            let name_id = record.name_id().to_u16();
            let bytes = match updates.get(&name_id) {
                Some(None) => continue,
                Some(Some(value)) => match encode_name(platform_id, encoding_id, value) {
                    Some(bytes) => bytes,
                    None => continue,
                },
                None => {
                    let start = record.string_offset().to_u32() as usize;
                    let end = start + record.length() as usize;
                    storage.as_bytes().get(start..end).ok_or(ReadError::OutOfBounds)?.to_vec()
                }
            };
            present.push(name_id);
            records.push(EncodedName {
                platform_id,
                encoding_id,
                language_id: record.language_id(),
                name_id,
                bytes,
            });
        }
    }

    let (platform_id, encoding_id, language_id) = WINDOWS_ENGLISH;
    for (name_id, value) in updates {
        if let Some(value) = value
            && !present.contains(name_id)
        {
            records.push(EncodedName {
                platform_id,
                encoding_id,
                language_id,
                name_id: *name_id,
                bytes: value.encode_utf16().flat_map(u16::to_be_bytes).collect(),
            });
        }
    }

    records.sort_by_key(EncodedName::sort_key);
    Ok(NameTable { records })
}

/// Read the best available string for a name id.
///
/// Preference order: Windows English, any Windows record, Unicode platform,
/// Macintosh, then whatever decodes first.
pub fn name_string(font: &FontRef, name_id: u16) -> Option<String> {
    let name = font.name().ok()?;
    let mut best: Option<(u8, String)> = None;

    for record in name.name_record() {
        if record.name_id().to_u16() != name_id {
            continue;
        }
        let Ok(string) = record.string(name.string_data()) else {
            continue;
        };
        let rank = match (record.platform_id(), record.language_id()) {
            (PLATFORM_WINDOWS, 0x409) => 0,
            (PLATFORM_WINDOWS, _) => 1,
            (PLATFORM_UNICODE, _) => 2,
            (PLATFORM_MAC, 0) => 3,
            _ => 4,
        };
        if best.as_ref().is_none_or(|(current, _)| rank < *current) {
            best = Some((rank, string.chars().collect()));
        }
    }

    best.map(|(_, string)| string)
}

/// Ids of all name records, deduplicated and sorted.
pub fn name_ids(font: &FontRef) -> Vec<u16> {
    let Ok(name) = font.name() else {
        return Vec::new();
    };
    let mut ids: Vec<u16> = name.name_record().iter().map(|r| r.name_id().to_u16()).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use write_fonts::{
        tables::{
            maxp::Maxp,
            name::{Name, NameRecord},
        },
        types::NameId,
    };

    fn font_with_names(records: &[(u16, &str)]) -> Vec<u8> {
        let (platform, encoding, language) = WINDOWS_ENGLISH;
        let records = records
            .iter()
            .map(|(id, s)| {
                NameRecord::new(platform, encoding, language, NameId::new(*id), s.to_string().into())
            })
            .collect();
        let mut builder = FontBuilder::new();
        builder.add_table(&Name::new(records)).unwrap();
        builder.add_table(&Maxp { num_glyphs: 1, ..Default::default() }).unwrap();
        builder.build()
    }

    #[test]
    fn test_name_string() {
        let data = font_with_names(&[(1, "Family"), (2, "Bold")]);
        let font = FontRef::new(&data).unwrap();
        assert_eq!(name_string(&font, 1).as_deref(), Some("Family"));
        assert_eq!(name_string(&font, 2).as_deref(), Some("Bold"));
        assert_eq!(name_string(&font, 3), None);
    }

    #[test]
    fn test_update_replaces_adds_and_removes() {
        let data = font_with_names(&[(1, "Family"), (2, "Bold"), (5, "Version 1.0")]);
        let updates = BTreeMap::from([
            (1, Some("New Family".to_string())),
            (5, None),
            (16, Some("Typo".to_string())),
        ]);

        let new_data = rewrite_font(&data, |font, builder| {
            update_name_records(font, &updates)?.add_to(builder);
            Ok::<_, Error>(())
        })
        .unwrap();

        let font = FontRef::new(&new_data).unwrap();
        assert_eq!(name_string(&font, 1).as_deref(), Some("New Family"));
        assert_eq!(name_string(&font, 2).as_deref(), Some("Bold"));
        assert_eq!(name_string(&font, 5), None);
        assert_eq!(name_string(&font, 16).as_deref(), Some("Typo"));
        assert_eq!(name_ids(&font), vec![1, 2, 16]);
    }

    #[test]
    fn test_rewrite_replaces_table() {
        let data = font_with_names(&[(1, "Family")]);
        let new_data = rewrite_font(&data, |_, builder| {
            builder.add_table(&Maxp { num_glyphs: 3, ..Default::default() })?;
            Ok::<_, Error>(())
        })
        .unwrap();
        let font = FontRef::new(&new_data).unwrap();
        assert_eq!(font.maxp().unwrap().num_glyphs(), 3);
        assert_eq!(name_string(&font, 1).as_deref(), Some("Family"));
    }

    #[test]
    fn test_keeps_cff_sfnt_version() {
        let mut data = font_with_names(&[(1, "Family")]);
        data[..4].copy_from_slice(b"OTTO");
        let new_data = rewrite_font(&data, |_, _| Ok::<_, Error>(())).unwrap();
        assert_eq!(&new_data[..4], b"OTTO");
    }

    /// A name table with one Windows record and one Mac Japanese record,
    /// written by hand since `write-fonts` can't encode the latter.
    fn font_with_mac_japanese_name() -> Vec<u8> {
        let table = NameTable {
            records: vec![
                EncodedName {
                    platform_id: 1,
                    encoding_id: 1,
                    language_id: 11,
                    name_id: 1,
                    bytes: vec![0x83, 0x74, 0x83, 0x48],
                },
                EncodedName {
                    platform_id: 3,
                    encoding_id: 1,
                    language_id: 0x409,
                    name_id: 1,
                    bytes: "Family".encode_utf16().flat_map(u16::to_be_bytes).collect(),
                },
            ],
        };
        let mut builder = FontBuilder::new();
        table.add_to(&mut builder);
        builder.add_table(&Maxp { num_glyphs: 1, ..Default::default() }).unwrap();
        builder.build()
    }

    fn raw_record(font: &FontRef, platform_id: u16, name_id: u16) -> Option<Vec<u8>> {
        let name = font.name().ok()?;
        let record = name
            .name_record()
            .iter()
            .find(|r| r.platform_id() == platform_id && r.name_id().to_u16() == name_id)?;
        let start = record.string_offset().to_u32() as usize;
        let end = start + record.length() as usize;
        Some(name.string_data().as_bytes()[start..end].to_vec())
    }

    #[test]
    fn test_unknown_encoding_survives_other_updates() {
        let data = font_with_mac_japanese_name();
        let updates = BTreeMap::from([(2, Some("Bold".to_string()))]);
        let new_data = rewrite_font(&data, |font, builder| {
            update_name_records(font, &updates)?.add_to(builder);
            Ok::<_, Error>(())
        })
        .unwrap();

        let font = FontRef::new(&new_data).unwrap();
        assert_eq!(raw_record(&font, 1, 1), Some(vec![0x83, 0x74, 0x83, 0x48]));
        assert_eq!(name_string(&font, 1).as_deref(), Some("Family"));
        assert_eq!(name_string(&font, 2).as_deref(), Some("Bold"));
        assert_eq!(font.name().unwrap().name_record().len(), 3);
    }

    #[test]
    fn test_unknown_encoding_dropped_when_its_id_changes() {
        let data = font_with_mac_japanese_name();
        let font = FontRef::new(&data).unwrap();
        let updates = BTreeMap::from([(1, Some("Renamed".to_string()))]);
        let table = update_name_records(&font, &updates).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].platform_id, 3);
    }

    #[test]
    fn test_encode_name_by_platform() {
        assert_eq!(encode_name(1, 0, "Café"), Some(vec![b'C', b'a', b'f', 0x8E]));
        assert_eq!(encode_name(3, 1, "Hi"), Some(vec![0, b'H', 0, b'i']));
        assert_eq!(encode_name(1, 1, "Café"), None);
    }

    #[test]
    fn test_identical_strings_share_storage() {
        let utf16: Vec<u8> = "Same".encode_utf16().flat_map(u16::to_be_bytes).collect();
        let table = NameTable {
            records: [1, 4]
                .into_iter()
                .map(|name_id| EncodedName {
                    platform_id: 3,
                    encoding_id: 1,
                    language_id: 0x409,
                    name_id,
                    bytes: utf16.clone(),
                })
                .collect(),
        };
        let bytes = table.to_bytes();
        assert_eq!(bytes.len(), 6 + 12 * 2 + utf16.len());
        assert_eq!(&bytes[4..6], &30u16.to_be_bytes());
    }
}
