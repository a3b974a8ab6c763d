//! The [`FontHandle`] type: one in-memory font and its lifecycle.

use std::{
    collections::BTreeMap,
    fmt, fs,
    io::{Read, Write},
    path::{MAIN_SEPARATOR, Path, PathBuf},
    sync::Arc,
};

use fonthandle_font_ops::{
    build_with_sfnt_version, name_ids, name_string, rewrite_font, update_name_records,
};
use fonthandle_woff::{Flavor, FontFormat};
use log::{debug, info};
use read_fonts::{FileRef, FontRef, ReadError};
use write_fonts::FontBuilder;

use crate::{
    error::{Error, Result},
    instancing::{DefaultInstancer, Instancer},
    names::{NameKey, name_key},
};

const COLLECTION_TAG: &[u8; 4] = b"ttcf";

/// Where to load a font from.
pub enum FontSource<'a> {
    Path(&'a Path),
    Reader(&'a mut dyn Read),
    Bytes(Vec<u8>),
    /// Copy another handle's current state.
    Handle(&'a FontHandle),
}

impl<'a> From<&'a Path> for FontSource<'a> {
    fn from(path: &'a Path) -> Self {
        Self::Path(path)
    }
}

impl<'a> From<&'a PathBuf> for FontSource<'a> {
    fn from(path: &'a PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for FontSource<'_> {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

impl From<&[u8]> for FontSource<'_> {
    fn from(data: &[u8]) -> Self {
        Self::Bytes(data.to_vec())
    }
}

impl<'a> From<&'a FontHandle> for FontSource<'a> {
    fn from(handle: &'a FontHandle) -> Self {
        Self::Handle(handle)
    }
}

/// Options for [`FontHandle::save`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveOptions {
    /// Allow replacing the file the font was loaded from.
    pub overwrite: bool,
}

impl SaveOptions {
    pub fn overwrite(overwrite: bool) -> Self {
        Self { overwrite }
    }
}

/// A font loaded into memory.
///
/// The font is kept as sfnt data. WOFF and WOFF2 input is unpacked on load
/// and the container remembered as the flavor, which [`FontHandle::save`]
/// applies again. Every edit rewrites the data; clones are independent.
#[derive(Clone)]
pub struct FontHandle {
    data: Option<Vec<u8>>,
    path: Option<PathBuf>,
    flavor: Option<Flavor>,
    instancer: Arc<dyn Instancer>,
}

impl FontHandle {
    /// Load a font.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if the data is not a font
    /// - `Error::Argument` for font collections, see [`FontHandle::from_collection`]
    /// - `Error::Closed` when copying a closed handle
    pub fn open<'a>(source: impl Into<FontSource<'a>>) -> Result<Self> {
        match source.into() {
            FontSource::Path(path) => {
                let data = fs::read(path)?;
                Self::from_data(data, Some(path.to_path_buf()))
            }
            FontSource::Reader(reader) => {
                let mut data = Vec::new();
                reader.read_to_end(&mut data)?;
                Self::from_data(data, None)
            }
            FontSource::Bytes(data) => Self::from_data(data, None),
            FontSource::Handle(handle) => {
                handle.data()?;
                Ok(handle.clone())
            }
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path.as_ref())
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        Self::open(FontSource::Bytes(data.into()))
    }

    fn from_data(data: Vec<u8>, path: Option<PathBuf>) -> Result<Self> {
        if data.starts_with(COLLECTION_TAG) {
            return Err(Error::Argument(
                "font collection, use from_collection to pick a font".into(),
            ));
        }
        let (sfnt, flavor) = fonthandle_woff::to_sfnt(&data).map_err(|err| match err {
            fonthandle_woff::Error::UnknownFormat => {
                let signature = data.get(..4).map_or(0, |bytes| {
                    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
                });
                Error::Validation(ReadError::InvalidSfnt(signature))
            }
            other => Error::Woff(other),
        })?;
        FontRef::new(&sfnt).map_err(Error::Validation)?;
        debug!("loaded {} bytes, flavor {flavor:?}", sfnt.len());

        Ok(Self {
            data: Some(sfnt),
            path,
            flavor,
            instancer: Arc::new(DefaultInstancer),
        })
    }

    /// Load font `index` of a TrueType collection.
    pub fn from_collection<'a>(source: impl Into<FontSource<'a>>, index: u32) -> Result<Self> {
        let (data, path) = read_source(source.into())?;
        let font = match FileRef::new(&data).map_err(Error::Validation)? {
            FileRef::Collection(collection) => collection.get(index).map_err(Error::Validation)?,
            FileRef::Font(font) if index == 0 => font,
            FileRef::Font(_) => {
                return Err(Error::Argument(format!("index {index} out of range for a single font")));
            }
        };
        let sfnt = extract_font(&font);
        let mut handle = Self::from_data(sfnt, None)?;
        handle.path = path;
        Ok(handle)
    }

    /// Load every font of a TrueType collection.
    pub fn open_collection<'a>(source: impl Into<FontSource<'a>>) -> Result<Vec<Self>> {
        let (data, path) = read_source(source.into())?;
        let fonts: Vec<FontRef> = match FileRef::new(&data).map_err(Error::Validation)? {
            FileRef::Collection(collection) => collection
                .iter()
                .collect::<std::result::Result<_, _>>()
                .map_err(Error::Validation)?,
            FileRef::Font(font) => vec![font],
        };
        fonts
            .iter()
            .map(|font| {
                let mut handle = Self::from_data(extract_font(font), None)?;
                handle.path = path.clone();
                Ok(handle)
            })
            .collect()
    }

    /// Use another engine for [`FontHandle::to_static`] and
    /// [`FontHandle::to_sliced_variable`].
    pub fn with_instancer(mut self, instancer: impl Instancer + 'static) -> Self {
        self.instancer = Arc::new(instancer);
        self
    }

    pub(crate) fn instancer(&self) -> &dyn Instancer {
        self.instancer.as_ref()
    }

    /// The sfnt data. WOFF flavors are only applied on save.
    pub fn data(&self) -> Result<&[u8]> {
        self.data.as_deref().ok_or(Error::Closed)
    }

    pub(crate) fn font(&self) -> Result<FontRef<'_>> {
        Ok(FontRef::new(self.data()?)?)
    }

    /// Replace the font data with the result of an edit.
    pub(crate) fn replace_data(&mut self, data: Vec<u8>) -> Result<()> {
        FontRef::new(&data)?;
        self.data = Some(data);
        Ok(())
    }

    /// Copy every table, letting `f` replace some of them.
    pub(crate) fn rewrite(
        &mut self,
        f: impl FnOnce(&FontRef, &mut FontBuilder) -> Result<()>,
    ) -> Result<()> {
        let data = rewrite_font(self.data()?, f)?;
        self.replace_data(data)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Release the font data. Any later call fails with `Error::Closed`.
    pub fn close(&mut self) {
        if self.data.take().is_some() {
            debug!("closed {self}");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.data.is_none()
    }

    pub fn get_flavor(&self) -> Option<Flavor> {
        self.flavor
    }

    pub fn set_flavor(&mut self, flavor: Option<Flavor>) {
        self.flavor = flavor;
    }

    /// The file format, `ignore_flavor` reports the underlying sfnt format.
    pub fn get_format(&self, ignore_flavor: bool) -> Result<FontFormat> {
        let font = self.font()?;
        match self.flavor {
            Some(flavor) if !ignore_flavor => Ok(flavor.format()),
            _ => Ok(FontFormat::of_sfnt(&font)),
        }
    }

    pub fn has_table(&self, tag: &[u8; 4]) -> Result<bool> {
        Ok(self.font()?.table_data(read_fonts::types::Tag::new(tag)).is_some())
    }

    pub fn get_name(&self, key: impl Into<NameKey>) -> Result<Option<String>> {
        let id = key.into().resolve()?;
        Ok(name_string(&self.font()?, id))
    }

    /// The predefined names present in the font, by key.
    pub fn get_names(&self) -> Result<BTreeMap<String, String>> {
        let font = self.font()?;
        Ok(name_ids(&font)
            .into_iter()
            .filter_map(|id| {
                let key = name_key(id)?;
                Some((key.to_string(), name_string(&font, id)?))
            })
            .collect())
    }

    /// Set a name, adding a Windows English record if the font has none.
    pub fn set_name(&mut self, key: impl Into<NameKey>, value: &str) -> Result<()> {
        let id = key.into().resolve()?;
        self.update_names(BTreeMap::from([(id, Some(value.to_string()))]))
    }

    pub fn set_names<K: Into<NameKey>>(
        &mut self,
        names: impl IntoIterator<Item = (K, String)>,
    ) -> Result<()> {
        let updates = names
            .into_iter()
            .map(|(key, value)| Ok((key.into().resolve()?, Some(value))))
            .collect::<Result<BTreeMap<_, _>>>()?;
        self.update_names(updates)
    }

    /// Remove every record with the given name id.
    pub fn delete_name(&mut self, key: impl Into<NameKey>) -> Result<()> {
        let id = key.into().resolve()?;
        self.update_names(BTreeMap::from([(id, None)]))
    }

    pub(crate) fn update_names(&mut self, updates: BTreeMap<u16, Option<String>>) -> Result<()> {
        self.rewrite(|font, builder| {
            update_name_records(font, &updates)?.add_to(builder);
            Ok(())
        })
    }

    /// The font binary in its current flavor.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(fonthandle_woff::encode(self.data()?, self.flavor)?)
    }

    /// Write the font to `path`, or next to the source file.
    ///
    /// A directory, or a path without a font extension, keeps the source
    /// file name. The extension always follows the current format.
    /// Returns the path written.
    ///
    /// # Errors
    ///
    /// - `Error::Argument` if no path can be resolved, or when the target is
    ///   the source file and `options.overwrite` is not set
    pub fn save(&self, path: Option<&Path>, options: SaveOptions) -> Result<PathBuf> {
        self.save_with_flavor(self.flavor, path, options)
    }

    /// Save as WOFF, the handle's own flavor is unchanged.
    pub fn save_as_woff(&self, path: Option<&Path>, options: SaveOptions) -> Result<PathBuf> {
        self.save_with_flavor(Some(Flavor::Woff), path, options)
    }

    /// Save as WOFF2, the handle's own flavor is unchanged.
    pub fn save_as_woff2(&self, path: Option<&Path>, options: SaveOptions) -> Result<PathBuf> {
        self.save_with_flavor(Some(Flavor::Woff2), path, options)
    }

    pub fn save_to_writer(&self, writer: &mut impl Write) -> Result<()> {
        writer.write_all(&self.to_bytes()?)?;
        Ok(())
    }

    fn save_with_flavor(
        &self,
        flavor: Option<Flavor>,
        path: Option<&Path>,
        options: SaveOptions,
    ) -> Result<PathBuf> {
        let data = self.data()?;
        let format = match flavor {
            Some(flavor) => flavor.format(),
            None => FontFormat::of_sfnt(&FontRef::new(data)?),
        };
        let target = self.resolve_save_path(path, format)?;

        if !options.overwrite && self.path.as_deref() == Some(target.as_path()) {
            return Err(Error::Argument(format!(
                "refusing to overwrite the source file {}",
                target.display()
            )));
        }
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, fonthandle_woff::encode(data, flavor)?)?;
        info!("saved {format} font to {}", target.display());
        Ok(target)
    }

    fn resolve_save_path(&self, path: Option<&Path>, format: FontFormat) -> Result<PathBuf> {
        let target = path
            .or(self.path.as_deref())
            .ok_or_else(|| Error::Argument("no path to save to".into()))?;

        let is_dir = target.is_dir() || target.to_string_lossy().ends_with(MAIN_SEPARATOR);
        let has_font_extension = target
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ["otf", "ttf", "woff", "woff2"].contains(&ext.to_ascii_lowercase().as_str()));

        let (dir, stem) = if is_dir || !has_font_extension {
            let stem = self
                .path
                .as_deref()
                .and_then(Path::file_stem)
                .ok_or_else(|| Error::Argument("no file name to save to".into()))?;
            (target.to_path_buf(), stem.to_os_string())
        } else {
            let stem = target.file_stem().unwrap_or_default().to_os_string();
            (target.parent().map(Path::to_path_buf).unwrap_or_default(), stem)
        };

        let mut file_name = stem;
        file_name.push(".");
        file_name.push(format.extension());
        Ok(dir.join(file_name))
    }
}

impl fmt::Display for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Font(\"{}\")", path.display()),
            None => f.write_str("Font(None)"),
        }
    }
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("path", &self.path)
            .field("flavor", &self.flavor)
            .field("len", &self.data.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

fn read_source(source: FontSource) -> Result<(Vec<u8>, Option<PathBuf>)> {
    match source {
        FontSource::Path(path) => Ok((fs::read(path)?, Some(path.to_path_buf()))),
        FontSource::Reader(reader) => {
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            Ok((data, None))
        }
        FontSource::Bytes(data) => Ok((data, None)),
        FontSource::Handle(handle) => Ok((handle.data()?.to_vec(), handle.path.clone())),
    }
}

/// Copy one font out of a collection into standalone sfnt data.
fn extract_font(font: &FontRef) -> Vec<u8> {
    let mut builder = FontBuilder::new();
    for record in font.table_directory.table_records() {
        if let Some(data) = font.table_data(record.tag()) {
            builder.add_raw(record.tag(), data);
        }
    }
    build_with_sfnt_version(font, &mut builder)
}
