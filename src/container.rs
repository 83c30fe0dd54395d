// src/container.rs
//! The on-disk ARCX container: a ZIP holding exactly
//! `manifest.json` and `archive.arcx`.
//!
//! Containers are read through a read-only handle and written to a temp
//! file beside the destination, then renamed into place.

use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::consts::{CIPHERTEXT_ENTRY, MANIFEST_ENTRY};
use crate::error::CoreError;
use crate::manifest::Manifest;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveContainer {
    pub manifest: Manifest,
    /// `nonce || ciphertext || tag`
    pub ciphertext: Vec<u8>,
}

impl ArchiveContainer {
    pub fn new(manifest: Manifest, ciphertext: Vec<u8>) -> Self {
        Self {
            manifest,
            ciphertext,
        }
    }

    /// Open a container file read-only; the handle is dropped before returning
    pub fn read_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader).map_err(invalid)?;

        let has = |name: &str| zip.index_for_name(name).is_some();
        if !has(MANIFEST_ENTRY) || !has(CIPHERTEXT_ENTRY) {
            return Err(CoreError::InvalidContainer(format!(
                "expected {MANIFEST_ENTRY} and {CIPHERTEXT_ENTRY}"
            )));
        }

        let manifest = Manifest::from_slice(&read_entry(&mut zip, MANIFEST_ENTRY)?)?;
        let ciphertext = read_entry(&mut zip, CIPHERTEXT_ENTRY)?;
        Ok(Self {
            manifest,
            ciphertext,
        })
    }

    /// Serialize into a new in-memory ZIP
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write atomically to `path`, replacing any previous file there
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        self.write(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| CoreError::Io(e.error))?;
        Ok(())
    }

    fn write<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(MANIFEST_ENTRY, options)
            .map_err(std::io::Error::other)?;
        zip.write_all(&self.manifest.to_vec()?)?;
        zip.start_file(CIPHERTEXT_ENTRY, options)
            .map_err(std::io::Error::other)?;
        zip.write_all(&self.ciphertext)?;

        zip.finish().map_err(std::io::Error::other)?;
        Ok(())
    }
}

fn read_entry<R: Read + Seek>(zip: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut entry = zip.by_name(name).map_err(invalid)?;
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .map_err(|e| CoreError::InvalidContainer(format!("{name}: {e}")))?;
    Ok(data)
}

fn invalid(err: ZipError) -> CoreError {
    match err {
        ZipError::Io(e) => CoreError::Io(e),
        other => CoreError::InvalidContainer(other.to_string()),
    }
}
