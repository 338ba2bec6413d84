//! # Archive Reader
//!
//! Opens an input archive, transparently decompresses it, and enumerates its
//! members into a snapshot of [`EntryDescriptor`]s. Regular-file content is
//! fingerprinted as each entry is visited and spooled so the output assembler
//! can re-read it later.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::entry::{ContentHandle, EntryDescriptor, EntryKind};
use crate::fingerprint;
use crate::DiffError;

/// A snapshot: the full ordered list of entries read from one archive.
pub type Snapshot = Vec<EntryDescriptor>;

/// Opens `path` and wraps it in the right decoder based on its leading magic
/// bytes. Plain tar needs no wrapping; gzip, xz and zstd are recognized.
fn open_input(path: &Path) -> Result<Box<dyn Read>, DiffError> {
    let mut file = File::open(path).map_err(|e| DiffError::Archive {
        msg: e.to_string(),
        path: path.to_path_buf(),
    })?;

    // Peek first bytes to flag the compression scheme, then rewind.
    let mut magic = [0u8; 6];
    let n = read_magic(&mut file, &mut magic).map_err(|e| DiffError::Io {
        source: e,
        path: path.to_path_buf(),
    })?;
    file.seek(SeekFrom::Start(0)).map_err(|e| DiffError::Io {
        source: e,
        path: path.to_path_buf(),
    })?;

    let reader: Box<dyn Read> = match &magic[..n] {
        m if m.starts_with(&[0x1F, 0x8B]) => Box::new(flate2::read::GzDecoder::new(file)),
        m if m.starts_with(b"BZh") => Box::new(bzip2::read::BzDecoder::new(file)),
        m if m.starts_with(&[0xFD, b'7', b'z', b'X', b'Z', 0x00]) => {
            Box::new(xz2::read::XzDecoder::new(file))
        }
        m if m.starts_with(&[0x28, 0xB5, 0x2F, 0xFD]) => Box::new(
            zstd::stream::read::Decoder::new(file).map_err(|e| DiffError::Archive {
                msg: e.to_string(),
                path: path.to_path_buf(),
            })?,
        ),
        _ => Box::new(file),
    };
    Ok(reader)
}

/// Fills `buf` from `reader`, tolerating short reads, until the buffer is
/// full or the stream ends. Returns the number of bytes gathered.
fn read_magic<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Reads every member of the archive at `path` into descriptors, in archive
/// order.
///
/// Regular files are spooled and fingerprinted on the spot; hard links get
/// the fingerprint of the first earlier member their target names, if any.
/// Any read failure is fatal.
pub fn read_snapshot(path: &Path) -> Result<Snapshot, DiffError> {
    let reader = open_input(path)?;
    let mut archive = tar::Archive::new(reader);

    let entries = archive.entries().map_err(|e| DiffError::Archive {
        msg: e.to_string(),
        path: path.to_path_buf(),
    })?;

    let mut snapshot: Snapshot = Vec::new();
    for entry in entries {
        let mut entry = entry.map_err(|e| DiffError::Archive {
            msg: e.to_string(),
            path: path.to_path_buf(),
        })?;

        let name = entry
            .path()
            .map_err(|e| DiffError::Archive {
                msg: e.to_string(),
                path: path.to_path_buf(),
            })?
            .to_string_lossy()
            .into_owned();
        let header = entry.header().clone();
        let kind = EntryKind::from_header(&header);
        let size = entry.size();

        let (digest, content) = match &kind {
            EntryKind::Regular => {
                let mut handle = ContentHandle::capture(&mut entry).map_err(|e| DiffError::Io {
                    source: e,
                    path: path.to_path_buf(),
                })?;
                let digest = fingerprint::fingerprint(&mut handle).map_err(|e| e.with_path(path))?;
                (Some(digest), Some(handle))
            }
            // Tar stores hard links header-only; the content fingerprint is
            // the dereferenced target's, resolved against earlier members.
            EntryKind::HardLink { target } => (dereference(&snapshot, target), None),
            _ => (None, None),
        };

        snapshot.push(EntryDescriptor {
            name,
            kind,
            size,
            fingerprint: digest,
            header,
            content,
        });
    }
    Ok(snapshot)
}

/// First-encountered entry named `target`, dereferenced to its fingerprint.
fn dereference(snapshot: &[EntryDescriptor], target: &str) -> Option<String> {
    snapshot
        .iter()
        .find(|d| d.name == target)
        .and_then(|d| d.fingerprint.clone())
}
