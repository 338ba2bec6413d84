//! # Output Assembler
//!
//! Serializes the added-or-modified entries into a new "delta" archive,
//! preserving each entry's original header and re-reading spooled content
//! from its rewound position. The compression scheme is picked from the
//! destination file name's extension.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tar::Builder;

use crate::entry::{EntryDescriptor, EntryKind};
use crate::DiffError;

/// Compression scheme of the delta archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// Plain tar, no compression.
    None,
    Gzip,
    Bzip2,
    Xz,
    Zstd,
}

impl Compression {
    /// Selects the scheme from the destination extension. `tar`, unknown and
    /// absent extensions all mean an uncompressed container.
    pub fn from_path(path: &Path) -> Compression {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "gz" | "tgz" => Compression::Gzip,
            "bz2" | "tbz2" => Compression::Bzip2,
            "xz" | "txz" => Compression::Xz,
            "zst" | "zstd" => Compression::Zstd,
            _ => Compression::None,
        }
    }
}

/// Writes `entries`, in order, into a new archive at `dest`.
///
/// Each entry is announced on stdout as it is added, symlinks with their
/// target. Open and write failures are fatal output errors; the comparison
/// report has already been emitted by the time this runs.
pub fn write_delta_archive(dest: &Path, entries: &mut [EntryDescriptor]) -> Result<(), DiffError> {
    let file = File::create(dest).map_err(|e| output_error(e, dest))?;
    // Large buffer to keep syscall overhead down while streaming content.
    let buffered = BufWriter::with_capacity(1024 * 1024, file);

    match Compression::from_path(dest) {
        Compression::None => {
            let mut builder = Builder::new(buffered);
            append_entries(&mut builder, entries, dest)?;
            let mut inner = builder.into_inner().map_err(|e| output_error(e, dest))?;
            inner.flush().map_err(|e| output_error(e, dest))?;
        }
        Compression::Gzip => {
            let encoder = flate2::write::GzEncoder::new(buffered, flate2::Compression::default());
            let mut builder = Builder::new(encoder);
            append_entries(&mut builder, entries, dest)?;
            let encoder = builder.into_inner().map_err(|e| output_error(e, dest))?;
            let mut inner = encoder.finish().map_err(|e| output_error(e, dest))?;
            inner.flush().map_err(|e| output_error(e, dest))?;
        }
        Compression::Bzip2 => {
            let encoder = bzip2::write::BzEncoder::new(buffered, bzip2::Compression::default());
            let mut builder = Builder::new(encoder);
            append_entries(&mut builder, entries, dest)?;
            let encoder = builder.into_inner().map_err(|e| output_error(e, dest))?;
            let mut inner = encoder.finish().map_err(|e| output_error(e, dest))?;
            inner.flush().map_err(|e| output_error(e, dest))?;
        }
        Compression::Xz => {
            let encoder = xz2::write::XzEncoder::new(buffered, 6);
            let mut builder = Builder::new(encoder);
            append_entries(&mut builder, entries, dest)?;
            let encoder = builder.into_inner().map_err(|e| output_error(e, dest))?;
            let mut inner = encoder.finish().map_err(|e| output_error(e, dest))?;
            inner.flush().map_err(|e| output_error(e, dest))?;
        }
        Compression::Zstd => {
            let encoder = zstd::stream::write::Encoder::new(buffered, zstd::DEFAULT_COMPRESSION_LEVEL)
                .map_err(|e| output_error(e, dest))?;
            let mut builder = Builder::new(encoder);
            append_entries(&mut builder, entries, dest)?;
            let encoder = builder.into_inner().map_err(|e| output_error(e, dest))?;
            let mut inner = encoder.finish().map_err(|e| output_error(e, dest))?;
            inner.flush().map_err(|e| output_error(e, dest))?;
        }
    }
    Ok(())
}

fn output_error(source: io::Error, dest: &Path) -> DiffError {
    DiffError::Output { source, path: dest.to_path_buf() }
}

fn append_entries<W: Write>(
    builder: &mut Builder<W>,
    entries: &mut [EntryDescriptor],
    dest: &Path,
) -> Result<(), DiffError> {
    for entry in entries.iter_mut() {
        match entry.link_target() {
            Some(target) => println!("  adding {} -> {}", entry.name, target),
            None => println!("  adding {}", entry.name),
        }

        // The preserved header keeps type, mode, mtime and ownership. The
        // name and link target go through the builder, which emits GNU
        // long-name extension records when they exceed the 100-byte header
        // fields.
        let mut header = entry.header.clone();
        match &entry.kind {
            EntryKind::Symlink { target } | EntryKind::HardLink { target } => {
                builder
                    .append_link(&mut header, &entry.name, target)
                    .map_err(|e| output_error(e, dest))?;
            }
            _ => match entry.content.as_mut() {
                Some(handle) => {
                    handle.rewind().map_err(|e| output_error(e, dest))?;
                    builder
                        .append_data(&mut header, &entry.name, handle)
                        .map_err(|e| output_error(e, dest))?;
                }
                None => {
                    builder
                        .append_data(&mut header, &entry.name, io::empty())
                        .map_err(|e| output_error(e, dest))?;
                }
            },
        }
    }
    Ok(())
}
