//! # Entry Descriptors
//!
//! This module defines the immutable record kept for every archive member: its
//! identity, type, metadata and (for content-bearing entries) a rewindable
//! handle to its content. The comparator that decides whether two same-named
//! entries represent the same content also lives here.

use std::io::{self, Read, Seek, SeekFrom};

use tempfile::SpooledTempFile;

/// Entry contents up to this size stay in memory; larger entries spill to a
/// temporary file.
const SPOOL_LIMIT: usize = 8 * 1024 * 1024;

/// The closed set of archive member types.
///
/// Per-variant fields carry data that only exists for that type, so the
/// comparator cannot consult a field that does not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file with content.
    Regular,
    /// A directory.
    Directory,
    /// A symbolic link and the path it points to.
    Symlink { target: String },
    /// A hard link to an earlier member of the same archive.
    HardLink { target: String },
    /// A character or block device node.
    Device,
    /// A named pipe.
    Fifo,
    /// Anything the container format knows but we don't classify.
    Unknown,
}

impl EntryKind {
    /// Classifies a raw tar header.
    pub fn from_header(header: &tar::Header) -> EntryKind {
        use tar::EntryType;

        let link_target = |h: &tar::Header| -> String {
            h.link_name()
                .ok()
                .flatten()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        match header.entry_type() {
            EntryType::Symlink => EntryKind::Symlink { target: link_target(header) },
            EntryType::Link => EntryKind::HardLink { target: link_target(header) },
            EntryType::Char | EntryType::Block => EntryKind::Device,
            EntryType::Fifo => EntryKind::Fifo,
            EntryType::Directory => EntryKind::Directory,
            EntryType::Regular | EntryType::Continuous | EntryType::GNUSparse => EntryKind::Regular,
            _ => EntryKind::Unknown,
        }
    }

    /// The 4-character tag used in diagnostic records.
    pub fn type_tag(&self) -> &'static str {
        match self {
            EntryKind::Symlink { .. } => "slnk",
            EntryKind::HardLink { .. } => "hlnk",
            EntryKind::Device => "dev",
            EntryKind::Fifo => "fifo",
            EntryKind::Directory => "dir",
            EntryKind::Regular => "file",
            EntryKind::Unknown => "unkn",
        }
    }

    /// True for kinds whose content is fingerprinted (regular files and
    /// dereferenced hard links).
    pub fn carries_fingerprint(&self) -> bool {
        matches!(self, EntryKind::Regular | EntryKind::HardLink { .. })
    }

    fn same_type(&self, other: &EntryKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// An ownership-exclusive, rewindable handle to one entry's content.
///
/// Backed by [`SpooledTempFile`] so that small entries never touch the disk
/// while large ones don't pin memory. The backing storage is released when the
/// handle is dropped, on every exit path.
pub struct ContentHandle {
    inner: SpooledTempFile,
}

impl ContentHandle {
    /// Captures the full content of `reader` into a new handle, positioned at
    /// the start.
    pub fn capture<R: Read>(reader: &mut R) -> io::Result<ContentHandle> {
        let mut inner = SpooledTempFile::new(SPOOL_LIMIT);
        io::copy(reader, &mut inner)?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(ContentHandle { inner })
    }

    /// Repositions the handle at the start of the content.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.inner.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

impl Read for ContentHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Seek for ContentHandle {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl std::fmt::Debug for ContentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContentHandle(..)")
    }
}

/// Immutable record of one archive member.
///
/// Built once while the reader enumerates an archive; read-only afterwards.
/// The raw tar header is preserved verbatim so the entry can be re-serialized
/// into a delta archive with its original metadata.
#[derive(Debug)]
pub struct EntryDescriptor {
    /// Path within the archive; the identity key of one snapshot.
    pub name: String,
    /// Classified member type.
    pub kind: EntryKind,
    /// Size as recorded in the header, never re-measured from content.
    pub size: u64,
    /// Lowercase hex SHA-1 of the content. Present for regular files and for
    /// hard links whose target could be dereferenced within the snapshot.
    pub fingerprint: Option<String>,
    /// The raw header, kept for re-serialization.
    pub header: tar::Header,
    /// Content stream, present only when content was read.
    pub content: Option<ContentHandle>,
}

impl EntryDescriptor {
    /// Decides whether `self` and `other` — already known to share a name —
    /// represent different content.
    ///
    /// Entries differ when the type differs, the recorded size differs, the
    /// symlink target differs (symlinks only), or the content fingerprint
    /// differs (regular files and hard links only). Fields a type doesn't
    /// carry are never consulted.
    pub fn differs(&self, other: &EntryDescriptor) -> bool {
        if !self.kind.same_type(&other.kind) {
            return true;
        }
        if self.size != other.size {
            return true;
        }
        if let (EntryKind::Symlink { target: a }, EntryKind::Symlink { target: b }) =
            (&self.kind, &other.kind)
        {
            if a != b {
                return true;
            }
        }
        if self.kind.carries_fingerprint() && self.fingerprint != other.fingerprint {
            return true;
        }
        false
    }

    /// The 4-character tag used in diagnostic records.
    pub fn type_tag(&self) -> &'static str {
        self.kind.type_tag()
    }

    /// The symlink target, for progress reporting.
    pub fn link_target(&self) -> Option<&str> {
        match &self.kind {
            EntryKind::Symlink { target } => Some(target),
            _ => None,
        }
    }
}

/// Builds a descriptor without content, for tests that exercise the
/// comparator and diff engine directly.
#[cfg(test)]
pub(crate) fn test_descriptor(
    name: &str,
    kind: EntryKind,
    size: u64,
    fingerprint: Option<&str>,
) -> EntryDescriptor {
    let mut header = tar::Header::new_gnu();
    header.set_size(size);
    header.set_cksum();
    EntryDescriptor {
        name: name.to_string(),
        kind,
        size,
        fingerprint: fingerprint.map(str::to_string),
        header,
        content: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tags_match_the_diagnostic_vocabulary() {
        assert_eq!(EntryKind::Regular.type_tag(), "file");
        assert_eq!(EntryKind::Directory.type_tag(), "dir");
        assert_eq!(EntryKind::Symlink { target: "x".into() }.type_tag(), "slnk");
        assert_eq!(EntryKind::HardLink { target: "x".into() }.type_tag(), "hlnk");
        assert_eq!(EntryKind::Device.type_tag(), "dev");
        assert_eq!(EntryKind::Fifo.type_tag(), "fifo");
        assert_eq!(EntryKind::Unknown.type_tag(), "unkn");
    }

    #[test]
    fn identical_regular_files_do_not_differ() {
        let a = test_descriptor("a", EntryKind::Regular, 12, Some("abc"));
        let b = test_descriptor("a", EntryKind::Regular, 12, Some("abc"));
        assert!(!a.differs(&b));
    }

    #[test]
    fn fingerprint_mismatch_makes_regular_files_differ() {
        let a = test_descriptor("a", EntryKind::Regular, 12, Some("abc"));
        let b = test_descriptor("a", EntryKind::Regular, 12, Some("def"));
        assert!(a.differs(&b));
    }

    #[test]
    fn size_mismatch_differs_even_with_equal_fingerprints() {
        let a = test_descriptor("a", EntryKind::Regular, 12, Some("abc"));
        let b = test_descriptor("a", EntryKind::Regular, 13, Some("abc"));
        assert!(a.differs(&b));
    }

    #[test]
    fn type_change_differs() {
        let a = test_descriptor("a", EntryKind::Regular, 0, Some("abc"));
        let b = test_descriptor("a", EntryKind::Directory, 0, None);
        assert!(a.differs(&b));
    }

    #[test]
    fn symlink_target_change_differs_despite_equal_size() {
        let a = test_descriptor("a", EntryKind::Symlink { target: "old".into() }, 0, None);
        let b = test_descriptor("a", EntryKind::Symlink { target: "new".into() }, 0, None);
        assert!(a.differs(&b));
    }

    #[test]
    fn symlinks_with_same_target_do_not_differ() {
        let a = test_descriptor("a", EntryKind::Symlink { target: "t".into() }, 0, None);
        let b = test_descriptor("a", EntryKind::Symlink { target: "t".into() }, 0, None);
        assert!(!a.differs(&b));
    }

    #[test]
    fn directories_ignore_fingerprints_and_targets() {
        let a = test_descriptor("d", EntryKind::Directory, 0, None);
        let b = test_descriptor("d", EntryKind::Directory, 0, None);
        assert!(!a.differs(&b));
    }

    #[test]
    fn content_handle_rewinds_to_the_start() {
        let payload = b"rewindable payload";
        let mut handle = ContentHandle::capture(&mut &payload[..]).unwrap();

        let mut first = Vec::new();
        handle.read_to_end(&mut first).unwrap();
        assert_eq!(first, payload);

        handle.rewind().unwrap();
        let mut second = Vec::new();
        handle.read_to_end(&mut second).unwrap();
        assert_eq!(second, payload);
    }
}
