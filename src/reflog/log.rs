//! reflog::log
//!
//! An ordered reflog bound (or not yet bound) to a file.
//!
//! # States
//!
//! - **Unbound**: created with [`RefLog::new`] or [`RefLog::from_reader`];
//!   cannot be written until [`RefLog::to_file`] gives it a path.
//! - **Bound**: created with [`RefLog::from_file`] / [`RefLog::open`], or
//!   after a successful `to_file`.
//!
//! # Persistence
//!
//! - Whole-log rewrites go through a fresh temporary file in the same
//!   directory, renamed into place, so a crash never leaves a partial log.
//! - [`RefLog::append_entry`] appends one line in place. It takes no lock:
//!   callers must serialize writers to the same log themselves, e.g. with
//!   [`RefLogLock`](super::lock::RefLogLock).
//!
//! # Strictness
//!
//! Parsing stops at the first malformed line. A log with a bad line is
//! unreadable as a whole until repaired, so entries are never silently
//! dropped or reordered.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, Write};
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::entry::RefLogEntry;
use super::error::RefLogError;
use super::tail::{TailLine, TailReader};
use crate::core::actor::Actor;
use crate::core::config::{ConfigReader, DEFAULT_READ_WINDOW};
use crate::core::paths::RepoPaths;
use crate::core::types::{Oid, RefName};

/// Label used in I/O errors for sources without a path.
const STREAM_LABEL: &str = "<stream>";

/// The full history of one reference.
#[derive(Debug, Clone, Default)]
pub struct RefLog {
    path: Option<PathBuf>,
    entries: Vec<RefLogEntry>,
}

impl RefLog {
    /// An empty, unbound log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lazily decode entries from a stream.
    ///
    /// The iterator yields entries in file order without retaining them.
    /// It stops after the first error, which carries the 1-based line
    /// number of the offending line.
    pub fn iter_entries<R: BufRead>(reader: R) -> Entries<R> {
        Entries::new(reader, None)
    }

    /// Lazily decode entries from the file at `path`.
    ///
    /// Call again to restart from the beginning.
    pub fn iter_entries_at(path: impl AsRef<Path>) -> Result<Entries<BufReader<File>>, RefLogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RefLogError::io(path, e))?;
        Ok(Entries::new(BufReader::new(file), Some(path.to_path_buf())))
    }

    /// Load and bind the log at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or any line is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RefLogError> {
        let path = path.as_ref();
        let entries = Self::iter_entries_at(path)?.collect::<Result<Vec<_>, _>>()?;
        debug!(path = %path.display(), entries = entries.len(), "loaded reflog");
        Ok(Self {
            path: Some(path.to_path_buf()),
            entries,
        })
    }

    /// Load the log at `path`, or bind an empty log if the file is missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, RefLogError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self {
                path: Some(path.to_path_buf()),
                entries: Vec::new(),
            })
        }
    }

    /// Load an unbound log from a stream.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, RefLogError> {
        Ok(Self {
            path: None,
            entries: Self::iter_entries(reader).collect::<Result<_, _>>()?,
        })
    }

    /// Write every entry to `path` atomically and bind to it.
    ///
    /// Entries go to a fresh temporary file beside `path`, which is synced
    /// and renamed over it. Existing files such as git's own `<path>.lock`
    /// are never touched. Parent directories are created as needed.
    pub fn to_file(&mut self, path: impl AsRef<Path>) -> Result<(), RefLogError> {
        let path = path.as_ref();
        if path.file_name().is_none() {
            return Err(RefLogError::InvalidValue(format!(
                "'{}' does not name a file",
                path.display()
            )));
        }

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| RefLogError::io(dir, e))?;

        let temp = self.write_temp(dir)?;
        temp.persist(path).map_err(|e| RefLogError::io(path, e.error))?;

        debug!(path = %path.display(), entries = self.entries.len(), "wrote reflog");
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Encode every entry into a synced temporary file in `dir`.
    ///
    /// The file is removed when dropped unless persisted.
    fn write_temp(&self, dir: &Path) -> Result<NamedTempFile, RefLogError> {
        let mut temp = NamedTempFile::new_in(dir).map_err(|e| RefLogError::io(dir, e))?;
        let io_err = |e| RefLogError::io(dir, e);

        let mut out = BufWriter::new(&mut temp);
        for entry in &self.entries {
            entry.write_to(&mut out).map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;
        drop(out);

        temp.as_file().sync_all().map_err(io_err)?;
        Ok(temp)
    }

    /// Rewrite the bound file.
    ///
    /// # Errors
    ///
    /// Returns `RefLogError::Unbound` if the log has no path yet.
    pub fn write(&mut self) -> Result<&mut Self, RefLogError> {
        let path = self.path.clone().ok_or(RefLogError::Unbound)?;
        self.to_file(path)?;
        Ok(self)
    }

    /// Read the entry at `index` from the log at `path`.
    ///
    /// Non-negative indices count from the oldest entry. Negative indices
    /// count from the newest: `-1` is the last entry.
    ///
    /// # Errors
    ///
    /// Returns `RefLogError::IndexOutOfRange` if the log is too short.
    pub fn entry_at(path: impl AsRef<Path>, index: isize) -> Result<RefLogEntry, RefLogError> {
        Self::entry_at_with_window(path, index, DEFAULT_READ_WINDOW)
    }

    /// [`RefLog::entry_at`] with an explicit initial backward window.
    pub fn entry_at_with_window(
        path: impl AsRef<Path>,
        index: isize,
        window: usize,
    ) -> Result<RefLogEntry, RefLogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| RefLogError::io(path, e))?;
        lookup(file, index, window, Some(path))
    }

    /// [`RefLog::entry_at`] over any seekable source.
    pub fn entry_at_reader<R: Read + Seek>(
        reader: R,
        index: isize,
    ) -> Result<RefLogEntry, RefLogError> {
        lookup(reader, index, DEFAULT_READ_WINDOW, None)
    }

    /// Record an update to the log at `path`.
    ///
    /// The actor defaults to the identity resolved from `config`. The entry
    /// is stamped with the current time and local UTC offset. When `write`
    /// is set the encoded line is appended to `path`, creating the file and
    /// its parent directories if needed.
    ///
    /// No lock is taken; concurrent appenders to one path must be
    /// serialized by the caller.
    pub fn append_entry(
        config: &dyn ConfigReader,
        path: impl AsRef<Path>,
        old: &Oid,
        new: &Oid,
        message: &str,
        actor: Option<Actor>,
        write: bool,
    ) -> Result<RefLogEntry, RefLogError> {
        let actor = match actor {
            Some(actor) => actor,
            None => Actor::from_config(config)?,
        };

        let now = chrono::Local::now();
        let offset = now.offset().local_minus_utc();
        let entry = RefLogEntry::new(
            *old,
            *new,
            actor,
            now.timestamp(),
            offset - offset % 60,
            message,
        )?;

        if write {
            let path = path.as_ref();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| RefLogError::io(parent, e))?;
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| RefLogError::io(path, e))?;
            file.write_all(&entry.encode_line())
                .and_then(|()| file.sync_data())
                .map_err(|e| RefLogError::io(path, e))?;
            debug!(path = %path.display(), new = %entry.new_oid().short(7), "appended reflog entry");
        }

        Ok(entry)
    }

    /// Where the log of `refname` lives.
    pub fn path(paths: &RepoPaths, refname: &RefName) -> PathBuf {
        paths.reflog_path(refname)
    }

    // =========================================================================
    // Collection access
    // =========================================================================

    /// The file this log is bound to, if any.
    pub fn bound_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn entries(&self) -> &[RefLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RefLogEntry> {
        self.entries.iter()
    }

    pub fn get(&self, index: usize) -> Option<&RefLogEntry> {
        self.entries.get(index)
    }

    /// The newest entry.
    pub fn last(&self) -> Option<&RefLogEntry> {
        self.entries.last()
    }

    /// Add an entry in memory; persist with [`RefLog::write`].
    pub fn push(&mut self, entry: RefLogEntry) {
        self.entries.push(entry);
    }

    /// Replace all entries in memory; persist with [`RefLog::write`].
    pub fn replace_entries(&mut self, entries: Vec<RefLogEntry>) {
        self.entries = entries;
    }
}

/// Logs compare by their entries; the bound path is not part of a log's value.
impl PartialEq for RefLog {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for RefLog {}

impl std::ops::Index<usize> for RefLog {
    type Output = RefLogEntry;

    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

impl<'a> IntoIterator for &'a RefLog {
    type Item = &'a RefLogEntry;
    type IntoIter = std::slice::Iter<'a, RefLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for RefLog {
    type Item = RefLogEntry;
    type IntoIter = std::vec::IntoIter<RefLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

fn lookup<R: Read + Seek>(
    reader: R,
    index: isize,
    window: usize,
    path: Option<&Path>,
) -> Result<RefLogEntry, RefLogError> {
    let io_err = |e| RefLogError::io(path.unwrap_or(Path::new(STREAM_LABEL)), e);

    if index >= 0 {
        let wanted = index.unsigned_abs();
        let mut seen = 0;
        let entries = Entries::new(BufReader::new(reader), path.map(Path::to_path_buf));
        for entry in entries {
            let entry = entry?;
            if seen == wanted {
                return Ok(entry);
            }
            seen += 1;
        }
        return Err(RefLogError::IndexOutOfRange {
            index,
            available: seen,
        });
    }

    match TailReader::with_window(reader, window)
        .line_from_end(index.unsigned_abs())
        .map_err(io_err)?
    {
        TailLine::Found(line) => RefLogEntry::decode_line(&line),
        TailLine::Short(available) => Err(RefLogError::IndexOutOfRange { index, available }),
    }
}

/// Lazy entry decoder returned by [`RefLog::iter_entries`].
#[derive(Debug)]
pub struct Entries<R> {
    reader: R,
    path: Option<PathBuf>,
    buf: Vec<u8>,
    line: usize,
    done: bool,
}

impl<R: BufRead> Entries<R> {
    fn new(reader: R, path: Option<PathBuf>) -> Self {
        Self {
            reader,
            path,
            buf: Vec::new(),
            line: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for Entries<R> {
    type Item = Result<RefLogEntry, RefLogError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        let result = match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                return None;
            }
            Ok(_) => {
                self.line += 1;
                RefLogEntry::decode_line(&self.buf).map_err(|e| e.at_line(self.line))
            }
            Err(e) => Err(RefLogError::io(
                self.path.clone().unwrap_or_else(|| PathBuf::from(STREAM_LABEL)),
                e,
            )),
        };

        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

impl<R: BufRead> FusedIterator for Entries<R> {}
