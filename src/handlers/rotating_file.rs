//! Size- and day-based rotating file writer
//!
//! `RotatingFileWriter` is a plain `std::io::Write`, so it plugs into a
//! [`StreamHandler`](super::StreamHandler) like any other sink. Backups are
//! numbered `<name>.1` (newest) up to `<name>.N`, optionally gzip-compressed
//! to `<name>.N.gz`.

use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const BYTES_PER_MB: u64 = 1024 * 1024;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Rotation settings
///
/// A zero `max_size_mb`, `max_age_days` or `max_backups` disables that limit.
///
/// # Examples
///
/// ```
/// use kvlog::handlers::RotateOptions;
///
/// let options = RotateOptions::new()
///     .with_max_size_mb(50)
///     .with_max_backups(7)
///     .with_compress(true);
/// assert!(options.daily);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RotateOptions {
    /// Size of a single file before it is rotated
    pub max_size_mb: u64,
    /// Backups older than this are removed
    pub max_age_days: u64,
    /// Number of backups kept
    pub max_backups: usize,
    /// Gzip rotated files
    pub compress: bool,
    /// Rotate on the first write after local midnight
    pub daily: bool,
}

impl Default for RotateOptions {
    fn default() -> Self {
        Self {
            max_size_mb: 100,
            max_age_days: 7,
            max_backups: 50,
            compress: false,
            daily: true,
        }
    }
}

impl RotateOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_size_mb(mut self, mb: u64) -> Self {
        self.max_size_mb = mb;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_daily(mut self, enabled: bool) -> Self {
        self.daily = enabled;
        self
    }

    fn max_bytes(&self) -> Option<u64> {
        (self.max_size_mb > 0).then(|| self.max_size_mb.saturating_mul(BYTES_PER_MB))
    }
}

/// File writer that rotates by size and by calendar day
///
/// ```no_run
/// use kvlog::handlers::{RotateOptions, RotatingFileWriter};
/// use std::io::Write;
///
/// let mut writer = RotatingFileWriter::new("/var/log/app.log", RotateOptions::default()).unwrap();
/// writer.write_all(b"started\n").unwrap();
/// ```
pub struct RotatingFileWriter {
    path: PathBuf,
    options: RotateOptions,
    writer: Option<BufWriter<File>>,
    current_size: u64,
    /// Local date the current file was started on
    opened_on: NaiveDate,
}

impl RotatingFileWriter {
    /// Open (or create) `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns error if the directory or file cannot be created
    pub fn new<P: AsRef<Path>>(path: P, options: RotateOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let (file, current_size, modified) = Self::open(&path)?;
        Ok(Self {
            path,
            options,
            writer: Some(BufWriter::new(file)),
            current_size,
            opened_on: DateTime::<Local>::from(modified).date_naive(),
        })
    }

    fn open(path: &Path) -> Result<(File, u64, SystemTime)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "open log file",
                    format!("Failed to open '{}'", path.display()),
                    e,
                )
            })?;
        let metadata = file.metadata().map_err(|e| {
            LoggerError::io_operation(
                "open log file",
                format!("Cannot access metadata of '{}'", path.display()),
                e,
            )
        })?;
        let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());
        Ok((file, metadata.len(), modified))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn options(&self) -> &RotateOptions {
        &self.options
    }

    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.current_size
    }

    /// Whether writing `incoming` more bytes requires a rotation first.
    fn should_rotate(&self, incoming: u64) -> bool {
        let too_big = self
            .options
            .max_bytes()
            .is_some_and(|max| self.current_size > 0 && self.current_size + incoming > max);
        let new_day = self.options.daily && Local::now().date_naive() != self.opened_on;
        too_big || new_day
    }

    /// Close the current file, shift backups and start a fresh file.
    pub fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
        }

        self.shift_backups()?;

        if self.path.exists() {
            let first = self.backup_path(1, false);
            fs::rename(&self.path, &first).map_err(|e| {
                LoggerError::file_rotation(
                    self.path.display().to_string(),
                    format!("Failed to rotate current log file: {}", e),
                )
            })?;
            if self.options.compress {
                compress_file(&first)?;
            }
        }

        let (file, size, _) = Self::open(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        self.current_size = size;
        self.opened_on = Local::now().date_naive();

        self.remove_expired();
        Ok(())
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app.log")
            .to_string()
    }

    fn backup_path(&self, index: usize, compressed: bool) -> PathBuf {
        let suffix = if compressed { ".gz" } else { "" };
        self.path
            .with_file_name(format!("{}.{}{}", self.file_name(), index, suffix))
    }

    /// Existing backups as `(index, compressed, path)`.
    fn backups(&self) -> Vec<(usize, bool, PathBuf)> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(dir) => dir.to_path_buf(),
            None => PathBuf::from("."),
        };
        let prefix = format!("{}.", self.file_name());
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut backups: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let rest = name.strip_prefix(&prefix)?;
                let (index, compressed) = match rest.strip_suffix(".gz") {
                    Some(index) => (index, true),
                    None => (rest, false),
                };
                Some((index.parse::<usize>().ok()?, compressed, entry.path()))
            })
            .collect();
        backups.sort_by(|a, b| b.0.cmp(&a.0));
        backups
    }

    /// Renumber `.i` to `.i+1`, dropping what falls past `max_backups`.
    fn shift_backups(&self) -> Result<()> {
        for (index, compressed, path) in self.backups() {
            if self.options.max_backups > 0 && index >= self.options.max_backups {
                if let Err(e) = fs::remove_file(&path) {
                    eprintln!(
                        "[LOGGER WARNING] Failed to remove old backup {}: {}",
                        path.display(),
                        e
                    );
                }
                continue;
            }
            let target = self.backup_path(index + 1, compressed);
            fs::rename(&path, &target).map_err(|e| {
                LoggerError::file_rotation(
                    path.display().to_string(),
                    format!("Failed to rotate backup files: {}", e),
                )
            })?;
        }
        Ok(())
    }

    fn remove_expired(&self) {
        if self.options.max_age_days == 0 {
            return;
        }
        let max_age = Duration::from_secs(self.options.max_age_days * SECONDS_PER_DAY);
        let now = SystemTime::now();
        for (_, _, path) in self.backups() {
            let expired = fs::metadata(&path)
                .and_then(|m| m.modified())
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .is_some_and(|age| age > max_age);
            if expired {
                if let Err(e) = fs::remove_file(&path) {
                    eprintln!(
                        "[LOGGER WARNING] Failed to remove expired backup {}: {}",
                        path.display(),
                        e
                    );
                }
            }
        }
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.should_rotate(buf.len() as u64) {
            if let Err(e) = self.rotate() {
                // keep writing to whatever file is available
                eprintln!(
                    "[LOGGER WARNING] Log rotation failed: {}. Continuing with current file.",
                    e
                );
                if self.writer.is_none() {
                    let (file, size, _) = Self::open(&self.path).map_err(io::Error::other)?;
                    self.writer = Some(BufWriter::new(file));
                    self.current_size = size;
                }
                self.opened_on = Local::now().date_naive();
            }
        }

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::other(LoggerError::writer("file writer not initialized")))?;
        writer.write_all(buf)?;
        self.current_size += buf.len() as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.writer.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for RotatingFileWriter {
    fn drop(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            let _ = writer.flush();
        }
    }
}

/// Gzip `path` into `path.gz`, removing the original only on success.
fn compress_file(path: &Path) -> Result<()> {
    let mut gz_name = path.as_os_str().to_owned();
    gz_name.push(".gz");
    let gz_path = PathBuf::from(gz_name);
    let mut tmp_name = gz_path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let input = File::open(path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to open file for compression: {}", path.display()),
            e,
        )
    })?;
    let mut reader = BufReader::with_capacity(64 * 1024, input);

    let output = File::create(&tmp_path).map_err(|e| {
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to create temporary file: {}", tmp_path.display()),
            e,
        )
    })?;
    let mut encoder = flate2::write::GzEncoder::new(
        BufWriter::with_capacity(64 * 1024, output),
        flate2::Compression::default(),
    );

    let mut buffer = vec![0u8; 64 * 1024];
    let streamed: io::Result<()> = (|| {
        loop {
            let n = reader.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            encoder.write_all(&buffer[..n])?;
        }
        encoder.finish()?.flush()
    })();

    if let Err(e) = streamed {
        let _ = fs::remove_file(&tmp_path);
        return Err(LoggerError::io_operation(
            "compress log file",
            format!("Failed to compress {}", path.display()),
            e,
        ));
    }

    fs::rename(&tmp_path, &gz_path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        LoggerError::io_operation(
            "compress log file",
            format!("Failed to rename compressed file to: {}", gz_path.display()),
            e,
        )
    })?;

    if let Err(e) = fs::remove_file(path) {
        eprintln!(
            "[LOGGER WARNING] Compression succeeded but failed to remove original file {}: {}",
            path.display(),
            e
        );
    }
    Ok(())
}
