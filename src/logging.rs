use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::LogConfig;

pub const LOG_FILE_NAME: &str = "app.log";

/// Append-only log file that rolls over to `name.1 .. name.N` once it would exceed `max_bytes`.
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    size: u64,
}

impl RotatingFile {
    pub fn open(dir: &Path, name: &str, max_bytes: u64, backups: usize) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            size,
        })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups == 0 {
            self.file = File::create(&self.path)?;
        } else {
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
            self.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        }

        self.size = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size > 0 && self.size + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Every record goes to stderr and to the rotating file.
struct Tee {
    file: RotatingFile,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // stderr may be closed under some supervisors; the file still gets the record
        let _ = io::stderr().write_all(buf);
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let _ = io::stderr().flush();
        self.file.flush()
    }
}

/// Installs the global logger. `RUST_LOG` filters as usual and defaults to `info`.
pub fn init(config: &LogConfig) -> io::Result<()> {
    let file = RotatingFile::open(&config.dir, LOG_FILE_NAME, config.max_bytes, config.backups)?;

    let filters = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&filters)
        .write_style(env_logger::WriteStyle::Never)
        .target(env_logger::Target::Pipe(Box::new(Tee { file })))
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;

    info!(
        "Logging to {} (max {} bytes, {} backups)",
        config.dir.join(LOG_FILE_NAME).display(),
        config.max_bytes,
        config.backups
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(path: PathBuf) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_rotates_and_keeps_backups() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RotatingFile::open(dir.path(), LOG_FILE_NAME, 10, 2).unwrap();

        for line in ["first\n", "second\n", "third\n", "fourth\n"] {
            file.write_all(line.as_bytes()).unwrap();
        }
        file.flush().unwrap();

        assert_eq!(read(dir.path().join("app.log")), "fourth\n");
        assert_eq!(read(dir.path().join("app.log.1")), "third\n");
        assert_eq!(read(dir.path().join("app.log.2")), "second\n");
        assert!(!dir.path().join("app.log.3").exists());
    }

    #[test]
    fn test_appends_below_limit() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RotatingFile::open(dir.path(), LOG_FILE_NAME, 1024, 5).unwrap();

        file.write_all(b"one\n").unwrap();
        file.write_all(b"two\n").unwrap();
        file.flush().unwrap();

        assert_eq!(read(dir.path().join("app.log")), "one\ntwo\n");
        assert!(!dir.path().join("app.log.1").exists());
    }

    #[test]
    fn test_reopen_continues_existing_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.log"), "0123456789").unwrap();

        let mut file = RotatingFile::open(dir.path(), LOG_FILE_NAME, 12, 1).unwrap();
        file.write_all(b"abc\n").unwrap();
        file.flush().unwrap();

        assert_eq!(read(dir.path().join("app.log")), "abc\n");
        assert_eq!(read(dir.path().join("app.log.1")), "0123456789");
    }

    #[test]
    fn test_zero_backups_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = RotatingFile::open(dir.path(), LOG_FILE_NAME, 8, 0).unwrap();

        file.write_all(b"aaaaaa\n").unwrap();
        file.write_all(b"bbbbbb\n").unwrap();
        file.flush().unwrap();

        assert_eq!(read(dir.path().join("app.log")), "bbbbbb\n");
        assert!(!dir.path().join("app.log.1").exists());
    }
}
