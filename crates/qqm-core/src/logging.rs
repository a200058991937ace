//! Logging init: stdout plus a log file, or graceful fallback to stdout only.

use anyhow::{Context, Result};
use std::any::Any;
use std::backtrace::Backtrace;
use std::fs;
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,qqm=debug,qqm_core=debug";

/// Writer that is either a file or stderr (used when file clone fails).
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// `~/.local/state/qqm/qqm.log`.
pub fn default_log_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("qqm")?;
    Ok(xdg_dirs.get_state_home().join("qqm").join("qqm.log"))
}

fn open_log_file(path: &Path) -> Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log directory {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Initialize structured logging to stdout and to `log_path` (or the default
/// state-dir file). `ansi` colours stdout only; the file is always plain.
///
/// On failure (e.g. log dir unwritable) nothing is installed and the error is
/// returned so the caller can fall back to [`init_logging_stdout`].
pub fn init_logging(log_path: Option<&Path>, ansi: bool) -> Result<PathBuf> {
    let path = match log_path {
        Some(p) => p.to_path_buf(),
        None => default_log_path()?,
    };
    let file = open_log_file(&path)?;

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stdout)
        .with_ansi(ansi);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(FileMakeWriter(file))
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    install_panic_hook();
    tracing::info!("qqm logging initialized at {}", path.display());
    Ok(path)
}

/// Initialize logging to stdout only (no file). Use when init_logging() fails so the CLI doesn't crash.
pub fn init_logging_stdout(ansi: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stdout)
        .with_ansi(ansi)
        .try_init();
    install_panic_hook();
}

/// Route panics through `tracing` with their location and a backtrace, so they
/// reach the log file instead of only stderr.
pub fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());
        let message = panic_message(info.payload());
        let backtrace = Backtrace::force_capture();
        tracing::error!(
            panic.location = %location,
            "panic: {}\n{}",
            message,
            backtrace
        );
    }));
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn open_log_file_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("qqm.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn file_writer_appends() {
        use std::io::Write;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qqm.log");
        let mw = FileMakeWriter(open_log_file(&path).unwrap());
        mw.make_writer().write_all(b"one\n").unwrap();
        mw.make_writer().write_all(b"two\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for SharedBuf {
        type Writer = SharedBuf;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn panic_hook_logs_message_and_location() {
        let buf = SharedBuf::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buf.clone())
            .with_ansi(false)
            .finish();

        let previous = panic::take_hook();
        tracing::subscriber::with_default(subscriber, || {
            install_panic_hook();
            let result = panic::catch_unwind(|| panic!("kaboom {}", 7));
            assert!(result.is_err());
        });
        panic::set_hook(previous);

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert!(out.contains("ERROR"), "{out}");
        assert!(out.contains("panic: kaboom 7"), "{out}");
        assert!(out.contains("logging.rs:"), "{out}");
    }

    #[test]
    fn panic_message_handles_string_payloads() {
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*borrowed), "static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*owned), "owned");
        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(&*other), "unknown panic");
    }
}
