//! Structured logging module using tracing
//!
//! Console (stderr) and optional file output, plus small helpers for keeping log lines
//! short and free of secrets.

use std::path::PathBuf;
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Ellipse a string for display: first half + "..." + last half (no truncation of one end).
/// If `s` has ≤ `max_len` chars, returns `s` unchanged. Otherwise returns
/// `s[0..first_n] + "..." + s[last_n..]` where first_n + 3 + last_n ≤ max_len.
pub fn ellipse(s: &str, max_len: usize) -> String {
    const SEP: &str = "...";
    let sep_len = SEP.len();
    let chars: Vec<char> = s.chars().collect();
    let n = chars.len();
    if n <= max_len {
        return s.to_string();
    }
    if max_len <= sep_len {
        return SEP[..max_len].to_string();
    }
    let first_count = (max_len - sep_len) / 2;
    let last_count = (max_len - sep_len) - first_count;
    let first: String = chars[..first_count].iter().collect();
    let last: String = chars[n - last_count..].iter().collect();
    format!("{}{}{}", first, SEP, last)
}

/// Mask a credential for logging (shows only first/last few characters)
pub fn mask_credential(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Tracing level for a `-v` count: none = error, -v = warn, -vv = debug, -vvv = trace.
fn filter_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "error",
        1 => "warn",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing with console and (optionally) file output
///
/// The `-v` count controls the level; `RUST_LOG` is ignored so the flags stay authoritative.
pub fn init_tracing(verbosity: u8, log_file_path: Option<PathBuf>) {
    let filter = EnvFilter::new(filter_level(verbosity));

    let registry = tracing_subscriber::registry().with(filter);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let file = log_file_path.and_then(|log_path| {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .ok()
    });

    if let Some(file) = file {
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(false); // No ANSI in files

        registry.with(console_layer).with(file_layer).init();
    } else {
        // Console only
        registry.with(console_layer).init();
    }
}

/// In-memory log sink for tests: install with [`capture`], read back with
/// [`LogCapture::contents`].
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct LogCapture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

#[cfg(test)]
impl LogCapture {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[cfg(test)]
impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl<'a> fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Route this thread's events (debug and up) into a fresh [`LogCapture`] until the guard drops.
#[cfg(test)]
pub(crate) fn capture() -> (LogCapture, tracing::subscriber::DefaultGuard) {
    let sink = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(sink.clone())
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .finish();
    (sink, tracing::subscriber::set_default(subscriber))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ellipse_keeps_both_ends() {
        assert_eq!(ellipse("short", 10), "short");
        assert_eq!(ellipse("abcdefghijklmnop", 9), "abc...nop");
        assert_eq!(ellipse("abcdef", 2), "..");
    }

    #[test]
    fn test_mask_credential() {
        assert_eq!(mask_credential("short"), "****");
        assert_eq!(mask_credential("verylongtoken12345"), "very...2345");
    }

    #[test]
    fn capture_collects_events() {
        let (logs, _guard) = capture();
        tracing::debug!("captured line");
        assert!(logs.contents().contains("captured line"));
    }

    #[test]
    fn verbosity_levels() {
        assert_eq!(filter_level(0), "error");
        assert_eq!(filter_level(2), "debug");
        assert_eq!(filter_level(9), "trace");
    }
}
