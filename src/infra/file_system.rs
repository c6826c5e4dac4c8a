use crate::domain::error::SkipReason;
use crate::domain::models::{FileRecord, TextEncoding};
use crossterm::{
    ExecutableCommand, cursor,
    terminal::{Clear, ClearType},
    tty::IsTty,
};
use log::{debug, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Widest UTF-8 encoding of a single char.
const MAX_UTF8_WIDTH: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedText {
    Primary(String),
    Fallback(String),
}

impl DecodedText {
    pub fn encoding(&self) -> TextEncoding {
        match self {
            DecodedText::Primary(_) => TextEncoding::Utf8,
            DecodedText::Fallback(_) => TextEncoding::Latin1,
        }
    }

    pub fn into_string(self) -> String {
        match self {
            DecodedText::Primary(s) | DecodedText::Fallback(s) => s,
        }
    }
}

/// UTF-8 first, Latin-1 otherwise. Latin-1 maps every byte to one char, so
/// this never fails.
///
/// `capped` marks a buffer cut short by the read limit; an incomplete UTF-8
/// sequence at its very end is then an artifact of the cut and is dropped.
pub fn decode_text(bytes: Vec<u8>, capped: bool) -> DecodedText {
    match String::from_utf8(bytes) {
        Ok(text) => DecodedText::Primary(text),
        Err(err) => {
            let utf8_error = err.utf8_error();
            let mut bytes = err.into_bytes();
            if capped && utf8_error.error_len().is_none() {
                bytes.truncate(utf8_error.valid_up_to());
                match String::from_utf8(bytes) {
                    Ok(text) => return DecodedText::Primary(text),
                    Err(err) => bytes = err.into_bytes(),
                }
            }
            DecodedText::Fallback(bytes.iter().map(|&b| char::from(b)).collect())
        }
    }
}

/// Cuts to exactly `max_chars` chars. Returns the original char count and
/// whether anything was cut.
pub fn truncate_chars(text: &mut String, max_chars: usize) -> (usize, bool) {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        return (char_count, false);
    }
    let byte_index = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    text.truncate(byte_index);
    (char_count, true)
}

/// Reads one included file into a bounded `FileRecord`.
///
/// At most `(max_chars + 1) * 4` bytes are read, which is always enough to
/// tell whether the decoded text exceeds `max_chars`.
pub fn load_file(
    path: &Path,
    relative_path: &str,
    max_chars: usize,
) -> Result<FileRecord, SkipReason> {
    let read_cap = (max_chars as u64)
        .saturating_add(1)
        .saturating_mul(MAX_UTF8_WIDTH);

    let file = fs::File::open(path).map_err(|e| {
        warn!("Cannot open {}: {}", path.display(), e);
        SkipReason::from_io(&e)
    })?;
    let file_len = file.metadata().map(|m| m.len()).ok();

    let mut bytes = Vec::new();
    file.take(read_cap.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|e| {
            warn!("Cannot read {}: {}", path.display(), e);
            SkipReason::from_io(&e)
        })?;

    let capped = bytes.len() as u64 > read_cap;
    if capped {
        bytes.truncate(read_cap as usize);
    }
    let original_bytes = file_len.unwrap_or(bytes.len() as u64);

    let decoded = decode_text(bytes, capped);
    let encoding = decoded.encoding();
    if encoding == TextEncoding::Latin1 {
        warn!("Unicode decode error for {}, using latin-1", path.display());
    }

    let mut content = decoded.into_string();
    let (original_chars, truncated) = truncate_chars(&mut content, max_chars);
    if truncated {
        debug!(
            "Truncating {} (length {} > {})",
            relative_path, original_chars, max_chars
        );
    }

    Ok(FileRecord {
        relative_path: relative_path.to_string(),
        content,
        original_bytes,
        original_chars,
        truncated,
        encoding,
    })
}

/// Spinner for the directory walk, drawn on stderr only when it is a terminal.
pub struct ScanProgress {
    enabled: bool,
    start_time: Instant,
    update_interval: Duration,
    last_update: Instant,
    scanned_count: usize,
    matched_count: usize,
}

impl ScanProgress {
    pub fn new() -> Self {
        Self::with_enabled(io::stderr().is_tty())
    }

    pub fn with_enabled(enabled: bool) -> Self {
        Self {
            enabled,
            start_time: Instant::now(),
            update_interval: Duration::from_millis(250),
            last_update: Instant::now(),
            scanned_count: 0,
            matched_count: 0,
        }
    }

    pub fn update(&mut self, matched: bool) {
        self.scanned_count += 1;
        if matched {
            self.matched_count += 1;
        }
        if !self.enabled {
            return;
        }

        let now = Instant::now();
        if now.duration_since(self.last_update) >= self.update_interval {
            self.last_update = now;
            if let Err(e) = self.draw(now) {
                debug!("Progress display failed: {}", e);
                self.enabled = false;
            }
        }
    }

    fn draw(&self, now: Instant) -> io::Result<()> {
        let elapsed = now.duration_since(self.start_time).as_secs_f32();
        let files_per_sec = if elapsed > 0.0 {
            self.scanned_count as f32 / elapsed
        } else {
            0.0
        };

        let spinner_chars = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
        let spinner_idx = ((now.duration_since(self.start_time).as_millis() / 100)
            % spinner_chars.len() as u128) as usize;

        let mut stderr = io::stderr();
        stderr.execute(cursor::SavePosition)?;
        stderr.execute(Clear(ClearType::CurrentLine))?;
        write!(
            stderr,
            "{} Scanning: {} entries, {} included ({:.1} entries/sec)",
            spinner_chars[spinner_idx], self.scanned_count, self.matched_count, files_per_sec
        )?;
        stderr.flush()?;
        stderr.execute(cursor::RestorePosition)?;
        Ok(())
    }

    pub fn finish(&self) {
        if !self.enabled {
            return;
        }
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let mut stderr = io::stderr();
        let result = stderr
            .execute(Clear(ClearType::CurrentLine))
            .and_then(|out| {
                writeln!(
                    out,
                    "✓ Scan complete: {} entries scanned, {} included in {:.1}s",
                    self.scanned_count, self.matched_count, elapsed
                )
            });
        if let Err(e) = result {
            debug!("Progress display failed: {}", e);
        }
    }
}
