#[cfg(feature = "clipboard-support")]
use clipboard::{ClipboardContext, ClipboardProvider};
use crate::domain::models::ScanSummary;
use crossterm::{
    ExecutableCommand,
    style::{Color, ResetColor, SetForegroundColor},
};
#[cfg(feature = "clipboard-support")]
use log::warn;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub trait OutputWriter {
    fn write(&self, content: &str) -> anyhow::Result<()>;
}

pub struct FileWriter {
    path: String,
}

impl FileWriter {
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

impl OutputWriter for FileWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to file: {}", self.path);
        fs::write(Path::new(&self.path), content)?;
        info!("Output written to file: {}", self.path);
        Ok(())
    }
}

pub struct ConsoleWriter;

impl OutputWriter for ConsoleWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to console");
        let mut stdout = io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        if !content.ends_with('\n') {
            stdout.write_all(b"\n")?;
        }
        stdout.flush()?;
        Ok(())
    }
}

#[cfg(feature = "clipboard-support")]
pub struct ClipboardWriter;

#[cfg(feature = "clipboard-support")]
impl OutputWriter for ClipboardWriter {
    fn write(&self, content: &str) -> anyhow::Result<()> {
        debug!("Writing output to clipboard");

        let mut ctx: ClipboardContext = match ClipboardProvider::new() {
            Ok(ctx) => ctx,
            Err(e) => {
                warn!("Failed to access clipboard: {}", e);
                return Err(anyhow::anyhow!("Failed to access clipboard: {}", e));
            }
        };

        match ctx.set_contents(content.to_owned()) {
            Ok(_) => {
                info!("Output copied to clipboard (size: {} bytes)", content.len());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to copy to clipboard: {}", e);
                Err(anyhow::anyhow!("Failed to copy to clipboard: {}", e))
            }
        }
    }
}

pub fn create_writer(
    output_path: &Option<String>,
    clipboard_output: bool,
) -> anyhow::Result<Box<dyn OutputWriter>> {
    if clipboard_output {
        #[cfg(feature = "clipboard-support")]
        return Ok(Box::new(ClipboardWriter) as Box<dyn OutputWriter>);
        #[cfg(not(feature = "clipboard-support"))]
        anyhow::bail!("Clipboard output requires the `clipboard-support` feature");
    }

    Ok(match output_path {
        Some(path) => Box::new(FileWriter::new(path.clone())) as Box<dyn OutputWriter>,
        None => Box::new(ConsoleWriter) as Box<dyn OutputWriter>,
    })
}

pub fn write_output(
    content: &str,
    output_path: Option<String>,
    clipboard_output: bool,
) -> anyhow::Result<()> {
    let writer = create_writer(&output_path, clipboard_output)?;
    writer.write(content)?;

    if clipboard_output {
        let mut stderr = io::stderr();
        stderr.execute(SetForegroundColor(Color::Green))?;
        writeln!(stderr, "\n📋 Content copied to clipboard!")?;
        stderr.execute(ResetColor)?;
        writeln!(stderr, "\nPreview of copied content:\n")?;
        writeln!(stderr, "{}", preview(content, 200))?;
    }

    Ok(())
}

fn preview(content: &str, preview_length: usize) -> String {
    if content.chars().count() > preview_length {
        let safe_substring: String = content.chars().take(preview_length).collect();
        format!("{}...", safe_substring)
    } else {
        content.to_string()
    }
}

/// Printed to stderr before the model call so it survives a failed request.
pub fn print_run_summary(summary: &ScanSummary, prompt_chars: usize) -> io::Result<()> {
    let mut stderr = io::stderr();

    writeln!(stderr)?;
    stderr.execute(SetForegroundColor(Color::Cyan))?;
    writeln!(stderr, "📦 Project context")?;
    stderr.execute(ResetColor)?;
    writeln!(stderr, "   files included:  {}", summary.files_included)?;
    writeln!(stderr, "   files truncated: {}", summary.files_truncated)?;
    if summary.files_omitted > 0 {
        writeln!(stderr, "   files omitted:   {} (file limit)", summary.files_omitted)?;
    }
    writeln!(
        stderr,
        "   excluded:        {} directories, {} files",
        summary.excluded_directories, summary.excluded_files
    )?;
    writeln!(stderr, "   prompt size:     {} chars", prompt_chars)?;

    if !summary.skipped.is_empty() {
        stderr.execute(SetForegroundColor(Color::Yellow))?;
        writeln!(stderr, "   files skipped:   {}", summary.files_skipped())?;
        for entry in &summary.skipped {
            writeln!(stderr, "     - {} ({})", entry.path, entry.reason)?;
        }
        stderr.execute(ResetColor)?;
    }
    writeln!(stderr)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_writer() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_string_lossy().to_string();
        let writer = FileWriter::new(path.clone());
        let content = "# Generated README";

        writer.write(content).unwrap();

        let read_content = fs::read_to_string(path).unwrap();
        assert_eq!(read_content, content);
    }

    #[test]
    fn test_write_output_to_file() {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_string_lossy().to_string();

        write_output("# Title\n", Some(path.clone()), false).unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "# Title\n");
    }

    #[test]
    fn test_create_writer() {
        assert!(create_writer(&Some("README.md".to_string()), false).is_ok());
        assert!(create_writer(&None, false).is_ok());
    }

    #[cfg(not(feature = "clipboard-support"))]
    #[test]
    fn test_clipboard_requires_feature() {
        assert!(create_writer(&None, true).is_err());
    }

    #[test]
    fn test_utf8_safe_preview() {
        let content = "اهلا مرحب عبدالله 🚀 This string has UTF-8 characters like: ├── ./src/file.rs";

        let shown = preview(content, 20);
        assert_eq!(shown.chars().count(), 23);
        assert!(shown.ends_with("..."));
        assert_eq!(preview("short", 20), "short");
    }
}
