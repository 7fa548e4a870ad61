// src/services/clipboard.rs
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Mutex;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    #[error("clipboard command exited with {0}")]
    CommandFailed(String),
}

/// Platform capability that accepts text for the system clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError>;

    fn name(&self) -> &str;
}

/// Keeps the last written text in memory.
///
/// Used when the server has no desktop session; clients read the text back
/// from the copy response.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    last: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.last.lock().ok().and_then(|last| last.clone())
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut last = self
            .last
            .lock()
            .map_err(|_| ClipboardError::Unavailable("clipboard lock poisoned".to_string()))?;
        *last = Some(text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Pipes text into an external program such as `xclip -selection clipboard`.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace. Returns `None` for a blank line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ClipboardError::Unavailable(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .await
                .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
            // stdin dropped here so the program sees EOF
        }

        let status = child
            .wait()
            .await
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::CommandFailed(status.to_string()))
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_clipboard_keeps_last_text() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.contents(), None);

        clipboard.write_text("first").await.unwrap();
        clipboard.write_text("second").await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("second"));
    }

    #[test]
    fn test_command_line_parsing() {
        let clipboard = CommandClipboard::from_command_line("xclip -selection clipboard").unwrap();
        assert_eq!(clipboard.program, "xclip");
        assert_eq!(clipboard.args, vec!["-selection", "clipboard"]);

        assert!(CommandClipboard::from_command_line("   ").is_none());
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let clipboard = CommandClipboard::new("/nonexistent/clipboard-tool", vec![]);
        let err = clipboard.write_text("hi").await.unwrap_err();
        assert!(matches!(err, ClipboardError::Unavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_exit_status() {
        let ok = CommandClipboard::new("cat", vec![]);
        assert!(ok.write_text("hello").await.is_ok());

        let failing = CommandClipboard::new("false", vec![]);
        let err = failing.write_text("hello").await.unwrap_err();
        assert!(matches!(err, ClipboardError::CommandFailed(_) | ClipboardError::Unavailable(_)));
    }
}
