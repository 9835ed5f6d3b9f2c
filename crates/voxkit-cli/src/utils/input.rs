//! Interactive prompts.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use voxkit_core::FilePicker;

/// A [`FilePicker`] that reads a path from a line of input.
///
/// An empty line, end of input, or a path that is not an existing file
/// counts as cancelling.
pub struct LinePicker<R> {
    input: Mutex<R>,
}

impl LinePicker<io::BufReader<io::Stdin>> {
    /// Prompt on stdout, read from stdin.
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead> LinePicker<R> {
    pub const fn new(input: R) -> Self {
        Self {
            input: Mutex::new(input),
        }
    }
}

impl<R: BufRead + Send> FilePicker for LinePicker<R> {
    fn pick_file(&self, title: &str, extensions: &[&str]) -> Option<PathBuf> {
        let filter = extensions
            .iter()
            .map(|ext| format!("*.{ext}"))
            .collect::<Vec<_>>()
            .join(", ");
        print!("{title} ({filter}): ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        let mut input = self.input.lock().unwrap_or_else(PoisonError::into_inner);
        if input.read_line(&mut line).ok()? == 0 {
            return None;
        }

        let raw = line.trim();
        if raw.is_empty() {
            return None;
        }
        let path = std::path::absolute(raw).ok()?;
        if path.is_file() {
            Some(path)
        } else {
            eprintln!("Not a file: {}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn returns_absolute_path_of_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("voice.onnx");
        std::fs::write(&model, b"onnx").unwrap();

        let picker = LinePicker::new(Cursor::new(format!("  {}  \n", model.display())));
        assert_eq!(picker.pick_file("Select", &["onnx"]), Some(model));
    }

    #[test]
    fn empty_line_or_eof_cancels() {
        assert_eq!(LinePicker::new(Cursor::new("\n")).pick_file("Select", &["onnx"]), None);
        assert_eq!(LinePicker::new(Cursor::new("")).pick_file("Select", &["onnx"]), None);
    }

    #[test]
    fn missing_file_cancels() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.onnx");
        let picker = LinePicker::new(Cursor::new(format!("{}\n", missing.display())));
        assert_eq!(picker.pick_file("Select", &["onnx"]), None);
    }
}
