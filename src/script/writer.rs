//! In-memory script buffer

use std::fmt;

/// Accumulates the script text. Nothing reaches the output file until the
/// whole script has been rendered.
#[derive(Debug, Default)]
pub struct ScriptWriter {
    buf: String,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase banner
    pub fn phase(&mut self, number: u8, title: &str) {
        self.buf.push('\n');
        self.buf.push_str(&format!("-- Phase {}: {}\n", number, title));
    }

    /// One statement; the terminating `;` is added here
    pub fn statement(&mut self, sql: impl AsRef<str>) {
        self.buf.push_str(sql.as_ref());
        self.buf.push_str(";\n");
    }

    /// `--` comment; every line of `text` gets its own prefix so that no
    /// part of it can escape into the script as SQL.
    pub fn comment(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.buf.push_str("--\n");
            return;
        }
        for line in text.split(['\n', '\r']) {
            if line.is_empty() {
                self.buf.push_str("--\n");
            } else {
                self.buf.push_str("-- ");
                self.buf.push_str(line);
                self.buf.push('\n');
            }
        }
    }

    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

impl fmt::Write for ScriptWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}
