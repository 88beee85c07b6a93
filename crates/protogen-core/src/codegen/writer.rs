//! Line-oriented output sink with indentation tracking.

use std::fmt::{self, Write};

/// Indenting writer over any [`fmt::Write`].
///
/// `CodeWriter` itself implements [`fmt::Write`], so backends emit text with
/// `write!` and `writeln!`. The indent string is written before the first
/// character of every non-empty line; blank lines stay empty.
pub struct CodeWriter<'a> {
    inner: &'a mut dyn Write,
    indent_str: &'a str,
    indent_level: usize,
    at_line_start: bool,
}

impl<'a> CodeWriter<'a> {
    /// Wraps `inner`, indenting nested scopes with `indent_str`
    pub fn new(inner: &'a mut dyn Write, indent_str: &'a str) -> Self {
        Self {
            inner,
            indent_str,
            indent_level: 0,
            at_line_start: true,
        }
    }

    /// Opens a nested scope
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Closes a nested scope
    pub fn outdent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    fn write_indent(&mut self) -> fmt::Result {
        for _ in 0..self.indent_level {
            self.inner.write_str(self.indent_str)?;
        }
        Ok(())
    }
}

impl Write for CodeWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut lines = s.split('\n').peekable();
        while let Some(line) = lines.next() {
            if !line.is_empty() {
                if self.at_line_start {
                    self.write_indent()?;
                    self.at_line_start = false;
                }
                self.inner.write_str(line)?;
            }
            if lines.peek().is_some() {
                self.inner.write_char('\n')?;
                self.at_line_start = true;
            }
        }
        Ok(())
    }
}
