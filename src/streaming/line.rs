use super::Extraction;

pub const DEFAULT_PREFIX: &str = "data: ";

/// Splits buffered text into lines and selects those carrying the data
/// prefix. The trailing line without a terminator stays in the buffer.
#[derive(Debug)]
pub struct LineFramer {
    prefix: String,
    /// Bytes already searched for a newline, relative to the buffer
    scanned: usize,
}

impl LineFramer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            scanned: 0,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Extract payloads of every complete prefixed line.
    ///
    /// The caller must drop `consumed` bytes from the front of its buffer
    /// before the next call.
    pub fn extract(&mut self, text: &str) -> Extraction {
        let mut ex = Extraction::default();
        let mut line_start = 0;
        let mut search_from = self.scanned;

        while let Some(offset) = text[search_from..].find('\n') {
            let line_end = search_from + offset;
            self.select(text, line_start..line_end, &mut ex);
            line_start = line_end + 1;
            search_from = line_start;
        }

        ex.consumed = line_start;
        self.scanned = text.len() - line_start;
        ex
    }

    /// Treat whatever remains as a final terminated line
    pub fn flush(&mut self, text: &str) -> Extraction {
        let mut ex = self.extract(text);
        if ex.consumed < text.len() {
            self.select(text, ex.consumed..text.len(), &mut ex);
            ex.consumed = text.len();
        }
        self.scanned = 0;
        ex
    }

    pub fn reset(&mut self) {
        self.scanned = 0;
    }

    fn select(&self, text: &str, line: std::ops::Range<usize>, ex: &mut Extraction) {
        let raw = &text[line.clone()];
        let trimmed = raw.trim();

        if trimmed.starts_with(self.prefix.as_str()) {
            // Locate the trimmed line inside the buffer to keep offsets absolute
            let lead = raw.len() - raw.trim_start().len();
            let start = line.start + lead + self.prefix.len();
            let end = line.start + lead + trimmed.len();
            ex.frames.push(start..end);
        } else if !trimmed.is_empty() {
            ex.ignored_lines += 1;
        }
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
