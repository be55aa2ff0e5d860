use std::ops::Range;

use super::Extraction;

/// Locates balanced `{ ... }` spans embedded in free text.
///
/// Scan state survives between calls, so bytes are examined exactly once
/// no matter how the transport splits them. Quotes and escapes are only
/// tracked inside an object; text between objects is noise.
#[derive(Debug, Default)]
pub struct BraceScanner {
    depth: usize,
    in_string: bool,
    escape_next: bool,
    /// Start of the object currently open, relative to the buffer
    frame_start: Option<usize>,
    /// Resume position, relative to the buffer
    pos: usize,
}

impl BraceScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the unscanned tail of `text` and return every closed span.
    ///
    /// The caller must drop `consumed` bytes from the front of its buffer
    /// before the next call; the scanner rebases its markers accordingly.
    pub fn extract(&mut self, text: &str) -> Extraction {
        let bytes = text.as_bytes();
        let mut frames: Vec<Range<usize>> = Vec::new();

        for (i, &byte) in bytes.iter().enumerate().skip(self.pos) {
            if self.depth == 0 {
                if byte == b'{' {
                    self.depth = 1;
                    self.frame_start = Some(i);
                }
                continue;
            }

            if self.in_string {
                if self.escape_next {
                    self.escape_next = false;
                } else {
                    match byte {
                        b'\\' => self.escape_next = true,
                        b'"' => self.in_string = false,
                        _ => {}
                    }
                }
                continue;
            }

            match byte {
                b'"' => self.in_string = true,
                b'{' => self.depth += 1,
                b'}' => {
                    self.depth -= 1;
                    if self.depth == 0
                        && let Some(start) = self.frame_start.take()
                    {
                        frames.push(start..i + 1);
                    }
                }
                _ => {}
            }
        }

        // Everything scanned is resolved except an object still open
        let consumed = self.frame_start.unwrap_or(bytes.len());
        self.pos = bytes.len() - consumed;
        if let Some(start) = self.frame_start.as_mut() {
            *start -= consumed;
        }

        Extraction {
            frames,
            consumed,
            ignored_lines: 0,
        }
    }

    /// Whether an object has been opened but not yet closed
    pub fn in_frame(&self) -> bool {
        self.frame_start.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
