use bytes::{Buf, BytesMut};

/// Text received from the transport that has not yet been resolved into
/// a complete frame.
///
/// Raw bytes are decoded incrementally: a multi-byte UTF-8 sequence split
/// across two network reads is held in `pending` until its tail arrives.
/// Invalid sequences become U+FFFD, the way a non-fatal `TextDecoder` does.
#[derive(Debug)]
pub struct ByteBuffer {
    text: String,
    pending: BytesMut,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self {
            text: String::with_capacity(8192),
            pending: BytesMut::new(),
        }
    }

    /// Append already-decoded text.
    ///
    /// A sequence left incomplete by an earlier [`push_bytes`](Self::push_bytes)
    /// can no longer be completed, so it is replaced first. Returns the
    /// number of replacement characters written.
    pub fn push_str(&mut self, chunk: &str) -> usize {
        let replaced = self.flush_pending();
        self.text.push_str(chunk);
        replaced
    }

    /// Append raw bytes, decoding as much UTF-8 as is complete.
    ///
    /// Each invalid sequence is replaced by U+FFFD and decoding carries on
    /// past it. Returns the number of replacements.
    pub fn push_bytes(&mut self, chunk: &[u8]) -> usize {
        self.pending.extend_from_slice(chunk);
        let mut replaced = 0;

        loop {
            let (valid, invalid_len) = match std::str::from_utf8(&self.pending) {
                Ok(_) => (self.pending.len(), None),
                Err(e) => (e.valid_up_to(), Some(e.error_len())),
            };

            self.text
                .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
            self.pending.advance(valid);

            match invalid_len {
                Some(Some(len)) => {
                    self.pending.advance(len);
                    self.text.push(char::REPLACEMENT_CHARACTER);
                    replaced += 1;
                }
                // Truncated sequence at the end: wait for the next read
                Some(None) | None => break,
            }
        }

        replaced
    }

    /// Replace a dangling partial sequence with U+FFFD
    fn flush_pending(&mut self) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        self.pending.clear();
        self.text.push(char::REPLACEMENT_CHARACTER);
        1
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Remove the first `n` bytes of decoded text
    pub fn consume(&mut self, n: usize) {
        if n >= self.text.len() {
            self.text.clear();
        } else if n > 0 {
            self.text.drain(..n);
        }
    }

    /// Decoded text length in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Bytes of an incomplete UTF-8 sequence still waiting for their tail
    pub fn pending_bytes(&self) -> usize {
        self.pending.remaining()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.pending.clear();
        if self.text.capacity() > 65536 {
            // 64KB max, reallocate if too large
            self.text = String::with_capacity(8192);
        }
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}
