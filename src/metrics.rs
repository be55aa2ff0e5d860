/// Counters collected by one decoder over the life of a stream.
///
/// Malformed frames never interrupt decoding, so these counters are the
/// only signal that a backend is emitting garbage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Number of `feed` calls
    pub chunks_fed: u64,

    /// Total input size in bytes
    pub bytes_fed: u64,

    /// Frames parsed and handed to the caller
    pub frames_emitted: u64,

    /// Complete frames that failed JSON parsing
    pub malformed_frames: u64,

    /// Non-empty lines without the data prefix (line mode only)
    pub ignored_lines: u64,

    /// Unresolved bytes thrown away at stream end or on overflow
    pub residue_discarded: u64,

    /// Times the buffer ceiling was hit
    pub buffer_overflows: u64,

    /// Invalid UTF-8 sequences replaced with U+FFFD
    pub invalid_utf8: u64,
}

impl DecodeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_chunk(&mut self, len: usize) {
        self.chunks_fed += 1;
        self.bytes_fed += len as u64;
    }

    /// Complete frames seen, valid or not
    pub fn frames_seen(&self) -> u64 {
        self.frames_emitted + self.malformed_frames
    }

    /// Share of complete frames that failed to parse, as a percentage
    pub fn malformed_rate(&self) -> f64 {
        let seen = self.frames_seen();
        if seen > 0 {
            (self.malformed_frames as f64 / seen as f64) * 100.0
        } else {
            0.0
        }
    }
}

impl std::fmt::Display for DecodeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Decode stats: {} chunks ({} bytes), {} events, {} malformed ({:.1}%), {} ignored lines, {} bytes discarded, {} overflows, {} invalid UTF-8",
            self.chunks_fed,
            self.bytes_fed,
            self.frames_emitted,
            self.malformed_frames,
            self.malformed_rate(),
            self.ignored_lines,
            self.residue_discarded,
            self.buffer_overflows,
            self.invalid_utf8
        )
    }
}
