//! UTF-8 decoding for byte-oriented input
//!
//! Handles streaming UTF-8 decoding: a multi-byte character split across
//! chunks is held back until its remaining bytes arrive, and invalid
//! sequences decode to U+FFFD.

/// Replacement character emitted for invalid sequences
pub const REPLACEMENT: char = '\u{FFFD}';

/// Streaming UTF-8 decoder state
#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    /// Bytes of an incomplete trailing character
    buffer: [u8; 4],
    /// Number of bytes in buffer
    len: usize,
}

impl Utf8Decoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the decoder state
    pub fn reset(&mut self) {
        self.len = 0;
    }

    /// Check if decoder is in the middle of a sequence
    pub fn is_pending(&self) -> bool {
        self.len > 0
    }

    /// Decode a chunk, appending the text to `out`
    pub fn decode(&mut self, mut bytes: &[u8], out: &mut String) {
        // Complete a character left over from the previous chunk
        while self.len > 0 && !bytes.is_empty() {
            self.buffer[self.len] = bytes[0];
            self.len += 1;
            bytes = &bytes[1..];

            match std::str::from_utf8(&self.buffer[..self.len]) {
                Ok(s) => {
                    out.push_str(s);
                    self.len = 0;
                }
                Err(e) if e.error_len().is_none() => {}
                Err(e) => {
                    // The held bytes can never start a valid character
                    let bad = e.error_len().unwrap_or(1);
                    out.push(REPLACEMENT);
                    let rest = self.len - bad;
                    let mut held = [0u8; 4];
                    held[..rest].copy_from_slice(&self.buffer[bad..self.len]);
                    self.len = 0;
                    let mut retry = String::new();
                    self.decode_fresh(&held[..rest], &mut retry);
                    out.push_str(&retry);
                }
            }
        }

        self.decode_fresh(bytes, out);
    }

    /// Decode with no held bytes at entry
    fn decode_fresh(&mut self, mut bytes: &[u8], out: &mut String) {
        loop {
            match std::str::from_utf8(bytes) {
                Ok(s) => {
                    out.push_str(s);
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // valid_up_to is a char boundary
                    if let Ok(s) = std::str::from_utf8(&bytes[..valid]) {
                        out.push_str(s);
                    }
                    match e.error_len() {
                        Some(bad) => {
                            out.push(REPLACEMENT);
                            bytes = &bytes[valid + bad..];
                        }
                        None => {
                            let tail = &bytes[valid..];
                            self.buffer[..tail.len()].copy_from_slice(tail);
                            self.len = tail.len();
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Flush an incomplete character at end of stream
    pub fn finish(&mut self, out: &mut String) {
        if self.len > 0 {
            out.push(REPLACEMENT);
            self.len = 0;
        }
    }
}
