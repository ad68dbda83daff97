// src/exec/output.rs

//! Decoding and size-capping of captured output.

/// Appended to each stream that was cut by [`cap_output`].
pub const TRUNCATION_MARKER: &str = "\n[OUTPUT TRUNCATED]";

/// Decode bytes as UTF-8, replacing invalid sequences with U+FFFD.
pub fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// The retained prefix of one output stream plus how many bytes the stream
/// produced in total.
///
/// Readers keep at most the output budget per stream, so a chatty command
/// cannot grow memory without bound, while `total_len` still drives the
/// proportional split.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamCapture {
    pub bytes: Vec<u8>,
    pub total_len: usize,
}

impl StreamCapture {
    /// A stream that was captured in full.
    pub fn complete(bytes: Vec<u8>) -> Self {
        let total_len = bytes.len();
        Self { bytes, total_len }
    }

    /// Bytes were dropped while reading.
    pub fn is_clipped(&self) -> bool {
        self.total_len > self.bytes.len()
    }
}

/// Output after the size cap has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CappedOutput {
    pub stdout: String,
    pub stderr: String,
    pub truncated: bool,
}

/// Split a byte budget between two streams in proportion to their sizes.
///
/// `stdout_limit = floor(max * stdout_len / total)` and stderr gets the
/// rest, so the two limits always add up to `max`.
pub fn split_limits(stdout_len: usize, stderr_len: usize, max: usize) -> (usize, usize) {
    let total = stdout_len as u128 + stderr_len as u128;
    if total == 0 {
        return (max, 0);
    }
    let stdout_limit = (max as u128 * stdout_len as u128 / total) as usize;
    (stdout_limit, max - stdout_limit)
}

/// Cap `stdout.len() + stderr.len()` at `max` bytes, cutting both streams
/// proportionally to their share of the total.
pub fn cap_output(stdout: String, stderr: String, max: usize) -> CappedOutput {
    let total = stdout.len() + stderr.len();
    if total <= max {
        return CappedOutput {
            stdout,
            stderr,
            truncated: false,
        };
    }

    let (stdout_limit, stderr_limit) = split_limits(stdout.len(), stderr.len(), max);
    CappedOutput {
        stdout: truncate_with_marker(stdout, stdout_limit),
        stderr: truncate_with_marker(stderr, stderr_limit),
        truncated: true,
    }
}

/// Decode and cap two captured streams.
///
/// Fully captured streams go through [`cap_output`] on their decoded text.
/// When a reader had to drop bytes, the split uses the streams' total
/// lengths, and every stream that lost bytes is marked.
pub fn cap_captured(stdout: &StreamCapture, stderr: &StreamCapture, max: usize) -> CappedOutput {
    let stdout_text = decode_lossy(&stdout.bytes);
    let stderr_text = decode_lossy(&stderr.bytes);
    if !stdout.is_clipped() && !stderr.is_clipped() {
        return cap_output(stdout_text, stderr_text, max);
    }

    let (stdout_limit, stderr_limit) = split_limits(stdout.total_len, stderr.total_len, max);
    CappedOutput {
        stdout: clip(stdout_text, stdout_limit, stdout.total_len > stdout_limit),
        stderr: clip(stderr_text, stderr_limit, stderr.total_len > stderr_limit),
        truncated: true,
    }
}

/// Cut `s` to at most `limit` bytes (backing off to a char boundary) and
/// append the marker. Strings already within the limit are left alone.
fn truncate_with_marker(s: String, limit: usize) -> String {
    let lost_bytes = s.len() > limit;
    clip(s, limit, lost_bytes)
}

/// Like [`truncate_with_marker`], with the caller deciding whether the
/// stream lost bytes.
fn clip(mut s: String, limit: usize, lost_bytes: bool) -> String {
    if !lost_bytes && s.len() <= limit {
        return s;
    }
    let mut cut = limit.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
    s.push_str(TRUNCATION_MARKER);
    s
}
