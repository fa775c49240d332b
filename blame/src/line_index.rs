//! C2: byte-offset index over the target blob, giving `O(1)` access to the
//! raw content of any line.

/// A line index over a single blob's content.
///
/// Lines are addressed 0-based internally (line `k` is `offsets[k]..offsets[k+1]`,
/// minus a trailing `\n`); [`crate::Hunk`] converts to the 1-based numbering
/// spec.md §3 specifies at the public API boundary.
#[derive(Debug)]
pub(crate) struct LineIndex {
    blob: Vec<u8>,
    /// `offsets[k]` is the byte where line `k` starts; the final entry is the
    /// blob length (the sentinel spec.md §4.2 describes).
    offsets: Vec<usize>,
}

impl LineIndex {
    pub fn new(blob: Vec<u8>) -> Self {
        let mut offsets = vec![0usize];
        for (i, &b) in blob.iter().enumerate() {
            if b == b'\n' {
                offsets.push(i + 1);
            }
        }
        if blob.is_empty() {
            return Self { blob, offsets: vec![] };
        }
        if *offsets.last().unwrap() != blob.len() {
            offsets.push(blob.len());
        }
        Self { blob, offsets }
    }

    pub fn line_count(&self) -> u32 {
        self.offsets.len().saturating_sub(1) as u32
    }

    /// The raw bytes of 0-based line `n`, without its trailing newline.
    pub fn raw_line(&self, n: u32) -> &[u8] {
        let n = n as usize;
        let start = self.offsets[n];
        let mut end = self.offsets[n + 1];
        if end > start && self.blob[end - 1] == b'\n' {
            end -= 1;
        }
        &self.blob[start..end]
    }

}
