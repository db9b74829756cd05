//! MTF header checksums.
//!
//! MTF protects descriptor block headers and stream headers with a 16-bit
//! word-wise XOR over the bytes preceding the checksum field:
//!
//! - **Descriptor block header**: 25 words (bytes 0..50), stored at byte 50
//! - **Stream header**: 10 words (bytes 0..20), stored at byte 20
//!
//! Words are little-endian. A trailing odd byte is treated as the low byte of
//! a final word.

/// Incremental XOR-of-words checksum.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordXor {
    value: u16,
    /// Low byte waiting for its partner when input arrived split mid-word.
    pending: Option<u8>,
}

impl WordXor {
    /// Create a new checksum with an initial value of zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the checksum of `data` in one shot.
    pub fn compute(data: &[u8]) -> u16 {
        let mut sum = Self::new();
        sum.update(data);
        sum.finalize()
    }

    /// Feed more bytes.
    pub fn update(&mut self, data: &[u8]) {
        let mut data = data;

        if let Some(low) = self.pending.take() {
            match data.split_first() {
                Some((&high, rest)) => {
                    self.value ^= u16::from_le_bytes([low, high]);
                    data = rest;
                }
                None => {
                    self.pending = Some(low);
                    return;
                }
            }
        }

        let mut words = data.chunks_exact(2);
        for word in &mut words {
            self.value ^= u16::from_le_bytes([word[0], word[1]]);
        }
        if let [odd] = words.remainder() {
            self.pending = Some(*odd);
        }
    }

    /// Current checksum value.
    pub fn finalize(&self) -> u16 {
        match self.pending {
            Some(low) => self.value ^ u16::from(low),
            None => self.value,
        }
    }

    /// Reset to the initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Verify a header whose checksum word immediately follows the covered bytes.
///
/// `header` must contain at least `covered + 2` bytes.
pub fn verify_header(header: &[u8], covered: usize) -> Option<(u16, u16)> {
    let stored_bytes = header.get(covered..covered + 2)?;
    let stored = u16::from_le_bytes([stored_bytes[0], stored_bytes[1]]);
    let computed = WordXor::compute(&header[..covered]);
    Some((stored, computed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(WordXor::compute(&[]), 0);
    }

    #[test]
    fn test_words() {
        // "TA" ^ "PE" as little-endian words
        let expected = u16::from_le_bytes(*b"TA") ^ u16::from_le_bytes(*b"PE");
        assert_eq!(WordXor::compute(b"TAPE"), expected);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let data: Vec<u8> = (0u8..=49).collect();
        let one_shot = WordXor::compute(&data);

        let mut sum = WordXor::new();
        sum.update(&data[..7]);
        sum.update(&data[7..8]);
        sum.update(&data[8..31]);
        sum.update(&data[31..]);
        assert_eq!(sum.finalize(), one_shot);

        sum.reset();
        assert_eq!(sum.finalize(), 0);
    }

    #[test]
    fn test_verify_header() {
        let mut header = vec![0x11u8, 0x22, 0x33, 0x44, 0, 0];
        let sum = WordXor::compute(&header[..4]);
        header[4..6].copy_from_slice(&sum.to_le_bytes());

        let (stored, computed) = verify_header(&header, 4).unwrap();
        assert_eq!(stored, computed);

        assert!(verify_header(&header, 5).is_none());
    }
}
