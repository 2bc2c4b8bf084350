//! CRC32 (IEEE) checksum over the stored bundle payload

use crc32fast::Hasher;

pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn verify_checksum(data: &[u8], expected: u32) -> bool {
    compute_checksum(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_detects_bit_flip() {
        let mut data = b"column payload".to_vec();
        let original = compute_checksum(&data);
        data[3] ^= 0x01;
        assert!(!verify_checksum(&data, original));
    }

    #[test]
    fn test_checksum_deterministic() {
        assert_eq!(compute_checksum(b"abc"), compute_checksum(b"abc"));
    }
}
