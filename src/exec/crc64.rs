//! CRC-64 checksum used as class identifier.
//!
//! Reversed ISO polynomial, zero initial value, no final xor. Execution data
//! records carry this checksum of the class file bytes, which lets us join
//! compiled classes against recorded probes.

const POLY64REV: u64 = 0xd800_0000_0000_0000;

const LOOKUP_TABLE: [u64; 256] = build_table();

const fn build_table() -> [u64; 256] {
    let mut table = [0u64; 256];
    let mut i = 0;
    while i < 256 {
        let mut v = i as u64;
        let mut j = 0;
        while j < 8 {
            if v & 1 == 1 {
                v = (v >> 1) ^ POLY64REV;
            } else {
                v >>= 1;
            }
            j += 1;
        }
        table[i] = v;
        i += 1;
    }
    table
}

fn update(sum: u64, byte: u8) -> u64 {
    let lookup = LOOKUP_TABLE[((byte as u64 ^ sum) & 0xff) as usize];
    (sum >> 8) ^ lookup
}

/// Checksum of a byte slice
pub fn checksum(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |sum, &b| update(sum, b))
}

/// Class identifier for raw class file bytes
///
/// Class files with major version 53 (Java 9) are checksummed as if they
/// were version 52, matching how early Java 9 classes were instrumented.
pub fn class_id(bytes: &[u8]) -> u64 {
    if bytes.len() > 7 && bytes[6] == 0x00 && bytes[7] == 53 {
        let mut sum = 0;
        for (i, &b) in bytes.iter().enumerate() {
            sum = update(sum, if i == 7 { 52 } else { b });
        }
        return sum;
    }
    checksum(bytes)
}
