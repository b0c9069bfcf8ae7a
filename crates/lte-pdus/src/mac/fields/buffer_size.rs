//! Buffer size levels for BSR, 36.321 Table 6.1.3.1-1

/// Number of buffer size levels addressable by the 6-bit index
pub const BSR_LEVELS: usize = 64;

/// Largest byte count with its own level. Anything above maps to the last index.
pub const BSR_MAX_BYTES: u32 = 150_000;

/// Upper edge in bytes of every level. The last level is unbounded.
pub static BUFFER_SIZE_TABLE: [u32; BSR_LEVELS] = [
    0, 10, 12, 14, 17, 19, 22, 26, 31, 36, 42, 49, 57, 67, 78, 91,
    107, 125, 146, 171, 200, 234, 274, 321, 376, 440, 515, 603, 706, 826, 967, 1132,
    1326, 1552, 1817, 2127, 2490, 2915, 3413, 3995, 4677, 5476, 6411, 7505, 8787, 10287, 12043, 14099,
    16507, 19325, 22624, 26487, 31009, 36304, 42502, 49759, 58255, 68201, 79846, 93479, 109439, 128125,
    BSR_MAX_BYTES, u32::MAX,
];

/// Quantizes a buffer occupancy to its 6-bit level.
///
/// Index 0 is reserved for an empty buffer. Any other value maps to the smallest level
/// whose upper edge is not below it.
pub fn buffer_size_to_index(bytes: u32) -> u8 {
    BUFFER_SIZE_TABLE[..BSR_LEVELS - 1].partition_point(|&edge| edge < bytes) as u8
}

/// Expands a level back to the upper edge of its byte range
pub fn index_to_upper_edge(index: u8) -> u32 {
    BUFFER_SIZE_TABLE[(index as usize).min(BSR_LEVELS - 1)]
}
