use std::fmt;

use crate::pdu_parse_error::PduParseErr;

/// MSB-first bit cursor over a fixed-size byte vector.
/// MAC subheaders and control elements are read and written through this type.
pub struct BitBuffer {
    buffer: Vec<u8>,
    pos: usize,  // next bit offset for read/write
    len: usize,  // bits at or after this are out of bounds
}

impl BitBuffer {
    /// Create a zeroed buffer holding exactly `len_bits` bits.
    pub fn new(len_bits: usize) -> Self {
        BitBuffer { buffer: vec![0; len_bits.div_ceil(8)], pos: 0, len: len_bits }
    }

    /// Take ownership of a byte vector, all of it readable.
    pub fn from_vec(data: Vec<u8>) -> Self {
        let len = data.len() * 8;
        BitBuffer { buffer: data, pos: 0, len }
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_vec(data.to_vec())
    }

    /// Parse a hex string such as `"21 08 1f"` or `"21081f"`. Whitespace, `:` and `-` separators
    /// are skipped, an optional `0x` prefix is accepted.
    pub fn from_hexstr(hexstr: &str) -> Result<Self, PduParseErr> {
        let trimmed = hexstr.trim();
        let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let digits: Vec<u8> = trimmed
            .bytes()
            .filter(|c| !c.is_ascii_whitespace() && *c != b':' && *c != b'-')
            .collect();
        if digits.len() % 2 != 0 {
            return Err(PduParseErr::InconsistentLength { expected: digits.len() + 1, found: digits.len() });
        }

        let mut bytes = Vec::with_capacity(digits.len() / 2);
        for pair in digits.chunks(2) {
            bytes.push(hex_nibble(pair[0])? << 4 | hex_nibble(pair[1])?);
        }
        Ok(Self::from_vec(bytes))
    }

    /// Peek `num_bits` at the current pos without advancing.
    /// None if fewer bits remain or `num_bits > 64`.
    pub fn peek_bits(&self, num_bits: usize) -> Option<u64> {
        if num_bits > 64 || self.pos + num_bits > self.len {
            return None;
        }
        Some(self.bits_at(self.pos, num_bits))
    }

    pub fn read_bits(&mut self, num_bits: usize) -> Option<u64> {
        let v = self.peek_bits(num_bits)?;
        self.pos += num_bits;
        Some(v)
    }

    /// Like `read_bits`, but running out of bits is a `BufferEnded` error naming `field`.
    pub fn read_field(&mut self, num_bits: usize, field: &'static str) -> Result<u64, PduParseErr> {
        self.read_bits(num_bits).ok_or(PduParseErr::BufferEnded { field: Some(field) })
    }

    pub fn write_bit(&mut self, value: u8) {
        assert!(value <= 1, "write_bit: value must be 0 or 1");
        self.write_bits(value as u64, 1);
    }

    /// Write up to 64 bits at pos, advancing it. Panics past the end of the buffer:
    /// every writer in this workspace sizes its buffer before writing.
    pub fn write_bits(&mut self, value: u64, num_bits: usize) {
        assert!(num_bits <= 64, "can only write up to 64 bits");
        assert!(num_bits == 64 || value >> num_bits == 0, "value exceeds num_bits {} {}", value, num_bits);
        if self.pos + num_bits > self.len {
            panic!("write would exceed buffer end");
        }

        for i in 0..num_bits {
            let bit = ((value >> (num_bits - 1 - i)) & 1) as u8;
            let abs = self.pos + i;
            let shift = 7 - (abs % 8);
            let byte = &mut self.buffer[abs / 8];
            *byte = (*byte & !(1 << shift)) | (bit << shift);
        }
        self.pos += num_bits;
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Length in bits
    pub fn get_len(&self) -> usize {
        self.len
    }

    /// Length in whole octets
    pub fn get_len_bytes(&self) -> usize {
        self.len / 8
    }

    /// Bits left between pos and the end
    pub fn get_len_remaining(&self) -> usize {
        self.len - self.pos
    }

    pub fn get_pos(&self) -> usize {
        self.pos
    }

    /// Current position in whole octets. Rounds down.
    pub fn get_pos_bytes(&self) -> usize {
        self.pos / 8
    }

    pub fn seek(&mut self, offset: usize) {
        assert!(offset <= self.len, "seek out of range: got {}, len {}", offset, self.len);
        self.pos = offset;
    }

    /// Uppercase hex without separators. A trailing partial nibble is zero-padded on the right.
    pub fn dump_hex(&self) -> String {
        let mut s = String::with_capacity(self.len.div_ceil(4));
        for nibble_start in (0..self.len).step_by(4) {
            let take = usize::min(4, self.len - nibble_start);
            let digit = (self.bits_at(nibble_start, take) as u8) << (4 - take);
            s.push_str(&format!("{:X}", digit));
        }
        s
    }

    /// Lowercase octets separated by spaces, e.g. `21 08 1f`. Trailing bits short of an octet are omitted.
    pub fn dump_octets(&self) -> String {
        self.buffer[..self.get_len_bytes()].iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ")
    }

    /// Caller guarantees `num_bits <= 64` and `bit_pos + num_bits <= len`.
    fn bits_at(&self, bit_pos: usize, num_bits: usize) -> u64 {
        (bit_pos..bit_pos + num_bits).fold(0u64, |acc, abs| {
            (acc << 1) | ((self.buffer[abs / 8] >> (7 - (abs % 8))) & 1) as u64
        })
    }
}

fn hex_nibble(c: u8) -> Result<u8, PduParseErr> {
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'a'..=b'f' => Ok(c - b'a' + 10),
        b'A'..=b'F' => Ok(c - b'A' + 10),
        _ => Err(PduParseErr::InvalidValue { field: "hex_digit", value: c as u64 }),
    }
}

impl fmt::Debug for BitBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitBuffer {{ ^{} len {} {} }}", self.pos, self.len, self.dump_hex())
    }
}
