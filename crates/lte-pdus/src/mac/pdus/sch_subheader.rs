use core::fmt;

use lte_core::{BitBuffer, Direction, PduParseErr, let_field};

use crate::mac::enums::lcid::Lcid;

/// Largest payload a 7-bit L field can announce
pub const MAX_L7_LEN: usize = 127;
/// Largest payload a 15-bit L field can announce
pub const MAX_L15_LEN: usize = 0x7fff;

/// Subheader size for a length-carrying entity of `len` bytes that is not last in the header
pub fn size_header_sdu(len: usize) -> usize {
    if len <= MAX_L7_LEN { 2 } else { 3 }
}

/// MAC subheader for DL-SCH, UL-SCH and MCH, 36.321 6.1.2
/// R/R/E/LCID, optionally followed by F/L(7) or F/L(15)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchSubheader {
    pub lcid: Lcid,
    /// Another subheader follows
    pub e_bit: bool,
    /// Payload length. Only present on non-last SDU and variable-length CE subheaders.
    pub length: Option<usize>,
}

impl SchSubheader {
    pub fn new(lcid: Lcid, is_last: bool, payload_len: usize) -> Self {
        let length = if !is_last && lcid.has_length_field() { Some(payload_len) } else { None };
        Self { lcid, e_bit: !is_last, length }
    }

    pub fn size(&self) -> usize {
        match self.length {
            Some(len) => size_header_sdu(len),
            None => 1,
        }
    }

    pub fn from_bitbuf(buffer: &mut BitBuffer, direction: Direction) -> Result<Self, PduParseErr> {
        buffer.read_field(2, "reserved")?;
        let_field!(buffer, e_bit, 1);
        let_field!(buffer, lcid, 5);
        let lcid = Lcid::from_raw(direction, lcid)?;

        let length = if e_bit == 1 && lcid.has_length_field() {
            let_field!(buffer, f_bit, 1);
            let bits = if f_bit == 1 { 15 } else { 7 };
            Some(buffer.read_field(bits, "length")? as usize)
        } else {
            None
        };

        Ok(SchSubheader { lcid, e_bit: e_bit == 1, length })
    }

    /// Panics if a length does not fit 15 bits. `SchPdu` never commits such a sub-PDU.
    pub fn to_bitbuf(&self, buffer: &mut BitBuffer) {
        buffer.write_bits(0, 2);
        buffer.write_bit(self.e_bit as u8);
        buffer.write_bits(self.lcid.into_raw() as u64 & 0x1f, 5);
        if let Some(len) = self.length {
            if len <= MAX_L7_LEN {
                buffer.write_bit(0);
                buffer.write_bits(len as u64, 7);
            } else {
                buffer.write_bit(1);
                buffer.write_bits(len as u64, 15);
            }
        }
    }
}

impl fmt::Display for SchSubheader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lcid: {} e: {}", self.lcid, self.e_bit as u8)?;
        if let Some(len) = self.length {
            write!(f, " l: {}", len)?;
        }
        Ok(())
    }
}
