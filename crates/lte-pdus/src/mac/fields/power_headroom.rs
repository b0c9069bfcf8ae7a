use lte_core::{BitBuffer, PduParseErr, let_field};

/// Lowest reportable headroom in dB, maps to index 0
pub const PHR_MIN_DB: i8 = -23;
/// Highest reportable headroom in dB
pub const PHR_MAX_DB: i8 = 40;

/// Quantizes a power headroom in dB to the 6-bit report index.
/// Values are clamped to the reportable range, then floored.
pub fn power_headroom_to_index(db: f32) -> u8 {
    let clamped = db.clamp(PHR_MIN_DB as f32, PHR_MAX_DB as f32);
    (clamped - PHR_MIN_DB as f32).floor() as u8
}

pub fn index_to_power_headroom(index: u8) -> i8 {
    (index & 0x3f) as i8 + PHR_MIN_DB
}

/// One per-cell entry of an Extended Power Headroom MAC CE, 36.321 6.1.3.6a
///
/// Cell 0 is the PCell. When `pcmax` is present the entry is sent with V=0 followed by
/// the P_CMAX,c octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtPhrEntry {
    /// 0 for the PCell, 1..=7 for SCells
    pub cell: u8,
    /// Power backoff due to power management
    pub p_bit: bool,
    /// 6-bit power headroom level
    pub ph_index: u8,
    /// 6-bit P_CMAX,c level
    pub pcmax: Option<u8>,
}

impl ExtPhrEntry {
    pub fn new(cell: u8, ph_index: u8) -> Self {
        Self { cell, p_bit: false, ph_index: ph_index & 0x3f, pcmax: None }
    }

    pub fn ph_db(&self) -> i8 {
        index_to_power_headroom(self.ph_index)
    }

    pub fn encoded_len(&self) -> usize {
        if self.pcmax.is_some() { 2 } else { 1 }
    }

    pub fn from_bitbuf(cell: u8, buffer: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let_field!(buffer, p_bit, 1);
        let_field!(buffer, v_bit, 1);
        let_field!(buffer, ph_index, 6);
        let pcmax = if v_bit == 0 {
            buffer.read_field(2, "reserved")?;
            Some(buffer.read_field(6, "pcmax")? as u8)
        } else {
            None
        };
        Ok(ExtPhrEntry { cell, p_bit: p_bit == 1, ph_index: ph_index as u8, pcmax })
    }

    pub fn to_bitbuf(&self, buffer: &mut BitBuffer) {
        buffer.write_bit(self.p_bit as u8);
        buffer.write_bit(self.pcmax.is_none() as u8);
        buffer.write_bits((self.ph_index & 0x3f) as u64, 6);
        if let Some(pcmax) = self.pcmax {
            buffer.write_bits(0, 2);
            buffer.write_bits((pcmax & 0x3f) as u64, 6);
        }
    }
}

impl core::fmt::Display for ExtPhrEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "cell {}: PH {} dB", self.cell, self.ph_db())?;
        if self.p_bit {
            write!(f, " P")?;
        }
        if let Some(pcmax) = self.pcmax {
            write!(f, " Pcmax {}", pcmax)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize() {
        assert_eq!(power_headroom_to_index(-30.0), 0);
        assert_eq!(power_headroom_to_index(-23.0), 0);
        assert_eq!(power_headroom_to_index(-2.0), 21);
        assert_eq!(power_headroom_to_index(3.7), 26);
        assert_eq!(power_headroom_to_index(40.0), 63);
        assert_eq!(power_headroom_to_index(90.0), 63);
        assert_eq!(index_to_power_headroom(21), -2);
        assert_eq!(index_to_power_headroom(63), 40);
    }

    #[test]
    fn test_ext_phr_entry_with_pcmax() {
        let entry = ExtPhrEntry { cell: 2, p_bit: true, ph_index: 10, pcmax: Some(33) };
        let mut buf = BitBuffer::new(16);
        entry.to_bitbuf(&mut buf);
        assert_eq!(buf.dump_octets(), "8a 21");
        buf.seek(0);
        assert_eq!(ExtPhrEntry::from_bitbuf(2, &mut buf).unwrap(), entry);
    }
}
