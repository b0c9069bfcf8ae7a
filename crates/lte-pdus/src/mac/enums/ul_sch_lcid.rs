/// 36.321 Table 6.2.1-2 Values of LCID for UL-SCH
/// Bits: 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UlSchLcid {
    /// 0 is CCCH, up to 17 accepted as SDU
    Sdu(u8),
    /// Extended Power Headroom Report, 25. Variable length.
    PhrExt,
    /// Power Headroom Report, 26
    Phr,
    Crnti,
    TruncBsr,
    ShortBsr,
    LongBsr,
    Padding,
}

impl UlSchLcid {
    pub const CCCH: u8 = 0b00000;
    pub const MAX_SDU: u8 = 0b10001;

    pub fn into_raw(self) -> u64 {
        match self {
            UlSchLcid::Sdu(v) => v as u64,
            UlSchLcid::PhrExt => 0b11001,
            UlSchLcid::Phr => 0b11010,
            UlSchLcid::Crnti => 0b11011,
            UlSchLcid::TruncBsr => 0b11100,
            UlSchLcid::ShortBsr => 0b11101,
            UlSchLcid::LongBsr => 0b11110,
            UlSchLcid::Padding => 0b11111,
        }
    }

    pub fn is_sdu(&self) -> bool {
        matches!(self, UlSchLcid::Sdu(_))
    }

    pub fn is_mac_ce(&self) -> bool {
        !self.is_sdu() && *self != UlSchLcid::Padding
    }

    pub fn is_var_len_ce(&self) -> bool {
        *self == UlSchLcid::PhrExt
    }

    /// Payload size of a fixed-size control element, in bytes.
    /// Zero for SDUs, padding and the variable-length extended PHR.
    pub fn ce_size(&self) -> usize {
        match self {
            UlSchLcid::Phr => 1,
            UlSchLcid::Crnti => 2,
            UlSchLcid::TruncBsr => 1,
            UlSchLcid::ShortBsr => 1,
            UlSchLcid::LongBsr => 3,
            UlSchLcid::Sdu(_) | UlSchLcid::PhrExt | UlSchLcid::Padding => 0,
        }
    }
}

impl std::convert::TryFrom<u64> for UlSchLcid {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0..=0b10001 => Ok(UlSchLcid::Sdu(x as u8)),
            0b11001 => Ok(UlSchLcid::PhrExt),
            0b11010 => Ok(UlSchLcid::Phr),
            0b11011 => Ok(UlSchLcid::Crnti),
            0b11100 => Ok(UlSchLcid::TruncBsr),
            0b11101 => Ok(UlSchLcid::ShortBsr),
            0b11110 => Ok(UlSchLcid::LongBsr),
            0b11111 => Ok(UlSchLcid::Padding),
            _ => Err(()),
        }
    }
}

impl From<UlSchLcid> for u64 {
    fn from(e: UlSchLcid) -> Self { e.into_raw() }
}

impl core::fmt::Display for UlSchLcid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UlSchLcid::Sdu(0) => write!(f, "CCCH"),
            UlSchLcid::Sdu(v) => write!(f, "LCID {}", v),
            UlSchLcid::PhrExt => write!(f, "Extended Power Headroom Report"),
            UlSchLcid::Phr => write!(f, "Power Headroom Report"),
            UlSchLcid::Crnti => write!(f, "C-RNTI"),
            UlSchLcid::TruncBsr => write!(f, "Truncated BSR"),
            UlSchLcid::ShortBsr => write!(f, "Short BSR"),
            UlSchLcid::LongBsr => write!(f, "Long BSR"),
            UlSchLcid::Padding => write!(f, "Padding"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        for raw in 0..32u64 {
            match UlSchLcid::try_from(raw) {
                Ok(lcid) => assert_eq!(lcid.into_raw(), raw),
                Err(()) => assert!(matches!(raw, 18..=24), "raw {} should be valid", raw),
            }
        }
        assert_eq!(UlSchLcid::try_from(0b11101), Ok(UlSchLcid::ShortBsr));
        assert_eq!(UlSchLcid::LongBsr.ce_size(), 3);
        assert!(UlSchLcid::PhrExt.is_var_len_ce());
    }
}
