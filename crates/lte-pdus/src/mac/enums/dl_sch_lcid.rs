/// 36.321 Table 6.2.1-1 Values of LCID for DL-SCH
/// Bits: 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DlSchLcid {
    /// 0 is CCCH, 1..=10 carry logical channels, up to 17 accepted as SDU
    Sdu(u8),
    /// Activation/Deactivation with four octets, 24
    ScellActivation4Octet,
    /// Activation/Deactivation with one octet, 27
    ScellActivation,
    /// UE Contention Resolution Identity, 28
    ConResId,
    /// Timing Advance Command, 29
    TaCmd,
    /// DRX Command, 30
    DrxCmd,
    Padding,
}

impl DlSchLcid {
    pub const CCCH: u8 = 0b00000;
    pub const MAX_SDU: u8 = 0b10001;

    /// Convert this enum back into the raw integer value
    pub fn into_raw(self) -> u64 {
        match self {
            DlSchLcid::Sdu(v) => v as u64,
            DlSchLcid::ScellActivation4Octet => 0b11000,
            DlSchLcid::ScellActivation => 0b11011,
            DlSchLcid::ConResId => 0b11100,
            DlSchLcid::TaCmd => 0b11101,
            DlSchLcid::DrxCmd => 0b11110,
            DlSchLcid::Padding => 0b11111,
        }
    }

    pub fn is_sdu(&self) -> bool {
        matches!(self, DlSchLcid::Sdu(_))
    }

    pub fn is_mac_ce(&self) -> bool {
        !self.is_sdu() && *self != DlSchLcid::Padding
    }

    /// Payload size of a control element, in bytes. Zero for SDUs and padding.
    pub fn ce_size(&self) -> usize {
        match self {
            DlSchLcid::ScellActivation4Octet => 4,
            DlSchLcid::ScellActivation => 1,
            DlSchLcid::ConResId => 6,
            DlSchLcid::TaCmd => 1,
            DlSchLcid::DrxCmd => 0,
            DlSchLcid::Sdu(_) | DlSchLcid::Padding => 0,
        }
    }
}

impl std::convert::TryFrom<u64> for DlSchLcid {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0..=0b10001 => Ok(DlSchLcid::Sdu(x as u8)),
            0b11000 => Ok(DlSchLcid::ScellActivation4Octet),
            0b11011 => Ok(DlSchLcid::ScellActivation),
            0b11100 => Ok(DlSchLcid::ConResId),
            0b11101 => Ok(DlSchLcid::TaCmd),
            0b11110 => Ok(DlSchLcid::DrxCmd),
            0b11111 => Ok(DlSchLcid::Padding),
            _ => Err(()),
        }
    }
}

impl From<DlSchLcid> for u64 {
    fn from(e: DlSchLcid) -> Self { e.into_raw() }
}

impl core::fmt::Display for DlSchLcid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DlSchLcid::Sdu(0) => write!(f, "CCCH"),
            DlSchLcid::Sdu(v) => write!(f, "LCID {}", v),
            DlSchLcid::ScellActivation4Octet => write!(f, "SCell Activation (4 octet)"),
            DlSchLcid::ScellActivation => write!(f, "SCell Activation"),
            DlSchLcid::ConResId => write!(f, "Contention Resolution ID"),
            DlSchLcid::TaCmd => write!(f, "Timing Advance Command"),
            DlSchLcid::DrxCmd => write!(f, "DRX Command"),
            DlSchLcid::Padding => write!(f, "Padding"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table() {
        for raw in 0..32u64 {
            match DlSchLcid::try_from(raw) {
                Ok(lcid) => assert_eq!(lcid.into_raw(), raw),
                Err(()) => assert!(matches!(raw, 18..=23 | 25 | 26), "raw {} should be valid", raw),
            }
        }
        assert_eq!(DlSchLcid::try_from(29), Ok(DlSchLcid::TaCmd));
        assert_eq!(DlSchLcid::ConResId.ce_size(), 6);
        assert!(DlSchLcid::Sdu(DlSchLcid::MAX_SDU).is_sdu());
        assert!(!DlSchLcid::Padding.is_mac_ce());
    }
}
