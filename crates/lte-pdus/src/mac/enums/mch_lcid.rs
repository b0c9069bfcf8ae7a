/// 36.321 Table 6.2.1-4 Values of LCID for MCH
/// Bits: 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MchLcid {
    Mcch,
    /// 1..=28
    Mtch(u8),
    /// MCH Scheduling Information, 30. Variable length, 2 bytes per entry.
    SchedInfo,
    Padding,
}

impl MchLcid {
    pub const MTCH_MAX_LCID: u8 = 0b11100;

    pub fn into_raw(self) -> u64 {
        match self {
            MchLcid::Mcch => 0,
            MchLcid::Mtch(v) => v as u64,
            MchLcid::SchedInfo => 0b11110,
            MchLcid::Padding => 0b11111,
        }
    }

    pub fn is_sdu(&self) -> bool {
        matches!(self, MchLcid::Mcch | MchLcid::Mtch(_))
    }

    pub fn is_mac_ce(&self) -> bool {
        *self == MchLcid::SchedInfo
    }

    pub fn is_var_len_ce(&self) -> bool {
        *self == MchLcid::SchedInfo
    }
}

impl std::convert::TryFrom<u64> for MchLcid {
    type Error = ();
    fn try_from(x: u64) -> Result<Self, Self::Error> {
        match x {
            0 => Ok(MchLcid::Mcch),
            1..=0b11100 => Ok(MchLcid::Mtch(x as u8)),
            0b11110 => Ok(MchLcid::SchedInfo),
            0b11111 => Ok(MchLcid::Padding),
            _ => Err(()),
        }
    }
}

impl From<MchLcid> for u64 {
    fn from(e: MchLcid) -> Self { e.into_raw() }
}

impl core::fmt::Display for MchLcid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MchLcid::Mcch => write!(f, "MCCH"),
            MchLcid::Mtch(v) => write!(f, "MTCH {}", v),
            MchLcid::SchedInfo => write!(f, "MCH Scheduling Information"),
            MchLcid::Padding => write!(f, "Padding"),
        }
    }
}
