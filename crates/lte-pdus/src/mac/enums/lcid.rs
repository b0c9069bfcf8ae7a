use lte_core::{Direction, LcidRaw, PduParseErr};

use crate::mac::enums::dl_sch_lcid::DlSchLcid;
use crate::mac::enums::mch_lcid::MchLcid;
use crate::mac::enums::ul_sch_lcid::UlSchLcid;

/// LCID resolved against the table of the channel it was seen on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lcid {
    DlSch(DlSchLcid),
    UlSch(UlSchLcid),
    Mch(MchLcid),
}

impl Lcid {
    /// Interpret a raw 5-bit LCID. Reserved values are rejected.
    pub fn from_raw(direction: Direction, raw: u64) -> Result<Self, PduParseErr> {
        let err = PduParseErr::InvalidValue { field: "lcid", value: raw };
        match direction {
            Direction::DlSch => DlSchLcid::try_from(raw).map(Lcid::DlSch).map_err(|_| err),
            Direction::UlSch => UlSchLcid::try_from(raw).map(Lcid::UlSch).map_err(|_| err),
            Direction::Mch => MchLcid::try_from(raw).map(Lcid::Mch).map_err(|_| err),
        }
    }

    /// The SDU-carrying LCID for `raw`, or None if `raw` is not a data channel on `direction`
    pub fn sdu(direction: Direction, raw: LcidRaw) -> Option<Self> {
        Self::from_raw(direction, raw as u64).ok().filter(|l| l.is_sdu())
    }

    pub fn padding(direction: Direction) -> Self {
        match direction {
            Direction::DlSch => Lcid::DlSch(DlSchLcid::Padding),
            Direction::UlSch => Lcid::UlSch(UlSchLcid::Padding),
            Direction::Mch => Lcid::Mch(MchLcid::Padding),
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Lcid::DlSch(_) => Direction::DlSch,
            Lcid::UlSch(_) => Direction::UlSch,
            Lcid::Mch(_) => Direction::Mch,
        }
    }

    pub fn into_raw(self) -> LcidRaw {
        let raw = match self {
            Lcid::DlSch(l) => l.into_raw(),
            Lcid::UlSch(l) => l.into_raw(),
            Lcid::Mch(l) => l.into_raw(),
        };
        raw as LcidRaw
    }

    pub fn is_sdu(&self) -> bool {
        match self {
            Lcid::DlSch(l) => l.is_sdu(),
            Lcid::UlSch(l) => l.is_sdu(),
            Lcid::Mch(l) => l.is_sdu(),
        }
    }

    pub fn is_padding(&self) -> bool {
        matches!(
            self,
            Lcid::DlSch(DlSchLcid::Padding) | Lcid::UlSch(UlSchLcid::Padding) | Lcid::Mch(MchLcid::Padding)
        )
    }

    pub fn is_mac_ce(&self) -> bool {
        !self.is_sdu() && !self.is_padding()
    }

    pub fn is_var_len_ce(&self) -> bool {
        match self {
            Lcid::DlSch(_) => false,
            Lcid::UlSch(l) => l.is_var_len_ce(),
            Lcid::Mch(l) => l.is_var_len_ce(),
        }
    }

    /// Whether a non-final subheader with this LCID carries an F/L length field
    pub fn has_length_field(&self) -> bool {
        self.is_sdu() || self.is_var_len_ce()
    }

    /// Fixed control element size in bytes. Zero for everything that is not a fixed-size CE.
    pub fn ce_size(&self) -> usize {
        match self {
            Lcid::DlSch(l) => l.ce_size(),
            Lcid::UlSch(l) => l.ce_size(),
            Lcid::Mch(_) => 0,
        }
    }
}

impl core::fmt::Display for Lcid {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Lcid::DlSch(l) => write!(f, "{}", l),
            Lcid::UlSch(l) => write!(f, "{}", l),
            Lcid::Mch(l) => write!(f, "{}", l),
        }
    }
}
