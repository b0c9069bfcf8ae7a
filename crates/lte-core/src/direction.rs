use core::fmt;

/// Transport channel a MAC PDU travels on. Selects the LCID table used to interpret subheaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Downlink shared channel
    DlSch,
    /// Uplink shared channel
    UlSch,
    /// Multicast channel
    Mch,
}

impl Direction {
    #[inline]
    pub fn is_sch(&self) -> bool {
        matches!(self, Direction::DlSch | Direction::UlSch)
    }

    #[inline]
    pub fn is_ul(&self) -> bool {
        matches!(self, Direction::UlSch)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::DlSch => write!(f, "DL-SCH"),
            Direction::UlSch => write!(f, "UL-SCH"),
            Direction::Mch => write!(f, "MCH"),
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dl" | "dlsch" | "dl-sch" | "downlink" => Ok(Direction::DlSch),
            "ul" | "ulsch" | "ul-sch" | "uplink" => Ok(Direction::UlSch),
            "mch" | "multicast" => Ok(Direction::Mch),
            other => Err(format!("unsupported direction '{}', use: dl, ul, mch", other)),
        }
    }
}
