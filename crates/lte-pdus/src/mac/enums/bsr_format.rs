use crate::mac::enums::ul_sch_lcid::UlSchLcid;

/// Buffer Status Report variants, 36.321 6.1.3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BsrFormat {
    /// One LCG, one 6-bit index
    Short,
    /// All four LCGs, four 6-bit indices in three octets
    Long,
    /// Short layout, sent when padding cannot fit a long BSR
    Truncated,
}

impl BsrFormat {
    pub fn into_lcid(self) -> UlSchLcid {
        match self {
            BsrFormat::Short => UlSchLcid::ShortBsr,
            BsrFormat::Long => UlSchLcid::LongBsr,
            BsrFormat::Truncated => UlSchLcid::TruncBsr,
        }
    }

    pub fn ce_size(self) -> usize {
        self.into_lcid().ce_size()
    }
}

impl core::fmt::Display for BsrFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            BsrFormat::Short => write!(f, "Short"),
            BsrFormat::Long => write!(f, "Long"),
            BsrFormat::Truncated => write!(f, "Truncated"),
        }
    }
}
