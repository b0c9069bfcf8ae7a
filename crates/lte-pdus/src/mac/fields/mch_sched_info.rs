use lte_core::{BitBuffer, LcidRaw, PduParseErr, let_field};

/// Stop MTCH value telling the UE the MTCH is not scheduled in this MSP
pub const STOP_MTCH_NOT_SCHEDULED: u16 = 0x7ff;

/// One entry of the MCH Scheduling Information MAC CE, 36.321 6.1.3.7
/// Bits: LCID (5), Stop MTCH (11)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MchSchedEntry {
    pub lcid: LcidRaw,
    pub stop_mtch: u16,
}

impl MchSchedEntry {
    pub const ENCODED_LEN: usize = 2;

    /// A stop value of 0 is sent as "not scheduled"
    pub fn new(lcid: LcidRaw, stop_mtch: u16) -> Self {
        let stop_mtch = if stop_mtch == 0 { STOP_MTCH_NOT_SCHEDULED } else { stop_mtch & 0x7ff };
        Self { lcid: lcid & 0x1f, stop_mtch }
    }

    pub fn from_bitbuf(buffer: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let_field!(buffer, lcid, 5);
        let_field!(buffer, stop_mtch, 11);
        Ok(MchSchedEntry { lcid: lcid as LcidRaw, stop_mtch: stop_mtch as u16 })
    }

    pub fn to_bitbuf(&self, buffer: &mut BitBuffer) {
        buffer.write_bits((self.lcid & 0x1f) as u64, 5);
        buffer.write_bits((self.stop_mtch & 0x7ff) as u64, 11);
    }
}

impl core::fmt::Display for MchSchedEntry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.stop_mtch == STOP_MTCH_NOT_SCHEDULED {
            write!(f, "MTCH {} not scheduled", self.lcid)
        } else {
            write!(f, "MTCH {} stop {}", self.lcid, self.stop_mtch)
        }
    }
}
