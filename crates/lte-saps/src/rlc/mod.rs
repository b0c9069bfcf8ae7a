//! RLC side of the MAC: where SDU payloads come from when a transport block is built.

mod sdu_queues;

pub use sdu_queues::RlcSduQueues;

use core::fmt;

use lte_core::LcidRaw;

/// Failure reported by an SDU source. Returning zero bytes is not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SduSourceErr {
    /// No logical channel with this id is configured
    UnknownLcid { lcid: LcidRaw },
    /// The source could not produce a PDU for this grant
    ReadFailed { lcid: LcidRaw, reason: &'static str },
}

impl SduSourceErr {
    pub fn reason(&self) -> &'static str {
        match self {
            SduSourceErr::UnknownLcid { .. } => "unknown logical channel",
            SduSourceErr::ReadFailed { reason, .. } => reason,
        }
    }
}

impl fmt::Display for SduSourceErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SduSourceErr::UnknownLcid { lcid } => write!(f, "unknown logical channel {}", lcid),
            SduSourceErr::ReadFailed { lcid, reason } => write!(f, "read failed on LCID {}: {}", lcid, reason),
        }
    }
}

impl std::error::Error for SduSourceErr {}

/// Upper-layer provider of SDU bytes for a logical channel.
///
/// The MAC hands out a window of the transport block being built; the source writes at
/// most `dest.len()` bytes into it and returns how many it wrote. Implementations must not
/// block: when nothing is pending they return `Ok(0)` immediately.
pub trait SduSource {
    fn read_pdu(&mut self, lcid: LcidRaw, dest: &mut [u8]) -> Result<usize, SduSourceErr>;
}

impl<T: SduSource + ?Sized> SduSource for &mut T {
    fn read_pdu(&mut self, lcid: LcidRaw, dest: &mut [u8]) -> Result<usize, SduSourceErr> {
        (**self).read_pdu(lcid, dest)
    }
}
