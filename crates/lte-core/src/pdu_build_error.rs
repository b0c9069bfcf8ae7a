use core::fmt;

use crate::Direction;

/// Errors raised while assembling a transport block for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PduBuildErr {
    /// Not enough bytes left in the transport block for the requested payload and its subheader
    NoSpace { needed: usize, available: usize },
    /// All sub-PDU slots are in use
    CapacityExceeded { max: usize },
    /// Control element or LCID does not exist on this channel type
    WrongDirection { direction: Direction, what: &'static str },
    InvalidLcid { lcid: u8 },
    /// Control element contents cannot be encoded
    InvalidCe { what: &'static str },
    /// Populate calls only apply to the most recently appended sub-PDU
    NotCurrentSubPdu,
    AlreadyPopulated,
    /// A slot was appended but never populated or removed
    Unpopulated { idx: usize },
    SduSource { lcid: u8, reason: &'static str },
    SduOversized { lcid: u8, requested: usize, written: usize },
    NoHeadroom { needed: usize, available: usize },
    /// Serialization produced a different number of bytes than the transport block size
    LengthMismatch { expected: usize, written: usize },
    NotInTxMode,
}

impl fmt::Display for PduBuildErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PduBuildErr::NoSpace { needed, available } => {
                write!(f, "no space: need {} bytes, {} available", needed, available)
            }
            PduBuildErr::CapacityExceeded { max } => write!(f, "all {} sub-PDU slots in use", max),
            PduBuildErr::WrongDirection { direction, what } => write!(f, "{} not allowed on {}", what, direction),
            PduBuildErr::InvalidLcid { lcid } => write!(f, "invalid LCID {}", lcid),
            PduBuildErr::InvalidCe { what } => write!(f, "invalid control element: {}", what),
            PduBuildErr::NotCurrentSubPdu => write!(f, "handle does not refer to the current sub-PDU"),
            PduBuildErr::AlreadyPopulated => write!(f, "sub-PDU already populated"),
            PduBuildErr::Unpopulated { idx } => write!(f, "sub-PDU {} was never populated", idx),
            PduBuildErr::SduSource { lcid, reason } => write!(f, "SDU source failed for LCID {}: {}", lcid, reason),
            PduBuildErr::SduOversized { lcid, requested, written } => {
                write!(f, "SDU source wrote {} bytes for LCID {}, only {} requested", written, lcid, requested)
            }
            PduBuildErr::NoHeadroom { needed, available } => {
                write!(f, "not enough headroom for MAC header ({} < {})", available, needed)
            }
            PduBuildErr::LengthMismatch { expected, written } => {
                write!(f, "expected PDU len {} bytes but wrote {}", expected, written)
            }
            PduBuildErr::NotInTxMode => write!(f, "container not initialized for transmission"),
        }
    }
}

impl std::error::Error for PduBuildErr {}
