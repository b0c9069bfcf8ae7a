use core::fmt;

use lte_core::{LcidRaw, Rnti};

use crate::mac::enums::lcid::Lcid;
use crate::mac::fields::mac_ce::MacCe;
use crate::mac::fields::mch_sched_info::MchSchedEntry;
use crate::mac::fields::power_headroom::{ExtPhrEntry, index_to_power_headroom};
use crate::mac::pdus::sch_subheader::{SchSubheader, size_header_sdu};

/// Index of a sub-PDU slot inside its container.
/// Only valid for the container that issued it, until that container is re-initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubPduHandle(pub(crate) usize);

impl SubPduHandle {
    pub fn idx(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubPduKind {
    /// Appended but not yet populated
    Unset,
    /// Payload lives in the container buffer at `offset..offset + len`
    Sdu { lcid: Lcid, offset: usize, len: usize },
    Ce(MacCe),
    /// Only produced by parsing
    Padding { lcid: Lcid, len: usize },
}

/// One multiplexed entity of an SCH or MCH PDU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchSubPdu {
    pub(crate) kind: SubPduKind,
    /// Bytes taken from the container's remaining length when populated
    pub(crate) reserved: usize,
    /// Container's last-SDU index before this slot was populated
    pub(crate) prev_last_sdu: Option<usize>,
}

impl SchSubPdu {
    pub(crate) fn unset() -> Self {
        Self { kind: SubPduKind::Unset, reserved: 0, prev_last_sdu: None }
    }

    pub(crate) fn parsed(kind: SubPduKind) -> Self {
        Self { kind, reserved: 0, prev_last_sdu: None }
    }

    pub fn kind(&self) -> &SubPduKind {
        &self.kind
    }

    pub fn lcid(&self) -> Option<Lcid> {
        match &self.kind {
            SubPduKind::Unset => None,
            SubPduKind::Sdu { lcid, .. } | SubPduKind::Padding { lcid, .. } => Some(*lcid),
            SubPduKind::Ce(ce) => Some(ce.lcid()),
        }
    }

    pub fn is_populated(&self) -> bool {
        self.kind != SubPduKind::Unset
    }

    pub fn is_sdu(&self) -> bool {
        matches!(self.kind, SubPduKind::Sdu { .. })
    }

    pub fn is_ce(&self) -> bool {
        matches!(self.kind, SubPduKind::Ce(_))
    }

    pub fn is_padding(&self) -> bool {
        matches!(self.kind, SubPduKind::Padding { .. })
    }

    pub fn is_var_len_ce(&self) -> bool {
        matches!(&self.kind, SubPduKind::Ce(ce) if ce.is_var_len())
    }

    /// Raw LCID of an SDU sub-PDU
    pub fn sdu_lcid(&self) -> Option<LcidRaw> {
        match self.kind {
            SubPduKind::Sdu { lcid, .. } => Some(lcid.into_raw()),
            _ => None,
        }
    }

    pub fn payload_len(&self) -> usize {
        match &self.kind {
            SubPduKind::Unset => 0,
            SubPduKind::Sdu { len, .. } | SubPduKind::Padding { len, .. } => *len,
            SubPduKind::Ce(ce) => ce.payload_len(),
        }
    }

    /// Subheader size in bytes for this sub-PDU at the given position
    pub fn header_size(&self, is_last: bool) -> usize {
        match &self.kind {
            SubPduKind::Sdu { len, .. } if !is_last => size_header_sdu(*len),
            SubPduKind::Ce(ce) if !is_last && ce.is_var_len() => size_header_sdu(ce.payload_len()),
            _ => 1,
        }
    }

    pub fn size_plus_header(&self, is_last: bool) -> usize {
        self.payload_len() + self.header_size(is_last)
    }

    pub(crate) fn subheader(&self, is_last: bool) -> Option<SchSubheader> {
        self.lcid().map(|lcid| SchSubheader::new(lcid, is_last, self.payload_len()))
    }

    pub fn ce(&self) -> Option<&MacCe> {
        match &self.kind {
            SubPduKind::Ce(ce) => Some(ce),
            _ => None,
        }
    }

    /// Dominant LCG and per-LCG buffer occupancy in bytes (upper level edges)
    pub fn get_bsr(&self) -> Option<(usize, [u32; 4])> {
        self.ce().and_then(MacCe::bsr_occupancy)
    }

    /// Reported power headroom in dB
    pub fn get_phr(&self) -> Option<i8> {
        match self.ce()? {
            MacCe::Phr { index } => Some(index_to_power_headroom(*index)),
            _ => None,
        }
    }

    pub fn get_extended_phr(&self) -> Option<&[ExtPhrEntry]> {
        match self.ce()? {
            MacCe::ExtPhr { entries } => Some(entries),
            _ => None,
        }
    }

    pub fn get_crnti(&self) -> Option<Rnti> {
        match self.ce()? {
            MacCe::Crnti(rnti) => Some(*rnti),
            _ => None,
        }
    }

    pub fn get_con_res_id(&self) -> Option<u64> {
        match self.ce()? {
            MacCe::ConResId(id) => Some(*id),
            _ => None,
        }
    }

    pub fn get_ta_cmd(&self) -> Option<u8> {
        match self.ce()? {
            MacCe::TaCmd { ta, .. } => Some(*ta),
            _ => None,
        }
    }

    /// Activation bitmap, bit i for SCell i, from either activation CE format
    pub fn get_scell_activation(&self) -> Option<u32> {
        match self.ce()? {
            MacCe::ScellActivation { mask } => Some(*mask as u32),
            MacCe::ScellActivation4Octet { mask } => Some(*mask),
            _ => None,
        }
    }

    pub fn is_drx_cmd(&self) -> bool {
        matches!(self.ce(), Some(MacCe::DrxCmd))
    }

    pub fn mch_sched_info(&self) -> Option<&[MchSchedEntry]> {
        match self.ce()? {
            MacCe::MchSchedInfo { entries } => Some(entries),
            _ => None,
        }
    }
}

impl fmt::Display for SchSubPdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SubPduKind::Unset => write!(f, "(unpopulated)"),
            SubPduKind::Sdu { lcid, len, .. } => write!(f, "SDU {} len {}", lcid, len),
            SubPduKind::Ce(ce) => write!(f, "CE {}", ce),
            SubPduKind::Padding { len, .. } => write!(f, "Padding len {}", len),
        }
    }
}
