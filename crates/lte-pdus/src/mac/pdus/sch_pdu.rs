use core::fmt;

use lte_config::CfgMac;
use lte_core::{BitBuffer, Direction, LcidRaw, PduBuildErr, PduParseErr, Rnti, assert_warn};
use lte_saps::SduSource;

use crate::mac::enums::bsr_format::BsrFormat;
use crate::mac::enums::lcid::Lcid;
use crate::mac::fields::mac_ce::{MacCe, SCELL_MAX_1OCTET, SCELL_MAX_4OCTET};
use crate::mac::fields::mch_sched_info::MchSchedEntry;
use crate::mac::fields::power_headroom::{ExtPhrEntry, power_headroom_to_index};
use crate::mac::pdus::sch_subheader::{MAX_L15_LEN, SchSubheader, size_header_sdu};
use crate::mac::pdus::sch_subpdu::{SchSubPdu, SubPduHandle, SubPduKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PduMode {
    Idle,
    Tx,
    Rx,
}

/// How leftover bytes are filled when a transport block is serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PaddingLayout {
    /// One trailing padding subheader plus `multi_bytes` zero bytes after the payloads
    multibyte: bool,
    multi_bytes: usize,
    /// Number of single-byte padding subheaders in front of the header
    onetwo: usize,
}

/// MAC PDU for DL-SCH, UL-SCH or MCH, 36.321 6.1.2
///
/// In transmit mode sub-PDUs are appended one at a time and populated through their handle;
/// SDU bytes are written straight into the transport block buffer and the header is placed
/// in front of them by [`SchPdu::write_packet`]. In receive mode [`SchPdu::parse`] splits a
/// transport block into its sub-PDUs.
#[derive(Debug, Clone)]
pub struct SchPdu {
    direction: Direction,
    max_subpdus: usize,
    mode: PduMode,
    pdu_len: usize,
    rem_len: usize,
    subpdus: Vec<SchSubPdu>,
    last_sdu_idx: Option<usize>,
    /// Tx: header headroom of `pdu_len` bytes, then the SDU region. Rx: the received PDU.
    buf: Vec<u8>,
    headroom: usize,
    /// Absolute end of the SDU bytes written so far
    sdu_end: usize,
}

impl SchPdu {
    pub fn new(direction: Direction, max_subpdus: usize) -> Self {
        Self {
            direction,
            max_subpdus,
            mode: PduMode::Idle,
            pdu_len: 0,
            rem_len: 0,
            subpdus: Vec::with_capacity(max_subpdus),
            last_sdu_idx: None,
            buf: Vec::new(),
            headroom: 0,
            sdu_end: 0,
        }
    }

    pub fn from_config(direction: Direction, cfg: &CfgMac) -> Self {
        Self::new(direction, cfg.max_subpdus(direction))
    }

    /// Prepares an empty transport block of `pdu_len` bytes for building
    pub fn init_tx(&mut self, pdu_len: usize) {
        self.clear(PduMode::Tx, pdu_len);
        self.headroom = pdu_len;
        self.sdu_end = pdu_len;
        self.buf.resize(2 * pdu_len, 0);
    }

    /// Prepares for parsing a transport block of `pdu_len` bytes
    pub fn init_rx(&mut self, pdu_len: usize) {
        self.clear(PduMode::Rx, pdu_len);
    }

    /// Drops all sub-PDUs and restores the full remaining length, keeping mode and size
    pub fn reset(&mut self) {
        match self.mode {
            PduMode::Tx => self.init_tx(self.pdu_len),
            PduMode::Rx => self.init_rx(self.pdu_len),
            PduMode::Idle => self.clear(PduMode::Idle, 0),
        }
    }

    fn clear(&mut self, mode: PduMode, pdu_len: usize) {
        self.mode = mode;
        self.pdu_len = pdu_len;
        self.rem_len = pdu_len;
        self.subpdus.clear();
        self.last_sdu_idx = None;
        self.buf.clear();
        self.headroom = 0;
        self.sdu_end = 0;
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn max_subpdus(&self) -> usize {
        self.max_subpdus
    }

    pub fn pdu_len(&self) -> usize {
        self.pdu_len
    }

    /// Bytes not yet claimed by a populated sub-PDU
    pub fn rem_size(&self) -> usize {
        self.rem_len
    }

    pub fn nof_subpdus(&self) -> usize {
        self.subpdus.len()
    }

    pub fn get(&self, handle: SubPduHandle) -> Option<&SchSubPdu> {
        self.subpdus.get(handle.0)
    }

    /// Payload of an SDU sub-PDU, in either mode
    pub fn sdu_payload(&self, handle: SubPduHandle) -> Option<&[u8]> {
        match self.subpdus.get(handle.0)?.kind {
            SubPduKind::Sdu { offset, len, .. } => self.buf.get(offset..offset + len),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = SubPduView<'_>> {
        self.subpdus.iter().enumerate().map(|(idx, subpdu)| SubPduView { handle: SubPduHandle(idx), subpdu, buf: &self.buf })
    }

    // Space accounting //////////////////////////////////////////////////////////////////

    pub fn size_header_sdu(len: usize) -> usize {
        size_header_sdu(len)
    }

    /// Whether a CE of `nbytes` fits, counting a length-coded subheader for variable-length CEs
    pub fn has_space_ce(&self, nbytes: usize, var_len: bool) -> bool {
        self.rem_len >= nbytes + Self::ce_header_len(nbytes, var_len)
    }

    /// Largest SDU that still fits, given that the current last SDU's subheader grows
    /// to its length-coded form once another SDU follows it. Capped at the 15-bit L maximum
    /// since any SDU may later need a length field.
    pub fn get_sdu_space(&self) -> usize {
        self.rem_len.saturating_sub(self.last_sdu_header_growth() + 1).min(MAX_L15_LEN)
    }

    pub fn has_space_sdu(&self, nbytes: usize) -> bool {
        self.get_sdu_space() >= nbytes
    }

    fn ce_header_len(nbytes: usize, var_len: bool) -> usize {
        if var_len { size_header_sdu(nbytes) } else { 1 }
    }

    fn last_sdu_header_growth(&self) -> usize {
        self.last_sdu_idx.map_or(0, |idx| self.subpdus[idx].header_size(false) - 1)
    }

    fn reserve(&mut self, idx: usize, nbytes: usize) {
        assert_warn!(nbytes <= self.rem_len, "reserving {} bytes with {} remaining", nbytes, self.rem_len);
        self.rem_len = self.rem_len.saturating_sub(nbytes);
        let slot = &mut self.subpdus[idx];
        slot.reserved += nbytes;
    }

    // Building //////////////////////////////////////////////////////////////////////////

    /// Allocates the next sub-PDU slot. Space is only claimed once the slot is populated.
    pub fn append(&mut self) -> Result<SubPduHandle, PduBuildErr> {
        if self.mode != PduMode::Tx {
            return Err(PduBuildErr::NotInTxMode);
        }
        if self.subpdus.len() >= self.max_subpdus {
            return Err(PduBuildErr::CapacityExceeded { max: self.max_subpdus });
        }
        if self.rem_len == 0 {
            return Err(PduBuildErr::NoSpace { needed: 1, available: 0 });
        }
        self.subpdus.push(SchSubPdu::unset());
        Ok(SubPduHandle(self.subpdus.len() - 1))
    }

    /// Removes the most recently appended sub-PDU and gives back whatever space it claimed
    pub fn remove_last(&mut self) -> Option<SchSubPdu> {
        if self.mode != PduMode::Tx {
            return None;
        }
        let slot = self.subpdus.pop()?;
        if let SubPduKind::Sdu { len, .. } = slot.kind {
            self.sdu_end -= len;
        }
        if slot.is_populated() {
            self.last_sdu_idx = slot.prev_last_sdu;
        }
        self.rem_len += slot.reserved;
        Some(slot)
    }

    fn check_current(&self, handle: SubPduHandle) -> Result<(), PduBuildErr> {
        if self.mode != PduMode::Tx {
            return Err(PduBuildErr::NotInTxMode);
        }
        if handle.0 + 1 != self.subpdus.len() {
            return Err(PduBuildErr::NotCurrentSubPdu);
        }
        if self.subpdus[handle.0].is_populated() {
            return Err(PduBuildErr::AlreadyPopulated);
        }
        Ok(())
    }

    fn sdu_lcid(&self, lcid: LcidRaw) -> Result<Lcid, PduBuildErr> {
        Lcid::sdu(self.direction, lcid).ok_or(PduBuildErr::InvalidLcid { lcid })
    }

    /// Pulls up to `requested` bytes for `lcid` from `source` directly into the transport block.
    ///
    /// Returns the number of bytes written. Zero means the source had nothing to give; the
    /// slot stays unpopulated and should be removed with [`SchPdu::remove_last`].
    pub fn set_sdu<S: SduSource + ?Sized>(
        &mut self,
        handle: SubPduHandle,
        lcid: LcidRaw,
        requested: usize,
        source: &mut S,
    ) -> Result<usize, PduBuildErr> {
        self.check_current(handle)?;
        let typed_lcid = self.sdu_lcid(lcid)?;
        let available = self.get_sdu_space();
        if requested > available {
            return Err(PduBuildErr::NoSpace { needed: requested, available });
        }

        let dest = &mut self.buf[self.sdu_end..self.sdu_end + requested];
        let written = source
            .read_pdu(lcid, dest)
            .map_err(|e| PduBuildErr::SduSource { lcid, reason: e.reason() })?;
        if written == 0 {
            tracing::trace!("lcid {}: nothing to send", lcid);
            return Ok(0);
        }
        if written > requested {
            tracing::error!("lcid {}: source wrote {} bytes into a {} byte window", lcid, written, requested);
            return Err(PduBuildErr::SduOversized { lcid, requested, written });
        }

        self.commit_sdu(handle.0, typed_lcid, written);
        Ok(written)
    }

    /// Copies an SDU the caller already holds into the transport block
    pub fn set_sdu_bytes(&mut self, handle: SubPduHandle, lcid: LcidRaw, sdu: &[u8]) -> Result<usize, PduBuildErr> {
        self.check_current(handle)?;
        let typed_lcid = self.sdu_lcid(lcid)?;
        let available = self.get_sdu_space();
        if sdu.len() > available {
            return Err(PduBuildErr::NoSpace { needed: sdu.len(), available });
        }
        if sdu.is_empty() {
            return Ok(0);
        }

        self.buf[self.sdu_end..self.sdu_end + sdu.len()].copy_from_slice(sdu);
        self.commit_sdu(handle.0, typed_lcid, sdu.len());
        Ok(sdu.len())
    }

    fn commit_sdu(&mut self, idx: usize, lcid: Lcid, len: usize) {
        let growth = self.last_sdu_header_growth();
        let offset = self.sdu_end;
        self.subpdus[idx].prev_last_sdu = self.last_sdu_idx;
        self.reserve(idx, len + 1 + growth);
        self.subpdus[idx].kind = SubPduKind::Sdu { lcid, offset, len };
        self.last_sdu_idx = Some(idx);
        self.sdu_end += len;
        tracing::trace!("sdu {} on {}: {} bytes, {} remaining", idx, lcid, len, self.rem_len);
    }

    /// Populates the current slot with a control element
    pub fn set_ce(&mut self, handle: SubPduHandle, ce: MacCe) -> Result<(), PduBuildErr> {
        self.check_current(handle)?;
        if ce.direction() != self.direction {
            return Err(PduBuildErr::WrongDirection { direction: self.direction, what: ce.name() });
        }
        let nbytes = ce.payload_len();
        let var_len = ce.is_var_len();
        if var_len && nbytes > MAX_L15_LEN {
            return Err(PduBuildErr::InvalidCe { what: "variable-length CE above 32767 bytes" });
        }
        if !self.has_space_ce(nbytes, var_len) {
            return Err(PduBuildErr::NoSpace { needed: nbytes + Self::ce_header_len(nbytes, var_len), available: self.rem_len });
        }

        self.subpdus[handle.0].prev_last_sdu = self.last_sdu_idx;
        self.reserve(handle.0, nbytes + Self::ce_header_len(nbytes, var_len));
        tracing::trace!("ce {}: {}, {} remaining", handle.0, ce, self.rem_len);
        self.subpdus[handle.0].kind = SubPduKind::Ce(ce);
        Ok(())
    }

    /// Quantizes per-LCG buffer occupancy into a short, truncated or long BSR
    pub fn set_bsr(&mut self, handle: SubPduHandle, buff_size: [u32; 4], format: BsrFormat) -> Result<(), PduBuildErr> {
        self.set_ce(handle, MacCe::bsr(format, buff_size))
    }

    pub fn set_power_headroom(&mut self, handle: SubPduHandle, db: f32) -> Result<(), PduBuildErr> {
        self.set_ce(handle, MacCe::Phr { index: power_headroom_to_index(db) })
    }

    /// Extended PHR. Exactly one entry must be the PCell (cell 0); SCells are 1..=7.
    pub fn set_extended_phr(&mut self, handle: SubPduHandle, entries: &[ExtPhrEntry]) -> Result<(), PduBuildErr> {
        let mut entries = entries.to_vec();
        entries.sort_by_key(|e| e.cell);
        if entries.first().map(|e| e.cell) != Some(0) {
            return Err(PduBuildErr::InvalidCe { what: "extended PHR without PCell entry" });
        }
        if entries.windows(2).any(|w| w[0].cell == w[1].cell) {
            return Err(PduBuildErr::InvalidCe { what: "extended PHR with duplicate cell" });
        }
        if entries.iter().any(|e| e.cell as usize > SCELL_MAX_1OCTET) {
            return Err(PduBuildErr::InvalidCe { what: "extended PHR cell index above 7" });
        }
        self.set_ce(handle, MacCe::ExtPhr { entries })
    }

    pub fn set_crnti(&mut self, handle: SubPduHandle, crnti: Rnti) -> Result<(), PduBuildErr> {
        self.set_ce(handle, MacCe::Crnti(crnti))
    }

    pub fn set_contention_resolution_id(&mut self, handle: SubPduHandle, id: u64) -> Result<(), PduBuildErr> {
        self.set_ce(handle, MacCe::ConResId(id & 0xffff_ffff_ffff))
    }

    /// Timing advance command for the primary timing advance group
    pub fn set_timing_advance(&mut self, handle: SubPduHandle, ta: u8) -> Result<(), PduBuildErr> {
        self.set_ce(handle, MacCe::TaCmd { tag: 0, ta: ta & 0x3f })
    }

    pub fn set_drx_command(&mut self, handle: SubPduHandle) -> Result<(), PduBuildErr> {
        self.set_ce(handle, MacCe::DrxCmd)
    }

    /// `active[i]` activates SCell i. Index 0 (the PCell) is ignored.
    /// The four-octet format is used as soon as a cell above 7 is active.
    pub fn set_scell_activation(&mut self, handle: SubPduHandle, active: &[bool]) -> Result<(), PduBuildErr> {
        let mut mask = 0u32;
        for (cell, _) in active.iter().enumerate().skip(1).filter(|(_, on)| **on) {
            if cell > SCELL_MAX_4OCTET {
                return Err(PduBuildErr::InvalidCe { what: "SCell index above 31" });
            }
            mask |= 1 << cell;
        }
        if mask >> (SCELL_MAX_1OCTET + 1) == 0 {
            self.set_ce(handle, MacCe::ScellActivation { mask: mask as u8 })
        } else {
            self.set_ce(handle, MacCe::ScellActivation4Octet { mask })
        }
    }

    pub fn set_scell_activation_4octet(&mut self, handle: SubPduHandle, mask: u32) -> Result<(), PduBuildErr> {
        self.set_ce(handle, MacCe::ScellActivation4Octet { mask: mask & !1 })
    }

    /// Adds one entry to the MCH scheduling information CE in the current slot,
    /// creating the CE on first use
    pub fn set_next_mch_sched_info(&mut self, handle: SubPduHandle, lcid: LcidRaw, stop_mtch: u16) -> Result<(), PduBuildErr> {
        if self.direction != Direction::Mch {
            return Err(PduBuildErr::WrongDirection { direction: self.direction, what: "MCH scheduling information" });
        }
        if self.mode != PduMode::Tx {
            return Err(PduBuildErr::NotInTxMode);
        }
        if handle.0 + 1 != self.subpdus.len() {
            return Err(PduBuildErr::NotCurrentSubPdu);
        }

        let entry = MchSchedEntry::new(lcid, stop_mtch);
        let old_len = match &self.subpdus[handle.0].kind {
            SubPduKind::Unset => return self.set_ce(handle, MacCe::MchSchedInfo { entries: vec![entry] }),
            SubPduKind::Ce(MacCe::MchSchedInfo { entries }) => entries.len() * MchSchedEntry::ENCODED_LEN,
            _ => return Err(PduBuildErr::AlreadyPopulated),
        };
        let new_len = old_len + MchSchedEntry::ENCODED_LEN;
        if new_len > MAX_L15_LEN {
            return Err(PduBuildErr::InvalidCe { what: "MCH scheduling information above 32767 bytes" });
        }
        let needed = MchSchedEntry::ENCODED_LEN + size_header_sdu(new_len) - size_header_sdu(old_len);
        if needed > self.rem_len {
            return Err(PduBuildErr::NoSpace { needed, available: self.rem_len });
        }

        self.reserve(handle.0, needed);
        if let SubPduKind::Ce(MacCe::MchSchedInfo { entries }) = &mut self.subpdus[handle.0].kind {
            entries.push(entry);
        }
        Ok(())
    }

    fn padding_layout(&self) -> PaddingLayout {
        // A variable-length CE closing a CE-only PDU drops its length field
        let ce_tail_slack = match self.subpdus.last() {
            Some(tail) if self.last_sdu_idx.is_none() && tail.is_var_len_ce() => tail.header_size(false) - 1,
            _ => 0,
        };
        let padding_if_last = self.rem_len + ce_tail_slack;

        if padding_if_last > 2 {
            let growth = self.last_sdu_header_growth();
            assert_warn!(self.rem_len > growth, "multi-byte padding without room for its subheader");
            PaddingLayout { multibyte: true, multi_bytes: self.rem_len.saturating_sub(1 + growth), onetwo: 0 }
        } else {
            PaddingLayout { multibyte: false, multi_bytes: 0, onetwo: padding_if_last }
        }
    }

    /// Serializes header, CEs and padding around the SDU bytes already in place.
    /// Returns exactly `pdu_len` bytes.
    pub fn write_packet(&mut self) -> Result<&[u8], PduBuildErr> {
        if self.mode != PduMode::Tx {
            return Err(PduBuildErr::NotInTxMode);
        }
        if let Some(idx) = self.subpdus.iter().position(|s| !s.is_populated()) {
            return Err(PduBuildErr::Unpopulated { idx });
        }

        let layout = self.padding_layout();
        let last_ce_idx = if self.last_sdu_idx.is_none() { self.subpdus.len().checked_sub(1) } else { None };

        let mut ce_headers = Vec::with_capacity(self.subpdus.len());
        let mut sdu_headers = Vec::with_capacity(self.subpdus.len());
        for (idx, subpdu) in self.subpdus.iter().enumerate() {
            let tail = if subpdu.is_sdu() { self.last_sdu_idx } else { last_ce_idx };
            let is_last = !layout.multibyte && tail == Some(idx);
            if let Some(subheader) = subpdu.subheader(is_last) {
                if subpdu.is_sdu() {
                    sdu_headers.push(subheader);
                } else {
                    ce_headers.push(subheader);
                }
            }
        }

        let ce_len: usize = self.subpdus.iter().filter_map(SchSubPdu::ce).map(MacCe::payload_len).sum();
        let header_len = layout.onetwo
            + ce_headers.iter().chain(sdu_headers.iter()).map(SchSubheader::size).sum::<usize>()
            + layout.multibyte as usize
            + ce_len;
        if header_len > self.headroom {
            return Err(PduBuildErr::NoHeadroom { needed: header_len, available: self.headroom });
        }

        let sdu_len = self.sdu_end - self.headroom;
        let total = header_len + sdu_len + layout.multi_bytes;
        if total != self.pdu_len {
            tracing::error!(
                "{} PDU length mismatch: expected {} bytes, header+CE {} sdu {} padding {} ({:?}), {} sub-PDUs, last sdu {:?}, rem {}",
                self.direction, self.pdu_len, header_len, sdu_len, layout.multi_bytes, layout,
                self.subpdus.len(), self.last_sdu_idx, self.rem_len
            );
            return Err(PduBuildErr::LengthMismatch { expected: self.pdu_len, written: total });
        }

        let mut header = BitBuffer::new(header_len * 8);
        let padding_lcid = Lcid::padding(self.direction);
        for idx in 0..layout.onetwo {
            let is_last = idx + 1 == layout.onetwo && self.pdu_len == layout.onetwo;
            SchSubheader::new(padding_lcid, is_last, 0).to_bitbuf(&mut header);
        }
        for subheader in ce_headers.iter().chain(sdu_headers.iter()) {
            subheader.to_bitbuf(&mut header);
        }
        if layout.multibyte {
            SchSubheader::new(padding_lcid, true, 0).to_bitbuf(&mut header);
        }
        for ce in self.subpdus.iter().filter_map(SchSubPdu::ce) {
            ce.to_bitbuf(&mut header);
        }
        if header.get_len_remaining() != 0 {
            tracing::error!("header writer stopped {} bits short", header.get_len_remaining());
            return Err(PduBuildErr::LengthMismatch { expected: header_len, written: header.get_pos_bytes() });
        }

        let frame_start = self.headroom - header_len;
        self.buf[frame_start..self.headroom].copy_from_slice(&header.into_bytes());
        self.buf[self.sdu_end..self.sdu_end + layout.multi_bytes].fill(0);

        tracing::debug!(
            "{} PDU {} bytes: header+CE {}, sdu {}, {} sub-PDUs, last sdu {:?}, padding {:?}",
            self.direction, self.pdu_len, header_len, sdu_len, self.subpdus.len(), self.last_sdu_idx, layout
        );
        Ok(&self.buf[frame_start..frame_start + self.pdu_len])
    }

    // Parsing ///////////////////////////////////////////////////////////////////////////

    /// Splits a received transport block into sub-PDUs.
    ///
    /// Uses the length given to [`SchPdu::init_rx`], or the length of `data` when the
    /// container was not initialized for receiving. On any inconsistency the container is
    /// left empty and the error is returned.
    pub fn parse(&mut self, data: &[u8]) -> Result<(), PduParseErr> {
        let pdu_len = if self.mode == PduMode::Rx { self.pdu_len } else { data.len() };
        self.init_rx(pdu_len);

        match self.parse_subpdus(data) {
            Ok(()) => {
                tracing::debug!("parsed {} PDU of {} bytes into {} sub-PDUs", self.direction, pdu_len, self.subpdus.len());
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    "corrupt {} PDU of {} bytes: {}: {}",
                    self.direction, pdu_len, e, BitBuffer::from_bytes(data).dump_octets()
                );
                self.init_rx(pdu_len);
                Err(e)
            }
        }
    }

    fn parse_subpdus(&mut self, data: &[u8]) -> Result<(), PduParseErr> {
        if data.len() < self.pdu_len {
            return Err(PduParseErr::InconsistentLength { expected: self.pdu_len, found: data.len() });
        }
        self.buf.extend_from_slice(&data[..self.pdu_len]);
        if self.pdu_len == 0 {
            return Ok(());
        }

        let mut reader = BitBuffer::from_bytes(&self.buf);
        let mut subheaders = Vec::new();
        loop {
            if subheaders.len() >= self.max_subpdus {
                return Err(PduParseErr::TooManySubPdus { max: self.max_subpdus });
            }
            let subheader = SchSubheader::from_bitbuf(&mut reader, self.direction)?;
            tracing::trace!("subheader {}: {}", subheaders.len(), subheader);
            let more = subheader.e_bit;
            subheaders.push(subheader);
            if !more {
                break;
            }
            if reader.get_pos_bytes() >= self.pdu_len {
                return Err(PduParseErr::Inconsistency { field: "e_bit", reason: "subheaders run past the end of the PDU" });
            }
        }

        let header_end = reader.get_pos_bytes();
        let declared_len = |sh: &SchSubheader| sh.length.unwrap_or(sh.lcid.ce_size());
        let count = subheaders.len();
        let consumed = header_end + subheaders[..count - 1].iter().map(declared_len).sum::<usize>();
        let last_len = self
            .pdu_len
            .checked_sub(consumed)
            .ok_or(PduParseErr::InconsistentLength { expected: self.pdu_len, found: consumed })?;

        let mut offset = header_end;
        for (idx, subheader) in subheaders.iter().enumerate() {
            let len = if idx + 1 == count { last_len } else { declared_len(subheader) };
            let lcid = subheader.lcid;
            let kind = if lcid.is_sdu() {
                SubPduKind::Sdu { lcid, offset, len }
            } else if lcid.is_padding() {
                SubPduKind::Padding { lcid, len }
            } else {
                let ce_len = if lcid.is_var_len_ce() { len } else { lcid.ce_size() };
                if ce_len > len {
                    return Err(PduParseErr::InconsistentLength { expected: ce_len, found: len });
                }
                if ce_len < len {
                    tracing::debug!("ignoring {} bytes after {}", len - ce_len, lcid);
                }
                let mut ce_reader = BitBuffer::from_bytes(&self.buf[offset..offset + ce_len]);
                SubPduKind::Ce(MacCe::from_bitbuf(lcid, ce_len, &mut ce_reader)?)
            };
            self.subpdus.push(SchSubPdu::parsed(kind));
            offset += len;
        }
        Ok(())
    }
}

impl fmt::Display for SchPdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MAC PDU for {}, {} bytes, {} sub-PDUs:", self.direction, self.pdu_len, self.subpdus.len())?;
        for view in self.iter() {
            write!(f, "  -- {}: {}", view.handle.idx(), view.subpdu)?;
            if let Some(payload) = view.sdu() {
                write!(f, " [{}]", BitBuffer::from_bytes(payload).dump_octets())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A sub-PDU together with access to its SDU bytes
#[derive(Debug, Clone, Copy)]
pub struct SubPduView<'a> {
    pub handle: SubPduHandle,
    pub subpdu: &'a SchSubPdu,
    buf: &'a [u8],
}

impl<'a> SubPduView<'a> {
    pub fn sdu(&self) -> Option<&'a [u8]> {
        match self.subpdu.kind {
            SubPduKind::Sdu { offset, len, .. } => self.buf.get(offset..offset + len),
            _ => None,
        }
    }
}

impl core::ops::Deref for SubPduView<'_> {
    type Target = SchSubPdu;
    fn deref(&self) -> &Self::Target {
        self.subpdu
    }
}
