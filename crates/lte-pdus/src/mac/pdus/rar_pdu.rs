use core::fmt;

use lte_config::CfgMac;
use lte_core::{BitBuffer, PduBuildErr, PduParseErr, let_field};

use crate::mac::pdus::rar_subpdu::RarSubPdu;
use crate::mac::pdus::sch_subpdu::SubPduHandle;

/// Size of the optional backoff indicator subheader
pub const RAR_BACKOFF_LEN: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RarMode {
    Idle,
    Tx,
    Rx,
}

/// MAC PDU carrying Random Access Responses, 36.321 6.1.5
///
/// Optional backoff subheader first, then one RAPID subheader per RAR, then the RAR
/// payloads in the same order, then zero padding.
#[derive(Debug, Clone)]
pub struct RarPdu {
    max_rars: usize,
    mode: RarMode,
    pdu_len: usize,
    rem_len: usize,
    backoff: Option<u8>,
    subpdus: Vec<RarSubPdu>,
}

impl RarPdu {
    pub fn new(max_rars: usize) -> Self {
        Self { max_rars, mode: RarMode::Idle, pdu_len: 0, rem_len: 0, backoff: None, subpdus: Vec::with_capacity(max_rars) }
    }

    pub fn from_config(cfg: &CfgMac) -> Self {
        Self::new(cfg.max_rars)
    }

    pub fn init_tx(&mut self, pdu_len: usize) {
        self.clear(RarMode::Tx, pdu_len);
    }

    pub fn init_rx(&mut self, pdu_len: usize) {
        self.clear(RarMode::Rx, pdu_len);
    }

    fn clear(&mut self, mode: RarMode, pdu_len: usize) {
        self.mode = mode;
        self.pdu_len = pdu_len;
        self.rem_len = pdu_len;
        self.backoff = None;
        self.subpdus.clear();
    }

    pub fn pdu_len(&self) -> usize {
        self.pdu_len
    }

    pub fn rem_size(&self) -> usize {
        self.rem_len
    }

    pub fn nof_subpdus(&self) -> usize {
        self.subpdus.len()
    }

    pub fn has_backoff(&self) -> bool {
        self.backoff.is_some()
    }

    pub fn get_backoff(&self) -> Option<u8> {
        self.backoff
    }

    /// Sets the 4-bit backoff indicator. The first call claims one byte.
    pub fn set_backoff(&mut self, bi: u8) -> Result<(), PduBuildErr> {
        if self.mode != RarMode::Tx {
            return Err(PduBuildErr::NotInTxMode);
        }
        if self.backoff.is_none() {
            if self.rem_len < RAR_BACKOFF_LEN {
                return Err(PduBuildErr::NoSpace { needed: RAR_BACKOFF_LEN, available: self.rem_len });
            }
            self.rem_len -= RAR_BACKOFF_LEN;
        }
        self.backoff = Some(bi & 0x0f);
        Ok(())
    }

    /// Whether `nof_rars` more RARs can still be appended, counting both the remaining
    /// bytes and the RAR capacity
    pub fn has_space(&self, nof_rars: usize) -> bool {
        self.subpdus.len() + nof_rars <= self.max_rars && nof_rars * RarSubPdu::WIRE_LEN <= self.rem_len
    }

    /// Appends an empty RAR, claiming its 7 bytes
    pub fn append(&mut self) -> Result<SubPduHandle, PduBuildErr> {
        if self.mode != RarMode::Tx {
            return Err(PduBuildErr::NotInTxMode);
        }
        if self.subpdus.len() >= self.max_rars {
            return Err(PduBuildErr::CapacityExceeded { max: self.max_rars });
        }
        if self.rem_len < RarSubPdu::WIRE_LEN {
            return Err(PduBuildErr::NoSpace { needed: RarSubPdu::WIRE_LEN, available: self.rem_len });
        }
        self.rem_len -= RarSubPdu::WIRE_LEN;
        self.subpdus.push(RarSubPdu::default());
        Ok(SubPduHandle(self.subpdus.len() - 1))
    }

    pub fn remove_last(&mut self) -> Option<RarSubPdu> {
        if self.mode != RarMode::Tx {
            return None;
        }
        let rar = self.subpdus.pop()?;
        self.rem_len += RarSubPdu::WIRE_LEN;
        Some(rar)
    }

    pub fn get(&self, handle: SubPduHandle) -> Option<&RarSubPdu> {
        self.subpdus.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: SubPduHandle) -> Option<&mut RarSubPdu> {
        self.subpdus.get_mut(handle.0)
    }

    pub fn iter(&self) -> core::slice::Iter<'_, RarSubPdu> {
        self.subpdus.iter()
    }

    /// Serializes into exactly `pdu_len` bytes
    pub fn write_packet(&self) -> Result<Vec<u8>, PduBuildErr> {
        if self.mode != RarMode::Tx {
            return Err(PduBuildErr::NotInTxMode);
        }
        let content_len = self.pdu_len - self.rem_len;
        let mut buffer = BitBuffer::new(self.pdu_len * 8);

        if let Some(bi) = self.backoff {
            buffer.write_bit(!self.subpdus.is_empty() as u8);
            buffer.write_bit(0);
            buffer.write_bits(0, 2);
            buffer.write_bits(bi as u64, 4);
        }
        let count = self.subpdus.len();
        for (idx, rar) in self.subpdus.iter().enumerate() {
            rar.subheader_to_bitbuf(&mut buffer, idx + 1 == count);
        }
        for rar in &self.subpdus {
            rar.payload_to_bitbuf(&mut buffer);
        }

        if buffer.get_pos_bytes() != content_len {
            tracing::error!(
                "RAR PDU: wrote {} bytes, expected {} ({} RARs, backoff {:?})",
                buffer.get_pos_bytes(), content_len, count, self.backoff
            );
            return Err(PduBuildErr::LengthMismatch { expected: content_len, written: buffer.get_pos_bytes() });
        }
        tracing::debug!("RAR PDU {} bytes: {} RARs, backoff {:?}, padding {}", self.pdu_len, count, self.backoff, self.rem_len);
        Ok(buffer.into_bytes())
    }

    /// Parses a received RAR PDU. On error the container is left empty.
    pub fn parse(&mut self, data: &[u8]) -> Result<(), PduParseErr> {
        let pdu_len = if self.mode == RarMode::Rx { self.pdu_len } else { data.len() };
        self.init_rx(pdu_len);

        match self.parse_rars(data) {
            Ok(()) => {
                tracing::debug!("parsed RAR PDU of {} bytes: {} RARs, backoff {:?}", pdu_len, self.subpdus.len(), self.backoff);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("corrupt RAR PDU of {} bytes: {}: {}", pdu_len, e, BitBuffer::from_bytes(data).dump_octets());
                self.init_rx(pdu_len);
                Err(e)
            }
        }
    }

    fn parse_rars(&mut self, data: &[u8]) -> Result<(), PduParseErr> {
        if data.len() < self.pdu_len {
            return Err(PduParseErr::InconsistentLength { expected: self.pdu_len, found: data.len() });
        }
        if self.pdu_len == 0 {
            return Ok(());
        }

        let mut buffer = BitBuffer::from_bytes(&data[..self.pdu_len]);
        let mut rapids = Vec::new();
        loop {
            let_field!(buffer, e_bit, 1);
            let_field!(buffer, t_bit, 1);
            if t_bit == 0 {
                if self.backoff.is_some() || !rapids.is_empty() {
                    return Err(PduParseErr::Inconsistency {
                        field: "t_bit",
                        reason: "backoff indicator after the first subheader",
                    });
                }
                buffer.read_field(2, "reserved")?;
                let_field!(buffer, bi, 4);
                self.backoff = Some(bi as u8);
            } else {
                if rapids.len() >= self.max_rars {
                    return Err(PduParseErr::TooManySubPdus { max: self.max_rars });
                }
                let_field!(buffer, rapid, 6);
                rapids.push(rapid as u8);
            }

            if e_bit == 0 {
                break;
            }
            if buffer.get_pos_bytes() >= self.pdu_len {
                return Err(PduParseErr::Inconsistency { field: "e_bit", reason: "subheaders run past the end of the PDU" });
            }
        }

        for rapid in rapids {
            self.subpdus.push(RarSubPdu::payload_from_bitbuf(rapid, &mut buffer)?);
        }
        self.rem_len = buffer.get_len_remaining() / 8;
        Ok(())
    }
}

impl fmt::Display for RarPdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MAC RAR PDU, {} bytes", self.pdu_len)?;
        if let Some(bi) = self.backoff {
            write!(f, ", backoff {}", bi)?;
        }
        writeln!(f, ", {} RARs:", self.subpdus.len())?;
        for (idx, rar) in self.subpdus.iter().enumerate() {
            writeln!(f, "  -- {}: {}", idx, rar)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lte_core::debug;

    use super::*;

    #[test]
    fn test_single_rar() {
        debug::setup_logging_verbose();
        let mut pdu = RarPdu::new(4);
        pdu.init_tx(7);
        let h = pdu.append().unwrap();
        let rar = pdu.get_mut(h).unwrap();
        rar.set_rapid(42);
        rar.set_ta_cmd(8);
        rar.set_sched_grant(0x0000c);
        rar.set_temp_crnti(0x1001);
        assert_eq!(pdu.write_packet().unwrap(), vec![0x6a, 0x00, 0x80, 0x00, 0x0c, 0x10, 0x01]);
    }

    #[test]
    fn test_space() {
        let mut pdu = RarPdu::new(4);
        pdu.init_tx(14);
        assert!(pdu.has_space(2));
        pdu.set_backoff(3).unwrap();
        assert!(!pdu.has_space(2));
        assert!(pdu.has_space(1));
        pdu.append().unwrap();
        assert!(!pdu.has_space(1));
        assert_eq!(pdu.append(), Err(PduBuildErr::NoSpace { needed: 7, available: 6 }));
        pdu.remove_last().unwrap();
        assert_eq!(pdu.rem_size(), 13);
        assert!(pdu.has_space(1));
    }

    #[test]
    fn test_space_counts_appended_rars() {
        let mut pdu = RarPdu::new(2);
        pdu.init_tx(30);
        assert!(pdu.has_space(2));
        assert!(!pdu.has_space(3));
        pdu.append().unwrap();
        assert!(pdu.has_space(1));
        assert!(!pdu.has_space(2));
        pdu.append().unwrap();
        assert!(!pdu.has_space(1));
        assert_eq!(pdu.append(), Err(PduBuildErr::CapacityExceeded { max: 2 }));
        assert!(pdu.has_space(0));
    }

    #[test]
    fn test_backoff_only() {
        let mut pdu = RarPdu::new(4);
        pdu.init_tx(3);
        pdu.set_backoff(5).unwrap();
        assert_eq!(pdu.write_packet().unwrap(), vec![0x05, 0x00, 0x00]);

        let mut rx = RarPdu::new(4);
        rx.parse(&[0x05, 0x00, 0x00]).unwrap();
        assert_eq!(rx.get_backoff(), Some(5));
        assert_eq!(rx.nof_subpdus(), 0);
    }

    #[test]
    fn test_backoff_not_first_is_corrupt() {
        debug::setup_logging_verbose();
        let mut rx = RarPdu::new(4);
        assert!(rx.parse(&[0xc1, 0x02, 0, 0, 0, 0, 0, 0]).is_err());
        assert_eq!(rx.nof_subpdus(), 0);
        assert!(!rx.has_backoff());
    }
}
