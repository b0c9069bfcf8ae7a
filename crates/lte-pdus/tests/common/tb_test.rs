use lte_config::StackConfig;
use lte_core::{BitBuffer, Direction, LcidRaw, PduBuildErr};
use lte_pdus::{MacCe, SchPdu, SubPduHandle};
use lte_saps::RlcSduQueues;

pub fn default_test_config() -> StackConfig {
    StackConfig::default()
}

pub fn hex(bytes: &[u8]) -> String {
    BitBuffer::from_bytes(bytes).dump_octets()
}

pub fn unhex(hexstr: &str) -> Vec<u8> {
    BitBuffer::from_hexstr(hexstr).unwrap().into_bytes()
}

/// Hex of `count` repetitions of `byte`, for composing expected transport blocks
pub fn rep(byte: u8, count: usize) -> String {
    hex(&vec![byte; count])
}

/// Builds one transport block the way a scheduler would: append, populate, and
/// roll back the slot when population fails.
pub struct TbBuilder {
    pub pdu: SchPdu,
    pub queues: RlcSduQueues,
}

impl TbBuilder {
    pub fn new(direction: Direction, pdu_len: usize) -> Self {
        let config = default_test_config();
        let mut pdu = SchPdu::from_config(direction, &config.mac);
        pdu.init_tx(pdu_len);
        Self { pdu, queues: RlcSduQueues::new() }
    }

    /// Queues `sdu` on `lcid` and offers the whole remaining SDU space to the queue
    pub fn sdu(&mut self, lcid: LcidRaw, sdu: &[u8]) -> Result<usize, PduBuildErr> {
        self.queues.push(lcid, sdu.to_vec());
        let handle = self.pdu.append()?;
        let space = self.pdu.get_sdu_space();
        match self.pdu.set_sdu(handle, lcid, space, &mut self.queues) {
            Ok(0) => {
                self.pdu.remove_last();
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(e) => {
                self.pdu.remove_last();
                Err(e)
            }
        }
    }

    pub fn ce<F>(&mut self, populate: F) -> Result<(), PduBuildErr>
    where
        F: FnOnce(&mut SchPdu, SubPduHandle) -> Result<(), PduBuildErr>,
    {
        let handle = self.pdu.append()?;
        let res = populate(&mut self.pdu, handle);
        if res.is_err() {
            self.pdu.remove_last();
        }
        res
    }

    pub fn finish(&mut self) -> Vec<u8> {
        self.pdu.write_packet().unwrap().to_vec()
    }
}

/// Parses `data` with default capacities. Panics on corruption.
pub fn parse(direction: Direction, data: &[u8]) -> SchPdu {
    let config = default_test_config();
    let mut pdu = SchPdu::from_config(direction, &config.mac);
    pdu.init_rx(data.len());
    pdu.parse(data).unwrap();
    pdu
}

/// (raw LCID, SDU bytes) of every SDU sub-PDU, in order
pub fn sdus(pdu: &SchPdu) -> Vec<(LcidRaw, Vec<u8>)> {
    pdu.iter()
        .filter_map(|view| Some((view.sdu_lcid()?, view.sdu()?.to_vec())))
        .collect()
}

/// Every control element, in wire order
pub fn ces(pdu: &SchPdu) -> Vec<MacCe> {
    pdu.iter().filter_map(|view| view.ce().cloned()).collect()
}
