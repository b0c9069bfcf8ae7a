use std::collections::{BTreeMap, VecDeque};

use lte_core::LcidRaw;

use super::{SduSource, SduSourceErr};

/// In-memory per-LCID FIFO of whole SDUs.
///
/// An SDU is only handed out when it fits the offered window completely; there is no
/// segmentation, so an oversized SDU stays at the head of its queue.
#[derive(Debug, Default, Clone)]
pub struct RlcSduQueues {
    queues: BTreeMap<LcidRaw, VecDeque<Vec<u8>>>,
}

impl RlcSduQueues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a logical channel without queueing anything on it
    pub fn add_channel(&mut self, lcid: LcidRaw) {
        self.queues.entry(lcid).or_default();
    }

    pub fn push(&mut self, lcid: LcidRaw, sdu: Vec<u8>) {
        self.queues.entry(lcid).or_default().push_back(sdu);
    }

    /// Bytes pending on one channel
    pub fn pending_bytes(&self, lcid: LcidRaw) -> usize {
        self.queues.get(&lcid).map_or(0, |q| q.iter().map(Vec::len).sum())
    }

    /// Size of the SDU at the head of the channel's queue
    pub fn head_len(&self, lcid: LcidRaw) -> Option<usize> {
        self.queues.get(&lcid).and_then(|q| q.front()).map(Vec::len)
    }

    /// Channels that currently have data, ascending
    pub fn active_channels(&self) -> Vec<LcidRaw> {
        self.queues.iter().filter(|(_, q)| !q.is_empty()).map(|(lcid, _)| *lcid).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.values().all(VecDeque::is_empty)
    }
}

impl SduSource for RlcSduQueues {
    fn read_pdu(&mut self, lcid: LcidRaw, dest: &mut [u8]) -> Result<usize, SduSourceErr> {
        let Some(queue) = self.queues.get_mut(&lcid) else {
            return Err(SduSourceErr::UnknownLcid { lcid });
        };

        let Some(head_len) = queue.front().map(Vec::len) else {
            return Ok(0);
        };
        if head_len > dest.len() {
            tracing::debug!("lcid {}: head SDU of {} bytes does not fit {} byte grant", lcid, head_len, dest.len());
            return Ok(0);
        }

        let Some(sdu) = queue.pop_front() else {
            return Ok(0);
        };
        dest[..sdu.len()].copy_from_slice(&sdu);
        tracing::trace!("lcid {}: read {} bytes", lcid, sdu.len());
        Ok(sdu.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_per_channel() {
        let mut q = RlcSduQueues::new();
        q.push(1, vec![1; 4]);
        q.push(1, vec![2; 3]);
        q.push(3, vec![3; 2]);
        assert_eq!(q.pending_bytes(1), 7);
        assert_eq!(q.active_channels(), vec![1, 3]);

        let mut dest = [0u8; 10];
        assert_eq!(q.read_pdu(1, &mut dest).unwrap(), 4);
        assert_eq!(&dest[..4], &[1, 1, 1, 1]);
        assert_eq!(q.read_pdu(1, &mut dest).unwrap(), 3);
        assert_eq!(q.read_pdu(1, &mut dest).unwrap(), 0);
        assert_eq!(q.active_channels(), vec![3]);
    }

    #[test]
    fn test_oversized_head_stays_queued() {
        let mut q = RlcSduQueues::new();
        q.push(2, vec![9; 8]);
        let mut dest = [0u8; 4];
        assert_eq!(q.read_pdu(2, &mut dest).unwrap(), 0);
        assert_eq!(q.head_len(2), Some(8));
    }

    #[test]
    fn test_unknown_channel() {
        let mut q = RlcSduQueues::new();
        q.add_channel(5);
        let mut dest = [0u8; 4];
        assert_eq!(q.read_pdu(5, &mut dest).unwrap(), 0);
        assert_eq!(q.read_pdu(6, &mut dest), Err(SduSourceErr::UnknownLcid { lcid: 6 }));
        assert!(q.is_empty());
    }
}
