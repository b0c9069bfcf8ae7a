use lte_config::CfgMac;
use lte_core::{BitBuffer, Direction};
use lte_pdus::{MacCe, RarPdu, SchPdu, SubPduKind};

/// Standalone demux for debugging captured transport blocks
pub struct MacDecoder;

impl MacDecoder {
    /// Parse a DL-SCH, UL-SCH or MCH transport block and print every sub-PDU
    pub fn decode_sch(cfg: &CfgMac, direction: Direction, data: &[u8]) -> Result<(), String> {
        println!("=== {} MAC PDU ===", direction);
        println!("Input ({} bytes): {}", data.len(), BitBuffer::from_bytes(data).dump_octets());
        println!();

        let mut pdu = SchPdu::from_config(direction, cfg);
        pdu.init_rx(data.len());
        pdu.parse(data).map_err(|e| format!("corrupt {} PDU: {}", direction, e))?;

        for view in pdu.iter() {
            let idx = view.handle.idx();
            match view.kind() {
                SubPduKind::Sdu { lcid, len, .. } => {
                    let payload = view.sdu().unwrap_or_default();
                    println!("[{}] SDU on {}, {} bytes", idx, lcid, len);
                    println!("      {}", BitBuffer::from_bytes(payload).dump_octets());
                }
                SubPduKind::Ce(ce) => {
                    println!("[{}] {}", idx, ce);
                    Self::print_ce_details(ce);
                }
                SubPduKind::Padding { len, .. } => println!("[{}] Padding, {} bytes", idx, len),
                SubPduKind::Unset => println!("[{}] (unpopulated)", idx),
            }
        }
        Ok(())
    }

    fn print_ce_details(ce: &MacCe) {
        if let Some((lcg, occupancy)) = ce.bsr_occupancy() {
            println!("      LCG {} dominant, occupancy up to {:?} bytes", lcg, occupancy);
        }
        match ce {
            MacCe::ExtPhr { entries } => {
                for entry in entries {
                    println!("      {}", entry);
                }
            }
            MacCe::MchSchedInfo { entries } => {
                for entry in entries {
                    println!("      {}", entry);
                }
            }
            _ => {}
        }
    }

    pub fn decode_rar(cfg: &CfgMac, data: &[u8]) -> Result<(), String> {
        println!("=== MAC RAR PDU ===");
        println!("Input ({} bytes): {}", data.len(), BitBuffer::from_bytes(data).dump_octets());
        println!();

        let mut pdu = RarPdu::from_config(cfg);
        pdu.init_rx(data.len());
        pdu.parse(data).map_err(|e| format!("corrupt RAR PDU: {}", e))?;

        if let Some(bi) = pdu.get_backoff() {
            println!("Backoff indicator: {}", bi);
        }
        for (idx, rar) in pdu.iter().enumerate() {
            println!("[{}] {}", idx, rar);
        }
        println!("{} bytes of padding", pdu.rem_size());
        Ok(())
    }
}
