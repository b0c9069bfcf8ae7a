use lte_config::CfgMac;
use lte_core::{BitBuffer, Direction, PduBuildErr};
use lte_pdus::{BsrFormat, RarPdu, RarSubPdu, SchPdu, SubPduHandle};
use lte_saps::RlcSduQueues;

/// Contents requested on the command line for one SCH/MCH transport block
#[derive(Debug, Default)]
pub struct SchBuildArgs {
    pub sdus: Vec<(u8, Vec<u8>)>,
    pub bsr: Option<Vec<u32>>,
    pub bsr_format: String,
    pub phr: Option<f32>,
    pub crnti: Option<u16>,
    pub ta: Option<u8>,
    pub con_res_id: Option<String>,
    pub drx: bool,
    pub scells: Vec<usize>,
    pub mch_sched: Vec<(u8, u16)>,
}

/// Assembles transport blocks the way a scheduler would: CEs first, then SDUs pulled
/// from per-channel queues, each one rolled back if it does not fit
pub struct TbAssembler<'a> {
    cfg: &'a CfgMac,
}

impl<'a> TbAssembler<'a> {
    pub fn new(cfg: &'a CfgMac) -> Self {
        Self { cfg }
    }

    pub fn build_sch(&self, direction: Direction, pdu_len: usize, args: &SchBuildArgs) -> Result<Vec<u8>, String> {
        let mut pdu = SchPdu::from_config(direction, self.cfg);
        pdu.init_tx(pdu_len);

        if !args.mch_sched.is_empty() {
            let handle = pdu.append().map_err(|e| e.to_string())?;
            for (lcid, stop) in &args.mch_sched {
                pdu.set_next_mch_sched_info(handle, *lcid, *stop).map_err(|e| e.to_string())?;
            }
        }
        if let Some(id) = &args.con_res_id {
            let id = u64::from_str_radix(id.trim_start_matches("0x"), 16)
                .map_err(|e| format!("invalid contention resolution id '{}': {}", id, e))?;
            Self::add_ce(&mut pdu, "contention resolution id", |pdu, h| pdu.set_contention_resolution_id(h, id));
        }
        if let Some(ta) = args.ta {
            Self::add_ce(&mut pdu, "timing advance", |pdu, h| pdu.set_timing_advance(h, ta));
        }
        if args.drx {
            Self::add_ce(&mut pdu, "DRX command", |pdu, h| pdu.set_drx_command(h));
        }
        if !args.scells.is_empty() {
            let mut active = vec![false; args.scells.iter().max().map_or(0, |m| m + 1)];
            for cell in &args.scells {
                active[*cell] = true;
            }
            Self::add_ce(&mut pdu, "SCell activation", |pdu, h| pdu.set_scell_activation(h, &active));
        }
        if let Some(crnti) = args.crnti {
            Self::add_ce(&mut pdu, "C-RNTI", |pdu, h| pdu.set_crnti(h, crnti));
        }
        if let Some(bsr) = &args.bsr {
            let format = Self::parse_bsr_format(&args.bsr_format)?;
            let occupancy = <[u32; 4]>::try_from(bsr.as_slice())
                .map_err(|_| format!("BSR needs 4 LCG values, got {}", bsr.len()))?;
            Self::add_ce(&mut pdu, "BSR", |pdu, h| pdu.set_bsr(h, occupancy, format));
        }
        if let Some(db) = args.phr {
            Self::add_ce(&mut pdu, "PHR", |pdu, h| pdu.set_power_headroom(h, db));
        }

        let mut queues = RlcSduQueues::new();
        for (lcid, sdu) in &args.sdus {
            queues.push(*lcid, sdu.clone());
        }
        for (lcid, sdu) in &args.sdus {
            let handle = match pdu.append() {
                Ok(h) => h,
                Err(e) => {
                    tracing::warn!("no slot for SDU on LCID {}: {}", lcid, e);
                    break;
                }
            };
            let space = pdu.get_sdu_space();
            match pdu.set_sdu(handle, *lcid, space, &mut queues) {
                Ok(0) => {
                    tracing::warn!("SDU of {} bytes on LCID {} does not fit ({} bytes free)", sdu.len(), lcid, space);
                    pdu.remove_last();
                }
                Ok(n) => tracing::info!("added SDU of {} bytes on LCID {}", n, lcid),
                Err(e) => {
                    tracing::warn!("dropping SDU on LCID {}: {}", lcid, e);
                    pdu.remove_last();
                }
            }
        }

        tracing::debug!("{}", pdu);
        pdu.write_packet().map(<[u8]>::to_vec).map_err(|e| e.to_string())
    }

    fn add_ce<F>(pdu: &mut SchPdu, what: &str, populate: F)
    where
        F: FnOnce(&mut SchPdu, SubPduHandle) -> Result<(), PduBuildErr>,
    {
        let res = pdu.append().and_then(|h| {
            let res = populate(pdu, h);
            if res.is_err() {
                pdu.remove_last();
            }
            res
        });
        match res {
            Ok(()) => tracing::info!("added {}", what),
            Err(e) => tracing::warn!("skipping {}: {}", what, e),
        }
    }

    fn parse_bsr_format(s: &str) -> Result<BsrFormat, String> {
        match s.to_lowercase().as_str() {
            "short" => Ok(BsrFormat::Short),
            "long" => Ok(BsrFormat::Long),
            "truncated" | "trunc" => Ok(BsrFormat::Truncated),
            other => Err(format!("unsupported BSR format '{}', use: short, long, truncated", other)),
        }
    }

    pub fn build_rar(&self, pdu_len: usize, backoff: Option<u8>, rars: &[(u8, u16, u32, u16)]) -> Result<Vec<u8>, String> {
        let mut pdu = RarPdu::from_config(self.cfg);
        pdu.init_tx(pdu_len);
        if let Some(bi) = backoff {
            pdu.set_backoff(bi).map_err(|e| e.to_string())?;
        }
        for (rapid, ta, grant, tcrnti) in rars {
            let handle = pdu.append().map_err(|e| format!("RAPID {}: {}", rapid, e))?;
            if let Some(rar) = pdu.get_mut(handle) {
                *rar = RarSubPdu::new(*rapid, *ta, *grant, *tcrnti);
            }
        }
        tracing::debug!("{}", pdu);
        pdu.write_packet().map_err(|e| e.to_string())
    }
}

/// Parses `LCID:HEX`
pub fn parse_sdu_arg(s: &str) -> Result<(u8, Vec<u8>), String> {
    let (lcid, hex) = s.split_once(':').ok_or_else(|| format!("expected LCID:HEX, got '{}'", s))?;
    let lcid = lcid.parse::<u8>().map_err(|e| format!("invalid LCID '{}': {}", lcid, e))?;
    let payload = BitBuffer::from_hexstr(hex).map_err(|e| format!("invalid SDU hex '{}': {}", hex, e))?;
    Ok((lcid, payload.into_bytes()))
}

/// Parses `LCID:STOP`
pub fn parse_mch_sched_arg(s: &str) -> Result<(u8, u16), String> {
    let (lcid, stop) = s.split_once(':').ok_or_else(|| format!("expected LCID:STOP, got '{}'", s))?;
    let lcid = lcid.parse::<u8>().map_err(|e| format!("invalid LCID '{}': {}", lcid, e))?;
    let stop = stop.parse::<u16>().map_err(|e| format!("invalid stop MTCH '{}': {}", stop, e))?;
    Ok((lcid, stop))
}

/// Parses `RAPID:TA:GRANT:TCRNTI` with the grant in hex
pub fn parse_rar_arg(s: &str) -> Result<(u8, u16, u32, u16), String> {
    let fields: Vec<&str> = s.split(':').collect();
    let [rapid, ta, grant, tcrnti] = fields[..] else {
        return Err(format!("expected RAPID:TA:GRANT:TCRNTI, got '{}'", s));
    };
    Ok((
        rapid.parse::<u8>().map_err(|e| format!("invalid RAPID '{}': {}", rapid, e))?,
        ta.parse::<u16>().map_err(|e| format!("invalid TA '{}': {}", ta, e))?,
        u32::from_str_radix(grant.trim_start_matches("0x"), 16).map_err(|e| format!("invalid grant '{}': {}", grant, e))?,
        tcrnti.parse::<u16>().map_err(|e| format!("invalid temporary C-RNTI '{}': {}", tcrnti, e))?,
    ))
}
