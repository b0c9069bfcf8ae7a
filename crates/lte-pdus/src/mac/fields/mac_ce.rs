use core::fmt;

use lte_core::{BitBuffer, Direction, PduParseErr, Rnti, expect_value, let_field};

use crate::mac::enums::bsr_format::BsrFormat;
use crate::mac::enums::dl_sch_lcid::DlSchLcid;
use crate::mac::enums::lcid::Lcid;
use crate::mac::enums::mch_lcid::MchLcid;
use crate::mac::enums::ul_sch_lcid::UlSchLcid;
use crate::mac::fields::buffer_size::{buffer_size_to_index, index_to_upper_edge};
use crate::mac::fields::mch_sched_info::MchSchedEntry;
use crate::mac::fields::power_headroom::{ExtPhrEntry, index_to_power_headroom};

/// Highest SCell index addressable by the one-octet activation CE
pub const SCELL_MAX_1OCTET: usize = 7;
/// Highest SCell index addressable by the four-octet activation CE
pub const SCELL_MAX_4OCTET: usize = 31;

/// Decoded MAC control element payload, 36.321 6.1.3
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacCe {
    ShortBsr { lcg: u8, index: u8 },
    TruncatedBsr { lcg: u8, index: u8 },
    LongBsr { index: [u8; 4] },
    Phr { index: u8 },
    /// PCell entry first, SCells ascending
    ExtPhr { entries: Vec<ExtPhrEntry> },
    Crnti(Rnti),
    /// 48-bit UE Contention Resolution Identity, kept in the low bits
    ConResId(u64),
    TaCmd { tag: u8, ta: u8 },
    DrxCmd,
    /// Bit i set activates SCell i. Bit 0 is reserved.
    ScellActivation { mask: u8 },
    ScellActivation4Octet { mask: u32 },
    MchSchedInfo { entries: Vec<MchSchedEntry> },
}

impl MacCe {
    /// Builds a BSR from per-LCG buffer occupancy in bytes.
    /// Short and truncated formats report the highest-numbered LCG with data.
    pub fn bsr(format: BsrFormat, buff_size: [u32; 4]) -> Self {
        match format {
            BsrFormat::Long => MacCe::LongBsr { index: buff_size.map(buffer_size_to_index) },
            BsrFormat::Short | BsrFormat::Truncated => {
                let lcg = buff_size.iter().rposition(|&b| b > 0).unwrap_or(0);
                let index = buffer_size_to_index(buff_size[lcg]);
                if format == BsrFormat::Short {
                    MacCe::ShortBsr { lcg: lcg as u8, index }
                } else {
                    MacCe::TruncatedBsr { lcg: lcg as u8, index }
                }
            }
        }
    }

    pub fn lcid(&self) -> Lcid {
        match self {
            MacCe::ShortBsr { .. } => Lcid::UlSch(UlSchLcid::ShortBsr),
            MacCe::TruncatedBsr { .. } => Lcid::UlSch(UlSchLcid::TruncBsr),
            MacCe::LongBsr { .. } => Lcid::UlSch(UlSchLcid::LongBsr),
            MacCe::Phr { .. } => Lcid::UlSch(UlSchLcid::Phr),
            MacCe::ExtPhr { .. } => Lcid::UlSch(UlSchLcid::PhrExt),
            MacCe::Crnti(_) => Lcid::UlSch(UlSchLcid::Crnti),
            MacCe::ConResId(_) => Lcid::DlSch(DlSchLcid::ConResId),
            MacCe::TaCmd { .. } => Lcid::DlSch(DlSchLcid::TaCmd),
            MacCe::DrxCmd => Lcid::DlSch(DlSchLcid::DrxCmd),
            MacCe::ScellActivation { .. } => Lcid::DlSch(DlSchLcid::ScellActivation),
            MacCe::ScellActivation4Octet { .. } => Lcid::DlSch(DlSchLcid::ScellActivation4Octet),
            MacCe::MchSchedInfo { .. } => Lcid::Mch(MchLcid::SchedInfo),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MacCe::ShortBsr { .. } => "Short BSR",
            MacCe::TruncatedBsr { .. } => "Truncated BSR",
            MacCe::LongBsr { .. } => "Long BSR",
            MacCe::Phr { .. } => "Power Headroom Report",
            MacCe::ExtPhr { .. } => "Extended Power Headroom Report",
            MacCe::Crnti(_) => "C-RNTI",
            MacCe::ConResId(_) => "Contention Resolution ID",
            MacCe::TaCmd { .. } => "Timing Advance Command",
            MacCe::DrxCmd => "DRX Command",
            MacCe::ScellActivation { .. } | MacCe::ScellActivation4Octet { .. } => "SCell Activation",
            MacCe::MchSchedInfo { .. } => "MCH Scheduling Information",
        }
    }

    /// The only channel type this CE may appear on
    pub fn direction(&self) -> Direction {
        self.lcid().direction()
    }

    pub fn is_var_len(&self) -> bool {
        self.lcid().is_var_len_ce()
    }

    /// Encoded payload size in bytes, excluding the subheader
    pub fn payload_len(&self) -> usize {
        match self {
            MacCe::ExtPhr { entries } => 1 + entries.iter().map(ExtPhrEntry::encoded_len).sum::<usize>(),
            MacCe::MchSchedInfo { entries } => entries.len() * MchSchedEntry::ENCODED_LEN,
            _ => self.lcid().ce_size(),
        }
    }

    pub fn to_bitbuf(&self, buffer: &mut BitBuffer) {
        match self {
            MacCe::ShortBsr { lcg, index } | MacCe::TruncatedBsr { lcg, index } => {
                buffer.write_bits((lcg & 0x03) as u64, 2);
                buffer.write_bits((index & 0x3f) as u64, 6);
            }
            MacCe::LongBsr { index } => {
                for idx in index {
                    buffer.write_bits((idx & 0x3f) as u64, 6);
                }
            }
            MacCe::Phr { index } => {
                buffer.write_bits(0, 2);
                buffer.write_bits((index & 0x3f) as u64, 6);
            }
            MacCe::ExtPhr { entries } => {
                let bitmap = entries.iter().filter(|e| e.cell != 0).fold(0u8, |acc, e| acc | (1 << (e.cell & 0x07)));
                buffer.write_bits((bitmap & 0xfe) as u64, 8);
                for entry in entries {
                    entry.to_bitbuf(buffer);
                }
            }
            MacCe::Crnti(rnti) => buffer.write_bits(*rnti as u64, 16),
            MacCe::ConResId(id) => buffer.write_bits(id & 0xffff_ffff_ffff, 48),
            MacCe::TaCmd { tag, ta } => {
                buffer.write_bits((tag & 0x03) as u64, 2);
                buffer.write_bits((ta & 0x3f) as u64, 6);
            }
            MacCe::DrxCmd => {}
            MacCe::ScellActivation { mask } => buffer.write_bits((mask & 0xfe) as u64, 8),
            MacCe::ScellActivation4Octet { mask } => buffer.write_bits((mask & !1) as u64, 32),
            MacCe::MchSchedInfo { entries } => {
                for entry in entries {
                    entry.to_bitbuf(buffer);
                }
            }
        }
    }

    /// Decodes the CE identified by `lcid` from `buffer`. `len` is the payload length
    /// announced by the subheader and only matters for variable-length CEs.
    pub fn from_bitbuf(lcid: Lcid, len: usize, buffer: &mut BitBuffer) -> Result<Self, PduParseErr> {
        let ce = match lcid {
            Lcid::UlSch(UlSchLcid::ShortBsr) | Lcid::UlSch(UlSchLcid::TruncBsr) => {
                let_field!(buffer, lcg, 2);
                let_field!(buffer, index, 6);
                if lcid == Lcid::UlSch(UlSchLcid::ShortBsr) {
                    MacCe::ShortBsr { lcg: lcg as u8, index: index as u8 }
                } else {
                    MacCe::TruncatedBsr { lcg: lcg as u8, index: index as u8 }
                }
            }
            Lcid::UlSch(UlSchLcid::LongBsr) => {
                let mut index = [0u8; 4];
                for idx in index.iter_mut() {
                    *idx = buffer.read_field(6, "buffer_size")? as u8;
                }
                MacCe::LongBsr { index }
            }
            Lcid::UlSch(UlSchLcid::Phr) => {
                buffer.read_field(2, "reserved")?;
                let_field!(buffer, ph, 6);
                MacCe::Phr { index: ph as u8 }
            }
            Lcid::UlSch(UlSchLcid::PhrExt) => {
                let_field!(buffer, bitmap, 8);
                let mut entries = vec![ExtPhrEntry::from_bitbuf(0, buffer)?];
                for cell in 1..=SCELL_MAX_1OCTET as u8 {
                    if bitmap & (1 << cell) != 0 {
                        entries.push(ExtPhrEntry::from_bitbuf(cell, buffer)?);
                    }
                }
                let ce = MacCe::ExtPhr { entries };
                if ce.payload_len() > len {
                    return Err(PduParseErr::InconsistentLength { expected: len, found: ce.payload_len() });
                }
                ce
            }
            Lcid::UlSch(UlSchLcid::Crnti) => {
                let_field!(buffer, crnti, 16);
                MacCe::Crnti(crnti as Rnti)
            }
            Lcid::DlSch(DlSchLcid::ConResId) => {
                let_field!(buffer, con_res_id, 48);
                MacCe::ConResId(con_res_id)
            }
            Lcid::DlSch(DlSchLcid::TaCmd) => {
                let_field!(buffer, tag, 2);
                let_field!(buffer, ta, 6);
                MacCe::TaCmd { tag: tag as u8, ta: ta as u8 }
            }
            Lcid::DlSch(DlSchLcid::DrxCmd) => MacCe::DrxCmd,
            Lcid::DlSch(DlSchLcid::ScellActivation) => {
                let_field!(buffer, mask, 8);
                MacCe::ScellActivation { mask: mask as u8 & 0xfe }
            }
            Lcid::DlSch(DlSchLcid::ScellActivation4Octet) => {
                let_field!(buffer, mask, 32);
                MacCe::ScellActivation4Octet { mask: mask as u32 & !1 }
            }
            Lcid::Mch(MchLcid::SchedInfo) => {
                expect_value!((len % MchSchedEntry::ENCODED_LEN) as u64, 0u64, "mch_sched_info_len")?;
                let mut entries = Vec::with_capacity(len / MchSchedEntry::ENCODED_LEN);
                for _ in 0..len / MchSchedEntry::ENCODED_LEN {
                    entries.push(MchSchedEntry::from_bitbuf(buffer)?);
                }
                MacCe::MchSchedInfo { entries }
            }
            _ => {
                return Err(PduParseErr::InvalidValue { field: "ce_lcid", value: lcid.into_raw() as u64 });
            }
        };
        Ok(ce)
    }

    /// Dominant LCG and per-LCG occupancy expanded to the upper edge of each level.
    /// The long format reports LCG 0 as dominant.
    pub fn bsr_occupancy(&self) -> Option<(usize, [u32; 4])> {
        match self {
            MacCe::ShortBsr { lcg, index } | MacCe::TruncatedBsr { lcg, index } => {
                let mut occupancy = [0u32; 4];
                occupancy[(*lcg & 0x03) as usize] = index_to_upper_edge(*index);
                Some(((*lcg & 0x03) as usize, occupancy))
            }
            MacCe::LongBsr { index } => Some((0, index.map(index_to_upper_edge))),
            _ => None,
        }
    }
}

impl fmt::Display for MacCe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MacCe::ShortBsr { lcg, index } => write!(f, "Short BSR LCG {} idx {}", lcg, index),
            MacCe::TruncatedBsr { lcg, index } => write!(f, "Truncated BSR LCG {} idx {}", lcg, index),
            MacCe::LongBsr { index } => {
                write!(f, "Long BSR idx {} {} {} {}", index[0], index[1], index[2], index[3])
            }
            MacCe::Phr { index } => write!(f, "PHR {} dB", index_to_power_headroom(*index)),
            MacCe::ExtPhr { entries } => {
                write!(f, "Extended PHR")?;
                for entry in entries {
                    write!(f, " [{}]", entry)?;
                }
                Ok(())
            }
            MacCe::Crnti(rnti) => write!(f, "C-RNTI 0x{:04x}", rnti),
            MacCe::ConResId(id) => write!(f, "Contention Resolution ID 0x{:012x}", id),
            MacCe::TaCmd { tag, ta } => write!(f, "TA Command TAG {} TA {}", tag, ta),
            MacCe::DrxCmd => write!(f, "DRX Command"),
            MacCe::ScellActivation { mask } => write!(f, "SCell Activation 0b{:08b}", mask),
            MacCe::ScellActivation4Octet { mask } => write!(f, "SCell Activation 0x{:08x}", mask),
            MacCe::MchSchedInfo { entries } => {
                write!(f, "MCH Scheduling Information")?;
                for entry in entries {
                    write!(f, " [{}]", entry)?;
                }
                Ok(())
            }
        }
    }
}
