//! LTE MAC PDU multiplexing and demultiplexing
//!
//! - `mac::enums`: LCID tables per channel type, BSR formats
//! - `mac::fields`: control element payloads and the BSR/PHR quantization tables
//! - `mac::pdus`: subheader codec, the DL-SCH/UL-SCH/MCH container and the RAR container

pub mod mac;

pub use mac::enums::bsr_format::BsrFormat;
pub use mac::enums::lcid::Lcid;
pub use mac::fields::mac_ce::MacCe;
pub use mac::pdus::rar_pdu::RarPdu;
pub use mac::pdus::rar_subpdu::RarSubPdu;
pub use mac::pdus::sch_pdu::{SchPdu, SubPduView};
pub use mac::pdus::sch_subpdu::{SchSubPdu, SubPduHandle, SubPduKind};
