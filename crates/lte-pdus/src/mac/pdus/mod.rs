pub mod rar_pdu;
pub mod rar_subpdu;
pub mod sch_pdu;
pub mod sch_subheader;
pub mod sch_subpdu;
