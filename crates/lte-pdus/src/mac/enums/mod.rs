pub mod bsr_format;
pub mod dl_sch_lcid;
pub mod lcid;
pub mod mch_lcid;
pub mod ul_sch_lcid;
