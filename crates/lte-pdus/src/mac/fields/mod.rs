pub mod buffer_size;
pub mod mac_ce;
pub mod mch_sched_info;
pub mod power_headroom;
