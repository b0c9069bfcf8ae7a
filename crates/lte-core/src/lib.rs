//! Core utilities for the LTE MAC mux/demux stack
//!
//! This crate provides fundamental types and utilities used across the workspace:
//! - BitBuffer for bit-level subheader and control element manipulation
//! - Direction (DL-SCH, UL-SCH, MCH) selecting the LCID table
//! - Parse and build error types, field macros
//! - Logging setup

pub mod bitbuffer;
pub mod debug;
pub mod direction;
pub mod pdu_build_error;
pub mod pdu_parse_error;

pub use bitbuffer::BitBuffer;
pub use direction::Direction;
pub use pdu_build_error::PduBuildErr;
pub use pdu_parse_error::PduParseErr;

/// Logical channel identifier as carried in a 5-bit subheader field
pub type LcidRaw = u8;

/// 16-bit radio network temporary identifier
pub type Rnti = u16;
