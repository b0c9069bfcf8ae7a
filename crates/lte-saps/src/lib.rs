//! Interfaces between the MAC mux/demux and its neighbouring layers

pub mod rlc;

pub use rlc::{RlcSduQueues, SduSource, SduSourceErr};
