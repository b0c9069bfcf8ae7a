use std::sync::Arc;

use lte_core::Direction;

/// Capacities of the MAC PDU containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfgMac {
    /// Max sub-PDUs (SDUs and CEs) in one DL-SCH or UL-SCH transport block
    pub max_sch_subpdus: usize,
    /// Max sub-PDUs in one MCH transport block
    pub max_mch_subpdus: usize,
    /// Max RAR entries in one Random Access Response
    pub max_rars: usize,
}

impl Default for CfgMac {
    fn default() -> Self {
        Self {
            max_sch_subpdus: default_max_sch_subpdus(),
            max_mch_subpdus: default_max_mch_subpdus(),
            max_rars: default_max_rars(),
        }
    }
}

impl CfgMac {
    /// Sub-PDU capacity for a container on the given channel
    pub fn max_subpdus(&self, direction: Direction) -> usize {
        match direction {
            Direction::DlSch | Direction::UlSch => self.max_sch_subpdus,
            Direction::Mch => self.max_mch_subpdus,
        }
    }
}

#[inline]
pub fn default_max_sch_subpdus() -> usize {
    16
}

#[inline]
pub fn default_max_mch_subpdus() -> usize {
    28
}

#[inline]
pub fn default_max_rars() -> usize {
    16
}

#[derive(Debug, Clone, Default)]
pub struct StackConfig {
    /// Optional verbose log file
    pub debug_log: Option<String>,

    pub mac: CfgMac,
}

impl StackConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate that all configuration fields are within usable bounds.
    pub fn validate(&self) -> Result<(), &str> {
        // A transport block always needs room for at least one payload and a padding entry
        if self.mac.max_sch_subpdus < 2 {
            return Err("mac.max_sch_subpdus must be at least 2");
        }
        if self.mac.max_mch_subpdus < 2 {
            return Err("mac.max_mch_subpdus must be at least 2");
        }
        if self.mac.max_rars < 1 {
            return Err("mac.max_rars must be at least 1");
        }
        // RAPID is 6 bits, so no more than 64 distinct responses
        if self.mac.max_rars > 64 {
            return Err("mac.max_rars must not exceed 64");
        }
        Ok(())
    }
}

/// Global shared configuration, immutable after construction.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    cfg: Arc<StackConfig>,
}

impl SharedConfig {
    /// Builds a shared config after validating it.
    pub fn from_config(cfg: StackConfig) -> Result<Self, String> {
        cfg.validate().map_err(|e| format!("Invalid stack configuration: {}", e))?;
        Ok(Self { cfg: Arc::new(cfg) })
    }

    /// Access immutable config.
    pub fn config(&self) -> Arc<StackConfig> {
        Arc::clone(&self.cfg)
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self { cfg: Arc::new(StackConfig::default()) }
    }
}
