use core::fmt;

use lte_core::{BitBuffer, PduParseErr, Rnti, let_field};

pub const RAR_GRANT_LEN_BITS: usize = 20;

/// One MAC RAR with its RAPID subheader, 36.321 6.1.5 and 6.2.3
///
/// Subheader: E(1) T=1 RAPID(6)
/// Payload: R(1) TA(11) UL grant(20) Temporary C-RNTI(16)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RarSubPdu {
    rapid: u8,
    ta: u16,
    grant: u32,
    temp_crnti: Rnti,
}

impl RarSubPdu {
    pub const SUBHEADER_LEN: usize = 1;
    pub const PAYLOAD_LEN: usize = 6;
    pub const WIRE_LEN: usize = Self::SUBHEADER_LEN + Self::PAYLOAD_LEN;

    pub fn new(rapid: u8, ta: u16, grant: u32, temp_crnti: Rnti) -> Self {
        let mut rar = Self::default();
        rar.set_rapid(rapid);
        rar.set_ta_cmd(ta);
        rar.set_sched_grant(grant);
        rar.set_temp_crnti(temp_crnti);
        rar
    }

    pub fn rapid(&self) -> u8 {
        self.rapid
    }

    pub fn ta_cmd(&self) -> u16 {
        self.ta
    }

    /// 20-bit UL grant, first grant bit in the MSB
    pub fn sched_grant(&self) -> u32 {
        self.grant
    }

    pub fn temp_crnti(&self) -> Rnti {
        self.temp_crnti
    }

    /// UL grant as one bit per element, in transmission order
    pub fn sched_grant_bits(&self) -> [u8; RAR_GRANT_LEN_BITS] {
        core::array::from_fn(|i| ((self.grant >> (RAR_GRANT_LEN_BITS - 1 - i)) & 1) as u8)
    }

    pub fn set_rapid(&mut self, rapid: u8) {
        self.rapid = rapid & 0x3f;
    }

    pub fn set_ta_cmd(&mut self, ta: u16) {
        self.ta = ta & 0x7ff;
    }

    pub fn set_sched_grant(&mut self, grant: u32) {
        self.grant = grant & 0xfffff;
    }

    pub fn set_sched_grant_bits(&mut self, bits: &[u8; RAR_GRANT_LEN_BITS]) {
        self.grant = bits.iter().fold(0u32, |acc, b| (acc << 1) | (b & 1) as u32);
    }

    pub fn set_temp_crnti(&mut self, temp_crnti: Rnti) {
        self.temp_crnti = temp_crnti;
    }

    pub fn subheader_to_bitbuf(&self, buffer: &mut BitBuffer, is_last: bool) {
        buffer.write_bit(!is_last as u8);
        buffer.write_bit(1);
        buffer.write_bits(self.rapid as u64, 6);
    }

    pub fn payload_to_bitbuf(&self, buffer: &mut BitBuffer) {
        buffer.write_bit(0);
        buffer.write_bits(self.ta as u64, 11);
        buffer.write_bits(self.grant as u64, RAR_GRANT_LEN_BITS);
        buffer.write_bits(self.temp_crnti as u64, 16);
    }

    /// Reads the 6-byte payload belonging to the subheader that carried `rapid`
    pub fn payload_from_bitbuf(rapid: u8, buffer: &mut BitBuffer) -> Result<Self, PduParseErr> {
        buffer.read_field(1, "reserved")?;
        let_field!(buffer, ta, 11);
        let_field!(buffer, grant, RAR_GRANT_LEN_BITS);
        let_field!(buffer, temp_crnti, 16);
        Ok(RarSubPdu { rapid: rapid & 0x3f, ta: ta as u16, grant: grant as u32, temp_crnti: temp_crnti as Rnti })
    }
}

impl fmt::Display for RarSubPdu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RAPID {}: TA {} grant 0x{:05x} temp C-RNTI 0x{:04x}",
            self.rapid, self.ta, self.grant, self.temp_crnti
        )
    }
}
