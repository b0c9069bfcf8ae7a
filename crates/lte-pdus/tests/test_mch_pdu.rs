mod common;

use lte_core::{Direction, PduBuildErr, debug};
use lte_pdus::SchPdu;
use lte_pdus::mac::fields::mch_sched_info::{MchSchedEntry, STOP_MTCH_NOT_SCHEDULED};
use common::{TbBuilder, hex, parse, rep, sdus, unhex};

#[test]
fn test_sched_info_mcch_and_mtch() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::Mch, 30);
    tb.ce(|pdu, h| pdu.set_next_mch_sched_info(h, 1, 0)).unwrap();
    assert_eq!(tb.pdu.rem_size(), 26);
    tb.sdu(0, &[0xc0; 5]).unwrap();
    tb.sdu(1, &[0xd1; 10]).unwrap();
    let out = tb.finish();

    let expected = format!("3e 02 20 05 21 0a 1f 0f ff {} {} {}", rep(0xc0, 5), rep(0xd1, 10), rep(0, 6));
    assert_eq!(hex(&out), expected);

    let rx = parse(Direction::Mch, &out);
    let sched = rx.iter().find_map(|v| v.mch_sched_info().map(<[_]>::to_vec)).unwrap();
    assert_eq!(sched, vec![MchSchedEntry { lcid: 1, stop_mtch: STOP_MTCH_NOT_SCHEDULED }]);
    assert_eq!(sdus(&rx), vec![(0, vec![0xc0; 5]), (1, vec![0xd1; 10])]);
}

#[test]
fn test_sched_info_grows_its_length_field() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::Mch, 20);
    let h = tb.pdu.append().unwrap();
    tb.pdu.set_next_mch_sched_info(h, 1, 0).unwrap();
    tb.pdu.set_next_mch_sched_info(h, 2, 100).unwrap();
    assert_eq!(tb.pdu.rem_size(), 14);
    tb.sdu(5, &[0x55; 8]).unwrap();
    let out = tb.finish();

    assert_eq!(hex(&out), format!("3e 04 25 08 1f 0f ff 10 64 {} {}", rep(0x55, 8), rep(0, 3)));

    let rx = parse(Direction::Mch, &out);
    let ce = rx.iter().next().unwrap();
    assert_eq!(
        ce.mch_sched_info(),
        Some(&[MchSchedEntry::new(1, 0), MchSchedEntry::new(2, 100)][..])
    );
}

#[test]
fn test_sched_info_alone_drops_length_field() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::Mch, 5);
    tb.ce(|pdu, h| pdu.set_next_mch_sched_info(h, 1, 0)).unwrap();
    let out = tb.finish();
    assert_eq!(hex(&out), "3f 3f 1e 0f ff");

    let rx = parse(Direction::Mch, &out);
    assert_eq!(rx.iter().filter_map(|v| v.subpdu.mch_sched_info()).count(), 1);
}

#[test]
fn test_sched_info_slot_must_be_current() {
    let mut pdu = SchPdu::new(Direction::Mch, 8);
    pdu.init_tx(40);
    let sched = pdu.append().unwrap();
    pdu.set_next_mch_sched_info(sched, 1, 0).unwrap();
    let sdu = pdu.append().unwrap();
    pdu.set_sdu_bytes(sdu, 1, &[1; 4]).unwrap();
    assert!(pdu.set_next_mch_sched_info(sched, 2, 0).is_err());
    assert!(pdu.set_next_mch_sched_info(sdu, 2, 0).is_err());
}

#[test]
fn test_reserved_mch_lcid() {
    debug::setup_logging_verbose();
    let mut pdu = SchPdu::new(Direction::Mch, 8);
    assert!(pdu.parse(&unhex("1d 00 00")).is_err());
    assert_eq!(pdu.nof_subpdus(), 0);

    // Odd scheduling information length
    let mut pdu = SchPdu::new(Direction::Mch, 8);
    assert!(pdu.parse(&unhex("3e 03 1f 0f ff 00 00")).is_err());
    assert_eq!(pdu.nof_subpdus(), 0);
}

#[test]
/// The scheduling information CE stops growing at the 15-bit length maximum
fn test_sched_info_capped_at_l15() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::Mch, 40_000);
    let h = tb.pdu.append().unwrap();
    for _ in 0..16383 {
        tb.pdu.set_next_mch_sched_info(h, 1, 100).unwrap();
    }
    assert_eq!(
        tb.pdu.set_next_mch_sched_info(h, 1, 100),
        Err(PduBuildErr::InvalidCe { what: "MCH scheduling information above 32767 bytes" })
    );
    assert_eq!(tb.sdu(2, &[0x42; 64]), Ok(64));

    let out = tb.finish();
    assert_eq!(out.len(), 40_000);
    assert_eq!(hex(&out[..6]), "3e ff fe 22 40 1f");

    let rx = parse(Direction::Mch, &out);
    let sched = rx.iter().find_map(|view| view.mch_sched_info().map(<[MchSchedEntry]>::to_vec)).unwrap();
    assert_eq!(sched.len(), 16383);
    assert_eq!(sched[16382], MchSchedEntry::new(1, 100));
    assert_eq!(sdus(&rx), vec![(2, vec![0x42; 64])]);
}
