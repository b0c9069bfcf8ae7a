mod common;

use lte_core::{Direction, PduBuildErr, debug};
use lte_pdus::mac::fields::power_headroom::ExtPhrEntry;
use lte_pdus::{BsrFormat, MacCe, SchPdu};
use common::{TbBuilder, hex, parse, rep, sdus, unhex};

#[test]
/// Two 8-byte SDUs in 25 bytes: 4 bytes left, so a trailing padding subheader is used
fn test_two_sdus_multibyte_padding() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::DlSch, 25);
    assert_eq!(tb.sdu(1, &[1; 8]), Ok(8));
    assert_eq!(tb.sdu(2, &[2; 8]), Ok(8));
    let out = tb.finish();

    let expected = format!("21 08 22 08 1f {} {} {}", rep(1, 8), rep(2, 8), rep(0, 4));
    assert_eq!(hex(&out), expected);

    let rx = parse(Direction::DlSch, &out);
    assert_eq!(sdus(&rx), vec![(1, vec![1; 8]), (2, vec![2; 8])]);
    assert!(rx.iter().last().unwrap().is_padding());
}

#[test]
/// Same SDUs in 21 bytes: one byte left, so single-byte padding goes in front
fn test_two_sdus_single_byte_padding() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::DlSch, 21);
    tb.sdu(1, &[1; 8]).unwrap();
    tb.sdu(2, &[2; 8]).unwrap();
    let out = tb.finish();

    assert_eq!(hex(&out), format!("3f 3f 21 08 02 {} {}", rep(1, 8), rep(2, 8)));
    let rx = parse(Direction::DlSch, &out);
    assert_eq!(rx.nof_subpdus(), 4);
    assert_eq!(sdus(&rx), vec![(1, vec![1; 8]), (2, vec![2; 8])]);
}

#[test]
fn test_long_length_field() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::DlSch, 150);
    tb.sdu(1, &[0xaa; 8]).unwrap();
    tb.sdu(2, &[0xbb; 130]).unwrap();
    let out = tb.finish();

    assert_eq!(out.len(), 150);
    assert_eq!(hex(&out[..6]), "21 08 22 80 82 1f");
    assert_eq!(&out[6..14], &[0xaa; 8]);
    assert_eq!(&out[14..144], &[0xbb; 130][..]);
    assert_eq!(&out[144..], &[0; 6]);

    let rx = parse(Direction::DlSch, &out);
    assert_eq!(sdus(&rx), vec![(1, vec![0xaa; 8]), (2, vec![0xbb; 130])]);
}

#[test]
fn test_padding_only() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::DlSch, 10);
    assert_eq!(hex(&tb.finish()), format!("1f {}", rep(0, 9)));

    let mut tb = TbBuilder::new(Direction::DlSch, 2);
    let h = tb.pdu.append().unwrap();
    assert_eq!(tb.pdu.set_sdu_bytes(h, 1, &[0; 5]), Err(PduBuildErr::NoSpace { needed: 5, available: 1 }));
    tb.pdu.remove_last();
    let out = tb.finish();
    assert_eq!(hex(&out), "3f 1f");
    let rx = parse(Direction::DlSch, &out);
    assert_eq!(rx.nof_subpdus(), 2);
    assert!(sdus(&rx).is_empty());

    let mut tb = TbBuilder::new(Direction::DlSch, 1);
    assert_eq!(hex(&tb.finish()), "1f");
}

#[test]
fn test_short_bsr_with_padding() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::UlSch, 3);
    tb.ce(|pdu, h| pdu.set_bsr(h, [0, 1552, 0, 0], BsrFormat::Short)).unwrap();
    let out = tb.finish();
    assert_eq!(hex(&out), "3f 1d 61");

    let rx = parse(Direction::UlSch, &out);
    let bsr = rx.iter().find(|v| v.is_ce()).unwrap();
    assert_eq!(bsr.get_bsr(), Some((1, [0, 1552, 0, 0])));
}

#[test]
fn test_short_bsr_and_phr_fill_exactly() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::UlSch, 4);
    tb.ce(|pdu, h| pdu.set_bsr(h, [0, 1552, 0, 0], BsrFormat::Short)).unwrap();
    tb.ce(|pdu, h| pdu.set_power_headroom(h, 10.0)).unwrap();
    assert_eq!(tb.pdu.rem_size(), 0);
    let out = tb.finish();
    assert_eq!(hex(&out), "3d 1a 61 21");

    let rx = parse(Direction::UlSch, &out);
    assert_eq!(rx.nof_subpdus(), 2);
    assert_eq!(rx.iter().nth(1).unwrap().get_phr(), Some(10));
}

#[test]
fn test_long_bsr_does_not_fit() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::UlSch, 3);
    let res = tb.ce(|pdu, h| pdu.set_bsr(h, [1552; 4], BsrFormat::Long));
    assert_eq!(res, Err(PduBuildErr::NoSpace { needed: 4, available: 3 }));
    assert_eq!(hex(&tb.finish()), "1f 00 00");
}

#[test]
fn test_long_bsr() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::UlSch, 8);
    tb.ce(|pdu, h| pdu.set_bsr(h, [1552; 4], BsrFormat::Long)).unwrap();
    let out = tb.finish();
    assert_eq!(hex(&out), "3e 1f 86 18 61 00 00 00");

    let rx = parse(Direction::UlSch, &out);
    let ce = rx.iter().next().unwrap();
    assert_eq!(ce.ce(), Some(&MacCe::LongBsr { index: [33; 4] }));
    assert_eq!(ce.get_bsr(), Some((0, [1552; 4])));
}

#[test]
fn test_scell_activation() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::DlSch, 2);
    tb.ce(|pdu, h| pdu.set_scell_activation(h, &[false, true, true])).unwrap();
    let out = tb.finish();
    assert_eq!(hex(&out), "1b 06");
    assert_eq!(parse(Direction::DlSch, &out).iter().next().unwrap().get_scell_activation(), Some(0x06));
}

#[test]
fn test_dl_ces_before_sdus() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::DlSch, 40);
    tb.ce(|pdu, h| pdu.set_contention_resolution_id(h, 0x1122_3344_5566)).unwrap();
    tb.sdu(0, &[0x20; 6]).unwrap();
    tb.ce(|pdu, h| pdu.set_timing_advance(h, 31)).unwrap();
    tb.ce(|pdu, h| pdu.set_drx_command(h)).unwrap();
    tb.sdu(3, &[0x33; 12]).unwrap();
    let out = tb.finish();

    // Subheaders: CEs in slot order, then SDUs, then padding
    assert_eq!(
        hex(&out[..16]),
        "3c 3d 3e 20 06 23 0c 1f 11 22 33 44 55 66 1f 20"
    );
    let rx = parse(Direction::DlSch, &out);
    let ces: Vec<MacCe> = rx.iter().filter_map(|v| v.ce().cloned()).collect();
    assert_eq!(
        ces,
        vec![MacCe::ConResId(0x1122_3344_5566), MacCe::TaCmd { tag: 0, ta: 31 }, MacCe::DrxCmd]
    );
    assert_eq!(sdus(&rx), vec![(0, vec![0x20; 6]), (3, vec![0x33; 12])]);
}

#[test]
fn test_ul_crnti_and_sdu() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::UlSch, 12);
    tb.ce(|pdu, h| pdu.set_crnti(h, 0x4601)).unwrap();
    tb.sdu(1, &[7; 7]).unwrap();
    let out = tb.finish();
    // 3 + 1 + 7 = 11, one byte of padding up front
    assert_eq!(hex(&out), format!("3f 3b 01 46 01 {}", rep(7, 7)));

    let rx = parse(Direction::UlSch, &out);
    assert_eq!(rx.iter().find_map(|v| v.get_crnti()), Some(0x4601));
}

#[test]
/// A variable-length CE closing a CE-only PDU drops its length byte
fn test_ext_phr_as_last_entity() {
    debug::setup_logging_verbose();
    for (len, expected) in [(4, "3f 19 00 5e"), (5, "3f 3f 19 00 5e"), (6, "39 02 1f 00 5e 00")] {
        let mut tb = TbBuilder::new(Direction::UlSch, len);
        tb.ce(|pdu, h| pdu.set_extended_phr(h, &[ExtPhrEntry::new(0, 30)])).unwrap();
        let out = tb.finish();
        assert_eq!(hex(&out), expected, "pdu len {}", len);

        let rx = parse(Direction::UlSch, &out);
        let entries = rx.iter().find_map(|v| v.get_extended_phr().map(<[_]>::to_vec)).unwrap();
        assert_eq!(entries, vec![ExtPhrEntry::new(0, 30)]);
    }
}

#[test]
fn test_ext_phr_needs_pcell() {
    let mut tb = TbBuilder::new(Direction::UlSch, 10);
    let res = tb.ce(|pdu, h| pdu.set_extended_phr(h, &[ExtPhrEntry::new(2, 30)]));
    assert!(matches!(res, Err(PduBuildErr::InvalidCe { .. })));
    assert_eq!(tb.pdu.nof_subpdus(), 0);
}

#[test]
fn test_sdu_space_shrinks_with_header_growth() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::DlSch, 140);
    tb.sdu(1, &[1; 130]).unwrap();
    // 140 - 131 = 9, minus the 2 extra bytes of the first header, minus 1 for the next header
    assert_eq!(tb.pdu.get_sdu_space(), 6);
    assert_eq!(tb.sdu(2, &[2; 7]), Ok(0));
    assert_eq!(tb.sdu(3, &[3; 6]), Ok(6));
    assert_eq!(tb.finish().len(), 140);
}

#[test]
fn test_corrupt_length_resets() {
    debug::setup_logging_verbose();
    let mut pdu = SchPdu::new(Direction::DlSch, 16);
    let data = unhex("3f 3f 21 3f 03 00 04 00 04");
    pdu.init_rx(data.len());
    assert!(pdu.parse(&data).is_err());
    assert_eq!(pdu.nof_subpdus(), 0);
    assert_eq!(pdu.iter().count(), 0);
}

#[test]
fn test_corrupt_header_chain_resets() {
    debug::setup_logging_verbose();
    let cases = [
        // E bit set on the final byte
        "3f 3f",
        // Reserved DL LCID 20
        "14 00 00",
        // Truncated contention resolution id
        "1c 01 02",
    ];
    for case in cases {
        let mut pdu = SchPdu::new(Direction::DlSch, 16);
        assert!(pdu.parse(&unhex(case)).is_err(), "{}", case);
        assert_eq!(pdu.nof_subpdus(), 0, "{}", case);
    }
}

#[test]
fn test_too_many_subheaders() {
    debug::setup_logging_verbose();
    let mut pdu = SchPdu::new(Direction::DlSch, 2);
    assert!(pdu.parse(&unhex("3f 3f 3f 01 00")).is_err());
    assert_eq!(pdu.nof_subpdus(), 0);
}

#[test]
fn test_surplus_after_fixed_ce_ignored() {
    debug::setup_logging_verbose();
    let rx = parse(Direction::DlSch, &unhex("1d 05 ff ff"));
    assert_eq!(rx.nof_subpdus(), 1);
    assert_eq!(rx.iter().next().unwrap().get_ta_cmd(), Some(5));
}

#[test]
fn test_display() {
    let mut tb = TbBuilder::new(Direction::DlSch, 12);
    tb.sdu(1, &[9; 4]).unwrap();
    tb.finish();
    let text = tb.pdu.to_string();
    assert!(text.contains("DL-SCH"));
    assert!(text.contains("SDU LCID 1 len 4"));
}

#[test]
/// SDU space never exceeds what a 15-bit length field can announce, so a large SDU
/// followed by another one keeps its full length on the wire
fn test_sdu_space_capped_at_l15() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::DlSch, 40_000);
    assert_eq!(tb.pdu.get_sdu_space(), 32767);

    let h = tb.pdu.append().unwrap();
    assert_eq!(
        tb.pdu.set_sdu_bytes(h, 1, &vec![0xaa; 33_000]),
        Err(PduBuildErr::NoSpace { needed: 33_000, available: 32767 })
    );
    assert_eq!(tb.pdu.set_sdu_bytes(h, 1, &vec![0xaa; 32767]), Ok(32767));
    assert_eq!(tb.sdu(2, &[0xbb; 100]), Ok(100));

    let out = tb.finish();
    assert_eq!(out.len(), 40_000);
    assert_eq!(hex(&out[..6]), "21 ff ff 22 64 1f");

    let rx = parse(Direction::DlSch, &out);
    assert_eq!(sdus(&rx), vec![(1, vec![0xaa; 32767]), (2, vec![0xbb; 100])]);
}

#[test]
/// An SDU the queue cannot hand out whole within the capped space is not taken
fn test_oversized_queued_sdu_left_behind() {
    debug::setup_logging_verbose();
    let mut tb = TbBuilder::new(Direction::UlSch, 40_000);
    assert_eq!(tb.sdu(3, &vec![0x11; 32768]), Ok(0));
    assert_eq!(tb.pdu.nof_subpdus(), 0);
    assert_eq!(hex(&tb.finish()[..1]), "1f");
}
