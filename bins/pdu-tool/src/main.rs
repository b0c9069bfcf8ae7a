use clap::{Parser, Subcommand};

use lte_config::{SharedConfig, toml_config};
use lte_core::{BitBuffer, Direction, debug};

mod tools;
use tools::assembler::{SchBuildArgs, TbAssembler, parse_mch_sched_arg, parse_rar_arg, parse_sdu_arg};
use tools::decoder::MacDecoder;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "LTE MAC PDU tool",
    long_about = "Decodes raw LTE MAC transport blocks, or assembles one from SDUs and control elements"
)]
struct Args {
    /// Optional TOML config overriding the container capacities
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a transport block given as hex octets
    Decode {
        #[arg(help = "Channel: [ dl | ul | mch | rar ]")]
        channel: String,

        #[arg(help = "Transport block as hex, e.g. \"21 08 1f ...\"")]
        hex: String,
    },

    /// Assemble a DL-SCH, UL-SCH or MCH transport block
    Build {
        #[arg(help = "Channel: [ dl | ul | mch ]")]
        channel: String,

        #[arg(short = 'l', long = "len", help = "Transport block size in bytes")]
        pdu_len: usize,

        #[arg(long = "sdu", value_parser = parse_sdu_arg, help = "SDU as LCID:HEX, repeatable")]
        sdus: Vec<(u8, Vec<u8>)>,

        #[arg(long = "bsr", value_delimiter = ',', num_args = 4, help = "UL: buffer occupancy per LCG in bytes, b0,b1,b2,b3")]
        bsr: Option<Vec<u32>>,

        #[arg(long = "bsr-format", default_value = "short", help = "UL: [ short | long | truncated ]")]
        bsr_format: String,

        #[arg(long = "phr", allow_negative_numbers = true, help = "UL: power headroom in dB")]
        phr: Option<f32>,

        #[arg(long = "crnti", help = "UL: C-RNTI")]
        crnti: Option<u16>,

        #[arg(long = "ta", help = "DL: timing advance command, 0..=63")]
        ta: Option<u8>,

        #[arg(long = "con-res-id", help = "DL: 48-bit contention resolution identity as hex")]
        con_res_id: Option<String>,

        #[arg(long = "drx", help = "DL: add a DRX command")]
        drx: bool,

        #[arg(long = "scell", value_delimiter = ',', help = "DL: SCell indices to activate")]
        scells: Vec<usize>,

        #[arg(long = "mch-sched", value_parser = parse_mch_sched_arg, help = "MCH: scheduling entry as LCID:STOP, repeatable")]
        mch_sched: Vec<(u8, u16)>,
    },

    /// Assemble a Random Access Response
    Rar {
        #[arg(short = 'l', long = "len", help = "Transport block size in bytes")]
        pdu_len: usize,

        #[arg(long = "backoff", help = "Backoff indicator, 0..=15")]
        backoff: Option<u8>,

        #[arg(long = "rar", value_parser = parse_rar_arg, help = "RAR as RAPID:TA:GRANT:TCRNTI, grant in hex, repeatable")]
        rars: Vec<(u8, u16, u32, u16)>,
    },
}

/// Load configuration file
fn load_config(cfg_path: Option<&str>) -> SharedConfig {
    let Some(cfg_path) = cfg_path else {
        return SharedConfig::default();
    };
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

fn parse_channel(channel: &str) -> Direction {
    match channel.parse::<Direction>() {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn main() {
    eprintln!("[+] LTE MAC PDU tool");

    let args = Args::parse();
    let cfg = load_config(args.config.as_deref());
    let _log_guard = debug::setup_logging_default(cfg.config().debug_log.clone());
    let mac_cfg = cfg.config().mac.clone();

    let result = match args.command {
        Command::Decode { channel, hex } => {
            let data = match BitBuffer::from_hexstr(&hex) {
                Ok(buf) => buf.into_bytes(),
                Err(e) => {
                    eprintln!("Error: invalid hex input: {}", e);
                    std::process::exit(1);
                }
            };
            if channel.eq_ignore_ascii_case("rar") {
                MacDecoder::decode_rar(&mac_cfg, &data)
            } else {
                MacDecoder::decode_sch(&mac_cfg, parse_channel(&channel), &data)
            }
        }
        Command::Build {
            channel,
            pdu_len,
            sdus,
            bsr,
            bsr_format,
            phr,
            crnti,
            ta,
            con_res_id,
            drx,
            scells,
            mch_sched,
        } => {
            let build = SchBuildArgs { sdus, bsr, bsr_format, phr, crnti, ta, con_res_id, drx, scells, mch_sched };
            TbAssembler::new(&mac_cfg).build_sch(parse_channel(&channel), pdu_len, &build).map(|tb| {
                println!("{}", BitBuffer::from_bytes(&tb).dump_octets());
            })
        }
        Command::Rar { pdu_len, backoff, rars } => TbAssembler::new(&mac_cfg).build_rar(pdu_len, backoff, &rars).map(|tb| {
            println!("{}", BitBuffer::from_bytes(&tb).dump_octets());
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
