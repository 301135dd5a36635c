// ABOUTME: Command-line demo that decodes SMS-DELIVER PDUs given as arguments or read from stdin
// ABOUTME: Stdin is treated as raw modem output (+CMT lines followed by hex PDUs)

use argh::FromArgs;
use smspdu::{
    ConcatenationReassembler, DecoderConfig, MtPdu, MtPduDecoder, ReassemblyConfig, Receiver,
};
use std::error::Error;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Decode received short messages from a GSM modem in PDU mode
#[derive(FromArgs)]
struct CliArgs {
    /// whether or not to enable debugging
    #[argh(switch, short = 'd')]
    debugging: bool,

    /// century added to two-digit years (default: 2000)
    #[argh(option)]
    century: Option<i32>,

    /// seconds to keep an incomplete multi-part message (default: forever)
    #[argh(option)]
    max_age: Option<u64>,

    /// hex PDUs to decode; without any, modem output is read from stdin
    #[argh(positional)]
    pdus: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli_args: CliArgs = argh::from_env();

    let level = if cli_args.debugging { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut decoder_config = DecoderConfig::default();
    if let Some(century) = cli_args.century {
        decoder_config = decoder_config.with_century(century);
    }
    let mut reassembly_config = ReassemblyConfig::default();
    if let Some(secs) = cli_args.max_age {
        reassembly_config = reassembly_config.with_max_age(Duration::from_secs(secs));
    }

    let decoder = MtPduDecoder::new(decoder_config);
    let mut reassembler = ConcatenationReassembler::new(reassembly_config);

    if !cli_args.pdus.is_empty() {
        for hex in &cli_args.pdus {
            let pdu = decoder.decode(hex)?;
            if let Some(message) = reassembler.ingest(pdu) {
                println!("{message}");
            }
        }
        if reassembler.pending() > 0 {
            eprintln!("{} message(s) still incomplete", reassembler.pending());
        }
        return Ok(());
    }

    let (tx, mut rx) = mpsc::channel::<MtPdu>(16);
    let printer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            println!("{message}");
        }
    });

    let mut receiver = Receiver::new(decoder, reassembler);
    let stats = receiver.run(BufReader::new(tokio::io::stdin()), tx).await?;
    printer.await?;

    eprintln!(
        "{} notifications, {} decoded, {} failed, {} delivered",
        stats.notifications, stats.decoded, stats.failed, stats.delivered
    );
    Ok(())
}
