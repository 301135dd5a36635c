// ABOUTME: Async receive loop over a modem's unsolicited result lines (+CMT notification, then hex PDU)
// ABOUTME: Decodes each PDU, runs it through reassembly and forwards finished messages over a channel

use crate::codec::{HexData, decode_hex};
use crate::datatypes::{MtPdu, MtPduDecoder, tpdu_length};
use crate::reassembly::ConcatenationReassembler;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

const CMT_PREFIX: &str = "+CMT:";

/// Counters for one run of the receive loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    /// `+CMT` notifications seen
    pub notifications: usize,
    /// PDUs decoded successfully
    pub decoded: usize,
    /// PDUs that failed to decode
    pub failed: usize,
    /// Complete messages handed to the channel
    pub delivered: usize,
}

/// Turns a stream of modem lines into complete messages.
///
/// In PDU mode a modem reports each received message as two lines:
///
/// ```text
/// +CMT: ,24
/// 0891683108200105F0040D91683129634152F600002180804184422304F7349B0D
/// ```
///
/// The number after the comma is the TPDU length. Some modems get it wrong,
/// so a mismatch is only logged.
#[derive(Debug, Default)]
pub struct Receiver {
    decoder: MtPduDecoder,
    reassembler: ConcatenationReassembler,
}

impl Receiver {
    pub fn new(decoder: MtPduDecoder, reassembler: ConcatenationReassembler) -> Self {
        Self {
            decoder,
            reassembler,
        }
    }

    pub fn reassembler(&self) -> &ConcatenationReassembler {
        &self.reassembler
    }

    /// Read lines until end of input or until `sender` is closed.
    ///
    /// Bad PDUs are logged and skipped. Only I/O errors from `reader` end the
    /// loop early.
    pub async fn run<R>(&mut self, reader: R, sender: mpsc::Sender<MtPdu>) -> io::Result<ReceiveStats>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut stats = ReceiveStats::default();
        let mut lines = reader.lines();
        // Set after a +CMT line; holds the reported TPDU length if it parsed
        let mut awaiting_pdu: Option<Option<usize>> = None;

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(params) = line.strip_prefix(CMT_PREFIX) {
                stats.notifications += 1;
                if awaiting_pdu.is_some() {
                    warn!("+CMT notification without a PDU line");
                }
                awaiting_pdu = Some(parse_length(params));
                continue;
            }

            let Some(reported) = awaiting_pdu.take() else {
                trace!(line, "Ignoring line");
                continue;
            };

            let Some(message) = self.handle_pdu(line, reported, &mut stats) else {
                continue;
            };
            if sender.send(message).await.is_err() {
                debug!("Message channel closed, stopping receiver");
                break;
            }
            stats.delivered += 1;
        }

        Ok(stats)
    }

    fn handle_pdu(
        &mut self,
        line: &str,
        reported: Option<usize>,
        stats: &mut ReceiveStats,
    ) -> Option<MtPdu> {
        let octets = match decode_hex(line) {
            Ok(octets) => octets,
            Err(e) => {
                stats.failed += 1;
                error!(pdu = line, error = %e, "Failed to decode PDU");
                return None;
            }
        };

        if let (Some(reported), Ok(actual)) = (reported, tpdu_length(&octets)) {
            if reported != actual {
                warn!(reported, actual, "Modem reported a different TPDU length");
            }
        }

        match self.decoder.decode_bytes(&octets) {
            Ok(pdu) => {
                stats.decoded += 1;
                self.reassembler.ingest(pdu)
            }
            Err(e) => {
                stats.failed += 1;
                error!(pdu = %HexData(&octets), error = %e, "Failed to decode PDU");
                None
            }
        }
    }
}

/// Length parameter of a `+CMT: [<alpha>],<length>` line.
fn parse_length(params: &str) -> Option<usize> {
    let length = params.rsplit_once(',').map(|(_, length)| length.trim());
    match length.map(str::parse) {
        Some(Ok(length)) => Some(length),
        _ => {
            warn!(params, "Unreadable +CMT length, decoding without it");
            None
        }
    }
}
