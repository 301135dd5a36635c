//! Decoding of received short messages (SMS-DELIVER PDUs) as reported by a
//! GSM modem in PDU mode, with reassembly of concatenated messages.
//!
//! # Examples
//!
//! ## Decoding a single PDU
//!
//! ```rust
//! use smspdu::MtPdu;
//!
//! let pdu = MtPdu::decode("0891683108200105F0040D91683129634152F600002180804184422304F7349B0D")?;
//! assert_eq!(pdu.originating_address.to_string(), "+8613923614256");
//! assert_eq!(pdu.text(), "will");
//! println!("{pdu}");
//! # Ok::<(), smspdu::PduError>(())
//! ```
//!
//! ## Reassembling concatenated messages
//!
//! Feed every decoded PDU to one [`ConcatenationReassembler`]. Plain messages
//! come straight back out; segments are held until the last one arrives.
//!
//! ```rust
//! use smspdu::{ConcatenationReassembler, MtPdu};
//!
//! let mut reassembler = ConcatenationReassembler::default();
//! let pdu = MtPdu::decode("0891683108200105F0040D91683129634152F600002180804184422304F7349B0D")?;
//! if let Some(message) = reassembler.ingest(pdu) {
//!     assert_eq!(message.text(), "will");
//! }
//! # Ok::<(), smspdu::PduError>(())
//! ```
//!
//! ## Reading from a modem
//!
//! [`Receiver`] runs the whole pipeline over the modem's line output and
//! sends finished messages down a channel.
//!
//! ```rust,no_run
//! use smspdu::{Receiver, MtPdu};
//! use tokio::io::BufReader;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let (tx, mut rx) = mpsc::channel::<MtPdu>(16);
//!     tokio::spawn(async move {
//!         while let Some(message) = rx.recv().await {
//!             println!("{message}");
//!         }
//!     });
//!
//!     let stdin = BufReader::new(tokio::io::stdin());
//!     let stats = Receiver::default().run(stdin, tx).await?;
//!     println!("{stats:?}");
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod datatypes;
pub mod encoding;
pub mod reassembly;
pub mod receiver;


pub use codec::{DecodeError, PduError, PduFormatError, PduResult};
pub use datatypes::{Address, DataCoding, DecoderConfig, MtPdu, MtPduDecoder, Timestamp};
pub use encoding::decode_text;
pub use reassembly::{ConcatenationReassembler, ReassemblyConfig};
pub use receiver::{ReceiveStats, Receiver};
