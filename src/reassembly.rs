// ABOUTME: Reassembly of concatenated short messages from their individually decoded segments
// ABOUTME: Segments are keyed by sender and reference; a message is emitted once every index has arrived

use crate::datatypes::{Address, MtPdu};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Limits on how much incomplete state the reassembler keeps.
///
/// Both limits are off by default, in which case a message that never
/// completes is held for the lifetime of the reassembler.
///
/// # Example
///
/// ```rust
/// use smspdu::reassembly::ReassemblyConfig;
/// use std::time::Duration;
///
/// let config = ReassemblyConfig::default()
///     .with_max_age(Duration::from_secs(600))
///     .with_max_pending(64);
/// assert_eq!(config.max_pending, Some(64));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReassemblyConfig {
    /// Drop a partial message this long after its first segment arrived
    pub max_age: Option<Duration>,
    /// Maximum number of partial messages; the oldest is dropped to make room
    pub max_pending: Option<usize>,
}

impl ReassemblyConfig {
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = Some(max_pending);
        self
    }
}

type ReassemblyKey = (Address, u16);

#[derive(Debug)]
struct PendingMessage {
    total_parts: u8,
    first_seen: Instant,
    parts: BTreeMap<u8, MtPdu>,
}

impl PendingMessage {
    fn new(total_parts: u8, now: Instant) -> Self {
        Self {
            total_parts,
            first_seen: now,
            parts: BTreeMap::new(),
        }
    }

    fn is_complete(&self) -> bool {
        self.parts.len() == self.total_parts as usize
    }

    /// Join the parts in index order into one message that carries the
    /// envelope of the lowest-numbered part.
    fn into_message(self) -> Option<MtPdu> {
        let mut parts = self.parts.into_values();
        let mut message = parts.next()?;
        for part in parts {
            message.user_data.text.push_str(&part.user_data.text);
        }
        message.user_data.header = None;
        message.user_data.elements.clear();
        Some(message)
    }
}

/// Collects concatenated message segments until each message is complete.
///
/// Not internally synchronized; feed it from one task.
#[derive(Debug, Default)]
pub struct ConcatenationReassembler {
    config: ReassemblyConfig,
    pending: HashMap<ReassemblyKey, PendingMessage>,
}

impl ConcatenationReassembler {
    pub fn new(config: ReassemblyConfig) -> Self {
        Self {
            config,
            pending: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ReassemblyConfig {
        &self.config
    }

    /// Feed one decoded PDU, using the current time for expiry.
    ///
    /// Returns the PDU itself if it is not a segment, the complete message if
    /// this segment was the last one missing, and `None` otherwise.
    pub fn ingest(&mut self, msg: MtPdu) -> Option<MtPdu> {
        self.ingest_at(msg, Instant::now())
    }

    /// Feed one decoded PDU as if it arrived at `now`.
    pub fn ingest_at(&mut self, msg: MtPdu, now: Instant) -> Option<MtPdu> {
        let Some(header) = msg.user_data.header else {
            return Some(msg);
        };

        self.evict_expired(now);

        let key = (msg.originating_address.clone(), header.reference);
        if let Some(entry) = self.pending.get(&key) {
            if entry.total_parts != header.total_parts {
                warn!(
                    from = %key.0,
                    reference = header.reference,
                    previous = entry.total_parts,
                    total = header.total_parts,
                    "Segment count changed, restarting reassembly"
                );
                self.pending.remove(&key);
            }
        } else {
            self.make_room();
        }

        let entry = self
            .pending
            .entry(key.clone())
            .or_insert_with(|| PendingMessage::new(header.total_parts, now));
        if entry.parts.insert(header.sequence_index, msg).is_some() {
            debug!(
                from = %key.0,
                reference = header.reference,
                index = header.sequence_index,
                "Duplicate segment replaced earlier copy"
            );
        }

        if !entry.is_complete() {
            info!(
                from = %key.0,
                reference = header.reference,
                received = entry.parts.len(),
                total = entry.total_parts,
                "Stored message segment"
            );
            return None;
        }

        let entry = self.pending.remove(&key)?;
        let total = entry.total_parts;
        let message = entry.into_message()?;
        info!(
            from = %key.0,
            reference = header.reference,
            parts = total,
            "Reassembled concatenated message"
        );
        Some(message)
    }

    /// Drop partial messages older than the configured maximum age.
    /// Returns how many were dropped.
    pub fn evict_expired(&mut self, now: Instant) -> usize {
        let Some(max_age) = self.config.max_age else {
            return 0;
        };

        let before = self.pending.len();
        self.pending.retain(|(from, reference), entry| {
            let expired = now.saturating_duration_since(entry.first_seen) > max_age;
            if expired {
                warn!(
                    %from,
                    reference,
                    received = entry.parts.len(),
                    total = entry.total_parts,
                    "Dropping expired partial message"
                );
            }
            !expired
        });
        before - self.pending.len()
    }

    /// Number of messages still waiting for segments
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if segments from `from` with this reference are waiting
    pub fn is_pending(&self, from: &Address, reference: u16) -> bool {
        self.pending.contains_key(&(from.clone(), reference))
    }

    fn make_room(&mut self) {
        let Some(max_pending) = self.config.max_pending else {
            return;
        };

        while self.pending.len() >= max_pending.max(1) {
            let Some(oldest) = self
                .pending
                .iter()
                .min_by_key(|(_, entry)| entry.first_seen)
                .map(|(key, _)| key.clone())
            else {
                return;
            };
            if let Some(entry) = self.pending.remove(&oldest) {
                warn!(
                    from = %oldest.0,
                    reference = oldest.1,
                    received = entry.parts.len(),
                    total = entry.total_parts,
                    "Too many partial messages, dropping the oldest"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::{
        ConcatenationHeader, DataCoding, DeliverFirstOctet, IEI_CONCAT_8BIT, InformationElement,
        NumberingPlan, Timestamp, TypeOfNumber, UserData,
    };

    fn sender(number: &str) -> Address {
        Address {
            type_of_number: TypeOfNumber::International,
            numbering_plan: NumberingPlan::Isdn,
            value: number.to_string(),
        }
    }

    fn segment(from: &str, reference: u16, total: u8, index: u8, text: &str) -> MtPdu {
        let header = ConcatenationHeader {
            reference,
            total_parts: total,
            sequence_index: index,
        };
        let mut pdu = message(from, text);
        pdu.first_octet.user_data_header = true;
        pdu.user_data.header = Some(header);
        pdu.user_data.elements = vec![InformationElement {
            id: IEI_CONCAT_8BIT,
            data: vec![reference as u8, total, index],
        }];
        pdu
    }

    fn message(from: &str, text: &str) -> MtPdu {
        MtPdu {
            service_center_address: sender("447802000332"),
            first_octet: DeliverFirstOctet::from_byte(0x04).unwrap(),
            originating_address: sender(from),
            protocol_id: 0,
            data_coding: DataCoding::Gsm7,
            timestamp: Timestamp::decode(&[0x21, 0x80, 0x80, 0x41, 0x84, 0x42, 0x23], 2000)
                .unwrap(),
            user_data: UserData {
                header: None,
                elements: Vec::new(),
                text: text.to_string(),
            },
        }
    }

    #[test]
    fn test_single_message_passes_through() {
        let mut reassembler = ConcatenationReassembler::default();
        let msg = message("4477", "hello");
        assert_eq!(reassembler.ingest(msg.clone()), Some(msg));
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_out_of_order_segments() {
        let mut reassembler = ConcatenationReassembler::default();
        assert_eq!(reassembler.ingest(segment("4477", 5, 3, 2, "two ")), None);
        assert_eq!(reassembler.ingest(segment("4477", 5, 3, 1, "one ")), None);
        assert!(reassembler.is_pending(&sender("4477"), 5));

        let full = reassembler.ingest(segment("4477", 5, 3, 3, "three")).unwrap();
        assert_eq!(full.text(), "one two three");
        assert!(full.user_data.header.is_none());
        assert!(full.user_data.elements.is_empty());
        assert!(!full.is_segment());
        assert_eq!(full.originating_address, sender("4477"));
        assert_eq!(reassembler.pending(), 0);
        assert!(!reassembler.is_pending(&sender("4477"), 5));
    }

    #[test]
    fn test_envelope_comes_from_first_index() {
        let mut reassembler = ConcatenationReassembler::default();
        let mut second = segment("4477", 9, 2, 2, "b");
        second.protocol_id = 0x41;
        let first = segment("4477", 9, 2, 1, "a");

        assert_eq!(reassembler.ingest(second), None);
        let full = reassembler.ingest(first).unwrap();
        assert_eq!(full.protocol_id, 0);
        assert_eq!(full.text(), "ab");
    }

    #[test]
    fn test_references_are_scoped_by_sender() {
        let mut reassembler = ConcatenationReassembler::default();
        assert_eq!(reassembler.ingest(segment("111", 1, 2, 1, "a1")), None);
        assert_eq!(reassembler.ingest(segment("222", 1, 2, 2, "b2")), None);
        assert_eq!(reassembler.pending(), 2);

        let a = reassembler.ingest(segment("111", 1, 2, 2, "a2")).unwrap();
        assert_eq!(a.text(), "a1a2");
        let b = reassembler.ingest(segment("222", 1, 2, 1, "b1")).unwrap();
        assert_eq!(b.text(), "b1b2");
    }

    #[test]
    fn test_duplicate_index_last_write_wins() {
        let mut reassembler = ConcatenationReassembler::default();
        assert_eq!(reassembler.ingest(segment("4477", 3, 2, 1, "old")), None);
        assert_eq!(reassembler.ingest(segment("4477", 3, 2, 1, "new")), None);
        assert_eq!(reassembler.pending(), 1);

        let full = reassembler.ingest(segment("4477", 3, 2, 2, "!")).unwrap();
        assert_eq!(full.text(), "new!");
    }

    #[test]
    fn test_changed_total_restarts() {
        let mut reassembler = ConcatenationReassembler::default();
        assert_eq!(reassembler.ingest(segment("4477", 8, 3, 1, "stale")), None);
        assert_eq!(reassembler.ingest(segment("4477", 8, 2, 2, "b")), None);
        let full = reassembler.ingest(segment("4477", 8, 2, 1, "a")).unwrap();
        assert_eq!(full.text(), "ab");
        assert_eq!(reassembler.pending(), 0);
    }

    #[test]
    fn test_single_part_segment_completes_immediately() {
        let mut reassembler = ConcatenationReassembler::default();
        let full = reassembler.ingest(segment("4477", 4, 1, 1, "only")).unwrap();
        assert_eq!(full.text(), "only");
        assert!(full.user_data.header.is_none());
    }

    #[test]
    fn test_unbounded_by_default() {
        let mut reassembler = ConcatenationReassembler::default();
        let start = Instant::now();
        reassembler.ingest_at(segment("4477", 1, 2, 1, "a"), start);
        assert_eq!(reassembler.evict_expired(start + Duration::from_secs(86_400)), 0);
        assert_eq!(reassembler.pending(), 1);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let config = ReassemblyConfig::default().with_max_age(Duration::from_secs(60));
        let mut reassembler = ConcatenationReassembler::new(config);
        let start = Instant::now();

        reassembler.ingest_at(segment("4477", 1, 2, 1, "a"), start);
        reassembler.ingest_at(segment("4477", 2, 2, 1, "x"), start + Duration::from_secs(50));
        assert_eq!(reassembler.evict_expired(start + Duration::from_secs(61)), 1);
        assert!(!reassembler.is_pending(&sender("4477"), 1));
        assert!(reassembler.is_pending(&sender("4477"), 2));

        // A late segment of the dropped message starts over
        let late = reassembler.ingest_at(
            segment("4477", 1, 2, 2, "b"),
            start + Duration::from_secs(62),
        );
        assert_eq!(late, None);
        assert!(reassembler.is_pending(&sender("4477"), 1));
    }

    #[test]
    fn test_max_pending_drops_oldest() {
        let config = ReassemblyConfig::default().with_max_pending(2);
        let mut reassembler = ConcatenationReassembler::new(config);
        let start = Instant::now();

        reassembler.ingest_at(segment("4477", 1, 2, 1, "a"), start);
        reassembler.ingest_at(segment("4477", 2, 2, 1, "b"), start + Duration::from_secs(1));
        reassembler.ingest_at(segment("4477", 3, 2, 1, "c"), start + Duration::from_secs(2));

        assert_eq!(reassembler.pending(), 2);
        assert!(!reassembler.is_pending(&sender("4477"), 1));
        assert!(reassembler.is_pending(&sender("4477"), 2));
        assert!(reassembler.is_pending(&sender("4477"), 3));

        // Segments for an open entry never evict anything
        reassembler.ingest_at(segment("4477", 2, 2, 1, "b"), start + Duration::from_secs(3));
        assert_eq!(reassembler.pending(), 2);
    }
}
