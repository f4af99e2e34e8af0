// Copyright (C) 2024-present The Routebench Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! One-directional TCP stream reassembly.
//!
//! The reassembler turns captured segments back into the contiguous byte
//! stream the receiving TCP stack would deliver. It never ACKs anything, so
//! it must tolerate whatever arrives: reordering, duplicates, overlaps, and
//! retransmissions of data already delivered.

use bytes::BytesMut;
use std::collections::BTreeMap;

/// Reassembles one direction of a TCP connection.
///
/// The first segment seen anchors the expected sequence number (a SYN
/// consumes one sequence number). Capture order is not stream order, so
/// until the consumer has taken a byte out of `available` the anchor may
/// still move backwards to an earlier-sequenced segment; a SYN fixes it
/// for good. All sequence arithmetic is wrapping; `seq` is on-the-wire
/// u32 space.
#[derive(Debug, Default)]
pub struct TcpReassembler {
    /// Sequence number of the next in-order byte, unset until the first
    /// segment arrives
    next_seq: Option<u32>,
    /// Out-of-order segments keyed by their absolute sequence number.
    /// First seen wins per offset.
    pending: BTreeMap<u32, Vec<u8>>,
    /// Contiguous reassembled bytes not yet consumed by the framer
    available: BytesMut,
    /// Total bytes ever moved into `available`. While this equals
    /// `available.len()` the consumer has taken nothing yet.
    delivered: u64,
    /// A SYN names the true stream start, so no rewinding past it
    syn_seen: bool,
}

impl TcpReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one captured segment.
    pub fn accept(&mut self, seq: u32, syn: bool, payload: &[u8]) {
        let data_seq = if syn { seq.wrapping_add(1) } else { seq };
        match self.next_seq {
            None => self.next_seq = Some(data_seq),
            Some(next) if next.wrapping_sub(data_seq) as i32 > 0 => {
                self.rewind_to(data_seq, next)
            }
            Some(_) => {}
        }
        if syn {
            self.syn_seen = true;
        }
        if payload.is_empty() {
            return;
        }
        self.pending
            .entry(data_seq)
            .or_insert_with(|| payload.to_vec());
        self.drain();
    }

    /// A segment starts before the current cursor. If it starts before the
    /// first delivered byte and the consumer has not taken anything yet,
    /// the anchor was only a guess from capture order: put the delivered
    /// bytes back into `pending` and re-anchor on the earlier segment.
    /// Once a byte has been consumed (or a SYN named the stream start) the
    /// anchor is final; overlaps and retransmissions inside the delivered
    /// range fall to the normal handling in `drain` either way.
    fn rewind_to(&mut self, data_seq: u32, next: u32) {
        if self.syn_seen || self.available.len() as u64 != self.delivered {
            return;
        }
        let start = next.wrapping_sub(self.available.len() as u32);
        if start.wrapping_sub(data_seq) as i32 <= 0 {
            return;
        }
        if !self.available.is_empty() {
            self.pending.insert(start, self.available.to_vec());
            self.available.clear();
            self.delivered = 0;
        }
        self.next_seq = Some(data_seq);
    }

    /// Contiguous reassembled bytes. The framer consumes from the front;
    /// whatever it leaves stays for the next round.
    pub fn available_mut(&mut self) -> &mut BytesMut {
        &mut self.available
    }

    /// Bytes buffered out of order, waiting for a gap to fill.
    pub fn pending_bytes(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Move every pending segment that touches the cursor into `available`.
    /// A segment overlapping data already delivered contributes only its
    /// novel suffix; one wholly behind the cursor is dropped.
    fn drain(&mut self) {
        let Some(mut next) = self.next_seq else {
            return;
        };
        loop {
            let candidate = self
                .pending
                .keys()
                .find(|seq| next.wrapping_sub(**seq) as i32 >= 0)
                .copied();
            let Some(seq) = candidate else {
                break;
            };
            let Some(payload) = self.pending.remove(&seq) else {
                break;
            };
            let skip = next.wrapping_sub(seq) as usize;
            if skip < payload.len() {
                self.available.extend_from_slice(&payload[skip..]);
                self.delivered += (payload.len() - skip) as u64;
                next = next.wrapping_add((payload.len() - skip) as u32);
            }
        }
        self.next_seq = Some(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn available(r: &mut TcpReassembler) -> Vec<u8> {
        r.available_mut().to_vec()
    }

    #[test]
    fn test_in_order() {
        let mut r = TcpReassembler::new();
        r.accept(1000, false, b"hello ");
        r.accept(1006, false, b"world");
        assert_eq!(available(&mut r), b"hello world");
        assert_eq!(r.pending_bytes(), 0);
    }

    #[test]
    fn test_reordering() {
        let mut r = TcpReassembler::new();
        r.accept(1000, false, b"abc");
        r.accept(1006, false, b"ghi");
        assert_eq!(available(&mut r), b"abc");
        assert_eq!(r.pending_bytes(), 3);
        r.accept(1003, false, b"def");
        assert_eq!(available(&mut r), b"abcdefghi");
        assert_eq!(r.pending_bytes(), 0);
    }

    #[test]
    fn test_syn_consumes_one_sequence_number() {
        let mut r = TcpReassembler::new();
        r.accept(999, true, b"");
        r.accept(1000, false, b"abc");
        assert_eq!(available(&mut r), b"abc");
    }

    #[test]
    fn test_duplicate_suppression() {
        let mut r = TcpReassembler::new();
        r.accept(1000, false, b"abc");
        r.accept(1000, false, b"abc");
        assert_eq!(available(&mut r), b"abc");
    }

    #[test]
    fn test_retransmission_behind_cursor_discarded() {
        let mut r = TcpReassembler::new();
        r.accept(1000, false, b"abcdef");
        r.accept(1000, false, b"abc");
        assert_eq!(available(&mut r), b"abcdef");
        assert_eq!(r.pending_bytes(), 0);
    }

    #[test]
    fn test_overlap_contributes_novel_suffix() {
        let mut r = TcpReassembler::new();
        r.accept(1000, false, b"abcd");
        // retransmission re-covers the tail and carries new data
        r.accept(1002, false, b"cdef");
        assert_eq!(available(&mut r), b"abcdef");
    }

    #[test]
    fn test_consumed_bytes_not_replayed() {
        let mut r = TcpReassembler::new();
        r.accept(1000, false, b"abc");
        // the framer consumes everything
        let _ = r.available_mut().split_to(3);
        r.accept(1000, false, b"abc");
        assert!(available(&mut r).is_empty());
    }

    #[test]
    fn test_first_segment_captured_late() {
        // capture saw the second segment first; nothing was consumed yet,
        // so the earlier segment must still make it into the stream
        let mut r = TcpReassembler::new();
        r.accept(1006, false, b"world");
        r.accept(1000, false, b"hello ");
        assert_eq!(available(&mut r), b"hello world");
        assert_eq!(r.pending_bytes(), 0);
    }

    #[test]
    fn test_no_rewind_after_consumption() {
        let mut r = TcpReassembler::new();
        r.accept(1006, false, b"world");
        // the framer consumed the delivered bytes, the anchor is final
        let _ = r.available_mut().split_to(5);
        r.accept(1000, false, b"hello ");
        assert!(available(&mut r).is_empty());
        assert_eq!(r.pending_bytes(), 0);
    }

    #[test]
    fn test_syn_fixes_anchor() {
        let mut r = TcpReassembler::new();
        r.accept(999, true, b"");
        // stale data from before the SYN's stream start is dropped
        r.accept(900, false, b"old");
        r.accept(1000, false, b"abc");
        assert_eq!(available(&mut r), b"abc");
        assert_eq!(r.pending_bytes(), 0);
    }

    #[test]
    fn test_sequence_wraparound() {
        let mut r = TcpReassembler::new();
        r.accept(u32::MAX - 1, false, b"ab");
        r.accept(0, false, b"cd");
        assert_eq!(available(&mut r), b"abcd");
    }

    #[test]
    fn test_out_of_order_across_wraparound() {
        let mut r = TcpReassembler::new();
        r.accept(u32::MAX - 1, false, b"ab");
        r.accept(2, false, b"ef");
        assert_eq!(r.pending_bytes(), 2);
        r.accept(0, false, b"cd");
        assert_eq!(available(&mut r), b"abcdef");
    }
}
