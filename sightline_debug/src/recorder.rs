// Copyright 2026 the Sightline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a shared
//! byte buffer as fixed-size little-endian records. Clones of a recorder
//! append to the same buffer, so one clone can be handed to an
//! [`ExposureChecker`](sightline_core::checker::ExposureChecker) while
//! another is kept to read the recording back. [`decode`] reads the bytes as
//! an iterator of [`RecordedEvent`].
//!
//! Rich events ([`on_obstructions`](TraceSink::on_obstructions)) store only
//! the count.

use std::cell::{RefCell, RefMut};
use std::rc::Rc;

use sightline_core::checker::TrackingState;
use sightline_core::exposure::GeometryError;
use sightline_core::source::{TouchPhase, Trigger, TriggerReason};
use sightline_core::time::HostTime;
use sightline_core::trace::{
    DebounceEvent, EvaluationEvent, EvaluationOutcome, ObstructionEvent, SignalEvent,
    StateChangeEvent, TouchEvent, TraceSink,
};
use sightline_core::view::ViewId;

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_STATE_CHANGE: u8 = 1;
const TAG_SIGNAL: u8 = 2;
const TAG_TOUCH: u8 = 3;
const TAG_DEBOUNCE: u8 = 4;
const TAG_EVALUATION: u8 = 5;
const TAG_OBSTRUCTIONS_COUNT: u8 = 6;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Clone, Debug, Default)]
pub struct RecorderSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded bytes.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    /// Number of recorded bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }

    /// Discards the recording for every clone.
    pub fn clear(&self) {
        self.buf.borrow_mut().clear();
    }

    fn encoder(&self, tag: u8) -> Encoder<'_> {
        let mut enc = Encoder {
            buf: self.buf.borrow_mut(),
        };
        enc.u8(tag);
        enc
    }
}

// -- encoding helpers --------------------------------------------------------

struct Encoder<'a> {
    buf: RefMut<'a, Vec<u8>>,
}

impl Encoder<'_> {
    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn bool(&mut self, v: bool) {
        self.u8(u8::from(v));
    }

    fn time(&mut self, t: HostTime) {
        self.u64(t.ticks());
    }

    fn view(&mut self, id: ViewId) {
        self.u32(id.index());
        self.u32(id.generation());
    }

    fn option_view(&mut self, id: Option<ViewId>) {
        match id {
            Some(id) => {
                self.u8(1);
                self.view(id);
            }
            None => {
                self.u8(0);
                self.u64(0);
            }
        }
    }

    fn option_f64(&mut self, v: Option<f64>) {
        self.u8(u8::from(v.is_some()));
        self.u64(v.unwrap_or(0.0).to_bits());
    }

    fn state(&mut self, s: TrackingState) {
        self.u8(match s {
            TrackingState::Idle => 0,
            TrackingState::Observing => 1,
            TrackingState::Suspended => 2,
            TrackingState::Stopped => 3,
        });
    }

    fn reason(&mut self, r: TriggerReason) {
        self.u8(match r {
            TriggerReason::Start => 0,
            TriggerReason::Scroll => 1,
            TriggerReason::WindowResize => 2,
            TriggerReason::Layout => 3,
            TriggerReason::Visibility => 4,
            TriggerReason::Topology => 5,
            TriggerReason::Touch => 6,
            TriggerReason::Poll => 7,
        });
    }

    fn phase(&mut self, p: TouchPhase) {
        self.u8(match p {
            TouchPhase::Began => 0,
            TouchPhase::Moved => 1,
            TouchPhase::Ended => 2,
            TouchPhase::Cancelled => 3,
        });
    }

    fn outcome(&mut self, o: EvaluationOutcome) {
        self.u8(match o {
            EvaluationOutcome::Changed => 0,
            EvaluationOutcome::Unchanged => 1,
            EvaluationOutcome::Failed(GeometryError::Detached) => 2,
            EvaluationOutcome::Failed(GeometryError::TargetReleased) => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_state_change(&mut self, e: &StateChangeEvent) {
        let mut enc = self.encoder(TAG_STATE_CHANGE);
        enc.option_view(e.target);
        enc.state(e.from);
        enc.state(e.to);
        enc.time(e.at);
    }

    fn on_signal(&mut self, e: &SignalEvent) {
        let mut enc = self.encoder(TAG_SIGNAL);
        enc.view(e.target);
        enc.reason(e.trigger.reason);
        enc.bool(e.trigger.immediate);
        enc.time(e.at);
    }

    fn on_touch(&mut self, e: &TouchEvent) {
        let mut enc = self.encoder(TAG_TOUCH);
        enc.view(e.target);
        enc.phase(e.phase);
        enc.bool(e.suspended);
        enc.time(e.at);
    }

    fn on_debounce(&mut self, e: &DebounceEvent) {
        let mut enc = self.encoder(TAG_DEBOUNCE);
        enc.view(e.target);
        enc.reason(e.reason);
        enc.time(e.deadline);
        enc.bool(e.replaced);
        enc.time(e.at);
    }

    fn on_evaluation(&mut self, e: &EvaluationEvent) {
        let mut enc = self.encoder(TAG_EVALUATION);
        enc.view(e.target);
        enc.reason(e.reason);
        enc.outcome(e.outcome);
        enc.option_f64(e.fraction);
        enc.time(e.at);
    }

    fn on_obstructions(&mut self, e: &ObstructionEvent<'_>) {
        let mut enc = self.encoder(TAG_OBSTRUCTIONS_COUNT);
        enc.view(e.target);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "obstruction count capped at u32::MAX for recording"
        )]
        enc.u32(e.rects.len().min(u32::MAX as usize) as u32);
        enc.time(e.at);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug)]
pub enum RecordedEvent {
    /// A [`StateChangeEvent`].
    StateChange(StateChangeEvent),
    /// A [`SignalEvent`].
    Signal(SignalEvent),
    /// A [`TouchEvent`].
    Touch(TouchEvent),
    /// A [`DebounceEvent`].
    Debounce(DebounceEvent),
    /// An [`EvaluationEvent`].
    Evaluation(EvaluationEvent),
    /// Obstruction count for one evaluation.
    ObstructionsCount {
        /// The tracked view.
        target: ViewId,
        /// Number of obstruction rectangles.
        count: u32,
        /// Host time of evaluation.
        at: HostTime,
    },
}

impl RecordedEvent {
    /// Host time the event happened at.
    #[must_use]
    pub fn at(&self) -> HostTime {
        match self {
            Self::StateChange(e) => e.at,
            Self::Signal(e) => e.at,
            Self::Touch(e) => e.at,
            Self::Debounce(e) => e.at,
            Self::Evaluation(e) => e.at,
            Self::ObstructionsCount { at, .. } => *at,
        }
    }
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_u64(&mut self) -> Option<u64> {
        if self.remaining() < 8 {
            return None;
        }
        let v = u64::from_le_bytes(self.data[self.pos..self.pos + 8].try_into().ok()?);
        self.pos += 8;
        Some(v)
    }

    fn read_bool(&mut self) -> Option<bool> {
        Some(self.read_u8()? != 0)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_view(&mut self) -> Option<ViewId> {
        let index = self.read_u32()?;
        let generation = self.read_u32()?;
        Some(ViewId::from_raw(index, generation))
    }

    fn read_option_view(&mut self) -> Option<Option<ViewId>> {
        let present = self.read_u8()?;
        let view = self.read_view()?;
        Some((present != 0).then_some(view))
    }

    fn read_option_f64(&mut self) -> Option<Option<f64>> {
        let present = self.read_u8()?;
        let bits = self.read_u64()?;
        Some((present != 0).then(|| f64::from_bits(bits)))
    }

    fn read_state(&mut self) -> Option<TrackingState> {
        Some(match self.read_u8()? {
            0 => TrackingState::Idle,
            1 => TrackingState::Observing,
            2 => TrackingState::Suspended,
            _ => TrackingState::Stopped,
        })
    }

    fn read_reason(&mut self) -> Option<TriggerReason> {
        Some(match self.read_u8()? {
            0 => TriggerReason::Start,
            1 => TriggerReason::Scroll,
            2 => TriggerReason::WindowResize,
            3 => TriggerReason::Layout,
            4 => TriggerReason::Visibility,
            5 => TriggerReason::Topology,
            6 => TriggerReason::Touch,
            _ => TriggerReason::Poll,
        })
    }

    fn read_phase(&mut self) -> Option<TouchPhase> {
        Some(match self.read_u8()? {
            0 => TouchPhase::Began,
            1 => TouchPhase::Moved,
            2 => TouchPhase::Ended,
            _ => TouchPhase::Cancelled,
        })
    }

    fn read_outcome(&mut self) -> Option<EvaluationOutcome> {
        Some(match self.read_u8()? {
            0 => EvaluationOutcome::Changed,
            1 => EvaluationOutcome::Unchanged,
            2 => EvaluationOutcome::Failed(GeometryError::Detached),
            _ => EvaluationOutcome::Failed(GeometryError::TargetReleased),
        })
    }

    fn decode_state_change(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::StateChange(StateChangeEvent {
            target: self.read_option_view()?,
            from: self.read_state()?,
            to: self.read_state()?,
            at: self.read_time()?,
        }))
    }

    fn decode_signal(&mut self) -> Option<RecordedEvent> {
        let target = self.read_view()?;
        let reason = self.read_reason()?;
        let immediate = self.read_bool()?;
        Some(RecordedEvent::Signal(SignalEvent {
            target,
            trigger: Trigger { reason, immediate },
            at: self.read_time()?,
        }))
    }

    fn decode_touch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Touch(TouchEvent {
            target: self.read_view()?,
            phase: self.read_phase()?,
            suspended: self.read_bool()?,
            at: self.read_time()?,
        }))
    }

    fn decode_debounce(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Debounce(DebounceEvent {
            target: self.read_view()?,
            reason: self.read_reason()?,
            deadline: self.read_time()?,
            replaced: self.read_bool()?,
            at: self.read_time()?,
        }))
    }

    fn decode_evaluation(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Evaluation(EvaluationEvent {
            target: self.read_view()?,
            reason: self.read_reason()?,
            outcome: self.read_outcome()?,
            fraction: self.read_option_f64()?,
            at: self.read_time()?,
        }))
    }

    fn decode_obstructions_count(&mut self) -> Option<RecordedEvent> {
        let target = self.read_view()?;
        let count = self.read_u32()?;
        let at = self.read_time()?;
        Some(RecordedEvent::ObstructionsCount { target, count, at })
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_STATE_CHANGE => self.decode_state_change(),
            TAG_SIGNAL => self.decode_signal(),
            TAG_TOUCH => self.decode_touch(),
            TAG_DEBOUNCE => self.decode_debounce(),
            TAG_EVALUATION => self.decode_evaluation(),
            TAG_OBSTRUCTIONS_COUNT => self.decode_obstructions_count(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const AD: ViewId = ViewId::from_raw(3, 1);

    #[test]
    fn clones_share_one_recording() {
        let rec = RecorderSink::new();
        let mut handed_out = rec.clone();
        handed_out.on_signal(&SignalEvent {
            target: AD,
            trigger: Trigger::debounced(TriggerReason::Scroll),
            at: HostTime(10),
        });
        assert!(!rec.is_empty());

        let events: Vec<_> = decode(&rec.bytes()).collect();
        assert_eq!(events.len(), 1);
        match &events[0] {
            RecordedEvent::Signal(e) => {
                assert_eq!(e.target, AD);
                assert_eq!(e.trigger, Trigger::debounced(TriggerReason::Scroll));
                assert_eq!(e.at, HostTime(10));
            }
            other => panic!("expected Signal, got {other:?}"),
        }

        rec.clear();
        assert!(handed_out.is_empty());
    }

    #[test]
    fn decodes_a_tracking_session() {
        let mut rec = RecorderSink::new();
        rec.on_state_change(&StateChangeEvent {
            target: Some(AD),
            from: TrackingState::Idle,
            to: TrackingState::Observing,
            at: HostTime(0),
        });
        rec.on_evaluation(&EvaluationEvent {
            target: AD,
            reason: TriggerReason::Start,
            outcome: EvaluationOutcome::Changed,
            fraction: Some(0.6),
            at: HostTime(0),
        });
        rec.on_touch(&TouchEvent {
            target: AD,
            phase: TouchPhase::Began,
            suspended: false,
            at: HostTime(5),
        });
        rec.on_debounce(&DebounceEvent {
            target: AD,
            reason: TriggerReason::Scroll,
            deadline: HostTime(110),
            replaced: true,
            at: HostTime(10),
        });
        rec.on_evaluation(&EvaluationEvent {
            target: AD,
            reason: TriggerReason::Scroll,
            outcome: EvaluationOutcome::Failed(GeometryError::Detached),
            fraction: None,
            at: HostTime(110),
        });
        rec.on_state_change(&StateChangeEvent {
            target: None,
            from: TrackingState::Observing,
            to: TrackingState::Stopped,
            at: HostTime(200),
        });

        let events: Vec<_> = decode(&rec.bytes()).collect();
        assert_eq!(events.len(), 6);
        let times: Vec<_> = events.iter().map(RecordedEvent::at).collect();
        assert_eq!(
            times,
            [0, 0, 5, 10, 110, 200].map(HostTime).to_vec()
        );
        match &events[1] {
            RecordedEvent::Evaluation(e) => {
                assert_eq!(e.fraction, Some(0.6));
                assert_eq!(e.outcome, EvaluationOutcome::Changed);
            }
            other => panic!("expected Evaluation, got {other:?}"),
        }
        match &events[3] {
            RecordedEvent::Debounce(e) => {
                assert!(e.replaced);
                assert_eq!(e.deadline, HostTime(110));
            }
            other => panic!("expected Debounce, got {other:?}"),
        }
        match &events[4] {
            RecordedEvent::Evaluation(e) => {
                assert_eq!(e.fraction, None);
                assert_eq!(
                    e.outcome,
                    EvaluationOutcome::Failed(GeometryError::Detached)
                );
            }
            other => panic!("expected Evaluation, got {other:?}"),
        }
        match &events[5] {
            RecordedEvent::StateChange(e) => {
                assert_eq!(e.target, None);
                assert_eq!(e.to, TrackingState::Stopped);
            }
            other => panic!("expected StateChange, got {other:?}"),
        }
    }

    #[test]
    fn truncated_recording_stops_cleanly() {
        let mut rec = RecorderSink::new();
        rec.on_obstructions(&ObstructionEvent {
            target: AD,
            visible_rect: kurbo::Rect::ZERO,
            rects: &[],
            at: HostTime(1),
        });
        let mut bytes = rec.bytes();
        assert_eq!(decode(&bytes).count(), 1);
        bytes.pop();
        assert_eq!(decode(&bytes).count(), 0);
    }
}
