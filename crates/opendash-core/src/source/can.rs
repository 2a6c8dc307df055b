//! CAN frame source
//!
//! Frames arrive out-of-band: the bus-interface collaborator pushes them
//! through a [`CanFrameTx`] handle. A burst of frames for one id between
//! ticks coalesces to the latest payload only. `update(frame id)` promotes
//! the latest pending payload to the readable sample; when nothing new has
//! arrived the previous payload is retained, never blocked on.

use std::collections::HashMap;
use std::sync::mpsc;

use super::{ChannelId, RawSample, SensorSource, SourceError};

/// One received bus frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanFrame {
    /// Bus identifier of the frame.
    pub frame_id: u32,
    /// Raw payload bytes as they arrived on the wire.
    pub payload: Vec<u8>,
}

impl CanFrame {
    /// Convenience constructor.
    pub fn new(frame_id: u32, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            frame_id,
            payload: payload.into(),
        }
    }
}

/// Cloneable push handle given to the bus-interface collaborator.
#[derive(Clone)]
pub struct CanFrameTx {
    tx: mpsc::Sender<CanFrame>,
}

impl CanFrameTx {
    /// Deliver one received frame. Returns false once the dash side is gone.
    pub fn push(&self, frame: CanFrame) -> bool {
        self.tx.send(frame).is_ok()
    }
}

/// CAN-backed sensor source; channel = frame id.
pub struct CanFrameSource {
    rx: mpsc::Receiver<CanFrame>,
    pending: HashMap<u32, Vec<u8>>,
    samples: HashMap<u32, RawSample>,
}

impl CanFrameSource {
    /// Create the source together with its push handle.
    pub fn new() -> (Self, CanFrameTx) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                rx,
                pending: HashMap::new(),
                samples: HashMap::new(),
            },
            CanFrameTx { tx },
        )
    }

    fn drain(&mut self) {
        while let Ok(frame) = self.rx.try_recv() {
            self.pending.insert(frame.frame_id, frame.payload);
        }
    }
}

impl SensorSource for CanFrameSource {
    fn name(&self) -> &str {
        "can"
    }

    fn update(&mut self, channel: ChannelId) -> Result<(), SourceError> {
        let frame_id = channel as u32;
        self.drain();
        if let Some(payload) = self.pending.remove(&frame_id) {
            self.samples.insert(frame_id, RawSample::frame(payload));
        }
        if self.samples.contains_key(&frame_id) {
            Ok(())
        } else {
            Err(SourceError::NoData)
        }
    }

    fn read(&self, channel: ChannelId) -> RawSample {
        self.samples
            .get(&(channel as u32))
            .cloned()
            .unwrap_or_else(RawSample::invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_coalesces_to_latest_payload() {
        let (mut source, tx) = CanFrameSource::new();
        tx.push(CanFrame::new(0x123, [0x01, 0x00]));
        tx.push(CanFrame::new(0x123, [0x02, 0x00]));
        tx.push(CanFrame::new(0x123, [0x03, 0x00]));

        source.update(0x123).unwrap();
        assert_eq!(source.read(0x123).as_frame(), Some(&[0x03, 0x00][..]));
    }

    #[test]
    fn stale_payload_retained_between_arrivals() {
        let (mut source, tx) = CanFrameSource::new();
        tx.push(CanFrame::new(0x200, [0xAA]));
        source.update(0x200).unwrap();

        // Nothing new arrives: the old payload stays readable.
        source.update(0x200).unwrap();
        assert_eq!(source.read(0x200).as_frame(), Some(&[0xAA][..]));
    }

    #[test]
    fn never_received_frame_is_no_data() {
        let (mut source, _tx) = CanFrameSource::new();
        assert_eq!(source.update(0x300), Err(SourceError::NoData));
        assert!(!source.read(0x300).valid);
    }

    #[test]
    fn frames_for_other_ids_stay_pending() {
        let (mut source, tx) = CanFrameSource::new();
        tx.push(CanFrame::new(0x100, [0x01]));
        tx.push(CanFrame::new(0x101, [0x02]));

        source.update(0x100).unwrap();
        assert!(!source.read(0x101).valid);

        // Its own update promotes it, no re-delivery needed.
        source.update(0x101).unwrap();
        assert_eq!(source.read(0x101).as_frame(), Some(&[0x02][..]));
    }
}
