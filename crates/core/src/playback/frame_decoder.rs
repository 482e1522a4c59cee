use crate::media::domain::decode_engine::Packet;
use crate::shared::decoded_frame::DecodedFrame;

use super::error::PlaybackError;
use super::stream_session::StreamSession;

#[derive(Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    Frame(DecodedFrame),
    EndOfStream,
}

/// A packet partially fed to the decoder.
struct PendingPacket {
    data: Vec<u8>,
    offset: usize,
    pts: Option<i64>,
}

impl PendingPacket {
    fn new(packet: Packet) -> Self {
        Self {
            data: packet.data,
            offset: 0,
            pts: packet.pts,
        }
    }

    fn remaining(&self) -> &[u8] {
        &self.data[self.offset..]
    }

    /// Advances past `n` bytes, clamped to what is left.
    fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.data.len() - self.offset);
        self.offset += n;
        n
    }

    fn is_exhausted(&self) -> bool {
        self.offset >= self.data.len()
    }
}

/// Pulls exactly one decoded picture per call out of a [`StreamSession`].
///
/// Packets may hold several pictures; whatever the decoder has not consumed
/// stays pending and is fed first on the next call. Once the container runs
/// dry the decoder is drained of delayed pictures, after which every call
/// reports end of stream.
#[derive(Default)]
pub struct FrameDecoder {
    pending: Option<PendingPacket>,
    input_exhausted: bool,
    drained: bool,
    packets_read: usize,
    frames_decoded: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_frame(
        &mut self,
        session: &mut StreamSession,
    ) -> Result<FetchOutcome, PlaybackError> {
        let stream_index = session.selected_stream().ok_or(PlaybackError::NotOpen)?;

        loop {
            if let Some(frame) = self.decode_pending(session)? {
                self.frames_decoded += 1;
                return Ok(FetchOutcome::Frame(frame));
            }
            if self.input_exhausted {
                return self.drain(session);
            }

            match session.read_packet() {
                Ok(Some(packet)) if packet.data.is_empty() => {
                    log::debug!("Empty packet, treating as end of input");
                    self.input_exhausted = true;
                }
                Ok(Some(packet)) if packet.stream_index != stream_index => {
                    log::trace!("Skipping packet of stream {}", packet.stream_index);
                }
                Ok(Some(packet)) => {
                    self.packets_read += 1;
                    self.pending = Some(PendingPacket::new(packet));
                }
                Ok(None) => self.input_exhausted = true,
                Err(e) => {
                    log::debug!("Read failed, treating as end of input: {e}");
                    self.input_exhausted = true;
                }
            }
        }
    }

    /// Feeds the pending packet until a picture comes out or it runs dry.
    fn decode_pending(
        &mut self,
        session: &mut StreamSession,
    ) -> Result<Option<DecodedFrame>, PlaybackError> {
        let Some(packet) = self.pending.as_mut() else {
            return Ok(None);
        };

        let mut stalled = false;
        while !packet.is_exhausted() {
            let output = session.decode(packet.remaining(), packet.pts)?;
            let consumed = packet.consume(output.consumed);
            if output.frame.is_some() {
                return Ok(output.frame);
            }
            if consumed == 0 {
                // one retry, then give up on a decoder that never advances
                if stalled {
                    return Err(PlaybackError::DecoderStalled {
                        remaining: packet.remaining().len(),
                    });
                }
                stalled = true;
            } else {
                stalled = false;
            }
        }

        self.pending = None;
        Ok(None)
    }

    fn drain(&mut self, session: &mut StreamSession) -> Result<FetchOutcome, PlaybackError> {
        if self.drained {
            return Ok(FetchOutcome::EndOfStream);
        }
        match session.flush()? {
            Some(frame) => {
                self.frames_decoded += 1;
                Ok(FetchOutcome::Frame(frame))
            }
            None => {
                log::debug!(
                    "End of stream after {} packets, {} frames",
                    self.packets_read,
                    self.frames_decoded
                );
                self.drained = true;
                Ok(FetchOutcome::EndOfStream)
            }
        }
    }

    /// Forgets pending bytes and end-of-stream state, for a fresh session.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Bytes of the current packet not yet consumed by the decoder.
    pub fn pending_bytes(&self) -> usize {
        self.pending
            .as_ref()
            .map(|packet| packet.remaining().len())
            .unwrap_or(0)
    }

    pub fn packets_read(&self) -> usize {
        self.packets_read
    }

    pub fn frames_decoded(&self) -> usize {
        self.frames_decoded
    }
}
