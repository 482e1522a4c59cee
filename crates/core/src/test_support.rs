//! Doubles for the external collaborators, shared by the unit tests.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::media::domain::decode_engine::{
    CodecId, DecodeEngine, DecodeOutput, Decoder, DecoderDescriptor, DecoderFlags, Demuxer,
    EngineError, InputSource, Packet, Rational, StreamInfo,
};
use crate::media::domain::file_system::FileSystem;
use crate::media::subsystem;
use crate::rendering::domain::renderer_image::{
    ImageFactory, ImageFilter, ImageUsage, ImageWrap, RendererImage,
};
use crate::shared::decoded_frame::{plane_dimensions, DecodedFrame, Plane};
use crate::shared::media_asset::MediaAsset;

// --- Scripted decode engine ---

/// Bytes of compressed data per synthetic picture.
pub const RECORD_LEN: usize = 4;

/// How the scripted decoder turns bytes into pictures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecoderBehavior {
    /// Consumes one `RECORD_LEN` record per call and emits one picture per
    /// record, like a stream-based codec.
    PerRecord,
    /// Holds back the first `n` pictures until flushed.
    Delayed(usize),
    /// Fails on the given (1-based) decode call.
    FailOnCall(usize),
    /// Never consumes anything.
    Stall,
}

/// Live handle counters, shared between the engine and the test.
#[derive(Default)]
pub struct EngineProbe {
    pub demuxers_live: AtomicUsize,
    pub decoders_live: AtomicUsize,
    pub inputs_opened: AtomicUsize,
    pub bytes_read: AtomicUsize,
    pub decode_calls: AtomicUsize,
    pub flush_calls: AtomicUsize,
    pub file_inputs: Mutex<Vec<PathBuf>>,
    pub decoder_flags: Mutex<Vec<DecoderFlags>>,
}

impl EngineProbe {
    pub fn demuxers_live(&self) -> usize {
        self.demuxers_live.load(Ordering::SeqCst)
    }

    pub fn decoders_live(&self) -> usize {
        self.decoders_live.load(Ordering::SeqCst)
    }

    pub fn decode_calls(&self) -> usize {
        self.decode_calls.load(Ordering::SeqCst)
    }

    pub fn flush_calls(&self) -> usize {
        self.flush_calls.load(Ordering::SeqCst)
    }

    pub fn inputs_opened(&self) -> usize {
        self.inputs_opened.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct ScriptedEngine {
    pub streams: Vec<StreamInfo>,
    pub duration_us: Option<i64>,
    pub packets: Vec<Packet>,
    pub behavior: DecoderBehavior,
    pub width: u32,
    pub height: u32,
    /// Extra bytes at the end of every plane row.
    pub row_padding: usize,
    pub fail_open: bool,
    pub fail_probe: bool,
    pub fail_decoder_open: bool,
    pub known_codec: bool,
    pub direct_rendering: bool,
    pub probe: Arc<EngineProbe>,
}

impl ScriptedEngine {
    /// A single-stream video of `frames` pictures at `fps`, one record per packet.
    pub fn video(frames: usize, fps: i32) -> Self {
        let packets = (0..frames)
            .map(|i| packet(0, i as i64, &[record(i)]))
            .collect();
        Self {
            streams: vec![stream(0, fps)],
            duration_us: Some(frames as i64 * 1_000_000 / fps as i64),
            packets,
            behavior: DecoderBehavior::PerRecord,
            width: 64,
            height: 48,
            row_padding: 0,
            fail_open: false,
            fail_probe: false,
            fail_decoder_open: false,
            known_codec: true,
            direct_rendering: false,
            probe: Arc::new(EngineProbe::default()),
        }
    }

    pub fn with_packets(mut self, packets: Vec<Packet>) -> Self {
        self.packets = packets;
        self
    }

    pub fn with_behavior(mut self, behavior: DecoderBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32, row_padding: usize) -> Self {
        self.width = width;
        self.height = height;
        self.row_padding = row_padding;
        self
    }

    pub fn without_streams(mut self) -> Self {
        self.streams.clear();
        self
    }
}

pub fn stream(index: usize, fps: i32) -> StreamInfo {
    StreamInfo {
        index,
        codec: CodecId::new("synthetic"),
        avg_frame_rate: Rational::new(fps, 1),
    }
}

/// A record whose first byte tags the picture it decodes to.
pub fn record(tag: usize) -> [u8; RECORD_LEN] {
    [tag as u8, 0xAB, 0xCD, 0xEF]
}

pub fn packet(stream_index: usize, pts: i64, records: &[[u8; RECORD_LEN]]) -> Packet {
    Packet {
        stream_index,
        pts: Some(pts),
        data: records.concat(),
    }
}

impl DecodeEngine for ScriptedEngine {
    fn open_input(&self, source: InputSource) -> Result<Box<dyn Demuxer>, EngineError> {
        self.probe.inputs_opened.fetch_add(1, Ordering::SeqCst);
        match source {
            InputSource::Memory(mut bridge) => {
                let mut chunk = vec![0u8; bridge.staging_size()];
                loop {
                    let n = bridge.read(&mut chunk);
                    if n == 0 {
                        break;
                    }
                    self.probe.bytes_read.fetch_add(n, Ordering::SeqCst);
                }
            }
            InputSource::File(path) => self.probe.file_inputs.lock().unwrap().push(path),
        }
        if self.fail_open {
            return Err(EngineError::Open {
                status: -1094995529,
                message: "Invalid data found when processing input".into(),
            });
        }
        self.probe.demuxers_live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedDemuxer {
            script: self.clone(),
            next_packet: 0,
        }))
    }

    fn find_decoder(&self, codec: &CodecId) -> Option<DecoderDescriptor> {
        self.known_codec.then(|| DecoderDescriptor {
            codec: codec.clone(),
            direct_rendering: self.direct_rendering,
        })
    }
}

struct ScriptedDemuxer {
    script: ScriptedEngine,
    next_packet: usize,
}

impl Drop for ScriptedDemuxer {
    fn drop(&mut self) {
        self.script.probe.demuxers_live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Demuxer for ScriptedDemuxer {
    fn find_stream_info(&mut self) -> Result<(), EngineError> {
        if self.script.fail_probe {
            return Err(EngineError::Probe {
                status: -1,
                message: "probe failed".into(),
            });
        }
        Ok(())
    }

    fn streams(&self) -> Vec<StreamInfo> {
        self.script.streams.clone()
    }

    fn duration_us(&self) -> Option<i64> {
        self.script.duration_us
    }

    fn open_decoder(
        &mut self,
        _stream_index: usize,
        _descriptor: &DecoderDescriptor,
        flags: DecoderFlags,
    ) -> Result<Box<dyn Decoder>, EngineError> {
        if self.script.fail_decoder_open {
            return Err(EngineError::DecoderOpen {
                status: -22,
                message: "decoder rejected".into(),
            });
        }
        self.script.probe.decoders_live.fetch_add(1, Ordering::SeqCst);
        self.script.probe.decoder_flags.lock().unwrap().push(flags);
        Ok(Box::new(ScriptedDecoder {
            script: self.script.clone(),
            held: Vec::new(),
            calls: 0,
        }))
    }

    fn read_packet(&mut self) -> Result<Option<Packet>, EngineError> {
        let packet = self.script.packets.get(self.next_packet).cloned();
        self.next_packet += 1;
        Ok(packet)
    }
}

struct ScriptedDecoder {
    script: ScriptedEngine,
    held: Vec<DecodedFrame>,
    calls: usize,
}

impl Drop for ScriptedDecoder {
    fn drop(&mut self) {
        self.script.probe.decoders_live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedDecoder {
    fn picture(&self, tag: u8, pts: Option<i64>) -> DecodedFrame {
        synthetic_frame(self.script.width, self.script.height, self.script.row_padding, tag, pts)
    }
}

impl Decoder for ScriptedDecoder {
    fn decode(&mut self, data: &[u8], pts: Option<i64>) -> Result<DecodeOutput, EngineError> {
        self.calls += 1;
        self.script.probe.decode_calls.fetch_add(1, Ordering::SeqCst);
        match self.script.behavior {
            DecoderBehavior::Stall => {
                return Ok(DecodeOutput {
                    consumed: 0,
                    frame: None,
                })
            }
            DecoderBehavior::FailOnCall(n) if n == self.calls => {
                return Err(EngineError::Decode {
                    status: -1094995529,
                    message: "corrupt picture".into(),
                })
            }
            _ => {}
        }

        let consumed = data.len().min(RECORD_LEN);
        let picture = self.picture(data[0], pts);
        let frame = match self.script.behavior {
            DecoderBehavior::Delayed(n) if self.held.len() < n => {
                self.held.push(picture);
                None
            }
            DecoderBehavior::Delayed(_) if !self.held.is_empty() => {
                self.held.push(picture);
                Some(self.held.remove(0))
            }
            _ => Some(picture),
        };
        Ok(DecodeOutput { consumed, frame })
    }

    fn flush(&mut self) -> Result<Option<DecodedFrame>, EngineError> {
        self.script.probe.flush_calls.fetch_add(1, Ordering::SeqCst);
        if self.held.is_empty() {
            Ok(None)
        } else {
            Ok(Some(self.held.remove(0)))
        }
    }
}

/// A 4:2:0 picture with luma = `tag`, chroma = 128 and `row_padding` junk
/// bytes (0xFF) after every row.
pub fn synthetic_frame(
    width: u32,
    height: u32,
    row_padding: usize,
    tag: u8,
    pts: Option<i64>,
) -> DecodedFrame {
    let plane = |index: usize, value: u8| {
        let (w, h) = plane_dimensions(index, width, height);
        let stride = w as usize + row_padding;
        let mut data = Vec::with_capacity(stride * h as usize);
        for _ in 0..h {
            data.extend(std::iter::repeat(value).take(w as usize));
            data.extend(std::iter::repeat(0xFF).take(row_padding));
        }
        Plane::new(data, stride)
    };
    DecodedFrame::new(
        width,
        height,
        pts,
        [plane(0, tag), plane(1, 128), plane(2, 128)],
    )
}

// --- File system ---

#[derive(Default)]
pub struct FsProbe {
    pub reads: AtomicUsize,
    pub frees: AtomicUsize,
    /// Frees where another handle to the bytes was still alive.
    pub shared_at_free: AtomicUsize,
}

impl FsProbe {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }

    pub fn shared_at_free(&self) -> usize {
        self.shared_at_free.load(Ordering::SeqCst)
    }
}

pub struct MemoryFileSystem {
    files: HashMap<PathBuf, Vec<u8>>,
    pub probe: Arc<FsProbe>,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self {
            files: HashMap::new(),
            probe: Arc::new(FsProbe::default()),
        }
    }

    pub fn with_file(mut self, path: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(PathBuf::from(path), bytes);
        self
    }
}

impl FileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> io::Result<MediaAsset> {
        let bytes = self
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))?;
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        Ok(MediaAsset::new(bytes))
    }

    fn free_file(&self, asset: MediaAsset) {
        self.probe.frees.fetch_add(1, Ordering::SeqCst);
        if asset.into_inner().is_none() {
            self.probe.shared_at_free.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        Path::new("/assets").join(path)
    }
}

// --- Renderer images ---

#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub label: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub filter: ImageFilter,
    pub wrap: ImageWrap,
    pub usage: ImageUsage,
}

pub struct RecordingImageFactory {
    pub uploads: Arc<Mutex<Vec<Upload>>>,
    pub created: Arc<AtomicUsize>,
}

impl RecordingImageFactory {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl ImageFactory for RecordingImageFactory {
    fn create_image(&self, label: &str) -> Box<dyn RendererImage> {
        self.created.fetch_add(1, Ordering::SeqCst);
        Box::new(RecordingImage {
            label: label.to_string(),
            uploads: self.uploads.clone(),
            width: 0,
            height: 0,
        })
    }
}

struct RecordingImage {
    label: String,
    uploads: Arc<Mutex<Vec<Upload>>>,
    width: u32,
    height: u32,
}

impl RendererImage for RecordingImage {
    fn generate_image(
        &mut self,
        bytes: &[u8],
        width: u32,
        height: u32,
        filter: ImageFilter,
        wrap: ImageWrap,
        usage: ImageUsage,
    ) {
        self.width = width;
        self.height = height;
        self.uploads.lock().unwrap().push(Upload {
            label: self.label.clone(),
            bytes: bytes.to_vec(),
            width,
            height,
            filter,
            wrap,
            usage,
        });
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

// --- Real media ---

/// Encodes `num_frames` MPEG-4 pictures into a Matroska file.
pub fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: i32) {
    use ffmpeg_next::format::Pixel;
    use ffmpeg_next::util::frame::video::Video as VideoFrame;

    subsystem::init_subsystem().unwrap();

    let mut octx = ffmpeg_next::format::output(path).unwrap();

    let global_header = octx
        .format()
        .flags()
        .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

    let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
    let mut ost = octx.add_stream(Some(codec)).unwrap();

    let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
        .encoder()
        .video()
        .unwrap();

    encoder_ctx.set_width(width);
    encoder_ctx.set_height(height);
    encoder_ctx.set_format(Pixel::YUV420P);
    encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps));
    encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps, 1)));

    if global_header {
        encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
    }

    let mut encoder = encoder_ctx
        .open_with(ffmpeg_next::Dictionary::new())
        .unwrap();
    ost.set_parameters(&encoder);
    ost.set_avg_frame_rate(ffmpeg_next::Rational(fps, 1));

    octx.write_header().unwrap();

    let ost_time_base = octx.stream(0).unwrap().time_base();

    for i in 0..num_frames {
        let mut frame = VideoFrame::new(Pixel::YUV420P, width, height);
        let luma = ((i * 40) % 256) as u8;
        for (plane, value) in [(0, luma), (1, 128), (2, 128)] {
            frame.data_mut(plane).fill(value);
        }
        frame.set_pts(Some(i as i64));

        encoder.send_frame(&frame).unwrap();

        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }
    }

    encoder.send_eof().unwrap();
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(0);
        encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
        encoded.write_interleaved(&mut octx).unwrap();
    }

    octx.write_trailer().unwrap();
}
