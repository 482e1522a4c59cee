use std::ffi::CString;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr;

use ffmpeg_next::codec::capabilities::Capabilities;
use ffmpeg_next::ffi;
use ffmpeg_next::format::context::Input;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::software::scaling;
use ffmpeg_next::util::frame::video::Video as VideoFrame;

use crate::media::domain::decode_engine::{
    CodecId, DecodeEngine, DecodeOutput, Decoder, DecoderDescriptor, DecoderFlags, Demuxer,
    EngineError, InputSource, Packet, Rational, StreamInfo,
};
use crate::media::memory_io_bridge::MemoryIoBridge;
use crate::media::subsystem;
use crate::shared::decoded_frame::{DecodedFrame, Plane};

/// `AVERROR(ENOMEM)`.
const STATUS_NO_MEMORY: i32 = -12;
/// `AVERROR(EINVAL)`.
const STATUS_INVALID: i32 = -22;

/// Demux/decode engine backed by libavformat + libavcodec.
///
/// Memory inputs are fed through a custom `AVIOContext` whose read callback
/// pulls from a [`MemoryIoBridge`]; file inputs are opened by path.
pub struct FfmpegEngine;

impl FfmpegEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeEngine for FfmpegEngine {
    fn open_input(&self, source: InputSource) -> Result<Box<dyn Demuxer>, EngineError> {
        if !subsystem::is_initialized() {
            return Err(EngineError::NotInitialized);
        }
        match source {
            InputSource::File(path) => {
                let input = ffmpeg_next::format::input(&path).map_err(|e| EngineError::Open {
                    status: i32::from(e),
                    message: format!("{}: {e}", path.display()),
                })?;
                Ok(Box::new(FfmpegDemuxer { input, io: None }))
            }
            InputSource::Memory(bridge) => {
                let io = CustomIo::new(bridge)?;
                // Safety: `io` outlives the returned input; the demuxer
                // stores it in a field dropped after the input.
                let input = unsafe { open_custom_input(&io)? };
                Ok(Box::new(FfmpegDemuxer {
                    input,
                    io: Some(io),
                }))
            }
        }
    }

    fn find_decoder(&self, codec: &CodecId) -> Option<DecoderDescriptor> {
        let id = codec_id_by_name(codec.name())?;
        let decoder = ffmpeg_next::codec::decoder::find(id)?;
        Some(DecoderDescriptor {
            codec: codec.clone(),
            direct_rendering: decoder.capabilities().contains(Capabilities::DR1),
        })
    }
}

/// Container opened by libavformat.
///
/// Field order matters: the input is closed before the custom I/O context
/// it reads through is freed.
pub struct FfmpegDemuxer {
    input: Input,
    io: Option<CustomIo>,
}

impl FfmpegDemuxer {
    /// Read position of the memory bridge, `None` for file inputs.
    pub fn io_position(&self) -> Option<usize> {
        self.io.as_ref().map(CustomIo::position)
    }
}

impl Demuxer for FfmpegDemuxer {
    fn find_stream_info(&mut self) -> Result<(), EngineError> {
        let status =
            unsafe { ffi::avformat_find_stream_info(self.input.as_mut_ptr(), ptr::null_mut()) };
        if status < 0 {
            return Err(EngineError::Probe {
                status,
                message: error_message(status),
            });
        }
        Ok(())
    }

    fn streams(&self) -> Vec<StreamInfo> {
        self.input
            .streams()
            .map(|stream| {
                let rate = stream.avg_frame_rate();
                StreamInfo {
                    index: stream.index(),
                    codec: CodecId::new(stream.parameters().id().name()),
                    avg_frame_rate: Rational::new(rate.numerator(), rate.denominator()),
                }
            })
            .collect()
    }

    fn duration_us(&self) -> Option<i64> {
        // AV_NOPTS_VALUE is i64::MIN
        let duration = self.input.duration();
        (duration >= 0).then_some(duration)
    }

    fn open_decoder(
        &mut self,
        stream_index: usize,
        descriptor: &DecoderDescriptor,
        flags: DecoderFlags,
    ) -> Result<Box<dyn Decoder>, EngineError> {
        let stream = self
            .input
            .stream(stream_index)
            .ok_or_else(|| EngineError::DecoderOpen {
                status: STATUS_INVALID,
                message: format!("no stream {stream_index}"),
            })?;
        let codec = codec_id_by_name(descriptor.codec.name())
            .and_then(ffmpeg_next::codec::decoder::find)
            .ok_or_else(|| EngineError::DecoderOpen {
                status: STATUS_INVALID,
                message: format!("no decoder for {}", descriptor.codec),
            })?;

        let mut context = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(decoder_open_error)?;
        if flags.fast {
            unsafe {
                (*context.as_mut_ptr()).flags2 |= ffi::AV_CODEC_FLAG2_FAST as c_int;
            }
        }
        if flags.emulate_edge {
            // libavcodec always pads decoded pictures now; nothing to set.
            log::trace!("{}: edge emulation requested", descriptor.codec);
        }

        let decoder = context
            .decoder()
            .open_as(codec)
            .and_then(|opened| opened.video())
            .map_err(decoder_open_error)?;

        Ok(Box::new(FfmpegDecoder {
            decoder,
            scaler: None,
            flushed: false,
        }))
    }

    fn read_packet(&mut self) -> Result<Option<Packet>, EngineError> {
        let mut packet = ffmpeg_next::Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => Ok(Some(Packet {
                stream_index: packet.stream(),
                pts: packet.pts(),
                data: packet.data().map(<[u8]>::to_vec).unwrap_or_default(),
            })),
            Err(ffmpeg_next::Error::Eof) => Ok(None),
            Err(e) => Err(EngineError::Read {
                status: i32::from(e),
                message: e.to_string(),
            }),
        }
    }
}

/// Video decoder using the send/receive API.
///
/// A packet is handed over whole, so a successful send consumes all of its
/// bytes. Pictures left in the decoder from an earlier packet are returned
/// first, with zero bytes consumed.
pub struct FfmpegDecoder {
    decoder: ffmpeg_next::decoder::Video,
    scaler: Option<(Pixel, u32, u32, scaling::Context)>,
    flushed: bool,
}

impl FfmpegDecoder {
    fn receive(&mut self) -> Result<Option<DecodedFrame>, EngineError> {
        let mut decoded = VideoFrame::empty();
        match self.decoder.receive_frame(&mut decoded) {
            Ok(()) => self.planar_frame(&decoded).map(Some),
            Err(ffmpeg_next::Error::Eof) => Ok(None),
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffmpeg_next::error::EAGAIN => {
                Ok(None)
            }
            Err(e) => Err(decode_error(e)),
        }
    }

    /// Converts to planar 4:2:0 if the decoder produced anything else.
    fn planar_frame(&mut self, decoded: &VideoFrame) -> Result<DecodedFrame, EngineError> {
        let width = decoded.width();
        let height = decoded.height();
        let pts = decoded.pts();
        if decoded.format() == Pixel::YUV420P {
            return Ok(copy_planes(decoded, width, height, pts));
        }

        let scaler = self.scaler_for(decoded.format(), width, height)?;
        let mut converted = VideoFrame::empty();
        scaler.run(decoded, &mut converted).map_err(decode_error)?;
        Ok(copy_planes(&converted, width, height, pts))
    }

    fn scaler_for(
        &mut self,
        format: Pixel,
        width: u32,
        height: u32,
    ) -> Result<&mut scaling::Context, EngineError> {
        let reusable = matches!(
            &self.scaler,
            Some((f, w, h, _)) if *f == format && *w == width && *h == height
        );
        if !reusable {
            log::debug!("Converting {format:?} {width}x{height} to YUV420P");
            let context = scaling::Context::get(
                format,
                width,
                height,
                Pixel::YUV420P,
                width,
                height,
                scaling::Flags::BILINEAR,
            )
            .map_err(decode_error)?;
            self.scaler = Some((format, width, height, context));
        }
        match self.scaler.as_mut() {
            Some((_, _, _, context)) => Ok(context),
            None => Err(EngineError::Decode {
                status: STATUS_INVALID,
                message: "no pixel format converter".into(),
            }),
        }
    }
}

impl Decoder for FfmpegDecoder {
    fn decode(&mut self, data: &[u8], pts: Option<i64>) -> Result<DecodeOutput, EngineError> {
        if let Some(frame) = self.receive()? {
            return Ok(DecodeOutput {
                consumed: 0,
                frame: Some(frame),
            });
        }

        let mut packet = ffmpeg_next::Packet::copy(data);
        packet.set_pts(pts);
        self.decoder.send_packet(&packet).map_err(decode_error)?;

        Ok(DecodeOutput {
            consumed: data.len(),
            frame: self.receive()?,
        })
    }

    fn flush(&mut self) -> Result<Option<DecodedFrame>, EngineError> {
        if !self.flushed {
            match self.decoder.send_eof() {
                Ok(()) | Err(ffmpeg_next::Error::Eof) => {}
                Err(e) => return Err(decode_error(e)),
            }
            self.flushed = true;
        }
        self.receive()
    }
}

/// Custom `AVIOContext` reading from a [`MemoryIoBridge`].
///
/// Owns the bridge (boxed, handed to libavformat as the opaque pointer) and
/// the staging buffer allocated with `av_malloc`.
struct CustomIo {
    ctx: *mut ffi::AVIOContext,
    bridge: *mut MemoryIoBridge,
}

impl CustomIo {
    fn new(bridge: MemoryIoBridge) -> Result<Self, EngineError> {
        let staging_size = bridge.staging_size();
        let buffer_len = c_int::try_from(staging_size).map_err(|_| EngineError::Open {
            status: STATUS_INVALID,
            message: format!("I/O staging buffer of {staging_size} bytes is too large"),
        })?;
        let bridge = Box::into_raw(Box::new(bridge));
        unsafe {
            let buffer = ffi::av_malloc(staging_size) as *mut u8;
            if buffer.is_null() {
                drop(Box::from_raw(bridge));
                return Err(EngineError::Open {
                    status: STATUS_NO_MEMORY,
                    message: "failed to allocate I/O staging buffer".into(),
                });
            }
            let ctx = ffi::avio_alloc_context(
                buffer,
                buffer_len,
                0,
                bridge as *mut c_void,
                Some(read_bridge),
                None,
                None,
            );
            if ctx.is_null() {
                ffi::av_free(buffer as *mut c_void);
                drop(Box::from_raw(bridge));
                return Err(EngineError::Open {
                    status: STATUS_NO_MEMORY,
                    message: "failed to allocate I/O context".into(),
                });
            }
            Ok(Self { ctx, bridge })
        }
    }

    fn position(&self) -> usize {
        unsafe { (*self.bridge).position() }
    }
}

impl Drop for CustomIo {
    fn drop(&mut self) {
        unsafe {
            // The demuxer may have swapped the staging buffer; free whatever
            // the context holds now.
            ffi::av_freep(&mut (*self.ctx).buffer as *mut *mut u8 as *mut c_void);
            ffi::avio_context_free(&mut self.ctx);
            drop(Box::from_raw(self.bridge));
        }
    }
}

/// Read callback: copies from the bridge, end of asset maps to `AVERROR_EOF`.
unsafe extern "C" fn read_bridge(opaque: *mut c_void, buf: *mut u8, buf_size: c_int) -> c_int {
    if opaque.is_null() || buf.is_null() || buf_size <= 0 {
        return ffi::AVERROR_EOF;
    }
    let bridge = &mut *(opaque as *mut MemoryIoBridge);
    let out = std::slice::from_raw_parts_mut(buf, buf_size as usize);
    match bridge.read(out) {
        0 => ffi::AVERROR_EOF,
        copied => copied as c_int,
    }
}

/// Opens a format context that reads through `io`.
///
/// # Safety
/// `io` must stay alive until the returned input is dropped.
unsafe fn open_custom_input(io: &CustomIo) -> Result<Input, EngineError> {
    let mut format = ffi::avformat_alloc_context();
    if format.is_null() {
        return Err(EngineError::Open {
            status: STATUS_NO_MEMORY,
            message: "failed to allocate format context".into(),
        });
    }
    (*format).pb = io.ctx;

    let url = b"\0";
    // On failure the format context is freed by libavformat; the custom
    // I/O context is not.
    let status = ffi::avformat_open_input(
        &mut format,
        url.as_ptr() as *const c_char,
        ptr::null_mut(),
        ptr::null_mut(),
    );
    if status < 0 {
        return Err(EngineError::Open {
            status,
            message: error_message(status),
        });
    }
    Ok(Input::wrap(format))
}

fn codec_id_by_name(name: &str) -> Option<ffmpeg_next::codec::Id> {
    let name = CString::new(name).ok()?;
    unsafe {
        let descriptor = ffi::avcodec_descriptor_get_by_name(name.as_ptr());
        if descriptor.is_null() {
            None
        } else {
            Some(ffmpeg_next::codec::Id::from((*descriptor).id))
        }
    }
}

/// Copies the three planes of a YUV420P picture, keeping each stride.
fn copy_planes(frame: &VideoFrame, width: u32, height: u32, pts: Option<i64>) -> DecodedFrame {
    let plane = |index: usize| Plane::new(frame.data(index).to_vec(), frame.stride(index));
    DecodedFrame::new(width, height, pts, [plane(0), plane(1), plane(2)])
}

fn error_message(status: c_int) -> String {
    ffmpeg_next::Error::from(status).to_string()
}

fn decoder_open_error(e: ffmpeg_next::Error) -> EngineError {
    EngineError::DecoderOpen {
        status: i32::from(e),
        message: e.to_string(),
    }
}

fn decode_error(e: ffmpeg_next::Error) -> EngineError {
    EngineError::Decode {
        status: i32::from(e),
        message: e.to_string(),
    }
}
