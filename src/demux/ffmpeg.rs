use crate::core::{FormatInfo, MediaInput, Packet, SeekTarget, SeekUnit, StreamInfo, StreamType};
use crate::demux::engine::{native, DecodeEngine, EngineResult, SeekRequest};
use crate::demux::interrupt::InterruptCallback;
use ffmpeg_next as ffmpeg;
use ffmpeg::format::stream::Disposition;
use ffmpeg::{codec, format, media};
use log::info;
use std::collections::HashMap;

/// FFmpeg 解码引擎适配器
///
/// 引擎内部阻塞段的中断依赖 open 选项里的 rw_timeout/timeout/stimeout
/// （网络输入由会话默认种入），中断回调在每次调用的边界上检查
pub struct FfmpegEngine {
    input_ctx: Option<format::context::Input>,
}

impl FfmpegEngine {
    pub fn new() -> Self {
        let _ = ffmpeg::init();
        Self { input_ctx: None }
    }
}

impl Default for FfmpegEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeEngine for FfmpegEngine {
    fn open(
        &mut self,
        input: &mut MediaInput,
        options: &HashMap<String, String>,
        interrupt: &InterruptCallback,
    ) -> EngineResult<FormatInfo> {
        self.close();

        let path = match input {
            MediaInput::LocalFile(path) => path.to_string_lossy().to_string(),
            MediaInput::NetworkStream { url, .. } => url.clone(),
            // TODO: 通过自定义 AVIO 桥接支持 Device 输入
            MediaInput::Device(_) => return Err(native::ERR_UNSUPPORTED),
        };

        if interrupt.check() {
            return Err(native::ERR_EXIT);
        }

        let ictx = if options.is_empty() {
            format::input(&path)
        } else {
            let mut dict = ffmpeg::Dictionary::new();
            for (key, value) in options {
                dict.set(key, value);
            }
            format::input_with_dictionary(&path, dict)
        }
        .map_err(err_code)?;

        if interrupt.check() {
            return Err(native::ERR_EXIT);
        }

        let format_info = extract_format_info(&ictx);
        info!(
            "🎬 已打开 {} ({})，{} 路流",
            path,
            format_info.format_name,
            format_info.streams.len()
        );
        self.input_ctx = Some(ictx);
        Ok(format_info)
    }

    fn read_packet(&mut self, interrupt: &InterruptCallback) -> EngineResult<Packet> {
        let ictx = self.input_ctx.as_mut().ok_or(native::ERR_IO)?;
        if interrupt.check() {
            return Err(native::ERR_EXIT);
        }

        match ictx.packets().next() {
            Some((stream, packet)) => {
                let tb = stream.time_base();
                let to_ms = |v: i64| {
                    (v as f64 * tb.numerator() as f64 * 1000.0 / tb.denominator() as f64) as i64
                };
                Ok(Packet {
                    stream_index: stream.index(),
                    pts: packet.pts().map(|v| to_ms(v)).unwrap_or(-1),
                    dts: packet.dts().map(|v| to_ms(v)).unwrap_or(-1),
                    duration: to_ms(packet.duration()),
                    key_frame: packet.is_key(),
                    discard: packet.flags().contains(ffmpeg::packet::Flags::DISCARD),
                    data: packet.data().map(|d| d.to_vec()).unwrap_or_default(),
                })
            }
            // packets() 在错误和 EOF 时都停止迭代，统一按 EOF 上报，
            // 超时/中断的区分由上层结合中断上下文完成
            None => Err(native::ERR_EOF),
        }
    }

    fn seek(&mut self, request: &SeekRequest, interrupt: &InterruptCallback) -> EngineResult<()> {
        let ictx = self.input_ctx.as_mut().ok_or(native::ERR_IO)?;
        if interrupt.check() {
            return Err(native::ERR_EXIT);
        }

        match request.unit {
            SeekUnit::ByTime => {
                let ts = request.position * 1000; // 毫秒 -> AV_TIME_BASE（微秒）
                let result = match request.target {
                    // 关键帧目标：允许落到目标之前最近的关键帧
                    SeekTarget::KeyFrame => ictx.seek(ts, ..ts),
                    // 其余目标先精确请求到目标时间，由解码侧完成帧对齐
                    SeekTarget::AnyFrame | SeekTarget::AccurateFrame => ictx.seek(ts, ts..ts),
                };
                result.map_err(err_code)
            }
            // 按字节/帧 seek 需要底层格式支持，此适配器未桥接
            SeekUnit::ByByte | SeekUnit::ByFrame => Err(native::ERR_UNSUPPORTED),
        }
    }

    fn best_stream(&self, stream_type: StreamType) -> Option<usize> {
        let ictx = self.input_ctx.as_ref()?;
        let media_type = match stream_type {
            StreamType::Audio => media::Type::Audio,
            StreamType::Video => media::Type::Video,
            StreamType::Subtitle => media::Type::Subtitle,
        };
        ictx.streams().best(media_type).map(|s| s.index())
    }

    fn close(&mut self) {
        self.input_ctx = None;
    }
}

/// ffmpeg-next 的错误枚举还原成原生负数错误码
fn err_code(e: ffmpeg::Error) -> i32 {
    match e {
        ffmpeg::Error::Eof => native::ERR_EOF,
        ffmpeg::Error::Exit => native::ERR_EXIT,
        ffmpeg::Error::InvalidData => native::ERR_INVALID_DATA,
        ffmpeg::Error::Other { errno } => -errno,
        _ => native::ERR_IO,
    }
}

fn extract_format_info(ictx: &format::context::Input) -> FormatInfo {
    let streams = ictx.streams().map(|s| extract_stream_info(&s)).collect();

    // start_time / bit_rate / seekable 未被 ffmpeg-next 封装，读原生字段
    let (start_time_us, bit_rate, seekable) = unsafe {
        let ptr = ictx.as_ptr();
        let pb = (*ptr).pb;
        (
            (*ptr).start_time,
            (*ptr).bit_rate,
            !pb.is_null() && (*pb).seekable != 0,
        )
    };

    FormatInfo {
        format_name: ictx.format().name().to_string(),
        format_long_name: ictx.format().description().to_string(),
        start_time_us: if start_time_us == ffmpeg::ffi::AV_NOPTS_VALUE {
            0
        } else {
            start_time_us
        },
        duration_us: ictx.duration().max(0),
        bit_rate,
        seekable,
        streams,
    }
}

fn extract_stream_info(stream: &format::stream::Stream) -> StreamInfo {
    let params = stream.parameters();
    let codec_id = params.id();
    let stream_type = match params.medium() {
        media::Type::Audio => Some(StreamType::Audio),
        media::Type::Video => Some(StreamType::Video),
        media::Type::Subtitle => Some(StreamType::Subtitle),
        _ => None,
    };

    let fps = {
        let rate = stream.avg_frame_rate();
        if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        }
    };

    let mut stream_info = StreamInfo {
        index: stream.index(),
        stream_type,
        codec_name: codec_id.name().to_string(),
        codec_long_name: ffmpeg::decoder::find(codec_id)
            .map(|c| c.description().to_string())
            .unwrap_or_default(),
        fps,
        frames: stream.frames(),
        attached_pic: stream.disposition().contains(Disposition::ATTACHED_PIC),
        ..Default::default()
    };

    match stream_type {
        Some(StreamType::Video) => {
            if let Ok(ctx) = codec::context::Context::from_parameters(params) {
                if let Ok(video) = ctx.decoder().video() {
                    stream_info.width = video.width();
                    stream_info.height = video.height();
                    stream_info.bit_rate = video.bit_rate() as i64;
                }
            }
        }
        Some(StreamType::Audio) => {
            if let Ok(ctx) = codec::context::Context::from_parameters(params) {
                if let Ok(audio) = ctx.decoder().audio() {
                    stream_info.sample_rate = audio.rate();
                    stream_info.channels = audio.channels();
                    stream_info.bit_rate = audio.bit_rate() as i64;
                }
            }
        }
        _ => {}
    }

    stream_info
}
