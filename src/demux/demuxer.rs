use crate::core::{
    DemuxError, FormatInfo, MediaInput, MediaStatus, OptionDict, Packet, SeekTarget, SeekUnit,
    StreamInfo, StreamType,
};
use crate::demux::engine::{native, DecodeEngine, SeekRequest};
use crate::demux::events::{DemuxEvent, EventHub};
use crate::demux::interrupt::{InterruptCallback, InterruptContext, InterruptHandle};
use crate::demux::network::{default_network_options, BufferState};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// 网络流的默认目标缓冲（秒）
const NETWORK_BUFFER_TARGET_SECS: f64 = 3.0;

/// 每种流类型的选流状态
///
/// wanted 是用户的显式选择（-1 = 交给引擎自动选），
/// resolved 是实际打开的流（prepare_streams 惰性解析并缓存），
/// avail 是本次加载缓存的可用流索引表（容器原生顺序）。
/// 不变式：resolved ∈ avail，或 -1
#[derive(Debug)]
struct StreamSelect {
    wanted: i32,
    resolved: i32,
    avail: Vec<usize>,
}

impl Default for StreamSelect {
    fn default() -> Self {
        Self {
            wanted: -1,
            resolved: -1,
            avail: Vec::new(),
        }
    }
}

/// 错误发生的阶段，决定错误分类和状态迁移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Read,
    Seek,
}

/// 解封装会话
///
/// 持有打开的容器、跟踪媒体状态、管理选流、执行读包和 seek、
/// 路由 IO 中断，并把引擎的原生错误码翻译成结构化错误。
///
/// 线程约定：load / read_frame / seek / close 必须在同一个逻辑线程上调用，
/// 底层容器句柄对这几个操作不可重入；只有中断标志和超时
/// （set_interrupt_status / set_interrupt_timeout 或 interrupt_handle()）
/// 可以从任意线程修改，用于打断在途的阻塞调用
pub struct Demuxer {
    engine: Box<dyn DecodeEngine>,
    input: Option<MediaInput>,
    format: Option<FormatInfo>,

    status: MediaStatus,
    started: bool,
    eof: bool,
    finished_emitted: bool,
    has_attached_pic: bool,
    auto_reset_stream: bool,

    // 最后一个成功读取的包；读失败不触碰
    pkt: Option<Packet>,
    stream_idx: i32,

    audio: StreamSelect,
    video: StreamSelect,
    subtitle: StreamSelect,

    seek_unit: SeekUnit,
    seek_target: SeekTarget,

    interrupt: Arc<InterruptContext>,
    events: EventHub,
    options: OptionDict,
    last_error: Option<DemuxError>,

    // 网络输入才有
    buffer: Option<BufferState>,
    network: bool,
}

impl Demuxer {
    /// 用指定的解码引擎创建会话（初始为 Unloaded）
    pub fn with_engine(engine: Box<dyn DecodeEngine>) -> Self {
        Self {
            engine,
            input: None,
            format: None,
            status: MediaStatus::Unloaded,
            started: false,
            eof: false,
            finished_emitted: false,
            has_attached_pic: false,
            auto_reset_stream: true,
            pkt: None,
            stream_idx: -1,
            audio: StreamSelect::default(),
            video: StreamSelect::default(),
            subtitle: StreamSelect::default(),
            seek_unit: SeekUnit::ByTime,
            seek_target: SeekTarget::KeyFrame,
            interrupt: Arc::new(InterruptContext::new()),
            events: EventHub::new(),
            options: OptionDict::new(),
            last_error: None,
            buffer: None,
            network: false,
        }
    }

    /// 用 FFmpeg 引擎创建会话
    #[cfg(feature = "ffmpeg")]
    pub fn new() -> Self {
        Self::with_engine(Box::new(crate::demux::ffmpeg::FfmpegEngine::new()))
    }

    // ---------- 事件与状态 ----------

    /// 事件中心：注册监听回调或订阅通道
    pub fn events(&self) -> &EventHub {
        &self.events
    }

    pub fn media_status(&self) -> MediaStatus {
        self.status
    }

    /// 是否已成功加载（容器已打开且流已解析）
    pub fn is_loaded(&self) -> bool {
        self.format.is_some()
    }

    /// 最后一次上报的错误（每次加载时清除）
    pub fn last_error(&self) -> Option<&DemuxError> {
        self.last_error.as_ref()
    }

    fn set_media_status(&mut self, status: MediaStatus) {
        if self.status == status {
            return;
        }
        debug!("媒体状态: {:?} -> {:?}", self.status, status);
        self.status = status;
        self.events.emit(DemuxEvent::MediaStatusChanged(status));
    }

    fn emit_error(&mut self, e: DemuxError) {
        self.events.emit(DemuxEvent::Error {
            code: e.code(),
            message: e.to_string(),
        });
        self.last_error = Some(e);
    }

    // ---------- 生命周期 ----------

    /// 按 URL / 路径加载媒体
    pub fn load_file(&mut self, url: &str) -> bool {
        match MediaInput::from_url(url) {
            Ok(input) => self.load(input),
            Err(e) => {
                error!("❌ 无法解析媒体地址 {}: {}", url, e);
                false
            }
        }
    }

    /// 加载媒体输入
    ///
    /// Unloaded → Loading → (Loaded | NoMedia | InvalidMedia | LoadFailed)。
    /// 重复加载复用同一个会话对象，上一次的缓存和一次性标志全部失效
    pub fn load(&mut self, input: MediaInput) -> bool {
        self.close();

        info!("📂 开始加载: {}", input.file_name());
        self.network = input.is_network_stream();
        self.buffer = self
            .network
            .then(|| BufferState::new(NETWORK_BUFFER_TARGET_SECS));
        self.input = Some(input);

        // 本次加载的一次性标志与缓存
        self.started = false;
        self.eof = false;
        self.finished_emitted = false;
        self.pkt = None;
        self.stream_idx = -1;
        self.last_error = None;
        self.invalidate_streams();

        self.set_media_status(MediaStatus::Loading);

        match self.load_internal() {
            Ok(()) => {
                self.set_media_status(MediaStatus::Loaded);
                self.events.emit(DemuxEvent::Loaded);
                info!(
                    "✅ 加载完成: {} 音频 {} 视频 {} 字幕",
                    self.audio.avail.len(),
                    self.video.avail.len(),
                    self.subtitle.avail.len()
                );
                true
            }
            Err(e) => {
                // 中止时也要释放已获取的资源
                self.engine.close();
                self.format = None;

                if self.interrupt.status() {
                    // 用户中断不是错误，事件已由中断回调发出
                    warn!("⏹ 加载被用户中断");
                    self.set_media_status(MediaStatus::LoadFailed);
                    return false;
                }

                let status = match &e {
                    DemuxError::InvalidMedia(_) => MediaStatus::InvalidMedia,
                    DemuxError::NoMedia => MediaStatus::NoMedia,
                    _ => MediaStatus::LoadFailed,
                };
                error!("❌ 加载失败: {}", e);
                self.set_media_status(status);
                self.emit_error(e);
                false
            }
        }
    }

    fn load_internal(&mut self) -> crate::core::Result<()> {
        // 引擎字典：网络默认项在前，用户项覆盖同名键
        let mut dict: HashMap<String, String> = HashMap::new();
        if let Some(MediaInput::NetworkStream { protocol, .. }) = &self.input {
            dict.extend(default_network_options(*protocol));
        }
        dict.extend(self.options.to_engine_dict());
        // 空值键只对这一次加载有"清除"语义，用完即删
        self.options.prune_empty();

        self.interrupt.begin();
        let callback = InterruptCallback::new(self.interrupt.clone(), self.events.clone());
        let open_result = {
            let input = match self.input.as_mut() {
                Some(input) => input,
                None => return Err(DemuxError::OpenError("没有输入源".to_string())),
            };
            self.engine.open(input, &dict, &callback)
        };

        let format = match open_result {
            Ok(format) => format,
            Err(code) => return Err(self.translate(code, Phase::Open)),
        };

        self.has_attached_pic = format.streams.iter().any(|s| s.attached_pic);
        self.format = Some(format);

        self.find_streams();
        if !self.prepare_streams() {
            return Err(DemuxError::NoMedia);
        }
        Ok(())
    }

    /// 卸载当前媒体（幂等，未加载时调用安全）
    ///
    /// 释放引擎的原生资源、清空缓存的流表和解析结果；
    /// wanted 选择只在 auto_reset_stream 开启时复位，否则跨加载保留
    pub fn close(&mut self) -> bool {
        if self.status == MediaStatus::Unloaded && self.format.is_none() {
            return true;
        }
        info!("🛑 卸载媒体: {}", self.file_name());
        self.engine.close();
        self.format = None;
        self.input = None;
        self.buffer = None;
        self.network = false;
        self.pkt = None;
        self.stream_idx = -1;
        self.eof = false;
        self.started = false;
        self.finished_emitted = false;
        self.has_attached_pic = false;
        self.last_error = None;
        self.invalidate_streams();
        self.set_media_status(MediaStatus::Unloaded);
        self.events.emit(DemuxEvent::Unloaded);
        true
    }

    fn invalidate_streams(&mut self) {
        let reset_wanted = self.auto_reset_stream;
        for select in [&mut self.audio, &mut self.video, &mut self.subtitle] {
            select.avail.clear();
            select.resolved = -1;
            if reset_wanted {
                select.wanted = -1;
            }
        }
    }

    // ---------- 流发现与选择 ----------

    /// 枚举引擎暴露的所有流，按编解码类型归类到各类型的可用表
    fn find_streams(&mut self) {
        let (mut audio, mut video, mut subtitle) = (Vec::new(), Vec::new(), Vec::new());
        if let Some(format) = &self.format {
            for stream in &format.streams {
                match stream.stream_type {
                    Some(StreamType::Audio) => audio.push(stream.index),
                    Some(StreamType::Video) => video.push(stream.index),
                    Some(StreamType::Subtitle) => subtitle.push(stream.index),
                    None => {}
                }
            }
        }
        info!(
            "🔍 发现流: {} 音频 {} 视频 {} 字幕",
            audio.len(),
            video.len(),
            subtitle.len()
        );
        self.audio.avail = audio;
        self.video.avail = video;
        self.subtitle.avail = subtitle;
    }

    /// 解析各类型的 wanted → resolved 并附着编解码参数
    ///
    /// load 内部会调用一次；set_stream_index 之后需要重新调用，
    /// 新的选择才会反映到后续读取。至少解析出一路音频或视频才算成功
    pub fn prepare_streams(&mut self) -> bool {
        if self.format.is_none() {
            warn!("⚠ 未加载媒体，无法解析流");
            return false;
        }
        for stream_type in [StreamType::Audio, StreamType::Video, StreamType::Subtitle] {
            self.resolve_stream(stream_type);
        }
        let ok = self.audio.resolved >= 0 || self.video.resolved >= 0;
        if !ok {
            warn!("⚠ 没有可用的音频/视频流");
        }
        ok
    }

    fn resolve_stream(&mut self, stream_type: StreamType) {
        let select = self.select(stream_type);
        let wanted = select.wanted;
        // 显式选择在重新加载后可能失效，失效时退回自动选择
        let resolved = if wanted >= 0 && select.avail.contains(&(wanted as usize)) {
            wanted
        } else {
            match self.engine.best_stream(stream_type) {
                Some(index) if self.select(stream_type).avail.contains(&index) => index as i32,
                _ => self
                    .select(stream_type)
                    .avail
                    .first()
                    .map(|&i| i as i32)
                    .unwrap_or(-1),
            }
        };

        if resolved >= 0 {
            if let Some(info) = self.stream_info(resolved) {
                debug!(
                    "{} 流 -> #{} ({})",
                    stream_type.as_str(),
                    resolved,
                    info.codec_name
                );
            }
        }
        self.select_mut(stream_type).resolved = resolved;
    }

    /// 设置某类型想要的流（容器流索引）
    ///
    /// index 不在该类型可用表中时返回 false 且不改变任何状态；
    /// 不会立即重开编解码器，新选择要等 prepare_streams 之后才生效
    pub fn set_stream_index(&mut self, stream_type: StreamType, index: i32) -> bool {
        if index < 0 || !self.select(stream_type).avail.contains(&(index as usize)) {
            warn!("⚠ {} 流索引 {} 不可用", stream_type.as_str(), index);
            return false;
        }
        self.select_mut(stream_type).wanted = index;
        true
    }

    /// 当前打开的流（prepare_streams 解析后的结果，-1 表示无）
    pub fn current_stream(&self, stream_type: StreamType) -> i32 {
        self.select(stream_type).resolved
    }

    /// 某类型的可用流索引表（容器原生顺序）
    pub fn streams(&self, stream_type: StreamType) -> &[usize] {
        &self.select(stream_type).avail
    }

    pub fn audio_stream(&self) -> i32 {
        self.audio.resolved
    }

    pub fn audio_streams(&self) -> &[usize] {
        &self.audio.avail
    }

    pub fn video_stream(&self) -> i32 {
        self.video.resolved
    }

    pub fn video_streams(&self) -> &[usize] {
        &self.video.avail
    }

    pub fn subtitle_stream(&self) -> i32 {
        self.subtitle.resolved
    }

    pub fn subtitle_streams(&self) -> &[usize] {
        &self.subtitle.avail
    }

    /// true: 下次加载用引擎的最佳流代替记住的显式选择
    pub fn set_auto_reset_stream(&mut self, reset: bool) {
        self.auto_reset_stream = reset;
    }

    pub fn auto_reset_stream(&self) -> bool {
        self.auto_reset_stream
    }

    fn select(&self, stream_type: StreamType) -> &StreamSelect {
        match stream_type {
            StreamType::Audio => &self.audio,
            StreamType::Video => &self.video,
            StreamType::Subtitle => &self.subtitle,
        }
    }

    fn select_mut(&mut self, stream_type: StreamType) -> &mut StreamSelect {
        match stream_type {
            StreamType::Audio => &mut self.audio,
            StreamType::Video => &mut self.video,
            StreamType::Subtitle => &mut self.subtitle,
        }
    }

    // ---------- 读包协议 ----------

    /// 阻塞读取下一个数据包（任意流，不做选流过滤，那是上层的事）
    ///
    /// 成功返回 true 并更新 packet()/stream()；
    /// 读错误、用户中断、超时都返回 false，此时保留的包保持上一次成功的值，
    /// 消费 packet() 之前必须检查返回值。
    /// 真正的 EOF 把状态迁到 EndOfMedia 并发出一次 finished，
    /// 之后的调用继续返回 false，不再触碰引擎、不重复发事件
    pub fn read_frame(&mut self) -> bool {
        if self.format.is_none() {
            warn!("⚠ 未加载媒体，无法读包");
            return false;
        }
        if self.eof {
            return false;
        }

        self.interrupt.begin();
        let callback = InterruptCallback::new(self.interrupt.clone(), self.events.clone());
        match self.engine.read_packet(&callback) {
            Ok(packet) => {
                self.stream_idx = packet.stream_index as i32;
                self.pkt = Some(packet);
                if !self.started {
                    self.started = true;
                    self.events.emit(DemuxEvent::Started);
                }
                true
            }
            Err(native::ERR_EOF) => {
                info!("📄 到达媒体末尾");
                self.eof = true;
                self.set_media_status(MediaStatus::EndOfMedia);
                if !self.finished_emitted {
                    self.finished_emitted = true;
                    self.events.emit(DemuxEvent::Finished);
                }
                false
            }
            Err(code) => {
                if self.interrupt.status() {
                    warn!("⏹ 读包被用户中断");
                    return false;
                }
                let e = self.translate(code, Phase::Read);
                error!("❌ {}", e);
                self.emit_error(e);
                false
            }
        }
    }

    /// 最后一个成功读取的包；read_frame 返回 false 时它保持不变
    pub fn packet(&self) -> Option<&Packet> {
        self.pkt.as_ref()
    }

    /// 最后一个成功读取的包所属的流索引（-1 表示还没读过）
    pub fn stream(&self) -> i32 {
        self.stream_idx
    }

    /// 是否已到媒体末尾
    pub fn at_end(&self) -> bool {
        self.eof
    }

    // ---------- Seek 协议 ----------

    pub fn is_seekable(&self) -> bool {
        self.format.as_ref().map(|f| f.seekable).unwrap_or(false)
    }

    pub fn set_seek_unit(&mut self, unit: SeekUnit) {
        self.seek_unit = unit;
    }

    pub fn seek_unit(&self) -> SeekUnit {
        self.seek_unit
    }

    pub fn set_seek_target(&mut self, target: SeekTarget) {
        self.seek_target = target;
    }

    pub fn seek_target(&self) -> SeekTarget {
        self.seek_target
    }

    /// Seek 到绝对时间（毫秒）
    ///
    /// 不可 seek 时静默失败（返回 false，状态不变）。
    /// 实际落点要等下一次成功的 read_frame 才知道。
    /// seek 成功会解除 EOF 锁存，EndOfMedia 回到 Loaded
    pub fn seek(&mut self, position_ms: i64) -> bool {
        if self.format.is_none() {
            warn!("⚠ 未加载媒体，无法 seek");
            return false;
        }
        if !self.is_seekable() {
            warn!("⚠ 当前媒体不支持 seek");
            return false;
        }

        let request = SeekRequest {
            position: position_ms.max(0),
            unit: self.seek_unit,
            target: self.seek_target,
        };

        self.interrupt.begin();
        let callback = InterruptCallback::new(self.interrupt.clone(), self.events.clone());
        match self.engine.seek(&request, &callback) {
            Ok(()) => {
                debug!("⏩ seek 完成: {}ms", request.position);
                self.eof = false;
                if self.status == MediaStatus::EndOfMedia {
                    self.set_media_status(MediaStatus::Loaded);
                }
                true
            }
            Err(code) => {
                if self.interrupt.status() {
                    warn!("⏹ seek 被用户中断");
                    return false;
                }
                let e = self.translate(code, Phase::Seek);
                error!("❌ {}", e);
                self.emit_error(e);
                false
            }
        }
    }

    /// 按比例 seek，q ∈ [0,1]
    ///
    /// 时长未知（直播/无界流）时快速失败返回 false，不猜测数值落点
    pub fn seek_fraction(&mut self, q: f64) -> bool {
        let duration = self.duration();
        if duration <= 0 {
            warn!("⚠ 时长未知，按比例 seek 被拒绝");
            return false;
        }
        let q = q.clamp(0.0, 1.0);
        self.seek((q * duration as f64) as i64)
    }

    // ---------- 中断控制 ----------

    /// 跨线程中断句柄（监督线程持有，用于取消卡住的阻塞调用）
    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle::new(self.interrupt.clone())
    }

    /// true: 中止正在进行的加载/读包/seek。标志不会自动复位
    pub fn set_interrupt_status(&self, interrupt: bool) {
        self.interrupt.set_status(interrupt);
    }

    pub fn interrupt_status(&self) -> bool {
        self.interrupt.status()
    }

    /// 设置阻塞调用超时（毫秒）
    pub fn set_interrupt_timeout(&self, timeout_ms: i64) {
        self.interrupt.set_timeout(timeout_ms);
    }

    pub fn interrupt_timeout(&self) -> i64 {
        self.interrupt.timeout()
    }

    // ---------- 选项 ----------

    /// 设置引擎选项字典，下次加载时生效；已打开的会话不做实时重配置
    pub fn set_options(&mut self, options: OptionDict) {
        self.options = options;
    }

    pub fn options(&self) -> &OptionDict {
        &self.options
    }

    // ---------- 缓冲状态（网络流） ----------

    /// 回报已缓冲时长（秒），驱动 Stalled/Buffering/Buffered 信息状态
    ///
    /// 只在 Loaded 族状态之间迁移，对读/seek 协议没有影响；
    /// 本地文件输入是 no-op
    pub fn update_buffer(&mut self, buffered_secs: f64) {
        let Some(buffer) = self.buffer.as_mut() else {
            return;
        };
        buffer.update(buffered_secs);
        let informational = matches!(
            self.status,
            MediaStatus::Loaded
                | MediaStatus::Stalled
                | MediaStatus::Buffering
                | MediaStatus::Buffered
        );
        if !informational {
            return;
        }
        if buffer.should_buffer() {
            let next = if buffer.is_drained() {
                MediaStatus::Stalled
            } else {
                MediaStatus::Buffering
            };
            self.set_media_status(next);
        } else if self.status != MediaStatus::Loaded {
            self.set_media_status(MediaStatus::Buffered);
        }
    }

    // ---------- 格式与编解码信息（非阻塞，读的都是已缓存状态） ----------

    /// 引擎在 open 时给出的完整格式信息
    pub fn format_info(&self) -> Option<&FormatInfo> {
        self.format.as_ref()
    }

    pub fn file_name(&self) -> String {
        self.input.as_ref().map(|i| i.file_name()).unwrap_or_default()
    }

    pub fn format_name(&self) -> String {
        self.format
            .as_ref()
            .map(|f| f.format_name.clone())
            .unwrap_or_default()
    }

    pub fn format_long_name(&self) -> String {
        self.format
            .as_ref()
            .map(|f| f.format_long_name.clone())
            .unwrap_or_default()
    }

    /// 起始时间（毫秒）
    pub fn start_time(&self) -> i64 {
        self.start_time_us() / 1000
    }

    /// 总时长（毫秒），未知时为 0
    pub fn duration(&self) -> i64 {
        self.duration_us() / 1000
    }

    pub fn start_time_us(&self) -> i64 {
        self.format.as_ref().map(|f| f.start_time_us).unwrap_or(0)
    }

    pub fn duration_us(&self) -> i64 {
        self.format.as_ref().map(|f| f.duration_us).unwrap_or(0)
    }

    /// 容器总码率（bit/s）
    pub fn bit_rate(&self) -> i64 {
        self.format.as_ref().map(|f| f.bit_rate).unwrap_or(0)
    }

    pub fn audio_bit_rate(&self, stream: i32) -> i64 {
        self.typed_stream_info(StreamType::Audio, stream)
            .map(|s| s.bit_rate)
            .unwrap_or(0)
    }

    pub fn video_bit_rate(&self, stream: i32) -> i64 {
        self.typed_stream_info(StreamType::Video, stream)
            .map(|s| s.bit_rate)
            .unwrap_or(0)
    }

    /// 当前视频流的平均帧率
    pub fn frame_rate(&self) -> f64 {
        self.typed_stream_info(StreamType::Video, -1)
            .map(|s| s.fps)
            .unwrap_or(0.0)
    }

    /// 帧数；stream < 0 时取默认可播放流（有视频用视频，否则音频）
    pub fn frames(&self, stream: i32) -> i64 {
        let index = if stream < 0 {
            self.default_playable()
        } else {
            stream
        };
        self.stream_info(index).map(|s| s.frames).unwrap_or(0)
    }

    pub fn width(&self) -> u32 {
        self.typed_stream_info(StreamType::Video, -1)
            .map(|s| s.width)
            .unwrap_or(0)
    }

    pub fn height(&self) -> u32 {
        self.typed_stream_info(StreamType::Video, -1)
            .map(|s| s.height)
            .unwrap_or(0)
    }

    pub fn audio_codec_name(&self, stream: i32) -> String {
        self.typed_stream_info(StreamType::Audio, stream)
            .map(|s| s.codec_name.clone())
            .unwrap_or_default()
    }

    pub fn audio_codec_long_name(&self, stream: i32) -> String {
        self.typed_stream_info(StreamType::Audio, stream)
            .map(|s| s.codec_long_name.clone())
            .unwrap_or_default()
    }

    pub fn video_codec_name(&self, stream: i32) -> String {
        self.typed_stream_info(StreamType::Video, stream)
            .map(|s| s.codec_name.clone())
            .unwrap_or_default()
    }

    pub fn video_codec_long_name(&self, stream: i32) -> String {
        self.typed_stream_info(StreamType::Video, stream)
            .map(|s| s.codec_long_name.clone())
            .unwrap_or_default()
    }

    pub fn subtitle_codec_name(&self, stream: i32) -> String {
        self.typed_stream_info(StreamType::Subtitle, stream)
            .map(|s| s.codec_name.clone())
            .unwrap_or_default()
    }

    pub fn subtitle_codec_long_name(&self, stream: i32) -> String {
        self.typed_stream_info(StreamType::Subtitle, stream)
            .map(|s| s.codec_long_name.clone())
            .unwrap_or_default()
    }

    /// 是否带附加图片流（封面图等）
    pub fn has_attached_picture(&self) -> bool {
        self.has_attached_pic
    }

    /// 按容器流索引取流信息（与选流无关）；index < 0 取默认可播放流
    pub fn stream_info(&self, index: i32) -> Option<&StreamInfo> {
        let index = if index < 0 {
            self.default_playable()
        } else {
            index
        };
        if index < 0 {
            return None;
        }
        self.format
            .as_ref()
            .and_then(|f| f.streams.get(index as usize))
    }

    /// stream < 0 的查询目标：默认可播放流（有视频用视频，否则音频）
    fn default_playable(&self) -> i32 {
        if self.video.resolved >= 0 {
            self.video.resolved
        } else {
            self.audio.resolved
        }
    }

    fn typed_stream_info(&self, stream_type: StreamType, stream: i32) -> Option<&StreamInfo> {
        let index = if stream < 0 {
            self.select(stream_type).resolved
        } else {
            stream
        };
        if index < 0 {
            return None;
        }
        self.format
            .as_ref()
            .and_then(|f| f.streams.get(index as usize))
    }

    // ---------- 错误翻译 ----------

    /// 把引擎的原生错误码翻译成结构化错误
    ///
    /// 超时判定：显式超时码，或失败时本次阻塞调用已超过中断超时
    /// （区分"用户中断"与"超时中止"靠中断标志，调用方先检查）
    fn translate(&self, code: i32, phase: Phase) -> DemuxError {
        let msg = native::err_to_string(code);
        let timed_out = code == native::ERR_TIMED_OUT || self.interrupt.timed_out();
        match phase {
            Phase::Open => {
                if timed_out {
                    DemuxError::OpenTimeout(msg)
                } else if code == native::ERR_INVALID_DATA {
                    DemuxError::InvalidMedia(msg)
                } else if native::is_known(code) {
                    DemuxError::OpenError(msg)
                } else {
                    DemuxError::Unknown { code, msg }
                }
            }
            Phase::Read => {
                if timed_out {
                    DemuxError::ReadTimeout(msg)
                } else if native::is_known(code) {
                    DemuxError::ReadError(msg)
                } else {
                    DemuxError::Unknown { code, msg }
                }
            }
            Phase::Seek => {
                if native::is_known(code) {
                    DemuxError::SeekError(msg)
                } else {
                    DemuxError::Unknown { code, msg }
                }
            }
        }
    }
}
