use std::fmt;
use std::ops::Range;

use bytes::{Bytes, BytesMut};

use crate::config::{BufferConfig, ByteOrder, PrependPolicy};
use crate::error::{BufferError, Result};
use crate::storage::SharedStorage;

/// 一次解码的结果：解出的值以及消费的字节数。
///
/// `length` 总是从解码起点开始计算，包含长度前缀、终止符等所有被读取的字节。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Decoded<T> {
    /// 解码得到的值。
    pub value: T,
    /// 消费的字节数。
    pub length: usize,
}

impl<T> Decoded<T> {
    /// 构造解码结果。
    pub fn new(value: T, length: usize) -> Self {
        Self { value, length }
    }

    /// 转换内部值，保持消费长度不变。
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            length: self.length,
        }
    }
}

/// `ByteBuffer` 是带双游标（`position`/`boundary`）的可增长字节缓冲。
///
/// # 设计背景（Why）
/// - 协议实现需要先逐个写入定宽数值、变长整数、字符串，再“翻转”为读模式把同一段字节读回来；
/// - 大量场景希望零拷贝地切出子视图，另一些场景则必须与源缓冲彻底隔离，两种语义都要显式可选。
///
/// # 游标模型（How）
/// - 写模式：`position` 指向下一次写入位置，`boundary` 不参与约束（新建时为 0）；
///   写入越过容量时先触发扩容；
/// - 读模式：[`flip`](Self::flip) 之后满足 `0 <= position <= boundary <= capacity`，
///   窗口 `[position, boundary)` 即可读字节；隐式偏移的读取不会越过 `boundary`；
/// - 模式没有显式标记，完全由上述不变量表达；[`clear`](Self::clear) 让同一块存储重新回到写模式。
///
/// # 共享与隔离（What）
/// | 操作 | 存储 | 结果游标 |
/// |---|---|---|
/// | [`slice`](Self::slice) | 与源共享 | `position=begin, boundary=end` |
/// | [`slice_and_compact`](Self::slice_and_compact) | 新分配 `[begin,end)` | `0, end-begin` |
/// | `clone` | 与源共享 | 与源相同 |
/// | [`copy`](Self::copy) | 新分配整块容量 | 与源相同 |
/// | [`compact`](Self::compact) | 新分配 `[position,boundary)` | `0, boundary-position` |
///
/// # 风险提示（Trade-offs）
/// - 共享存储的视图之间互相可见写入，这是零拷贝的代价；扩容/`resize` 会替换存储，
///   使当前实例脱离原共享组；
/// - 所有操作遵循“先校验、先扩容、再修改”，失败时游标与内容保持原状；
/// - [`destroy`](Self::destroy) 之后除只读查询外的一切操作返回 `IllegalState`。
#[derive(Clone)]
pub struct ByteBuffer {
    storage: Option<SharedStorage>,
    position: usize,
    boundary: usize,
    config: BufferConfig,
}

impl ByteBuffer {
    /// 按默认配置分配缓冲，容量为 [`DEFAULT_CAPACITY`](crate::DEFAULT_CAPACITY)。
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    /// 分配指定容量的零填充缓冲，`position = boundary = 0`。
    pub fn allocate(capacity: usize) -> Self {
        Self::with_config(BufferConfig::with_capacity(capacity))
    }

    /// 按完整配置分配缓冲。
    pub fn with_config(config: BufferConfig) -> Self {
        Self::from_parts(SharedStorage::zeroed(config.capacity), 0, 0, config)
    }

    /// 接管一段字节作为存储，`position = 0`，`boundary = capacity`。
    pub fn wrap(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        let len = bytes.len();
        Self::from_parts(
            SharedStorage::from_vec(bytes),
            0,
            len,
            BufferConfig::with_capacity(len),
        )
    }

    /// 以共享方式包装调用方持有的存储区域。
    ///
    /// 调用方保留的 [`SharedStorage`] 句柄与返回的缓冲互相可见写入。
    pub fn wrap_shared(storage: &SharedStorage) -> Self {
        let len = storage.len();
        Self::from_parts(storage.clone(), 0, len, BufferConfig::with_capacity(len))
    }

    /// 共享另一缓冲的存储并复制其游标，等价于 `other.clone()`。
    pub fn wrap_buffer(other: &ByteBuffer) -> Self {
        other.clone()
    }

    /// 以文本的 UTF-8 字节创建新存储，`boundary` 为字节长度。
    pub fn wrap_str(text: &str) -> Self {
        Self::wrap(text.as_bytes())
    }

    /// 构造期指定字节序。
    pub fn with_order(mut self, order: ByteOrder) -> Self {
        self.config.order = order;
        self
    }

    fn from_parts(
        storage: SharedStorage,
        position: usize,
        boundary: usize,
        config: BufferConfig,
    ) -> Self {
        Self {
            storage: Some(storage),
            position,
            boundary,
            config,
        }
    }

    /// 构造期配置。
    pub fn config(&self) -> BufferConfig {
        self.config
    }

    /// 定宽编解码使用的字节序。
    pub fn order(&self) -> ByteOrder {
        self.config.order
    }

    /// 当前容量；已销毁时为 0。
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().map_or(0, SharedStorage::len)
    }

    /// 主游标。
    pub fn position(&self) -> usize {
        self.position
    }

    /// 可读窗口上界。
    pub fn boundary(&self) -> usize {
        self.boundary
    }

    /// 窗口 `[position, boundary)` 内的字节数，写模式下为 0。
    pub fn remaining(&self) -> usize {
        self.boundary.saturating_sub(self.position)
    }

    /// 移动主游标。写模式下允许越过容量，下一次写入会先扩容。
    pub fn set_position(&mut self, position: usize) -> Result<&mut Self> {
        self.live("set_position")?;
        self.position = position;
        Ok(self)
    }

    /// 设置窗口上界，必须不超过容量。
    pub fn set_boundary(&mut self, boundary: usize) -> Result<&mut Self> {
        let capacity = self.live("set_boundary")?.len();
        if boundary > capacity {
            return Err(BufferError::range(
                "set_boundary",
                format!("boundary {boundary} exceeds capacity {capacity}"),
            ));
        }
        self.boundary = boundary;
        Ok(self)
    }

    /// 是否已被 [`destroy`](Self::destroy)。
    pub fn is_destroyed(&self) -> bool {
        self.storage.is_none()
    }

    /// 背后的存储句柄；已销毁时为 `None`。
    pub fn storage(&self) -> Option<&SharedStorage> {
        self.storage.as_ref()
    }

    /// 两个缓冲是否共享同一块存储。
    pub fn shares_storage_with(&self, other: &ByteBuffer) -> bool {
        match (&self.storage, &other.storage) {
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    fn live(&self, operation: &'static str) -> Result<&SharedStorage> {
        self.storage
            .as_ref()
            .ok_or_else(|| BufferError::destroyed(operation))
    }

    /// 确保容量至少为 `capacity`。
    ///
    /// # 扩容策略
    /// - 容量已足够时不做任何事；
    /// - 否则只尝试一次翻倍：`max(capacity * 2, requested)`，翻倍仍不足时直接取请求值，
    ///   不会循环翻倍。例如容量 5 请求 6 得到 10，随后请求 21 得到 21 而非 40。
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<&mut Self> {
        self.grow_to("ensure_capacity", capacity)?;
        Ok(self)
    }

    fn grow_to(&mut self, operation: &'static str, capacity: usize) -> Result<()> {
        let current = self.live(operation)?.len();
        if current < capacity {
            let doubled = current.saturating_mul(2);
            self.reallocate(doubled.max(capacity));
        }
        Ok(())
    }

    /// 把容量精确调整为 `capacity`：复制现有字节，截断或零填充，游标不变。
    ///
    /// 新存储与原共享组脱离。
    pub fn resize(&mut self, capacity: usize) -> Result<&mut Self> {
        self.live("resize")?;
        self.reallocate(capacity);
        Ok(self)
    }

    fn reallocate(&mut self, capacity: usize) {
        let (from, bytes) = match &self.storage {
            Some(storage) => (
                storage.len(),
                storage.with(|old| {
                    let keep = old.len().min(capacity);
                    let mut bytes = Vec::with_capacity(capacity);
                    bytes.extend_from_slice(&old[..keep]);
                    bytes.resize(capacity, 0);
                    bytes
                }),
            ),
            None => return,
        };
        tracing::trace!(from, to = capacity, "storage resized");
        self.storage = Some(SharedStorage::from_vec(bytes));
    }

    /// 写模式 → 读模式：`boundary = position; position = 0`。
    pub fn flip(&mut self) -> Result<&mut Self> {
        self.live("flip")?;
        self.boundary = self.position;
        self.position = 0;
        Ok(self)
    }

    /// 丢弃窗口回到写模式：`position = boundary = 0`，内容不擦除。
    pub fn clear(&mut self) -> Result<&mut Self> {
        self.live("clear")?;
        self.position = 0;
        self.boundary = 0;
        Ok(self)
    }

    /// 切出共享存储的视图 `[begin, end)`。
    ///
    /// # 契约说明（What）
    /// - **前置条件**：`begin <= end <= capacity`，否则返回 `Range`；
    /// - **返回值**：新实例与源共享存储，`position = begin`，`boundary = end`；
    /// - **后置条件**：源实例视作已处理到 `end`：`position = end`，`boundary = 0`。
    pub fn slice(&mut self, begin: usize, end: usize) -> Result<ByteBuffer> {
        let storage = self.live("slice")?.clone();
        check_bounds("slice", begin, end, storage.len())?;
        tracing::trace!(begin, end, "slice shares storage");
        self.position = end;
        self.boundary = 0;
        Ok(Self::from_parts(storage, begin, end, self.config))
    }

    /// 与 [`slice`](Self::slice) 相同的逻辑切分，但结果持有仅包含 `[begin, end)` 的新存储。
    pub fn slice_and_compact(&mut self, begin: usize, end: usize) -> Result<ByteBuffer> {
        let storage = self.live("slice_and_compact")?;
        check_bounds("slice_and_compact", begin, end, storage.len())?;
        let bytes = storage.with(|bytes| bytes[begin..end].to_vec());
        self.position = end;
        self.boundary = 0;
        Ok(Self::from_parts(
            SharedStorage::from_vec(bytes),
            0,
            end - begin,
            self.config,
        ))
    }

    /// 把存储收缩为恰好容纳当前窗口的新区域。
    ///
    /// 若处于写模式（`position > boundary`）先翻转，再把 `[position, boundary)` 复制到新存储，
    /// 随后 `position = 0`，`boundary` 为窗口长度。
    pub fn compact(&mut self) -> Result<&mut Self> {
        let storage = self.live("compact")?;
        let window = if self.position > self.boundary {
            0..self.position
        } else {
            self.position..self.boundary
        };
        let bytes = copy_range(storage, "compact", window.clone())?;
        tracing::trace!(len = bytes.len(), "compacted into fresh storage");
        self.storage = Some(SharedStorage::from_vec(bytes));
        self.position = 0;
        self.boundary = window.len();
        Ok(self)
    }

    /// 复制整块存储（容量不变）与游标，结果与源完全隔离。
    pub fn copy(&self) -> Result<ByteBuffer> {
        let bytes = self.live("copy")?.to_vec();
        Ok(Self::from_parts(
            SharedStorage::from_vec(bytes),
            self.position,
            self.boundary,
            self.config,
        ))
    }

    /// 把 `source` 窗口起始的 `length` 字节（缺省为整个窗口）追加到本缓冲的 `boundary` 处。
    ///
    /// 目标不足时扩容，完成后 `boundary += length`；本缓冲的 `position` 与 `source` 均不变。
    /// `length` 超过 `source.remaining()` 时返回 `Range`。
    pub fn append(&mut self, source: &ByteBuffer, length: Option<usize>) -> Result<&mut Self> {
        self.live("append")?;
        let bytes = source.window_bytes("append", length)?;
        let offset = self.boundary;
        self.write_at("append", offset, &bytes)?;
        self.boundary = offset + bytes.len();
        Ok(self)
    }

    /// 在显式偏移处写入 `source` 的窗口字节，`boundary` 不变。
    pub fn append_at(
        &mut self,
        source: &ByteBuffer,
        offset: usize,
        length: Option<usize>,
    ) -> Result<&mut Self> {
        self.live("append_at")?;
        let bytes = source.window_bytes("append_at", length)?;
        self.write_at("append_at", offset, &bytes)?;
        Ok(self)
    }

    /// 把 `source` 窗口起始的 `length` 字节写到 `position` 之前，并令 `position -= length`。
    ///
    /// # 契约说明（What）
    /// - `position >= length` 时直接写入 `[position - length, position)`；
    /// - 空间不足时按配置的 [`PrependPolicy`] 处理：`Strict` 返回 `Range`，
    ///   `Grow` 扩容并把现有内容右移差额，`position`/`boundary` 随之平移后再写入；
    /// - `length` 超过 `source.remaining()` 时返回 `Range`。
    pub fn prepend(&mut self, source: &ByteBuffer, length: Option<usize>) -> Result<&mut Self> {
        self.live("prepend")?;
        let bytes = source.window_bytes("prepend", length)?;
        let start = self.make_room("prepend", self.position, bytes.len())?;
        self.write_at("prepend", start, &bytes)?;
        self.position = start;
        Ok(self)
    }

    /// 把 `source` 的窗口字节写到显式偏移 `offset` 之前，`position` 仅随扩容平移。
    pub fn prepend_at(
        &mut self,
        source: &ByteBuffer,
        offset: usize,
        length: Option<usize>,
    ) -> Result<&mut Self> {
        self.live("prepend_at")?;
        let bytes = source.window_bytes("prepend_at", length)?;
        let start = self.make_room("prepend_at", offset, bytes.len())?;
        self.write_at("prepend_at", start, &bytes)?;
        Ok(self)
    }

    /// 为结束于 `end` 的 `length` 字节腾出空间，返回写入起点。
    fn make_room(&mut self, operation: &'static str, end: usize, length: usize) -> Result<usize> {
        if end >= length {
            return Ok(end - length);
        }
        match self.config.prepend {
            PrependPolicy::Strict => Err(BufferError::range(
                operation,
                format!("{length} bytes do not fit before offset {end}"),
            )),
            PrependPolicy::Grow => {
                let shift = length - end;
                let mut bytes = vec![0; shift];
                self.live(operation)?.with(|old| bytes.extend_from_slice(old));
                tracing::debug!(shift, capacity = bytes.len(), "prepend shifted existing content");
                self.storage = Some(SharedStorage::from_vec(bytes));
                self.position += shift;
                self.boundary += shift;
                Ok(0)
            }
        }
    }

    /// 原地反转窗口 `[position, boundary)` 的字节顺序；窗口长度不超过 1 时什么也不做。
    pub fn reverse(&mut self) -> Result<&mut Self> {
        let storage = self.live("reverse")?;
        if self.boundary.saturating_sub(self.position) > 1 {
            check_bounds("reverse", self.position, self.boundary, storage.len())?;
            let window = self.position..self.boundary;
            storage.with_mut(|bytes| bytes[window].reverse());
        }
        Ok(self)
    }

    /// 释放存储引用，实例永久不可用，游标归零。
    pub fn destroy(&mut self) {
        if let Some(storage) = self.storage.take() {
            tracing::debug!(
                capacity = storage.len(),
                handles = storage.handle_count(),
                "buffer destroyed"
            );
        }
        self.position = 0;
        self.boundary = 0;
    }

    /// 解析读取窗口。
    ///
    /// - 隐式偏移（`None`）：`[position, boundary)`，写模式下为空窗口；
    /// - 显式偏移：`[offset, capacity)`，由调用方对偏移负责，可在翻转前直接按绝对位置读取。
    pub fn window(&self, offset: Option<usize>) -> Result<Range<usize>> {
        self.window_for("window", offset)
    }

    fn window_for(&self, operation: &'static str, offset: Option<usize>) -> Result<Range<usize>> {
        let capacity = self.live(operation)?.len();
        match offset {
            None => {
                let end = self.boundary.min(capacity);
                let start = self.position.min(end);
                Ok(start..end)
            }
            Some(offset) if offset <= capacity => Ok(offset..capacity),
            Some(offset) => Err(BufferError::range(
                operation,
                format!("offset {offset} exceeds capacity {capacity}"),
            )),
        }
    }

    /// 在读取窗口上运行解码器。
    ///
    /// # 教案式说明
    /// - **意图 (Why)**：编解码层只需面对一个连续切片，无需关心游标与锁；
    /// - **契约 (What)**：`decode` 返回 `(值, 消费字节数)`，消费数不得超过切片长度；
    ///   偏移为 `None` 时 `position` 前移消费数，显式偏移时游标不变；
    ///   解码失败时缓冲保持原状；
    /// - **风险 (Trade-offs)**：解码器在只读锁内执行，不得再访问同一缓冲。
    pub fn decode_with<T>(
        &mut self,
        operation: &'static str,
        offset: Option<usize>,
        decode: impl FnOnce(&[u8]) -> Result<(T, usize)>,
    ) -> Result<Decoded<T>> {
        let window = self.window_for(operation, offset)?;
        let start = window.start;
        let (value, length) = self.live(operation)?.with(|bytes| decode(&bytes[window]))?;
        // 空窗口可能经过截断，零长度解码不得改写游标。
        if offset.is_none() && length > 0 {
            self.position = start + length;
        }
        Ok(Decoded::new(value, length))
    }

    /// 从读取窗口复制 `dst.len()` 字节，窗口不足时返回 `Range`。
    pub fn read_bytes(
        &mut self,
        operation: &'static str,
        offset: Option<usize>,
        dst: &mut [u8],
    ) -> Result<usize> {
        let wanted = dst.len();
        let decoded = self.decode_with(operation, offset, |window| {
            if window.len() < wanted {
                return Err(BufferError::range(
                    operation,
                    format!("needs {wanted} bytes but only {} are readable", window.len()),
                ));
            }
            dst.copy_from_slice(&window[..wanted]);
            Ok(((), wanted))
        })?;
        Ok(decoded.length)
    }

    /// 写入字节：先确保容量，再复制；隐式偏移时 `position` 前移写入长度。
    pub fn write_bytes(
        &mut self,
        operation: &'static str,
        offset: Option<usize>,
        src: &[u8],
    ) -> Result<usize> {
        let start = offset.unwrap_or(self.position);
        self.write_at(operation, start, src)?;
        if offset.is_none() {
            self.position = start + src.len();
        }
        Ok(src.len())
    }

    fn write_at(&mut self, operation: &'static str, offset: usize, src: &[u8]) -> Result<()> {
        let end = offset.checked_add(src.len()).ok_or_else(|| {
            BufferError::range(operation, format!("offset {offset} overflows usize"))
        })?;
        self.grow_to(operation, end)?;
        self.live(operation)?
            .with_mut(|bytes| bytes[offset..end].copy_from_slice(src));
        Ok(())
    }

    fn window_bytes(&self, operation: &'static str, length: Option<usize>) -> Result<Vec<u8>> {
        let storage = self.live(operation)?;
        let available = self.remaining();
        let length = length.unwrap_or(available);
        if length > available {
            return Err(BufferError::range(
                operation,
                format!("requested {length} bytes but source has only {available} readable"),
            ));
        }
        copy_range(storage, operation, self.position..self.position + length)
    }

    /// 导出可读窗口的副本；写模式下导出 `[0, position)`，与翻转后的窗口一致。游标不变。
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        let storage = self.live("to_vec")?;
        let window = if self.position > self.boundary {
            0..self.position
        } else {
            self.position..self.boundary
        };
        copy_range(storage, "to_vec", window)
    }

    /// 与 [`to_vec`](Self::to_vec) 相同，返回 `bytes::Bytes`。
    pub fn to_bytes(&self) -> Result<Bytes> {
        self.to_vec().map(Bytes::from)
    }
}

fn check_bounds(operation: &'static str, begin: usize, end: usize, capacity: usize) -> Result<()> {
    if begin > end || end > capacity {
        return Err(BufferError::range(
            operation,
            format!("range {begin}..{end} is invalid for capacity {capacity}"),
        ));
    }
    Ok(())
}

fn copy_range(
    storage: &SharedStorage,
    operation: &'static str,
    range: Range<usize>,
) -> Result<Vec<u8>> {
    check_bounds(operation, range.start, range.end, storage.len())?;
    Ok(storage.with(|bytes| bytes[range].to_vec()))
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteBuffer")
            .field("position", &self.position)
            .field("boundary", &self.boundary)
            .field("capacity", &self.capacity())
            .field("order", &self.config.order)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl From<Vec<u8>> for ByteBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::wrap(bytes)
    }
}

impl From<&[u8]> for ByteBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self::wrap(bytes)
    }
}

impl From<&str> for ByteBuffer {
    fn from(text: &str) -> Self {
        Self::wrap_str(text)
    }
}

impl From<String> for ByteBuffer {
    fn from(text: String) -> Self {
        Self::wrap(text.into_bytes())
    }
}

impl From<Bytes> for ByteBuffer {
    fn from(bytes: Bytes) -> Self {
        Self::wrap(bytes.to_vec())
    }
}

impl From<BytesMut> for ByteBuffer {
    fn from(bytes: BytesMut) -> Self {
        Self::wrap(bytes.to_vec())
    }
}
