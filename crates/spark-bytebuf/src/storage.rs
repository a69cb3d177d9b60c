use std::fmt;
use std::sync::Arc;

use spin::RwLock;

/// `SharedStorage` 是缓冲背后的定长字节区域，以引用计数句柄的形式在多个视图之间共享。
///
/// # 设计动机（Why）
/// - `slice`/`clone`/`wrap_buffer` 需要零拷贝地产生新视图：多个 [`ByteBuffer`](crate::ByteBuffer)
///   各自持有独立的 `position`/`boundary`，但指向同一块内存；
/// - 这种关系没有“主人”：任意一个视图释放都不影响其它视图，最后一个句柄释放时内存才归还。
///
/// # 结构设计（How）
/// - `Arc` 负责引用计数；`spin::RwLock` 只用于满足 Rust 的别名规则，使共享区域可以被写入；
/// - 区域长度即容量，创建后不会变化。扩容由缓冲替换整个句柄完成，旧视图继续指向旧区域。
///
/// # 风险提示（Trade-offs）
/// - **别名是刻意的隐患**：通过任意一个视图写入，所有共享该区域的视图都会看到变化；
///   需要隔离时应使用 `copy`/`slice_and_compact`/`compact`；
/// - 锁不构成并发协议：跨线程交错修改同一区域的语义由调用方负责串行化。
#[derive(Clone)]
pub struct SharedStorage {
    bytes: Arc<RwLock<Vec<u8>>>,
}

impl SharedStorage {
    /// 分配零填充的区域。
    pub fn zeroed(capacity: usize) -> Self {
        Self::from_vec(vec![0; capacity])
    }

    /// 接管已有字节作为区域内容，不发生复制。
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Arc::new(RwLock::new(bytes)),
        }
    }

    /// 区域长度（即容量）。
    pub fn len(&self) -> usize {
        self.bytes.read().len()
    }

    /// 区域是否为空。
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 判断两个句柄是否指向同一块区域。
    pub fn ptr_eq(&self, other: &SharedStorage) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }

    /// 当前共享该区域的句柄数量。
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.bytes)
    }

    /// 在只读锁内访问整个区域。
    pub fn with<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        f(&self.bytes.read())
    }

    /// 在写锁内访问整个区域；写入对所有共享句柄可见。
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        f(&mut self.bytes.write())
    }

    /// 复制区域内容。
    pub fn to_vec(&self) -> Vec<u8> {
        self.bytes.read().clone()
    }
}

impl From<Vec<u8>> for SharedStorage {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from_vec(bytes)
    }
}

impl fmt::Debug for SharedStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedStorage")
            .field("len", &self.len())
            .field("handles", &self.handle_count())
            .finish()
    }
}
