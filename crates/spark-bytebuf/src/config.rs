//! 缓冲构造期配置。
//!
//! # 设计背景（Why）
//! - 字节序、初始容量与前插策略都属于“实例一经创建便固定”的属性，
//!   以显式值在构造时传入，而不是进程级可变全局量，避免不同调用点互相干扰；
//! - 配置实现 `serde` 序列化，便于嵌入上层服务的 TOML/JSON 配置文件。
//!
//! # 契约说明（What）
//! - [`BufferConfig::default`] 给出 `capacity = DEFAULT_CAPACITY`、大端序、`PrependPolicy::Grow`；
//! - 反序列化时缺省字段回落到默认值，枚举值使用 snake_case（`"big_endian"`、`"grow"`）。

use serde::{Deserialize, Serialize};

/// 未显式指定容量时的初始容量（字节）。
pub const DEFAULT_CAPACITY: usize = 16;

/// 定宽数值编解码所使用的字节序。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ByteOrder {
    /// 网络字节序，高位在前。
    #[default]
    BigEndian,
    /// 低位在前。
    LittleEndian,
}

/// 当 `position` 之前的空间不足以容纳前插数据时的处理策略。
///
/// - `Strict`：直接返回 `Range` 错误，缓冲保持不变；
/// - `Grow`：扩容并把现有内容整体右移，为前插数据腾出空间。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrependPolicy {
    /// 空间不足即失败。
    Strict,
    /// 扩容并右移现有内容。
    #[default]
    Grow,
}

/// 单个 [`ByteBuffer`](crate::ByteBuffer) 的构造期配置。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferConfig {
    /// 初始容量（字节），分配时零填充。
    pub capacity: usize,
    /// 定宽编解码使用的字节序。
    pub order: ByteOrder,
    /// 前插空间不足时的策略。
    pub prepend: PrependPolicy,
}

impl BufferConfig {
    /// 以默认值为基础替换初始容量。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// 替换字节序。
    pub fn order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    /// 替换前插策略。
    pub fn prepend(mut self, prepend: PrependPolicy) -> Self {
        self.prepend = prepend;
        self
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            order: ByteOrder::default(),
            prepend: PrependPolicy::default(),
        }
    }
}
