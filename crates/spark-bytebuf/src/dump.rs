//! 诊断输出：十六进制转储与 `Display`。
//!
//! 转储格式为每个字节前置一个游标标记，末尾再追加索引 `capacity` 处的标记：
//!
//! | 标记 | 含义 |
//! |---|---|
//! | `<` | 该索引等于 `position` |
//! | `>` | 该索引等于 `boundary` |
//! | `\|` | `position == boundary == 该索引` |
//! | 空格 | 都不是 |
//!
//! 字节以两位大写十六进制输出。已销毁实例输出 [`DESTROYED_SENTINEL`]。

use std::fmt::{self, Write as _};

use crate::byte_buffer::ByteBuffer;

/// 已销毁实例的转储结果。
pub const DESTROYED_SENTINEL: &str = "DESTROYED";

impl ByteBuffer {
    /// 生成整个容量范围的十六进制转储。
    ///
    /// ```
    /// use spark_bytebuf::ByteBuffer;
    ///
    /// let mut buffer = ByteBuffer::allocate(3);
    /// buffer.write_bytes("doc", None, &[0x12, 0x34]).unwrap();
    /// assert_eq!(buffer.to_hex(), ">12 34<00 ");
    /// ```
    pub fn to_hex(&self) -> String {
        let Some(storage) = self.storage() else {
            return DESTROYED_SENTINEL.to_owned();
        };
        storage.with(|bytes| {
            let mut out = String::with_capacity(bytes.len() * 3 + 1);
            for (index, byte) in bytes.iter().enumerate() {
                out.push(self.marker(index));
                let _ = write!(out, "{byte:02X}");
            }
            out.push(self.marker(bytes.len()));
            out
        })
    }

    fn marker(&self, index: usize) -> char {
        match (index == self.position(), index == self.boundary()) {
            (true, true) => '|',
            (true, false) => '<',
            (false, true) => '>',
            (false, false) => ' ',
        }
    }
}

impl fmt::Display for ByteBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_destroyed() {
            return write!(f, "ByteBuffer({DESTROYED_SENTINEL})");
        }
        write!(
            f,
            "ByteBuffer(position={},boundary={},capacity={})",
            self.position(),
            self.boundary(),
            self.capacity()
        )
    }
}
