//! JSON 负载：以 `serde_json` 序列化后作为 L 字符串读写。
//!
//! 仅在启用 `json` feature 时编译。序列化/反序列化失败统一映射为 `Range`，缓冲保持不变。

use serde::Serialize;
use serde::de::DeserializeOwned;
use spark_bytebuf::{BufferError, ByteBuffer, Decoded, Result};

use crate::string::{StringCodec, decode_lstring};

/// JSON 编解码扩展。
pub trait JsonCodec {
    /// 把 `value` 序列化为紧凑 JSON 并以 L 字符串写入，返回写入字节数。
    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<usize>;

    /// 从窗口读取 L 字符串并反序列化；解析失败时游标不动。
    fn read_json<T: DeserializeOwned>(&mut self) -> Result<Decoded<T>>;
}

impl JsonCodec for ByteBuffer {
    fn write_json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<usize> {
        let text = serde_json::to_string(value)
            .map_err(|err| BufferError::range("write_json", err.to_string()))?;
        self.write_lstring(&text)
    }

    fn read_json<T: DeserializeOwned>(&mut self) -> Result<Decoded<T>> {
        self.decode_with("read_json", None, |bytes| {
            let (text, length) = decode_lstring("read_json", bytes)?;
            let value = serde_json::from_str(&text)
                .map_err(|err| BufferError::range("read_json", err.to_string()))?;
            Ok((value, length))
        })
    }
}
