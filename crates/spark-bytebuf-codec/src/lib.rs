#![warn(missing_docs)]

//! # spark-bytebuf-codec
//!
//! ## 教案意图（Why）
//! - 在 [`spark_bytebuf::ByteBuffer`] 之上提供协议常用的原始编码：定宽数值、zig-zag、
//!   LEB128 变长整数、31 位扩展 UTF-8 码点以及由它们组合出的字符串编码；
//! - 算法本身无状态，既以自由函数暴露（便于对任意切片使用），也以扩展 trait 挂在缓冲上。
//!
//! ## 使用方式（How）
//! - `use spark_bytebuf_codec::prelude::*;` 引入全部扩展 trait；
//! - 不带 `_at` 后缀的方法读写 `position` 并推进游标，读取受 `boundary` 约束；
//! - `_at` 形式接受显式偏移，读取以容量为界，任何情况下都不移动游标。
//!
//! ## 契约说明（What）
//! - 所有失败以 [`BufferError`](spark_bytebuf::BufferError) 返回：格式非法、截断、越界为 `Range`，
//!   已销毁实例为 `IllegalState`；
//! - 写入先确保容量再落盘，失败时缓冲内容与游标不变。
//!
//! ## Feature
//! - `json`（默认开启）：`JsonCodec`，以 L 字符串承载 `serde_json` 负载。

pub mod fixed;
#[cfg(feature = "json")]
pub mod json;
pub mod prelude;
pub mod string;
pub mod utf8;
pub mod varint;
pub mod zigzag;

pub use fixed::FixedWidthCodec;
#[cfg(feature = "json")]
pub use json::JsonCodec;
pub use string::StringCodec;
pub use utf8::{
    MAX_CODEPOINT, Utf8Codec, calculate_utf8_char, decode_codepoint, decode_utf8_char,
    encode_codepoint, encode_utf8_char,
};
pub use varint::{
    VarintCodec, calculate_varint32, calculate_varint64, decode_varint32, decode_varint64,
};
