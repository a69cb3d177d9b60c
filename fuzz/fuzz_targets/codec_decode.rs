#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spark_bytebuf::{BufferError, ByteBuffer};
use spark_bytebuf_codec::prelude::*;

/// Fuzz 用例：任意字节作为已翻转的读窗口，交给每一个解码器。
///
/// - **Why**：解码器直接面对对端数据，任何输入都只能返回 `Range`，不得 panic 或越界推进游标；
/// - **How**：`boundary` 截短窗口以覆盖“窗口内截断”的路径，`chars` 驱动按码点计数的读取；
/// - **What**：成功时 `position` 恰好前移 `length` 且不越过 `boundary`，失败时游标保持不变。
#[derive(Debug, Arbitrary)]
struct DecodeCase {
    bytes: Vec<u8>,
    boundary: Option<u16>,
    chars: u64,
}

type Decoder = fn(&mut ByteBuffer, usize) -> Result<usize, BufferError>;

const DECODERS: &[(&str, Decoder)] = &[
    ("read_u32", |b, _| b.read_u32().map(|_| 4)),
    ("read_f64", |b, _| b.read_f64().map(|_| 8)),
    ("read_varint32", |b, _| b.read_varint32().map(|d| d.length)),
    ("read_varint64", |b, _| b.read_varint64().map(|d| d.length)),
    ("read_zigzag_varint32", |b, _| b.read_zigzag_varint32().map(|d| d.length)),
    ("read_utf8_char", |b, _| b.read_utf8_char().map(|d| d.length)),
    ("read_utf8_string", |b, chars| b.read_utf8_string(chars).map(|d| d.length)),
    ("read_utf8_string_bytes", |b, len| b.read_utf8_string_bytes(len).map(|d| d.length)),
    ("read_lstring", |b, _| b.read_lstring().map(|d| d.length)),
    ("read_vstring", |b, _| b.read_vstring().map(|d| d.length)),
    ("read_cstring", |b, _| b.read_cstring().map(|d| d.length)),
];

fuzz_target!(|case: DecodeCase| {
    for (name, decode) in DECODERS {
        let mut buffer = ByteBuffer::wrap(case.bytes.clone());
        if let Some(boundary) = case.boundary {
            let boundary = usize::from(boundary) % (case.bytes.len() + 1);
            buffer.set_boundary(boundary).expect("boundary within capacity");
        }
        let boundary = buffer.boundary();
        let count = usize::try_from(case.chars).unwrap_or(usize::MAX);
        match decode(&mut buffer, count) {
            Ok(length) => {
                assert_eq!(buffer.position(), length, "{name} advanced inconsistently");
                assert!(buffer.position() <= boundary, "{name} read past boundary");
            }
            Err(err) => {
                assert_eq!(err.code(), spark_bytebuf::codes::BUFFER_RANGE, "{name}: {err}");
                assert_eq!(buffer.position(), 0, "{name} moved position on failure");
            }
        }
    }
});
