//! LEB128 风格变长整数：每字节 7 位负载，除最后一字节外最高位为续接位，低位在前。
//!
//! # 契约说明（What）
//! - 32 位值最多 5 字节，64 位值最多 10 字节；
//! - 解码时窗口在终止字节之前结束视为截断，超过上限仍带续接位视为格式非法，二者都返回 `Range`；
//! - 第 5 字节中超出 32 位的负载位被丢弃，与按 32 位寄存器累积的实现保持逐位兼容。

use spark_bytebuf::{BufferError, ByteBuffer, Decoded, Result};

use crate::zigzag;

/// 32 位变长整数的最大字节数。
pub const MAX_VARINT32_LEN: usize = 5;

/// 64 位变长整数的最大字节数。
pub const MAX_VARINT64_LEN: usize = 10;

/// 计算 `value` 编码后的字节数（1..=5）。
pub const fn calculate_varint32(value: u32) -> usize {
    calculate_varint64(value as u64)
}

/// 计算 `value` 编码后的字节数（1..=10）。
pub const fn calculate_varint64(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// 把 `value` 编码进 `out`，返回写入的字节数。
pub fn encode_varint64(mut value: u64, out: &mut [u8; MAX_VARINT64_LEN]) -> usize {
    let mut len = 0;
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out[len] = byte;
        len += 1;
        if value == 0 {
            return len;
        }
    }
}

/// 从切片开头解码 32 位变长整数，返回 `(值, 消费字节数)`。
pub fn decode_varint32(bytes: &[u8]) -> Result<(u32, usize)> {
    decode_varint32_for("read_varint32", bytes)
}

pub(crate) fn decode_varint32_for(operation: &'static str, bytes: &[u8]) -> Result<(u32, usize)> {
    let mut value = 0u32;
    for (index, &byte) in bytes.iter().take(MAX_VARINT32_LEN).enumerate() {
        value |= u32::from(byte & 0x7F) << (7 * index);
        if byte & 0x80 == 0 {
            return Ok((value, index + 1));
        }
    }
    Err(malformed(operation, bytes.len(), MAX_VARINT32_LEN))
}

/// 从切片开头解码 64 位变长整数，返回 `(值, 消费字节数)`。
pub fn decode_varint64(bytes: &[u8]) -> Result<(u64, usize)> {
    decode_varint64_for("read_varint64", bytes)
}

fn decode_varint64_for(operation: &'static str, bytes: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (index, &byte) in bytes.iter().take(MAX_VARINT64_LEN).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * index);
        if byte & 0x80 == 0 {
            return Ok((value, index + 1));
        }
    }
    Err(malformed(operation, bytes.len(), MAX_VARINT64_LEN))
}

fn malformed(operation: &'static str, available: usize, limit: usize) -> BufferError {
    if available < limit {
        BufferError::range(
            operation,
            format!("truncated varint: window ended after {available} bytes"),
        )
    } else {
        BufferError::range(operation, format!("varint exceeds {limit} bytes"))
    }
}

/// 变长整数编解码，作为扩展 trait 挂在 [`ByteBuffer`] 上。
///
/// 不带 `_at` 后缀的方法使用并推进 `position`；`_at` 形式使用显式偏移，游标不动。
/// 写入方法返回写入的字节数，读取方法返回 [`Decoded`]。
pub trait VarintCodec {
    /// 写入 32 位变长整数。
    fn write_varint32(&mut self, value: u32) -> Result<usize>;
    /// 在显式偏移处写入 32 位变长整数。
    fn write_varint32_at(&mut self, offset: usize, value: u32) -> Result<usize>;
    /// 读取 32 位变长整数。
    fn read_varint32(&mut self) -> Result<Decoded<u32>>;
    /// 在显式偏移处读取 32 位变长整数。
    fn read_varint32_at(&mut self, offset: usize) -> Result<Decoded<u32>>;

    /// 以 zig-zag 映射写入有符号 32 位值。
    fn write_zigzag_varint32(&mut self, value: i32) -> Result<usize>;
    /// 在显式偏移处以 zig-zag 映射写入有符号 32 位值。
    fn write_zigzag_varint32_at(&mut self, offset: usize, value: i32) -> Result<usize>;
    /// 读取 zig-zag 映射的有符号 32 位值。
    fn read_zigzag_varint32(&mut self) -> Result<Decoded<i32>>;
    /// 在显式偏移处读取 zig-zag 映射的有符号 32 位值。
    fn read_zigzag_varint32_at(&mut self, offset: usize) -> Result<Decoded<i32>>;

    /// 写入 64 位变长整数。
    fn write_varint64(&mut self, value: u64) -> Result<usize>;
    /// 在显式偏移处写入 64 位变长整数。
    fn write_varint64_at(&mut self, offset: usize, value: u64) -> Result<usize>;
    /// 读取 64 位变长整数。
    fn read_varint64(&mut self) -> Result<Decoded<u64>>;
    /// 在显式偏移处读取 64 位变长整数。
    fn read_varint64_at(&mut self, offset: usize) -> Result<Decoded<u64>>;

    /// 以 zig-zag 映射写入有符号 64 位值。
    fn write_zigzag_varint64(&mut self, value: i64) -> Result<usize>;
    /// 读取 zig-zag 映射的有符号 64 位值。
    fn read_zigzag_varint64(&mut self) -> Result<Decoded<i64>>;
}

fn put(
    buffer: &mut ByteBuffer,
    operation: &'static str,
    offset: Option<usize>,
    value: u64,
) -> Result<usize> {
    let mut scratch = [0u8; MAX_VARINT64_LEN];
    let len = encode_varint64(value, &mut scratch);
    buffer.write_bytes(operation, offset, &scratch[..len])
}

fn get32(
    buffer: &mut ByteBuffer,
    operation: &'static str,
    offset: Option<usize>,
) -> Result<Decoded<u32>> {
    buffer.decode_with(operation, offset, |bytes| decode_varint32_for(operation, bytes))
}

fn get64(
    buffer: &mut ByteBuffer,
    operation: &'static str,
    offset: Option<usize>,
) -> Result<Decoded<u64>> {
    buffer.decode_with(operation, offset, |bytes| decode_varint64_for(operation, bytes))
}

impl VarintCodec for ByteBuffer {
    fn write_varint32(&mut self, value: u32) -> Result<usize> {
        put(self, "write_varint32", None, u64::from(value))
    }

    fn write_varint32_at(&mut self, offset: usize, value: u32) -> Result<usize> {
        put(self, "write_varint32", Some(offset), u64::from(value))
    }

    fn read_varint32(&mut self) -> Result<Decoded<u32>> {
        get32(self, "read_varint32", None)
    }

    fn read_varint32_at(&mut self, offset: usize) -> Result<Decoded<u32>> {
        get32(self, "read_varint32", Some(offset))
    }

    fn write_zigzag_varint32(&mut self, value: i32) -> Result<usize> {
        put(self, "write_zigzag_varint32", None, u64::from(zigzag::encode32(value)))
    }

    fn write_zigzag_varint32_at(&mut self, offset: usize, value: i32) -> Result<usize> {
        put(
            self,
            "write_zigzag_varint32",
            Some(offset),
            u64::from(zigzag::encode32(value)),
        )
    }

    fn read_zigzag_varint32(&mut self) -> Result<Decoded<i32>> {
        get32(self, "read_zigzag_varint32", None).map(|d| d.map(zigzag::decode32))
    }

    fn read_zigzag_varint32_at(&mut self, offset: usize) -> Result<Decoded<i32>> {
        get32(self, "read_zigzag_varint32", Some(offset)).map(|d| d.map(zigzag::decode32))
    }

    fn write_varint64(&mut self, value: u64) -> Result<usize> {
        put(self, "write_varint64", None, value)
    }

    fn write_varint64_at(&mut self, offset: usize, value: u64) -> Result<usize> {
        put(self, "write_varint64", Some(offset), value)
    }

    fn read_varint64(&mut self) -> Result<Decoded<u64>> {
        get64(self, "read_varint64", None)
    }

    fn read_varint64_at(&mut self, offset: usize) -> Result<Decoded<u64>> {
        get64(self, "read_varint64", Some(offset))
    }

    fn write_zigzag_varint64(&mut self, value: i64) -> Result<usize> {
        put(self, "write_zigzag_varint64", None, zigzag::encode64(value))
    }

    fn read_zigzag_varint64(&mut self) -> Result<Decoded<i64>> {
        get64(self, "read_zigzag_varint64", None).map(|d| d.map(zigzag::decode64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use spark_bytebuf::ErrorKind;

    #[test]
    fn lengths_track_seven_bit_groups() {
        assert_eq!(calculate_varint32(0), 1);
        assert_eq!(calculate_varint32(0x7F), 1);
        assert_eq!(calculate_varint32(0x80), 2);
        assert_eq!(calculate_varint32(300), 2);
        assert_eq!(calculate_varint32(u32::MAX), 5);
        assert_eq!(calculate_varint64(u64::MAX), 10);
    }

    #[test]
    fn encodes_three_hundred_low_group_first() {
        let mut out = [0u8; MAX_VARINT64_LEN];
        let len = encode_varint64(300, &mut out);
        assert_eq!(&out[..len], &[0xAC, 0x02]);
    }

    #[test]
    fn truncated_and_overlong_sequences_are_rejected() {
        let err = decode_varint32(&[0x80, 0x80]).expect_err("truncated");
        assert_eq!(err.kind(), ErrorKind::Range);
        let err = decode_varint32(&[0xFF; 6]).expect_err("overlong");
        assert!(err.to_string().contains("exceeds 5 bytes"));
        assert!(decode_varint64(&[0xFF; 11]).is_err());
    }

    #[test]
    fn fifth_byte_high_bits_are_dropped() {
        assert_eq!(decode_varint32(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F]).unwrap(), (u32::MAX, 5));
    }

    proptest! {
        #[test]
        fn u32_round_trip_matches_calculated_length(value in any::<u32>()) {
            let mut out = [0u8; MAX_VARINT64_LEN];
            let len = encode_varint64(u64::from(value), &mut out);
            prop_assert_eq!(len, calculate_varint32(value));
            prop_assert_eq!(decode_varint32(&out[..len]).unwrap(), (value, len));
        }

        #[test]
        fn u64_round_trip_matches_calculated_length(value in any::<u64>()) {
            let mut out = [0u8; MAX_VARINT64_LEN];
            let len = encode_varint64(value, &mut out);
            prop_assert_eq!(len, calculate_varint64(value));
            prop_assert_eq!(decode_varint64(&out[..len]).unwrap(), (value, len));
        }
    }
}
