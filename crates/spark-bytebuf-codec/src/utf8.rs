//! 扩展 UTF-8 码点编解码（1..=6 字节，码点上限 `0x7FFF_FFFF`）。
//!
//! # 设计背景（Why）
//! - 长度前缀字符串把字节长度编码为一个“码点”，长度可能远超 Unicode 上限，
//!   因此需要 RFC 3629 之前的 31 位编码形式，而不能直接使用 `char`；
//! - 对于合法的 Unicode 标量值，本编码与标准 UTF-8 逐字节一致。
//!
//! # 编码表（What）
//! | 码点范围 | 字节数 | 首字节 |
//! |---|---|---|
//! | `0x00..=0x7F` | 1 | `0xxxxxxx` |
//! | `0x80..=0x7FF` | 2 | `110xxxxx` |
//! | `0x800..=0xFFFF` | 3 | `1110xxxx` |
//! | `0x10000..=0x1FFFFF` | 4 | `11110xxx` |
//! | `0x200000..=0x3FFFFFF` | 5 | `111110xx` |
//! | `0x4000000..=0x7FFFFFFF` | 6 | `1111110x` |
//!
//! 不做最短形式校验：冗余的长编码会被接受并解出相同码点。

use spark_bytebuf::{BufferError, ByteBuffer, Decoded, Result};

/// 可编码的最大码点。
pub const MAX_CODEPOINT: u32 = 0x7FFF_FFFF;

/// 单个码点的最大编码长度。
pub const MAX_UTF8_CHAR_LEN: usize = 6;

/// 计算码点的编码字节数；超过 [`MAX_CODEPOINT`] 时返回 `Range`。
pub fn calculate_utf8_char(codepoint: u32) -> Result<usize> {
    calculate_for("calculate_utf8_char", codepoint)
}

fn calculate_for(operation: &'static str, codepoint: u32) -> Result<usize> {
    match codepoint {
        0..=0x7F => Ok(1),
        0x80..=0x7FF => Ok(2),
        0x800..=0xFFFF => Ok(3),
        0x1_0000..=0x1F_FFFF => Ok(4),
        0x20_0000..=0x3FF_FFFF => Ok(5),
        0x400_0000..=MAX_CODEPOINT => Ok(6),
        _ => Err(BufferError::range(
            operation,
            format!("codepoint {codepoint:#X} exceeds {MAX_CODEPOINT:#X}"),
        )),
    }
}

/// 把码点编码进 `out`，返回编码长度。
pub fn encode_codepoint(codepoint: u32, out: &mut [u8; MAX_UTF8_CHAR_LEN]) -> Result<usize> {
    encode_for("encode_utf8_char", codepoint, out)
}

fn encode_for(
    operation: &'static str,
    codepoint: u32,
    out: &mut [u8; MAX_UTF8_CHAR_LEN],
) -> Result<usize> {
    let len = calculate_for(operation, codepoint)?;
    if len == 1 {
        out[0] = codepoint as u8;
        return Ok(1);
    }
    // 首字节前缀：len 个 1 后跟一个 0。
    let prefix = !(0xFFu8 >> len);
    out[0] = prefix | (codepoint >> (6 * (len - 1))) as u8;
    for (index, slot) in out[1..len].iter_mut().enumerate() {
        let shift = 6 * (len - 2 - index);
        *slot = 0x80 | ((codepoint >> shift) & 0x3F) as u8;
    }
    Ok(len)
}

/// 从切片开头解码一个码点，返回 `(码点, 消费字节数)`。
pub fn decode_codepoint(bytes: &[u8]) -> Result<(u32, usize)> {
    decode_for("decode_utf8_char", bytes)
}

pub(crate) fn decode_for(operation: &'static str, bytes: &[u8]) -> Result<(u32, usize)> {
    let Some(&lead) = bytes.first() else {
        return Err(BufferError::range(operation, "truncated utf-8: window is empty"));
    };
    let (len, mut codepoint) = match lead {
        0x00..=0x7F => return Ok((u32::from(lead), 1)),
        0xC0..=0xDF => (2, u32::from(lead & 0x1F)),
        0xE0..=0xEF => (3, u32::from(lead & 0x0F)),
        0xF0..=0xF7 => (4, u32::from(lead & 0x07)),
        0xF8..=0xFB => (5, u32::from(lead & 0x03)),
        0xFC..=0xFD => (6, u32::from(lead & 0x01)),
        _ => {
            return Err(BufferError::range(
                operation,
                format!("malformed utf-8 leading byte {lead:#04X}"),
            ));
        }
    };
    let Some(tail) = bytes.get(1..len) else {
        return Err(BufferError::range(
            operation,
            format!("truncated utf-8: needs {len} bytes, window holds {}", bytes.len()),
        ));
    };
    for &byte in tail {
        if byte & 0xC0 != 0x80 {
            return Err(BufferError::range(
                operation,
                format!("malformed utf-8 continuation byte {byte:#04X}"),
            ));
        }
        codepoint = (codepoint << 6) | u32::from(byte & 0x3F);
    }
    Ok((codepoint, len))
}

/// 把码点写入缓冲：偏移为 `None` 时写到 `position` 并推进，否则写到显式偏移。
pub fn encode_utf8_char(
    codepoint: u32,
    buffer: &mut ByteBuffer,
    offset: Option<usize>,
) -> Result<usize> {
    let mut scratch = [0u8; MAX_UTF8_CHAR_LEN];
    let len = encode_for("encode_utf8_char", codepoint, &mut scratch)?;
    buffer.write_bytes("encode_utf8_char", offset, &scratch[..len])
}

/// 从缓冲解码一个码点：偏移为 `None` 时从窗口读取并推进，否则从显式偏移读取。
pub fn decode_utf8_char(buffer: &mut ByteBuffer, offset: Option<usize>) -> Result<Decoded<u32>> {
    buffer.decode_with("decode_utf8_char", offset, |bytes| {
        decode_for("decode_utf8_char", bytes)
    })
}

/// 码点编解码的方法形式。
pub trait Utf8Codec {
    /// 在 `position` 处写入码点并推进游标，返回编码长度。
    fn write_utf8_char(&mut self, codepoint: u32) -> Result<usize>;
    /// 在显式偏移处写入码点。
    fn write_utf8_char_at(&mut self, offset: usize, codepoint: u32) -> Result<usize>;
    /// 从窗口读取一个码点并推进游标。
    fn read_utf8_char(&mut self) -> Result<Decoded<u32>>;
    /// 在显式偏移处读取一个码点。
    fn read_utf8_char_at(&mut self, offset: usize) -> Result<Decoded<u32>>;
}

impl Utf8Codec for ByteBuffer {
    fn write_utf8_char(&mut self, codepoint: u32) -> Result<usize> {
        encode_utf8_char(codepoint, self, None)
    }

    fn write_utf8_char_at(&mut self, offset: usize, codepoint: u32) -> Result<usize> {
        encode_utf8_char(codepoint, self, Some(offset))
    }

    fn read_utf8_char(&mut self) -> Result<Decoded<u32>> {
        decode_utf8_char(self, None)
    }

    fn read_utf8_char_at(&mut self, offset: usize) -> Result<Decoded<u32>> {
        decode_utf8_char(self, Some(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use spark_bytebuf::ErrorKind;

    fn encode(codepoint: u32) -> Vec<u8> {
        let mut out = [0u8; MAX_UTF8_CHAR_LEN];
        let len = encode_codepoint(codepoint, &mut out).expect("encodable");
        out[..len].to_vec()
    }

    #[test]
    fn boundary_codepoints_use_expected_prefixes() {
        assert_eq!(encode(0x7F), vec![0x7F]);
        assert_eq!(encode(0x80), vec![0xC2, 0x80]);
        assert_eq!(encode(0xFFFF), vec![0xEF, 0xBF, 0xBF]);
        assert_eq!(encode(0x10_FFFF), vec![0xF4, 0x8F, 0xBF, 0xBF]);
        assert_eq!(encode(0x20_0000), vec![0xF8, 0x88, 0x80, 0x80, 0x80]);
        assert_eq!(encode(MAX_CODEPOINT), vec![0xFD, 0xBF, 0xBF, 0xBF, 0xBF, 0xBF]);
    }

    #[test]
    fn out_of_range_codepoints_fail() {
        for codepoint in [0x8000_0000, u32::MAX] {
            let err = calculate_utf8_char(codepoint).expect_err("beyond 31 bits");
            assert_eq!(err.kind(), ErrorKind::Range);
        }
    }

    #[test]
    fn malformed_sequences_fail() {
        assert!(decode_codepoint(&[0xFE, 0, 0, 0, 0, 0]).is_err());
        assert!(decode_codepoint(&[0xFF]).is_err());
        assert!(decode_codepoint(&[0x80]).is_err());
        assert!(decode_codepoint(&[0xC2, 0x41]).is_err());
        assert!(decode_codepoint(&[0xE2, 0x82]).is_err());
        assert!(decode_codepoint(&[]).is_err());
    }

    proptest! {
        #[test]
        fn scalar_values_match_std_utf8(c in any::<char>()) {
            let mut std_buf = [0u8; 4];
            let expected = c.encode_utf8(&mut std_buf).as_bytes();
            prop_assert_eq!(encode(c as u32), expected.to_vec());
            prop_assert_eq!(decode_codepoint(expected).unwrap(), (c as u32, expected.len()));
        }

        #[test]
        fn every_31_bit_codepoint_round_trips(codepoint in 0u32..=MAX_CODEPOINT) {
            let bytes = encode(codepoint);
            prop_assert_eq!(bytes.len(), calculate_utf8_char(codepoint).unwrap());
            prop_assert_eq!(decode_codepoint(&bytes).unwrap(), (codepoint, bytes.len()));
        }
    }
}
