//! `codec_contract` 集成测试：以公开 API 驱动“写入 → 翻转 → 读回”的完整流程。
//!
//! # 测试总览（Why）
//! - 锁定定宽数值的补码重解释、varint 与 UTF-8 的逐字节格式；
//! - 校验三种长度约定字符串在隐式/显式偏移下的游标行为与十六进制转储；
//! - 覆盖已销毁实例上的编解码调用一律返回 `IllegalState`。

use spark_bytebuf::{ErrorKind, codes};
use spark_bytebuf_codec::prelude::*;
use spark_bytebuf_codec::{
    calculate_utf8_char, calculate_varint32, decode_utf8_char, encode_utf8_char,
};

#[test]
fn signed_reads_reinterpret_unsigned_writes() {
    let mut buffer = ByteBuffer::allocate(1);
    buffer.write_u8(0xFF).unwrap();
    buffer.flip().unwrap();
    assert_eq!(buffer.read_i8().unwrap(), -1);

    let mut buffer = ByteBuffer::allocate(2);
    buffer.write_u16(0xFFFF).unwrap();
    buffer.flip().unwrap();
    assert_eq!(buffer.read_i16().unwrap(), -1);

    let mut buffer = ByteBuffer::allocate(4);
    buffer.write_u32(0xFFFF_FFFF).unwrap();
    buffer.flip().unwrap();
    assert_eq!(buffer.read_i32().unwrap(), -1);
}

#[test]
fn u32_flip_round_trip_moves_cursors() {
    let mut buffer = ByteBuffer::allocate(4);
    buffer.write_u32(0x1234_5678).unwrap();
    assert_eq!((buffer.position(), buffer.boundary()), (4, 0));
    buffer.flip().unwrap();
    assert_eq!((buffer.position(), buffer.boundary()), (0, 4));
    assert_eq!(buffer.read_u32().unwrap(), 0x1234_5678);
    assert_eq!(buffer.position(), 4);
}

#[test]
fn floats_keep_their_precision() {
    let mut buffer = ByteBuffer::allocate(4);
    buffer.write_f32(0.5).unwrap();
    buffer.flip().unwrap();
    assert_eq!(buffer.read_f32().unwrap(), 0.5);

    let mut buffer = ByteBuffer::allocate(8);
    buffer.write_f64(0.1).unwrap();
    buffer.flip().unwrap();
    assert_eq!(buffer.read_f64().unwrap(), 0.1);
}

#[test]
fn sixty_four_bit_integers_are_exact() {
    let mut buffer = ByteBuffer::allocate(8);
    for value in [(1i64 << 53) - 1, (1i64 << 53) + 1, i64::MIN, i64::MAX] {
        buffer.clear().unwrap();
        buffer.write_i64(value).unwrap();
        buffer.flip().unwrap();
        assert_eq!(buffer.read_i64().unwrap(), value);
    }
    buffer.write_u64_at(0, u64::MAX).unwrap();
    assert_eq!(buffer.read_u64_at(0).unwrap(), u64::MAX);
}

#[test]
fn varint32_values_at_fixed_offset() {
    let cases: [(u32, i32); 5] = [
        (1, 1),
        (300, 300),
        (0x7FFF_FFFF, 0x7FFF_FFFF),
        (0xFFFF_FFFF, -1),
        (0x8000_0000, i32::MIN),
    ];
    let mut buffer = ByteBuffer::allocate(10);
    for (value, signed) in cases {
        let written = buffer.write_varint32_at(0, value).unwrap();
        let decoded = buffer.read_varint32_at(0).unwrap();
        assert_eq!(decoded.value, value);
        assert_eq!(decoded.value as i32, signed);
        assert_eq!(decoded.length, written);
        assert_eq!(written, calculate_varint32(value));
    }
    assert_eq!((buffer.position(), buffer.boundary()), (0, 0));
}

#[test]
fn varint_reads_are_bounded_by_the_window() {
    let mut buffer = ByteBuffer::allocate(4);
    buffer.write_varint32(300).unwrap();
    buffer.flip().unwrap();
    buffer.set_boundary(1).unwrap();
    let err = buffer.read_varint32().expect_err("window cuts the varint");
    assert_eq!(err.code(), codes::BUFFER_RANGE);
    assert_eq!(buffer.position(), 0);
}

#[test]
fn zigzag_varints_keep_small_negatives_short() {
    let mut buffer = ByteBuffer::allocate(0);
    assert_eq!(buffer.write_zigzag_varint32(-1).unwrap(), 1);
    assert_eq!(buffer.write_zigzag_varint64(i64::MIN).unwrap(), 10);
    buffer.flip().unwrap();
    assert_eq!(buffer.read_zigzag_varint32().unwrap().value, -1);
    assert_eq!(buffer.read_zigzag_varint64().unwrap().value, i64::MIN);
    assert_eq!(buffer.remaining(), 0);
}

#[test]
fn utf8_chars_round_trip_at_offset_zero() {
    let chars = [
        0x00, 0x7F, 0x80, 0x7FF, 0x800, 0xFFFF, 0x1_0000, 0x1F_FFFF, 0x20_0000, 0x3FF_FFFF,
        0x400_0000, 0x7FFF_FFFF,
    ];
    let mut buffer = ByteBuffer::allocate(6);
    for codepoint in chars {
        let written = encode_utf8_char(codepoint, &mut buffer, Some(0)).unwrap();
        let decoded = decode_utf8_char(&mut buffer, Some(0)).unwrap();
        assert_eq!(decoded.value, codepoint);
        assert_eq!(decoded.length, written);
        assert_eq!(decoded.length, calculate_utf8_char(codepoint).unwrap());
    }
    assert_eq!(buffer.position(), 0);
}

#[test]
fn utf8_rejects_out_of_range_and_malformed_input() {
    let mut buffer = ByteBuffer::allocate(6);
    for codepoint in [-1i32 as u32, 0x8000_0000] {
        let err = encode_utf8_char(codepoint, &mut buffer, Some(0)).expect_err("beyond 31 bits");
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    buffer.clear().unwrap();
    buffer.write_u8(0xFE).unwrap();
    for _ in 0..5 {
        buffer.write_u8(0).unwrap();
    }
    buffer.flip().unwrap();
    assert!(decode_utf8_char(&mut buffer, Some(0)).is_err());
    assert!(buffer.read_utf8_char().is_err());
    assert_eq!(buffer.position(), 0);
}

#[test]
fn lstring_grows_and_reads_back() {
    let mut buffer = ByteBuffer::allocate(2);
    assert_eq!(buffer.write_lstring("ab").unwrap(), 3);
    assert_eq!(buffer.capacity(), 4);
    assert_eq!((buffer.position(), buffer.boundary()), (3, 0));
    buffer.flip().unwrap();
    assert_eq!(buffer.to_hex(), "<02 61 62>00 ");

    assert_eq!(buffer.read_lstring_at(0).unwrap(), Decoded::new("ab".to_owned(), 3));
    assert_eq!(buffer.to_hex(), "<02 61 62>00 ");
    assert_eq!(buffer.read_lstring().unwrap().value, "ab");
    assert_eq!(buffer.to_hex(), " 02 61 62|00 ");
}

#[test]
fn vstring_grows_and_reads_back() {
    let mut buffer = ByteBuffer::allocate(2);
    assert_eq!(buffer.write_vstring("ab").unwrap(), 3);
    assert_eq!(buffer.capacity(), 4);
    assert_eq!(buffer.position(), 3);
    buffer.flip().unwrap();
    assert_eq!(buffer.to_hex(), "<02 61 62>00 ");

    assert_eq!(buffer.read_vstring_at(0).unwrap(), Decoded::new("ab".to_owned(), 3));
    assert_eq!(buffer.to_hex(), "<02 61 62>00 ");
    // 短字符串的两种长度前缀逐字节相同。
    assert_eq!(buffer.read_lstring().unwrap().value, "ab");
    assert_eq!(buffer.to_hex(), " 02 61 62|00 ");
}

#[test]
fn cstring_grows_and_reads_back() {
    let mut buffer = ByteBuffer::allocate(2);
    assert_eq!(buffer.write_cstring("ab").unwrap(), 3);
    assert_eq!(buffer.capacity(), 4);
    assert_eq!((buffer.position(), buffer.boundary()), (3, 0));
    buffer.flip().unwrap();
    assert_eq!(buffer.to_hex(), "<61 62 00>00 ");

    assert_eq!(buffer.read_cstring_at(0).unwrap(), Decoded::new("ab".to_owned(), 3));
    assert_eq!(buffer.to_hex(), "<61 62 00>00 ");
    assert_eq!(buffer.read_cstring().unwrap().value, "ab");
    assert_eq!(buffer.to_hex(), " 61 62 00|00 ");
}

#[test]
fn wrapped_text_reads_as_raw_utf8() {
    let mut buffer = ByteBuffer::wrap_str("test");
    assert_eq!((buffer.position(), buffer.boundary()), (0, 4));
    assert_eq!(buffer.read_utf8_string(4).unwrap().value, "test");
}

#[test]
fn mixed_record_round_trip() {
    let mut buffer = ByteBuffer::new();
    buffer.write_u16(7).unwrap();
    buffer.write_vstring("héllo").unwrap();
    buffer.write_varint64(1 << 40).unwrap();
    buffer.write_cstring("end").unwrap();
    buffer.flip().unwrap();

    assert_eq!(buffer.read_u16().unwrap(), 7);
    assert_eq!(buffer.read_vstring().unwrap().value, "héllo");
    assert_eq!(buffer.read_varint64().unwrap().value, 1 << 40);
    assert_eq!(buffer.read_cstring().unwrap().value, "end");
    assert_eq!(buffer.remaining(), 0);
}

#[test]
fn destroyed_buffers_reject_codec_calls() {
    let mut buffer = ByteBuffer::allocate(4);
    buffer.write_u32(1).unwrap();
    buffer.destroy();
    let err = buffer.write_u8(1).expect_err("destroyed");
    assert_eq!(err.kind(), ErrorKind::IllegalState);
    assert_eq!(err.code(), codes::BUFFER_ILLEGAL_STATE);
    assert!(buffer.read_u32_at(0).is_err());
    assert!(buffer.read_varint32().is_err());
    assert!(buffer.write_lstring("x").is_err());
    assert!(encode_utf8_char(0x41, &mut buffer, None).is_err());
    assert_eq!(buffer.to_hex(), "DESTROYED");
}

#[cfg(feature = "json")]
#[test]
fn json_round_trip() {
    use std::collections::BTreeMap;

    let mut buffer = ByteBuffer::new();
    let data = BTreeMap::from([("x".to_owned(), 1)]);
    buffer.write_json(&data).unwrap();
    buffer.flip().unwrap();
    let decoded: Decoded<BTreeMap<String, i32>> = buffer.read_json().unwrap();
    assert_eq!(decoded.value, data);
}
