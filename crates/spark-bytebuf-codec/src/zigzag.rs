//! Zig-zag 映射：把有符号整数双射到无符号整数，使绝对值小的负数也得到小的编码值。
//!
//! `0 → 0, -1 → 1, 1 → 2, -2 → 3, ...`，对包括 `MIN`/`MAX` 在内的全部输入精确可逆。

/// 32 位 zig-zag 编码。
#[inline]
pub const fn encode32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// 32 位 zig-zag 解码。
#[inline]
pub const fn decode32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// 64 位 zig-zag 编码。
#[inline]
pub const fn encode64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// 64 位 zig-zag 解码。
#[inline]
pub const fn decode64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_mappings() {
        let cases: [(i32, u32); 9] = [
            (0, 0),
            (-1, 1),
            (1, 2),
            (-2, 3),
            (2, 4),
            (-3, 5),
            (3, 6),
            (i32::MAX, 0xFFFF_FFFE),
            (i32::MIN, 0xFFFF_FFFF),
        ];
        for (signed, unsigned) in cases {
            assert_eq!(encode32(signed), unsigned, "encode {signed}");
            assert_eq!(decode32(unsigned), signed, "decode {unsigned}");
        }
    }

    #[test]
    fn wide_extremes() {
        assert_eq!(encode64(i64::MAX), u64::MAX - 1);
        assert_eq!(encode64(i64::MIN), u64::MAX);
        assert_eq!(decode64(u64::MAX), i64::MIN);
    }

    proptest! {
        #[test]
        fn round_trips_every_i32(value in any::<i32>()) {
            prop_assert_eq!(decode32(encode32(value)), value);
        }

        #[test]
        fn round_trips_every_i64(value in any::<i64>()) {
            prop_assert_eq!(decode64(encode64(value)), value);
        }
    }
}
