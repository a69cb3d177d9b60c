//! 定宽整数与浮点编解码。
//!
//! # 设计背景（Why）
//! - 十种原始类型的读写除宽度与字节序外完全一致，集中到一个泛型读写路径后由宏展开公开方法，
//!   避免逐类型手写四十个几乎相同的函数；
//! - 字节序取自缓冲的构造期配置，同一实例上的所有定宽读写统一生效。
//!
//! # 契约说明（What）
//! - 写入前先确保容量容纳完整宽度，因此定宽写入永远不会只写一部分；
//! - 读取在窗口内放不下完整宽度时返回 `Range`，游标不动；
//! - 有符号/无符号之间按二进制补码重新解释：以 `u32` 写入 `0xFFFF_FFFF` 再以 `i32` 读出得到 `-1`。

use spark_bytebuf::{ByteBuffer, ByteOrder, Result};

/// 可以按固定宽度编码的原始类型。
trait Primitive: Sized + Copy {
    type Raw: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn to_raw(self, order: ByteOrder) -> Self::Raw;
    fn from_raw(raw: Self::Raw, order: ByteOrder) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                type Raw = [u8; core::mem::size_of::<$ty>()];

                #[inline]
                fn to_raw(self, order: ByteOrder) -> Self::Raw {
                    match order {
                        ByteOrder::BigEndian => self.to_be_bytes(),
                        ByteOrder::LittleEndian => self.to_le_bytes(),
                    }
                }

                #[inline]
                fn from_raw(raw: Self::Raw, order: ByteOrder) -> Self {
                    match order {
                        ByteOrder::BigEndian => <$ty>::from_be_bytes(raw),
                        ByteOrder::LittleEndian => <$ty>::from_le_bytes(raw),
                    }
                }
            }
        )*
    };
}

impl_primitive!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

fn put<T: Primitive>(
    buffer: &mut ByteBuffer,
    operation: &'static str,
    offset: Option<usize>,
    value: T,
) -> Result<()> {
    let raw = value.to_raw(buffer.order());
    buffer.write_bytes(operation, offset, raw.as_ref())?;
    Ok(())
}

fn get<T: Primitive>(
    buffer: &mut ByteBuffer,
    operation: &'static str,
    offset: Option<usize>,
) -> Result<T> {
    let order = buffer.order();
    let mut raw = T::Raw::default();
    buffer.read_bytes(operation, offset, raw.as_mut())?;
    Ok(T::from_raw(raw, order))
}

macro_rules! fixed_width_codec {
    ($($ty:ty => $write:ident, $write_at:ident, $read:ident, $read_at:ident;)*) => {
        /// 定宽数值编解码，作为扩展 trait 挂在 [`ByteBuffer`] 上。
        ///
        /// 写入方法返回 `&mut Self` 以便链式调用；不带 `_at` 后缀的方法使用并推进 `position`，
        /// `_at` 形式使用显式偏移且不移动游标。
        pub trait FixedWidthCodec {
            $(
                #[doc = concat!("在 `position` 处写入 `", stringify!($ty), "` 并推进游标。")]
                fn $write(&mut self, value: $ty) -> Result<&mut Self>;
                #[doc = concat!("在显式偏移处写入 `", stringify!($ty), "`。")]
                fn $write_at(&mut self, offset: usize, value: $ty) -> Result<&mut Self>;
                #[doc = concat!("从窗口读取 `", stringify!($ty), "` 并推进游标。")]
                fn $read(&mut self) -> Result<$ty>;
                #[doc = concat!("在显式偏移处读取 `", stringify!($ty), "`。")]
                fn $read_at(&mut self, offset: usize) -> Result<$ty>;
            )*
        }

        impl FixedWidthCodec for ByteBuffer {
            $(
                fn $write(&mut self, value: $ty) -> Result<&mut Self> {
                    put(self, stringify!($write), None, value)?;
                    Ok(self)
                }

                fn $write_at(&mut self, offset: usize, value: $ty) -> Result<&mut Self> {
                    put(self, stringify!($write), Some(offset), value)?;
                    Ok(self)
                }

                fn $read(&mut self) -> Result<$ty> {
                    get(self, stringify!($read), None)
                }

                fn $read_at(&mut self, offset: usize) -> Result<$ty> {
                    get(self, stringify!($read), Some(offset))
                }
            )*
        }
    };
}

fixed_width_codec! {
    u8 => write_u8, write_u8_at, read_u8, read_u8_at;
    i8 => write_i8, write_i8_at, read_i8, read_i8_at;
    u16 => write_u16, write_u16_at, read_u16, read_u16_at;
    i16 => write_i16, write_i16_at, read_i16, read_i16_at;
    u32 => write_u32, write_u32_at, read_u32, read_u32_at;
    i32 => write_i32, write_i32_at, read_i32, read_i32_at;
    u64 => write_u64, write_u64_at, read_u64, read_u64_at;
    i64 => write_i64, write_i64_at, read_i64, read_i64_at;
    f32 => write_f32, write_f32_at, read_f32, read_f32_at;
    f64 => write_f64, write_f64_at, read_f64, read_f64_at;
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_bytebuf::{BufferConfig, ErrorKind};

    #[test]
    fn big_endian_is_the_default_layout() {
        let mut buffer = ByteBuffer::allocate(4);
        buffer.write_u32(0x1234_5678).unwrap();
        assert_eq!(buffer.to_hex(), ">12 34 56 78<");
    }

    #[test]
    fn little_endian_applies_to_every_width() {
        let mut buffer = ByteBuffer::with_config(
            BufferConfig::with_capacity(6).order(ByteOrder::LittleEndian),
        );
        buffer.write_u16(0x1234).unwrap().write_u32(0xAABB_CCDD).unwrap();
        assert_eq!(
            buffer.to_vec().unwrap(),
            vec![0x34, 0x12, 0xDD, 0xCC, 0xBB, 0xAA]
        );
        buffer.flip().unwrap();
        assert_eq!(buffer.read_u16().unwrap(), 0x1234);
        assert_eq!(buffer.read_u32().unwrap(), 0xAABB_CCDD);
    }

    #[test]
    fn explicit_offsets_leave_cursors_alone() {
        let mut buffer = ByteBuffer::allocate(8);
        buffer.write_i64_at(0, -2).unwrap();
        assert_eq!((buffer.position(), buffer.boundary()), (0, 0));
        assert_eq!(buffer.read_i64_at(0).unwrap(), -2);
        assert_eq!(buffer.read_u8_at(7).unwrap(), 0xFE);
    }

    #[test]
    fn short_window_fails_without_consuming() {
        let mut buffer = ByteBuffer::wrap(vec![0x01, 0x02, 0x03]);
        let err = buffer.read_u32().expect_err("three bytes only");
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(err.operation(), "read_u32");
        assert_eq!(buffer.position(), 0);
        assert_eq!(buffer.read_u16().unwrap(), 0x0102);
    }
}
