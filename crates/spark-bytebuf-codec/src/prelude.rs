//! 一次性引入缓冲类型与全部编解码扩展 trait。
//!
//! ```
//! use spark_bytebuf_codec::prelude::*;
//!
//! let mut buffer = ByteBuffer::allocate(2);
//! buffer.write_lstring("ab")?;
//! buffer.flip()?;
//! assert_eq!(buffer.to_hex(), "<02 61 62>00 ");
//! # Ok::<(), BufferError>(())
//! ```

pub use spark_bytebuf::{BufferError, ByteBuffer, ByteOrder, Decoded};

pub use crate::fixed::FixedWidthCodec;
#[cfg(feature = "json")]
pub use crate::json::JsonCodec;
pub use crate::string::StringCodec;
pub use crate::utf8::Utf8Codec;
pub use crate::varint::VarintCodec;
