#![warn(missing_docs)]

//! `spark-bytebuf` 提供带 `position`/`boundary` 双游标模型的可增长字节缓冲。
//!
//! # 模块定位（Why）
//! - 协议编解码需要一个“先写后翻转再读”的连续字节区域，并在需要时零拷贝地切出子视图；
//! - 本 crate 只负责存储、游标与结构性操作，数值与字符串编码由 `spark-bytebuf-codec`
//!   以扩展 trait 的形式叠加在 [`ByteBuffer`] 之上。
//!
//! # 设计概要（How）
//! - [`SharedStorage`] 是引用计数的定长区域，`slice`/`clone` 产生的视图共享同一区域；
//! - [`ByteBuffer`] 持有存储句柄、两个游标与构造期 [`BufferConfig`]；
//! - 读写原语 [`ByteBuffer::write_bytes`]、[`ByteBuffer::read_bytes`]、[`ByteBuffer::decode_with`]
//!   统一处理“隐式偏移推进游标、显式偏移不动游标”的约定，编解码层无需重复实现；
//! - 失败统一以 [`BufferError`] 返回，并保证缓冲状态不被部分修改。
//!
//! # 快速上手
//! ```
//! use spark_bytebuf::ByteBuffer;
//!
//! let mut buffer = ByteBuffer::allocate(2);
//! buffer.write_bytes("example", None, b"abc")?;
//! assert_eq!(buffer.capacity(), 4);
//! buffer.flip()?;
//! assert_eq!(buffer.to_vec()?, b"abc");
//! # Ok::<(), spark_bytebuf::BufferError>(())
//! ```

mod byte_buffer;
mod config;
mod dump;
mod error;
mod storage;

pub use byte_buffer::{ByteBuffer, Decoded};
pub use config::{BufferConfig, ByteOrder, DEFAULT_CAPACITY, PrependPolicy};
pub use dump::DESTROYED_SENTINEL;
pub use error::{BufferError, ErrorKind, Result, codes};
pub use storage::SharedStorage;
