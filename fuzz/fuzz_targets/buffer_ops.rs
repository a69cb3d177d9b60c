#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use spark_bytebuf::{ByteBuffer, PrependPolicy, BufferConfig};

/// Fuzz 指令：描述一次结构性操作序列。
///
/// - **Why**：切片、压缩、前插扩容都会同时改写存储与游标，组合顺序是缺陷高发区；
/// - **How**：两个缓冲 `a`/`b` 互为追加/前插的源，`Slice` 用结果替换 `b`，从而产生共享存储的别名；
/// - **What**：失败的操作不得改变任何可观察状态；转储长度始终与容量一致。
#[derive(Debug, Arbitrary)]
struct OpsCase {
    strict_prepend: bool,
    ops: Vec<BufferOp>,
}

#[derive(Debug, Arbitrary)]
enum BufferOp {
    Write { bytes: Vec<u8>, at: Option<u8> },
    Flip,
    Clear,
    SetPosition { to: u8 },
    SetBoundary { to: u8 },
    Slice { begin: u8, end: u8, compact: bool },
    Compact,
    Copy,
    Append { len: Option<u8>, at: Option<u8> },
    Prepend { len: Option<u8>, at: Option<u8> },
    Reverse,
    Resize { to: u8 },
    Swap,
}

fn snapshot(buffer: &ByteBuffer) -> (usize, usize, String) {
    (buffer.position(), buffer.boundary(), buffer.to_hex())
}

fuzz_target!(|case: OpsCase| {
    let policy = if case.strict_prepend {
        PrependPolicy::Strict
    } else {
        PrependPolicy::Grow
    };
    let mut a = ByteBuffer::with_config(BufferConfig::with_capacity(4).prepend(policy));
    let mut b = ByteBuffer::wrap(vec![0xAB, 0xCD]);

    for op in case.ops.iter().take(64) {
        let before = snapshot(&a);
        let result = match op {
            BufferOp::Write { bytes, at } => a
                .write_bytes("fuzz", at.map(usize::from), bytes)
                .map(|_| ()),
            BufferOp::Flip => a.flip().map(|_| ()),
            BufferOp::Clear => a.clear().map(|_| ()),
            BufferOp::SetPosition { to } => a.set_position(usize::from(*to)).map(|_| ()),
            BufferOp::SetBoundary { to } => a.set_boundary(usize::from(*to)).map(|_| ()),
            BufferOp::Slice { begin, end, compact } => {
                let (begin, end) = (usize::from(*begin), usize::from(*end));
                let sliced = if *compact {
                    a.slice_and_compact(begin, end)
                } else {
                    a.slice(begin, end)
                };
                sliced.map(|slice| b = slice)
            }
            BufferOp::Compact => a.compact().map(|_| ()),
            BufferOp::Copy => a.copy().map(|copy| b = copy),
            BufferOp::Append { len, at } => match at {
                Some(at) => a.append_at(&b, usize::from(*at), len.map(usize::from)),
                None => a.append(&b, len.map(usize::from)),
            }
            .map(|_| ()),
            BufferOp::Prepend { len, at } => match at {
                Some(at) => a.prepend_at(&b, usize::from(*at), len.map(usize::from)),
                None => a.prepend(&b, len.map(usize::from)),
            }
            .map(|_| ()),
            BufferOp::Reverse => a.reverse().map(|_| ()),
            BufferOp::Resize { to } => a.resize(usize::from(*to)).map(|_| ()),
            BufferOp::Swap => {
                std::mem::swap(&mut a, &mut b);
                Ok(())
            }
        };

        if result.is_err() {
            assert_eq!(snapshot(&a), before, "failed {op:?} mutated the buffer");
        }
        assert_eq!(a.to_hex().len(), a.capacity() * 3 + 1);
        if a.position() <= a.boundary() && a.boundary() <= a.capacity() {
            assert_eq!(a.to_vec().map(|v| v.len()).ok(), Some(a.remaining()));
        }
    }
});
