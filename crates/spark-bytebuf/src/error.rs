//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 为缓冲核心与编解码层提供统一的错误域，调用方只需匹配一种错误类型即可覆盖越界、截断、
//!   非法编码以及“已销毁实例”等全部失败路径；
//! - 延续 `<域>.<语义>` 的稳定错误码约定，便于日志与告警按错误码聚合。
//!
//! ## 设计要求（What）
//! - 所有错误类型派生 `thiserror::Error` 以兼容 `std::error::Error`；
//! - 失败一律同步返回给直接调用方，内部不做任何重试；
//! - 返回错误时缓冲状态保持不变（全有或全无），调用方可以放心重试或改走其它分支。

use std::borrow::Cow;

use thiserror::Error;

/// 稳定错误码常量。
///
/// - **意图 (Why)**：错误码用于机读聚合，必须与 `Display` 文案解耦，文案调整不应影响告警规则；
/// - **契约 (What)**：码值遵循 `<域>.<语义>`，一经发布不得改名。
pub mod codes {
    /// 读写越出有效窗口、变长序列截断或格式非法、请求长度超出源缓冲可读字节。
    pub const BUFFER_RANGE: &str = "buffer.range";
    /// 在已销毁的缓冲上执行操作。
    pub const BUFFER_ILLEGAL_STATE: &str = "buffer.illegal_state";
}

/// 错误大类，供调用方在不关心细节文案时做分支判断。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// 越界、截断或编码非法。
    Range,
    /// 实例已被 [`destroy`](crate::ByteBuffer::destroy)。
    IllegalState,
}

/// 缓冲核心与编解码层共享的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：区分“参数/数据不合法”（`Range`）与“对象生命周期已结束”（`IllegalState`）两类故障，
///   前者通常是调用方或对端数据的问题，后者则是调用方的使用顺序错误；
/// - **契约 (What)**：
///   - `operation` 为触发失败的操作名（如 `"read_varint32"`），始终为静态字符串；
///   - `detail` 为面向排障人员的描述，可能携带偏移、长度等上下文；
///   - 所有变体均满足 `Send + Sync + 'static`，可安全跨线程传播。
/// - **设计权衡 (Trade-offs)**：`detail` 使用 `Cow<'static, str>`，常见路径零分配，需要拼接上下文时才分配。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BufferError {
    /// 越界访问、变长/UTF-8 序列截断或非法、长度超出可用字节。
    #[error("{operation}: {detail}")]
    Range {
        /// 触发失败的操作名。
        operation: &'static str,
        /// 人类可读的失败描述。
        detail: Cow<'static, str>,
    },

    /// 在已销毁的实例上执行操作。
    #[error("{operation}: buffer has been destroyed")]
    IllegalState {
        /// 触发失败的操作名。
        operation: &'static str,
    },
}

impl BufferError {
    /// 构造 `Range` 错误。
    pub fn range(operation: &'static str, detail: impl Into<Cow<'static, str>>) -> Self {
        BufferError::Range {
            operation,
            detail: detail.into(),
        }
    }

    /// 构造 `IllegalState` 错误。
    pub fn destroyed(operation: &'static str) -> Self {
        BufferError::IllegalState { operation }
    }

    /// 返回错误大类。
    pub fn kind(&self) -> ErrorKind {
        match self {
            BufferError::Range { .. } => ErrorKind::Range,
            BufferError::IllegalState { .. } => ErrorKind::IllegalState,
        }
    }

    /// 返回稳定错误码，参见 [`codes`]。
    pub fn code(&self) -> &'static str {
        match self {
            BufferError::Range { .. } => codes::BUFFER_RANGE,
            BufferError::IllegalState { .. } => codes::BUFFER_ILLEGAL_STATE,
        }
    }

    /// 返回触发失败的操作名。
    pub fn operation(&self) -> &'static str {
        match self {
            BufferError::Range { operation, .. } | BufferError::IllegalState { operation } => {
                operation
            }
        }
    }
}

/// 缓冲相关操作的统一返回类型。
pub type Result<T, E = BufferError> = core::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_error_kind() {
        let range = BufferError::range("read_u8", "offset 4 exceeds window end 3");
        assert_eq!(range.kind(), ErrorKind::Range);
        assert_eq!(range.code(), codes::BUFFER_RANGE);
        assert_eq!(range.operation(), "read_u8");
        assert_eq!(range.to_string(), "read_u8: offset 4 exceeds window end 3");

        let destroyed = BufferError::destroyed("flip");
        assert_eq!(destroyed.kind(), ErrorKind::IllegalState);
        assert_eq!(destroyed.code(), codes::BUFFER_ILLEGAL_STATE);
        assert_eq!(destroyed.to_string(), "flip: buffer has been destroyed");
    }
}
