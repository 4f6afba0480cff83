// crates/pt_foundation/src/error.rs

//! 基础错误类型
//!
//! 定义整个项目共用的错误分类，对应错误处理策略：
//!
//! - 配置错误（相位非法、示踪剂未知、粒子数非正）在配置边界立即报错，
//!   绝不部分生效；
//! - IO / 格式错误在 `load_day` 一级向调用者暴露；
//! - 场查询缺失（出界、陆地、文件缺失）静默降级为 `found = false`，
//!   由引擎决定回退行为，不走错误通道；
//! - 烘焙中的致命错误转为 [`PlumeError::BakeAborted`]，已累积的快照保持可导出。

use std::io;
use thiserror::Error;

/// 统一结果类型别名
pub type PlumeResult<T> = Result<T, PlumeError>;

/// 项目级错误
#[derive(Debug, Error)]
pub enum PlumeError {
    /// 配置非法：在配置边界触发，拒绝部分应用
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// 说明非法原因
        message: String,
    },

    /// 日文件读取失败
    #[error("io error: {message}")]
    Io {
        /// 可读的错误描述
        message: String,
        /// 底层 IO 错误源
        #[source]
        source: Option<io::Error>,
    },

    /// 二进制头版本不支持，或声明的维度与负载长度不一致
    #[error("format error: {message}")]
    Format {
        /// 说明格式问题
        message: String,
    },

    /// 查询坐标落在索引包络之外
    #[error("query outside the indexed grid envelope")]
    GridMiss,

    /// 烘焙过程中的致命错误；部分快照仍然可用
    #[error("bake aborted: {message}")]
    BakeAborted {
        /// 中止原因
        message: String,
    },
}

impl PlumeError {
    /// 创建配置错误
    #[inline]
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// 创建 IO 错误
    #[inline]
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带源的 IO 错误
    #[inline]
    pub fn io_with_source(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 创建格式错误
    #[inline]
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format {
            message: message.into(),
        }
    }

    /// 创建烘焙中止错误
    #[inline]
    pub fn bake_aborted(message: impl Into<String>) -> Self {
        Self::BakeAborted {
            message: message.into(),
        }
    }

    /// 是否属于配置边界错误
    #[inline]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }
}

impl From<io::Error> for PlumeError {
    fn from(err: io::Error) -> Self {
        Self::io_with_source("io operation failed", err)
    }
}

// ============================================================
// 测试
// ============================================================
