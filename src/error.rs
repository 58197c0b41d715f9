//! 统一错误处理 - 表操作可能报告的所有错误类型

/// 哈希表及其组件可能发生的错误
///
/// 键不存在不算错误：查找和删除返回 `None`。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HashTableError {
    #[error("无效的键: {reason}")]
    InvalidKey { reason: String },

    #[error("无效的容量 {capacity}: {reason}")]
    InvalidCapacity { capacity: usize, reason: String },

    #[error("表已满 (容量: {capacity}, 当前大小: {size})")]
    CapacityExceeded { capacity: usize, size: usize },

    #[error("无效的调整目标 {target} (容量: {capacity}, 当前大小: {size})")]
    InvalidResizeTarget {
        target: usize,
        capacity: usize,
        size: usize,
    },

    #[error("无效的参数 {value}: {reason}")]
    InvalidArgument { value: usize, reason: &'static str },

    #[error("无效的配置: {reason}")]
    InvalidConfig { reason: String },
}

impl HashTableError {
    /// 错误恢复建议
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::InvalidKey { .. } => Some("使用非空字符串或有限正数作为键"),
            Self::InvalidCapacity { .. } => Some("使用不小于 7 的素数容量"),
            Self::InvalidConfig { .. } => Some("检查负载因子上下限和初始容量"),
            Self::InvalidArgument { .. } => Some("检查参数是否在文档规定的范围内"),
            Self::CapacityExceeded { .. } | Self::InvalidResizeTarget { .. } => None,
        }
    }

    /// 是否为调整策略的内部缺陷（而非输入错误）
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::CapacityExceeded { .. } | Self::InvalidResizeTarget { .. }
        )
    }
}

pub type Result<T, E = HashTableError> = std::result::Result<T, E>;
