//! 操作统计 - 记录表操作次数

use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::OperationType;

const OPERATION_TYPES: [OperationType; 6] = [
    OperationType::Insert,
    OperationType::Update,
    OperationType::Get,
    OperationType::Remove,
    OperationType::Expand,
    OperationType::Shrink,
];

/// 操作统计接口
pub trait OperationRecorder: Send + Sync {
    /// 记录一次操作；查找或删除未命中时 `success` 为 false
    fn record(&self, op_type: OperationType, success: bool);

    /// 记录一次重新哈希移动的条目数
    fn record_rehash(&self, entries: usize);

    fn snapshot(&self) -> OperationStatsSnapshot;

    fn reset(&self);

    /// 导出Prometheus格式指标
    fn export_prometheus(&self) -> String;
}

/// 操作统计快照
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OperationStatsSnapshot {
    pub insert_count: u64,
    pub update_count: u64,
    pub get_count: u64,
    pub remove_count: u64,
    pub expand_count: u64,
    pub shrink_count: u64,
    pub miss_count: u64,
    pub rehashed_entries: u64,
}

impl OperationStatsSnapshot {
    pub fn count(&self, op_type: OperationType) -> u64 {
        match op_type {
            OperationType::Insert => self.insert_count,
            OperationType::Update => self.update_count,
            OperationType::Get => self.get_count,
            OperationType::Remove => self.remove_count,
            OperationType::Expand => self.expand_count,
            OperationType::Shrink => self.shrink_count,
        }
    }

    pub fn resize_count(&self) -> u64 {
        self.expand_count + self.shrink_count
    }
}

/// 宽松原子计数器，读者共享的表仍是 `Sync`
#[derive(Debug, Default)]
pub struct AtomicOperationStats {
    insert_count: AtomicU64,
    update_count: AtomicU64,
    get_count: AtomicU64,
    remove_count: AtomicU64,
    expand_count: AtomicU64,
    shrink_count: AtomicU64,
    miss_count: AtomicU64,
    rehashed_entries: AtomicU64,
}

impl AtomicOperationStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn counter(&self, op_type: OperationType) -> &AtomicU64 {
        match op_type {
            OperationType::Insert => &self.insert_count,
            OperationType::Update => &self.update_count,
            OperationType::Get => &self.get_count,
            OperationType::Remove => &self.remove_count,
            OperationType::Expand => &self.expand_count,
            OperationType::Shrink => &self.shrink_count,
        }
    }
}

impl OperationRecorder for AtomicOperationStats {
    fn record(&self, op_type: OperationType, success: bool) {
        self.counter(op_type).fetch_add(1, Ordering::Relaxed);
        if !success {
            self.miss_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_rehash(&self, entries: usize) {
        self.rehashed_entries
            .fetch_add(entries as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot {
            insert_count: self.insert_count.load(Ordering::Relaxed),
            update_count: self.update_count.load(Ordering::Relaxed),
            get_count: self.get_count.load(Ordering::Relaxed),
            remove_count: self.remove_count.load(Ordering::Relaxed),
            expand_count: self.expand_count.load(Ordering::Relaxed),
            shrink_count: self.shrink_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
            rehashed_entries: self.rehashed_entries.load(Ordering::Relaxed),
        }
    }

    fn reset(&self) {
        for op in OPERATION_TYPES {
            self.counter(op).store(0, Ordering::Relaxed);
        }
        self.miss_count.store(0, Ordering::Relaxed);
        self.rehashed_entries.store(0, Ordering::Relaxed);
    }

    fn export_prometheus(&self) -> String {
        let mut output = String::new();

        for op in OPERATION_TYPES {
            let count = self.counter(op).load(Ordering::Relaxed);
            output.push_str(&format!(
                "# HELP hashtable_operation_{}_count Total {} operations\n",
                op.as_str(),
                op.as_str()
            ));
            output.push_str(&format!(
                "# TYPE hashtable_operation_{}_count counter\n",
                op.as_str()
            ));
            output.push_str(&format!(
                "hashtable_operation_{}_count {}\n",
                op.as_str(),
                count
            ));
        }

        output.push_str("# HELP hashtable_operation_miss_count Lookups and removals of absent keys\n");
        output.push_str("# TYPE hashtable_operation_miss_count counter\n");
        output.push_str(&format!(
            "hashtable_operation_miss_count {}\n",
            self.miss_count.load(Ordering::Relaxed)
        ));

        output.push_str("# HELP hashtable_rehashed_entries Entries moved by resizes\n");
        output.push_str("# TYPE hashtable_rehashed_entries counter\n");
        output.push_str(&format!(
            "hashtable_rehashed_entries {}\n",
            self.rehashed_entries.load(Ordering::Relaxed)
        ));

        output
    }
}

/// 丢弃所有记录的统计器
#[derive(Debug, Default)]
pub struct DisabledOperationRecorder;

impl OperationRecorder for DisabledOperationRecorder {
    fn record(&self, _op_type: OperationType, _success: bool) {}
    fn record_rehash(&self, _entries: usize) {}
    fn snapshot(&self) -> OperationStatsSnapshot {
        OperationStatsSnapshot::default()
    }
    fn reset(&self) {}
    fn export_prometheus(&self) -> String {
        String::new()
    }
}
