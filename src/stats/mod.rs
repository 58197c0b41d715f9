//! 统计模块 - 操作计数和表结构快照

pub mod operation;

pub use operation::{
    AtomicOperationStats, DisabledOperationRecorder, OperationRecorder, OperationStatsSnapshot,
};

/// 表的时间点视图
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TableStats {
    pub size: usize,
    pub capacity: usize,
    pub load_factor: f64,
    /// 已创建且当前持有条目的桶数
    pub occupied_buckets: usize,
    pub longest_chain: usize,
    pub operations: OperationStatsSnapshot,
}

impl TableStats {
    /// 非空桶的平均链长
    pub fn average_chain_length(&self) -> f64 {
        if self.occupied_buckets == 0 {
            0.0
        } else {
            self.size as f64 / self.occupied_buckets as f64
        }
    }

    /// 导出Prometheus格式指标：先结构指标，再操作计数
    pub fn export_prometheus(&self, operations: &dyn OperationRecorder) -> String {
        let mut output = String::new();
        for (name, help, value) in [
            ("size", "Entries in the table", self.size as f64),
            ("capacity", "Bucket count", self.capacity as f64),
            ("load_factor", "Entries per bucket", self.load_factor),
            ("occupied_buckets", "Buckets holding entries", self.occupied_buckets as f64),
            ("longest_chain", "Longest collision chain", self.longest_chain as f64),
        ] {
            output.push_str(&format!("# HELP hashtable_{name} {help}\n"));
            output.push_str(&format!("# TYPE hashtable_{name} gauge\n"));
            output.push_str(&format!("hashtable_{name} {value}\n"));
        }
        output.push_str(&operations.export_prometheus());
        output
    }
}
