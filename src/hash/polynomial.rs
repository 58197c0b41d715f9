//! 37 进制多项式哈希

use crate::{
    error::Result,
    hash::{check_inputs, strategy::{BucketHasher, HashAlgorithm}},
    types::Key,
};

pub const POLYNOMIAL_BASE: u128 = 37;

/// 对键规范形式的 UTF-16 码元计算 `sum(code[i] * 37^(len - 1 - i)) mod capacity`
///
/// 用霍纳法则逐步取模，任意长度的键结果都精确。
pub fn polynomial_hash(key: &Key, capacity: usize) -> Result<usize> {
    check_inputs(key, capacity)?;
    let modulus = capacity as u128;
    let index = key
        .canonical()
        .encode_utf16()
        .fold(0u128, |acc, code| (acc * POLYNOMIAL_BASE + code as u128) % modulus);
    Ok(index as usize)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolynomialHasher;

impl BucketHasher for PolynomialHasher {
    fn bucket_index(&self, key: &Key, capacity: usize) -> Result<usize> {
        polynomial_hash(key, capacity)
    }

    fn algorithm(&self) -> HashAlgorithm {
        HashAlgorithm::Polynomial
    }
}
