//! 素数工具 - 素性判断和调整目标的素数搜索

use crate::error::{HashTableError, Result};

/// 用 `2..=floor(sqrt(n))` 中的每个整数试除
///
/// `n < 2` 时返回 `InvalidArgument`。
pub fn is_prime(n: usize) -> Result<bool> {
    if n < 2 {
        return Err(HashTableError::InvalidArgument {
            value: n,
            reason: "primality is only defined for n >= 2",
        });
    }
    let mut divisor = 2usize;
    // divisor <= n / divisor 避免平方溢出 usize::MAX
    while divisor <= n / divisor {
        if n % divisor == 0 {
            return Ok(false);
        }
        divisor += 1;
    }
    Ok(true)
}

/// 不小于 `n` 的最小素数
///
/// `n == 0` 或搜索溢出时返回 `InvalidArgument`。
pub fn next_prime_at_or_above(n: usize) -> Result<usize> {
    if n == 0 {
        return Err(HashTableError::InvalidArgument {
            value: n,
            reason: "prime search starts from a positive integer",
        });
    }
    if n <= 2 {
        return Ok(2);
    }
    if is_prime(n)? {
        return Ok(n);
    }

    let overflow = HashTableError::InvalidArgument {
        value: n,
        reason: "no prime representable above this value",
    };
    let mut candidate = n | 1;
    loop {
        if is_prime(candidate)? {
            return Ok(candidate);
        }
        candidate = candidate.checked_add(2).ok_or_else(|| overflow.clone())?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prime_small_values() {
        let primes: Vec<usize> = (2..50).filter(|&n| is_prime(n).unwrap()).collect();
        assert_eq!(
            primes,
            vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47]
        );
    }

    #[test]
    fn test_is_prime_rejects_below_two() {
        assert!(matches!(
            is_prime(0),
            Err(HashTableError::InvalidArgument { value: 0, .. })
        ));
        assert!(is_prime(1).is_err());
    }

    #[test]
    fn test_is_prime_squares() {
        assert!(!is_prime(49).unwrap());
        assert!(!is_prime(121).unwrap());
        assert!(is_prime(7919).unwrap());
    }

    #[test]
    fn test_next_prime() {
        assert_eq!(next_prime_at_or_above(1).unwrap(), 2);
        assert_eq!(next_prime_at_or_above(2).unwrap(), 2);
        assert_eq!(next_prime_at_or_above(7).unwrap(), 7);
        assert_eq!(next_prime_at_or_above(8).unwrap(), 11);
        assert_eq!(next_prime_at_or_above(9).unwrap(), 11);
        assert_eq!(next_prime_at_or_above(15).unwrap(), 17);
        assert_eq!(next_prime_at_or_above(24).unwrap(), 29);
    }

    #[test]
    fn test_next_prime_rejects_zero() {
        assert!(next_prime_at_or_above(0).is_err());
    }
}
