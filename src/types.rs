//! 核心类型 - 键、条目和操作标签

use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use crate::error::HashTableError;

/// 能被 `f64` 精确表示且彼此可区分的最大整数 (2^53 - 1)
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// 表键：非空字符串或正数
///
/// 两种变体在构造时都不做检查，调用方可以直接写 `table.set("a", 1)`
/// 或 `table.set(42, 1)`；每次表操作入口处再经 [`Key::validate`] 校验。
#[derive(Debug, Clone)]
pub enum Key {
    Str(String),
    Num(f64),
}

impl Key {
    /// 检查键是非空字符串或有限正数
    pub fn validate(&self) -> Result<(), HashTableError> {
        match self {
            Key::Str(s) if s.is_empty() => Err(HashTableError::InvalidKey {
                reason: "string key is empty".into(),
            }),
            Key::Num(n) if !n.is_finite() => Err(HashTableError::InvalidKey {
                reason: format!("numeric key {n} is not finite"),
            }),
            Key::Num(n) if *n <= 0.0 => Err(HashTableError::InvalidKey {
                reason: format!("numeric key {n} is not positive"),
            }),
            _ => Ok(()),
        }
    }

    /// 规范字符串形式，哈希和有序列举都基于它
    ///
    /// 数字按 ECMAScript `Number::toString` 的规则输出：取最短往返数字串，
    /// 小数点位置在 (-6, 21] 之内时写成定点形式，否则写成指数形式
    /// (`1e+21`, `1.5e-7`)。因此 `Key::Num(10.0)` 与 `Key::Str("10")`
    /// 规范形式相同，但仍是两个不同的键。
    pub fn canonical(&self) -> Cow<'_, str> {
        match self {
            Key::Str(s) => Cow::Borrowed(s),
            Key::Num(n) => Cow::Owned(number_to_string(*n)),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Key::Num(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            Key::Num(_) => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Key::Num(n) => Some(*n),
            Key::Str(_) => None,
        }
    }
}

/// ECMAScript 数字转字符串
fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".into();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".into() } else { "-Infinity".into() };
    }
    if n == 0.0 {
        return "0".into();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // `{:e}` 给出最短往返数字串，例如 "1.2345e3"
    let scientific = format!("{n:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return n.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return n.to_string();
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    // 值 = 0.digits × 10^point
    let point = exponent + 1;

    if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat((-point) as usize))
    } else {
        let sign = if exponent >= 0 { '+' } else { '-' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{first}e{sign}{}", exponent.abs())
        } else {
            format!("{first}.{rest}e{sign}{}", exponent.abs())
        }
    }
}

// 校验后的数字键都是有限正数，按位相等与数值相等一致
impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Str(a), Key::Str(b)) => a == b,
            (Key::Num(a), Key::Num(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Str(s) => {
                state.write_u8(0);
                s.hash(state);
            }
            Key::Num(n) => {
                state.write_u8(1);
                n.to_bits().hash(state);
            }
        }
    }
}

/// 列举顺序：按规范形式的字典序，相同时数字在前
impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical()
            .cmp(&other.canonical())
            .then_with(|| other.is_numeric().cmp(&self.is_numeric()))
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => write!(f, "{s:?}"),
            Key::Num(n) => f.write_str(&number_to_string(*n)),
        }
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Key::Str(value.to_owned())
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::Str(value)
    }
}

impl From<&String> for Key {
    fn from(value: &String) -> Self {
        Key::Str(value.clone())
    }
}

impl From<&Key> for Key {
    fn from(value: &Key) -> Self {
        value.clone()
    }
}

// 只为无损转换到 f64 的类型实现 From
macro_rules! numeric_key_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Key::Num(f64::from(value))
                }
            }
        )*
    };
}

numeric_key_from!(u8, u16, u32, i8, i16, i32, f32, f64);

fn unsafe_integer(value: impl Display) -> HashTableError {
    HashTableError::InvalidKey {
        reason: format!("integer key {value} exceeds {MAX_SAFE_INTEGER} and would lose precision"),
    }
}

// 64 位整数超过 2^53 - 1 后会与相邻整数映射到同一个 f64
macro_rules! numeric_key_try_from {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for Key {
                type Error = HashTableError;

                fn try_from(value: $ty) -> Result<Self, Self::Error> {
                    if (value as i128).unsigned_abs() > MAX_SAFE_INTEGER as u128 {
                        return Err(unsafe_integer(value));
                    }
                    Ok(Key::Num(value as f64))
                }
            }
        )*
    };
}

numeric_key_try_from!(u64, usize, i64, isize);

/// 桶链中的键值对
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    pub key: Key,
    pub value: V,
}

impl<V> Entry<V> {
    pub fn new(key: Key, value: V) -> Self {
        Self { key, value }
    }

    pub fn into_pair(self) -> (Key, V) {
        (self.key, self.value)
    }
}

/// 统计记录使用的操作类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Insert,
    Update,
    Get,
    Remove,
    Expand,
    Shrink,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Insert => "insert",
            OperationType::Update => "update",
            OperationType::Get => "get",
            OperationType::Remove => "remove",
            OperationType::Expand => "expand",
            OperationType::Shrink => "shrink",
        }
    }
}
