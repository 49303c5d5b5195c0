//! Options, defaults and the process-wide default cost.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use crate::cost::CostParams;

/// Default derived key length in bytes
pub const DEFAULT_KEY_LEN: usize = 32;
/// Default number of random salt bytes
pub const DEFAULT_SALT_SIZE: usize = 32;
/// Default memory ceiling for calibration (16 MiB)
pub const DEFAULT_MAX_MEM: u64 = 16 * 1024 * 1024;
/// Default fraction of free memory calibration may plan for
pub const DEFAULT_MAX_MEM_FRAC: f64 = 0.5;
/// Default time target for one hash
pub const DEFAULT_MAX_TIME: Duration = Duration::from_millis(200);

/// Accepted key lengths
pub const KEY_LEN_RANGE: core::ops::RangeInclusive<usize> = 16..=512;
/// Accepted salt sizes
pub const SALT_SIZE_RANGE: core::ops::RangeInclusive<usize> = 8..=32;

/// Limits calibration works within.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationBudget {
    /// Memory ceiling in bytes, 0 for none
    pub max_mem: u64,
    /// Fraction of free memory to plan for, values outside (0, 0.5] mean 0.5
    pub max_mem_frac: f64,
    /// Time one hash should take
    pub max_time: Duration,
}

impl CalibrationBudget {
    /// 16 MiB, half of free memory, 200 ms
    pub const DEFAULT: Self = Self {
        max_mem: DEFAULT_MAX_MEM,
        max_mem_frac: DEFAULT_MAX_MEM_FRAC,
        max_time: DEFAULT_MAX_TIME,
    };
}

impl Default for CalibrationBudget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Options for creating a new hash.
#[derive(Debug, Clone, PartialEq)]
pub struct HashOptions {
    /// Derived key length in bytes, clamped to [`KEY_LEN_RANGE`]
    pub key_len: usize,
    /// Random salt bytes, clamped to [`SALT_SIZE_RANGE`]
    pub salt_size: usize,
    /// Budget used when the cost has to be calibrated
    pub budget: CalibrationBudget,
    /// Explicit cost, skipping calibration
    pub cost: Option<CostParams>,
}

impl HashOptions {
    /// Defaults with an auto calibrated cost
    pub const DEFAULT: Self = Self {
        key_len: DEFAULT_KEY_LEN,
        salt_size: DEFAULT_SALT_SIZE,
        budget: CalibrationBudget::DEFAULT,
        cost: None,
    };

    /// Defaults with a fixed cost
    pub const fn with_cost(cost: CostParams) -> Self {
        Self {
            cost: Some(cost),
            ..Self::DEFAULT
        }
    }
}

impl Default for HashOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

pub(crate) fn clamp_key_len(key_len: usize) -> usize {
    key_len.clamp(*KEY_LEN_RANGE.start(), *KEY_LEN_RANGE.end())
}

pub(crate) fn clamp_salt_size(salt_size: usize) -> usize {
    salt_size.clamp(*SALT_SIZE_RANGE.start(), *SALT_SIZE_RANGE.end())
}

static DEFAULT_COST: RwLock<Option<CostParams>> = RwLock::new(None);

/// The cost used when [`HashOptions::cost`] is `None`, if one has been set or calibrated.
pub fn default_cost() -> Option<CostParams> {
    *DEFAULT_COST.read().unwrap_or_else(PoisonError::into_inner)
}

/// Replace the process-wide default cost, returning the previous one.
///
/// `None` makes the next hash without an explicit cost calibrate again.
pub fn set_default_cost(cost: Option<CostParams>) -> Option<CostParams> {
    let mut guard = DEFAULT_COST.write().unwrap_or_else(PoisonError::into_inner);
    core::mem::replace(&mut *guard, cost)
}

/// Store `cost` unless a default already exists, returning whichever is stored.
pub(crate) fn init_default_cost(cost: CostParams) -> CostParams {
    let mut guard = DEFAULT_COST.write().unwrap_or_else(PoisonError::into_inner);
    *guard.get_or_insert(cost)
}
