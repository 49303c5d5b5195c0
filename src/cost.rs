use core::{fmt, str::FromStr};

use crate::error::{Error, KdfError};

/// Upper bound (exclusive) on `r * p` imposed by scrypt.
pub const MAX_RP: u64 = 1 << 30;

/// The scrypt cost triple.
///
/// Serialized as `"{N:x}${r:x}${p:x}$"`, e.g. `"400$8$1$"` for N=1024, r=8, p=1.
///
/// Values parsed from storage are not validated beyond being hexadecimal, use
/// [`CostParams::validate`] to check the scrypt constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CostParams {
    /// CPU/memory cost, a power of two
    pub n: u64,
    /// Block size
    pub r: u32,
    /// Parallelization
    pub p: u32,
}

impl CostParams {
    /// Create a new cost triple
    pub const fn new(n: u64, r: u32, p: u32) -> Self {
        Self { n, r, p }
    }

    /// log2(N), if N is a power of two greater than one.
    pub const fn log2_n(&self) -> Option<u8> {
        if self.n > 1 && self.n.is_power_of_two() {
            Some(self.n.trailing_zeros() as u8)
        } else {
            None
        }
    }

    /// Bytes of the V array scrypt allocates: 128 * N * r.
    pub fn memory_bytes(&self) -> Option<u64> {
        128u64.checked_mul(self.n)?.checked_mul(u64::from(self.r))
    }

    /// Check the constraints scrypt puts on the triple.
    ///
    /// Passing does not mean the host can afford the memory, see
    /// [`CostParams::memory_bytes`].
    pub fn validate(&self) -> Result<(), KdfError> {
        let Some(log2_n) = self.log2_n() else {
            return Err(KdfError::InvalidN(self.n));
        };
        if self.r == 0 || self.p == 0 {
            return Err(KdfError::ZeroParameter {
                r: self.r,
                p: self.p,
            });
        }
        if u64::from(log2_n) >= 16 * u64::from(self.r) {
            return Err(KdfError::CostTooLarge {
                n: self.n,
                r: self.r,
            });
        }
        if u64::from(self.r) * u64::from(self.p) >= MAX_RP {
            return Err(KdfError::ParallelismTooLarge {
                r: self.r,
                p: self.p,
            });
        }
        match self.memory_bytes() {
            Some(bytes) if usize::try_from(bytes).is_ok_and(|b| b <= isize::MAX as usize) => Ok(()),
            _ => Err(KdfError::MemoryLimit {
                n: self.n,
                r: self.r,
            }),
        }
    }

    pub(crate) fn from_segments(n: &str, r: &str, p: &str) -> Option<Self> {
        if !is_cost_segment(n) || !is_cost_segment(r) || !is_cost_segment(p) {
            return None;
        }
        Some(Self {
            n: u64::from_str_radix(n, 16).ok()?,
            r: u32::from_str_radix(r, 16).ok()?,
            p: u32::from_str_radix(p, 16).ok()?,
        })
    }
}

/// `[0-9a-z]+`
pub(crate) fn is_cost_segment(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_lowercase())
}

impl fmt::Display for CostParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}${:x}${:x}$", self.n, self.r, self.p)
    }
}

impl FromStr for CostParams {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s.strip_suffix('$').ok_or(Error::InvalidCost)?;
        let mut segments = body.split('$');
        match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(n), Some(r), Some(p), None) => {
                Self::from_segments(n, r, p).ok_or(Error::InvalidCost)
            }
            _ => Err(Error::InvalidCost),
        }
    }
}
