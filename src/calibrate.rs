//! Picking (N, r, p) for the host.
//!
//! Calibration measures how many minimal scrypt calls (N=128, r=1, p=1) the
//! host performs per second, turns the time budget into a number of such
//! operations, and then chooses N and p so that one hash stays within both
//! the operation count and the memory budget. r is always 8.

use std::time::{Duration, Instant};

use crate::{
    config::CalibrationBudget,
    cost::CostParams,
    error::KdfError,
    kdf::{DefaultKdf, Kdf},
    memory,
};

/// Parameters of the throughput probe
pub const BENCH_COST: CostParams = CostParams::new(128, 1, 1);
/// Calls in the first measured batch
pub const BENCH_INITIAL_BATCH: u64 = 1000;
/// A batch must run longer than this to count
pub const BENCH_MIN_ELAPSED: Duration = Duration::from_millis(330);
/// Batches grow ×10 at most this many times
pub const MAX_BENCH_ROUNDS: u32 = 5;
/// Ceiling on the operation budget of one hash
pub const MAX_OPS: f64 = 32768.0;
/// Floor on the memory budget
pub const MIN_MEM: u64 = 1024 * 1024;
/// The block size calibration always picks
pub const CALIBRATED_R: u32 = 8;

const MAX_RP: u64 = 0x3fff_ffff;
const MIB: f64 = 1048576.0;

/// Measure minimal scrypt calls per second.
///
/// Runs one warm-up batch of [`BENCH_INITIAL_BATCH`] calls, then batches
/// growing ×10 until one takes longer than [`BENCH_MIN_ELAPSED`]. After
/// [`MAX_BENCH_ROUNDS`] batches the last rate is returned regardless.
pub fn cpu_perf<K: Kdf + ?Sized>(kdf: &K) -> Result<f64, KdfError> {
    let run = |iterations: u64| -> Result<Duration, KdfError> {
        let start = Instant::now();
        for _ in 0..iterations {
            core::hint::black_box(kdf.derive(&[], &[], &BENCH_COST, 1)?);
        }
        Ok(start.elapsed())
    };

    let mut iterations = BENCH_INITIAL_BATCH;
    // warm-up
    run(iterations)?;

    let mut rate = f64::INFINITY;
    for _ in 0..MAX_BENCH_ROUNDS {
        let elapsed = run(iterations)?;
        rate = ops_per_sec(iterations, elapsed);
        if elapsed > BENCH_MIN_ELAPSED {
            log::debug!("cpuperf {rate} ops/s");
            return Ok(rate);
        }
        iterations = iterations.saturating_mul(10);
    }

    log::debug!("cpuperf {rate} ops/s (round cap reached)");
    Ok(rate)
}

fn ops_per_sec(iterations: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        iterations as f64 / secs
    } else {
        f64::INFINITY
    }
}

/// Memory in bytes one hash may use.
///
/// `free` is the host's free memory, `None` when unknown. Without it the
/// budget's `max_mem` is used as is, and [`MIN_MEM`] if that is 0 too.
pub fn mem_to_use(budget: &CalibrationBudget, free: Option<u64>) -> u64 {
    let frac = if budget.max_mem_frac > 0.0 && budget.max_mem_frac <= 0.5 {
        budget.max_mem_frac
    } else {
        0.5
    };

    let mut avail = match free {
        Some(free) => {
            log::debug!("free mem {} MiB", free as f64 / MIB);
            frac * free as f64
        }
        None => {
            log::debug!("free mem unknown");
            f64::INFINITY
        }
    };
    if budget.max_mem > 0 {
        avail = avail.min(budget.max_mem as f64);
    }
    let avail = if avail.is_finite() {
        (avail as u64).max(MIN_MEM)
    } else {
        MIN_MEM
    };

    log::debug!("memtouse {} MiB", avail as f64 / MIB);
    avail
}

/// Choose (N, r, p) from an operation budget and a memory budget.
///
/// When the operation budget is small next to memory, p is 1 and N follows
/// the operation budget. Otherwise N follows memory and p soaks up the
/// remaining operations, which can leave p at 0 for very small budgets.
pub fn pick_params(ops_limit: f64, mem_limit: u64) -> CostParams {
    let r = CALIBRATED_R;

    if ops_limit < mem_limit as f64 / 32.0 {
        log::debug!("pick based on CPU limit");
        let max_n = ops_limit / f64::from(r * 4);
        let n = smallest_power_of_two_above(max_n / 2.0, 1..63);
        CostParams::new(n, r, 1)
    } else {
        log::debug!("pick based on memory limit");
        let max_n = mem_limit as f64 / f64::from(r * 128);
        let n = smallest_power_of_two_above(max_n / 2.0, 1..=63);
        let max_rp = ((ops_limit / 4.0) as u64 / n).min(MAX_RP);
        CostParams::new(n, r, (max_rp / u64::from(r)) as u32)
    }
}

/// `2^i` for the first `i` in `exponents` with `2^i > bound`, or the last one tried.
fn smallest_power_of_two_above(bound: f64, exponents: impl IntoIterator<Item = u32>) -> u64 {
    let mut n = 2;
    for i in exponents {
        n = 1u64 << i;
        if n as f64 > bound {
            break;
        }
    }
    n
}

/// Calibrate with an explicit backend and free-memory figure.
pub fn calibrate_with<K: Kdf + ?Sized>(
    kdf: &K,
    budget: &CalibrationBudget,
    free_memory: Option<u64>,
) -> Result<CostParams, KdfError> {
    let mem_limit = mem_to_use(budget, free_memory);
    let ops_limit = (cpu_perf(kdf)? * budget.max_time.as_secs_f64()).min(MAX_OPS);
    log::debug!("ops_limit {ops_limit} ops");

    let cost = pick_params(ops_limit, mem_limit);
    log::debug!("calibrated using: N {} r {} p {}", cost.n, cost.r, cost.p);
    Ok(cost)
}

/// Calibrate with the default backend against this host's free memory.
///
/// Blocks until one measured batch runs longer than [`BENCH_MIN_ELAPSED`],
/// or until [`MAX_BENCH_ROUNDS`] batches have run.
pub fn calibrate(budget: &CalibrationBudget) -> Result<CostParams, KdfError> {
    calibrate_with(&DefaultKdf::default(), budget, memory::free_memory())
}
