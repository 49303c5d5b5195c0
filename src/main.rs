use clap::Parser;
use scrypt_pwhash::{
    CalibrationBudget, CostParams, DefaultKdf, Error, HashOptions, Hasher, PasswordHash,
    config::{DEFAULT_KEY_LEN, DEFAULT_MAX_MEM, DEFAULT_MAX_MEM_FRAC, DEFAULT_SALT_SIZE},
    self_test::{FAST_CASES, FORMAT_CASES, SLOW_CASES, format_self_test},
};

use std::{
    io::{Read, Write},
    process::ExitCode,
    time::Duration,
};

#[derive(clap::Args)]
struct BudgetArgs {
    #[arg(long, default_value_t = DEFAULT_MAX_MEM, help = "memory ceiling in bytes, 0 for none")]
    max_mem: u64,
    #[arg(long, default_value_t = DEFAULT_MAX_MEM_FRAC, help = "fraction of free memory to use")]
    max_mem_frac: f64,
    #[arg(long, default_value = "0.2", value_parser = parse_seconds, help = "target seconds per hash")]
    max_time: Duration,
}

impl BudgetArgs {
    fn budget(&self) -> CalibrationBudget {
        CalibrationBudget {
            max_mem: self.max_mem,
            max_mem_frac: self.max_mem_frac,
            max_time: self.max_time,
        }
    }
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|_| format!("{s} is not a valid number of seconds"))
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Hash(#[from] Error),
    #[error("reading password: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(clap::Subcommand)]
enum Command {
    Cast {
        #[arg(short, long)]
        fast: bool,
    },
    Calibrate {
        #[command(flatten)]
        budget: BudgetArgs,
    },
    Hash {
        #[arg(help = "password, read from stdin when omitted")]
        password: Option<String>,
        #[arg(short, long, default_value_t = DEFAULT_KEY_LEN)]
        key_len: usize,
        #[arg(short, long, default_value_t = DEFAULT_SALT_SIZE)]
        salt_size: usize,
        #[arg(short, long, help = "cost string such as 4000$8$1$, calibrated when omitted")]
        cost: Option<CostParams>,
        #[command(flatten)]
        budget: BudgetArgs,
    },
    Verify {
        hash: String,
        #[arg(help = "password, read from stdin when omitted")]
        password: Option<String>,
    },
}

#[derive(Parser)]
#[command(version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

fn slurp_stdin() -> std::io::Result<Vec<u8>> {
    let mut stdin = std::io::stdin().lock();
    let mut buffer = Vec::new();
    stdin.read_to_end(&mut buffer)?;
    if buffer.last() == Some(&b'\n') {
        buffer.pop();
        if buffer.last() == Some(&b'\r') {
            buffer.pop();
        }
    }
    Ok(buffer)
}

fn read_password(password: Option<String>) -> std::io::Result<Vec<u8>> {
    match password {
        Some(password) => Ok(password.into_bytes()),
        None => slurp_stdin(),
    }
}

fn cast(fast: bool) -> bool {
    let kdf = DefaultKdf::default();
    let mut passed = true;

    macro_rules! case {
        ($name:expr, $c:block) => {{
            let mut stdout = std::io::stdout().lock();
            let _ = write!(stdout, "Testing: {} ... ", $name);
            let _ = stdout.flush();
            let start = std::time::Instant::now();
            let result = $c;
            let elapsed = start.elapsed();
            match result {
                Ok(()) => {
                    let _ = writeln!(stdout, "PASS ({} ms)", elapsed.as_millis());
                }
                Err(e) => {
                    passed = false;
                    let _ = writeln!(stdout, "FAIL ({e})");
                }
            }
        }};
    }

    for case in FAST_CASES {
        case!(case.name, { case.run(&kdf) });
    }
    if !fast {
        for case in SLOW_CASES {
            case!(case.name, { case.run(&kdf) });
        }
    }
    case!(format_args!("{} stored hashes", FORMAT_CASES.len()), {
        format_self_test(&kdf)
    });

    if passed {
        println!("------ PASSED ALL TESTS ------");
    } else {
        println!("------ SELF TEST FAILED ------");
    }
    passed
}

fn run(command: Command) -> Result<ExitCode, CliError> {
    let hasher = Hasher::new();

    match command {
        Command::Cast { fast } => Ok(if cast(fast) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }),
        Command::Calibrate { budget } => {
            let cost = hasher.calibrate(&budget.budget())?;
            println!("{cost}");
            log::info!("N={} r={} p={}", cost.n, cost.r, cost.p);
            Ok(ExitCode::SUCCESS)
        }
        Command::Hash {
            password,
            key_len,
            salt_size,
            cost,
            budget,
        } => {
            let password = read_password(password)?;
            let options = HashOptions {
                key_len,
                salt_size,
                budget: budget.budget(),
                cost,
            };
            let hash = hasher.hash_password(password.as_slice(), &options)?;
            println!("{hash}");
            Ok(ExitCode::SUCCESS)
        }
        Command::Verify { hash, password } => {
            let hash: PasswordHash = hash.parse()?;
            let password = read_password(password)?;
            if hasher.verify(password.as_slice(), &hash)? {
                println!("OK");
                Ok(ExitCode::SUCCESS)
            } else {
                println!("MISMATCH");
                Ok(ExitCode::from(1))
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_time_is_parsed() {
        let args = Args::try_parse_from(["scrypt-pwhash", "calibrate", "--max-time", "0.5"]).unwrap();
        let Command::Calibrate { budget } = args.command else {
            panic!("wrong command");
        };
        assert_eq!(budget.budget().max_time, Duration::from_millis(500));

        let args = Args::try_parse_from(["scrypt-pwhash", "calibrate"]).unwrap();
        let Command::Calibrate { budget } = args.command else {
            panic!("wrong command");
        };
        assert_eq!(budget.budget(), CalibrationBudget::DEFAULT);
    }

    #[test]
    fn bad_max_time_is_rejected() {
        for bad in ["--max-time=-1", "--max-time=NaN", "--max-time=inf", "--max-time=soon"] {
            assert!(
                Args::try_parse_from(["scrypt-pwhash", "calibrate", bad]).is_err(),
                "{bad}"
            );
        }
    }

    #[test]
    fn io_failure_is_not_a_bad_password() {
        let e = CliError::from(std::io::Error::other("stdin closed"));
        assert!(matches!(e, CliError::Io(_)));
        assert_eq!(e.to_string(), "reading password: stdin closed");
    }
}
