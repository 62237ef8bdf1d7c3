//! The `lunr` and `storage` programs
//!
//! Both programs share the process boundary here: tracing setup before
//! dispatch, and the mapping from a dispatch result to output and an exit
//! code.

pub mod env;
pub mod lunr;
pub mod storage;

use crate::cli::{program_name, Opt, Outcome};
use crate::error::{DispatchError, LunrError, Result};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter, e.g. `lunrclient=debug`
pub const LOG_ENV: &str = "LUNR_LOG";

/// True when `-d` or `--debug` appears anywhere in argv
pub fn debug_requested(args: &[String]) -> bool {
    args.iter().any(|a| a == "-d" || a == "--debug")
}

/// Install the stderr log subscriber
///
/// The level is `warn` unless `LUNR_LOG` says otherwise; `-d`/`--debug`
/// raises this crate to `debug`.
pub fn init_tracing(args: &[String]) {
    let filter = if debug_requested(args) {
        EnvFilter::new("lunrclient=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Split argv into the program name and the remaining arguments
pub fn split_argv(argv: Vec<String>, fallback: &str) -> (String, Vec<String>) {
    let mut argv = argv.into_iter();
    let prog = argv
        .next()
        .map(|arg0| program_name(&arg0))
        .unwrap_or_else(|| fallback.to_string());
    (prog, argv.collect())
}

/// `-d/--debug`, shared by every group of both programs
pub fn debug_option() -> Opt {
    Opt::new(["-d", "--debug"])
        .store_const(true)
        .default(false)
        .help("print the REST calls used")
}

/// Report the result of a dispatch and turn it into an exit code
///
/// Argument parse errors exit here with the parser's own message and status.
pub fn finish(result: Result<Outcome>) -> i32 {
    match result {
        Ok(outcome) => {
            if let Outcome::Text(text) = &outcome {
                println!("{}", text);
            }
            outcome.exit_code()
        }
        Err(LunrError::Dispatch(DispatchError::Usage(e))) => e.exit(),
        Err(LunrError::Http { message, code }) => {
            println!("Code: {} - {}", code, message);
            1
        }
        Err(LunrError::Client(message)) => {
            println!("{}", message);
            1
        }
        Err(LunrError::Config(e)) => {
            println!("{}", e);
            1
        }
        Err(LunrError::Shell { message, help }) => {
            println!("{}", message);
            if let Some(help) = help {
                print!("{}", help);
            }
            1
        }
        Err(other) => {
            eprintln!("{} {}", "Error:".red().bold(), other);
            1
        }
    }
}
