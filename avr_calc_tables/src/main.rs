//! Prints precalculated AVR register tables, for firmware that would rather
//! carry a table of `UBRRn` / `OCRnA` values than the solvers themselves.

mod tables;

use std::num::ParseIntError;
use std::process::ExitCode;

use avr_calc::{ClockConfig, ErrorMargin, TimerId};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error, info};

use tables::{BaudTable, TimerTable, DEFAULT_BAUD_RATES};

#[derive(thiserror::Error, Debug)]
pub enum TableError {
    #[error("InvalidTimer ({:?})", .0)]
    InvalidTimer(#[from] ParseIntError),
    #[error("UnknownTimer (id={})", .0)]
    UnknownTimer(u8),
    #[error("MaxError ({} permille is above 100%)", .0)]
    MaxError(u16),
    #[error("Json {:?}", .0)]
    Json(#[from] serde_json::Error),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Rust,
}

#[derive(Parser, Debug)]
#[command(about = "Precalculated AVR baud rate and timer register tables")]
struct Args {
    /// System clock in Hz
    #[arg(long, default_value_t = avr_calc::F_CPU, value_parser = clap::value_parser!(u32).range(1..))]
    clock: u32,
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// UBRRn values for a list of baud rates
    Baud {
        /// U2Xn set: sample at 8x instead of 16x
        #[arg(long)]
        double_speed: bool,
        /// Keep best-effort divisors regardless of their error
        #[arg(long)]
        no_error_check: bool,
        /// Largest accepted error in tenths of a percent
        #[arg(long, conflicts_with = "no_error_check")]
        max_error_permille: Option<u16>,
        rates: Vec<u32>,
    },
    /// CS bits and OCRnA values for a list of compare-match frequencies
    Timer {
        /// Timer number, 0 to 5
        #[arg(long, value_parser = parse_timer)]
        timer: TimerId,
        #[arg(required = true)]
        frequencies: Vec<u32>,
    },
}

fn parse_timer(s: &str) -> Result<TimerId, TableError> {
    let id: u8 = s.parse()?;
    TimerId::try_from(id).map_err(|_| TableError::UnknownTimer(id))
}

fn run(args: &Args) -> Result<String, TableError> {
    let config = ClockConfig::new(args.clock);
    debug!("Using clock configuration {:?}", config);

    match &args.command {
        Command::Baud {
            double_speed,
            no_error_check,
            max_error_permille,
            rates,
        } => {
            let config = match (no_error_check, max_error_permille) {
                (true, _) => config.without_error_check(),
                (false, Some(permille)) if *permille > 1000 => return Err(TableError::MaxError(*permille)),
                (false, Some(permille)) => config.with_error_margin(ErrorMargin::from_permille(*permille)),
                (false, None) => config,
            };
            let rates = if rates.is_empty() {
                &DEFAULT_BAUD_RATES[..]
            } else {
                rates.as_slice()
            };
            let table = BaudTable::compute(&config, *double_speed, rates);
            info!("Computed {} baud rate entries for {} Hz", table.rows.len(), table.clock_hz);
            match args.format {
                Format::Json => table.to_json(),
                Format::Rust => Ok(table.to_rust()),
            }
        }
        Command::Timer { timer, frequencies } => {
            let table = TimerTable::compute(&config, *timer, frequencies);
            info!("Computed {} {:?} entries for {} Hz", table.rows.len(), timer, table.clock_hz);
            match args.format {
                Format::Json => table.to_json(),
                Format::Rust => Ok(table.to_rust()),
            }
        }
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let args = Args::parse();
    match run(&args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_with(argv: &[&str]) -> Result<String, TableError> {
        let args = Args::try_parse_from(argv).unwrap();
        run(&args)
    }

    #[test]
    fn cli_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn timer_ids() {
        assert_eq!(parse_timer("2").unwrap(), TimerId::Timer2);
        assert!(matches!(parse_timer("6"), Err(TableError::UnknownTimer(6))));
        assert!(matches!(parse_timer("two"), Err(TableError::InvalidTimer(_))));
    }

    #[test]
    fn zero_clock_is_rejected() {
        assert!(Args::try_parse_from(["avr_calc_tables", "--clock", "0", "baud"]).is_err());
    }

    #[test]
    fn default_rates() {
        let out = run_with(&["avr_calc_tables", "--clock", "16000000", "--format", "rust", "baud"]).unwrap();
        assert!(out.contains("pub const UBRR_9600: u16 = 103;"));
        assert!(out.contains("pub const UBRR_250000: u16 = 3;"));
    }

    #[test]
    fn margin_flags() {
        let out = run_with(&[
            "avr_calc_tables", "--clock", "16000000", "--format", "rust", "baud", "--no-error-check", "115200",
        ])
        .unwrap();
        assert!(out.contains("pub const UBRR_115200: u16 = 8;"));

        let out = run_with(&[
            "avr_calc_tables", "--clock", "16000000", "--format", "rust", "baud", "--max-error-permille", "40", "115200",
        ])
        .unwrap();
        assert!(out.contains("pub const UBRR_115200: u16 = 8;"));

        assert!(matches!(
            run_with(&["avr_calc_tables", "baud", "--max-error-permille", "1001"]),
            Err(TableError::MaxError(1001))
        ));
        assert!(Args::try_parse_from([
            "avr_calc_tables", "baud", "--no-error-check", "--max-error-permille", "10",
        ])
        .is_err());
    }

    #[test]
    fn timer_table() {
        let out = run_with(&["avr_calc_tables", "--clock", "16000000", "timer", "--timer", "0", "1000"]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["rows"][0]["setting"]["counter"], 249);
        assert_eq!(json["rows"][0]["cs_bits"], 3);
    }
}
