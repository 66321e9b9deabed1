mod boundary;
mod calendar;
mod cases;
mod config;
mod context;
mod error;
mod ioutil;
mod join;
mod output;
mod pipeline;
mod population;
mod progress;
mod rate;

pub use boundary::*;
pub use calendar::{parse_report_date, week_number, REPORT_DATE_FORMAT};
pub use cases::*;
pub use config::*;
pub use context::*;
pub use error::{Error, ErrorKind, Result};
pub use ioutil::{create_output, magic_open};
pub use join::*;
pub use output::*;
pub use pipeline::*;
pub use population::*;
pub use progress::*;
pub use rate::*;


/// Install the logger used by the binaries. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}
