use std::fmt;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateMode {
	/// Cases per 100,000 inhabitants, rounded to an integer.
	Per100k,
	/// Percent of the population, rounded to one decimal.
	Percent,
}

impl RateMode {
	pub fn scale(&self) -> f64 {
		match self {
			Self::Per100k => 100_000.0,
			Self::Percent => 100.0,
		}
	}

	pub fn decimals(&self) -> i32 {
		match self {
			Self::Per100k => 0,
			Self::Percent => 1,
		}
	}

	/// Division by a zero population is not guarded and yields `inf` (or
	/// `NaN` for zero cases). A missing population yields `None`.
	pub fn compute(&self, cases: u64, population: Option<u64>) -> Option<f64> {
		let population = population?;
		let raw = cases as f64 * self.scale() / population as f64;
		Some(round_half_even(raw, self.decimals()))
	}
}

impl fmt::Display for RateMode {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Per100k => f.write_str("per_100k"),
			Self::Percent => f.write_str("percent"),
		}
	}
}


/// Round to `decimals` places, ties to even. Non-finite values are
/// returned unchanged.
pub fn round_half_even(x: f64, decimals: i32) -> f64 {
	if !x.is_finite() {
		return x
	}
	let factor = 10f64.powi(decimals);
	let y = x * factor;
	let floor = y.floor();
	let rounded = if y - floor == 0.5 {
		if floor % 2.0 == 0.0 {
			floor
		} else {
			floor + 1.0
		}
	} else {
		y.round()
	};
	rounded / factor
}
