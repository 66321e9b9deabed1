use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer};

use smartstring::alias::{String as SmartString};


/// Width of the canonical municipality code used as join key.
pub static MUNICIPALITY_CODE_LEN: usize = 5;
/// Width population codes are zero-padded to before truncation.
pub static POPULATION_CODE_PAD: usize = 6;


/// Identifier of a municipality or county, compared as a string.
#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UnitCode(pub SmartString);

impl UnitCode {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Deref for UnitCode {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl From<&str> for UnitCode {
	fn from(other: &str) -> Self {
		Self(other.into())
	}
}

impl From<String> for UnitCode {
	fn from(other: String) -> Self {
		Self(other.into())
	}
}

impl fmt::Display for UnitCode {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for UnitCode {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where D: Deserializer<'de>
	{
		let s = SmartString::deserialize(deserializer)?;
		Ok(Self(s))
	}
}


/// Keep the first `len` characters of a code.
pub fn truncate_code(code: &str, len: usize) -> UnitCode {
	UnitCode(code.chars().take(len).collect::<String>().into())
}

/// Left-pad with zeros up to `pad`, then keep the first `len` characters.
///
/// Population tables store the six digit municipality code (five digit code
/// plus check digit) as a number, losing the leading zero. Padding back to
/// six and cutting the check digit yields the five digit join key. Codes
/// that were shorter to begin with are padded the same way, so `"801"`
/// becomes `"00080"`, not `"00801"`.
pub fn pad_then_truncate(code: &str, pad: usize, len: usize) -> UnitCode {
	let code = code.trim();
	let mut buf = SmartString::new();
	for _ in code.chars().count()..pad {
		buf.push('0');
	}
	buf.push_str(code);
	truncate_code(&buf, len)
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
	Municipality,
	County,
}

impl Granularity {
	/// Boundary attribute holding the unit code.
	pub fn code_attribute(&self) -> &'static str {
		match self {
			Self::Municipality => "CODIMUNI",
			Self::County => "CODICOMAR",
		}
	}

	/// Boundary attribute holding the unit name.
	pub fn name_attribute(&self) -> &'static str {
		match self {
			Self::Municipality => "NOMMUNI",
			Self::County => "NOMCOMAR",
		}
	}

	pub fn normalize_boundary_code(&self, raw: &str) -> UnitCode {
		match self {
			Self::Municipality => truncate_code(raw.trim(), MUNICIPALITY_CODE_LEN),
			Self::County => UnitCode::from(raw.trim()),
		}
	}
}

impl fmt::Display for Granularity {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Municipality => f.write_str("municipi"),
			Self::County => f.write_str("comarca"),
		}
	}
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
	/// All records since the start of the series.
	Cumulative,
	/// Only the week before the latest week present in the data.
	LastCompleteWeek,
}
