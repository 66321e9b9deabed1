use std::fmt;
use std::io;
use std::path::PathBuf;


/// Coarse classification of pipeline failures. Both kinds are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	IoFailure,
	ParseFailure,
}


#[derive(Debug)]
pub enum Error {
	Io{path: Option<PathBuf>, err: io::Error},
	Request(reqwest::Error),
	Csv(csv::Error),
	Xml(roxmltree::Error),
	GeoJson(geojson::Error),
	Date{value: String, err: chrono::ParseError},
	Number{column: String, value: String},
	MissingColumn(String),
	MissingAttribute{attribute: &'static str, feature: usize},
	MalformedResponse(&'static str),
	NotAFeatureCollection,
	LengthMismatch{codes: usize, values: usize},
}

impl Error {
	pub fn io_at<P: Into<PathBuf>>(path: P, err: io::Error) -> Self {
		Self::Io{path: Some(path.into()), err}
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			Self::Io{..} | Self::Request(_) => ErrorKind::IoFailure,
			// csv wraps reader failures too
			Self::Csv(e) => match e.kind() {
				csv::ErrorKind::Io(_) => ErrorKind::IoFailure,
				_ => ErrorKind::ParseFailure,
			},
			_ => ErrorKind::ParseFailure,
		}
	}
}

impl fmt::Display for Error {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::Io{path: Some(path), err} => write!(f, "{}: {}", path.display(), err),
			Self::Io{path: None, err} => fmt::Display::fmt(err, f),
			Self::Request(e) => fmt::Display::fmt(e, f),
			Self::Csv(e) => fmt::Display::fmt(e, f),
			Self::Xml(e) => write!(f, "malformed xml: {}", e),
			Self::GeoJson(e) => write!(f, "malformed geojson: {}", e),
			Self::Date{value, err} => write!(f, "invalid date {:?}: {}", value, err),
			Self::Number{column, value} => write!(f, "invalid number {:?} in column {:?}", value, column),
			Self::MissingColumn(name) => write!(f, "missing column {:?}", name),
			Self::MissingAttribute{attribute, feature} => write!(f, "feature {} has no {} attribute", feature, attribute),
			Self::MalformedResponse(what) => write!(f, "malformed response: {}", what),
			Self::NotAFeatureCollection => f.write_str("boundary file is not a FeatureCollection"),
			Self::LengthMismatch{codes, values} => write!(f, "{} codes but {} population values", codes, values),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io{err, ..} => Some(err),
			Self::Request(e) => Some(e),
			Self::Csv(e) => Some(e),
			Self::Xml(e) => Some(e),
			Self::GeoJson(e) => Some(e),
			Self::Date{err, ..} => Some(err),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(err: io::Error) -> Self {
		Self::Io{path: None, err}
	}
}

impl From<reqwest::Error> for Error {
	fn from(err: reqwest::Error) -> Self {
		Self::Request(err)
	}
}

impl From<csv::Error> for Error {
	fn from(err: csv::Error) -> Self {
		Self::Csv(err)
	}
}

impl From<roxmltree::Error> for Error {
	fn from(err: roxmltree::Error) -> Self {
		Self::Xml(err)
	}
}

impl From<geojson::Error> for Error {
	fn from(err: geojson::Error) -> Self {
		Self::GeoJson(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::GeoJson(geojson::Error::MalformedJson(err))
	}
}

pub type Result<T> = std::result::Result<T, Error>;
