use std::fs;
use std::io::{self, Read};
use std::path::Path;

use flate2;

use super::error::{Error, Result};


/// Open an input file, transparently decompressing `.gz` files.
pub fn magic_open<P: AsRef<Path>>(path: P) -> Result<Box<dyn Read>> {
	let path = path.as_ref();
	let f = fs::File::open(path).map_err(|e| Error::io_at(path, e))?;
	match path.extension() {
		Some(x) if x == "gz" => Ok(Box::new(flate2::read::GzDecoder::new(f))),
		_ => Ok(Box::new(io::BufReader::new(f))),
	}
}

pub fn create_output<P: AsRef<Path>>(path: P) -> Result<io::BufWriter<fs::File>> {
	let path = path.as_ref();
	let f = fs::File::create(path).map_err(|e| Error::io_at(path, e))?;
	Ok(io::BufWriter::new(f))
}
