use std::io;

use log::info;

use geojson::{Feature, GeoJson};

use smartstring::alias::{String as SmartString};

use super::context::{Granularity, UnitCode};
use super::error::{Error, Result};


/// A municipality or county boundary. The feature (geometry and all
/// source attributes) is passed through to the output untouched.
#[derive(Debug, Clone)]
pub struct GeographicUnit {
	pub code: UnitCode,
	pub name: Option<SmartString>,
	pub feature: Feature,
}


fn property_string(feature: &Feature, key: &str) -> Option<String> {
	match feature.property(key)? {
		serde_json::Value::String(s) => Some(s.clone()),
		serde_json::Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

pub fn load_boundaries<R: io::Read>(r: R, granularity: Granularity) -> Result<Vec<GeographicUnit>> {
	let collection = match GeoJson::from_reader(r)? {
		GeoJson::FeatureCollection(fc) => fc,
		_ => return Err(Error::NotAFeatureCollection),
	};

	let code_attribute = granularity.code_attribute();
	let name_attribute = granularity.name_attribute();
	let mut result = Vec::with_capacity(collection.features.len());
	for (i, feature) in collection.features.into_iter().enumerate() {
		let code = match property_string(&feature, code_attribute) {
			Some(v) => granularity.normalize_boundary_code(&v),
			None => return Err(Error::MissingAttribute{attribute: code_attribute, feature: i}),
		};
		let name = property_string(&feature, name_attribute).map(SmartString::from);
		result.push(GeographicUnit{
			code,
			name,
			feature,
		});
	}
	info!("loaded {} {} boundaries", result.len(), granularity);
	Ok(result)
}
