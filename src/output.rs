use std::io;

use log::debug;

use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue};

use super::context::Granularity;
use super::error::Result;
use super::join::JoinedUnit;
use super::rate::RateMode;


pub static POPULATION_PROPERTY: &'static str = "Poblacio";
pub static CASES_PROPERTY: &'static str = "NumCasos";
pub static WEEK_PROPERTY: &'static str = "Setmana";
pub static RATE_PROPERTY: &'static str = "PercentatgeCasos";


#[derive(Debug, Clone)]
pub struct MapRow {
	pub joined: JoinedUnit,
	/// `None` for a null population; may be non-finite for zero population.
	pub rate: Option<f64>,
}


/// The joined table handed to the renderer.
#[derive(Debug, Clone)]
pub struct MapDataset {
	granularity: Granularity,
	rate_mode: RateMode,
	week: Option<u32>,
	rows: Vec<MapRow>,
}

impl MapDataset {
	pub fn new(granularity: Granularity, rate_mode: RateMode, week: Option<u32>, joined: Vec<JoinedUnit>) -> Self {
		let rows = joined.into_iter().map(|joined| {
			let rate = rate_mode.compute(joined.cases, joined.population);
			MapRow{joined, rate}
		}).collect();
		Self{
			granularity,
			rate_mode,
			week,
			rows,
		}
	}

	pub fn granularity(&self) -> Granularity {
		self.granularity
	}

	pub fn rate_mode(&self) -> RateMode {
		self.rate_mode
	}

	pub fn week(&self) -> Option<u32> {
		self.week
	}

	pub fn rows(&self) -> &[MapRow] {
		&self.rows[..]
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	pub fn total_cases(&self) -> u64 {
		self.rows.iter().map(|r| r.joined.cases).sum()
	}

	/// Source features with the joined values added as properties.
	/// Null and non-finite rates become JSON `null`.
	pub fn to_feature_collection(&self) -> FeatureCollection {
		let mut features = Vec::with_capacity(self.rows.len());
		for row in self.rows.iter() {
			let mut feature = row.joined.unit.feature.clone();
			feature.set_property(POPULATION_PROPERTY, row.joined.population);
			feature.set_property(CASES_PROPERTY, row.joined.cases);
			if let Some(week) = self.week {
				feature.set_property(WEEK_PROPERTY, week);
			}
			feature.set_property(RATE_PROPERTY, row.rate);
			features.push(feature);
		}

		let mut foreign = JsonObject::new();
		foreign.insert("granularity".into(), JsonValue::from(self.granularity.to_string()));
		foreign.insert("rate_mode".into(), JsonValue::from(self.rate_mode.to_string()));
		foreign.insert("week".into(), JsonValue::from(self.week));
		FeatureCollection{
			bbox: None,
			features,
			foreign_members: Some(foreign),
		}
	}

	pub fn write_geojson<W: io::Write>(&self, mut w: W) -> Result<()> {
		let gj = GeoJson::from(self.to_feature_collection());
		let text = gj.to_string();
		debug!("writing {} bytes of geojson", text.len());
		w.write_all(text.as_bytes())?;
		w.flush()?;
		Ok(())
	}
}
