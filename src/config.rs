use std::env;
use std::path::PathBuf;

use log::info;

use smartstring::alias::{String as SmartString};

use super::cases::{CaseFilter, SUSPECTED_CASE_TYPE};
use super::context::{Granularity, Period};
use super::error::{Error, Result};
use super::ioutil::magic_open;
use super::population::{
	fetch_county_population, load_county_population, load_municipal_population, MunicipalLayout,
	PopulationRecord, IDESCAT_COUNTY_POPULATION_URL,
};
use super::rate::RateMode;


pub static CASES_PATH: &'static str = "Registre_de_casos_de_COVID-19_realitzats_a_Catalunya._Segregaci__per_sexe_i_municipi.csv";
pub static MUNICIPALITY_BOUNDARIES_PATH: &'static str = "../Dades/CatalunyaMunicipis/bm5mv21sh0tpm1_20200601_0.geojson";
pub static COUNTY_BOUNDARIES_PATH: &'static str = "../Dades/CatalunyaComarques/bm5mv21sh0tpc1_20200601_0.geojson";
pub static MUNICIPAL_POPULATION_PATH: &'static str = "../Dades/Població/Poblaci__de_Catalunya_per_municipi__rang_d_edat_i_sexe.csv";
pub static COUNTY_POPULATION_PATH: &'static str = "PoblacioComarques.csv";


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulationSource {
	MunicipalCsv{path: PathBuf, layout: MunicipalLayout},
	CountyApi{url: String},
	CountyCsv{path: PathBuf},
}

impl PopulationSource {
	pub fn load(&self) -> Result<Vec<PopulationRecord>> {
		match self {
			Self::MunicipalCsv{path, layout} => load_municipal_population(magic_open(path)?, layout),
			Self::CountyApi{url} => {
				let client = reqwest::blocking::Client::new();
				fetch_county_population(&client, url)
			},
			Self::CountyCsv{path} => load_county_population(magic_open(path)?),
		}
	}
}


#[derive(Debug, Clone)]
pub struct PipelineConfig {
	pub case_file: PathBuf,
	pub boundary_file: PathBuf,
	pub population: PopulationSource,
	pub excluded_case_type: SmartString,
	pub granularity: Granularity,
	pub period: Period,
	pub rate_mode: RateMode,
	pub output: PathBuf,
}

impl PipelineConfig {
	/// Share of each municipality's population with a confirmed case.
	pub fn municipality_cumulative() -> Self {
		Self{
			case_file: CASES_PATH.into(),
			boundary_file: MUNICIPALITY_BOUNDARIES_PATH.into(),
			population: PopulationSource::MunicipalCsv{
				path: MUNICIPAL_POPULATION_PATH.into(),
				layout: MunicipalLayout::default(),
			},
			excluded_case_type: SUSPECTED_CASE_TYPE.into(),
			granularity: Granularity::Municipality,
			period: Period::Cumulative,
			rate_mode: RateMode::Percent,
			output: "PositiusCovid19perMunicipi.geojson".into(),
		}
	}

	/// Weekly incidence per 100,000 inhabitants by municipality.
	pub fn municipality_weekly() -> Self {
		Self{
			period: Period::LastCompleteWeek,
			rate_mode: RateMode::Per100k,
			output: "PositiusCovid19SetmanalsperMunicipi.geojson".into(),
			..Self::municipality_cumulative()
		}
	}

	/// Weekly incidence per 100,000 inhabitants by county, with the
	/// population fetched live.
	pub fn county_weekly() -> Self {
		Self{
			case_file: CASES_PATH.into(),
			boundary_file: COUNTY_BOUNDARIES_PATH.into(),
			population: PopulationSource::CountyApi{url: IDESCAT_COUNTY_POPULATION_URL.into()},
			excluded_case_type: SUSPECTED_CASE_TYPE.into(),
			granularity: Granularity::County,
			period: Period::LastCompleteWeek,
			rate_mode: RateMode::Per100k,
			output: "PositiusCovid19SetmanalsperComarca.geojson".into(),
		}
	}

	pub fn case_filter(&self) -> CaseFilter {
		CaseFilter{
			excluded_case_type: self.excluded_case_type.clone(),
			granularity: self.granularity,
			period: self.period,
		}
	}

	pub fn apply_env(self) -> Result<Self> {
		self.apply_vars(|k| env::var(k).ok())
	}

	/// Override fields from `COVIDMAP_*` variables looked up with `get`.
	pub fn apply_vars<F: Fn(&str) -> Option<String>>(mut self, get: F) -> Result<Self> {
		if let Some(v) = get("COVIDMAP_CASES") {
			self.case_file = v.into();
		}
		if let Some(v) = get("COVIDMAP_BOUNDARIES") {
			self.boundary_file = v.into();
		}
		if let Some(v) = get("COVIDMAP_POPULATION") {
			self.population = if v.starts_with("http://") || v.starts_with("https://") {
				PopulationSource::CountyApi{url: v}
			} else {
				match (self.granularity, self.population) {
					(Granularity::Municipality, PopulationSource::MunicipalCsv{layout, ..}) => PopulationSource::MunicipalCsv{path: v.into(), layout},
					(Granularity::Municipality, _) => PopulationSource::MunicipalCsv{path: v.into(), layout: MunicipalLayout::default()},
					(Granularity::County, _) => PopulationSource::CountyCsv{path: v.into()},
				}
			};
		}
		if let Some(v) = get("COVIDMAP_POPULATION_ROWS") {
			let limit = match v.trim() {
				"none" | "" => None,
				s => Some(s.parse::<usize>().map_err(|_| Error::Number{
					column: "COVIDMAP_POPULATION_ROWS".into(),
					value: v.clone(),
				})?),
			};
			if let PopulationSource::MunicipalCsv{layout, ..} = &mut self.population {
				layout.row_limit = limit;
			}
		}
		if let Some(v) = get("COVIDMAP_EXCLUDE") {
			self.excluded_case_type = v.into();
		}
		if let Some(v) = get("COVIDMAP_OUTPUT") {
			self.output = v.into();
		}
		info!("{} map, {:?}, {} rate, population from {:?}", self.granularity, self.period, self.rate_mode, self.population);
		Ok(self)
	}
}
