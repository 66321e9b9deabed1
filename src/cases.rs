use std::collections::BTreeMap;
use std::io;

use log::{debug, info};

use serde::Deserialize;

use chrono::naive::NaiveDate;

use smartstring::alias::{String as SmartString};

use super::calendar::{parse_report_date, week_number};
use super::context::{Granularity, Period, UnitCode};
use super::error::Result;
use super::progress::{CountMeter, ProgressSink};


/// Case type excluded from all counts unless configured otherwise.
pub static SUSPECTED_CASE_TYPE: &'static str = "Sospitós";


#[derive(Debug, Deserialize)]
struct RawCaseRecord {
	#[serde(rename = "TipusCasData")]
	report_date: SmartString,
	#[serde(rename = "ComarcaCodi")]
	county_code: UnitCode,
	#[serde(rename = "ComarcaDescripcio", default)]
	county_name: Option<SmartString>,
	#[serde(rename = "MunicipiCodi", default)]
	municipality_code: Option<UnitCode>,
	#[serde(rename = "TipusCasDescripcio")]
	case_type: SmartString,
	#[serde(rename = "NumCasos")]
	case_count: u64,
}

impl RawCaseRecord {
	fn parse(self) -> Result<CaseRecord> {
		Ok(CaseRecord{
			report_date: parse_report_date(&self.report_date)?,
			county_code: self.county_code,
			county_name: self.county_name,
			municipality_code: self.municipality_code,
			case_type: self.case_type,
			case_count: self.case_count,
		})
	}
}


/// One row of the case register, usually pre-aggregated by date, place, sex
/// and case type.
#[derive(Debug, Clone)]
pub struct CaseRecord {
	pub report_date: NaiveDate,
	pub county_code: UnitCode,
	pub county_name: Option<SmartString>,
	pub municipality_code: Option<UnitCode>,
	pub case_type: SmartString,
	pub case_count: u64,
}

impl CaseRecord {
	pub fn week(&self) -> u32 {
		week_number(self.report_date)
	}
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedCaseCount {
	pub code: UnitCode,
	pub name: Option<SmartString>,
	pub week: Option<u32>,
	pub cases: u64,
}


/// Output of the filter/aggregate stage.
#[derive(Debug, Clone, Default)]
pub struct CaseAggregation {
	/// The week the counts belong to, for weekly aggregations that found one.
	pub week: Option<u32>,
	/// One entry per unit code, ordered by code.
	pub counts: Vec<AggregatedCaseCount>,
}

impl CaseAggregation {
	pub fn total(&self) -> u64 {
		self.counts.iter().map(|c| c.cases).sum()
	}
}


#[derive(Debug, Clone)]
pub struct CaseFilter {
	pub excluded_case_type: SmartString,
	pub granularity: Granularity,
	pub period: Period,
}

impl CaseFilter {
	pub fn new(granularity: Granularity, period: Period) -> Self {
		Self{
			excluded_case_type: SUSPECTED_CASE_TYPE.into(),
			granularity,
			period,
		}
	}

	/// Case type is not excluded and the case is geolocated.
	pub fn accepts(&self, rec: &CaseRecord) -> bool {
		rec.case_type != self.excluded_case_type && rec.municipality_code.is_some()
	}

	fn key<'r>(&self, rec: &'r CaseRecord) -> Option<(&'r UnitCode, Option<&'r SmartString>)> {
		match self.granularity {
			Granularity::Municipality => Some((rec.municipality_code.as_ref()?, None)),
			Granularity::County => Some((&rec.county_code, rec.county_name.as_ref())),
		}
	}

	pub fn apply(&self, records: Vec<CaseRecord>) -> CaseAggregation {
		let nin = records.len();
		let accepted: Vec<CaseRecord> = records.into_iter().filter(|r| self.accepts(r)).collect();
		info!("{} of {} case rows are confirmed and geolocated", accepted.len(), nin);
		match self.period {
			Period::Cumulative => CaseAggregation{
				week: None,
				counts: self.aggregate(&accepted, None),
			},
			Period::LastCompleteWeek => {
				let (week, selected) = select_last_complete_week(accepted, CaseRecord::week);
				match week {
					Some(w) => info!("selected week {} ({} case rows)", w, selected.len()),
					None => info!("no complete week in the case data"),
				}
				CaseAggregation{
					week,
					counts: self.aggregate(&selected, week),
				}
			},
		}
	}

	/// Sum case counts per unit code. County names are taken from the first
	/// record of each code.
	pub fn aggregate(&self, records: &[CaseRecord], week: Option<u32>) -> Vec<AggregatedCaseCount> {
		let mut by_code: BTreeMap<&UnitCode, AggregatedCaseCount> = BTreeMap::new();
		for rec in records.iter() {
			let (code, name) = match self.key(rec) {
				Some(k) => k,
				None => continue,
			};
			let entry = by_code.entry(code).or_insert_with(|| AggregatedCaseCount{
				code: code.clone(),
				name: name.cloned(),
				week,
				cases: 0,
			});
			entry.cases += rec.case_count;
		}
		debug!("aggregated cases into {} units", by_code.len());
		by_code.into_iter().map(|(_, v)| v).collect()
	}
}


/// Keep only the items of the week before the latest week present.
///
/// The latest week is assumed to be still incomplete. Returns the selected
/// week, or `None` if there are no items or the latest week is week 0.
pub fn select_last_complete_week<T, F: Fn(&T) -> u32>(items: Vec<T>, week_of: F) -> (Option<u32>, Vec<T>) {
	let last_week = match items.iter().map(|i| week_of(i)).max().and_then(|w| w.checked_sub(1)) {
		Some(w) => w,
		None => return (None, Vec::new()),
	};
	let selected = items.into_iter().filter(|i| week_of(i) == last_week).collect();
	(Some(last_week), selected)
}


pub fn load_case_records<R: io::Read, S: ProgressSink + ?Sized>(
	r: R,
	progress: &mut S,
) -> Result<Vec<CaseRecord>> {
	let mut r = csv::Reader::from_reader(r);
	let mut pm = CountMeter::new(progress);
	let mut result = Vec::new();
	for row in r.deserialize() {
		let raw: RawCaseRecord = row?;
		result.push(raw.parse()?);
		pm.tick();
	}
	let n = pm.finish();
	info!("loaded {} case rows", n);
	Ok(result)
}
