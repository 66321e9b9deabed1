use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use log::{info, warn};

use smartstring::alias::{String as SmartString};

use super::boundary::GeographicUnit;
use super::cases::CaseAggregation;
use super::context::UnitCode;
use super::population::PopulationRecord;


/// Join keys or values that do not line up. Never fatal; the affected
/// rows keep a null or non-finite rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityWarning {
	/// A boundary unit has no population record at all.
	UnmatchedUnit{code: UnitCode, name: Option<SmartString>},
	/// A population record exists but its total is null.
	NullPopulation{code: UnitCode},
	ZeroPopulation{code: UnitCode},
	/// Cases were reported for a code without a boundary unit; they do not
	/// appear on the map.
	UnmatchedCases{code: UnitCode, cases: u64},
	/// More than one population record for a code; the first one is used.
	DuplicatePopulation{code: UnitCode},
}

impl fmt::Display for IntegrityWarning {
	fn fmt<'f>(&self, f: &'f mut fmt::Formatter) -> fmt::Result {
		match self {
			Self::UnmatchedUnit{code, name: Some(name)} => write!(f, "no population for {} ({})", code, name),
			Self::UnmatchedUnit{code, name: None} => write!(f, "no population for {}", code),
			Self::NullPopulation{code} => write!(f, "null population for {}", code),
			Self::ZeroPopulation{code} => write!(f, "zero population for {}", code),
			Self::UnmatchedCases{code, cases} => write!(f, "{} cases for unknown unit {}", cases, code),
			Self::DuplicatePopulation{code} => write!(f, "duplicate population record for {}", code),
		}
	}
}


#[derive(Debug, Clone, Default)]
pub struct JoinReport {
	pub warnings: Vec<IntegrityWarning>,
}

impl JoinReport {
	fn push(&mut self, w: IntegrityWarning) {
		warn!("{}", w);
		self.warnings.push(w);
	}

	pub fn is_clean(&self) -> bool {
		self.warnings.is_empty()
	}
}


/// A boundary unit with its population and case count.
#[derive(Debug, Clone)]
pub struct JoinedUnit {
	pub unit: GeographicUnit,
	pub population: Option<u64>,
	/// Zero when no aggregated count matched.
	pub cases: u64,
}


/// Left-join population and aggregated cases onto the boundary units.
///
/// Every unit appears exactly once, in input order.
pub fn join_units(
	units: Vec<GeographicUnit>,
	population: &[PopulationRecord],
	cases: &CaseAggregation,
) -> (Vec<JoinedUnit>, JoinReport) {
	let mut report = JoinReport::default();

	let mut population_by_code: HashMap<&UnitCode, &PopulationRecord> = HashMap::with_capacity(population.len());
	for rec in population.iter() {
		match population_by_code.entry(&rec.code) {
			Entry::Occupied(_) => report.push(IntegrityWarning::DuplicatePopulation{code: rec.code.clone()}),
			Entry::Vacant(e) => {
				e.insert(rec);
			},
		}
	}

	let mut cases_by_code: HashMap<&UnitCode, u64> = HashMap::with_capacity(cases.counts.len());
	for c in cases.counts.iter() {
		*cases_by_code.entry(&c.code).or_insert(0) += c.cases;
	}

	let mut matched_cases: u64 = 0;
	let mut result = Vec::with_capacity(units.len());
	for unit in units.into_iter() {
		let population = match population_by_code.get(&unit.code) {
			Some(rec) => {
				match rec.population {
					None => report.push(IntegrityWarning::NullPopulation{code: unit.code.clone()}),
					Some(0) => report.push(IntegrityWarning::ZeroPopulation{code: unit.code.clone()}),
					Some(_) => (),
				};
				rec.population
			},
			None => {
				report.push(IntegrityWarning::UnmatchedUnit{
					code: unit.code.clone(),
					name: unit.name.clone(),
				});
				None
			},
		};
		let unit_cases = cases_by_code.remove(&unit.code).unwrap_or(0);
		matched_cases += unit_cases;
		result.push(JoinedUnit{
			unit,
			population,
			cases: unit_cases,
		});
	}

	// whatever is left did not match any unit
	let mut leftover: Vec<(&UnitCode, u64)> = cases_by_code.into_iter().collect();
	leftover.sort();
	for (code, n) in leftover {
		report.push(IntegrityWarning::UnmatchedCases{code: code.clone(), cases: n});
	}

	info!(
		"joined {} units ({} of {} cases placed, {} warnings)",
		result.len(), matched_cases, cases.total(), report.warnings.len(),
	);
	(result, report)
}


#[cfg(test)]
mod tests {
	use super::*;

	use geojson::Feature;

	use crate::cases::AggregatedCaseCount;

	fn unit(code: &str, name: &str) -> GeographicUnit {
		GeographicUnit{
			code: code.into(),
			name: Some(name.into()),
			feature: Feature{
				bbox: None,
				geometry: None,
				id: None,
				properties: None,
				foreign_members: None,
			},
		}
	}

	fn pop(code: &str, n: Option<u64>) -> PopulationRecord {
		PopulationRecord{code: code.into(), name: None, population: n}
	}

	fn counts(v: &[(&str, u64)]) -> CaseAggregation {
		CaseAggregation{
			week: Some(4),
			counts: v.iter().map(|(code, cases)| AggregatedCaseCount{
				code: (*code).into(),
				name: None,
				week: Some(4),
				cases: *cases,
			}).collect(),
		}
	}

	#[test]
	fn every_unit_once_and_zero_filled() {
		let units = vec![unit("08019", "Barcelona"), unit("08101", "L'Hospitalet"), unit("25120", "Lleida")];
		let population = vec![pop("08019", Some(1_600_000)), pop("08101", Some(260_000)), pop("25120", Some(140_000))];
		let (rows, report) = join_units(units, &population, &counts(&[("08019", 900), ("25120", 12)]));
		assert!(report.is_clean());
		let got: Vec<(&str, Option<u64>, u64)> = rows.iter()
			.map(|r| (r.unit.code.as_str(), r.population, r.cases))
			.collect();
		assert_eq!(got, vec![
			("08019", Some(1_600_000), 900),
			("08101", Some(260_000), 0),
			("25120", Some(140_000), 12),
		]);
	}

	#[test]
	fn empty_aggregation_still_yields_all_units() {
		let units = vec![unit("01", "Alt Camp"), unit("02", "Alt Empordà")];
		let population = vec![pop("01", Some(45_000)), pop("02", Some(140_000))];
		let (rows, _) = join_units(units, &population, &CaseAggregation::default());
		assert_eq!(rows.len(), 2);
		assert!(rows.iter().all(|r| r.cases == 0));
	}

	#[test]
	fn population_gaps_are_reported_not_fixed() {
		let units = vec![unit("08019", "Barcelona"), unit("08101", "L'Hospitalet"), unit("25120", "Lleida"), unit("17079", "Girona")];
		let population = vec![pop("08019", None), pop("25120", Some(0)), pop("17079", Some(100_000)), pop("17079", Some(1))];
		let (rows, report) = join_units(units, &population, &counts(&[("43148", 3)]));
		assert_eq!(rows[0].population, None);
		assert_eq!(rows[1].population, None);
		assert_eq!(rows[2].population, Some(0));
		// first record wins
		assert_eq!(rows[3].population, Some(100_000));
		assert_eq!(report.warnings, vec![
			IntegrityWarning::DuplicatePopulation{code: "17079".into()},
			IntegrityWarning::NullPopulation{code: "08019".into()},
			IntegrityWarning::UnmatchedUnit{code: "08101".into(), name: Some("L'Hospitalet".into())},
			IntegrityWarning::ZeroPopulation{code: "25120".into()},
			IntegrityWarning::UnmatchedCases{code: "43148".into(), cases: 3},
		]);
	}
}
