use std::io;
use std::ops::Range;

use log::{debug, info};

use bytes::Bytes;

use serde::{Deserialize, Serialize};

use smartstring::alias::{String as SmartString};

use super::context::{pad_then_truncate, UnitCode, MUNICIPALITY_CODE_LEN, POPULATION_CODE_PAD};
use super::error::{Error, Result};


pub static IDESCAT_COUNTY_POPULATION_URL: &'static str = "https://api.idescat.cat/emex/v1/dades.xml?i=f171&tipus=com";


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRecord {
	pub code: UnitCode,
	pub name: Option<SmartString>,
	/// `None` when the source had a gap in one of the summed columns.
	pub population: Option<u64>,
}


/// Column layout of the municipal population-by-age-and-sex table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MunicipalLayout {
	pub code_column: String,
	pub name_column: Option<String>,
	/// Zero-based column indices summed into the total population.
	pub total_columns: Range<usize>,
	/// Only the first `row_limit` data rows are used.
	pub row_limit: Option<usize>,
}

impl Default for MunicipalLayout {
	fn default() -> Self {
		Self{
			code_column: "Codi".into(),
			name_column: Some("Literal".into()),
			total_columns: 8..11,
			row_limit: Some(947),
		}
	}
}


fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
	headers.iter().position(|h| h.trim() == name)
}

fn sum_columns(rec: &csv::StringRecord, headers: &csv::StringRecord, columns: &Range<usize>) -> Result<Option<u64>> {
	let mut total: u64 = 0;
	for i in columns.clone() {
		let v = match rec.get(i) {
			Some(v) => v.trim(),
			None => return Err(Error::MissingColumn(format!("#{}", i))),
		};
		if v.is_empty() {
			return Ok(None)
		}
		let n = v.parse::<u64>().map_err(|_| Error::Number{
			column: headers.get(i).unwrap_or("").into(),
			value: v.into(),
		})?;
		total += n;
	}
	Ok(Some(total))
}

pub fn load_municipal_population<R: io::Read>(r: R, layout: &MunicipalLayout) -> Result<Vec<PopulationRecord>> {
	let mut r = csv::Reader::from_reader(r);
	let headers = r.headers()?.clone();
	let code_index = column_index(&headers, &layout.code_column)
		.ok_or_else(|| Error::MissingColumn(layout.code_column.clone()))?;
	let name_index = layout.name_column.as_ref().and_then(|name| column_index(&headers, name));
	if layout.total_columns.end > headers.len() {
		return Err(Error::MissingColumn(format!("#{}", layout.total_columns.end - 1)))
	}
	debug!(
		"summing population columns {:?}",
		layout.total_columns.clone().filter_map(|i| headers.get(i)).collect::<Vec<_>>(),
	);

	let limit = layout.row_limit.unwrap_or(usize::MAX);
	let mut result = Vec::new();
	for row in r.records().take(limit) {
		let rec = row?;
		let raw_code = rec.get(code_index).unwrap_or("");
		result.push(PopulationRecord{
			code: pad_then_truncate(raw_code, POPULATION_CODE_PAD, MUNICIPALITY_CODE_LEN),
			name: name_index.and_then(|i| rec.get(i)).map(|s| s.into()),
			population: sum_columns(&rec, &headers, &layout.total_columns)?,
		});
	}
	info!("loaded population for {} municipalities", result.len());
	Ok(result)
}


fn nth_element<'a, 'input>(node: roxmltree::Node<'a, 'input>, n: usize) -> Option<roxmltree::Node<'a, 'input>> {
	node.children().filter(|c| c.is_element()).nth(n)
}

/// Parse an EMEX `dades.xml` response for the population indicator.
///
/// The values are a `", "` separated list in the second element of the
/// first element of the second element below the root. Codes and names
/// come from the `col` elements, positionally aligned with the values.
pub fn parse_county_population(xml: &str) -> Result<Vec<PopulationRecord>> {
	let doc = roxmltree::Document::parse(xml)?;
	let values_node = nth_element(doc.root_element(), 1)
		.and_then(|n| nth_element(n, 0))
		.and_then(|n| nth_element(n, 1))
		.ok_or(Error::MalformedResponse("no population values element"))?;
	let text = values_node.text().ok_or(Error::MalformedResponse("empty population values"))?;
	let mut values = Vec::new();
	for v in text.split(", ") {
		let v = v.trim();
		values.push(v.parse::<u64>().map_err(|_| Error::Number{
			column: "poblacio".into(),
			value: v.into(),
		})?);
	}

	let mut cols = Vec::new();
	for node in doc.descendants().filter(|n| n.has_tag_name("col")) {
		let id = node.attribute("id").ok_or(Error::MalformedResponse("col without id"))?;
		cols.push((UnitCode::from(id), node.text().map(SmartString::from)));
	}

	if cols.len() != values.len() {
		return Err(Error::LengthMismatch{codes: cols.len(), values: values.len()})
	}
	Ok(cols.into_iter().zip(values.into_iter()).map(|((code, name), population)| PopulationRecord{
		code,
		name,
		population: Some(population),
	}).collect())
}

pub fn fetch_county_population(client: &reqwest::blocking::Client, url: &str) -> Result<Vec<PopulationRecord>> {
	info!("requesting county population from {}", url);
	let body: Bytes = client.get(url).send()?.error_for_status()?.bytes()?;
	debug!("received {} bytes", body.len());
	let text = std::str::from_utf8(&body[..]).map_err(|_| Error::MalformedResponse("response is not utf-8"))?;
	let result = parse_county_population(text)?;
	info!("received population for {} counties", result.len());
	Ok(result)
}


#[derive(Debug, Clone, Serialize, Deserialize)]
struct CountyPopulationRow {
	codi: SmartString,
	comarca: SmartString,
	poblacio: Option<u64>,
}

pub fn write_county_population<W: io::Write>(w: W, records: &[PopulationRecord]) -> Result<()> {
	let mut w = csv::Writer::from_writer(w);
	for rec in records.iter() {
		w.serialize(CountyPopulationRow{
			codi: rec.code.0.clone(),
			comarca: rec.name.clone().unwrap_or_default(),
			poblacio: rec.population,
		})?;
	}
	w.flush()?;
	Ok(())
}

pub fn load_county_population<R: io::Read>(r: R) -> Result<Vec<PopulationRecord>> {
	let mut r = csv::Reader::from_reader(r);
	let mut result = Vec::new();
	for row in r.deserialize() {
		let rec: CountyPopulationRow = row?;
		result.push(PopulationRecord{
			code: UnitCode(rec.codi),
			name: Some(rec.comarca),
			population: rec.poblacio,
		});
	}
	info!("loaded population for {} counties", result.len());
	Ok(result)
}
