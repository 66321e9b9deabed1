use log::info;

use super::boundary::{load_boundaries, GeographicUnit};
use super::cases::{load_case_records, CaseAggregation};
use super::config::PipelineConfig;
use super::error::Result;
use super::ioutil::{create_output, magic_open};
use super::join::{join_units, JoinReport};
use super::output::MapDataset;
use super::population::PopulationRecord;
use super::progress::ProgressSink;
use super::rate::RateMode;
use super::context::Granularity;


pub struct PipelineOutput {
	pub dataset: MapDataset,
	pub report: JoinReport,
}


/// Join and rate already loaded inputs.
pub fn assemble(
	granularity: Granularity,
	rate_mode: RateMode,
	units: Vec<GeographicUnit>,
	population: &[PopulationRecord],
	cases: &CaseAggregation,
) -> PipelineOutput {
	let (joined, report) = join_units(units, population, cases);
	PipelineOutput{
		dataset: MapDataset::new(granularity, rate_mode, cases.week, joined),
		report,
	}
}

pub fn run<S: ProgressSink + ?Sized>(config: &PipelineConfig, progress: &mut S) -> Result<PipelineOutput> {
	let units = load_boundaries(magic_open(&config.boundary_file)?, config.granularity)?;
	let population = config.population.load()?;
	let records = load_case_records(magic_open(&config.case_file)?, progress)?;
	let cases = config.case_filter().apply(records);
	Ok(assemble(config.granularity, config.rate_mode, units, &population, &cases))
}

/// Run the pipeline and write the map dataset to the configured output.
pub fn run_to_file<S: ProgressSink + ?Sized>(config: &PipelineConfig, progress: &mut S) -> Result<PipelineOutput> {
	let result = run(config, progress)?;
	result.dataset.write_geojson(create_output(&config.output)?)?;
	match result.dataset.week() {
		Some(week) => info!("wrote {} units for week {} to {}", result.dataset.len(), week, config.output.display()),
		None => info!("wrote {} units to {}", result.dataset.len(), config.output.display()),
	}
	Ok(result)
}
