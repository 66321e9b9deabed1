use covidmap::PipelineConfig;


fn main() -> Result<(), Box<dyn std::error::Error>> {
	covidmap::init_logging();
	let config = PipelineConfig::municipality_weekly().apply_env()?;
	let result = covidmap::run_to_file(&config, &mut *covidmap::default_output())?;
	if !result.report.is_clean() {
		println!("{} data integrity warnings, see log", result.report.warnings.len());
	}
	Ok(())
}
