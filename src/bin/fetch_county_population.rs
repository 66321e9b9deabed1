use covidmap::{COUNTY_POPULATION_PATH, IDESCAT_COUNTY_POPULATION_URL};


fn main() -> Result<(), Box<dyn std::error::Error>> {
	covidmap::init_logging();
	let argv: Vec<String> = std::env::args().collect();
	let outfile = argv.get(1).map(|s| s.as_str()).unwrap_or(COUNTY_POPULATION_PATH);
	let url = argv.get(2).map(|s| s.as_str()).unwrap_or(IDESCAT_COUNTY_POPULATION_URL);

	let client = reqwest::blocking::Client::new();
	let records = covidmap::fetch_county_population(&client, url)?;
	println!("writing {} counties to {} ...", records.len(), outfile);
	covidmap::write_county_population(covidmap::create_output(outfile)?, &records)?;
	Ok(())
}
