use std::fs;
use std::path::PathBuf;

use covidmap::{
	ErrorKind, Granularity, IntegrityWarning, NullSink, PipelineConfig, PopulationSource,
	CASES_PROPERTY, RATE_PROPERTY, WEEK_PROPERTY,
};


static CASES: &'static str = concat!(
	"TipusCasData,ComarcaCodi,ComarcaDescripcio,MunicipiCodi,MunicipiDescripcio,SexeCodi,SexeDescripcio,TipusCasDescripcio,NumCasos\n",
	"01/10/2020,13,BARCELONES,08019,Barcelona,0,Home,Positiu PCR,30\n",
	"05/10/2020,13,BARCELONES,08019,Barcelona,1,Dona,Positiu PCR,20\n",
	"06/10/2020,13,BARCELONES,08019,Barcelona,1,Dona,Sospitós,70\n",
	"07/10/2020,13,BARCELONES,,,0,Home,Positiu PCR,11\n",
	"08/10/2020,13,BARCELONES,08101,L'Hospitalet de Llobregat,0,Home,Positiu TAR,4\n",
	"09/10/2020,33,SEGRIA,25120,Lleida,1,Dona,Epidemiològic,7\n",
	"12/10/2020,33,SEGRIA,25120,Lleida,1,Dona,Positiu PCR,5\n",
);

static MUNICIPIS: &'static str = r#"{"type": "FeatureCollection", "features": [
	{"type": "Feature", "properties": {"CODIMUNI": "080193", "NOMMUNI": "Barcelona"}, "geometry": null},
	{"type": "Feature", "properties": {"CODIMUNI": "081015", "NOMMUNI": "L'Hospitalet de Llobregat"}, "geometry": null},
	{"type": "Feature", "properties": {"CODIMUNI": "251207", "NOMMUNI": "Lleida"}, "geometry": null},
	{"type": "Feature", "properties": {"CODIMUNI": "170792", "NOMMUNI": "Girona"}, "geometry": null}
]}"#;

static COMARQUES: &'static str = r#"{"type": "FeatureCollection", "features": [
	{"type": "Feature", "properties": {"CODICOMAR": "13", "NOMCOMAR": "Barcelonès"}, "geometry": null},
	{"type": "Feature", "properties": {"CODICOMAR": "33", "NOMCOMAR": "Segrià"}, "geometry": null},
	{"type": "Feature", "properties": {"CODICOMAR": "01", "NOMCOMAR": "Alt Camp"}, "geometry": null}
]}"#;

static POBLACIO: &'static str = concat!(
	"Any,Codi,Literal,Sexe,Edat0,Edat1,Edat2,Edat3,Total0a14,Total15a64,Total65iMes\n",
	"2020,80193,Barcelona,Total,0,0,0,0,200000,1000000,400000\n",
	"2020,81015,L'Hospitalet de Llobregat,Total,0,0,0,0,40000,160000,60000\n",
	"2020,251207,Lleida,Total,0,0,0,0,20000,90000,30000\n",
);

static POBLACIO_COMARQUES: &'static str = "codi,comarca,poblacio\n13,Barcelonès,2300000\n33,Segrià,210000\n01,Alt Camp,45000\n";


struct Fixture {
	dir: PathBuf,
}

impl Fixture {
	fn new(name: &str) -> Self {
		let dir = std::env::temp_dir().join(format!("covidmap-{}-{}", name, std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		for (file, body) in [
			("cases.csv", CASES),
			("municipis.geojson", MUNICIPIS),
			("comarques.geojson", COMARQUES),
			("poblacio.csv", POBLACIO),
			("PoblacioComarques.csv", POBLACIO_COMARQUES),
		].iter() {
			fs::write(dir.join(file), body).unwrap();
		}
		Self{dir}
	}

	fn path(&self, file: &str) -> PathBuf {
		self.dir.join(file)
	}

	fn municipal(&self, mut config: PipelineConfig) -> PipelineConfig {
		config.case_file = self.path("cases.csv");
		config.boundary_file = self.path("municipis.geojson");
		if let PopulationSource::MunicipalCsv{layout, ..} = config.population {
			config.population = PopulationSource::MunicipalCsv{path: self.path("poblacio.csv"), layout};
		}
		config.output = self.path("out.geojson");
		config
	}
}

impl Drop for Fixture {
	fn drop(&mut self) {
		let _ = fs::remove_dir_all(&self.dir);
	}
}


#[test]
fn municipality_cumulative_percent() {
	let fx = Fixture::new("cumulative");
	let config = fx.municipal(PipelineConfig::municipality_cumulative());
	let result = covidmap::run(&config, &mut NullSink()).unwrap();
	let ds = &result.dataset;
	assert_eq!(ds.len(), 4);
	assert_eq!(ds.week(), None);
	let rows: Vec<(&str, u64, Option<f64>)> = ds.rows().iter()
		.map(|r| (r.joined.unit.code.as_str(), r.joined.cases, r.rate))
		.collect();
	assert_eq!(rows, vec![
		("08019", 50, Some(0.0)),
		("08101", 4, Some(0.0)),
		("25120", 12, Some(0.0)),
		("17079", 0, None),
	]);
	assert_eq!(result.report.warnings, vec![
		IntegrityWarning::UnmatchedUnit{code: "17079".into(), name: Some("Girona".into())},
	]);
}

#[test]
fn municipality_weekly_incidence() {
	let fx = Fixture::new("weekly");
	let config = fx.municipal(PipelineConfig::municipality_weekly());
	let result = covidmap::run_to_file(&config, &mut NullSink()).unwrap();
	let ds = &result.dataset;
	assert_eq!(ds.week(), Some(40));
	// 20 / 1.6M, 4 / 260k, 7 / 140k
	let rates: Vec<Option<f64>> = ds.rows().iter().map(|r| r.rate).collect();
	assert_eq!(rates, vec![Some(1.0), Some(2.0), Some(5.0), None]);
	assert_eq!(ds.total_cases(), 31);

	let written: serde_json::Value = serde_json::from_str(&fs::read_to_string(&config.output).unwrap()).unwrap();
	let props = &written["features"][2]["properties"];
	assert_eq!(props["NOMMUNI"], serde_json::json!("Lleida"));
	assert_eq!(props[CASES_PROPERTY], serde_json::json!(7));
	assert_eq!(props[WEEK_PROPERTY], serde_json::json!(40));
	assert_eq!(props[RATE_PROPERTY], serde_json::json!(5.0));
	assert_eq!(written["features"][3]["properties"][RATE_PROPERTY], serde_json::Value::Null);
}

#[test]
fn county_weekly_from_saved_population() {
	let fx = Fixture::new("county");
	let mut config = PipelineConfig::county_weekly();
	config.case_file = fx.path("cases.csv");
	config.boundary_file = fx.path("comarques.geojson");
	config.population = PopulationSource::CountyCsv{path: fx.path("PoblacioComarques.csv")};
	let result = covidmap::run(&config, &mut NullSink()).unwrap();
	let ds = &result.dataset;
	assert_eq!(ds.granularity(), Granularity::County);
	let rows: Vec<(&str, u64, Option<f64>)> = ds.rows().iter()
		.map(|r| (r.joined.unit.code.as_str(), r.joined.cases, r.rate))
		.collect();
	assert_eq!(rows, vec![
		("13", 24, Some(1.0)),
		("33", 7, Some(3.0)),
		("01", 0, Some(0.0)),
	]);
	assert!(result.report.is_clean());
}

#[test]
fn missing_case_file_is_io_failure() {
	let fx = Fixture::new("missing");
	let mut config = fx.municipal(PipelineConfig::municipality_cumulative());
	config.case_file = fx.path("nope.csv");
	match covidmap::run(&config, &mut NullSink()) {
		Err(e) => assert_eq!(e.kind(), ErrorKind::IoFailure),
		Ok(_) => panic!("ran without a case file"),
	}
}
