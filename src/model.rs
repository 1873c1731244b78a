/*!
Driving one hillslope model run.

A run writes three input files into the workspace (parameter deck, storm
deck, run directive), invokes the model on the run directive, and on
success rewrites the summary with the station's annual precipitation.
Decks written before a failed run are left in place.
*/
use crate::config::{RunConfig, ScenarioFile};
use crate::deck::{read_parameter_deck, write_parameter_deck};
use crate::error::{Result, RhemError};
use crate::parameters::Parameters;
use crate::runner::ModelRunner;
use crate::site::SiteAttributes;
use crate::soil_texture::SoilTextureTable;
use crate::storm::{StormDeckHeader, StormFilter, archive_path, read_archive, write_storm_deck};
use crate::summary::append_to_summary;
use chrono::NaiveDateTime;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

// Characters of the scenario name used in file names
pub const FILE_STEM_CHARS: usize = 15;

pub const BUILD_DATE_FORMAT: &str = "%B %d, %Y, %I:%M %p";

// Fixed trailing options of the run directive
const RUN_OPTIONS: &str = "0, 2, y, y, n, n, y";

/// Date stamp written into deck headers, e.g. `May 01, 2024, 10:05 AM`.
pub fn build_date(now: NaiveDateTime) -> String {
    now.format(BUILD_DATE_FORMAT).to_string()
}

/// Names of the files belonging to one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioFiles {
    pub parameter: String,
    pub storm: String,
    pub summary: String,
    pub detailed_output: String,
    pub run: String,
}

impl ScenarioFiles {
    pub fn new(scenario_name: &str) -> Self {
        let stem: String = scenario_name.chars().take(FILE_STEM_CHARS).collect();
        ScenarioFiles {
            parameter: format!("scenario_input_{stem}.par"),
            storm: format!("storm_input_{stem}.pre"),
            summary: format!("scenario_output_summary_{stem}.sum"),
            detailed_output: format!("scenario_output_summary_{stem}.out"),
            run: format!("{stem}.run"),
        }
    }

    /// The single line the model reads from the run file.
    pub fn run_directive(&self, scenario_name: &str) -> String {
        format!(
            "{}, {}, {}, \"{}\", {}",
            self.parameter, self.storm, self.summary, scenario_name, RUN_OPTIONS
        )
    }
}

/// Paths produced by a successful run.
#[derive(Debug, Clone)]
pub struct ModelRun {
    pub parameter_file: PathBuf,
    pub storm_file: PathBuf,
    pub summary_file: PathBuf,
    pub detailed_output_file: PathBuf,
    pub storms: usize, // Events written to the storm deck
}

/// One scenario's files in a workspace.
#[derive(Debug, Clone)]
pub struct RhemModel {
    pub workspace: PathBuf,
    pub cligen_dir: PathBuf,
    pub state_id: String,
    pub station_id: String,
    pub scenario_name: String,
    pub built: String,
    pub files: ScenarioFiles,
}

impl RhemModel {
    pub fn new(
        workspace: impl Into<PathBuf>,
        cligen_dir: impl Into<PathBuf>,
        state_id: &str,
        station_id: &str,
        scenario_name: &str,
        built: &str,
    ) -> Self {
        RhemModel {
            workspace: workspace.into(),
            cligen_dir: cligen_dir.into(),
            state_id: state_id.to_string(),
            station_id: station_id.to_string(),
            scenario_name: scenario_name.to_string(),
            built: built.to_string(),
            files: ScenarioFiles::new(scenario_name),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.workspace.join(name)
    }

    pub fn generate_param_file(&self, p: &Parameters) -> Result<()> {
        write_parameter_deck(
            &self.path(&self.files.parameter),
            p,
            &self.scenario_name,
            &self.built,
        )
    }

    /// Write the storm deck with the station's events above `ke`.
    /// Returns the number of events written.
    pub fn generate_storm_file(&self, ke: f64) -> Result<usize> {
        let archive = archive_path(&self.cligen_dir, &self.state_id, &self.station_id);
        debug!("storm archive {}", archive.display());
        let events = read_archive(&archive)?;
        let storms = StormFilter::new(ke).select(&events);
        let header = StormDeckHeader {
            scenario_name: &self.scenario_name,
            built: &self.built,
            state_id: &self.state_id,
            station_id: &self.station_id,
        };
        write_storm_deck(&self.path(&self.files.storm), &header, &storms)?;
        Ok(storms.len())
    }

    pub fn generate_run_file(&self) -> Result<()> {
        let line = format!("{}\n", self.files.run_directive(&self.scenario_name));
        fs::write(self.path(&self.files.run), line)
            .map_err(|e| RhemError::io("Problem in generating the run file", e))
    }

    pub fn append_to_summary(&self, avg_yearly_precip: f64) -> Result<()> {
        append_to_summary(&self.path(&self.files.summary), avg_yearly_precip)
    }

    /// Write all decks, run the model and rewrite its summary.
    pub fn run(
        &self,
        p: &Parameters,
        runner: &dyn ModelRunner,
        avg_yearly_precip: f64,
    ) -> Result<ModelRun> {
        info!("scenario '{}' in {}", self.scenario_name, self.workspace.display());
        self.generate_param_file(p)?;
        let storms = self.generate_storm_file(p.ke)?;
        self.generate_run_file()?;

        runner.run(&self.path(&self.files.run))?;
        self.append_to_summary(avg_yearly_precip)?;

        Ok(ModelRun {
            parameter_file: self.path(&self.files.parameter),
            storm_file: self.path(&self.files.storm),
            summary_file: self.path(&self.files.summary),
            detailed_output_file: self.path(&self.files.detailed_output),
            storms,
        })
    }
}

/// Derive parameters for a scenario and run the model on them.
pub fn run_scenario(
    config: &RunConfig,
    textures: &SoilTextureTable,
    scenario: ScenarioFile,
    runner: &dyn ModelRunner,
    built: &str,
) -> Result<(Parameters, ModelRun)> {
    let site = SiteAttributes::new(scenario.site)?;
    let parameters = Parameters::derive(&site, textures)?;
    let model = RhemModel::new(
        &config.workspace,
        &config.cligen_dir,
        &site.state_id,
        &site.climate_station_id,
        &site.scenario_name,
        built,
    );
    let run = model.run(&parameters, runner, scenario.avg_yearly_precip_mm)?;
    Ok((parameters, run))
}

/// Station and precipitation of a run with a user-edited parameter deck.
#[derive(Debug, Clone)]
pub struct EditedRun<'a> {
    pub scenario_name: &'a str,
    pub state_id: &'a str,
    pub station_id: &'a str,
    pub avg_yearly_precip: f64,
}

/// Run the model on a parameter deck edited by hand. The deck is
/// re-rendered into the workspace before the run.
pub fn run_edited_deck(
    config: &RunConfig,
    deck: &Path,
    edited: &EditedRun,
    runner: &dyn ModelRunner,
    built: &str,
) -> Result<(Parameters, ModelRun)> {
    let parameters = read_parameter_deck(deck)?;
    let model = RhemModel::new(
        &config.workspace,
        &config.cligen_dir,
        edited.state_id,
        edited.station_id,
        edited.scenario_name,
        built,
    );
    let run = model.run(&parameters, runner, edited.avg_yearly_precip)?;
    Ok((parameters, run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::tests::sample_input;
    use crate::storm::ARCHIVE_HEADER_LINES;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rhem_model_{name}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_archive(cligen: &Path) {
        let path = archive_path(cligen, "AZ", "026180");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut text = "header\n".repeat(ARCHIVE_HEADER_LINES);
        text.push_str("    1    3    7    1   40.0   0.50   0.25   3.10\n");
        text.push_str("    2   14    8    1    0.5   8.00   0.40   1.00\n");
        text.push_str("    3   20    8    1   25.0   1.00   0.30   2.00\n");
        fs::write(path, text).unwrap();
    }

    // Records the run file and plays the model's part by writing a summary
    struct FakeModel {
        calls: RefCell<Vec<PathBuf>>,
        succeed: bool,
    }

    impl ModelRunner for FakeModel {
        fn run(&self, run_file: &Path) -> Result<()> {
            self.calls.borrow_mut().push(run_file.to_path_buf());
            if !self.succeed {
                return Err(RhemError::ExternalRun {
                    program: PathBuf::from("rhem"),
                    status: 2,
                });
            }
            let dir = run_file.parent().unwrap();
            let mut text = String::from("banner\nbanner\n\n");
            for i in 4..=13 {
                text.push_str(&format!(" Avg-Value {i}.0\n"));
            }
            fs::write(dir.join("scenario_output_summary_Baseline.sum"), text).unwrap();
            Ok(())
        }
    }

    #[test]
    fn file_names_use_first_15_chars() {
        let files = ScenarioFiles::new("Heavily grazed pasture");
        assert_eq!(files.parameter, "scenario_input_Heavily grazed .par");
        assert_eq!(files.storm, "storm_input_Heavily grazed .pre");
        assert_eq!(files.summary, "scenario_output_summary_Heavily grazed .sum");
        assert_eq!(files.detailed_output, "scenario_output_summary_Heavily grazed .out");
        assert_eq!(files.run, "Heavily grazed .run");
    }

    #[test]
    fn short_names_are_kept() {
        assert_eq!(ScenarioFiles::new("Base").run, "Base.run");
    }

    #[test]
    fn run_directive_line() {
        let files = ScenarioFiles::new("Baseline");
        assert_eq!(
            files.run_directive("Baseline"),
            "scenario_input_Baseline.par, storm_input_Baseline.pre, \
             scenario_output_summary_Baseline.sum, \"Baseline\", 0, 2, y, y, n, n, y"
        );
    }

    #[test]
    fn build_date_format() {
        let now = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(build_date(now), "May 01, 2024, 02:05 PM");
    }

    #[test]
    fn full_run_writes_every_file() {
        let dir = scratch("full");
        let cligen = dir.join("cligen");
        write_archive(&cligen);
        let workspace = dir.join("work");
        fs::create_dir_all(&workspace).unwrap();

        let site = SiteAttributes::new(sample_input()).unwrap();
        let mut p = Parameters::derive(&site, &SoilTextureTable::bundled().unwrap()).unwrap();
        // storms 1 and 3 have erosivity 248 and 50
        p.ke = 10.0;

        let model = RhemModel::new(&workspace, &cligen, "AZ", "026180", "Baseline", "today");
        let runner = FakeModel {
            calls: RefCell::new(Vec::new()),
            succeed: true,
        };
        let run = model.run(&p, &runner, 280.0).unwrap();

        assert_eq!(run.storms, 2);
        assert_eq!(*runner.calls.borrow(), vec![workspace.join("Baseline.run")]);
        let run_line = fs::read_to_string(workspace.join("Baseline.run")).unwrap();
        assert_eq!(run_line.trim_end(), model.files.run_directive("Baseline"));
        assert!(run.parameter_file.exists());
        let storms = fs::read_to_string(&run.storm_file).unwrap();
        assert!(storms.contains("2 # The number of rain events"));
        let summary = fs::read_to_string(&run.summary_file).unwrap();
        assert!(summary.contains("Avg-Precipitation(mm/year)=   280.0"));
        assert!(summary.contains("Precipitation(mm)"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failed_run_leaves_decks_and_summary_untouched() {
        let dir = scratch("failed");
        let cligen = dir.join("cligen");
        write_archive(&cligen);

        let site = SiteAttributes::new(sample_input()).unwrap();
        let p = Parameters::derive(&site, &SoilTextureTable::bundled().unwrap()).unwrap();
        let model = RhemModel::new(&dir, &cligen, "AZ", "026180", "Baseline", "today");
        let runner = FakeModel {
            calls: RefCell::new(Vec::new()),
            succeed: false,
        };

        let err = model.run(&p, &runner, 280.0).unwrap_err();
        assert!(matches!(err, RhemError::ExternalRun { status: 2, .. }));
        assert!(dir.join("scenario_input_Baseline.par").exists());
        assert!(dir.join("Baseline.run").exists());
        assert!(!dir.join("scenario_output_summary_Baseline.sum").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_archive_stops_before_the_run() {
        let dir = scratch("no_archive");
        let site = SiteAttributes::new(sample_input()).unwrap();
        let p = Parameters::derive(&site, &SoilTextureTable::bundled().unwrap()).unwrap();
        let model = RhemModel::new(&dir, dir.join("cligen"), "AZ", "026180", "Baseline", "today");
        let runner = FakeModel {
            calls: RefCell::new(Vec::new()),
            succeed: true,
        };

        assert!(matches!(
            model.run(&p, &runner, 280.0),
            Err(RhemError::Io { .. })
        ));
        assert!(runner.calls.borrow().is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }
}
