/*!
Risk assessment across scenarios.

The risk-assessment executable tabulates soil loss by return period for a
baseline and up to five alternative scenarios. For every baseline return
period this module finds the return period at which each alternative
reaches the same soil loss.
*/
use crate::deck::real;
use crate::error::{Result, RhemError};
use crate::interpolate::interpolate;
use crate::runner::ModelRunner;
use log::{debug, info};
use nalgebra::DMatrix;
use std::fs;
use std::path::{Path, PathBuf};

pub const MAX_ALTERNATIVE_SCENARIOS: usize = 5;

// Marker line opening the frequency table in the risk-assessment output
pub const FREQUENCY_MARKER: &str = "FREQUENCY ANALYSIS";

pub const RUN_FILE: &str = "risk_assessment.run";
pub const OUTPUT_FILE: &str = "risk_assessment.OUT";
pub const TABLE_FILE: &str = "frequencyAnalysisReturnPeriodTable.out";

// Upper bound on an interpolated return period [years]
const MAX_RETURN_PERIOD: f64 = 100.0;

// Return period of an alternative that never falls below the baseline loss
const DEFAULT_RETURN_PERIOD: f64 = 1.0;

const COLUMN_WIDTH: usize = 20;

/// Frequency table: one row per return period, columns are
/// `[return period, baseline, alternative 1, ...]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskMatrix {
    pub scenario_names: Vec<String>,
    pub values: DMatrix<f64>,
}

impl RiskMatrix {
    pub fn alternatives(&self) -> usize {
        self.values.ncols().saturating_sub(2)
    }
}

/// Return periods of every alternative for one baseline row.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolatedReturnPeriod {
    pub baseline_soil_loss: f64,
    pub return_period: f64,
    pub alternatives: Vec<f64>,
}

/// Half-up rounding to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let power = 10f64.powi(places);
    (value * power + 0.5).floor() / power
}

fn parse_row(line: &str) -> Option<Vec<f64>> {
    line.split_whitespace()
        .map(|token| token.parse::<f64>().ok())
        .collect()
}

/// Locate the frequency table in risk-assessment output text.
///
/// Scenario names come from the third line after the marker (first token
/// skipped); numeric rows start on the fourth and run to the first blank or
/// non-numeric line.
pub fn parse_frequency_block(text: &str) -> Result<RiskMatrix> {
    let lines: Vec<&str> = text.lines().collect();
    let marker = lines
        .iter()
        .position(|line| line.contains(FREQUENCY_MARKER))
        .ok_or_else(|| RhemError::Parse(format!("no '{FREQUENCY_MARKER}' block found")))?;

    let scenario_names: Vec<String> = lines
        .get(marker + 3)
        .map(|line| line.split_whitespace().skip(1).map(str::to_string).collect())
        .unwrap_or_default();

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for line in lines.iter().skip(marker + 4) {
        if line.trim().is_empty() {
            break;
        }
        match parse_row(line) {
            Some(row) => rows.push(row),
            None => break,
        }
    }

    let width = rows.first().map(Vec::len).unwrap_or(0);
    if width < 2 {
        return Err(RhemError::Parse(
            "frequency analysis block has no soil loss rows".to_string(),
        ));
    }
    if let Some(bad) = rows.iter().position(|row| row.len() != width) {
        return Err(RhemError::Parse(format!(
            "frequency analysis row {} has {} columns, expected {width}",
            bad + 1,
            rows[bad].len()
        )));
    }

    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Ok(RiskMatrix {
        scenario_names,
        values: DMatrix::from_row_slice(rows.len(), width, &flat),
    })
}

fn alternative_return_period(baseline_loss: f64, series: &[f64], return_periods: &[f64]) -> f64 {
    if !series.iter().any(|&loss| loss <= baseline_loss) {
        return DEFAULT_RETURN_PERIOD;
    }
    let years = interpolate(baseline_loss, series, return_periods)
        .map(|y| round_to(y, 3))
        .filter(|y| y.is_finite() && *y <= MAX_RETURN_PERIOD)
        .unwrap_or(MAX_RETURN_PERIOD);
    round_to(years, 1)
}

/// Interpolated return periods, one entry per matrix row.
///
/// The matrix needs at least the return period and baseline columns.
pub fn calculate_return_periods(matrix: &DMatrix<f64>) -> Result<Vec<InterpolatedReturnPeriod>> {
    if matrix.ncols() < 2 {
        return Err(RhemError::Parse(format!(
            "frequency table has {} columns, needs return period and baseline",
            matrix.ncols()
        )));
    }
    // rows of `series`: return periods, baseline, alternatives
    let series = matrix.map(|v| round_to(v, 3)).transpose();
    let row = |i: usize| -> Vec<f64> { series.row(i).iter().copied().collect() };
    let return_periods = row(0);
    let alternatives: Vec<Vec<f64>> = (2..series.nrows()).map(row).collect();

    Ok((0..series.ncols())
        .map(|x| {
            let baseline_soil_loss = series[(1, x)];
            InterpolatedReturnPeriod {
                baseline_soil_loss,
                return_period: return_periods[x],
                alternatives: alternatives
                    .iter()
                    .map(|alt| alternative_return_period(baseline_soil_loss, alt, &return_periods))
                    .collect(),
            }
        })
        .collect())
}

pub fn render_return_period_table(
    scenario_names: &[String],
    rows: &[InterpolatedReturnPeriod],
) -> String {
    let mut out = format!(
        "{:<w$} {:<w$}",
        "BASELINE SCENARIO",
        "RETURN PERIOD",
        w = COLUMN_WIDTH
    );
    for name in scenario_names {
        out.push_str(&format!("{:<w$}", format!("{name}(years)"), w = COLUMN_WIDTH));
    }
    out.push('\n');
    for row in rows {
        let cells = [row.baseline_soil_loss, row.return_period]
            .into_iter()
            .chain(row.alternatives.iter().copied());
        for value in cells {
            out.push_str(&format!("{:<w$}", real(value), w = COLUMN_WIDTH));
        }
        out.push('\n');
    }
    out
}

/// One risk-assessment request: a baseline detailed output file and the
/// alternative scenario files, all inside `workspace`.
#[derive(Debug, Clone)]
pub struct RiskAssessment {
    pub workspace: PathBuf,
    pub baseline_file: String,
    pub scenario_files: Vec<String>,
}

impl RiskAssessment {
    pub fn new(
        workspace: impl Into<PathBuf>,
        baseline_file: impl Into<String>,
        scenario_files: Vec<String>,
    ) -> Result<Self> {
        if scenario_files.len() > MAX_ALTERNATIVE_SCENARIOS {
            return Err(RhemError::TooManyScenarios {
                max: MAX_ALTERNATIVE_SCENARIOS,
                found: scenario_files.len(),
            });
        }
        Ok(RiskAssessment {
            workspace: workspace.into(),
            baseline_file: baseline_file.into(),
            scenario_files,
        })
    }

    pub fn run_file(&self) -> PathBuf {
        self.workspace.join(RUN_FILE)
    }

    pub fn write_run_file(&self) -> Result<()> {
        let mut text = format!("{}\n", self.baseline_file);
        for name in &self.scenario_files {
            text.push_str(name);
            text.push('\n');
        }
        fs::write(self.run_file(), text)
            .map_err(|e| RhemError::io("Problem in generating the risk assessment run file", e))
    }

    /// Write the run file, run the risk executable, and write the return
    /// period table from its output.
    pub fn run(&self, runner: &dyn ModelRunner) -> Result<Vec<InterpolatedReturnPeriod>> {
        info!(
            "risk assessment of {} against {} scenarios",
            self.baseline_file,
            self.scenario_files.len()
        );
        self.write_run_file()?;
        runner.run(&self.run_file())?;

        let output = read_text(&self.workspace.join(OUTPUT_FILE))?;
        let matrix = parse_frequency_block(&output)?;
        debug!(
            "frequency table: {} return periods, {} alternatives",
            matrix.values.nrows(),
            matrix.alternatives()
        );
        let rows = calculate_return_periods(&matrix.values)?;
        let table = render_return_period_table(&matrix.scenario_names, &rows);
        fs::write(self.workspace.join(TABLE_FILE), table)
            .map_err(|e| RhemError::io("Problem in writing the return period table", e))?;
        Ok(rows)
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map_err(|e| RhemError::io(format!("Failed to read {}", path.display()), e))
}
