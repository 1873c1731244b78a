use crate::deck::real;
use crate::error::{Result, RhemError};
use log::info;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

// Lines of the model's own banner dropped from the summary
const BANNER_LINES: usize = 3;

// 1-based line of the model summary whose leading header is relabelled
const PRECIPITATION_ROW: usize = 13;
const PRECIPITATION_LABEL: &str = "Precipitation(mm)";

const CELL_WIDTH: usize = 28;

fn cell(text: &str) -> String {
    format!("{text:<CELL_WIDTH$}")
}

/// Summary text with the annual averages header and precipitation line in
/// front of the model's table, every cell left-justified to 28 columns.
///
/// On line 13 the first two tokens are replaced by a precipitation label.
pub fn rewrite_summary(text: &str, avg_yearly_precip: f64) -> String {
    let mut out = String::new();
    out.push_str("     -ANNUAL-AVERAGES-\n");
    out.push('\n');
    out.push_str(&format!(
        "Avg-Precipitation(mm/year)=   {}\n",
        real(avg_yearly_precip)
    ));

    for (i, line) in text.lines().enumerate().skip(BANNER_LINES) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if i + 1 == PRECIPITATION_ROW {
            out.push_str(&cell(PRECIPITATION_LABEL));
            tokens.iter().skip(2).for_each(|t| out.push_str(&cell(t)));
        } else {
            tokens.iter().for_each(|t| out.push_str(&cell(t)));
        }
        out.push('\n');
    }
    out
}

/// Rewrite the summary file in place: the new text goes to
/// `temp_<name>` next to it, which is then renamed over the summary.
pub fn append_to_summary(summary: &Path, avg_yearly_precip: f64) -> Result<()> {
    let context = "Problem in editing the summary file";
    let text = fs::read_to_string(summary).map_err(|e| RhemError::io(context, e))?;

    let file_name = summary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp = summary.with_file_name(format!("temp_{file_name}"));
    {
        let file = File::create(&temp).map_err(|e| RhemError::io(context, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(rewrite_summary(&text, avg_yearly_precip).as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| RhemError::io(context, e))?;
    }
    fs::rename(&temp, summary).map_err(|e| RhemError::io(context, e))?;
    info!("summary {} rewritten", summary.display());
    Ok(())
}
