use crate::error::{Result, RhemError};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

// Header lines at the top of a 300-year CLIGEN archive
pub const ARCHIVE_HEADER_LINES: usize = 18;

// Whitespace-separated columns used from each archive line
const ARCHIVE_COLUMNS: usize = 8;

/// One rainfall event from a climate archive.
///
/// `columns` keeps the archive text of day, month, year, rain, duration, tp
/// and ip, which the storm deck copies unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct StormEvent {
    pub day: u32,
    pub month: u32,
    pub year: u32,
    pub rain: f64,     // Rainfall depth [mm]
    pub duration: f64, // Storm duration [h]
    pub tp: f64,       // Time to peak / duration [-]
    pub ip: f64,       // Peak intensity / average intensity [-]
    pub columns: [String; 7],
}

impl StormEvent {
    /// Event index compared against KE: `ip * (rain / duration)`.
    pub fn erosivity(&self) -> f64 {
        self.ip * (self.rain / self.duration)
    }

    fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let cols: Vec<&str> = line.split_whitespace().collect();
        if cols.len() < ARCHIVE_COLUMNS {
            return Err(RhemError::Parse(format!(
                "storm archive line {line_no} has {} columns, expected at least {ARCHIVE_COLUMNS}",
                cols.len()
            )));
        }
        let bad = |what: &str, text: &str| {
            RhemError::Parse(format!("storm archive line {line_no}: bad {what} '{text}'"))
        };
        let int = |i: usize, what: &str| cols[i].parse::<u32>().map_err(|_| bad(what, cols[i]));
        let float = |i: usize, what: &str| cols[i].parse::<f64>().map_err(|_| bad(what, cols[i]));

        // cols[0] is the archive's own sequence column
        Ok(StormEvent {
            day: int(1, "day")?,
            month: int(2, "month")?,
            year: int(3, "year")?,
            rain: float(4, "rain")?,
            duration: float(5, "duration")?,
            tp: float(6, "tp")?,
            ip: float(7, "ip")?,
            columns: std::array::from_fn(|i| cols[i + 1].to_string()),
        })
    }
}

/// Read events from archive text, in archive order.
pub fn parse_archive(text: &str) -> Result<Vec<StormEvent>> {
    text.lines()
        .enumerate()
        .skip(ARCHIVE_HEADER_LINES)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| StormEvent::parse_line(line, i + 1))
        .collect()
}

/// Location of the 300-year archive of a station:
/// `<root>/<state lower>/300yr/<STATE>_<station>_300yr.out`.
pub fn archive_path(root: &Path, state_id: &str, station_id: &str) -> PathBuf {
    root.join(state_id.to_lowercase())
        .join("300yr")
        .join(format!("{state_id}_{station_id}_300yr.out"))
}

pub fn read_archive(path: &Path) -> Result<Vec<StormEvent>> {
    let text = fs::read_to_string(path).map_err(|e| {
        RhemError::io(format!("Failed to read storm archive {}", path.display()), e)
    })?;
    parse_archive(&text)
}

/// A selected event with its 1-based position in the storm deck.
#[derive(Debug, Clone, PartialEq)]
pub struct NumberedStorm {
    pub id: usize,
    pub event: StormEvent,
}

/// Keeps the events whose erosivity exceeds a KE threshold.
#[derive(Debug, Clone, Copy)]
pub struct StormFilter {
    pub ke: f64,
}

impl StormFilter {
    pub fn new(ke: f64) -> Self {
        StormFilter { ke }
    }

    pub fn select(&self, events: &[StormEvent]) -> Vec<NumberedStorm> {
        let selected: Vec<NumberedStorm> = events
            .iter()
            .filter(|event| self.ke < event.erosivity())
            .enumerate()
            .map(|(i, event)| NumberedStorm {
                id: i + 1,
                event: event.clone(),
            })
            .collect();
        debug!(
            "{} of {} storms exceed KE {}",
            selected.len(),
            events.len(),
            self.ke
        );
        selected
    }
}

/// Comment block identifying a storm deck.
#[derive(Debug, Clone)]
pub struct StormDeckHeader<'a> {
    pub scenario_name: &'a str,
    pub built: &'a str,
    pub state_id: &'a str,
    pub station_id: &'a str,
}

fn render_storm(storm: &NumberedStorm) -> String {
    let [day, month, year, rain, duration, tp, ip] = &storm.event.columns;
    format!(
        "    {:<5} {day:<5} {month:<5} {year:<5} {rain:<5} {duration:<6} {tp:<6} {ip:<6}",
        storm.id
    )
}

pub fn render_storm_deck(header: &StormDeckHeader, storms: &[NumberedStorm]) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Storm file for scenario: {}\n", header.scenario_name));
    out.push_str(&format!("# Date built: {} (Version 2.3)\n", header.built));
    out.push_str(&format!("# State: {}\n", header.state_id));
    out.push_str(&format!("# Climate Station: {}\n", header.station_id));
    out.push_str(&format!("{} # The number of rain events\n", storms.len()));
    out.push_str("0 # Breakpoint data? (0 for no, 1 for yes)\n");
    out.push_str("#  id     day  month  year  Rain   Dur    Tp     Ip\n");
    out.push_str("#                           (mm)   (h)\n");
    for storm in storms {
        out.push_str(&render_storm(storm));
        out.push('\n');
    }
    out
}

pub fn write_storm_deck(
    path: &Path,
    header: &StormDeckHeader,
    storms: &[NumberedStorm],
) -> Result<()> {
    info!("writing {} storms to {}", storms.len(), path.display());
    fs::write(path, render_storm_deck(header, storms))
        .map_err(|e| RhemError::io("Problem in generating the storm file", e))
}
