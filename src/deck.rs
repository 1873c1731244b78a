/*!
Fixed-width text decks read by the RHEM executable.

Every deck line is `<indent><NAME padded to its width>=   <value>`. Field
order and the literal defaults are what the model's reader expects.
*/
use crate::error::{Result, RhemError};
use crate::hydraulics::SlopeProfile;
use crate::parameters::{CV, CV_TEXT, KCM, KCM_TEXT, KOMEGA, KOMEGA_TEXT, Parameters};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const INDENT: &str = "        ";
const NAME_WIDTH: usize = 8;

/// One `NAME = value` line.
#[derive(Debug, Clone, PartialEq)]
pub struct DeckField {
    pub name: &'static str,
    pub value: String,
    pub width: usize,
}

impl DeckField {
    pub fn new(name: &'static str, value: impl Into<String>) -> Self {
        DeckField {
            name,
            value: value.into(),
            width: NAME_WIDTH,
        }
    }

    pub fn render(&self) -> String {
        format!(
            "{INDENT}{:<width$}=   {}",
            self.name,
            self.value,
            width = self.width
        )
    }
}

/// Render fields in order, one line each.
pub fn render_fields(fields: &[DeckField]) -> String {
    let mut out = String::new();
    for field in fields {
        out.push_str(&field.render());
        out.push('\n');
    }
    out
}

/// Decimal text for a deck value. Integral values keep a trailing `.0`
/// and the text parses back to the same `f64`.
pub fn real(value: f64) -> String {
    format!("{value:?}")
}

// Fixed constants keep their customary deck spelling unless edited
fn constant_or_real(value: f64, constant: f64, text: &str) -> String {
    if value == constant {
        text.to_string()
    } else {
        real(value)
    }
}

pub fn join_reals(values: &[f64], sep: &str) -> String {
    values.iter().map(|v| real(*v)).collect::<Vec<_>>().join(sep)
}

fn global_fields(p: &Parameters) -> Vec<DeckField> {
    vec![
        DeckField::new("CLEN", real(p.clen)),
        DeckField::new("UNITS", "metric"),
        DeckField::new("DIAMS", join_reals(&p.diams, " ")),
        DeckField::new("DENSITY", join_reals(&p.density, " ")),
        DeckField::new("TEMP", "40"),
        DeckField::new("NELE", "1"),
    ]
}

fn plane_fields(p: &Parameters) -> Result<Vec<DeckField>> {
    let profile = p
        .slope_profile
        .as_ref()
        .ok_or(RhemError::MissingParameter("SL/SX"))?;
    Ok(vec![
        DeckField::new("ID", "1"),
        DeckField::new("LEN", real(p.len)),
        DeckField::new("WIDTH", "1.0"),
        DeckField::new("CHEZY", real(p.chezy)),
        DeckField::new("RCHEZY", real(p.rchezy)),
        DeckField::new("SL", join_reals(&profile.sl, ", ")),
        DeckField::new("SX", join_reals(&profile.sx, ", ")),
        DeckField::new("CV", constant_or_real(p.cv, CV, CV_TEXT)),
        DeckField::new("SAT", real(p.sat)),
        DeckField::new("PR", "1"),
        DeckField::new("KSS", real(p.kss)),
        DeckField::new("KOMEGA", constant_or_real(p.komega, KOMEGA, KOMEGA_TEXT)),
        DeckField::new("KCM", constant_or_real(p.kcm, KCM, KCM_TEXT)),
        DeckField::new("CA", "1.0"),
        DeckField::new("IN", "0.0"),
        DeckField::new("KE", real(p.ke)),
        DeckField::new("G", real(p.g)),
        DeckField::new("DIST", real(p.dist)),
        DeckField::new("POR", real(p.por)),
        DeckField::new("ROCK", "0.00"),
        DeckField::new("SMAX", "1.0"),
        DeckField::new("ADF", real(p.adf)),
        DeckField::new("ALF", real(p.alf)),
        DeckField::new("BARE", real(p.bare)),
        DeckField::new("RSP", "1.0"),
        DeckField::new("SPACING", "1.0"),
        DeckField::new("FRACT", join_reals(&p.fract, " ")),
    ])
}

/// Full parameter deck text, header comments included.
pub fn render_parameter_deck(p: &Parameters, scenario_name: &str, built: &str) -> Result<String> {
    let plane = plane_fields(p)?;
    let mut out = String::new();
    out.push_str(&format!("! Parameter file for scenario: {scenario_name}\n"));
    out.push_str(&format!("! Date built: {built} (Version 2.3)\n"));
    out.push_str("! Parameter units: DIAMS(mm), DENSITY(g/cc),TEMP(deg C)\n");
    out.push_str("BEGIN GLOBAL\n");
    out.push_str(&render_fields(&global_fields(p)));
    out.push_str("END GLOBAL\n");
    out.push_str("BEGIN PLANE\n");
    out.push_str(&render_fields(&plane));
    out.push_str("END PLANE\n");
    Ok(out)
}

pub fn write_parameter_deck(
    path: &Path,
    p: &Parameters,
    scenario_name: &str,
    built: &str,
) -> Result<()> {
    let text = render_parameter_deck(p, scenario_name, built)?;
    fs::write(path, text)
        .map_err(|e| RhemError::io("Problem in generating the parameter file", e))
}

// NAME -> value for every `NAME = value` line of a deck
fn deck_values(text: &str) -> HashMap<String, String> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('!'))
        .filter_map(|line| line.split_once('='))
        .map(|(name, value)| (name.trim().to_uppercase(), value.trim().to_string()))
        .collect()
}

fn parse_real(name: &str, text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| RhemError::Parse(format!("{name} value '{text}' is not a number")))
}

fn parse_list(name: &str, text: &str, sep: impl Fn(char) -> bool) -> Result<Vec<f64>> {
    text.split(sep)
        .filter(|s| !s.trim().is_empty())
        .map(|s| parse_real(name, s))
        .collect()
}

fn parse_five(name: &str, text: &str) -> Result<[f64; 5]> {
    let values = parse_list(name, text, char::is_whitespace)?;
    values.try_into().map_err(|v: Vec<f64>| {
        RhemError::Parse(format!("{name} needs 5 values, found {}", v.len()))
    })
}

/// Read plane parameters back from deck text.
///
/// Fields with fixed values (UNITS, TEMP, WIDTH, ...) are not kept. CLEN is
/// always recomputed from LEN.
pub fn parse_parameter_deck(text: &str) -> Result<Parameters> {
    let values = deck_values(text);
    let get = |name: &'static str| {
        values
            .get(name)
            .map(String::as_str)
            .ok_or(RhemError::MissingParameter(name))
    };
    let real_of = |name: &'static str| get(name).and_then(|v| parse_real(name, v));

    // CLEN always follows LEN; a CLEN line in the deck is ignored
    let len = real_of("LEN")?;
    let clen = crate::hydraulics::characteristic_length(len);
    let sl = parse_list("SL", get("SL")?, |c| c == ',')?;
    let sx = parse_list("SX", get("SX")?, |c| c == ',')?;
    if sl.len() != sx.len() {
        return Err(RhemError::Parse(format!(
            "SL has {} values but SX has {}",
            sl.len(),
            sx.len()
        )));
    }

    Ok(Parameters {
        len,
        clen,
        chezy: real_of("CHEZY")?,
        rchezy: real_of("RCHEZY")?,
        slope_profile: Some(SlopeProfile { sl, sx }),
        cv: real_of("CV")?,
        sat: real_of("SAT")?,
        kss: real_of("KSS")?,
        komega: real_of("KOMEGA")?,
        kcm: real_of("KCM")?,
        ke: real_of("KE")?,
        adf: real_of("ADF")?,
        alf: real_of("ALF")?,
        bare: real_of("BARE")?,
        g: real_of("G")?,
        dist: real_of("DIST")?,
        por: real_of("POR")?,
        diams: parse_five("DIAMS", get("DIAMS")?)?,
        density: parse_five("DENSITY", get("DENSITY")?)?,
        fract: parse_five("FRACT", get("FRACT")?)?,
    })
}

pub fn read_parameter_deck(path: &Path) -> Result<Parameters> {
    let text = fs::read_to_string(path).map_err(|e| {
        RhemError::io(format!("Failed to read parameter file {}", path.display()), e)
    })?;
    parse_parameter_deck(&text)
}

/// Name/value pairs reported back to the caller after a run.
pub fn parameter_report(p: &Parameters) -> Vec<(&'static str, String)> {
    let (sl, sx) = match &p.slope_profile {
        Some(profile) => (join_reals(&profile.sl, ", "), join_reals(&profile.sx, ", ")),
        None => (String::new(), String::new()),
    };
    vec![
        ("CLEN", real(p.clen)),
        ("UNITS", "metric".to_string()),
        ("DIAMS", join_reals(&p.diams, " ")),
        ("DENSITY", join_reals(&p.density, " ")),
        ("CHEZY", real(p.chezy)),
        ("RCHEZY", real(p.rchezy)),
        ("SL", sl),
        ("SX", sx),
        ("KSS", real(p.kss)),
        ("KE", real(p.ke)),
        ("G", real(p.g)),
        ("DIST", real(p.dist)),
        ("POR", real(p.por)),
        ("FRACT", join_reals(&p.fract, " ")),
    ]
}
