//! Specimen record files.
//!
//! A record is a small text file written by the digitizing tool:
//!
//! ```text
//! <operator> <name>  u 1.0  0 0 0 0 <n>      <- header, ignored on read
//! MEASURED 12.5 -3.25                         <- digitized outline point
//! FITSHAPE 12.1 -3.30                         <- optional fitted shape point
//! RESULT 342 2.0 0.7                          <- optional earlier staging result
//! Total lengths different by 3.5 per cent     <- optional
//! ```
//!
//! Fields are separated by commas when the line contains one, by whitespace
//! otherwise. Unknown tags are ignored.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::warn;
use nalgebra::Point2;
use serde::Serialize;

use crate::domain::{NameParser, NominalAge, Side};
use crate::error::AppError;

/// Staging result stored in a record by an earlier run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordedFit {
    pub age: f64,
    pub error: f64,
    pub chi2: f64,
}

/// Everything a record body contains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBody {
    pub measured: Vec<Point2<f64>>,
    pub fit_shape: Vec<Point2<f64>>,
    pub fit: Option<RecordedFit>,
    /// Relative length difference reported by the digitizer (fraction, not percent).
    pub length_delta: Option<f64>,
    /// The last line carries the digitizer's `MIRRORED` flag.
    pub mirrored: bool,
}

/// A loaded specimen: parsed body plus what the file name tells us.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecimenRecord {
    pub name: String,
    pub side: Side,
    /// Outline points, x mirrored for left limbs.
    pub points: Vec<Point2<f64>>,
    pub body: RecordBody,
    pub nominal_age: Option<NominalAge>,
}

impl SpecimenRecord {
    /// Load a record and, when `parser` is given, its nominal age.
    ///
    /// Left limbs are mirrored so every outline has the same handedness.
    pub fn load(path: &Path, parser: Option<NameParser>) -> Result<Self, AppError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let text = fs::read_to_string(path)
            .map_err(|e| AppError::new(2, format!("Failed to read record '{}': {e}", path.display())))?;
        let body = parse_record(&text)
            .map_err(|e| AppError::new(2, format!("Malformed record '{}': {e}", path.display())))?;

        let side = Side::from_file_name(&name);
        if body.mirrored && side == Side::Right {
            warn!("{name}: digitizer flagged a left limb but the file name says right");
        }

        let mut points = body.measured.clone();
        if side == Side::Left {
            for p in points.iter_mut() {
                p.x = -p.x;
            }
        }

        let nominal_age = parser
            .map(|parser| parse_nominal_age(&name, parser))
            .transpose()?;

        Ok(Self {
            name,
            side,
            points,
            body,
            nominal_age,
        })
    }
}

/// Read only the `MEASURED` points of a record.
pub fn read_measured_points(path: &Path) -> Result<Vec<Point2<f64>>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read record '{}': {e}", path.display())))?;
    parse_record(&text)
        .map(|body| body.measured)
        .map_err(|e| AppError::new(2, format!("Malformed record '{}': {e}", path.display())))
}

/// Parse a record body. Errors name the offending 1-based line.
pub fn parse_record(text: &str) -> Result<RecordBody, String> {
    let mut body = RecordBody::default();
    let lines: Vec<&str> = text.lines().collect();

    for (idx, line) in lines.iter().enumerate().skip(1) {
        let line_no = idx + 1;
        let fields: Vec<&str> = if line.contains(',') {
            line.split(',').map(str::trim).collect()
        } else {
            line.split_whitespace().collect()
        };
        let Some(&tag) = fields.first() else {
            continue;
        };

        match tag {
            "MEASURED" => body.measured.push(parse_point(&fields, line_no)?),
            "FITSHAPE" => body.fit_shape.push(parse_point(&fields, line_no)?),
            "RESULT" => {
                body.fit = Some(RecordedFit {
                    age: parse_field(&fields, 1, line_no)?,
                    error: parse_field(&fields, 2, line_no)?,
                    chi2: parse_field(&fields, 3, line_no)?,
                });
            }
            // "Total lengths different by X per cent"
            "Total" => body.length_delta = Some(parse_field(&fields, 4, line_no)? / 100.0),
            _ => {}
        }
    }

    body.mirrored = lines.last().is_some_and(|l| l.contains("MIRRORED"));
    Ok(body)
}

fn parse_point(fields: &[&str], line_no: usize) -> Result<Point2<f64>, String> {
    Ok(Point2::new(
        parse_field(fields, 1, line_no)?,
        parse_field(fields, 2, line_no)?,
    ))
}

fn parse_field(fields: &[&str], idx: usize, line_no: usize) -> Result<f64, String> {
    let raw = fields
        .get(idx)
        .ok_or_else(|| format!("line {line_no}: missing field {idx} after `{}`", fields[0]))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("line {line_no}: invalid number '{raw}'"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("line {line_no}: non-finite number '{raw}'"))
    }
}

/// Write `points` as a record that `read_measured_points` reads back unchanged.
pub fn write_measured_record(
    path: &Path,
    operator: &str,
    name: &str,
    points: &[Point2<f64>],
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create record '{}': {e}", path.display())))?;
    let mut out = BufWriter::new(file);
    let io_err = |e: std::io::Error| AppError::new(2, format!("Failed to write record '{}': {e}", path.display()));

    writeln!(out, "{operator} {name}  u 1.0  0 0 0 0 {}", points.len()).map_err(io_err)?;
    for p in points {
        writeln!(out, "MEASURED {} {}", p.x, p.y).map_err(io_err)?;
    }
    out.flush().map_err(io_err)?;
    Ok(())
}

/// Welsh quarter-day suffixes and the hour they stand for.
const WELSH_QUARTERS: [(&str, &str); 8] = [
    ("E13.0", "E13;00_"),
    ("E13.25", "E13;06_"),
    ("E13.5", "E13;12_"),
    ("E13.75", "E13;18_"),
    ("E14.0", "E14;00_"),
    ("E14.25", "E14;06_"),
    ("E14.5", "E14;12_"),
    ("E14.75", "E14;18_"),
];

/// Parse the nominal age encoded in a record file name.
pub fn parse_nominal_age(file_name: &str, parser: NameParser) -> Result<NominalAge, AppError> {
    let stem = strip_record_extension(file_name);
    let bad = |what: &str| {
        AppError::new(
            2,
            format!("Cannot read {what} from '{file_name}' using the {parser:?} naming convention."),
        )
    };

    match parser {
        NameParser::Heura => {
            let mut parts = stem.split('.');
            let day = parse_day(parts.next().unwrap_or("")).ok_or_else(|| bad("day"))?;
            let rest = parts.next().ok_or_else(|| bad("hour"))?;
            let mut rest = rest.split('_');
            let hour_str = rest.next().unwrap_or("");
            let hour = hour_str.parse().map_err(|_| bad("hour"))?;
            let litter = rest.next().ok_or_else(|| bad("litter"))?;
            Ok(NominalAge {
                day,
                hour,
                label: format!("{day}.{hour_str}"),
                litter: litter.to_string(),
                embryo: String::new(),
            })
        }
        NameParser::Welsh => {
            let mut normalized = stem.to_string();
            for (from, to) in WELSH_QUARTERS {
                normalized = normalized.replace(from, to);
            }
            let normalized = normalized.replace("__", "_");
            let parts: Vec<&str> = normalized.split('_').collect();
            let (day, hour, hour_str) = parse_day_hour(parts[0]).ok_or_else(|| bad("day;hour"))?;
            let litter = parts.get(1).ok_or_else(|| bad("litter"))?;
            Ok(NominalAge {
                day,
                hour,
                label: format!("E{day}.{hour_str}"),
                litter: litter.to_string(),
                embryo: String::new(),
            })
        }
        NameParser::Generic => {
            let parts: Vec<&str> = stem.split('_').collect();
            let (day, hour, hour_str) = parse_day_hour(parts[0]).ok_or_else(|| bad("day;hour"))?;
            let litter = parts.get(1).ok_or_else(|| bad("litter"))?;
            let embryo = parts.get(2).ok_or_else(|| bad("embryo"))?;
            Ok(NominalAge {
                day,
                hour,
                label: format!("E{day}.{hour_str}"),
                litter: litter.to_string(),
                embryo: embryo.to_string(),
            })
        }
    }
}

fn strip_record_extension(name: &str) -> &str {
    name.strip_suffix(".txt")
        .or_else(|| name.strip_suffix(".TXT"))
        .unwrap_or(name)
}

fn parse_day(s: &str) -> Option<u32> {
    s.replace('E', "").parse().ok()
}

/// `E<day>;<hour>` -> `(day, hour, hour as written)`.
fn parse_day_hour(s: &str) -> Option<(u32, u32, &str)> {
    let (day, hour_str) = s.split_once(';')?;
    Some((parse_day(day)?, hour_str.parse().ok()?, hour_str))
}
