use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use serde::Serialize;

pub const REGION_STATS_FILE: &str = "aseg+DKT.stats";
pub const HEMISPHERES: [&str; 2] = ["lh", "rh"];

const REGION_MIN_FIELDS: usize = 5;
const REGION_VOLUME_COL: usize = 3;
const REGION_NAME_COL: usize = 4;
const THICKNESS_MIN_FIELDS: usize = 6;
const THICKNESS_COL: usize = 5;

/// Row counts from a best-effort parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseAudit {
    pub rows_parsed: usize,
    pub rows_skipped: usize,
}

impl ParseAudit {
    pub fn merge(&mut self, other: ParseAudit) {
        self.rows_parsed += other.rows_parsed;
        self.rows_skipped += other.rows_skipped;
    }
}

pub fn thickness_stats_file(hemi: &str) -> String {
    format!("{hemi}.aparc.stats")
}

pub fn parse_region_volumes<R: BufRead>(
    mut reader: R,
) -> io::Result<(HashMap<String, f64>, ParseAudit)> {
    let mut volumes = HashMap::new();
    let mut audit = ParseAudit::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let Some(fields) = data_fields(&line) else {
            continue;
        };
        if fields.len() < REGION_MIN_FIELDS {
            audit.rows_skipped += 1;
            continue;
        }
        match fields[REGION_VOLUME_COL].parse::<f64>() {
            Ok(volume) if volume.is_finite() => {
                volumes.insert(fields[REGION_NAME_COL].to_string(), volume);
                audit.rows_parsed += 1;
            }
            _ => audit.rows_skipped += 1,
        }
    }

    Ok((volumes, audit))
}

pub fn parse_thickness<R: BufRead>(mut reader: R) -> io::Result<(Vec<f64>, ParseAudit)> {
    let mut values = Vec::new();
    let mut audit = ParseAudit::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let Some(fields) = data_fields(&line) else {
            continue;
        };
        if fields.len() < THICKNESS_MIN_FIELDS {
            audit.rows_skipped += 1;
            continue;
        }
        match fields[THICKNESS_COL].parse::<f64>() {
            Ok(v) if v.is_finite() => {
                values.push(v);
                audit.rows_parsed += 1;
            }
            _ => audit.rows_skipped += 1,
        }
    }

    Ok((values, audit))
}

/// Opens `path` for line reading; `Ok(None)` when the file does not exist.
pub fn open_optional(path: &Path) -> io::Result<Option<BufReader<File>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(BufReader::new(file))),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn data_fields(line: &str) -> Option<Vec<&str>> {
    if line.starts_with('#') || line.trim().is_empty() {
        return None;
    }
    Some(line.split_whitespace().collect())
}

#[cfg(test)]
#[path = "../../tests/src_inline/input/stats.rs"]
mod tests;
