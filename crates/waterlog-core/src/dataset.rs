//! CSV persistence for labeled datasets.
//!
//! One header row (`COLUMNS`), then one row per record. Categoricals are
//! written as integer codes. Floats use Rust's shortest round-trip formatting,
//! so equal datasets always serialise to byte-identical files.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::domain::{CropType, RiskLabel, SlopeType, SoilType};
use crate::error::DatasetError;
use crate::generator::Dataset;
use crate::record::{FeatureRecord, LabeledRecord, COLUMNS};

/// Write `dataset` as CSV to any writer.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), DatasetError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(COLUMNS)?;
    for r in dataset.iter() {
        wtr.write_record(&row_fields(r))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `dataset` as CSV to `path`, replacing any existing file.
pub fn write_csv_file(dataset: &Dataset, path: &Path) -> Result<(), DatasetError> {
    let file = File::create(path)?;
    write_csv(dataset, BufWriter::new(file))
}

/// Read a dataset written by [`write_csv`].
pub fn read_csv<R: Read>(reader: R) -> Result<Dataset, DatasetError> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?;
    if headers.iter().ne(COLUMNS.iter().copied()) {
        return Err(DatasetError::Header {
            expected: COLUMNS.join(","),
            found: headers.iter().collect::<Vec<_>>().join(","),
        });
    }

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        let row = row?;
        // Header is line 1.
        records.push(parse_row(&row).map_err(|message| DatasetError::Row { row: i + 2, message })?);
    }
    Ok(Dataset { records })
}

pub fn read_csv_file(path: &Path) -> Result<Dataset, DatasetError> {
    read_csv(File::open(path)?)
}

fn row_fields(r: &LabeledRecord) -> [String; 9] {
    let f = &r.features;
    [
        f.rainfall_1d.to_string(),
        f.rainfall_3d.to_string(),
        f.rainfall_7d.to_string(),
        f.humidity.to_string(),
        f.soil.code().to_string(),
        f.slope.code().to_string(),
        f.crop.code().to_string(),
        f.days_since_sowing.to_string(),
        r.label.level().to_string(),
    ]
}

fn parse_row(row: &csv::StringRecord) -> Result<LabeledRecord, String> {
    if row.len() != COLUMNS.len() {
        return Err(format!("expected {} fields, found {}", COLUMNS.len(), row.len()));
    }

    let float = |i: usize| -> Result<f64, String> {
        row[i]
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("{}: {e}", COLUMNS[i]))
    };
    let int = |i: usize| -> Result<i64, String> {
        row[i]
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("{}: {e}", COLUMNS[i]))
    };
    let unknown = |i: usize, code: i64| format!("{}: unknown code {code}", COLUMNS[i]);

    let soil = int(4)?;
    let slope = int(5)?;
    let crop = int(6)?;
    let days = int(7)?;
    let label = int(8)?;

    let features = FeatureRecord {
        rainfall_1d: float(0)?,
        rainfall_3d: float(1)?,
        rainfall_7d: float(2)?,
        humidity: float(3)?,
        soil: SoilType::from_code(soil).ok_or_else(|| unknown(4, soil))?,
        slope: SlopeType::from_code(slope).ok_or_else(|| unknown(5, slope))?,
        crop: CropType::from_code(crop).ok_or_else(|| unknown(6, crop))?,
        days_since_sowing: u32::try_from(days)
            .map_err(|_| format!("{}: {days} is not a day count", COLUMNS[7]))?,
    };
    let label = RiskLabel::from_level(label).ok_or_else(|| unknown(8, label))?;

    Ok(LabeledRecord { features, label })
}
