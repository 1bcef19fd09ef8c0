use crate::error::{ProcessingError, Result};
use crate::models::{Measurements, ObservationRow};
use crate::utils::constants::{
    DEFAULT_BUFFER_SIZE, OBSERVATION_DATE_FORMAT, OBSERVATION_DELIMITER, OBSERVATION_FIELD_COUNT,
};
use chrono::NaiveDate;
use csv::{ByteRecord, ReaderBuilder, StringRecord};
use encoding_rs::WINDOWS_1252;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Positional layout of an observation line:
/// `insee;lat;lng;date;tm;tn;tx;tntxm;ffm;rr;um;un;ux;visx;visn;`
#[derive(Debug, Deserialize)]
struct RawObservation {
    insee: String,
    lat: String,
    lng: String,
    date: String,
    tm: String,
    tn: String,
    tx: String,
    tntxm: String,
    ffm: String,
    rr: String,
    um: String,
    un: String,
    ux: String,
    visx: String,
    visn: String,
    _blank: String,
}

impl RawObservation {
    fn into_row(self) -> Result<ObservationRow> {
        let date = parse_observation_date(&self.date)?;
        let measurements = Measurements {
            tm: self.tm,
            tn: self.tn,
            tx: self.tx,
            tntxm: self.tntxm,
            ffm: self.ffm,
            rr: self.rr,
            um: self.um,
            un: self.un,
            ux: self.ux,
            visx: self.visx,
            visn: self.visn,
        };

        Ok(ObservationRow::new(
            self.insee, self.lat, self.lng, date, measurements,
        ))
    }
}

/// Parse a `DDMMYYYY` observation date
pub fn parse_observation_date(value: &str) -> Result<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ProcessingError::MalformedDate(value.to_string()));
    }

    NaiveDate::parse_from_str(value, OBSERVATION_DATE_FORMAT)
        .map_err(|_| ProcessingError::MalformedDate(value.to_string()))
}

/// Reads semicolon-delimited daily observation files.
pub struct ObservationReader {
    delimiter: u8,
}

impl ObservationReader {
    pub fn new() -> Self {
        Self {
            delimiter: OBSERVATION_DELIMITER,
        }
    }

    /// Parse one record of an observation file
    pub fn parse_record(&self, record: &StringRecord) -> Result<ObservationRow> {
        if record.len() != OBSERVATION_FIELD_COUNT {
            return Err(ProcessingError::SchemaMismatch {
                expected: OBSERVATION_FIELD_COUNT,
                found: record.len(),
            });
        }

        let raw: RawObservation = record.deserialize(None)?;
        raw.into_row()
    }

    /// Parse a single line of text
    pub fn parse_line(&self, line: &str) -> Result<ObservationRow> {
        let mut reader = self.csv_reader(line.as_bytes());
        match reader.records().next() {
            Some(record) => self.parse_record(&record?),
            None => Err(ProcessingError::SchemaMismatch {
                expected: OBSERVATION_FIELD_COUNT,
                found: 0,
            }),
        }
    }

    /// Visit every row of a file in order.
    ///
    /// Row-level failures are handed to `on_row` alongside the 1-based line
    /// number so the caller can decide to skip them. Only failures to open or
    /// read the file itself are returned; rows before such a failure have
    /// already been delivered.
    pub fn read_observations<F>(&self, path: &Path, mut on_row: F) -> Result<()>
    where
        F: FnMut(u64, Result<ObservationRow>),
    {
        let file = File::open(path).map_err(|source| ProcessingError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = self.csv_reader(BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file));

        let mut record = ByteRecord::new();
        loop {
            match reader.read_byte_record(&mut record) {
                Ok(true) => {
                    let line = record.position().map_or(0, |p| p.line());
                    on_row(line, self.parse_record(&decode_record(&record)));
                }
                Ok(false) => break,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map_or(0, |p| p.line());
                    on_row(line, Err(e.into()));
                }
            }
        }

        Ok(())
    }

    fn csv_reader<R: Read>(&self, source: R) -> csv::Reader<R> {
        ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .buffer_capacity(DEFAULT_BUFFER_SIZE)
            .from_reader(source)
    }
}

impl Default for ObservationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Records are expected as UTF-8; older exports are Windows-1252.
fn decode_record(record: &ByteRecord) -> StringRecord {
    let is_utf8 = record.iter().all(|field| std::str::from_utf8(field).is_ok());
    record
        .iter()
        .map(|field| {
            if is_utf8 {
                String::from_utf8_lossy(field)
            } else {
                WINDOWS_1252.decode(field).0
            }
        })
        .collect()
}
