use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::info;

use crate::{LoadError, Record, Result};

/// Parses a JSON array of records from `reader`
///
/// When `expected` is non-zero the array must hold exactly that many records.
pub fn read_records<R: Read>(reader: R, expected: usize) -> Result<Vec<Record>> {
    let records: Vec<Record> = serde_json::from_reader(reader)?;
    if expected > 0 && records.len() != expected {
        return Err(LoadError::UnexpectedRecordCount {
            expected,
            got: records.len(),
        }
        .into());
    }
    Ok(records)
}

/// Opens `path` and parses its records, see [`read_records`]
pub fn load_records<P: AsRef<Path>>(path: P, expected: usize) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let handle = File::open(path).map(BufReader::new)?;
    let records = read_records(handle, expected)?;
    info!(path = %path.display(), records = records.len(), "loaded records");
    Ok(records)
}
