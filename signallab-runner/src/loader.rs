//! Candle loading from JSON and CSV files.
//!
//! The format is chosen by file extension:
//! - `.json`: an array of `{time, open, high, low, close, volume}` objects
//! - `.csv`: header `time,open,high,low,close,volume`, one candle per row
//!
//! Values are taken as-is; non-finite prices are left for the stages to
//! report and duplicate timestamps are not checked.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use signallab_core::Candle;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid candle JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid candle CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unsupported candle file '{0}' (expected .json or .csv)")]
    UnknownFormat(String),
}

/// Load candles from `path`, dispatching on its extension.
pub fn load_candles(path: &Path) -> Result<Vec<Candle>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let candles = match ext.as_deref() {
        Some("json") => read_json(BufReader::new(open(path)?))?,
        Some("csv") => read_csv(open(path)?)?,
        _ => return Err(LoadError::UnknownFormat(path.display().to_string())),
    };

    debug!(path = %path.display(), candles = candles.len(), "candles loaded");
    Ok(candles)
}

pub fn read_json<R: std::io::Read>(reader: R) -> Result<Vec<Candle>, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn read_csv<R: std::io::Read>(reader: R) -> Result<Vec<Candle>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let candles = rdr.deserialize().collect::<Result<Vec<Candle>, _>>()?;
    Ok(candles)
}

/// Write candles as CSV with the standard header.
pub fn write_csv<W: std::io::Write>(writer: W, candles: &[Candle]) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for candle in candles {
        wtr.serialize(candle)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn open(path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}
