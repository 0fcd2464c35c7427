use std::path::Path;

use csv::StringRecord;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use tracing::info;

use crate::error::IngestError;

/// Fixed shuffle seed; repeated runs over the same input produce
/// byte-identical partitions.
const SPLIT_SEED: u64 = 42;

/// A CSV file held fully in memory. Each row keeps its position in the
/// input file, emitted as the leading index column of the partitions.
#[derive(Debug)]
pub struct Dataset {
    headers: StringRecord,
    rows: Vec<(usize, StringRecord)>,
}

pub fn load_csv(path: &Path) -> Result<Dataset, IngestError> {
    info!(path = %path.display(), "loading dataset");
    let file = std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader
        .headers()
        .map_err(|source| data_format(path, source))?
        .clone();
    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|source| data_format(path, source))?;
        rows.push((index, record));
    }
    Ok(Dataset { headers, rows })
}

/// Shuffles the rows of the CSV at `raw_path` with a fixed seed and writes
/// the first `round(N * ratio)` of them to `train_path`, the rest to
/// `test_path`. Rows land in shuffle order, never duplicated or dropped.
pub fn split(
    raw_path: &Path,
    ratio: f64,
    train_path: &Path,
    test_path: &Path,
) -> Result<(), IngestError> {
    info!(ratio, "starting the data split process");
    let dataset = load_csv(raw_path)?;
    let (train, test) = partition(dataset.rows, ratio);
    write_partition(train_path, &dataset.headers, &train)?;
    info!(rows = train.len(), path = %train_path.display(), "train data saved");
    write_partition(test_path, &dataset.headers, &test)?;
    info!(rows = test.len(), path = %test_path.display(), "test data saved");
    Ok(())
}

fn partition(
    mut rows: Vec<(usize, StringRecord)>,
    ratio: f64,
) -> (Vec<(usize, StringRecord)>, Vec<(usize, StringRecord)>) {
    let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
    rows.shuffle(&mut rng);
    let split_at = ((rows.len() as f64) * ratio).round() as usize;
    let split_at = split_at.min(rows.len());
    let test = rows.split_off(split_at);
    (rows, test)
}

fn write_partition(
    path: &Path,
    headers: &StringRecord,
    rows: &[(usize, StringRecord)],
) -> Result<(), IngestError> {
    let file = std::fs::File::create(path).map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut writer = csv::Writer::from_writer(file);

    // leading empty header field for the index column
    let mut header_row = StringRecord::new();
    header_row.push_field("");
    for field in headers {
        header_row.push_field(field);
    }
    writer
        .write_record(&header_row)
        .map_err(|source| write_failure(path, source))?;

    for (index, record) in rows {
        let mut row = StringRecord::new();
        row.push_field(&index.to_string());
        for field in record {
            row.push_field(field);
        }
        writer
            .write_record(&row)
            .map_err(|source| write_failure(path, source))?;
    }
    writer.flush().map_err(|source| IngestError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn data_format(path: &Path, source: csv::Error) -> IngestError {
    IngestError::DataFormat {
        path: path.display().to_string(),
        source,
    }
}

fn write_failure(path: &Path, err: csv::Error) -> IngestError {
    let path = path.display().to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => IngestError::Io { path, source },
        kind => IngestError::Io {
            path,
            source: std::io::Error::other(format!("{kind:?}")),
        },
    }
}
