use super::{Dataset, DatasetError, PredictionColumn};
use ndarray::Array1;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

const REQUIRED_COLUMNS: [&str; 2] = ["rating", "sampleIndex"];
const CONFIG_COLUMN: &str = "configFlags";

/// One row of feedback_dataset.csv. Columns the analysis doesn't use are ignored.
#[derive(Debug, Deserialize)]
struct FeedbackRecord {
    rating: f64,
    #[serde(rename = "sampleIndex")]
    sample_index: i64,
    #[serde(rename = "mlpGenomePrediction", default)]
    genome: Option<f64>,
    #[serde(rename = "mlpAudioPrediction", default)]
    audio: Option<f64>,
    #[serde(rename = "mlpPrediction", default)]
    legacy: Option<f64>,
    #[serde(rename = "configFlags", default)]
    config_flags: Option<String>,
}

impl FeedbackRecord {
    fn prediction(&self, column: PredictionColumn) -> Option<f64> {
        match column {
            PredictionColumn::Genome => self.genome,
            PredictionColumn::Audio => self.audio,
            PredictionColumn::Legacy => self.legacy,
        }
    }
}

/// Load the feedback log at `path` and order it by sample index
pub fn load_dataset(path: &Path) -> Result<Dataset, DatasetError> {
    if !path.is_file() {
        return Err(DatasetError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = csv::Reader::from_path(path)?;
    read_dataset(reader)
}

/// Parse a feedback log from any CSV reader (the first record must be the header)
pub fn read_dataset<R: Read>(mut reader: csv::Reader<R>) -> Result<Dataset, DatasetError> {
    let headers = reader.headers()?.clone();
    let has_column = |name: &str| headers.iter().any(|h| h == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .into_iter()
        .filter(|name| !has_column(*name))
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(DatasetError::MissingColumns(missing));
    }

    let has_dual = has_column(PredictionColumn::Genome.header())
        && has_column(PredictionColumn::Audio.header());
    let has_legacy = has_column(PredictionColumn::Legacy.header());
    if !has_dual && !has_legacy {
        return Err(DatasetError::MissingPredictionColumns);
    }

    let present: Vec<PredictionColumn> = PredictionColumn::ALL
        .into_iter()
        .filter(|column| has_column(column.header()))
        .collect();
    let has_config = has_column(CONFIG_COLUMN);

    let mut records = Vec::<FeedbackRecord>::new();
    for (row, result) in reader.deserialize().enumerate() {
        let record: FeedbackRecord = result?;

        for column in &present {
            if record.prediction(*column).is_none() {
                return Err(DatasetError::IncompletePredictionColumn {
                    column: column.header(),
                    row: row + 1,
                });
            }
        }

        records.push(record);
    }

    // Stable, so duplicate indices keep their file order
    records.sort_by_key(|record| record.sample_index);

    log::debug!(
        "parsed {} rows, prediction columns: {:?}",
        records.len(),
        present
    );

    let predictions = present
        .into_iter()
        .map(|column| {
            let values: Array1<f64> = records
                .iter()
                .map(|record| record.prediction(column).unwrap_or(f64::NAN))
                .collect();
            (column, values)
        })
        .collect();

    Ok(Dataset {
        sample_index: records.iter().map(|record| record.sample_index).collect(),
        rating: records.iter().map(|record| record.rating).collect(),
        predictions,
        config: has_config.then(|| {
            records
                .iter_mut()
                .map(|record| record.config_flags.take())
                .collect()
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use std::fs;

    fn parse(contents: &str) -> Result<Dataset, DatasetError> {
        read_dataset(csv::Reader::from_reader(contents.as_bytes()))
    }

    #[test]
    fn dual_format_sorted_by_sample_index() {
        let dataset = parse(
            "sampleIndex,rating,mlpGenomePrediction,mlpAudioPrediction,configFlags,gene0\n\
             2,1.0,0.8,0.6,audio,0.1\n\
             0,0.0,0.2,0.4,baseline,0.2\n\
             1,1.0,0.7,0.5,audio,0.3\n",
        )
        .unwrap();

        assert_eq!(dataset.sample_index, array![0, 1, 2]);
        assert_eq!(dataset.rating, array![0.0, 1.0, 1.0]);
        assert_eq!(
            dataset.prediction(PredictionColumn::Genome).unwrap(),
            array![0.2, 0.7, 0.8]
        );
        assert_eq!(
            dataset.prediction(PredictionColumn::Audio).unwrap(),
            array![0.4, 0.5, 0.6]
        );
        assert_eq!(
            dataset.config.unwrap(),
            vec![
                Some("baseline".to_string()),
                Some("audio".to_string()),
                Some("audio".to_string())
            ]
        );
    }

    #[test]
    fn duplicate_indices_keep_file_order() {
        let dataset = parse(
            "sampleIndex,rating,mlpPrediction\n\
             1,1.0,0.9\n\
             0,0.0,0.1\n\
             1,0.0,0.3\n",
        )
        .unwrap();

        assert_eq!(dataset.sample_index, array![0, 1, 1]);
        assert_eq!(
            dataset.prediction(PredictionColumn::Legacy).unwrap(),
            array![0.1, 0.9, 0.3]
        );
        assert!(dataset.config.is_none());
    }

    #[test]
    fn missing_required_columns_are_named() {
        match parse("index,mlpPrediction\n0,0.5\n") {
            Err(DatasetError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["rating".to_string(), "sampleIndex".to_string()]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn half_of_dual_format_is_rejected() {
        let result = parse("sampleIndex,rating,mlpGenomePrediction\n0,1.0,0.5\n");
        assert!(matches!(result, Err(DatasetError::MissingPredictionColumns)));
    }

    #[test]
    fn empty_prediction_cell_is_rejected() {
        let result = parse(
            "sampleIndex,rating,mlpPrediction\n\
             0,1.0,0.5\n\
             1,0.0,\n",
        );

        match result {
            Err(DatasetError::IncompletePredictionColumn { column, row }) => {
                assert_eq!(column, "mlpPrediction");
                assert_eq!(row, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn header_only_file_is_an_empty_dataset() {
        let dataset = parse("sampleIndex,rating,mlpPrediction\n").unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.prediction_columns(), vec![PredictionColumn::Legacy]);
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feedback_dataset.csv");
        fs::write(&path, "sampleIndex,rating,mlpPrediction\n0,1.0,0.5\n").unwrap();

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 1);

        let missing = dir.path().join("nope.csv");
        match load_dataset(&missing) {
            Err(DatasetError::NotFound { path }) => assert_eq!(path, missing),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
