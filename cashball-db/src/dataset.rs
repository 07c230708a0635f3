use std::fs::File;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::models::{
    BallColumns, DrawRecord, date_ordinal, parse_draw_date, tokenize_balls, validate_cash_ball,
};

/// Noms des colonnes du fichier source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub date: String,
    pub numbers: String,
    pub cash_ball: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            date: "Draw Date".to_string(),
            numbers: "Winning Numbers".to_string(),
            cash_ball: "Cash Ball".to_string(),
        }
    }
}

pub fn default_data_path() -> PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("cash4life.csv");
    path
}

/// Résultat du chargement : le fichier absent n'est pas une erreur mais un état.
#[derive(Debug)]
pub enum Source {
    Loaded(Dataset),
    Missing { path: PathBuf, reason: String },
}

/// Historique immuable des tirages, trié par date croissante.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<DrawRecord>,
    ordinals: Vec<i64>,
    balls: BallColumns,
}

impl Dataset {
    /// Construit le jeu de données à partir des tirages dans l'ordre du fichier.
    ///
    /// Les boules sont découpées pour chaque tirage ; un seul échec rend les
    /// colonnes absentes pour tout le jeu de données.
    pub fn prepare(records: Vec<DrawRecord>) -> Self {
        let mut parsed: Vec<(DrawRecord, [u8; 5])> = Vec::with_capacity(records.len());
        let mut failure: Option<(usize, String)> = None;

        for (i, record) in records.iter().enumerate() {
            match tokenize_balls(&record.winning_numbers) {
                Ok(balls) => parsed.push((record.clone(), balls)),
                Err(reason) => {
                    failure = Some((i + 1, reason));
                    break;
                }
            }
        }

        let (records, balls) = match failure {
            None => {
                parsed.sort_by_key(|(record, _)| record.date);
                let (records, balls): (Vec<_>, Vec<_>) = parsed.into_iter().unzip();
                (records, BallColumns::Present(balls))
            }
            Some((row, reason)) => {
                log::warn!("Colonnes boules ignorées : tirage {row} : {reason}");
                let mut records = records;
                records.sort_by_key(|record| record.date);
                (records, BallColumns::Absent { row, reason })
            }
        };

        let ordinals = records.iter().map(|r| date_ordinal(r.date)).collect();

        Self {
            records,
            ordinals,
            balls,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn ordinals(&self) -> &[i64] {
        &self.ordinals
    }

    pub fn ball_columns(&self) -> &BallColumns {
        &self.balls
    }

    /// Boules dérivées, une ligne par tirage ; échoue si les colonnes sont absentes.
    pub fn balls(&self) -> Result<&[[u8; 5]], DatasetError> {
        match &self.balls {
            BallColumns::Present(balls) => Ok(balls),
            BallColumns::Absent { row, reason } => Err(DatasetError::MalformedBalls {
                row: *row,
                reason: reason.clone(),
            }),
        }
    }

    /// Contrôle appliqué juste après le chargement.
    pub fn validate(&self) -> Result<(), DatasetError> {
        self.balls().map(|_| ())
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.records.first(), self.records.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// Empreinte du contenu, stable pour un même binaire.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for (record, ordinal) in self.records.iter().zip(&self.ordinals) {
            record.date.hash(&mut hasher);
            record.winning_numbers.hash(&mut hasher);
            record.cash_ball.hash(&mut hasher);
            ordinal.hash(&mut hasher);
        }
        hasher.finish()
    }
}

fn missing(path: &Path, reason: String) -> Source {
    log::warn!("Fichier de tirages indisponible {:?} : {}", path, reason);
    Source::Missing {
        path: path.to_path_buf(),
        reason,
    }
}

/// Fichier introuvable ou illisible → `Source::Missing` ; contenu invalide → erreur.
pub fn load_dataset(path: &Path, columns: &ColumnNames) -> Result<Source, DatasetError> {
    if path.is_dir() {
        return Ok(missing(path, "le chemin est un répertoire".to_string()));
    }
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) => return Ok(missing(path, e.to_string())),
    };

    let records = match read_records(file, columns) {
        Ok(records) => records,
        Err(DatasetError::Csv(e)) if e.is_io_error() => return Ok(missing(path, e.to_string())),
        Err(e) => return Err(e),
    };
    let dataset = Dataset::prepare(records);
    log::info!("{} tirages chargés depuis {:?}", dataset.len(), path);
    Ok(Source::Loaded(dataset))
}

pub fn read_records<R: Read>(
    reader: R,
    columns: &ColumnNames,
) -> Result<Vec<DrawRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let find = |name: &str| -> Result<usize, DatasetError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DatasetError::MissingColumn(name.to_string()))
    };
    let date_idx = find(&columns.date)?;
    let numbers_idx = find(&columns.numbers)?;
    let cash_idx = find(&columns.cash_ball)?;

    let mut records = Vec::new();
    for (i, record_result) in reader.records().enumerate() {
        let record = record_result?;
        let row = record.position().map(|p| p.line() as usize).unwrap_or(i + 2);

        let raw_date = record.get(date_idx).unwrap_or_default();
        let date = parse_draw_date(raw_date).ok_or_else(|| DatasetError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;

        let raw_cash = record.get(cash_idx).unwrap_or_default();
        let cash_ball = raw_cash
            .parse::<u8>()
            .ok()
            .filter(|&c| validate_cash_ball(c))
            .ok_or_else(|| DatasetError::InvalidCashBall {
                row,
                value: raw_cash.to_string(),
            })?;

        records.push(DrawRecord {
            date,
            winning_numbers: record.get(numbers_idx).unwrap_or_default().to_string(),
            cash_ball,
        });
    }

    Ok(records)
}
