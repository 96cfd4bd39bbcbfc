use crate::error::{line_of, Error, Result};
use csv::StringRecord;
use std::{io::Read, path::Path};
use tracing::info;

/// A pair of conditional likelihoods, P(x | Ya) and P(x | Tidak).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Likelihood {
    pub yes: f64,
    pub no: f64,
}

impl Likelihood {
    /// The "no information" factor.
    pub const ONE: Likelihood = Likelihood { yes: 1.0, no: 1.0 };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: String,
    pub likelihood: Likelihood,
}

impl Row {
    pub fn new(label: impl Into<String>, yes: f64, no: f64) -> Self {
        Row {
            label: label.into(),
            likelihood: Likelihood { yes, no },
        }
    }
}

/// Prior and likelihood rows as loaded from `prior.csv`.
///
/// Row 0 holds the class priors; every row (row 0 included) is searchable by label.
#[derive(Debug, Clone)]
pub struct ProbabilityTable {
    rows: Vec<Row>,
}

impl ProbabilityTable {
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::malformed("<memory>", 0, "table has no rows"));
        }
        for (i, row) in rows.iter().enumerate() {
            let Likelihood { yes, no } = row.likelihood;
            if !(0.0..=1.0).contains(&yes) || !(0.0..=1.0).contains(&no) {
                return Err(Error::malformed(
                    "<memory>",
                    i + 1,
                    format!("{:?} is not a probability pair in [0, 1]", row.label),
                ));
            }
        }
        Ok(ProbabilityTable { rows })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(path)?;
        Self::load(reader, &source_name)
    }

    pub fn from_reader<R: Read>(reader: R, source_name: &str) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        Self::load(reader, source_name)
    }

    fn load<R: Read>(mut reader: csv::Reader<R>, source_name: &str) -> Result<Self> {
        let mut rows = Vec::new();
        for (i, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::from_csv(e, source_name, i + 1))?;
            rows.push(Self::parse_row(&record, source_name, line_of(&record, i + 1))?);
        }

        if rows.is_empty() {
            return Err(Error::malformed(source_name, 0, "source has no rows"));
        }

        info!(source = source_name, rows = rows.len(), "loaded probability table");
        Ok(ProbabilityTable { rows })
    }

    fn parse_row(record: &StringRecord, source_name: &str, row: usize) -> Result<Row> {
        if record.len() < 3 {
            return Err(Error::malformed(
                source_name,
                row,
                format!("expected at least 3 fields, found {}", record.len()),
            ));
        }

        let parse = |idx: usize| -> Result<f64> {
            let field = &record[idx];
            let value = field.trim().parse::<f64>().map_err(|_| {
                Error::malformed(
                    source_name,
                    row,
                    format!("field {} is not a number: {:?}", idx + 1, field),
                )
            })?;
            // Also rejects NaN and the infinities.
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::malformed(
                    source_name,
                    row,
                    format!("field {} is not a probability in [0, 1]: {:?}", idx + 1, field),
                ));
            }
            Ok(value)
        };

        Ok(Row::new(&record[0], parse(1)?, parse(2)?))
    }

    /// P(class = Ya), read verbatim from row 0.
    pub fn prior_positive(&self) -> f64 {
        self.rows[0].likelihood.yes
    }

    /// P(class = Tidak), read verbatim from row 0.
    pub fn prior_negative(&self) -> f64 {
        self.rows[0].likelihood.no
    }

    /// Multiplies the likelihoods of every row whose label equals `label`.
    /// Returns `None` when no row matches.
    pub fn lookup(&self, label: &str) -> Option<Likelihood> {
        self.rows
            .iter()
            .filter(|row| row.label == label)
            .fold(None, |acc: Option<Likelihood>, row| {
                let acc = acc.unwrap_or(Likelihood::ONE);
                Some(Likelihood {
                    yes: acc.yes * row.likelihood.yes,
                    no: acc.no * row.likelihood.no,
                })
            })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
