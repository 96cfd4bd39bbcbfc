use crate::error::{line_of, Error, Result};
use std::{io::Read, path::Path};

/// Attribute names of the reference hypertension data set, in column order.
pub const DEFAULT_ATTRIBUTES: [&str; 8] = [
    "Jenis Kelamin",
    "Usia",
    "Pusing",
    "Berat diTengkuk",
    "Sesak Nafas",
    "Jantung Berdebar",
    "Tekanan Darah Sistolik",
    "Tekanan Darah Diastolik",
];

/// Ordered attribute names. Column `i + 1` of a test row holds the value of attribute `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    attributes: Vec<String>,
}

impl Default for Schema {
    fn default() -> Self {
        Schema {
            attributes: DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Schema {
    pub fn new<I, S>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attributes: Vec<String> = attributes.into_iter().map(Into::into).collect();
        if attributes.is_empty() {
            return Err(Error::malformed("<schema>", 0, "schema has no attributes"));
        }
        Ok(Schema { attributes })
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Pairs `values` with the attribute names, position by position.
    pub fn record<I, S>(&self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if values.len() != self.attributes.len() {
            return Err(Error::malformed(
                "<record>",
                0,
                format!(
                    "expected {} attribute values, found {}",
                    self.attributes.len(),
                    values.len()
                ),
            ));
        }

        Ok(Record {
            pairs: self.attributes.iter().cloned().zip(values).collect(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pairs: Vec<(String, String)>,
}

impl Record {
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// `"name value"` strings, matched against the probability table labels.
    pub fn labels(&self) -> impl Iterator<Item = String> + '_ {
        self.pairs
            .iter()
            .map(|(name, value)| format!("{} {}", name, value))
    }
}

/// A labelled row from the test-record source.
#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub id: String,
    pub record: Record,
    pub truth: String,
}

pub fn read_test_cases<P: AsRef<Path>>(path: P, schema: &Schema) -> Result<Vec<TestCase>> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    collect_test_cases(reader, schema, &path.display().to_string())
}

pub fn read_test_cases_from<R: Read>(
    reader: R,
    schema: &Schema,
    source_name: &str,
) -> Result<Vec<TestCase>> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    collect_test_cases(reader, schema, source_name)
}

fn collect_test_cases<R: Read>(
    mut reader: csv::Reader<R>,
    schema: &Schema,
    source_name: &str,
) -> Result<Vec<TestCase>> {
    let width = schema.len() + 2;

    let mut cases = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Header is row 1.
        let record = record.map_err(|e| Error::from_csv(e, source_name, i + 2))?;
        let row = line_of(&record, i + 2);
        if record.len() != width {
            return Err(Error::malformed(
                source_name,
                row,
                format!("expected {} fields, found {}", width, record.len()),
            ));
        }

        let values = record.iter().skip(1).take(schema.len());
        cases.push(TestCase {
            id: record[0].to_string(),
            record: schema.record(values)?,
            truth: record[width - 1].trim().to_string(),
        });
    }

    Ok(cases)
}
