use crate::{
    bayes::{Class, Diagnosis, NaiveBayesClassifier},
    error::{Error, Result},
    record::TestCase,
};
use serde::Serialize;
use std::{fmt, io::Write, path::Path};
use tracing::{info, warn};

/// One line of `hasil_uji_datatest.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    #[serde(rename = "No.")]
    pub id: String,
    #[serde(rename = "Data Hasil")]
    pub truth: String,
    #[serde(rename = "Diagnosis Result")]
    pub predicted: Class,
    #[serde(rename = "p_x_h_ya_product")]
    pub positive_product: f64,
    #[serde(rename = "p_x_h_tidak_product")]
    pub negative_product: f64,
}

impl ResultRow {
    pub fn is_correct(&self) -> bool {
        self.predicted.label() == self.truth
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
    /// Rows whose ground truth is neither Ya nor Tidak.
    pub unlabelled: usize,
}

impl ConfusionMatrix {
    fn record(&mut self, predicted: Class, truth: Option<Class>) {
        match (predicted, truth) {
            (Class::Positive, Some(Class::Positive)) => self.true_positive += 1,
            (Class::Positive, Some(Class::Negative)) => self.false_positive += 1,
            (Class::Negative, Some(Class::Negative)) => self.true_negative += 1,
            (Class::Negative, Some(Class::Positive)) => self.false_negative += 1,
            (_, None) => self.unlabelled += 1,
        }
    }
}

/// A test case that could not be scored.
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    pub id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub rows: Vec<ResultRow>,
    pub diagnoses: Vec<Diagnosis>,
    pub skipped: Vec<Skipped>,
    pub confusion: ConfusionMatrix,
}

impl Evaluation {
    pub fn push(&mut self, case: &TestCase, diagnosis: Diagnosis) {
        self.confusion
            .record(diagnosis.class, Class::from_label(&case.truth));
        self.rows.push(ResultRow {
            id: case.id.clone(),
            truth: case.truth.clone(),
            predicted: diagnosis.class,
            positive_product: diagnosis.positive_product,
            negative_product: diagnosis.negative_product,
        });
        self.diagnoses.push(diagnosis);
    }

    /// Every test case, scored or skipped. Skipped cases count as incorrect.
    pub fn total(&self) -> usize {
        self.rows.len() + self.skipped.len()
    }

    pub fn correct(&self) -> usize {
        self.rows.iter().filter(|row| row.is_correct()).count()
    }

    /// Percentage of test cases predicted correctly; `None` for an empty batch.
    pub fn accuracy(&self) -> Option<f64> {
        if self.total() == 0 {
            return None;
        }
        Some(self.correct() as f64 / self.total() as f64 * 100.0)
    }
}

/// Diagnoses every test case. Only an `AttributeNotFound` from the classifier
/// is tolerated, and only per record.
pub fn evaluate(classifier: &NaiveBayesClassifier, cases: &[TestCase]) -> Result<Evaluation> {
    let mut evaluation = Evaluation::default();

    for case in cases {
        match classifier.diagnose(&case.record) {
            Ok(diagnosis) => evaluation.push(case, diagnosis),
            Err(Error::AttributeNotFound { label }) => {
                warn!(id = %case.id, label = %label, "skipping record");
                evaluation.skipped.push(Skipped {
                    id: case.id.clone(),
                    reason: format!("data for attribute '{}' is not found", label),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        scored = evaluation.rows.len(),
        correct = evaluation.correct(),
        skipped = evaluation.skipped.len(),
        "evaluation finished"
    );
    Ok(evaluation)
}

pub fn write_results<P: AsRef<Path>>(path: P, rows: &[ResultRow]) -> Result<()> {
    let writer = csv::Writer::from_path(path)?;
    write_rows(writer, rows)
}

pub fn write_results_to<W: Write>(writer: W, rows: &[ResultRow]) -> Result<()> {
    write_rows(csv::Writer::from_writer(writer), rows)
}

fn write_rows<W: Write>(mut writer: csv::Writer<W>, rows: &[ResultRow]) -> Result<()> {
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Console rendering of a single diagnosis.
pub struct DiagnosisReport<'a>(pub &'a Diagnosis);

impl fmt::Display for DiagnosisReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        for factor in &d.factors {
            match factor.likelihood {
                Some(l) => writeln!(
                    f,
                    "{} P(X|H) Ya: {:.9}, P(X|H) Tidak: {:.9}",
                    factor.label, l.yes, l.no
                )?,
                None => writeln!(f, "Data for attribute '{}' is not found.", factor.label)?,
            }
        }
        writeln!(f, "p_x_h_ya = {}", d.positive_product)?;
        writeln!(f, "p_x_h_tidak = {}", d.negative_product)?;
        writeln!(f, "P(X|Hasil=Ya) * P(Ya) = {}", d.final_positive)?;
        writeln!(f, "P(X|Hasil=Tidak) * P(Tidak) = {}", d.final_negative)?;
        write!(f, "{}", d.class.verdict())
    }
}

/// Console summary printed after a batch run.
pub struct Summary<'a>(pub &'a Evaluation);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0;
        match e.accuracy() {
            Some(accuracy) => writeln!(f, "Accuracy: {:.2}%", accuracy)?,
            None => writeln!(f, "Accuracy: n/a (no records)")?,
        }
        writeln!(f, "Correct: {}/{}", e.correct(), e.total())?;

        let c = &e.confusion;
        writeln!(f, "{:>16}{:>10}{:>10}", "", "pred Ya", "pred Tidak")?;
        writeln!(
            f,
            "{:>16}{:>10}{:>10}",
            "actual Ya", c.true_positive, c.false_negative
        )?;
        write!(
            f,
            "{:>16}{:>10}{:>10}",
            "actual Tidak", c.false_positive, c.true_negative
        )?;
        if c.unlabelled > 0 {
            write!(f, "\nUnlabelled: {}", c.unlabelled)?;
        }
        for skipped in &e.skipped {
            write!(f, "\nSkipped {}: {}", skipped.id, skipped.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bayes::MissingPolicy,
        record::Schema,
        table::{ProbabilityTable, Row},
    };

    fn table() -> ProbabilityTable {
        ProbabilityTable::from_rows(vec![
            Row::new("", 0.5, 0.5),
            Row::new("Pusing Ya", 0.9, 0.1),
            Row::new("Pusing Tidak", 0.1, 0.9),
        ])
        .unwrap()
    }

    fn case(id: usize, value: &str, truth: &str) -> TestCase {
        TestCase {
            id: id.to_string(),
            record: Schema::new(["Pusing"]).unwrap().record([value]).unwrap(),
            truth: truth.to_string(),
        }
    }

    #[test]
    fn six_of_ten_correct_is_sixty_percent() {
        let t = table();
        let classifier = NaiveBayesClassifier::new(&t);

        // 6 predicted right, 4 wrong.
        let mut cases = Vec::new();
        for i in 0..6 {
            cases.push(case(i + 1, "Ya", "Ya"));
        }
        for i in 6..10 {
            cases.push(case(i + 1, "Tidak", "Ya"));
        }

        let e = evaluate(&classifier, &cases).unwrap();
        assert_eq!(e.total(), 10);
        assert_eq!(e.correct(), 6);
        assert_eq!(format!("{:.2}", e.accuracy().unwrap()), "60.00");
        assert_eq!(e.confusion.true_positive, 6);
        assert_eq!(e.confusion.false_negative, 4);
        assert!(Summary(&e).to_string().starts_with("Accuracy: 60.00%"));
    }

    #[test]
    fn empty_batch_has_no_accuracy() {
        let t = table();
        let e = evaluate(&NaiveBayesClassifier::new(&t), &[]).unwrap();
        assert_eq!(e.accuracy(), None);
    }

    #[test]
    fn excluded_attribute_still_counts_toward_accuracy() {
        let t = table();
        let e = evaluate(&NaiveBayesClassifier::new(&t), &[case(1, "Kadang", "Ya")]).unwrap();
        assert_eq!(e.total(), 1);
        assert_eq!(e.diagnoses[0].missing.len(), 1);
        // Equal priors and no evidence: tie goes to Ya.
        assert_eq!(e.correct(), 1);
    }

    #[test]
    fn fail_policy_skips_record() {
        let t = table();
        let classifier = NaiveBayesClassifier::new(&t).with_policy(MissingPolicy::Fail);
        let e = evaluate(&classifier, &[case(1, "Kadang", "Ya"), case(2, "Ya", "Ya")]).unwrap();
        assert_eq!(e.rows.len(), 1);
        assert_eq!(e.skipped.len(), 1);
        assert_eq!(e.skipped[0].id, "1");
        // The skipped record stays in the denominator.
        assert_eq!(e.total(), 2);
        assert_eq!(e.correct(), 1);
        assert_eq!(format!("{:.2}", e.accuracy().unwrap()), "50.00");
    }

    #[test]
    fn unknown_truth_label_is_unlabelled() {
        let t = table();
        let e = evaluate(&NaiveBayesClassifier::new(&t), &[case(1, "Ya", "?")]).unwrap();
        assert_eq!(e.correct(), 0);
        assert_eq!(e.confusion.unlabelled, 1);
    }

    #[test]
    fn result_csv_has_reference_header() {
        let rows = vec![ResultRow {
            id: "1".to_string(),
            truth: "Ya".to_string(),
            predicted: Class::Negative,
            positive_product: 0.25,
            negative_product: 0.5,
        }];
        let mut buf = Vec::new();
        write_results_to(&mut buf, &rows).unwrap();

        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("No.,Data Hasil,Diagnosis Result,p_x_h_ya_product,p_x_h_tidak_product")
        );
        assert_eq!(lines.next(), Some("1,Ya,Tidak,0.25,0.5"));
    }

    #[test]
    fn diagnosis_report_notes_missing_attribute() {
        let t = table();
        let record = Schema::new(["Pusing"]).unwrap().record(["Kadang"]).unwrap();
        let d = NaiveBayesClassifier::new(&t).diagnose(&record).unwrap();
        let text = DiagnosisReport(&d).to_string();
        assert!(text.contains("Data for attribute 'Pusing Kadang' is not found."));
        assert!(text.ends_with("mengalami penyakit hipertensi."));
    }
}
