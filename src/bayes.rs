use crate::{
    error::{Error, Result},
    record::Record,
    table::{Likelihood, ProbabilityTable},
};
use serde::Serialize;
use std::{fmt, str::FromStr};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Class {
    #[serde(rename = "Ya")]
    Positive,
    #[serde(rename = "Tidak")]
    Negative,
}

impl Class {
    pub fn label(self) -> &'static str {
        match self {
            Class::Positive => "Ya",
            Class::Negative => "Tidak",
        }
    }

    /// Parses a ground-truth label. Anything other than `Ya`/`Tidak` is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Ya" => Some(Class::Positive),
            "Tidak" => Some(Class::Negative),
            _ => None,
        }
    }

    pub fn verdict(self) -> &'static str {
        match self {
            Class::Positive => "Hasil dari nilai probabilitas akhir terbesar berada di kelas Ya, maka orang tersebut mengalami penyakit hipertensi.",
            Class::Negative => "Hasil dari nilai probabilitas akhir terbesar berada di kelas Tidak, maka orang tersebut tidak mengalami penyakit hipertensi.",
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do with an attribute whose label is absent from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPolicy {
    /// Treat the attribute as a (1.0, 1.0) factor and note it.
    #[default]
    Exclude,
    /// Reject the whole record.
    Fail,
}

impl FromStr for MissingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exclude" | "skip" => Ok(MissingPolicy::Exclude),
            "fail" | "error" => Ok(MissingPolicy::Fail),
            _ => Err(format!("unknown missing-attribute policy: {}", s)),
        }
    }
}

/// One attribute's contribution; `likelihood` is `None` when the label was not found.
#[derive(Debug, Clone, PartialEq)]
pub struct Factor {
    pub label: String,
    pub likelihood: Option<Likelihood>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub class: Class,
    /// Product of P(x_i | Ya) over found attributes.
    pub positive_product: f64,
    /// Product of P(x_i | Tidak) over found attributes.
    pub negative_product: f64,
    pub final_positive: f64,
    pub final_negative: f64,
    pub factors: Vec<Factor>,
    pub missing: Vec<String>,
}

pub struct NaiveBayesClassifier<'a> {
    table: &'a ProbabilityTable,
    policy: MissingPolicy,
}

impl<'a> NaiveBayesClassifier<'a> {
    pub fn new(table: &'a ProbabilityTable) -> Self {
        NaiveBayesClassifier {
            table,
            policy: MissingPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MissingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Given a record of attribute values, decides between Ya and Tidak.
    pub fn diagnose(&self, record: &Record) -> Result<Diagnosis> {
        let mut factors = Vec::with_capacity(record.pairs().len());
        let mut missing = Vec::new();

        for label in record.labels() {
            let likelihood = self.table.lookup(&label);
            match likelihood {
                Some(l) => debug!(label = %label, p_yes = l.yes, p_no = l.no, "P(X|H)"),
                None => {
                    if self.policy == MissingPolicy::Fail {
                        return Err(Error::AttributeNotFound { label });
                    }
                    warn!(label = %label, "data for attribute is not found");
                    missing.push(label.clone());
                }
            }
            factors.push(Factor { label, likelihood });
        }

        let product = factors.iter().fold(Likelihood::ONE, |acc, factor| {
            let l = factor.likelihood.unwrap_or(Likelihood::ONE);
            Likelihood {
                yes: acc.yes * l.yes,
                no: acc.no * l.no,
            }
        });

        let final_positive = product.yes * self.table.prior_positive();
        let final_negative = product.no * self.table.prior_negative();

        // Ties go to Ya.
        let class = if final_positive >= final_negative {
            Class::Positive
        } else {
            Class::Negative
        };

        debug!(
            p_x_h_ya = product.yes,
            p_x_h_tidak = product.no,
            final_ya = final_positive,
            final_tidak = final_negative,
            %class,
            "diagnosed record"
        );

        Ok(Diagnosis {
            class,
            positive_product: product.yes,
            negative_product: product.no,
            final_positive,
            final_negative,
            factors,
            missing,
        })
    }
}
