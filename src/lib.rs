pub mod bayes;
pub mod config;
pub mod error;
pub mod record;
pub mod report;
pub mod table;

pub use bayes::{Class, Diagnosis, MissingPolicy, NaiveBayesClassifier};
pub use error::{Error, Result};
pub use record::{Record, Schema, TestCase};
pub use table::{Likelihood, ProbabilityTable};
