use anyhow::{Context, Result};
use clap::Parser;
use hypertension_bayes::{
    config::{init_logging, Cli, Command},
    record, report, NaiveBayesClassifier, ProbabilityTable,
};
use tracing::info;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let table = ProbabilityTable::from_path(&cli.prior)
        .with_context(|| format!("failed to load prior table {}", cli.prior.display()))?;
    let schema = cli.schema()?;
    let classifier = NaiveBayesClassifier::new(&table).with_policy(cli.on_missing);

    match &cli.command {
        Command::Batch { tests, output } => {
            let cases = record::read_test_cases(tests, &schema)
                .with_context(|| format!("failed to read test records {}", tests.display()))?;
            info!(records = cases.len(), "diagnosing test records");

            let evaluation = report::evaluate(&classifier, &cases)?;
            for (row, diagnosis) in evaluation.rows.iter().zip(&evaluation.diagnoses) {
                println!("\nDiagnosis Result for No. {}", row.id);
                println!("{}", report::DiagnosisReport(diagnosis));
                println!("Hasil Diagnosis: {}", row.predicted);
                println!("------------");
            }

            report::write_results(output, &evaluation.rows)
                .with_context(|| format!("failed to write results {}", output.display()))?;
            info!(path = %output.display(), "wrote results");

            println!("\n{}", report::Summary(&evaluation));
        }
        Command::Diagnose { values } => {
            let record = schema.record(values.iter().cloned())?;
            let diagnosis = classifier.diagnose(&record)?;
            println!("{}", report::DiagnosisReport(&diagnosis));
        }
    }

    Ok(())
}
