//! Offline accuracy check for the classifier.
//!
//! Reads a JSONL dataset of `{"text": ..., "label": ...}` lines, classifies
//! every text with the production classifier, and reports exact-match
//! accuracy plus the misclassified cases.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::EvalError;
use crate::pipeline::{Classification, Classifier};

/// One labelled example.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    pub text: String,
    pub label: String,
}

/// A case the classifier got wrong. `predicted` is `None` when
/// classification failed outright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Misclassification {
    pub text: String,
    pub expected: String,
    pub predicted: Option<String>,
}

/// Result of an evaluation run.
#[derive(Debug, Default)]
pub struct EvalReport {
    pub total: usize,
    pub correct: usize,
    pub misclassifications: Vec<Misclassification>,
}

impl EvalReport {
    /// Fraction of exact matches, 0.0 for an empty dataset.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Misclassification counts keyed `expected→predicted`, most frequent
    /// first, ties by key.
    pub fn confusion_counts(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for m in &self.misclassifications {
            let key = format!(
                "{}→{}",
                m.expected,
                m.predicted.as_deref().unwrap_or("none")
            );
            *counts.entry(key).or_default() += 1;
        }
        let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
        counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        counts
    }

    /// Write misclassifications as JSONL.
    pub async fn write_misclassifications(&self, path: &Path) -> Result<(), EvalError> {
        let mut out = String::new();
        for m in &self.misclassifications {
            let line = serde_json::to_string(m).map_err(|e| EvalError::Write {
                path: path.display().to_string(),
                source: std::io::Error::other(e),
            })?;
            out.push_str(&line);
            out.push('\n');
        }
        tokio::fs::write(path, out)
            .await
            .map_err(|source| EvalError::Write {
                path: path.display().to_string(),
                source,
            })
    }
}

impl fmt::Display for EvalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Accuracy: {}/{} ({:.2}%)",
            self.correct,
            self.total,
            self.accuracy() * 100.0
        )?;
        let counts = self.confusion_counts();
        if !counts.is_empty() {
            writeln!(f, "Most frequent misclassifications:")?;
            for (key, count) in counts {
                writeln!(f, "  {count:>4}  {key}")?;
            }
        }
        Ok(())
    }
}

/// Parse a JSONL dataset. Blank lines are skipped; line numbers are 1-based.
pub fn parse_dataset(raw: &str) -> Result<Vec<EvalCase>, EvalError> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| EvalError::InvalidLine {
                line: i + 1,
                source,
            })
        })
        .collect()
}

/// Load a JSONL dataset from disk.
pub async fn load_dataset(path: &Path) -> Result<Vec<EvalCase>, EvalError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| EvalError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse_dataset(&raw)
}

/// Classify every case sequentially and tally the results.
pub async fn run(classifier: &Classifier, cases: &[EvalCase]) -> EvalReport {
    let mut report = EvalReport::default();

    for (i, case) in cases.iter().enumerate() {
        let predicted = match classifier.classify(&case.text).await {
            Classification::Label(label) => Some(label),
            Classification::Failed { .. } => None,
        };

        debug!(
            case = i + 1,
            expected = %case.label,
            predicted = predicted.as_deref().unwrap_or("none"),
            "Classified evaluation case"
        );

        report.total += 1;
        if predicted.as_deref() == Some(case.label.as_str()) {
            report.correct += 1;
        } else {
            report.misclassifications.push(Misclassification {
                text: case.text.clone(),
                expected: case.label.clone(),
                predicted,
            });
        }
    }

    info!(
        correct = report.correct,
        total = report.total,
        model = %classifier.model_name(),
        "Evaluation complete"
    );
    report
}
