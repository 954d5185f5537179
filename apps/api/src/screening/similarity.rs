//! TF-IDF cosine similarity between resumes and a job posting.
//!
//! The vector space is built from the query document plus every resume in the batch,
//! so scores are only comparable within one batch.

use std::collections::HashMap;

/// Lowercased tokens of two or more word characters.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
}

fn term_counts(text: &str) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0.0) += 1.0;
    }
    counts
}

/// Scores each document against `job_description` plus the job skills.
///
/// Weights are `tf * idf` with smoothed `idf = ln((1 + n) / (1 + df)) + 1`, rows are
/// L2-normalized, and the result is the cosine between the query row and each document
/// row, in input order. A blank corpus scores every document 0.
pub fn similarity<S: AsRef<str>>(
    documents: &[S],
    job_description: &str,
    job_skills: &[String],
) -> Vec<f64> {
    if documents.is_empty() {
        return Vec::new();
    }

    let query = format!("{} {}", job_description, job_skills.join(" "));
    let corpus: Vec<HashMap<String, f64>> = std::iter::once(query.as_str())
        .chain(documents.iter().map(|d| d.as_ref()))
        .map(term_counts)
        .collect();

    let mut document_frequency: HashMap<&str, f64> = HashMap::new();
    for counts in &corpus {
        for term in counts.keys() {
            *document_frequency.entry(term.as_str()).or_insert(0.0) += 1.0;
        }
    }

    if document_frequency.is_empty() {
        return vec![0.0; documents.len()];
    }

    let n = corpus.len() as f64;
    let weigh = |counts: &HashMap<String, f64>| -> HashMap<String, f64> {
        let mut weights: HashMap<String, f64> = counts
            .iter()
            .map(|(term, tf)| {
                let df = document_frequency[term.as_str()];
                let idf = ((1.0 + n) / (1.0 + df)).ln() + 1.0;
                (term.clone(), tf * idf)
            })
            .collect();
        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            weights.values_mut().for_each(|w| *w /= norm);
        }
        weights
    };

    let query_vector = weigh(&corpus[0]);
    corpus[1..]
        .iter()
        .map(|counts| {
            let doc_vector = weigh(counts);
            let dot: f64 = query_vector
                .iter()
                .filter_map(|(term, q)| doc_vector.get(term).map(|d| q * d))
                .sum();
            dot.clamp(0.0, 1.0)
        })
        .collect()
}
