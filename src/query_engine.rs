use crate::data_models::{Document, Snippet};

/// Title used for snippets whose page had no `<title>`.
pub const UNTITLED: &str = "KB Article";
const ELLIPSIS: char = '…';

/// Tunables of the keyword-overlap scorer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    /// Added to a term's occurrence count before taking the square root.
    pub occurrence_offset: f64,
    /// Added when a multi-word question appears verbatim in the text.
    pub phrase_bonus: f64,
    /// Maximum excerpt length in characters, ellipsis included.
    pub excerpt_chars: usize,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            occurrence_offset: 0.5,
            phrase_bonus: 1.2,
            excerpt_chars: 500,
        }
    }
}

/// A question split into lowercase whitespace-separated terms.
#[derive(Debug, Clone)]
pub struct Query {
    terms: Vec<String>,
    phrase: Option<String>,
}

impl Query {
    pub fn parse(question: &str) -> Self {
        let terms: Vec<String> = question
            .to_lowercase()
            .split_whitespace()
            .map(|w| w.to_string())
            .collect();
        let phrase = (terms.len() > 1).then(|| terms.join(" "));
        Self { terms, phrase }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// Ranks cached documents against a free-text question.
///
/// Every term contributes `sqrt(count + offset)` when it occurs at least once, so repeated hits
/// add less each time. No stemming and no length normalization.
#[derive(Debug, Clone, Default)]
pub struct QueryEngine {
    params: ScoringParams,
}

impl QueryEngine {
    pub fn new(params: ScoringParams) -> Self {
        Self { params }
    }

    pub fn score(&self, question: &str, doc: &Document) -> f64 {
        self.score_query(&Query::parse(question), doc)
    }

    pub fn score_query(&self, query: &Query, doc: &Document) -> f64 {
        if query.is_empty() {
            return 0.0;
        }
        let text = doc.text.to_lowercase();

        let mut score = 0.0;
        for term in &query.terms {
            let count = text.matches(term.as_str()).count();
            if count > 0 {
                score += (count as f64 + self.params.occurrence_offset).sqrt();
            }
        }
        if let Some(phrase) = &query.phrase {
            if text.contains(phrase.as_str()) {
                score += self.params.phrase_bonus;
            }
        }
        score
    }

    /// Scores every document, drops the ones that match nothing and returns snippets for the
    /// best `k`. Equal scores keep their cache order.
    pub fn select_top_k(&self, question: &str, docs: &[Document], k: usize) -> Vec<Snippet> {
        let query = Query::parse(question);
        if query.is_empty() || k == 0 {
            return Vec::new();
        }

        let mut ranked: Vec<(&Document, f64)> = docs
            .iter()
            .map(|d| (d, self.score_query(&query, d)))
            .filter(|(_, s)| *s > 0.0)
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);

        ranked
            .into_iter()
            .map(|(doc, _)| self.snippet(doc))
            .collect()
    }

    pub fn snippet(&self, doc: &Document) -> Snippet {
        let title = if doc.title.trim().is_empty() {
            UNTITLED.to_string()
        } else {
            doc.title.clone()
        };
        Snippet {
            url: doc.url.clone(),
            title,
            excerpt: excerpt(&doc.text, self.params.excerpt_chars),
        }
    }
}

/// Cuts `text` to at most `budget` characters; an ellipsis replaces the last kept character when
/// anything was cut.
pub fn excerpt(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut out: String = text.chars().take(budget.saturating_sub(1)).collect();
    if budget > 0 {
        out.push(ELLIPSIS);
    }
    out
}
