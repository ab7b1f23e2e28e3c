//! Search over file records using BM25 scoring.
//!
//! All query terms must match the `content` field. Terms containing `*` or
//! `?` are wildcard terms (a leading wildcard is allowed) and match indexed
//! tokens by pattern; every other term goes through the query parser.

use serde::Serialize;
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{BooleanQuery, Occur, Query, QueryParser, RegexQuery};
use tantivy::schema::Value;
use tantivy::IndexReader;
use tracing::info;

use crate::error::SearchError;
use crate::index::SearchIndex;
use crate::schema::SearchSchema;

/// One matching file.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// Path relative to the partition root
    pub path: String,
    /// Container holding the file, if it was archived
    pub archive: Option<String>,
    /// BM25 relevance score
    pub score: f32,
}

/// Ranked hits plus match and corpus counts.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub hits: Vec<SearchHit>,
    /// Number of documents matching the query (may exceed `hits.len()`)
    pub total_matched: usize,
    /// Number of documents in the index
    pub total_docs: u64,
}

/// Searcher for record queries.
pub struct ArchiveSearcher {
    reader: IndexReader,
    schema: SearchSchema,
    query_parser: QueryParser,
}

impl ArchiveSearcher {
    /// Create a new searcher from a SearchIndex.
    pub fn new(index: &SearchIndex) -> Result<Self, SearchError> {
        let reader = index.reader()?;
        let schema = index.schema().clone();

        let mut query_parser = QueryParser::for_index(index.index(), vec![schema.content]);
        query_parser.set_conjunction_by_default();

        Ok(Self {
            reader,
            schema,
            query_parser,
        })
    }

    /// Build the conjunction of all non-blank terms.
    ///
    /// Returns `None` when every term is blank.
    pub fn build_query(&self, terms: &[String]) -> Result<Option<Box<dyn Query>>, SearchError> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for term in terms.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
            let query: Box<dyn Query> = if is_wildcard(term) {
                let pattern = wildcard_to_regex(term);
                Box::new(RegexQuery::from_pattern(&pattern, self.schema.content)?)
            } else {
                self.query_parser.parse_query(term)?
            };
            clauses.push((Occur::Must, query));
        }

        Ok(match clauses.len() {
            0 => None,
            1 => clauses.pop().map(|(_, query)| query),
            _ => Some(Box::new(BooleanQuery::new(clauses)) as Box<dyn Query>),
        })
    }

    /// Search with all `terms` ANDed together.
    ///
    /// `limit` caps the number of returned hits; `None` returns every match.
    pub fn search(
        &self,
        terms: &[String],
        limit: Option<usize>,
    ) -> Result<SearchOutcome, SearchError> {
        let searcher = self.reader.searcher();
        let total_docs = searcher.num_docs();

        let Some(query) = self.build_query(terms)? else {
            return Ok(SearchOutcome {
                hits: Vec::new(),
                total_matched: 0,
                total_docs,
            });
        };

        let limit = limit.unwrap_or(total_docs as usize).max(1);
        let (top_docs, total_matched) =
            searcher.search(&query, &(TopDocs::with_limit(limit), Count))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (score, doc_address) in top_docs {
            let doc: tantivy::TantivyDocument = searcher.doc(doc_address)?;

            let path = doc
                .get_first(self.schema.path)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            let archive = doc
                .get_first(self.schema.archive)
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());

            hits.push(SearchHit {
                path,
                archive,
                score,
            });
        }

        info!(
            terms = ?terms,
            matched = total_matched,
            total_docs,
            "Search complete"
        );

        Ok(SearchOutcome {
            hits,
            total_matched,
            total_docs,
        })
    }
}

/// Whether a term uses wildcard syntax.
pub fn is_wildcard(term: &str) -> bool {
    term.contains('*') || term.contains('?')
}

/// Translate a wildcard term into a regex over lowercased index tokens.
///
/// `*` matches any run of characters, `?` exactly one; everything else is
/// matched literally.
pub fn wildcard_to_regex(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() * 2);
    for c in term.to_lowercase().chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            c if c.is_alphanumeric() || c == '_' => pattern.push(c),
            c => {
                pattern.push('\\');
                pattern.push(c);
            }
        }
    }
    pattern
}
