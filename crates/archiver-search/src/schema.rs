//! Tantivy schema definition for file records.
//!
//! One document per indexed file:
//! - `path`: unique key, relative to the partition root (STRING | STORED)
//! - `size`: file size in bytes (u64, STORED)
//! - `content`: file text, English-stemmed, not stored (TEXT)
//! - `archive`: container reference (STRING | STORED)

use tantivy::schema::{
    Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, STORED, STRING,
};
use tantivy::tokenizer::{Language, LowerCaser, SimpleTokenizer, Stemmer, TextAnalyzer};
use tantivy::Index;

use crate::SearchError;

/// Name of the stemming tokenizer used by the `content` field.
pub const CONTENT_TOKENIZER: &str = "en_stem";

/// Schema field handles for efficient access
#[derive(Debug, Clone)]
pub struct SearchSchema {
    schema: Schema,
    /// Relative file path (STRING | STORED)
    pub path: Field,
    /// File size in bytes (STORED)
    pub size: Field,
    /// Searchable file content (TEXT, not stored)
    pub content: Field,
    /// Archive container holding the file (STRING | STORED)
    pub archive: Field,
}

impl SearchSchema {
    /// Get the underlying Tantivy schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Create a SearchSchema from an existing Tantivy Schema
    pub fn from_schema(schema: Schema) -> Result<Self, SearchError> {
        let path = schema
            .get_field("path")
            .map_err(|_| SearchError::SchemaMismatch("missing path field".into()))?;
        let size = schema
            .get_field("size")
            .map_err(|_| SearchError::SchemaMismatch("missing size field".into()))?;
        let content = schema
            .get_field("content")
            .map_err(|_| SearchError::SchemaMismatch("missing content field".into()))?;
        let archive = schema
            .get_field("archive")
            .map_err(|_| SearchError::SchemaMismatch("missing archive field".into()))?;

        Ok(Self {
            schema,
            path,
            size,
            content,
            archive,
        })
    }

    /// Register the content tokenizer with a Tantivy index.
    ///
    /// Must be called after creating or opening an index, before writing or
    /// parsing queries.
    pub fn register_tokenizers(index: &Index) {
        let en_stem = TextAnalyzer::builder(SimpleTokenizer::default())
            .filter(LowerCaser)
            .filter(Stemmer::new(Language::English))
            .build();

        index.tokenizers().register(CONTENT_TOKENIZER, en_stem);
    }
}

/// Build the file record schema.
pub fn build_record_schema() -> SearchSchema {
    let mut schema_builder = Schema::builder();

    let path = schema_builder.add_text_field("path", STRING | STORED);
    let size = schema_builder.add_u64_field("size", STORED);

    // Positions kept for phrase queries
    let content_options = TextOptions::default().set_indexing_options(
        TextFieldIndexing::default()
            .set_tokenizer(CONTENT_TOKENIZER)
            .set_index_option(IndexRecordOption::WithFreqsAndPositions),
    );
    let content = schema_builder.add_text_field("content", content_options);

    let archive = schema_builder.add_text_field("archive", STRING | STORED);

    let schema = schema_builder.build();

    SearchSchema {
        schema,
        path,
        size,
        content,
        archive,
    }
}
