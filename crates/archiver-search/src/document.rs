//! Document mapping from file records to Tantivy documents.

use tantivy::TantivyDocument;

use archiver_types::FileRecord;

use crate::schema::SearchSchema;

/// Convert a FileRecord to a Tantivy document.
///
/// `content` and `archive` are only added when the record carries them, so a
/// record without content is findable by path but never matches a text query.
pub fn record_to_doc(schema: &SearchSchema, record: &FileRecord) -> TantivyDocument {
    let mut doc = TantivyDocument::new();
    doc.add_text(schema.path, &record.path);
    doc.add_u64(schema.size, record.size_bytes);

    if let Some(ref content) = record.content {
        doc.add_text(schema.content, content);
    }
    if let Some(ref container) = record.container_ref {
        doc.add_text(schema.archive, container);
    }

    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build_record_schema;
    use tantivy::schema::Value;

    #[test]
    fn test_record_to_doc() {
        let schema = build_record_schema();
        let record = FileRecord::new("docs/readme.md", 12)
            .with_content("borrow checker")
            .with_container("docs");

        let doc = record_to_doc(&schema, &record);

        let path = doc.get_first(schema.path).unwrap();
        assert_eq!(path.as_str(), Some("docs/readme.md"));

        let size = doc.get_first(schema.size).unwrap();
        assert_eq!(size.as_u64(), Some(12));

        let archive = doc.get_first(schema.archive).unwrap();
        assert_eq!(archive.as_str(), Some("docs"));

        let content = doc.get_first(schema.content).unwrap();
        assert!(content.as_str().unwrap().contains("borrow"));
    }

    #[test]
    fn test_record_without_optional_fields() {
        let schema = build_record_schema();
        let record = FileRecord::new("bin/tool", 3);

        let doc = record_to_doc(&schema, &record);

        assert!(doc.get_first(schema.content).is_none());
        assert!(doc.get_first(schema.archive).is_none());
    }
}
