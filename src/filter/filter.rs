use mongodb::bson::{doc, Bson, Document};

use crate::filter::error::FilterError;

/// Builds the MongoDB match document for list and count queries.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    document: Document,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match on any of `fields`.
    pub fn keyword(mut self, fields: &[&str], keyword: Option<&str>) -> Self {
        if let Some(keyword) = keyword {
            if fields.is_empty() {
                return self;
            }
            let pattern = escape_regex(keyword);
            let clauses: Vec<Bson> = fields
                .iter()
                .map(|field| {
                    let mut clause = Document::new();
                    clause.insert(*field, doc! { "$regex": pattern.as_str(), "$options": "i" });
                    Bson::Document(clause)
                })
                .collect();
            self.document.insert("$or", clauses);
        }
        self
    }

    /// Exact match on an enumerated field; the value is lowercased first.
    pub fn one_of(
        mut self,
        field: &str,
        value: Option<&str>,
        allowed: &[&str],
    ) -> Result<Self, FilterError> {
        if let Some(value) = value {
            let normalized = value.trim().to_lowercase();
            if !allowed.contains(&normalized.as_str()) {
                return Err(FilterError::InvalidValue {
                    field: field.to_string(),
                    value: value.to_string(),
                    allowed: allowed.join(", "),
                });
            }
            self.document.insert(field, normalized);
        }
        Ok(self)
    }

    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.document.insert(field, value.into());
        self
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}

/// Escape regex metacharacters so user keywords match literally.
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(
            c,
            '\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$'
        ) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
