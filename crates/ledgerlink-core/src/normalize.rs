//! Entry normalization
//!
//! The backend has shipped several payload layouts over time. Envelopes are
//! resolved by an ordered matcher table and entry fields by an ordered
//! candidate table; in both cases the first match wins. Field-level defects
//! fall back to the field's default and never drop the record.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::error::CoreError;
use crate::models::{Document, Entry};
use crate::time::{date_from_epoch_millis, parse_flexible_date, Clock, SystemClock};
use crate::types::Side;

// ==================== Field Candidate Table ====================

/// Value used when no candidate key is present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Text(&'static str),
    Zero,
    Today,
    Credit,
    Absent,
    NoDocuments,
}

/// Ordered candidate keys for one canonical field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub candidates: &'static [&'static str],
    pub default: FieldDefault,
}

impl FieldRule {
    /// First candidate holding a present, non-empty value
    pub fn pick<'a>(&self, record: &'a Value) -> Option<&'a Value> {
        self.candidates
            .iter()
            .filter_map(|key| record.get(*key))
            .find(|value| is_present(value))
    }

    /// First candidate that renders as non-empty text
    pub fn pick_text(&self, record: &Value) -> Option<String> {
        self.candidates
            .iter()
            .filter_map(|key| record.get(*key))
            .filter_map(text_of)
            .next()
    }
}

pub const ID: FieldRule = FieldRule {
    field: "id",
    candidates: &["id", "_id"],
    default: FieldDefault::Text(""),
};

pub const DATE: FieldRule = FieldRule {
    field: "date",
    candidates: &["date", "entry_date", "transaction_date"],
    default: FieldDefault::Today,
};

pub const AMOUNT: FieldRule = FieldRule {
    field: "amount",
    candidates: &["amount", "transaction_amount", "value"],
    default: FieldDefault::Zero,
};

pub const SIDE: FieldRule = FieldRule {
    field: "side",
    candidates: &["cr_dr", "type", "transaction_type"],
    default: FieldDefault::Credit,
};

pub const CATEGORY: FieldRule = FieldRule {
    field: "category",
    candidates: &["category", "group"],
    default: FieldDefault::Text("Uncategorized"),
};

pub const DESCRIPTION: FieldRule = FieldRule {
    field: "description",
    candidates: &["description", "desc", "note"],
    default: FieldDefault::Text(""),
};

pub const HUMAN_CODE: FieldRule = FieldRule {
    field: "human_code",
    candidates: &["human_code"],
    default: FieldDefault::Absent,
};

pub const DOCUMENTS: FieldRule = FieldRule {
    field: "documents",
    candidates: &["documents", "files"],
    default: FieldDefault::NoDocuments,
};

pub const DOCUMENT_URL: FieldRule = FieldRule {
    field: "url",
    candidates: &["publicUrl", "public_url", "url", "link", "path", "file_path"],
    default: FieldDefault::Absent,
};

pub const DOCUMENT_NAME: FieldRule = FieldRule {
    field: "name",
    candidates: &["name", "filename", "file_name", "title"],
    default: FieldDefault::Text("Document"),
};

/// Every entry field in normalization order
pub const ENTRY_FIELDS: [FieldRule; 8] = [ID, DATE, AMOUNT, SIDE, CATEGORY, DESCRIPTION, HUMAN_CODE, DOCUMENTS];

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn default_text(rule: &FieldRule) -> String {
    match rule.default {
        FieldDefault::Text(text) => text.to_string(),
        _ => String::new(),
    }
}

// ==================== Field Parsers ====================

/// Parse an amount into a non-negative magnitude
///
/// Exponent notation is read as a float. Other strings are read up to the
/// first character that cannot continue a number, thousands separators are
/// ignored. Unparseable or unrepresentable input is zero.
pub fn parse_amount(value: &Value) -> Decimal {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.replace(',', ""),
        _ => return Decimal::ZERO,
    };
    let text = text.trim();

    let parsed = match exponent_float(text) {
        Some(float) => Decimal::from_scientific(text)
            .ok()
            .or_else(|| Decimal::from_f64(float)),
        None => Decimal::from_str(text)
            .ok()
            .or_else(|| Decimal::from_str(leading_number(text)).ok()),
    };

    match parsed {
        Some(amount) => amount.abs(),
        None => {
            log::debug!(target: "ledgerlink::normalize", "Unparseable amount {:?}, using 0", value);
            Decimal::ZERO
        }
    }
}

/// Finite float written with an exponent, e.g. `1e-30`
fn exponent_float(text: &str) -> Option<f64> {
    if !text.contains(['e', 'E']) {
        return None;
    }
    f64::from_str(text).ok().filter(|f| f.is_finite())
}

fn leading_number(text: &str) -> &str {
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in text.char_indices() {
        let ok = c.is_ascii_digit()
            || (i == 0 && (c == '-' || c == '+'))
            || (c == '.' && !seen_dot);
        if !ok {
            break;
        }
        seen_dot |= c == '.';
        end = i + c.len_utf8();
    }
    text[..end].trim_end_matches('.')
}

fn parse_date(value: &Value) -> Result<NaiveDate, CoreError> {
    let parsed = match value {
        Value::String(s) => parse_flexible_date(s),
        Value::Number(n) => n.as_i64().and_then(date_from_epoch_millis),
        _ => None,
    };
    parsed.ok_or_else(|| CoreError::InvalidDate { value: value.to_string() })
}

/// Name from the last path segment of a URL, query stripped and percent-decoded
pub fn file_name_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or("");
    let segment = path.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

// ==================== Documents ====================

/// Normalize one raw document; `None` when no URL resolves
pub fn normalize_document(raw: &Value) -> Option<Document> {
    let result = match raw {
        Value::String(url) if !url.is_empty() => Ok(Document {
            url: url.clone(),
            name: file_name_from_url(url).unwrap_or_else(|| default_text(&DOCUMENT_NAME)),
        }),
        Value::Object(_) => match DOCUMENT_URL.pick_text(raw) {
            Some(url) => {
                let name = DOCUMENT_NAME
                    .pick_text(raw)
                    .or_else(|| file_name_from_url(&url))
                    .unwrap_or_else(|| default_text(&DOCUMENT_NAME));
                Ok(Document { url, name })
            }
            None => Err(CoreError::InvalidDocument { message: "no URL candidate present".to_string() }),
        },
        other => Err(CoreError::InvalidDocument { message: format!("unsupported document value {}", other) }),
    };

    match result {
        Ok(document) => Some(document),
        Err(e) => {
            log::debug!(target: "ledgerlink::normalize", "Dropping document: {}", e);
            None
        }
    }
}

/// Normalize a list of raw documents, dropping those without a URL
pub fn normalize_documents(raw: Option<&Value>) -> Vec<Document> {
    match raw {
        Some(Value::Array(items)) => items.iter().filter_map(normalize_document).collect(),
        Some(other) if is_present(other) => {
            log::debug!(target: "ledgerlink::normalize", "Documents field is not a list: {}", other);
            vec![]
        }
        _ => vec![],
    }
}

// ==================== Envelopes ====================

/// Recognized top-level payload layouts, in matching priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// `[{ "response": [...] }]`
    NestedResponse,
    /// `{ "response": [...] }`
    ResponseField,
    /// `[...]`
    BareArray,
    /// `{ "entries": [...] }`
    EntriesField,
    /// `{ "data": [...] }`
    DataField,
    /// Anything else, taken as one record
    SingleRecord,
}

type EnvelopeMatcher = fn(&Value) -> Option<&Vec<Value>>;

fn match_nested_response(raw: &Value) -> Option<&Vec<Value>> {
    raw.as_array()?.first()?.get("response")?.as_array()
}

fn match_response_field(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("response")?.as_array()
}

fn match_bare_array(raw: &Value) -> Option<&Vec<Value>> {
    raw.as_array()
}

fn match_entries_field(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("entries")?.as_array()
}

fn match_data_field(raw: &Value) -> Option<&Vec<Value>> {
    raw.get("data")?.as_array()
}

const ENVELOPE_MATCHERS: [(EnvelopeShape, EnvelopeMatcher); 5] = [
    (EnvelopeShape::NestedResponse, match_nested_response),
    (EnvelopeShape::ResponseField, match_response_field),
    (EnvelopeShape::BareArray, match_bare_array),
    (EnvelopeShape::EntriesField, match_entries_field),
    (EnvelopeShape::DataField, match_data_field),
];

/// Identify the envelope layout and return its records
pub fn resolve_envelope(raw: &Value) -> (EnvelopeShape, Vec<Value>) {
    for (shape, matcher) in ENVELOPE_MATCHERS {
        if let Some(records) = matcher(raw) {
            log::debug!(target: "ledgerlink::normalize", "Envelope {:?} with {} records", shape, records.len());
            return (shape, records.clone());
        }
    }

    if !raw.is_object() {
        let error = CoreError::BadResponseShape { message: format!("top-level {}", json_kind(raw)) };
        log::warn!(target: "ledgerlink::normalize", "{}; treating payload as one record", error);
    }
    (EnvelopeShape::SingleRecord, vec![raw.clone()])
}

/// Records carried by a response payload
pub fn unwrap_response_envelope(raw: &Value) -> Vec<Value> {
    resolve_envelope(raw).1
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Layout of a single unwrapped record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordShape<'a> {
    /// `{ "entry": {...}, "documents": [...] }`
    Wrapped { entry: &'a Value, documents: Option<&'a Value> },
    /// Entry fields at the top level, identified by `id`/`_id`
    Flat(&'a Value),
}

/// Classify a record; `None` when it carries no recognizable entry
pub fn record_shape(record: &Value) -> Option<RecordShape<'_>> {
    if let Some(entry) = record.get("entry").filter(|e| e.is_object()) {
        return Some(RecordShape::Wrapped {
            entry,
            documents: record.get("documents"),
        });
    }
    if ID.pick(record).is_some() {
        return Some(RecordShape::Flat(record));
    }
    None
}

// ==================== Normalizer ====================

/// Result of normalizing one response page
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPage {
    pub shape: EnvelopeShape,
    /// Records the server sent, recognizable or not
    pub record_count: usize,
    pub entries: Vec<Entry>,
    /// Records dropped for carrying no entry
    pub skipped: usize,
}

/// Maps raw backend records onto [`Entry`]
#[derive(Debug, Clone)]
pub struct EntryNormalizer {
    fallback_date: NaiveDate,
}

impl Default for EntryNormalizer {
    fn default() -> Self {
        Self::new(&SystemClock)
    }
}

impl EntryNormalizer {
    /// Normalizer whose missing dates resolve to the clock's current day
    pub fn new(clock: &dyn Clock) -> Self {
        Self::with_fallback_date(clock.today())
    }

    pub fn with_fallback_date(fallback_date: NaiveDate) -> Self {
        Self { fallback_date }
    }

    /// Normalize a raw entry object, documents included
    pub fn normalize_entry(&self, raw: &Value) -> Entry {
        self.build_entry(raw, DOCUMENTS.pick(raw))
    }

    fn build_entry(&self, raw: &Value, documents: Option<&Value>) -> Entry {
        let date = match DATE.pick(raw) {
            Some(value) => parse_date(value).unwrap_or_else(|e| {
                log::debug!(target: "ledgerlink::normalize", "{}; using {}", e, self.fallback_date);
                self.fallback_date
            }),
            None => self.fallback_date,
        };

        Entry {
            id: ID.pick_text(raw).unwrap_or_else(|| default_text(&ID)),
            date,
            amount: AMOUNT.pick(raw).map(parse_amount).unwrap_or(Decimal::ZERO),
            side: SIDE.pick_text(raw).map(|s| Side::classify(&s)).unwrap_or_default(),
            category: CATEGORY.pick_text(raw).unwrap_or_else(|| default_text(&CATEGORY)),
            description: DESCRIPTION.pick_text(raw).unwrap_or_else(|| default_text(&DESCRIPTION)),
            human_code: HUMAN_CODE.pick_text(raw),
            documents: normalize_documents(documents),
        }
    }

    /// Normalize one unwrapped record; `None` when it holds no entry
    pub fn normalize_record(&self, record: &Value) -> Option<Entry> {
        match record_shape(record) {
            Some(RecordShape::Wrapped { entry, documents }) => Some(self.build_entry(entry, documents)),
            Some(RecordShape::Flat(entry)) => Some(self.normalize_entry(entry)),
            None => {
                log::warn!(target: "ledgerlink::normalize", "Skipping unrecognized record: {}", record);
                None
            }
        }
    }

    /// Unwrap a response payload and normalize every record in it
    pub fn normalize_page(&self, raw: &Value) -> NormalizedPage {
        let (shape, records) = resolve_envelope(raw);
        let entries: Vec<Entry> = records.iter().filter_map(|r| self.normalize_record(r)).collect();
        NormalizedPage {
            shape,
            record_count: records.len(),
            skipped: records.len() - entries.len(),
            entries,
        }
    }
}

/// Normalize a raw entry with today's date as the fallback
pub fn normalize_entry(raw: &Value) -> Entry {
    EntryNormalizer::default().normalize_entry(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fallback() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn normalizer() -> EntryNormalizer {
        EntryNormalizer::with_fallback_date(fallback())
    }

    #[test]
    fn test_field_table_order() {
        assert_eq!(ENTRY_FIELDS[0].field, "id");
        assert_eq!(AMOUNT.candidates, &["amount", "transaction_amount", "value"]);
        assert_eq!(DOCUMENT_URL.candidates[0], "publicUrl");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let entry = normalizer().normalize_entry(&json!({}));
        assert_eq!(entry.id, "");
        assert_eq!(entry.date, fallback());
        assert_eq!(entry.amount, Decimal::ZERO);
        assert_eq!(entry.side, Side::Credit);
        assert_eq!(entry.category, "Uncategorized");
        assert_eq!(entry.description, "");
        assert_eq!(entry.human_code, None);
        assert!(entry.documents.is_empty());
    }

    #[test]
    fn test_candidates_in_order() {
        let raw = json!({
            "_id": "abc",
            "entry_date": "2024-02-03",
            "transaction_amount": "19.99",
            "transaction_type": "Debit",
            "group": "Food",
            "desc": "Lunch",
            "note": "ignored",
            "human_code": "TX-7",
        });
        let entry = normalizer().normalize_entry(&raw);
        assert_eq!(entry.id, "abc");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
        assert_eq!(entry.amount, Decimal::from_str("19.99").unwrap());
        assert_eq!(entry.side, Side::Debit);
        assert_eq!(entry.category, "Food");
        assert_eq!(entry.description, "Lunch");
        assert_eq!(entry.human_code.as_deref(), Some("TX-7"));
    }

    #[test]
    fn test_empty_candidate_falls_through() {
        let raw = json!({"id": "", "_id": 42, "category": "", "group": "Travel", "amount": null, "value": 3});
        let entry = normalizer().normalize_entry(&raw);
        assert_eq!(entry.id, "42");
        assert_eq!(entry.category, "Travel");
        assert_eq!(entry.amount, Decimal::from(3));
    }

    #[test]
    fn test_amount_is_never_negative() {
        for raw in [json!({"amount": -12.5}), json!({"amount": "-7"}), json!({"amount": "abc"}), json!({"amount": {}})] {
            let entry = normalizer().normalize_entry(&raw);
            assert!(entry.amount >= Decimal::ZERO, "{}", raw);
        }
        assert_eq!(normalizer().normalize_entry(&json!({"amount": -12.5})).amount, Decimal::from_str("12.5").unwrap());
    }

    #[test]
    fn test_parse_amount_variants() {
        assert_eq!(parse_amount(&json!("1,250.75")), Decimal::from_str("1250.75").unwrap());
        assert_eq!(parse_amount(&json!("12.5 EUR")), Decimal::from_str("12.5").unwrap());
        assert_eq!(parse_amount(&json!(1e3)), Decimal::from(1000));
        assert_eq!(parse_amount(&json!("")), Decimal::ZERO);
        assert_eq!(parse_amount(&json!(true)), Decimal::ZERO);
    }

    #[test]
    fn test_parse_amount_exponent_notation() {
        assert_eq!(parse_amount(&json!(1e-30)), Decimal::ZERO);
        assert_eq!(parse_amount(&json!(1e30)), Decimal::ZERO);
        assert_eq!(parse_amount(&json!(1.2345678901234567e31)), Decimal::ZERO);
        assert_eq!(parse_amount(&json!("1.5e3")), Decimal::from(1500));
        assert_eq!(parse_amount(&json!("-2.5E2")), Decimal::from(250));
        assert_eq!(parse_amount(&json!(2.5e-3)), Decimal::from_str("0.0025").unwrap());
    }

    #[test]
    fn test_side_markers() {
        let side = |marker: &str| normalizer().normalize_entry(&json!({"cr_dr": marker})).side;
        assert_eq!(side("dr"), Side::Debit);
        assert_eq!(side("DEBIT"), Side::Debit);
        assert_eq!(side("cr"), Side::Credit);
        assert_eq!(side("transfer"), Side::Credit);
        let entry = normalizer().normalize_entry(&json!({"type": "debit"}));
        assert_eq!(entry.side, Side::Debit);
    }

    #[test]
    fn test_invalid_date_uses_fallback_and_keeps_record() {
        let entry = normalizer().normalize_entry(&json!({"id": "1", "date": "not a date", "amount": 5}));
        assert_eq!(entry.date, fallback());
        assert_eq!(entry.amount, Decimal::from(5));
    }

    #[test]
    fn test_epoch_millis_date() {
        let entry = normalizer().normalize_entry(&json!({"date": 1_704_412_800_000_i64}));
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
    }

    #[test]
    fn test_normalize_document_from_string() {
        let doc = normalize_document(&json!("https://cdn.example.com/files/My%20Receipt.pdf?token=1")).unwrap();
        assert_eq!(doc.url, "https://cdn.example.com/files/My%20Receipt.pdf?token=1");
        assert_eq!(doc.name, "My Receipt.pdf");
    }

    #[test]
    fn test_normalize_document_candidates() {
        let doc = normalize_document(&json!({"public_url": "https://x/a.png", "url": "https://x/b.png", "title": "Scan"})).unwrap();
        assert_eq!(doc.url, "https://x/a.png");
        assert_eq!(doc.name, "Scan");

        let doc = normalize_document(&json!({"file_path": "uploads/2024/inv.pdf"})).unwrap();
        assert_eq!(doc.url, "uploads/2024/inv.pdf");
        assert_eq!(doc.name, "inv.pdf");

        let doc = normalize_document(&json!({"link": "https://x/dir/"})).unwrap();
        assert_eq!(doc.name, "Document");
    }

    #[test]
    fn test_documents_without_url_dropped() {
        let raw = json!({"id": "1", "files": [{"name": "orphan.pdf"}, "", null, 7, {"url": "https://x/ok.pdf"}]});
        let entry = normalizer().normalize_entry(&raw);
        assert_eq!(entry.documents.len(), 1);
        assert_eq!(entry.documents[0].name, "ok.pdf");
        assert!(entry.documents.iter().all(|d| !d.url.is_empty()));
    }

    #[test]
    fn test_unwrap_envelope_shapes() {
        let x = json!({"id": "x"});
        assert_eq!(unwrap_response_envelope(&json!([{"response": [x.clone()]}])), vec![x.clone()]);
        assert_eq!(unwrap_response_envelope(&json!({"response": [x.clone()]})), vec![x.clone()]);
        assert_eq!(unwrap_response_envelope(&json!([x.clone()])), vec![x.clone()]);
        assert_eq!(unwrap_response_envelope(&json!({"entries": [x.clone()]})), vec![x.clone()]);
        assert_eq!(unwrap_response_envelope(&json!({"data": [x.clone()]})), vec![x.clone()]);
        assert_eq!(unwrap_response_envelope(&json!({"foo": 1})), vec![json!({"foo": 1})]);
    }

    #[test]
    fn test_envelope_priority() {
        let (shape, _) = resolve_envelope(&json!({"response": [], "entries": [{"id": 1}]}));
        assert_eq!(shape, EnvelopeShape::ResponseField);

        let (shape, records) = resolve_envelope(&json!([{"response": "not a list"}]));
        assert_eq!(shape, EnvelopeShape::BareArray);
        assert_eq!(records.len(), 1);

        let (shape, records) = resolve_envelope(&json!([]));
        assert_eq!(shape, EnvelopeShape::BareArray);
        assert!(records.is_empty());

        let (shape, _) = resolve_envelope(&json!("oops"));
        assert_eq!(shape, EnvelopeShape::SingleRecord);
    }

    #[test]
    fn test_record_shapes() {
        let wrapped = json!({"entry": {"id": "1"}, "documents": ["https://x/a.pdf"]});
        assert!(matches!(record_shape(&wrapped), Some(RecordShape::Wrapped { .. })));
        assert!(matches!(record_shape(&json!({"_id": "2"})), Some(RecordShape::Flat(_))));
        assert_eq!(record_shape(&json!({"amount": 3})), None);
    }

    #[test]
    fn test_wrapped_record_takes_outer_documents() {
        let record = json!({
            "entry": {"id": "1", "amount": 10, "documents": ["https://x/inner.pdf"]},
            "documents": [{"publicUrl": "https://x/outer.pdf", "filename": "outer.pdf"}]
        });
        let entry = normalizer().normalize_record(&record).unwrap();
        assert_eq!(entry.documents, vec![Document { url: "https://x/outer.pdf".into(), name: "outer.pdf".into() }]);

        let record = json!({"entry": {"id": "1"}});
        assert!(normalizer().normalize_record(&record).unwrap().documents.is_empty());
    }

    #[test]
    fn test_normalize_page_skips_unrecognized() {
        let payload = json!([{"response": [
            {"entry": {"id": "1", "amount": "5"}, "documents": []},
            {"id": "2", "cr_dr": "DR", "amount": 7},
            {"amount": 9}
        ]}]);
        let page = normalizer().normalize_page(&payload);
        assert_eq!(page.shape, EnvelopeShape::NestedResponse);
        assert_eq!(page.record_count, 3);
        assert_eq!(page.skipped, 1);
        assert_eq!(page.entries.len(), 2);
        assert_eq!(page.entries[1].side, Side::Debit);
    }

    #[test]
    fn test_single_record_fallback_without_id_is_dropped() {
        let page = normalizer().normalize_page(&json!({"foo": 1}));
        assert_eq!(page.shape, EnvelopeShape::SingleRecord);
        assert_eq!(page.record_count, 1);
        assert!(page.entries.is_empty());
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(file_name_from_url("https://x/a/b%2Bc.pdf?sig=1#top"), Some("b+c.pdf".to_string()));
        assert_eq!(file_name_from_url("https://x/a/"), None);
        assert_eq!(file_name_from_url("plain.txt"), Some("plain.txt".to_string()));
        assert_eq!(
            file_name_from_url("https://x/files/inv.pdf?next=/a/b"),
            Some("inv.pdf".to_string())
        );
        assert_eq!(file_name_from_url("https://x/files/inv.pdf#p/2"), Some("inv.pdf".to_string()));
    }
}
