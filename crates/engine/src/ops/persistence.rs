use serde_json::{Map, Value};
use tracing::info;

use crate::{
    Document, EngineError, ResultEngine, SanitizeReport, Storage,
    merge::merge,
    sanitize::{Sanitized, sanitize},
};

use super::{Ledger, Receipt};

/// Folds `source` onto the default document and sanitizes the result.
///
/// Shared by load and import so both accept exactly the same documents.
pub fn rehydrate(source: &Map<String, Value>) -> Sanitized {
    let mut document = Document::default_value();
    merge(&mut document, source);
    sanitize(document)
}

/// Parses raw bytes into a JSON object.
pub(super) fn parse_object(bytes: &[u8]) -> ResultEngine<Map<String, Value>> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(EngineError::CorruptData(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(err) => Err(EngineError::CorruptData(err.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl<S: Storage> Ledger<S> {
    /// Replaces the working document with an externally supplied one.
    ///
    /// The bytes go through the same merge and sanitize pipeline as a load.
    /// Unparsable input is rejected with [`EngineError::CorruptData`] and the
    /// working document is kept.
    pub fn import_external(&mut self, bytes: &[u8]) -> ResultEngine<Receipt<SanitizeReport>> {
        let source = parse_object(bytes)?;
        let Sanitized { document, report } = rehydrate(&source);
        info!(
            transactions = document.transactions.len(),
            repairs = report.repairs.len(),
            "document imported"
        );
        self.with_tx("import_external", move |draft| {
            draft.doc = document;
            Ok(report)
        })
    }

    /// The working document as pretty-printed JSON.
    pub fn export_snapshot(&self) -> ResultEngine<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    /// Writes the working document to the store.
    pub fn save(&mut self) -> ResultEngine<()> {
        self.persist()
    }

    /// Deletes all data: the stored key is removed and the working document
    /// goes back to defaults.
    pub fn reset(&mut self) -> ResultEngine<()> {
        self.storage.remove(&self.storage_key)?;
        self.document = Document::default();
        info!(key = %self.storage_key, "ledger reset");
        Ok(())
    }

    /// Bytes currently persisted, zero when nothing is stored.
    pub fn stored_size(&self) -> ResultEngine<u64> {
        Ok(self.storage.size(&self.storage_key)?.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_object_rejects_non_objects() {
        assert!(parse_object(br#"{"a": 1}"#).is_ok());
        assert_eq!(
            parse_object(b"[1, 2]").unwrap_err(),
            EngineError::CorruptData("expected a JSON object, found an array".to_string())
        );
        assert!(matches!(
            parse_object(b"{not json"),
            Err(EngineError::CorruptData(_))
        ));
    }
}
