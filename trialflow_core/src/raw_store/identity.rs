use serde_json::Value;

/// Location of the registry-assigned identifier inside a study document.
pub const IDENTITY_PATH: [&str; 3] = ["protocolSection", "identificationModule", "nctId"];

/// Extract the study identity (NCT id) from a raw registry document.
///
/// Missing intermediate objects, non-string values and blank strings all yield
/// `None`. Surrounding whitespace is trimmed.
pub fn extract_identity(document: &Value) -> Option<String> {
    IDENTITY_PATH
        .iter()
        .try_fold(document, |node, key| node.get(key))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}
