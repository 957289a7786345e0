use serde_json::Value;

const JSON_CODE_BLOCK_START: &str = "```json";
const CODE_BLOCK_START: &str = "```";
const CODE_BLOCK_END: &str = "```";

/// Strips a surrounding markdown code fence, if any.
pub fn clean_response(response: &str) -> &str {
    let start_marker = if response.contains(JSON_CODE_BLOCK_START) {
        JSON_CODE_BLOCK_START
    } else if response.contains(CODE_BLOCK_START) {
        CODE_BLOCK_START
    } else {
        return response.trim();
    };

    if let Some(start) = response.find(start_marker) {
        let json_start = start + start_marker.len();
        if let Some(end) = response[json_start..].find(CODE_BLOCK_END) {
            return response[json_start..json_start + end].trim();
        }
    }
    response.trim()
}

/// Parses a model reply as JSON. Falls back to the outermost `{...}` span
/// when the model wrapped the object in prose.
pub fn parse_structured(response: &str) -> Option<Value> {
    let cleaned = clean_response(response);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<Value>(cleaned) {
        return Some(value);
    }
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&cleaned[start..=end]).ok()
}
