//! Variable injection: `#{key}` placeholders replaced verbatim before parsing

use indexmap::IndexMap;

pub fn placeholder(key: &str) -> String {
    format!("#{{{}}}", key)
}

/// Substitute every `#{key}` in `source`. Unknown placeholders are left as written.
pub fn inject(source: &str, data: &IndexMap<String, String>) -> String {
    data.iter().fold(source.to_string(), |text, (key, value)| {
        text.replace(&placeholder(key), value)
    })
}
