//! Records port interactions into a cassette file.
//!
//! Recordings taken against the hosted backend would otherwise carry live
//! credentials: signed storage URLs embed a `token` query parameter and
//! session payloads may echo keys. Both are scrubbed before anything is kept.

use std::path::PathBuf;

use chrono::Utc;
use serde_json::Value;

use super::format::{Cassette, Interaction};

/// Placeholder written in place of a scrubbed secret.
pub const REDACTED: &str = "<redacted>";

/// Object keys whose values never reach a cassette.
const SECRET_KEYS: &[&str] = &["access_token", "refresh_token", "apikey", "authorization", "password"];

/// Collects interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    endpoint: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// A recorder that will write to `path` on [`finish`](Self::finish).
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), endpoint: endpoint.into(), interactions: Vec::new() }
    }

    /// Appends one interaction with secrets scrubbed. Sequence numbers follow
    /// recording order.
    pub fn record(&mut self, port: impl Into<String>, method: impl Into<String>, input: Value, output: Value) {
        let seq = self.interactions.len() as u64;
        self.interactions.push(Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input: scrub(input),
            output: scrub(output),
        });
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// True when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Writes the cassette, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            endpoint: self.endpoint,
            interactions: self.interactions,
        };
        let yaml = serde_yaml::to_string(&cassette).map_err(std::io::Error::other)?;
        std::fs::write(&self.path, yaml)?;
        Ok(self.path)
    }
}

/// Replaces secret-named values and URL tokens anywhere in `value`.
#[must_use]
pub fn scrub(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| {
                    if SECRET_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
                        (key, Value::String(REDACTED.into()))
                    } else {
                        (key, scrub(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(scrub).collect()),
        Value::String(s) => Value::String(scrub_url_token(&s)),
        other => other,
    }
}

/// `https://x/object/sign/files/a.pdf?token=abc&x=1` keeps its path and
/// other parameters; only the token value goes.
fn scrub_url_token(s: &str) -> String {
    let Some((base, query)) = s.split_once('?') else {
        return s.to_string();
    };
    if !s.starts_with("http") {
        return s.to_string();
    }
    let params: Vec<String> = query
        .split('&')
        .map(|param| match param.split_once('=') {
            Some(("token", _)) => format!("token={REDACTED}"),
            _ => param.to_string(),
        })
        .collect();
    format!("{base}?{}", params.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_and_finish() {
        let dir = std::env::temp_dir().join("projectdesk_cassette_test").join("nested");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("tables.cassette.yaml");

        let mut recorder = CassetteRecorder::new(&path, "fetch-projects", "memory");
        recorder.record("tables", "select", json!({"table": "tasks"}), json!({"Ok": []}));
        recorder.record("storage", "list", json!({"prefix": "tasks/t1"}), json!({"Ok": []}));
        recorder.record("clock", "now", json!({}), json!("2025-01-01T00:00:00Z"));
        assert_eq!(recorder.len(), 3);

        let written = recorder.finish().expect("finish should succeed");
        assert_eq!(written, path);

        let cassette: Cassette = serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(cassette.name, "fetch-projects");
        assert_eq!(cassette.endpoint, "memory");
        let seqs: Vec<u64> = cassette.interactions.iter().map(|i| i.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2]);
        assert_eq!(cassette.interactions[1].port, "storage");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn secrets_are_scrubbed_before_recording() {
        let mut recorder = CassetteRecorder::new("/dev/null", "t", "https://x.test");
        recorder.record(
            "storage",
            "signed_url",
            json!({"bucket": "files", "path": "tasks/p1/plan.pdf", "AccessToken": "kept", "apikey": "anon"}),
            json!({"Ok": "https://x.test/storage/v1/object/sign/files/tasks/p1/plan.pdf?token=eyJhbGciOi&download"}),
        );

        let recorded = &recorder.interactions[0];
        assert_eq!(recorded.input["apikey"], REDACTED);
        assert_eq!(recorded.input["AccessToken"], "kept");
        assert_eq!(recorded.input["path"], "tasks/p1/plan.pdf");
        assert_eq!(
            recorded.output["Ok"],
            "https://x.test/storage/v1/object/sign/files/tasks/p1/plan.pdf?token=<redacted>&download"
        );
    }

    #[test]
    fn plain_strings_with_question_marks_are_untouched() {
        assert_eq!(scrub(json!("why?token=1")), json!("why?token=1"));
        assert_eq!(scrub(json!({"rows": [{"Authorization": "Bearer x"}]})), json!({"rows": [{"Authorization": REDACTED}]}));
    }
}
