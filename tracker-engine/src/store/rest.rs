use std::collections::HashMap;
use std::time::Duration;

use super::RecordStore;
use crate::error::{Error, Result};
use crate::record::ProblemRecord;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Server-mediated adapter: the record store lives behind the tracker's
/// REST API (`GET /questions`, `PUT /questions/:id`, `POST /questions`).
pub struct RestStore {
    base_url: String,
    agent: ureq::Agent,
}

impl RestStore {
    pub fn new(base_url: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(REQUEST_TIMEOUT)
            .timeout_read(REQUEST_TIMEOUT)
            .timeout_write(REQUEST_TIMEOUT)
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    fn questions_url(&self) -> String {
        format!("{}/questions", self.base_url)
    }
}

impl RecordStore for RestStore {
    fn fetch_all(&self) -> Result<Vec<ProblemRecord>> {
        match self.agent.get(&self.questions_url()).call() {
            Ok(resp) => resp
                .into_json::<Vec<ProblemRecord>>()
                .map_err(|e| Error::Load(format!("malformed /questions response: {}", e))),
            Err(ureq::Error::Status(code, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                Err(Error::Load(format!("GET /questions returned {}: {}", code, text)))
            }
            Err(err) => Err(Error::Load(format!("GET /questions failed: {}", err))),
        }
    }

    // The backend has no id-set endpoint; the batch read is one GET of the
    // whole collection mapped down to id -> done.
    fn fetch_done(&self, ids: &[String]) -> Result<HashMap<String, bool>> {
        let all = self
            .fetch_all()
            .map_err(|e| Error::Hydrate(e.to_string()))?;
        let mut done: HashMap<String, bool> =
            all.into_iter().map(|r| (r.id, r.done)).collect();
        done.retain(|id, _| ids.contains(id));
        Ok(done)
    }

    fn write_done(&mut self, id: &str, done: bool) -> Result<()> {
        let url = format!("{}/{}", self.questions_url(), id);
        let body = serde_json::json!({ "Done": done });
        match self.agent.put(&url).send_json(body) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                Err(Error::WriteBack {
                    id: id.to_string(),
                    reason: format!("PUT returned {}: {}", code, text),
                })
            }
            Err(err) => Err(Error::WriteBack {
                id: id.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn upsert_record(&mut self, record: &ProblemRecord) -> Result<()> {
        match self.agent.post(&self.questions_url()).send_json(record) {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, resp)) => {
                let text = resp.into_string().unwrap_or_default();
                Err(Error::Storage(format!("POST /questions returned {}: {}", code, text)))
            }
            Err(err) => Err(Error::Storage(format!("POST /questions failed: {}", err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Difficulty;
    use std::io::Read;
    use std::sync::mpsc;
    use std::thread;

    fn sample_json() -> String {
        serde_json::to_string(&vec![
            ProblemRecord {
                id: "1".to_string(),
                title: "Two Sum".to_string(),
                acceptance: "49.1%".to_string(),
                difficulty: Difficulty::Easy,
                frequency: 100.0,
                link: "https://leetcode.com/problems/two-sum".to_string(),
                done: true,
            },
            ProblemRecord {
                id: "2".to_string(),
                title: "Add Two Numbers".to_string(),
                acceptance: "40.0%".to_string(),
                difficulty: Difficulty::Medium,
                frequency: 90.0,
                link: "https://leetcode.com/problems/add-two-numbers".to_string(),
                done: false,
            },
        ])
        .unwrap()
    }

    /// One-shot stub server: answers `n` requests, reporting each
    /// (method, url, body) on the channel.
    fn stub_server(
        n: usize,
        reply: String,
    ) -> (String, mpsc::Receiver<(String, String, String)>) {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for _ in 0..n {
                let mut request = match server.recv() {
                    Ok(r) => r,
                    Err(_) => return,
                };
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let _ = tx.send((
                    request.method().as_str().to_string(),
                    request.url().to_string(),
                    body,
                ));
                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"application/json"[..],
                )
                .unwrap();
                let _ = request.respond(
                    tiny_http::Response::from_string(reply.clone()).with_header(header),
                );
            }
        });

        (format!("http://127.0.0.1:{}", port), rx)
    }

    #[test]
    fn test_fetch_all_and_batch_read() {
        let (base, rx) = stub_server(2, sample_json());
        let store = RestStore::new(&base);

        let all = store.fetch_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Two Sum");

        let (method, url, _) = rx.recv().unwrap();
        assert_eq!(method, "GET");
        assert_eq!(url, "/questions");

        let done = store
            .fetch_done(&["1".to_string(), "2".to_string(), "999".to_string()])
            .unwrap();
        assert_eq!(done.get("1"), Some(&true));
        assert_eq!(done.get("2"), Some(&false));
        assert!(!done.contains_key("999"));
    }

    #[test]
    fn test_write_done_puts_done_only() {
        let (base, rx) = stub_server(1, "{}".to_string());
        let mut store = RestStore::new(&base);

        store.write_done("42", true).unwrap();

        let (method, url, body) = rx.recv().unwrap();
        assert_eq!(method, "PUT");
        assert_eq!(url, "/questions/42");
        let payload: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(payload, serde_json::json!({ "Done": true }));
    }

    #[test]
    fn test_unreachable_server_is_a_write_back_error() {
        // Nothing listens here; connects fail fast on loopback.
        let mut store = RestStore::new("http://127.0.0.1:1");
        match store.write_done("1", true) {
            Err(Error::WriteBack { id, .. }) => assert_eq!(id, "1"),
            other => panic!("expected WriteBack error, got {:?}", other.err()),
        }
        assert!(matches!(store.fetch_all(), Err(Error::Load(_))));
    }
}
