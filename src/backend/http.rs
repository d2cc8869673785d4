use std::time::Duration;

use tracing::{debug, warn};

use super::{
    Backend, BackendError, BackendReply, BackendRequest, MaterialReply, NumbersReply, SymmetryReply,
};

/// JSON-over-POST backend. Every request goes to the same URL.
pub struct HttpBackend {
    agent: ureq::Agent,
    url: String,
}

impl HttpBackend {
    pub fn new(url: &str, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            url: url.to_string(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl From<ureq::Error> for BackendError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => BackendError::Status(code),
            ureq::Error::Transport(t) => BackendError::Transport(t.to_string()),
        }
    }
}

impl Backend for HttpBackend {
    fn post(&self, request: &BackendRequest) -> Result<BackendReply, BackendError> {
        debug!("POST {} ({:?})", self.url, request.kind());

        let response = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_json(request)
            .map_err(|e| {
                warn!("Backend request failed: {}", e);
                BackendError::from(e)
            })?;

        let decode = |e: std::io::Error| BackendError::Decode(e.to_string());
        let reply = match request {
            BackendRequest::Numbers { .. } => {
                BackendReply::Numbers(response.into_json::<NumbersReply>().map_err(decode)?)
            }
            BackendRequest::Material { .. } => {
                BackendReply::Material(response.into_json::<MaterialReply>().map_err(decode)?)
            }
            BackendRequest::Symmetry { .. } => {
                BackendReply::Symmetry(response.into_json::<SymmetryReply>().map_err(decode)?)
            }
        };

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Answer one connection with `status` and `body`; the handle yields the
    /// raw request head and body.
    fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/plot", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);

            let mut head = String::new();
            let mut content_length = 0;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
                head.push_str(&line);
            }
            let mut request_body = vec![0u8; content_length];
            reader.read_exact(&mut request_body).unwrap();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            (head, String::from_utf8(request_body).unwrap())
        });

        (url, handle)
    }

    fn grid_json() -> serde_json::Value {
        let curves = json!({"r": {"XY": [[3000, 2000, 1000]], "XZ": [], "YZ": []},
                            "max": {"XY": 3000, "XZ": 0, "YZ": 0}});
        json!({
            "t": [0.0],
            "velocity": curves.clone(),
            "slowness": curves,
            "groupvelocity": {"r": {"XY": [], "XZ": [], "YZ": []}, "max": {"XY": 0, "XZ": 0, "YZ": 0}},
            "A": {"XY": [[[1, 0, 0], [0, 1, 0], [0, 0, 1]]], "XZ": [], "YZ": []}
        })
    }

    #[test]
    fn test_numbers_post_is_json_and_decoded() {
        let body = json!({"material": "Si (silicio)", "symmetry": 5, "plotData2d": grid_json()});
        let (url, server) = serve_once("200 OK", body.to_string());
        let backend = HttpBackend::new(&url, Some(Duration::from_secs(5)));

        let mut c = [[0.0; 6]; 6];
        c[0][0] = 165.7;
        let reply = backend.post(&BackendRequest::Numbers { c, rho: 2336.0 }).unwrap();

        let (head, sent) = server.join().unwrap();
        assert!(head.starts_with("POST /plot HTTP/1.1\r\n"), "{}", head);
        assert!(head
            .lines()
            .any(|l| l.to_ascii_lowercase() == "content-type: application/json"));
        let sent: serde_json::Value = serde_json::from_str(&sent).unwrap();
        assert_eq!(sent["content"], "numbers");
        assert_eq!(sent["C"][0][0], 165.7);
        assert_eq!(sent["rho"], 2336.0);

        let BackendReply::Numbers(numbers) = reply else {
            panic!("expected a numbers reply");
        };
        assert_eq!(numbers.material.as_deref(), Some("Si (silicio)"));
        assert_eq!(numbers.plot_data.velocity.r.xy[0], [3000.0, 2000.0, 1000.0]);
    }

    #[test]
    fn test_material_reply_is_decoded_by_request_kind() {
        let body = json!({"C": [[124, null]], "rho": 8960});
        let (url, server) = serve_once("200 OK", body.to_string());
        let backend = HttpBackend::new(&url, None);

        let reply = backend
            .post(&BackendRequest::Material {
                material: "Cu (cobre)".into(),
            })
            .unwrap();
        let (_, sent) = server.join().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&sent).unwrap(),
            json!({"content": "material", "material": "Cu (cobre)"})
        );
        assert_eq!(
            reply,
            BackendReply::Material(MaterialReply {
                c: vec![vec![Some(124.0), None]],
                rho: 8960.0
            })
        );
    }

    #[test]
    fn test_error_status_maps_to_status() {
        let (url, server) = serve_once("500 Internal Server Error", "{}".to_string());
        let backend = HttpBackend::new(&url, Some(Duration::from_secs(5)));
        let result = backend.post(&BackendRequest::Symmetry {
            symmetry: 5,
            c: [[0.0; 6]; 6],
        });
        server.join().unwrap();
        assert_eq!(result, Err(BackendError::Status(500)));
    }

    #[test]
    fn test_bad_body_maps_to_decode() {
        let (url, server) = serve_once("200 OK", "<html>not json</html>".to_string());
        let backend = HttpBackend::new(&url, Some(Duration::from_secs(5)));
        let result = backend.post(&BackendRequest::Symmetry {
            symmetry: 0,
            c: [[0.0; 6]; 6],
        });
        server.join().unwrap();
        assert!(matches!(result, Err(BackendError::Decode(_))), "{:?}", result);
    }

    #[test]
    fn test_unreachable_backend_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        let backend = HttpBackend::new(&url, Some(Duration::from_secs(5)));
        let result = backend.post(&BackendRequest::Material {
            material: "Si (silicio)".into(),
        });
        assert!(matches!(result, Err(BackendError::Transport(_))), "{:?}", result);
    }
}
