//! In-process HTTP server serving canned Azure DevOps responses.
//!
//! Only compiled for tests or with the `test-util` feature.

use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use reqwest::Url;
use serde_json::{Value, json};

/// A request received by [`MockServer`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request path, without the query string.
    pub path: String,
    /// Decoded query parameters, in order.
    pub query: Vec<(String, String)>,
    /// Headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
}

impl RecordedRequest {
    /// Returns the first value of a query parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns a header value.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A canned response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl MockResponse {
    /// A `200 OK` response with a JSON body.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// An empty response with the given status.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Adds a response header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

type Handler = dyn Fn(&RecordedRequest) -> MockResponse + Send + Sync;

/// HTTP/1.1 server on a random local port, one connection per request.
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    /// Starts the server; `handler` answers every request.
    ///
    /// # Errors
    ///
    /// Returns an error if no local port can be bound.
    pub fn start<F>(handler: F) -> io::Result<Self>
    where
        F: Fn(&RecordedRequest) -> MockResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        let handler: Box<Handler> = Box::new(handler);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                // A broken connection only affects the request it carried.
                let _ = serve(stream, handler.as_ref(), &recorded);
            }
        });

        Ok(Self { addr, requests })
    }

    /// Base URL of the server, suitable as a repository `api_url`.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn serve(
    stream: TcpStream,
    handler: &Handler,
    recorded: &Mutex<Vec<RecordedRequest>>,
) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    let target = request_line.split_whitespace().nth(1).unwrap_or("/");

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let parsed = Url::parse(&format!("http://localhost{target}"))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let request = RecordedRequest {
        path: parsed.path().to_string(),
        query: parsed.query_pairs().into_owned().collect(),
        headers,
    };

    let response = handler(&request);
    recorded
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(request);

    let mut out = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        if response.status < 400 { "OK" } else { "Error" },
        response.body.len()
    );
    for (name, value) in &response.headers {
        out.push_str(&format!("{name}: {value}\r\n"));
    }
    out.push_str("\r\n");
    out.push_str(&response.body);

    let mut stream = stream;
    stream.write_all(out.as_bytes())?;
    stream.flush()
}

/// One commit record as returned by `GET …/commits`.
#[must_use]
pub fn commit_json(id: &str, author: &str, date: &str, message: &str) -> Value {
    json!({
        "commitId": id,
        "author": {
            "name": author,
            "email": format!("{}@example.com", author.to_lowercase().replace(' ', ".")),
            "date": date,
        },
        "committer": {
            "name": author,
            "email": "noreply@example.com",
            "date": date,
        },
        "comment": message,
    })
}

/// A list envelope (`{"count": n, "value": [...]}`).
#[must_use]
pub fn list_body(values: Vec<Value>) -> String {
    json!({ "count": values.len(), "value": values }).to_string()
}

/// A `GET …/refs` body listing the given branch names.
#[must_use]
pub fn refs_body(branches: &[&str]) -> String {
    list_body(
        branches
            .iter()
            .map(|b| json!({ "name": format!("refs/heads/{b}"), "objectId": "0000" }))
            .collect(),
    )
}
