//! Recording transport double for unit tests.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use std::collections::VecDeque;
use std::sync::Mutex;
use transport_http::{HttpError, HttpResponse, HttpTransport};

enum Canned {
    Reply(StatusCode, Bytes),
    Fail,
}

/// Records every request and answers from a queue (200 with an empty body
/// once the queue is drained).
#[derive(Default)]
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<http::Request<Bytes>>>,
    replies: Mutex<VecDeque<Canned>>,
}

impl RecordingTransport {
    pub(crate) fn respond(&self, status: StatusCode, body: impl Into<Bytes>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Canned::Reply(status, body.into()));
    }

    pub(crate) fn respond_json(&self, status: StatusCode, body: &serde_json::Value) {
        self.respond(status, serde_json::to_vec(body).unwrap());
    }

    pub(crate) fn fail_next(&self) {
        self.replies.lock().unwrap().push_back(Canned::Fail);
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for RecordingTransport {
    async fn execute(&self, request: http::Request<Bytes>) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Canned::Reply(status, body)) => {
                Ok(HttpResponse::from_bytes(status, HeaderMap::new(), body))
            }
            Some(Canned::Fail) => Err(HttpError::Transport("connection refused".into())),
            None => Ok(HttpResponse::from_bytes(
                StatusCode::OK,
                HeaderMap::new(),
                Bytes::new(),
            )),
        }
    }
}
