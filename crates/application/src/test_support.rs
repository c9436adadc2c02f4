//! Scripted transport shared by the use case tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use trapi_domain::{Credential, TokenGrant};

use crate::ports::{
    HttpTransport, TransportBody, TransportError, TransportRequest, TransportResponse,
};

pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, status: u16, body: Value) -> Self {
        self.push(Ok(TransportResponse::new(status, body)))
    }

    pub fn fail(self, error: TransportError) -> Self {
        self.push(Err(error))
    }

    fn push(self, reply: Result<TransportResponse, TransportError>) -> Self {
        self.replies.lock().expect("Lock poisoned").push_back(reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().expect("Lock poisoned").len()
    }

    pub fn request(&self, index: usize) -> TransportRequest {
        self.requests.lock().expect("Lock poisoned")[index].clone()
    }

    pub fn json_body(&self, index: usize) -> Value {
        match self.request(index).body {
            TransportBody::Json(value) => value,
            other => panic!("expected a JSON body, got {other:?}"),
        }
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().expect("Lock poisoned").push(request);
        self.replies
            .lock()
            .expect("Lock poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Other {
                    message: "no scripted reply left".to_string(),
                })
            })
    }
}

pub fn credential() -> Credential {
    let grant = TokenGrant {
        access_token: Some("clt.test-access-token".to_string()),
        expires_in: Some(7200),
        ..TokenGrant::default()
    };
    let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    Credential::from_grant(grant, now, Duration::seconds(60)).unwrap()
}

pub fn ok(data: Value) -> Value {
    json!({ "data": data, "error": { "code": "ok", "message": "", "log_id": "L0" } })
}

pub fn videos(ids: std::ops::Range<i64>) -> Value {
    Value::Array(ids.map(|id| json!({ "id": id })).collect())
}
