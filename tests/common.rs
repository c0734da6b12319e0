#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use snowflake_adapter_rs::{
    Environment, Error, ExecutionContext, ProfileFields, Result, SessionDriver,
    SnowflakeConnectionManager, SnowflakeCredentials, SnowflakeSession,
};

/// Fields every profile needs regardless of authenticator.
pub fn base_fields() -> ProfileFields {
    ProfileFields {
        database: Some("test_database".to_string()),
        warehouse: Some("test_warehouse".to_string()),
        schema: Some("test_schema".to_string()),
        ..Default::default()
    }
}

pub fn resolve(fields: ProfileFields) -> Result<SnowflakeCredentials> {
    SnowflakeCredentials::resolve(fields, &Environment::empty())
}

pub fn oauth_credentials() -> Arc<SnowflakeCredentials> {
    let fields = ProfileFields {
        account: Some("test_account".to_string()),
        user: Some("test_user".to_string()),
        authenticator: Some("oauth".to_string()),
        token: Some("expired_or_incorrect_token".to_string()),
        ..base_fields()
    };
    Arc::new(resolve(fields).unwrap())
}

pub enum Outcome {
    Session,
    Rejected { code: &'static str },
    Unreachable,
}

/// A driver that answers every login with a canned outcome and counts calls.
pub struct FakeDriver {
    outcome: Outcome,
    calls: AtomicUsize,
}

impl FakeDriver {
    pub fn new(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionDriver for FakeDriver {
    async fn login(&self, credentials: &SnowflakeCredentials) -> Result<SnowflakeSession> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Session => {
                let base_url = url::Url::parse(&format!(
                    "https://{}.snowflakecomputing.com",
                    credentials.unique_field()
                ))
                .unwrap();
                Ok(SnowflakeSession::new(
                    reqwest::Client::new(),
                    base_url,
                    "session-token",
                ))
            }
            Outcome::Rejected { code } => Err(Error::LoginRejected {
                code: code.to_string(),
                message: "login rejected by fake driver".to_string(),
            }),
            Outcome::Unreachable => Err(Error::Communication("connection refused".to_string())),
        }
    }
}

pub fn manager(
    credentials: Arc<SnowflakeCredentials>,
    driver: Arc<FakeDriver>,
) -> SnowflakeConnectionManager {
    let context = ExecutionContext::current().expect("tests run inside a tokio runtime");
    SnowflakeConnectionManager::with_driver(credentials, context, driver)
}

pub const LOGIN_PATH: &str = "/session/v1/login-request";
pub const QUERY_PATH: &str = "/queries/v1/query-request";
pub const SESSION_PATH: &str = "/session";

pub const LOGIN_OK: &str =
    r#"{"data":{"token":"session-token"},"code":null,"message":null,"success":true}"#;
pub const QUERY_OK: &str =
    r#"{"data":{"queryId":"query-1","rowset":[]},"code":null,"message":null,"success":true}"#;

pub fn rejection(code: &str) -> String {
    format!(r#"{{"data":null,"code":"{code}","message":"rejected","success":false}}"#)
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub path: String,
    pub query: String,
    pub body: String,
}

/// A local HTTP server answering Snowflake's login and query endpoints
/// with canned bodies.
pub struct MockSnowflake {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockSnowflake {
    pub async fn start(login: String, query: String) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new((login, query));

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                let replies = Arc::clone(&replies);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let recorded = Arc::clone(&recorded);
                        let replies = Arc::clone(&replies);
                        async move {
                            let path = req.uri().path().to_string();
                            let query = req.uri().query().unwrap_or_default().to_string();
                            let body = req.into_body().collect().await?.to_bytes();
                            let reply = match path.as_str() {
                                LOGIN_PATH => replies.0.clone(),
                                QUERY_PATH => replies.1.clone(),
                                _ => r#"{"data":null,"code":null,"message":null,"success":true}"#
                                    .to_string(),
                            };
                            recorded.lock().unwrap().push(Recorded {
                                path,
                                query,
                                body: String::from_utf8_lossy(&body).into_owned(),
                            });
                            Ok::<_, hyper::Error>(Response::new(Full::new(Bytes::from(reply))))
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self { addr, requests }
    }

    /// Profile fields pointing the built-in driver at this server.
    pub fn fields(&self) -> ProfileFields {
        ProfileFields {
            account: Some("test_account".to_string()),
            host: Some(self.addr.ip().to_string()),
            port: Some(self.addr.port()),
            protocol: Some("http".to_string()),
            ..base_fields()
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}
