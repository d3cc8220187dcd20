//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port in its own thread and runtime,
//! then drives every pipeline stage over real HTTP with `UreqTransport`.
//! Checks that what the server receives is exactly what resolution built,
//! and that server answers surface as the right `CallError` variants.

use remote_core::{
    BoxError, CallError, Endpoint, Interceptor, JsonEndpoint, Method, MergePolicy, PerformingError, QueryParameters,
    Remote, RemoteConfig, Request, Response, TransportError, UreqTransport, WireRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use mock_server::{Echo, Note};

fn start_server() -> std::net::SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn local_config(addr: std::net::SocketAddr) -> RemoteConfig {
    RemoteConfig::new(addr.ip().to_string())
        .unwrap()
        .with_scheme("http")
        .with_port(addr.port())
}

/// Sends `method` to `/echo{path}` with the given query and body.
struct EchoEndpoint {
    method: Method,
}

struct EchoInput {
    path: &'static str,
    query: Vec<(&'static str, &'static str)>,
    header: Option<(&'static str, &'static str)>,
    body: Option<&'static str>,
}

impl Endpoint for EchoEndpoint {
    type Input = EchoInput;
    type Output = Echo;

    fn build_request(&self, input: &EchoInput) -> Result<Request, BoxError> {
        let mut builder = Request::builder(self.method, format!("/echo{}", input.path));
        for (name, value) in &input.query {
            builder = builder.query(*name, *value);
        }
        if let Some((name, value)) = input.header {
            builder = builder.header(name, value);
        }
        if let Some(text) = input.body {
            builder = builder.body(remote_core::Body::plain(text));
        }
        Ok(builder.build()?)
    }

    fn parse(&self, response: Response) -> Result<Echo, BoxError> {
        Ok(response.json()?)
    }
}

#[derive(Serialize)]
struct NewNote {
    text: String,
}

#[derive(Clone, Default)]
struct Outcomes(Arc<Mutex<Vec<&'static str>>>);

impl Interceptor for Outcomes {
    fn did_succeed(&self, _request: &WireRequest, _response: &Response) {
        self.0.lock().unwrap().push("succeeded");
    }

    fn did_fail(&self, _request: &WireRequest, _error: &PerformingError) {
        self.0.lock().unwrap().push("failed");
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn server_receives_the_resolved_request() {
    let addr = start_server();
    let config = local_config(addr)
        .with_path("")
        .unwrap()
        .with_query("api-version", "2")
        .with_header("X-Client", "remote-core")
        .unwrap();
    let remote = Remote::new(config, UreqTransport::new());

    let echo = remote
        .call(
            &EchoEndpoint { method: Method::Put },
            &EchoInput {
                path: "/items/7",
                query: vec![("mode", "full")],
                header: Some(("X-Trace", "abc")),
                body: Some("payload"),
            },
        )
        .await
        .unwrap();

    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.path, "/echo/items/7");
    assert_eq!(echo.query.as_deref(), Some("api-version=2&mode=full"));
    assert_eq!(echo.body, "payload");
    let header = |name: &str| {
        echo.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(header("x-client").as_deref(), Some("remote-core"));
    assert_eq!(header("x-trace").as_deref(), Some("abc"));
    assert_eq!(header("content-type").as_deref(), Some("text/plain; charset=utf-8"));
    assert_eq!(header("content-length").as_deref(), Some("7"));
}

#[tokio::test(flavor = "multi_thread")]
async fn get_without_query_sends_no_query_string() {
    let addr = start_server();
    let remote = Remote::new(local_config(addr), UreqTransport::new());

    let echo = remote
        .call(
            &EchoEndpoint { method: Method::Get },
            &EchoInput {
                path: "",
                query: Vec::new(),
                header: None,
                body: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(echo.method, "GET");
    assert_eq!(echo.path, "/echo");
    assert!(echo.query.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn custom_query_policy_reaches_the_server() {
    let addr = start_server();
    let config = local_config(addr)
        .with_query("Query", "true")
        .with_query_policy(MergePolicy::custom(|service: &QueryParameters, _: &QueryParameters| {
            service.clone()
        }));
    let remote = Remote::new(config, UreqTransport::new());

    let echo = remote
        .call(
            &EchoEndpoint { method: Method::Get },
            &EchoInput {
                path: "/q",
                query: vec![("query", "false")],
                header: None,
                body: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(echo.query.as_deref(), Some("Query=true"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unauthorized_status_is_http_error() {
    let addr = start_server();
    let outcomes = Outcomes::default();
    let remote = Remote::new(local_config(addr), UreqTransport::new()).with_interceptor(outcomes.clone());
    let status: JsonEndpoint<u16, serde_json::Value> = JsonEndpoint::new(Method::Get, |code| format!("/status/{code}"));

    let err = remote.call(&status, &401).await.unwrap_err();

    match err {
        CallError::HttpError(response) => {
            assert_eq!(response.status().code(), 401);
            assert_eq!(response.text().unwrap(), "status 401");
        }
        other => panic!("expected HttpError, got {other:?}"),
    }
    // The exchange itself succeeded.
    assert_eq!(*outcomes.0.lock().unwrap(), vec!["succeeded"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn note_lifecycle_through_json_endpoints() {
    let addr = start_server();
    let remote = Remote::new(local_config(addr), UreqTransport::new());

    let create: JsonEndpoint<NewNote, Note> = JsonEndpoint::new(Method::Post, |_| "/notes".to_string());
    let get: JsonEndpoint<Uuid, Note> = JsonEndpoint::new(Method::Get, |id| format!("/notes/{id}"));
    let list: JsonEndpoint<(), Vec<Note>> = JsonEndpoint::new(Method::Get, |_| "/notes".to_string());
    let delete: JsonEndpoint<Uuid, ()> = JsonEndpoint::new(Method::Delete, |id| format!("/notes/{id}"));

    let notes = remote.call(&list, &()).await.unwrap();
    assert!(notes.is_empty(), "expected empty list");

    let created = remote
        .call(
            &create,
            &NewNote {
                text: "Integration test".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(created.text, "Integration test");

    let fetched = remote.call(&get, &created.id).await.unwrap();
    assert_eq!(fetched, created);

    let notes = remote.call(&list, &()).await.unwrap();
    assert_eq!(notes, vec![created.clone()]);

    remote.call(&delete, &created.id).await.unwrap();

    let err = remote.call(&get, &created.id).await.unwrap_err();
    assert!(matches!(&err, CallError::HttpError(r) if r.status().code() == 404));

    let err = remote.call(&delete, &created.id).await.unwrap_err();
    assert!(matches!(&err, CallError::HttpError(r) if r.status().code() == 404));
}

#[tokio::test(flavor = "multi_thread")]
async fn decoding_the_wrong_shape_is_bad_response() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Strict {
        missing_field: String,
    }

    let addr = start_server();
    let remote = Remote::new(local_config(addr), UreqTransport::new());
    let list: JsonEndpoint<(), Strict> = JsonEndpoint::new(Method::Get, |_| "/notes".to_string());

    let err = remote.call(&list, &()).await.unwrap_err();
    assert!(matches!(err, CallError::BadResponse(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_network_failure() {
    // Bind then drop to find a port with nothing listening.
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let outcomes = Outcomes::default();
    let remote = Remote::new(local_config(addr), UreqTransport::new()).with_interceptor(outcomes.clone());
    let list: JsonEndpoint<(), Vec<Note>> = JsonEndpoint::new(Method::Get, |_| "/notes".to_string());

    let err = remote.call(&list, &()).await.unwrap_err();

    assert!(matches!(
        err,
        CallError::NetworkFailure(TransportError::Connect(_) | TransportError::Unknown(_))
    ));
    assert_eq!(*outcomes.0.lock().unwrap(), vec!["failed"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn silent_server_times_out() {
    // Accepted by the kernel backlog, never answered.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let remote = Remote::new(
        local_config(addr),
        UreqTransport::with_timeout(std::time::Duration::from_millis(200)),
    );
    let list: JsonEndpoint<(), Vec<Note>> = JsonEndpoint::new(Method::Get, |_| "/notes".to_string());

    let err = remote.call(&list, &()).await.unwrap_err();

    assert!(matches!(err, CallError::NetworkFailure(TransportError::TimedOut)), "{err:?}");
    drop(listener);
}
