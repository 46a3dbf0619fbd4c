//! Integration tests for the GraphQL client over an in-memory transport.

use std::collections::VecDeque;
use std::sync::Arc;

use horizon_gql::{Fragment, FragmentMode, Operation, Serializer};
use horizon_gql_net::{
    ClientError, GraphQLClient, Transport, TransportError, TransportRequest, TransportResponse,
};
use parking_lot::Mutex;
use serde_json::json;

/// Records every request and replays canned responses in order.
#[derive(Clone, Default)]
struct MockTransport {
    requests: Arc<Mutex<Vec<TransportRequest>>>,
    responses: Arc<Mutex<VecDeque<Result<TransportResponse, TransportError>>>>,
}

impl MockTransport {
    fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .push_back(Ok(TransportResponse::new(status, body.into())));
        self
    }

    fn respond_json(self, body: serde_json::Value) -> Self {
        self.respond(200, body.to_string())
    }

    fn fail(self, error: TransportError) -> Self {
        self.responses.lock().push_back(Err(error));
        self
    }

    fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }
}

impl Transport for MockTransport {
    fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().push(request.clone());
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no canned response".into())))
    }
}

fn client(transport: &MockTransport) -> GraphQLClient {
    GraphQLClient::new("https://api.example.com/graphql")
        .bearer_auth("token123")
        .header("X-Request-Source", "tests")
        .transport(transport.clone())
        .build()
        .expect("Failed to build client")
}

fn cat_query() -> Operation {
    Operation::query(|q| {
        q.field("catCollection").arg("limit", 1).select(|c| {
            c.field("items").select(|i| {
                i.field("name");
                i.field("likes");
            });
        });
    })
    .unwrap()
}

fn body_of(request: &TransportRequest) -> serde_json::Value {
    serde_json::from_str(&request.body).expect("request body is JSON")
}

#[test]
fn test_request_envelope_and_headers() {
    let transport = MockTransport::default().respond_json(json!({"data": {"catCollection": null}}));
    client(&transport).execute(&cat_query()).unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(request.url, "https://api.example.com/graphql");
    assert_eq!(request.headers["content-type"], "application/json");
    assert_eq!(request.headers["accept"], "application/json");
    assert_eq!(request.headers["authorization"], "Bearer token123");
    assert_eq!(request.headers["x-request-source"], "tests");

    let body = body_of(request);
    assert_eq!(body.as_object().unwrap().len(), 1);
    assert_eq!(
        body["query"],
        "query {\n  catCollection(limit: 1) {\n    items {\n      name\n      likes\n    }\n  }\n}"
    );
}

#[test]
fn test_cat_collection_scenario() {
    let transport = MockTransport::default().respond_json(json!({
        "data": {
            "catCollection": {
                "items": [{"name": "Mittens", "likes": 42}]
            }
        }
    }));

    let result = client(&transport).execute(&cat_query()).unwrap();

    assert!(!result.has_errors());
    assert_eq!(
        result.path("catCollection.items.0.name").unwrap().as_str(),
        Some("Mittens")
    );
    let items = result.data().get("catCollection").unwrap().get("items").unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items.at(0).unwrap().get("likes").unwrap().as_i64(), Some(42));
    assert!(result.query().starts_with("query {"));
}

#[test]
fn test_partial_failure_keeps_data() {
    let transport = MockTransport::default()
        .respond_json(json!({"data": {"x": 1}, "errors": [{"message": "boom"}]}));
    let query = Operation::query(|q| {
        q.field("x");
    })
    .unwrap();

    let result = client(&transport).execute(&query).unwrap();

    assert_eq!(result.data().get("x").unwrap().as_i64(), Some(1));
    let errors = result.errors().expect("errors are exposed");
    assert_eq!(errors.errors().len(), 1);
    assert!(errors.message().contains("boom"));

    let err = result.into_result().unwrap_err();
    assert!(err.to_string().contains("boom"));
}

#[test]
fn test_errors_without_data() {
    let transport = MockTransport::default().respond_json(json!({
        "errors": [
            {"message": "Field 'nope' doesn't exist", "locations": [{"line": 2, "column": 3}]},
            {"message": "second"}
        ]
    }));
    let query = Operation::query(|q| {
        q.field("nope");
    })
    .unwrap();

    match client(&transport).execute(&query) {
        Err(ClientError::Execution(e)) => {
            assert_eq!(e.errors().len(), 2);
            assert_eq!(e.errors()[0].locations[0].line, 2);
            assert_eq!(e.messages().last(), Some("second"));
        }
        other => panic!("expected execution error, got {other:?}"),
    }
}

#[test]
fn test_neither_data_nor_errors() {
    let transport = MockTransport::default().respond_json(json!({"extensions": {"cost": 1}}));
    let err = client(&transport).execute(&cat_query()).unwrap_err();
    assert!(matches!(err, ClientError::Protocol(_)));
}

#[test]
fn test_error_status() {
    let transport = MockTransport::default().respond(502, "Bad Gateway");
    let err = client(&transport).execute(&cat_query()).unwrap_err();

    match err {
        ClientError::Transport(TransportError::Status { status, body }) => {
            assert_eq!(status, 502);
            assert_eq!(body.as_deref(), Some("Bad Gateway"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn test_transport_failure_is_propagated() {
    let transport = MockTransport::default().fail(TransportError::Timeout);
    let err = client(&transport).execute(&cat_query()).unwrap_err();
    assert!(matches!(err, ClientError::Transport(TransportError::Timeout)));
    assert_eq!(transport.requests().len(), 1);
}

#[test]
fn test_invalid_json_body() {
    let transport = MockTransport::default().respond(200, "<html>oops</html>");
    let err = client(&transport).execute(&cat_query()).unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
}

#[test]
fn test_serialization_failure_sends_nothing() {
    let transport = MockTransport::default();
    let query = Operation::query(|q| {
        q.field("cats").select(|c| {
            c.spread_named("CatFields");
        });
    })
    .unwrap();

    let err = client(&transport).execute(&query).unwrap_err();

    assert!(matches!(
        err,
        ClientError::Query(horizon_gql::Error::DanglingFragmentReference { .. })
    ));
    assert!(transport.requests().is_empty());
}

#[test]
fn test_one_request_per_execute() {
    let transport = MockTransport::default()
        .respond_json(json!({"data": {"x": 1}}))
        .respond_json(json!({"data": {"x": 2}}));
    let client = client(&transport);
    let query = Operation::query(|q| {
        q.field("x");
    })
    .unwrap();

    let first = client.execute(&query).unwrap();
    let second = client.execute(&query).unwrap();

    assert_eq!(first.path("x").unwrap().as_i64(), Some(1));
    assert_eq!(second.path("x").unwrap().as_i64(), Some(2));
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn test_execute_with_inline_fragments() {
    let cat_fields = Fragment::new("CatFields", "Cat", |s| {
        s.field("name");
    })
    .unwrap();
    let query = Operation::query(|q| {
        q.field("cats").select(|c| {
            c.spread(&cat_fields);
        });
    })
    .unwrap();

    let transport = MockTransport::default()
        .respond_json(json!({"data": {"cats": []}}))
        .respond_json(json!({"data": {"cats": []}}));
    let client = client(&transport);

    client.execute(&query).unwrap();
    client
        .execute_with(
            &query,
            &Serializer::new().fragment_mode(FragmentMode::Inline),
        )
        .unwrap();

    let requests = transport.requests();
    assert_eq!(
        body_of(&requests[0])["query"],
        "query {\n  cats {\n    ...CatFields\n  }\n}\nfragment CatFields on Cat {\n  name\n}"
    );
    assert_eq!(
        body_of(&requests[1])["query"],
        "query {\n  cats {\n    ... on Cat {\n      name\n    }\n  }\n}"
    );
}

#[test]
fn test_client_supplied_fragment() {
    let cat_fields = Fragment::new("CatFields", "Cat", |s| {
        s.field("likes");
    })
    .unwrap();
    let transport = MockTransport::default().respond_json(json!({"data": {"cats": []}}));
    let client = GraphQLClient::new("https://api.example.com/graphql")
        .fragment(cat_fields)
        .transport(transport.clone())
        .build()
        .unwrap();

    let query = Operation::query(|q| {
        q.field("cats").select(|c| {
            c.spread_named("CatFields");
        });
    })
    .unwrap();
    client.execute(&query).unwrap();

    let body = body_of(&transport.requests()[0]);
    assert!(
        body["query"]
            .as_str()
            .unwrap()
            .ends_with("fragment CatFields on Cat {\n  likes\n}")
    );
}

#[test]
fn test_client_is_shareable_across_threads() {
    let transport = MockTransport::default();
    for i in 0..4 {
        transport
            .responses
            .lock()
            .push_back(Ok(TransportResponse::new(200, json!({"data": {"n": i}}).to_string())));
    }
    let client = client(&transport);
    let query = Operation::query(|q| {
        q.field("n");
    })
    .unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let client = client.clone();
            let query = &query;
            scope.spawn(move || {
                let result = client.execute(query).unwrap();
                assert!(result.path("n").unwrap().as_i64().is_some());
            });
        }
    });

    assert_eq!(transport.requests().len(), 4);
}
