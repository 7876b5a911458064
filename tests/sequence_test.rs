use hrun::parser::HttpFileParser;
use hrun::runner::Executor;
use hrun::{HrunError, TransportError};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHAINED: &str = r#"@token = abc

### Create item
# Creates an item and remembers its id
# @capture nextId = $.id
POST {{base}}/items
Authorization: Bearer {{token}}
Content-Type: application/json

{"name": "widget"}

### Fetch item
GET {{base}}/items/{{nextId}}?expand=owner
Authorization: Bearer {{token}}
"#;

fn with_base(server: &MockServer, content: &str) -> String {
    format!("@base = {}\n{}", server.uri(), content)
}

fn executor() -> Executor {
    Executor::new(Duration::from_secs(5)).unwrap()
}

/// 测试捕获的值传递给后续请求
#[tokio::test]
async fn test_captured_values_flow_into_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/items"))
        .and(header("authorization", "Bearer abc"))
        .and(body_string("{\"name\": \"widget\"}\n"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/items/7"))
        .and(query_param("expand", "owner"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("chain.http");
    fs::write(&file_path, with_base(&server, CHAINED)).unwrap();

    let mut file = HttpFileParser::parse_file(&file_path).unwrap();
    assert_eq!(file.requests.len(), 2);
    assert_eq!(
        file.requests[0].description.as_deref(),
        Some("Creates an item and remembers its id")
    );

    let responses = executor().execute_all(&mut file).await.unwrap();

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].status_code(), Some(201));
    assert_eq!(
        responses[0].captured_variables.get("nextId").map(String::as_str),
        Some("7")
    );
    assert_eq!(responses[1].status_code(), Some(200));
    assert_eq!(responses[1].body, "ok");
    assert!(responses[1].captured_variables.is_empty());
    assert_eq!(file.variables.get("nextId"), Some("7"));

    // 保存的请求保留占位符
    assert_eq!(file.requests[1].url, "{{base}}/items/{{nextId}}?expand=owner");
}

/// 测试无法构建的请求会中断执行，后续请求不会发送
#[tokio::test]
async fn test_build_failure_aborts_sequence() {
    let server = MockServer::start().await;

    Mock::given(path("/one"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(path("/three"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let content = with_base(
        &server,
        "### One\nGET {{base}}/one\n\n### Two\nGET {{missing}}/two\n\n### Three\nGET {{base}}/three\n",
    );
    let mut file = HttpFileParser::parse_content(&content).unwrap();
    assert_eq!(file.requests.len(), 3);

    let aborted = executor().execute_all(&mut file).await.unwrap_err();

    assert_eq!(aborted.index, 2);
    assert_eq!(aborted.responses.len(), 1);
    assert_eq!(aborted.responses[0].status_code(), Some(200));
    assert!(matches!(aborted.source, HrunError::InvalidUrl { .. }));
    assert!(aborted.to_string().contains("{{missing}}/two"));
}

/// 测试传输失败记录在响应中，执行继续
#[tokio::test]
async fn test_transport_errors_do_not_stop_sequence() {
    let server = MockServer::start().await;

    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    Mock::given(path("/after"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let content = with_base(
        &server,
        "### Slow\n# @capture never = $.id\nGET {{base}}/slow\n\n### Refused\nGET http://127.0.0.1:1/\n\n### After\nGET {{base}}/after\n",
    );
    let mut file = HttpFileParser::parse_content(&content).unwrap();

    let executor = Executor::new(Duration::from_millis(100)).unwrap();
    let responses = executor.execute_all(&mut file).await.unwrap();

    assert_eq!(responses.len(), 3);

    assert!(matches!(responses[0].error, Some(TransportError::Timeout(_))));
    assert_eq!(responses[0].status, None);
    assert!(responses[0].captured_variables.is_empty());
    assert!(!file.variables.contains("never"));

    assert!(responses[1].error.is_some());
    assert!(!responses[1].is_success());

    assert!(responses[2].error.is_none());
    assert_eq!(responses[2].status_code(), Some(204));
}

#[tokio::test]
async fn test_content_type_inferred_from_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/xml"))
        .and(header("content-type", "application/xml"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let content = with_base(
        &server,
        "###\nPOST {{base}}/json\n\n[1, 2, 3]\n\n###\nPUT {{base}}/xml\n\n<item id=\"1\"/>\n",
    );
    let mut file = HttpFileParser::parse_content(&content).unwrap();
    let responses = executor().execute_all(&mut file).await.unwrap();

    assert!(responses.iter().all(|r| r.is_success()));
}

#[tokio::test]
async fn test_duplicate_headers_are_all_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/multi"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-served-by", "mock")
                .set_body_string("done"),
        )
        .mount(&server)
        .await;

    let content = with_base(
        &server,
        "GET {{base}}/multi\nX-Tag: first\nX-Tag: second\nAccept: */*\n",
    );
    let mut file = HttpFileParser::parse_content(&content).unwrap();
    let responses = executor().execute_all(&mut file).await.unwrap();
    assert_eq!(responses[0].headers.get("x-served-by"), Some("mock"));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let tags: Vec<&str> = received[0]
        .headers
        .get_all("x-tag")
        .iter()
        .map(|v| v.to_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["first", "second"]);
}

#[tokio::test]
async fn test_execute_named_and_index() {
    let server = MockServer::start().await;

    Mock::given(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("up"))
        .mount(&server)
        .await;

    let content = with_base(&server, "### Health\nGET {{base}}/health\n");
    let file = HttpFileParser::parse_content(&content).unwrap();
    let executor = executor();

    let response = executor.execute_named(&file, "Health").await.unwrap();
    assert_eq!(response.body, "up");

    let response = executor.execute_index(&file, 1).await.unwrap();
    assert_eq!(response.body, "up");

    let err = executor.execute_named(&file, "Missing").await.unwrap_err();
    assert_eq!(err.to_string(), "Request with name 'Missing' not found");

    let err = executor.execute_index(&file, 3).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Request index 3 out of range (file has 1 requests)"
    );
}
