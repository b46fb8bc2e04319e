use super::*;

#[test]
fn endpoint_url_joins_absolute_endpoint() {
    let url = endpoint_url("http://127.0.0.1:8080", "/chat").unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:8080/chat");
}

#[test]
fn endpoint_url_replaces_base_path_for_absolute_endpoint() {
    let url = endpoint_url("http://chat.example.test/app", "/chat").unwrap();
    assert_eq!(url.as_str(), "http://chat.example.test/chat");
}

#[test]
fn endpoint_url_rejects_garbage_base() {
    let err = endpoint_url("not a url", "/chat").unwrap_err();
    assert!(matches!(err, ClientError::InvalidBaseUrl(_)));
}

#[test]
fn http_transport_uses_configured_endpoint() {
    let config = ClientConfig::default().with_base_url("http://localhost:9999").unwrap();
    let transport = HttpTransport::new(&config).unwrap();
    assert_eq!(transport.endpoint().as_str(), "http://localhost:9999/chat");
}
