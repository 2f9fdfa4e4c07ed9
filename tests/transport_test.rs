use anyhow::Result;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use webfont_dl::app::ports::HttpClientPort;
use webfont_dl::infra::{HttpSettings, ReqwestHttp};
use webfont_dl::TransportError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn redirect(server: &MockServer, from: &str, to: &str) {
    Mock::given(method("GET"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", to))
        .mount(server)
        .await;
}

async fn serve_ok(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn follows_redirect_chain_within_budget() -> Result<()> {
    let server = MockServer::start().await;
    redirect(&server, "/r1", "/r2").await;
    // Absolute location
    redirect(&server, "/r2", &format!("{}/r3", server.uri())).await;
    redirect(&server, "/r3", "/final").await;
    serve_ok(&server, "/final", "[]").await;

    let http = ReqwestHttp::default();
    let resp = http.get(&format!("{}/r1", server.uri())).await?;

    assert_eq!(resp.status, 200);
    assert_eq!(resp.text, "[]");
    assert!(resp.final_url.ends_with("/final"));
    Ok(())
}

#[tokio::test]
async fn redirect_chain_over_budget_fails_with_redirect_status() -> Result<()> {
    let server = MockServer::start().await;
    redirect(&server, "/s1", "/s2").await;
    redirect(&server, "/s2", "/s3").await;
    redirect(&server, "/s3", "/s4").await;
    redirect(&server, "/s4", "/final").await;
    serve_ok(&server, "/final", "[]").await;

    let http = ReqwestHttp::default();
    let err = http.get(&format!("{}/s1", server.uri())).await.unwrap_err();

    assert_eq!(err.status(), Some(302));
    Ok(())
}

#[tokio::test]
async fn redirect_without_location_is_a_status_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/moved"))
        .respond_with(ResponseTemplate::new(301))
        .mount(&server)
        .await;

    let err = ReqwestHttp::default()
        .get(&format!("{}/moved", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(301));
    Ok(())
}

#[tokio::test]
async fn non_200_status_is_reported() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = ReqwestHttp::default()
        .get(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, TransportError::Status { status: 404, .. }));
    Ok(())
}

#[tokio::test]
async fn slow_response_times_out() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let http = ReqwestHttp::new(HttpSettings {
        timeout: Duration::from_millis(200),
        max_redirects: 3,
    });
    let err = http.get(&format!("{}/slow", server.uri())).await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }));
    Ok(())
}

#[tokio::test]
async fn body_that_stalls_mid_stream_times_out() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nabc")
                .await;
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
    });

    let http = ReqwestHttp::new(HttpSettings {
        timeout: Duration::from_millis(300),
        max_redirects: 3,
    });
    let err = http.get(&format!("http://{}/stalled", addr)).await.unwrap_err();
    assert!(matches!(err, TransportError::Timeout { .. }));
    Ok(())
}

#[tokio::test]
async fn connection_failure_names_the_host() -> Result<()> {
    let err = ReqwestHttp::default()
        .get("http://127.0.0.1:1/fonts")
        .await
        .unwrap_err();
    match err {
        TransportError::Connection { host, .. } => assert_eq!(host, "127.0.0.1"),
        other => panic!("expected connection error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn download_streams_body_and_sniffs_font_type() -> Result<()> {
    let server = MockServer::start().await;
    let font = [0x00u8, 0x01, 0x00, 0x00, 0x00, 0x0c, 0x00, 0x80];
    Mock::given(method("GET"))
        .and(path("/font.ttf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(font.to_vec()))
        .mount(&server)
        .await;

    let mut sink: Vec<u8> = Vec::new();
    let resp = ReqwestHttp::default()
        .download(&format!("{}/font.ttf", server.uri()), &mut sink)
        .await?;

    assert_eq!(sink, font);
    assert_eq!(resp.bytes, font);
    assert_eq!(resp.content_type.as_deref(), Some("application/font-sfnt"));
    Ok(())
}

#[tokio::test]
async fn unknown_bytes_leave_content_type_undetected() -> Result<()> {
    let server = MockServer::start().await;
    serve_ok(&server, "/page", "<html>hello</html>").await;

    let resp = ReqwestHttp::default().get(&format!("{}/page", server.uri())).await?;
    assert_eq!(resp.content_type, None);
    assert_eq!(resp.text, "<html>hello</html>");
    Ok(())
}
