use rawhttp::config::RoutesConfig;
use rawhttp::http::connection::serve_connection;
use rawhttp::proxy::UpstreamRelay;
use rawhttp::routes::{DemoRouter, INTERNAL_ERROR_PAGE, OK_PAGE};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn router(video_path: impl Into<std::path::PathBuf>) -> DemoRouter {
    DemoRouter::new(video_path, UpstreamRelay::parse("http://127.0.0.1:9", 32).unwrap())
}

async fn get(router: DemoRouter, target: &str) -> Vec<u8> {
    let (mut client, server) = tokio::io::duplex(1024 * 1024);
    let task = tokio::spawn(async move { serve_connection(server, &router, 1024).await });

    client
        .write_all(format!("GET {target} HTTP/1.1\r\nHost: localhost:42069\r\n\r\n").as_bytes())
        .await
        .unwrap();

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    task.await.unwrap().unwrap();
    out
}

fn html_response(status_line: &str, page: &str) -> String {
    format!(
        "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\nContent-Type: text/html\r\n\r\n{page}",
        page.len()
    )
}

#[tokio::test]
async fn test_my_problem_route() {
    let out = get(router("unused.mp4"), "/myproblem").await;

    assert_eq!(
        String::from_utf8(out).unwrap(),
        html_response("HTTP/1.1 500 Internal Server Error", INTERNAL_ERROR_PAGE)
    );
}

#[tokio::test]
async fn test_default_route() {
    let out = get(router("unused.mp4"), "/anything/else").await;

    assert_eq!(
        String::from_utf8(out).unwrap(),
        html_response("HTTP/1.1 200 OK", OK_PAGE)
    );
}

#[tokio::test]
async fn test_video_route_serves_file() {
    let path = std::env::temp_dir().join(format!("rawhttp-video-{}.mp4", std::process::id()));
    let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
    std::fs::write(&path, &data).unwrap();

    let out = get(router(&path), "/video").await;
    std::fs::remove_file(&path).unwrap();

    let head = "HTTP/1.1 200 OK\r\nContent-Length: 5000\r\nConnection: close\r\nContent-Type: video/mp4\r\n\r\n";
    assert!(out.starts_with(head.as_bytes()));
    assert_eq!(&out[head.len()..], &data[..]);
}

#[tokio::test]
async fn test_video_route_missing_file_is_500() {
    let out = get(router("/no/such/video.mp4"), "/video").await;
    let text = String::from_utf8(out).unwrap();

    assert!(text.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(text.contains("Content-Type: text/plain\r\n"));
    assert!(text.contains("failed to read /no/such/video.mp4"));
}

#[test]
fn test_router_from_config() {
    assert!(DemoRouter::from_config(&RoutesConfig::default()).is_ok());

    let cfg = RoutesConfig {
        upstream: "::::".to_string(),
        ..Default::default()
    };
    assert!(DemoRouter::from_config(&cfg).is_err());
}
