use std::net::SocketAddr;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use vid2vert_crop_model::session::Session;
use vid2vert_preview_server::serve;

async fn raw_get(addr: SocketAddr, path: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

#[tokio::test]
async fn binds_ephemeral_port_and_follows_session() {
    let session = Session::new();
    let server = serve(session.clone(), "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    assert_ne!(server.port(), 0);
    assert!(server.url().ends_with("/lastVideo"));

    let response = raw_get(server.addr(), "/lastVideo").await;
    assert!(response.starts_with("HTTP/1.1 404"), "{response}");
    assert!(response.ends_with("No video opened"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    std::fs::write(&path, b"preview bytes").unwrap();
    session.open(&path).unwrap();

    let response = raw_get(server.addr(), "/lastVideo").await;
    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.ends_with("preview bytes"));

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = serve(Session::new(), "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();

    let response = raw_get(server.addr(), "/other").await;
    assert!(response.starts_with("HTTP/1.1 404"), "{response}");

    server.shutdown().await.unwrap();
}
