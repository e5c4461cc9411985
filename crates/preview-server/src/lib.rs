//! Vid2Vert Preview Server
//!
//! Serves the video currently opened in a [`Session`] so an embedded player
//! can stream it. There is exactly one endpoint:
//!
//! - `GET /lastVideo`: the opened file (with range support), or
//!   `404 No video opened`.

use std::net::SocketAddr;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use vid2vert_common::error::{CropError, CropResult};
use vid2vert_crop_model::session::Session;

/// Path of the preview endpoint.
pub const LAST_VIDEO_PATH: &str = "/lastVideo";

/// Build the preview router over a shared session.
pub fn router(session: Session) -> Router {
    Router::new()
        .route(LAST_VIDEO_PATH, get(last_video))
        .layer(TraceLayer::new_for_http())
        .with_state(session)
}

async fn last_video(State(session): State<Session>, req: Request) -> Response {
    let Some(path) = session.current() else {
        return (StatusCode::NOT_FOUND, "No video opened").into_response();
    };

    tracing::debug!(path = %path.display(), "Serving preview");
    match ServeFile::new(&path).oneshot(req).await {
        Ok(res) => res.into_response(),
        Err(never) => match never {},
    }
}

/// A running preview server.
pub struct PreviewServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<std::io::Result<()>>,
}

impl PreviewServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Bound port; differs from the requested one when that was `0`.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, LAST_VIDEO_PATH)
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) -> CropResult<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task
            .await
            .map_err(|e| CropError::Other(anyhow::Error::new(e)))??;
        tracing::info!(addr = %self.addr, "Preview server stopped");
        Ok(())
    }
}

/// Bind `addr` and serve the session in a background task.
pub async fn serve(session: Session, addr: SocketAddr) -> CropResult<PreviewServer> {
    let listener = TcpListener::bind(addr).await?;
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let app = router(session);
    let task = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    tracing::info!(%addr, "Preview server listening");
    Ok(PreviewServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::header;

    fn get_request(range: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(LAST_VIDEO_PATH);
        if let Some(range) = range {
            builder = builder.header(header::RANGE, range);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_before_open() {
        let res = router(Session::new())
            .oneshot(get_request(None))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"No video opened");
    }

    #[tokio::test]
    async fn test_serves_opened_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"0123456789").unwrap();

        let session = Session::new();
        session.open(&path).unwrap();

        let res = router(session).oneshot(get_request(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "video/mp4"
        );
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"0123456789");
    }

    #[tokio::test]
    async fn test_range_request() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.webm");
        std::fs::write(&path, b"0123456789").unwrap();

        let session = Session::new();
        session.open(&path).unwrap();

        let res = router(session)
            .oneshot(get_request(Some("bytes=2-5")))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::PARTIAL_CONTENT);
        let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"2345");
    }

    #[tokio::test]
    async fn test_reset_hides_video() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mov");
        std::fs::write(&path, b"x").unwrap();

        let session = Session::new();
        session.open(&path).unwrap();
        let app = router(session.clone());
        session.reset();

        let res = app.oneshot(get_request(None)).await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
