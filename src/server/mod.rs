//! Local preview server with automatic rebuild

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use percent_encoding::percent_decode_str;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::Wintery;

/// WebSocket endpoint the reload script connects to
const RELOAD_ENDPOINT: &str = "/__wintery_reload";

/// Script spliced into served HTML pages while watching. Replaces the
/// closing body tag, so it must end with one.
const RELOAD_SCRIPT: &str = r#"
<script>
(() => {
  const sock = new WebSocket('ws://' + location.host + '/__wintery_reload');
  sock.addEventListener('message', (ev) => {
    if (ev.data === 'rebuilt') location.reload();
  });
  sock.addEventListener('close', () => {
    setTimeout(() => location.reload(), 1500);
  });
})();
</script>
</body>
"#;

struct ServeState {
    public_dir: PathBuf,
    rebuilt_tx: broadcast::Sender<()>,
    inject_reload: bool,
}

/// Serve the generated site, rebuilding it when sources change
pub async fn start(app: &Wintery, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    let (rebuilt_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(ServeState {
        public_dir: app.public_dir.clone(),
        rebuilt_tx: rebuilt_tx.clone(),
        inject_reload: watch,
    });

    let router = Router::new()
        .route(RELOAD_ENDPOINT, get(reload_handler))
        .fallback(serve_site)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let host = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    let url = format!("http://{}:{}", ip, port);

    println!("Serving {} at {}", app.public_dir.display(), url);
    if watch {
        println!(
            "Watching {} (open pages reload after each rebuild)",
            app.source_dir.display()
        );
    }
    println!("Ctrl+C to stop");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Could not open a browser: {}", e);
        }
    }

    if watch {
        let app = app.clone();
        tokio::spawn(async move {
            if let Err(e) = rebuild_on_change(app, rebuilt_tx).await {
                tracing::error!("Watcher stopped: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Rebuild the site whenever something under source/ or _config.yml
/// changes, then tell connected pages to reload
async fn rebuild_on_change(app: Wintery, rebuilt_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Editors fire several events per save; collapse them
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    if app.source_dir.exists() {
        debouncer
            .watcher()
            .watch(&app.source_dir, RecursiveMode::Recursive)?;
    }
    let config_path = app.base_dir.join("_config.yml");
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    while let Ok(batch) = rx.recv() {
        let events = match batch {
            Ok(events) => events,
            Err(e) => {
                tracing::error!("Watch error: {:?}", e);
                continue;
            }
        };

        let changed: Vec<&Path> = events
            .iter()
            .map(|e| e.path.as_path())
            .filter(|p| !is_watch_noise(p))
            .collect();
        if changed.is_empty() {
            continue;
        }

        for path in &changed {
            println!("Changed: {}", path.display());
        }
        println!("Rebuilding...");
        match app.generate() {
            Ok(()) => {
                println!("Done");
                let _ = rebuilt_tx.send(());
            }
            Err(e) => println!("Rebuild failed: {}", e),
        }
    }

    Ok(())
}

/// Editor droppings and VCS internals do not warrant a rebuild
fn is_watch_noise(path: &Path) -> bool {
    if path.components().any(|c| c.as_os_str() == ".git") {
        return true;
    }
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name == ".DS_Store" || name.ends_with('~') || name.ends_with(".swp"),
        None => false,
    }
}

async fn reload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServeState>>,
) -> impl IntoResponse {
    let rebuilt_rx = state.rebuilt_tx.subscribe();
    ws.on_upgrade(move |socket| push_reloads(socket, rebuilt_rx))
}

/// Tell one connected page to reload after every successful rebuild
async fn push_reloads(mut socket: WebSocket, mut rebuilt_rx: broadcast::Receiver<()>) {
    loop {
        tokio::select! {
            signal = rebuilt_rx.recv() => match signal {
                Ok(()) => {
                    if socket.send(Message::Text("rebuilt".to_string())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            },
            inbound = socket.recv() => match inbound {
                Some(Ok(Message::Ping(payload))) => {
                    if socket.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                _ => {}
            },
        }
    }
}

/// Serve one request from the public directory. HTML responses get the
/// reload script while watching; paths the site does not contain fall
/// back to the generated 404 page.
async fn serve_site(State(state): State<Arc<ServeState>>, request: Request<Body>) -> Response {
    // Hrefs carry percent-encoded post ids while the directories on
    // disk use the raw form
    let decoded = percent_decode_str(request.uri().path())
        .decode_utf8_lossy()
        .into_owned();
    let target = resolve_request_path(&state.public_dir, &decoded);

    let is_html = target
        .extension()
        .map_or(false, |ext| ext == "html" || ext == "htm");

    if is_html && state.inject_reload {
        return match tokio::fs::read_to_string(&target).await {
            Ok(html) => Html(inject_reload_script(&html)).into_response(),
            Err(_) => not_found_page(&state).await,
        };
    }

    let mut files = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match files.try_call(request).await {
        Ok(found) if found.status() == StatusCode::NOT_FOUND => not_found_page(&state).await,
        Ok(found) => found.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Map a decoded request path to a file under the public directory
fn resolve_request_path(public_dir: &Path, decoded: &str) -> PathBuf {
    let relative = decoded.trim_start_matches('/');
    if relative.is_empty() {
        return public_dir.join("index.html");
    }

    let direct = public_dir.join(relative);
    if direct.is_dir() {
        return direct.join("index.html");
    }
    if direct.exists() {
        return direct;
    }

    // Pretty URLs may leave off the .html extension
    let with_ext = public_dir.join(format!("{}.html", relative));
    if with_ext.exists() {
        with_ext
    } else {
        direct
    }
}

/// The generated 404 page, served with a 404 status
async fn not_found_page(state: &ServeState) -> Response {
    match tokio::fs::read_to_string(state.public_dir.join("404.html")).await {
        Ok(html) => {
            let body = if state.inject_reload {
                inject_reload_script(&html)
            } else {
                html
            };
            (StatusCode::NOT_FOUND, Html(body)).into_response()
        }
        Err(_) => (StatusCode::NOT_FOUND, "Not found").into_response(),
    }
}

/// Splice the reload script in just before the closing body tag
fn inject_reload_script(html: &str) -> String {
    if html.contains("</body>") {
        html.replacen("</body>", RELOAD_SCRIPT, 1)
    } else {
        format!("{}{}", html, RELOAD_SCRIPT)
    }
}

/// Open the system browser at the given URL
fn open_browser(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    std::process::Command::new("open").arg(url).spawn()?;

    #[cfg(target_os = "linux")]
    std::process::Command::new("xdg-open").arg(url).spawn()?;

    #[cfg(target_os = "windows")]
    std::process::Command::new("cmd")
        .args(["/c", "start", url])
        .spawn()?;

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    let _ = url;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_inject_reload_script_replaces_body_close() {
        let html = "<html><body><p>hi</p></body></html>";
        let injected = inject_reload_script(html);
        assert!(injected.contains(RELOAD_ENDPOINT));
        assert_eq!(injected.matches("</body>").count(), 1);
    }

    #[test]
    fn test_inject_reload_script_without_body_tag() {
        let injected = inject_reload_script("bare fragment");
        assert!(injected.starts_with("bare fragment"));
        assert!(injected.contains(RELOAD_ENDPOINT));
    }

    #[test]
    fn test_resolve_request_path() {
        let tmp = tempfile::tempdir().unwrap();
        let public = tmp.path();
        fs::create_dir_all(public.join("blog/hello world")).unwrap();
        fs::write(public.join("blog/hello world/index.html"), "x").unwrap();
        fs::write(public.join("standalone.html"), "x").unwrap();
        fs::write(public.join("style.css"), "x").unwrap();

        // the root resolves to the home page
        assert_eq!(
            resolve_request_path(public, "/"),
            public.join("index.html")
        );
        // directories resolve to their index
        assert_eq!(
            resolve_request_path(public, "/blog/hello world/"),
            public.join("blog/hello world/index.html")
        );
        // exact files pass through
        assert_eq!(
            resolve_request_path(public, "/style.css"),
            public.join("style.css")
        );
        // pretty URLs pick up the .html extension
        assert_eq!(
            resolve_request_path(public, "/standalone"),
            public.join("standalone.html")
        );
        // misses stay as-is for the 404 fallback
        assert_eq!(
            resolve_request_path(public, "/no/such"),
            public.join("no/such")
        );
    }

    #[test]
    fn test_watch_noise() {
        assert!(is_watch_noise(Path::new("site/.git/index")));
        assert!(is_watch_noise(Path::new("source/_posts/.post.md.swp")));
        assert!(is_watch_noise(Path::new("source/draft.md~")));
        assert!(!is_watch_noise(Path::new("source/_posts/post.md")));
    }
}
