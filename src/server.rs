use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, info, warn};

use crate::{
    fetch_or_empty, landing_page, method_not_allowed_page, not_found_page, search_page,
    CatalogError, Result, SearchBackend, SearchParams,
};

const HTML: &str = "text/html; charset=utf-8";
const PLAIN: &str = "text/plain; charset=utf-8";

/// A fully rendered response, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Page {
    pub(crate) status: u16,
    pub(crate) content_type: &'static str,
    pub(crate) body: String,
    pub(crate) allow: Option<&'static str>,
}

impl Page {
    fn html(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: HTML,
            body,
            allow: None,
        }
    }
}

fn is_read(method: &Method) -> bool {
    matches!(method, Method::Get | Method::Head)
}

pub(crate) fn route(method: &Method, url: &str, backend: &dyn SearchBackend) -> Page {
    let (path, params) = SearchParams::from_url(url);
    let known = matches!(path, "/" | "/search" | "/healthz");
    if known && !is_read(method) {
        return Page {
            allow: Some("GET, HEAD"),
            ..Page::html(405, method_not_allowed_page())
        };
    }
    match path {
        "/" => Page::html(200, landing_page()),
        "/search" => {
            let results = fetch_or_empty(backend, &params.q, params.page);
            Page::html(200, search_page(&params, &results))
        }
        "/healthz" => Page {
            status: 200,
            content_type: PLAIN,
            body: "ok".to_string(),
            allow: None,
        },
        _ => Page::html(404, not_found_page(path)),
    }
}

fn header(name: &str, value: &str) -> Result<Header> {
    Header::from_bytes(name, value)
        .map_err(|_| CatalogError::Server(format!("invalid header {name}")))
}

fn respond(request: Request, page: Page) -> Result<()> {
    let mut response = Response::from_string(page.body).with_status_code(page.status);
    response.add_header(header("Content-Type", page.content_type)?);
    if let Some(allow) = page.allow {
        response.add_header(header("Allow", allow)?);
    }
    request.respond(response)?;
    Ok(())
}

fn serve_request(request: Request, backend: &dyn SearchBackend) {
    let started = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();
    let page = route(&method, &url, backend);
    let status = page.status;
    if let Err(err) = respond(request, page) {
        warn!(%method, %url, %err, "failed to write response");
        return;
    }
    debug!(
        %method,
        %url,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
}

pub(crate) struct CatalogServer {
    server: Arc<Server>,
    addr: SocketAddr,
}

impl CatalogServer {
    pub(crate) fn bind(addr: &str) -> Result<Self> {
        let server = Server::http(addr).map_err(|e| CatalogError::Server(format!("bind {addr}: {e}")))?;
        let addr = server
            .server_addr()
            .to_ip()
            .ok_or_else(|| CatalogError::Server(format!("{addr} is not an IP listener")))?;
        Ok(Self {
            server: Arc::new(server),
            addr,
        })
    }

    pub(crate) fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Serve requests on `workers` threads until the listener is closed.
    pub(crate) fn run(self, backend: Arc<dyn SearchBackend>, workers: usize) -> Result<()> {
        let addr = self.local_addr();
        info!(%addr, workers, "catalog listening on http://{addr}");
        let mut handles = Vec::with_capacity(workers);
        for worker in 0..workers.max(1) {
            let server = Arc::clone(&self.server);
            let backend = Arc::clone(&backend);
            let handle = thread::Builder::new()
                .name(format!("catalog-worker-{worker}"))
                .spawn(move || {
                    for request in server.incoming_requests() {
                        serve_request(request, backend.as_ref());
                    }
                })?;
            handles.push(handle);
        }
        for handle in handles {
            if handle.join().is_err() {
                warn!("catalog worker panicked");
            }
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn shutdown_handle(&self) -> Arc<Server> {
        Arc::clone(&self.server)
    }
}
