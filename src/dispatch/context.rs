//! Per-request dispatch context.
//!
//! Everything a controller or hook can see or change during one dispatch:
//! the request, the resolved target, the response buffer and the event bus.

use uuid::Uuid;

use crate::dispatch::response::Response;
use crate::events::{EventArg, EventBus, EventHost};
use crate::resolve::Resolution;
use crate::routing::Request;

/// State owned by a single dispatch.
#[derive(Debug)]
pub struct DispatchContext {
    id: Uuid,
    request: Request,
    path: String,
    resolution: Option<Resolution>,
    /// Response written by controllers and hooks.
    pub response: Response,
    /// Registrations fired by this dispatch.
    pub events: EventBus<DispatchContext>,
}

impl DispatchContext {
    /// The dispatch id reuses the request's correlation id when it is a
    /// UUID, so front-end and dispatch log lines share one id.
    pub fn new(request: Request) -> Self {
        let path = request.path().to_string();
        let id = request
            .request_id()
            .and_then(|id| Uuid::parse_str(id).ok())
            .unwrap_or_else(Uuid::new_v4);
        Self {
            id,
            request,
            path,
            resolution: None,
            response: Response::new(),
            events: EventBus::new(),
        }
    }

    /// Unique id of this dispatch.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The path after route rewriting.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn set_path(&mut self, path: String) {
        self.path = path;
    }

    /// The target being dispatched, once resolved.
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    pub(crate) fn set_resolution(&mut self, resolution: Resolution) {
        self.resolution = Some(resolution);
    }

    /// Replace the response with a 302 to `location`.
    ///
    /// A location that is not already an `http` URL is taken relative to the
    /// site root of the original request.
    pub fn redirect(&mut self, location: &str) {
        let location = if location.to_ascii_lowercase().starts_with("http") {
            location.to_string()
        } else {
            let path = location.trim_start_matches('/');
            match self.request.origin() {
                Some(origin) => format!("{}/{}", origin, path),
                None => format!("/{}", path),
            }
        };
        self.response = Response::redirect(&location, self.request.is_head());
    }

    /// Payload passed to dispatch events.
    pub fn snapshot(&self) -> EventArg {
        serde_json::json!({
            "id": self.id.to_string(),
            "request_id": self.request.request_id(),
            "method": self.request.method(),
            "url": self.request.url(),
            "path": self.path,
            "resolution": self.resolution,
        })
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }
}

impl EventHost for DispatchContext {
    fn events(&mut self) -> &mut EventBus<Self> {
        &mut self.events
    }
}
