use http::Method;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::sync::Arc;

use crate::ids::RequestId;
use crate::kind::{Kind, OBJECT};
use crate::routing::ParamVec;

/// Kind of every [`Request`].
pub static REQUEST: Kind = Kind::derive("request", &OBJECT);

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage; names are shared, values are per request.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A request as seen by endpoints and middlewares.
#[derive(Debug, Clone)]
pub struct Request {
    pub request_id: RequestId,
    pub method: Method,
    /// Path without the query string.
    pub path: String,
    /// Parameters captured by the router.
    pub params: ParamVec,
    pub query: ParamVec,
    pub headers: HeaderVec,
    pub body: Option<Value>,
    /// Values attached by middlewares, such as the authenticated user.
    pub context: Map<String, Value>,
}

crate::typed!(Request => REQUEST);

impl Request {
    /// Build a request; a query string in `target` is split off and decoded.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (target, ParamVec::new()),
        };
        Self {
            request_id: RequestId::new(),
            method,
            path: path.to_string(),
            params: ParamVec::new(),
            query,
            headers: HeaderVec::new(),
            body: None,
            context: Map::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if name.eq_ignore_ascii_case("x-request-id") {
            self.request_id = RequestId::from_header_or_new(Some(&value));
        }
        self.headers.push((Arc::from(name.to_ascii_lowercase()), value));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a path parameter by name; the last occurrence wins.
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Header lookup, case-insensitive.
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

fn parse_query(query: &str) -> ParamVec {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (Arc::from(k.as_ref()), v.into_owned()))
        .collect()
}
