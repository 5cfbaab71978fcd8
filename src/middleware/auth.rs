use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::app::{Endpoint, Request, Response};
use crate::pipeline::{Config, Middleware};

/// Context key holding the authenticated user.
pub const USER_KEY: &str = "user";

/// Pipeline config key listing extra public path prefixes.
pub const WHITELIST_KEY: &str = "auth_whitelist";

/// Answers 401 unless an earlier middleware put a user in the request
/// context. Paths under a whitelisted prefix pass through.
#[derive(Debug, Clone, Default)]
pub struct AuthMiddleware {
    whitelist: Vec<String>,
}

impl AuthMiddleware {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allow_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.whitelist.push(prefix.into());
        self
    }
}

impl Middleware<Request, Response> for AuthMiddleware {
    fn wrap(&self, inner: Endpoint, config: Option<&Config>) -> Endpoint {
        let mut whitelist = self.whitelist.clone();
        if let Some(Value::Array(extra)) = config.and_then(|c| c.get(WHITELIST_KEY)) {
            whitelist.extend(extra.iter().filter_map(Value::as_str).map(str::to_string));
        }
        Arc::new(move |req: Request| {
            if req.context.contains_key(USER_KEY)
                || whitelist.iter().any(|p| req.path.starts_with(p.as_str()))
            {
                return inner(req);
            }
            debug!(request_id = %req.request_id, path = %req.path, "Unauthenticated request rejected");
            Response::error(401, "Unauthorized")
        })
    }
}

/// Resolves `authorization: Bearer <token>` to a user and stores it in the
/// request context under [`USER_KEY`]. Unknown tokens leave the request
/// anonymous.
#[derive(Debug, Clone, Default)]
pub struct IdentityMiddleware {
    tokens: Arc<HashMap<String, String>>,
}

impl IdentityMiddleware {
    pub fn new(tokens: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            tokens: Arc::new(tokens.into_iter().collect()),
        }
    }
}

impl Middleware<Request, Response> for IdentityMiddleware {
    fn wrap(&self, inner: Endpoint, _config: Option<&Config>) -> Endpoint {
        let tokens = Arc::clone(&self.tokens);
        Arc::new(move |mut req: Request| {
            let user = req
                .get_header("authorization")
                .and_then(|h| h.strip_prefix("Bearer "))
                .and_then(|token| tokens.get(token.trim()))
                .cloned();
            if let Some(user) = user {
                req.context.insert(USER_KEY.to_string(), Value::String(user));
            }
            inner(req)
        })
    }
}
