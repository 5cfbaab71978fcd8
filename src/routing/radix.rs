//! Radix tree over path segments.
//!
//! - Static segments (`users`) match exactly and are tried first
//! - Parameter segments (`{id}`) match any single segment
//! - Terminal nodes hold one value per HTTP method
//!
//! Search backtracks from a static child into parameter children when the
//! static branch has no endpoint for the remaining path and method.

use http::Method;
use indexmap::IndexMap;
use std::sync::Arc;

use super::core::ParamVec;

pub(crate) fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn param_name(segment: &str) -> Option<&str> {
    segment.strip_prefix('{')?.strip_suffix('}')
}

#[derive(Debug)]
pub(crate) struct RadixNode<T> {
    segment: Arc<str>,
    param: Option<Arc<str>>,
    endpoints: IndexMap<Method, T>,
    children: Vec<RadixNode<T>>,
    param_children: Vec<RadixNode<T>>,
}

impl<T: Clone> Clone for RadixNode<T> {
    fn clone(&self) -> Self {
        Self {
            segment: Arc::clone(&self.segment),
            param: self.param.clone(),
            endpoints: self.endpoints.clone(),
            children: self.children.clone(),
            param_children: self.param_children.clone(),
        }
    }
}

impl<T> RadixNode<T> {
    pub(crate) fn root() -> Self {
        Self::new(Arc::from(""), None)
    }

    fn new(segment: Arc<str>, param: Option<Arc<str>>) -> Self {
        Self {
            segment,
            param,
            endpoints: IndexMap::new(),
            children: Vec::new(),
            param_children: Vec::new(),
        }
    }

    /// Store `value` for `method` at the node for `segments`, replacing any
    /// previous value for that method.
    pub(crate) fn insert(&mut self, segments: &[&str], method: Method, value: T) {
        let Some((segment, remaining)) = segments.split_first() else {
            self.endpoints.insert(method, value);
            return;
        };

        if let Some(name) = param_name(segment) {
            // Different parameter names at one position get separate nodes.
            if let Some(child) = self
                .param_children
                .iter_mut()
                .find(|c| c.param.as_deref() == Some(name))
            {
                child.insert(remaining, method, value);
                return;
            }
            let mut child = RadixNode::new(Arc::from(""), Some(Arc::from(name)));
            child.insert(remaining, method, value);
            self.param_children.push(child);
            return;
        }

        if let Some(child) = self
            .children
            .iter_mut()
            .find(|c| c.segment.as_ref() == *segment)
        {
            child.insert(remaining, method, value);
            return;
        }
        let mut child = RadixNode::new(Arc::from(*segment), None);
        child.insert(remaining, method, value);
        self.children.push(child);
    }

    /// The endpoint for `method` at a terminal node matching `segments`,
    /// with the captured parameters appended to `params`.
    ///
    /// Every terminal node that matches the path but lacks `method` adds its
    /// methods to `allowed`, and the search moves on to the next branch.
    pub(crate) fn search<'a>(
        &'a self,
        segments: &[&str],
        method: &Method,
        params: &mut ParamVec,
        allowed: &mut Vec<Method>,
    ) -> Option<&'a T> {
        let Some((segment, remaining)) = segments.split_first() else {
            if let Some(found) = self.endpoints.get(method) {
                return Some(found);
            }
            for known in self.endpoints.keys() {
                if !allowed.contains(known) {
                    allowed.push(known.clone());
                }
            }
            return None;
        };

        for child in &self.children {
            if child.segment.as_ref() == *segment {
                if let Some(found) = child.search(remaining, method, params, allowed) {
                    return Some(found);
                }
            }
        }

        for child in &self.param_children {
            if let Some(name) = &child.param {
                params.push((Arc::clone(name), (*segment).to_string()));
                if let Some(found) = child.search(remaining, method, params, allowed) {
                    return Some(found);
                }
                params.pop();
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(routes: &[(Method, &str, &'static str)]) -> RadixNode<&'static str> {
        let mut root = RadixNode::root();
        for (method, path, handler) in routes {
            let segments: Vec<&str> = split_path(path).collect();
            root.insert(&segments, method.clone(), *handler);
        }
        root
    }

    fn lookup(
        root: &RadixNode<&'static str>,
        method: &Method,
        path: &str,
    ) -> Option<(&'static str, ParamVec)> {
        let segments: Vec<&str> = split_path(path).collect();
        let mut params = ParamVec::new();
        let mut allowed = Vec::new();
        let handler = root.search(&segments, method, &mut params, &mut allowed)?;
        Some((*handler, params))
    }

    fn param<'p>(params: &'p ParamVec, name: &str) -> Option<&'p str> {
        params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_root_and_static_paths() {
        let root = tree(&[(Method::GET, "/", "index"), (Method::GET, "/health", "health")]);
        assert_eq!(lookup(&root, &Method::GET, "/").unwrap().0, "index");
        assert_eq!(lookup(&root, &Method::GET, "/health").unwrap().0, "health");
        assert!(lookup(&root, &Method::GET, "/missing").is_none());
    }

    #[test]
    fn test_parameters_are_captured() {
        let root = tree(&[(Method::GET, "/users/{user_id}/posts/{post_id}", "get_post")]);
        let (handler, params) = lookup(&root, &Method::GET, "/users/123/posts/456").unwrap();
        assert_eq!(handler, "get_post");
        assert_eq!(param(&params, "user_id"), Some("123"));
        assert_eq!(param(&params, "post_id"), Some("456"));
    }

    #[test]
    fn test_static_segment_preferred_then_backtracks() {
        let root = tree(&[
            (Method::GET, "/users/me", "me"),
            (Method::GET, "/users/{id}", "get_user"),
            (Method::GET, "/users/{id}/posts", "user_posts"),
        ]);
        assert_eq!(lookup(&root, &Method::GET, "/users/me").unwrap().0, "me");
        assert_eq!(lookup(&root, &Method::GET, "/users/7").unwrap().0, "get_user");
        let (handler, params) = lookup(&root, &Method::GET, "/users/me/posts").unwrap();
        assert_eq!(handler, "user_posts");
        assert_eq!(param(&params, "id"), Some("me"));
    }

    #[test]
    fn test_different_param_names_same_position() {
        let root = tree(&[
            (Method::GET, "/users/{user_id}/posts", "posts"),
            (Method::GET, "/users/{id}/comments", "comments"),
        ]);
        let (_, params) = lookup(&root, &Method::GET, "/users/1/posts").unwrap();
        assert_eq!(param(&params, "user_id"), Some("1"));
        assert!(param(&params, "id").is_none());
        let (_, params) = lookup(&root, &Method::GET, "/users/2/comments").unwrap();
        assert_eq!(param(&params, "id"), Some("2"));
        assert!(param(&params, "user_id").is_none());
    }

    #[test]
    fn test_endpoints_keyed_by_method() {
        let root = tree(&[
            (Method::GET, "/items", "list"),
            (Method::POST, "/items", "create"),
            (Method::GET, "/items", "list v2"),
        ]);
        assert_eq!(lookup(&root, &Method::GET, "/items").unwrap().0, "list v2");
        assert_eq!(lookup(&root, &Method::POST, "/items").unwrap().0, "create");
        assert!(lookup(&root, &Method::PUT, "/items").is_none());
    }

    #[test]
    fn test_method_found_on_sibling_param_branch() {
        let root = tree(&[
            (Method::GET, "/doc/{id}", "read"),
            (Method::POST, "/doc/{doc_id}", "write"),
        ]);
        let (handler, params) = lookup(&root, &Method::POST, "/doc/1").unwrap();
        assert_eq!(handler, "write");
        assert_eq!(param(&params, "doc_id"), Some("1"));
        assert!(param(&params, "id").is_none());

        let segments: Vec<&str> = split_path("/doc/1").collect();
        let mut params = ParamVec::new();
        let mut allowed = Vec::new();
        assert!(root
            .search(&segments, &Method::DELETE, &mut params, &mut allowed)
            .is_none());
        assert_eq!(allowed, [Method::GET, Method::POST]);
        assert!(params.is_empty());
    }
}
