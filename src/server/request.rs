use crate::dispatcher::{HeaderVec, ParamVec};
use may_minihttp::Request;
use std::io::Read;
use std::sync::Arc;
use tracing::debug;

/// Parsed HTTP request data used by `RouterService`.
#[derive(Debug)]
pub struct ParsedRequest {
    /// HTTP method token (GET, POST, etc.)
    pub method: String,
    /// Raw request target, query string included
    pub target: String,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Parsed query string parameters
    pub query_params: ParamVec,
    /// Parsed JSON body (if present and valid JSON)
    pub body: Option<serde_json::Value>,
}

/// Parse cookies out of an already-lowercased header list.
pub fn parse_cookies(headers: &HeaderVec) -> HeaderVec {
    headers
        .iter()
        .find(|(k, _)| k.as_ref() == "cookie")
        .map(|(_, raw)| {
            raw.split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim();
                    let value = parts.next().unwrap_or("").trim();
                    Some((Arc::from(name), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse query string parameters from a request target.
///
/// Everything after the first `?` is form-urldecoded; duplicate names are
/// kept in order so last-write-wins lookup applies downstream.
pub fn parse_query_params(target: &str) -> ParamVec {
    match target.find('?') {
        Some(pos) => {
            let query = target[pos + 1..].split('#').next().unwrap_or("");
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (Arc::from(k.as_ref()), v.to_string()))
                .collect()
        }
        None => ParamVec::new(),
    }
}

/// Extract method, target, headers, cookies, query parameters, and JSON
/// body from a raw `may_minihttp` request.
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let target = req.path().to_string();

    let headers: HeaderVec = req
        .headers()
        .iter()
        .map(|h| {
            (
                Arc::from(h.name.to_ascii_lowercase().as_str()),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();

    let cookies = parse_cookies(&headers);
    let query_params = parse_query_params(&target);

    let body = {
        let mut body_str = String::new();
        match req.body().read_to_string(&mut body_str) {
            Ok(size) if size > 0 => serde_json::from_str(&body_str).ok(),
            _ => None,
        }
    };

    debug!(
        method = %method,
        target = %target,
        header_count = headers.len(),
        cookie_count = cookies.len(),
        query_count = query_params.len(),
        has_body = body.is_some(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        target,
        headers,
        cookies,
        query_params,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cookies() {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("cookie"), "a=b; c=d".to_string()));
        let cookies = parse_cookies(&headers);
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].1, "b");
        assert_eq!(cookies[1].1, "d");
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/p?x=1&y=2");
        assert_eq!(q.len(), 2);
        assert_eq!(q[0], (Arc::from("x"), "1".to_string()));
        assert_eq!(q[1], (Arc::from("y"), "2".to_string()));
    }

    #[test]
    fn test_parse_query_params_without_query() {
        assert!(parse_query_params("/p").is_empty());
    }

    #[test]
    fn test_parse_query_params_excludes_fragment() {
        let q = parse_query_params("/p?x=1#frag");
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].1, "1");
    }
}
