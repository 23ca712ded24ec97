use crate::dispatcher::HandlerResponse;
use may_minihttp::Response;
use serde_json::Value;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "OK",
    }
}

/// Write a handler's response onto the wire.
///
/// Headers from the handler are applied first; if none of them set a
/// content type, string bodies go out as `text/plain` and everything else
/// as `application/json`.
pub fn write_handler_response(res: &mut Response, hr: HandlerResponse) {
    res.status_code(hr.status as usize, status_reason(hr.status));

    let mut has_content_type = false;
    for (name, value) in &hr.headers {
        if name.eq_ignore_ascii_case("content-type") {
            has_content_type = true;
        }
        // may_minihttp wants 'static header lines; leak the formatted line
        let line = format!("{name}: {value}").into_boxed_str();
        res.header(Box::leak(line));
    }

    match hr.body {
        Value::String(s) => {
            if !has_content_type {
                res.header("Content-Type: text/plain");
            }
            res.body_vec(s.into_bytes());
        }
        other => {
            if !has_content_type {
                res.header("Content-Type: application/json");
            }
            res.body_vec(serde_json::to_vec(&other).unwrap_or_default());
        }
    }
}

/// Write a JSON error body with the given status.
pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
