use axum::http::HeaderValue;
use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Areas whose requests move credits or identity and get start/finish log lines.
fn audited_area(path: &str) -> Option<&'static str> {
    if path.starts_with("/auth/") {
        Some("auth")
    } else if path.starts_with("/credits/") {
        Some("credits")
    } else if path == "/generate" {
        Some("generation")
    } else {
        None
    }
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|header| header.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), ToString::to_string);

    let request_path = request.uri().path().to_string();
    let request_method = request.method().to_string();
    let area = audited_area(&request_path);

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    if let Some(area) = area {
        tracing::info!(
            request_id = %request_id,
            area,
            method = %request_method,
            path = %request_path,
            "Processing request"
        );
    }

    let mut response = next.run(request).await;

    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER, header_value);
    }

    if let Some(area) = area {
        tracing::info!(
            request_id = %request_id,
            area,
            status = %response.status(),
            method = %request_method,
            path = %request_path,
            "Request completed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_and_identity_routes_are_audited() {
        assert_eq!(audited_area("/auth/google/callback"), Some("auth"));
        assert_eq!(audited_area("/credits/deduct"), Some("credits"));
        assert_eq!(audited_area("/generate"), Some("generation"));
        assert_eq!(audited_area("/generate/model"), None);
        assert_eq!(audited_area("/gallery/templates"), None);
    }
}
