//! HTTP API endpoint handlers

use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use cloudclip_core::service::inline_mime;
use cloudclip_core::{ClipService, ServiceError, SettingsUpdate, SubmissionForm, Upload};

use super::parse::{
    http_error, http_json_response, http_response, multipart_boundary, parse_multipart,
    percent_decode, percent_encode_component, FormPart, HttpResponse, Request,
};

/// Field-name prefix for uploaded files (`file_<tempId>`)
const FILE_FIELD_PREFIX: &str = "file_";

/// Browser cache lifetime for inline files (content never changes)
const INLINE_CACHE_CONTROL: &str = "private, max-age=31536000";

/// Body of `POST /api/auth`
#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    password: Option<String>,
}

/// Map a service error onto a status code and a client-safe message
pub fn error_response(err: ServiceError) -> HttpResponse {
    match err {
        ServiceError::Unauthorized => http_error(401, "Unauthorized"),
        ServiceError::NotConfigured => {
            error!("Request rejected: AUTH_PASSWORD is not configured");
            http_error(500, "Server configuration error")
        }
        ServiceError::NotFound(what) => http_error(404, &format!("Not found: {}", what)),
        ServiceError::Validation(msg) => http_error(400, &msg),
        ServiceError::Database(e) => {
            error!(error = %e, "Database error");
            http_error(500, "Internal server error")
        }
        ServiceError::StartFailed(e) => {
            error!(error = %e, "Service unavailable");
            http_error(500, "Internal server error")
        }
    }
}

/// Authorization header used by management routes
fn auth_header(request: &Request) -> Option<&str> {
    request.header("authorization")
}

/// POST /api/auth - Check the shared password
/// Body: {"password":"..."}
pub fn handle_login(service: &ClipService, body: &[u8]) -> HttpResponse {
    let login: LoginRequest = match serde_json::from_slice(body) {
        Ok(l) => l,
        Err(e) => {
            warn!(error = %e, "API: login body is not valid JSON");
            return http_error(400, "Expected JSON with a 'password' field");
        }
    };

    match service.verify_password(login.password.as_deref().unwrap_or("")) {
        Ok(()) => http_json_response(200, &json!({ "success": true })),
        Err(ServiceError::Unauthorized) => http_error(401, "Invalid password"),
        Err(e) => error_response(e),
    }
}

/// GET /api/settings - Public display settings
pub async fn handle_get_settings(service: &ClipService) -> HttpResponse {
    let settings = service.get_settings().await;
    http_json_response(200, &settings)
}

/// POST /api/settings - Update the title pair
/// Body: {"appTitle":"...","subTitle":"..."}
pub async fn handle_update_settings(service: &ClipService, request: &Request) -> HttpResponse {
    if let Err(e) = service.authorize(auth_header(request)) {
        return error_response(e);
    }

    let update: SettingsUpdate = match serde_json::from_slice(&request.body) {
        Ok(u) => u,
        Err(e) => {
            warn!(error = %e, "API: settings body is not valid JSON");
            return http_error(400, "Expected JSON with 'appTitle' and 'subTitle' fields");
        }
    };

    match service.update_settings(update).await {
        Ok(settings) => {
            http_json_response(200, &json!({ "success": true, "settings": settings }))
        }
        Err(e) => error_response(e),
    }
}

/// GET /api/items?page=N&limit=M - One page of items, newest first
pub async fn handle_list_items(service: &ClipService, request: &Request) -> HttpResponse {
    if let Err(e) = service.authorize(auth_header(request)) {
        return error_response(e);
    }

    // Unparseable values fall back to the defaults
    let page = request.query_param("page").and_then(|p| p.trim().parse::<u64>().ok());
    let limit = request.query_param("limit").and_then(|l| l.trim().parse::<u32>().ok());

    match service.list_items(page, limit).await {
        Ok(page) => http_json_response(200, &page),
        Err(e) => error_response(e),
    }
}

/// Collect multipart parts into a submission form
///
/// Repeated text fields keep the first value; `file_<tempId>` parts with a
/// filename become uploads.
pub fn submission_from_parts(parts: Vec<FormPart>) -> SubmissionForm {
    let mut form = SubmissionForm::default();

    for part in parts {
        if let Some(temp_id) = part.name.strip_prefix(FILE_FIELD_PREFIX) {
            if let Some(file_name) = part.filename {
                form.uploads.entry(temp_id.to_string()).or_insert(Upload {
                    file_name,
                    content_type: part.content_type,
                    content: part.data,
                });
                continue;
            }
        }

        let slot = match part.name.as_str() {
            "title" => &mut form.title,
            "texts" => &mut form.texts,
            "expiry" => &mut form.expiry,
            "visitLimit" => &mut form.visit_limit,
            "sharePassword" => &mut form.share_password,
            "fileMetadata" => &mut form.file_metadata,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(part.text());
        }
    }

    form
}

/// POST /api/items - Create an item from a multipart form
pub async fn handle_create_item(service: &ClipService, request: &Request) -> HttpResponse {
    if let Err(e) = service.authorize(auth_header(request)) {
        return error_response(e);
    }

    let boundary = match request.header("content-type").and_then(multipart_boundary) {
        Some(b) => b,
        None => return http_error(415, "Expected multipart/form-data"),
    };

    let parts = match parse_multipart(&request.body, &boundary) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "API: malformed multipart body");
            return http_error(400, &format!("Malformed form data: {}", e));
        }
    };

    let form = submission_from_parts(parts);
    match service.submit_item(form).await {
        Ok(item) => http_json_response(200, &json!({ "success": true, "item": item })),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/items/{id} - Remove an item and its files
pub async fn handle_delete_item(
    service: &ClipService,
    request: &Request,
    raw_id: &str,
) -> HttpResponse {
    if let Err(e) = service.authorize(auth_header(request)) {
        return error_response(e);
    }

    let id = percent_decode(raw_id);
    if id.is_empty() {
        return http_error(400, "Item ID is required");
    }

    match service.delete_item(&id).await {
        Ok(()) => http_json_response(200, &json!({ "success": true })),
        Err(e) => error_response(e),
    }
}

/// How a file route hands the bytes to the browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Rendered in place (`/api/files/{id}`)
    Inline,
    /// Saved under its original name (`/api/file/{id}`)
    Attachment,
}

/// GET /api/files/{id} and GET /api/file/{id}
///
/// Accepts the password from the Authorization header or a `token` query
/// parameter, so `<img src>` and download links work.
pub async fn handle_get_file(
    service: &ClipService,
    request: &Request,
    raw_id: &str,
    disposition: Disposition,
) -> HttpResponse {
    if let Err(e) = service.authorize_any([auth_header(request), request.query_param("token")]) {
        return error_response(e);
    }

    let id = percent_decode(raw_id);
    if id.is_empty() {
        return http_error(400, "File ID is required");
    }

    let file = match service.get_file(&id).await {
        Ok(f) => f,
        Err(e) => return error_response(e),
    };

    let encoded_name = percent_encode_component(&file.name);
    let mime = match disposition {
        Disposition::Inline => inline_mime(file.mime),
        Disposition::Attachment => file.mime,
    };
    let response = HttpResponse::bytes(200, mime, file.content)
        .with_header("X-Content-Type-Options", "nosniff");

    match disposition {
        Disposition::Inline => response
            .with_header(
                "Content-Disposition",
                format!("inline; filename*=UTF-8''{}", encoded_name),
            )
            .with_header("Cache-Control", INLINE_CACHE_CONTROL),
        Disposition::Attachment => response.with_header(
            "Content-Disposition",
            format!("attachment; filename*=UTF-8''{}", encoded_name),
        ),
    }
}

/// Route a parsed request to its handler
pub async fn handle_request(service: &ClipService, request: &Request) -> HttpResponse {
    let method = request.method.as_str();
    let path = request.path.as_str();

    info!(method = %method, path = %path, "API request");

    // Handle /api/items/:id path
    if let Some(id) = path.strip_prefix("/api/items/") {
        return match method {
            "DELETE" => handle_delete_item(service, request, id).await,
            _ => http_error(405, "Method Not Allowed"),
        };
    }

    // Handle /api/files/:id (inline) and /api/file/:id (download)
    if let Some(id) = path.strip_prefix("/api/files/") {
        return match method {
            "GET" => handle_get_file(service, request, id, Disposition::Inline).await,
            _ => http_error(405, "Method Not Allowed"),
        };
    }
    if let Some(id) = path.strip_prefix("/api/file/") {
        return match method {
            "GET" => handle_get_file(service, request, id, Disposition::Attachment).await,
            _ => http_error(405, "Method Not Allowed"),
        };
    }

    match (method, path) {
        ("POST", "/api/auth") => handle_login(service, &request.body),
        ("GET", "/api/settings") => handle_get_settings(service).await,
        ("POST", "/api/settings") => handle_update_settings(service, request).await,
        ("GET", "/api/items") => handle_list_items(service, request).await,
        ("POST", "/api/items") => handle_create_item(service, request).await,
        ("GET", "/api/health") => http_response(200, "OK"),
        (_, "/api/auth") | (_, "/api/settings") | (_, "/api/items") => {
            http_error(405, "Method Not Allowed")
        }
        _ => http_error(404, "Not Found"),
    }
}
