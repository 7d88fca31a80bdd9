//! Request builders for the interview backend's three endpoints. The
//! backend authenticates with the stored token sent verbatim in the
//! `Authorization` header (no `Bearer` prefix); the first-question endpoint
//! may be called without credentials depending on deployment policy.

use viva_core::{Domain, MediaBlob, SessionId};

use crate::request::{Body, HttpRequest};

/// Multipart field carrying the recorded answer.
pub const ANSWER_FIELD: &str = "audio_file";
/// Filename the backend expects for the answer part.
pub const ANSWER_FILENAME: &str = "recording.wav";

/// `POST /test/join_test`: enroll in the interview, resolving the domain
/// questions are drawn from.
pub fn build_join_request(base_url: &str, session: &SessionId, token: &str) -> HttpRequest {
    let boundary = new_boundary();
    let mut bytes = Vec::new();
    append_field(&mut bytes, &boundary, "test_id", session.as_str());
    close_multipart(&mut bytes, &boundary);

    HttpRequest {
        method: "POST".into(),
        url: join_url(base_url, "/test/join_test"),
        headers: vec![
            content_type_header(&boundary),
            ("Authorization".into(), token.to_string()),
        ],
        body: Body::MultipartFormData { boundary, bytes },
    }
}

/// `POST /FirstQuestion`: fetch question zero for a domain. `token` is
/// `None` under the open policy.
pub fn build_first_question_request(
    base_url: &str,
    domain: &Domain,
    token: Option<&str>,
) -> HttpRequest {
    let boundary = new_boundary();
    let mut bytes = Vec::new();
    append_field(&mut bytes, &boundary, "domain", domain.as_str());
    close_multipart(&mut bytes, &boundary);

    let mut headers = vec![content_type_header(&boundary)];
    if let Some(token) = token {
        headers.push(("Authorization".into(), token.to_string()));
    }

    HttpRequest {
        method: "POST".into(),
        url: join_url(base_url, "/FirstQuestion"),
        headers,
        body: Body::MultipartFormData { boundary, bytes },
    }
}

/// `POST /test/getQuestion`: submit the recorded answer for the current
/// question and receive the next one (or the exhaustion sentinel).
pub fn build_next_question_request(
    base_url: &str,
    session: &SessionId,
    previous_question: &str,
    answer: &MediaBlob,
    token: &str,
) -> HttpRequest {
    let boundary = new_boundary();
    let mut bytes = Vec::new();
    append_file(
        &mut bytes,
        &boundary,
        ANSWER_FIELD,
        ANSWER_FILENAME,
        &answer.mime,
        &answer.bytes,
    );
    append_field(&mut bytes, &boundary, "previous_question", previous_question);
    append_field(&mut bytes, &boundary, "test_id", session.as_str());
    close_multipart(&mut bytes, &boundary);

    HttpRequest {
        method: "POST".into(),
        url: join_url(base_url, "/test/getQuestion"),
        headers: vec![
            content_type_header(&boundary),
            ("Authorization".into(), token.to_string()),
        ],
        body: Body::MultipartFormData { boundary, bytes },
    }
}

fn new_boundary() -> String {
    format!("Boundary-{}", uuid::Uuid::new_v4())
}

fn content_type_header(boundary: &str) -> (String, String) {
    (
        "Content-Type".into(),
        format!("multipart/form-data; boundary={}", boundary),
    )
}

fn append_field(body: &mut Vec<u8>, boundary: &str, name: &str, value: &str) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
    );
    body.extend_from_slice(value.as_bytes());
    body.extend_from_slice(b"\r\n");
}

fn append_file(
    body: &mut Vec<u8>,
    boundary: &str,
    name: &str,
    filename: &str,
    mime_type: &str,
    bytes: &[u8],
) {
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            name, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(b"\r\n");
}

fn close_multipart(body: &mut Vec<u8>, boundary: &str) {
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}
