use anyhow::{Context, anyhow};
use serde::Deserialize;
use viva_core::Domain;

#[derive(Debug, Deserialize)]
struct JoinResponse {
    domain: String,
}

pub fn parse_join_response(body: &[u8]) -> anyhow::Result<Domain> {
    let resp: JoinResponse = serde_json::from_slice(body).context("decode join JSON")?;
    Ok(Domain::new(resp.domain))
}

/// The question endpoints answer with a bare JSON string, or JSON `null`
/// once the question sequence is exhausted.
pub fn parse_next_question_response(body: &[u8]) -> anyhow::Result<Option<String>> {
    let question: Option<String> = serde_json::from_slice(body).context("decode question JSON")?;
    Ok(question)
}

pub fn parse_question_response(body: &[u8]) -> anyhow::Result<String> {
    parse_next_question_response(body)?
        .ok_or_else(|| anyhow!("question endpoint returned no question"))
}

/// Fail fast on an unusable backend endpoint instead of erroring on the
/// first exchange.
pub fn validate_base_url(base: &str) -> anyhow::Result<()> {
    let parsed = url::Url::parse(base).context("invalid base url")?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(anyhow!("base url must be http(s), got {other}: {base}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_join_domain() {
        let body = br#"{"domain":"System Design"}"#;
        assert_eq!(
            parse_join_response(body).unwrap(),
            Domain::new("System Design")
        );
    }

    #[test]
    fn parses_question_string() {
        let body = br#""Explain the CAP theorem""#;
        assert_eq!(
            parse_question_response(body).unwrap(),
            "Explain the CAP theorem"
        );
    }

    #[test]
    fn null_signals_exhaustion() {
        assert_eq!(parse_next_question_response(b"null").unwrap(), None);
        assert!(parse_question_response(b"null").is_err());
    }

    #[test]
    fn malformed_bodies_error() {
        assert!(parse_join_response(b"{\"nope\":1}").is_err());
        assert!(parse_next_question_response(b"{not json").is_err());
    }

    #[test]
    fn validates_base_urls() {
        assert!(validate_base_url("https://interviews.example.com").is_ok());
        assert!(validate_base_url("http://localhost:8080").is_ok());
        assert!(validate_base_url("ftp://example.com").is_err());
        assert!(validate_base_url("not a url").is_err());
    }
}
