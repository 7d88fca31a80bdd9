use async_trait::async_trait;

use viva_core::config::FirstQuestionAuth;
use viva_core::types::{Domain, MediaBlob, SessionId};
use viva_engine::traits::{ExchangeError, ExchangeOutcome, QuestionExchange};
use viva_providers::request::HttpRequest;
use viva_providers::{interview, parse, runtime};

/// `QuestionExchange` over the interview backend's HTTP surface.
pub struct HttpQuestionExchange {
    base_url: String,
    token: Option<String>,
    first_question_auth: FirstQuestionAuth,
}

impl std::fmt::Debug for HttpQuestionExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpQuestionExchange")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("first_question_auth", &self.first_question_auth)
            .finish()
    }
}

impl HttpQuestionExchange {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        first_question_auth: FirstQuestionAuth,
    ) -> anyhow::Result<Self> {
        let base_url = base_url.into();
        parse::validate_base_url(&base_url)?;
        Ok(Self {
            base_url,
            token,
            first_question_auth,
        })
    }

    fn token(&self) -> Result<&str, ExchangeError> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ExchangeError::Unauthorized("no interview token configured".into()))
    }
}

async fn send(req: &HttpRequest) -> Result<Vec<u8>, ExchangeError> {
    let resp = runtime::execute(req)
        .await
        .map_err(|e| ExchangeError::Transport(format!("{e:#}")))?;

    match resp.status {
        200..=299 => Ok(resp.body),
        401 | 403 => Err(ExchangeError::Unauthorized(format!(
            "status {}: {}",
            resp.status,
            String::from_utf8_lossy(&resp.body)
        ))),
        status => {
            log::debug!(
                "interview backend returned {status}: {}",
                String::from_utf8_lossy(&resp.body)
            );
            Err(ExchangeError::Status(status))
        }
    }
}

fn malformed(e: anyhow::Error) -> ExchangeError {
    ExchangeError::Malformed(format!("{e:#}"))
}

#[async_trait]
impl QuestionExchange for HttpQuestionExchange {
    async fn join(&self, session: &SessionId) -> Result<Domain, ExchangeError> {
        let req = interview::build_join_request(&self.base_url, session, self.token()?);
        let body = send(&req).await?;
        parse::parse_join_response(&body).map_err(malformed)
    }

    async fn first_question(&self, domain: &Domain) -> Result<String, ExchangeError> {
        let token = match self.first_question_auth {
            FirstQuestionAuth::Open => None,
            FirstQuestionAuth::Bearer => Some(self.token()?),
        };
        let req = interview::build_first_question_request(&self.base_url, domain, token);
        let body = send(&req).await?;
        parse::parse_question_response(&body).map_err(malformed)
    }

    async fn next_question(
        &self,
        session: &SessionId,
        previous_question: &str,
        answer: &MediaBlob,
    ) -> Result<ExchangeOutcome, ExchangeError> {
        let req = interview::build_next_question_request(
            &self.base_url,
            session,
            previous_question,
            answer,
            self.token()?,
        );
        let body = send(&req).await?;
        let question = parse::parse_next_question_response(&body).map_err(malformed)?;
        Ok(match question {
            Some(text) => ExchangeOutcome::Question(text),
            None => ExchangeOutcome::Exhausted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn exchange(server_uri: &str, token: Option<&str>) -> HttpQuestionExchange {
        HttpQuestionExchange::new(server_uri, token.map(String::from), FirstQuestionAuth::Open)
            .unwrap()
    }

    #[tokio::test]
    async fn joins_with_the_verbatim_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test/join_test"))
            .and(header("Authorization", "tok-1"))
            .and(body_string_contains("name=\"test_id\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#"{"domain":"Databases"}"#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ex = exchange(&server.uri(), Some("tok-1"));
        let domain = ex.join(&SessionId::new("t-42")).await.unwrap();
        assert_eq!(domain.as_str(), "Databases");
    }

    #[tokio::test]
    async fn first_question_is_fetched_without_credentials_under_open_policy() {
        let server = MockServer::start().await;
        // A credentialed request would hit this guard instead.
        Mock::given(method("POST"))
            .and(path("/FirstQuestion"))
            .and(header_exists("Authorization"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/FirstQuestion"))
            .and(body_string_contains("name=\"domain\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#""What is sharding?""#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ex = exchange(&server.uri(), Some("tok-1"));
        let question = ex.first_question(&Domain::new("Databases")).await.unwrap();
        assert_eq!(question, "What is sharding?");
    }

    #[tokio::test]
    async fn bearer_policy_attaches_the_token_to_the_first_question() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/FirstQuestion"))
            .and(header("Authorization", "tok-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#""What is sharding?""#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ex = HttpQuestionExchange::new(
            server.uri(),
            Some("tok-1".into()),
            FirstQuestionAuth::Bearer,
        )
        .unwrap();
        ex.first_question(&Domain::new("Databases")).await.unwrap();
    }

    #[tokio::test]
    async fn submits_the_answer_as_a_multipart_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test/getQuestion"))
            .and(header("Authorization", "tok-1"))
            .and(body_string_contains(
                "name=\"audio_file\"; filename=\"recording.wav\"",
            ))
            .and(body_string_contains("name=\"previous_question\""))
            .and(body_string_contains("name=\"test_id\""))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(r#""And how is it rebalanced?""#, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let ex = exchange(&server.uri(), Some("tok-1"));
        let answer = MediaBlob::new("audio/wav", vec![82, 73, 70, 70]);
        let outcome = ex
            .next_question(&SessionId::new("t-42"), "What is sharding?", &answer)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ExchangeOutcome::Question("And how is it rebalanced?".into())
        );
    }

    #[tokio::test]
    async fn null_body_maps_to_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test/getQuestion"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("null", "application/json"))
            .mount(&server)
            .await;

        let ex = exchange(&server.uri(), Some("tok-1"));
        let outcome = ex
            .next_question(&SessionId::new("t-42"), "Q", &MediaBlob::new("audio/wav", vec![1]))
            .await
            .unwrap();
        assert_eq!(outcome, ExchangeOutcome::Exhausted);
    }

    #[tokio::test]
    async fn error_statuses_map_by_kind() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test/join_test"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/test/getQuestion"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let ex = exchange(&server.uri(), Some("tok-1"));
        assert!(matches!(
            ex.join(&SessionId::new("t-42")).await,
            Err(ExchangeError::Unauthorized(_))
        ));
        assert!(matches!(
            ex.next_question(&SessionId::new("t-42"), "Q", &MediaBlob::new("audio/wav", vec![1]))
                .await,
            Err(ExchangeError::Status(502))
        ));
    }

    #[tokio::test]
    async fn a_missing_token_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let ex = exchange(&server.uri(), None);
        assert!(matches!(
            ex.join(&SessionId::new("t-42")).await,
            Err(ExchangeError::Unauthorized(_))
        ));
    }

    #[test]
    fn base_urls_are_validated_up_front() {
        assert!(
            HttpQuestionExchange::new("ftp://example.com", None, FirstQuestionAuth::Open).is_err()
        );
        assert!(HttpQuestionExchange::new("not a url", None, FirstQuestionAuth::Open).is_err());
    }
}
