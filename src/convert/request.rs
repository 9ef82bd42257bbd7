//! Inbound conversion request parsing and outbound call construction.
//!
//! # Data Flow
//! ```text
//! JSON body (flat: mode, document_*, options)
//!     → ConversionRequest::from_json (validate mode + document source)
//!     → ExternalCall::build (access_key, options, document parameter)
//!     → GET with query | POST with form body
//! ```

use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

use crate::convert::error::{RelayError, RelayResult};
use crate::convert::options::{normalize_options, ConversionOptions};

/// Where the source document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Provider fetches a remote URL.
    Url,
    /// Caller supplies inline HTML markup.
    Html,
}

impl Mode {
    /// Parse a mode value; only the exact strings "url" and "html" are accepted.
    pub fn parse(value: Option<&str>) -> RelayResult<Self> {
        match value {
            Some("url") => Ok(Mode::Url),
            Some("html") => Ok(Mode::Html),
            _ => Err(RelayError::InvalidMode),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Url => "url",
            Mode::Html => "html",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source document, tagged by mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Url(String),
    Html(String),
}

impl DocumentSource {
    pub fn mode(&self) -> Mode {
        match self {
            DocumentSource::Url(_) => Mode::Url,
            DocumentSource::Html(_) => Mode::Html,
        }
    }

    /// Provider parameter name and value for this source.
    fn param(&self) -> (&'static str, &str) {
        match self {
            DocumentSource::Url(url) => ("document_url", url),
            DocumentSource::Html(html) => ("document_html", html),
        }
    }
}

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub source: DocumentSource,
    pub options: ConversionOptions,
}

impl ConversionRequest {
    /// Parse a flat JSON body.
    ///
    /// An empty body or a non-object value is treated as `{}`, which then
    /// fails mode validation.
    pub fn from_json(body: &[u8]) -> RelayResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::from_fields(&Map::new());
        }
        let value: Value = serde_json::from_slice(body).map_err(|_| RelayError::InvalidBody)?;
        match value {
            Value::Object(fields) => Self::from_fields(&fields),
            _ => Self::from_fields(&Map::new()),
        }
    }

    /// Validate fields: mode first, then the matching document source.
    pub fn from_fields(fields: &Map<String, Value>) -> RelayResult<Self> {
        let mode = Mode::parse(fields.get("mode").and_then(Value::as_str))?;

        let source = match mode {
            Mode::Url => DocumentSource::Url(
                field_text(fields, "document_url").ok_or(RelayError::MissingDocumentUrl)?,
            ),
            Mode::Html => DocumentSource::Html(
                field_text(fields, "document_html").ok_or(RelayError::MissingDocumentHtml)?,
            ),
        };

        let options = normalize_options(
            fields
                .iter()
                .filter_map(|(key, value)| scalar_text(value).map(|text| (key, text))),
        );

        Ok(Self { source, options })
    }

    pub fn mode(&self) -> Mode {
        self.source.mode()
    }
}

/// Non-empty text of a field, if present.
fn field_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .and_then(scalar_text)
        .filter(|text| !text.is_empty())
}

/// Textual form of a scalar JSON value. Null and containers have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// The single outbound call derived from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalCall {
    /// GET with every parameter in the query string.
    Get { url: Url },
    /// POST with a form-encoded body.
    PostForm { url: Url, body: String },
}

impl ExternalCall {
    /// Build the provider call for `request`.
    ///
    /// Parameters are ordered `access_key`, options, then the document.
    pub fn build(endpoint: &Url, access_key: &str, request: &ConversionRequest) -> Self {
        let (doc_key, doc_value) = request.source.param();
        match request.source {
            DocumentSource::Url(_) => {
                let mut url = endpoint.clone();
                {
                    let mut query = url.query_pairs_mut();
                    query.append_pair("access_key", access_key);
                    for (key, value) in request.options.iter() {
                        query.append_pair(key, value);
                    }
                    query.append_pair(doc_key, doc_value);
                }
                ExternalCall::Get { url }
            }
            DocumentSource::Html(_) => {
                let mut form = form_urlencoded::Serializer::new(String::new());
                form.append_pair("access_key", access_key);
                for (key, value) in request.options.iter() {
                    form.append_pair(key, value);
                }
                form.append_pair(doc_key, doc_value);
                ExternalCall::PostForm {
                    url: endpoint.clone(),
                    body: form.finish(),
                }
            }
        }
    }

    pub fn url(&self) -> &Url {
        match self {
            ExternalCall::Get { url } | ExternalCall::PostForm { url, .. } => url,
        }
    }

    /// Decoded outbound parameters, query or body alike.
    pub fn params(&self) -> Vec<(String, String)> {
        match self {
            ExternalCall::Get { url } => url.query_pairs().into_owned().collect(),
            ExternalCall::PostForm { body, .. } => form_urlencoded::parse(body.as_bytes())
                .into_owned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Url {
        Url::parse("https://api.pdflayer.com/api/convert").unwrap()
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse(Some("url")).unwrap(), Mode::Url);
        assert_eq!(Mode::parse(Some("html")).unwrap(), Mode::Html);
        assert!(matches!(Mode::parse(Some("URL")), Err(RelayError::InvalidMode)));
        assert!(matches!(Mode::parse(Some("")), Err(RelayError::InvalidMode)));
        assert!(matches!(Mode::parse(None), Err(RelayError::InvalidMode)));
    }

    #[test]
    fn test_missing_mode_rejected() {
        let err = ConversionRequest::from_json(br#"{"document_url":"https://a.b"}"#).unwrap_err();
        assert!(matches!(err, RelayError::InvalidMode));

        let err = ConversionRequest::from_json(br#"{"mode":1}"#).unwrap_err();
        assert!(matches!(err, RelayError::InvalidMode));
    }

    #[test]
    fn test_empty_and_non_object_bodies() {
        assert!(matches!(ConversionRequest::from_json(b""), Err(RelayError::InvalidMode)));
        assert!(matches!(ConversionRequest::from_json(b"  \n"), Err(RelayError::InvalidMode)));
        assert!(matches!(ConversionRequest::from_json(b"[1,2]"), Err(RelayError::InvalidMode)));
        assert!(matches!(ConversionRequest::from_json(b"{not json"), Err(RelayError::InvalidBody)));
    }

    #[test]
    fn test_document_source_required() {
        let err = ConversionRequest::from_json(br#"{"mode":"url","document_url":""}"#).unwrap_err();
        assert!(matches!(err, RelayError::MissingDocumentUrl));

        // The html field does not satisfy url mode.
        let err =
            ConversionRequest::from_json(br#"{"mode":"url","document_html":"<p>"}"#).unwrap_err();
        assert!(matches!(err, RelayError::MissingDocumentUrl));

        let err =
            ConversionRequest::from_json(br#"{"mode":"html","document_html":null}"#).unwrap_err();
        assert!(matches!(err, RelayError::MissingDocumentHtml));
    }

    #[test]
    fn test_options_coerced_and_filtered() {
        let request = ConversionRequest::from_json(
            br#"{"mode":"url","document_url":"https://example.com","dpi":300,
                "inline":true,"page_size":"","margin_top":null,"header_text":["a"],
                "unknown":"x"}"#,
        )
        .unwrap();
        assert_eq!(request.mode(), Mode::Url);
        assert_eq!(request.options.get("dpi"), Some("300"));
        assert_eq!(request.options.get("inline"), Some("true"));
        assert_eq!(request.options.len(), 2);
    }

    #[test]
    fn test_url_mode_builds_get_query() {
        let request = ConversionRequest::from_json(
            br#"{"mode":"url","document_url":"https://example.com/a?b=c",
                "page_size":"A4","secret":"x"}"#,
        )
        .unwrap();
        let call = ExternalCall::build(&endpoint(), "key123", &request);
        let url = match &call {
            ExternalCall::Get { url } => url,
            other => panic!("expected GET, got {:?}", other),
        };
        assert_eq!(url.path(), "/api/convert");
        assert_eq!(
            call.params(),
            vec![
                ("access_key".to_string(), "key123".to_string()),
                ("page_size".to_string(), "A4".to_string()),
                ("document_url".to_string(), "https://example.com/a?b=c".to_string()),
            ]
        );
    }

    #[test]
    fn test_html_mode_builds_form_body() {
        let request = ConversionRequest::from_json(
            br#"{"mode":"html","document_html":"<h1>Hi & bye</h1>","orientation":"landscape"}"#,
        )
        .unwrap();
        let call = ExternalCall::build(&endpoint(), "key123", &request);
        match &call {
            ExternalCall::PostForm { url, body } => {
                assert_eq!(url, &endpoint());
                assert_eq!(
                    body,
                    concat!(
                        "access_key=key123&orientation=landscape",
                        "&document_html=%3Ch1%3EHi+%26+bye%3C%2Fh1%3E"
                    )
                );
            }
            other => panic!("expected POST, got {:?}", other),
        }
    }

    #[test]
    fn test_access_key_cannot_be_overridden() {
        let request = ConversionRequest::from_json(
            br#"{"mode":"url","document_url":"https://example.com","access_key":"attacker"}"#,
        )
        .unwrap();
        let call = ExternalCall::build(&endpoint(), "real", &request);
        let keys: Vec<_> = call
            .params()
            .into_iter()
            .filter(|(k, _)| k == "access_key")
            .collect();
        assert_eq!(keys, vec![("access_key".to_string(), "real".to_string())]);
    }
}
