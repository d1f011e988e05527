//! HTTP request tool. Lets the agent fetch web pages and call JSON APIs.

use std::collections::BTreeMap;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolResult};
use crate::constants::HTTP_USER_AGENT;
use crate::error::HttpToolError;

/// Tool that performs a single HTTP request and returns status and body.
///
/// Only http and https URLs are accepted. Bodies are capped at
/// `max_response_bytes`; HTML is reduced to readable text by default.
pub struct HttpRequestTool {
    client: reqwest::Client,
    max_response_bytes: usize,
}

impl HttpRequestTool {
    pub fn new(timeout: Duration, max_response_bytes: usize) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(HTTP_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            max_response_bytes,
        })
    }
}

#[derive(Deserialize)]
struct HttpRequestInput {
    url: String,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    headers: BTreeMap<String, String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    convert_to_text: Option<bool>,
}

fn parse_method(method: Option<&str>) -> Result<Method, HttpToolError> {
    let method = method.unwrap_or("GET").trim().to_uppercase();
    match method.as_str() {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "PATCH" => Ok(Method::PATCH),
        "DELETE" => Ok(Method::DELETE),
        "HEAD" => Ok(Method::HEAD),
        _ => Err(HttpToolError::InvalidMethod(method)),
    }
}

fn parse_url(raw: &str) -> Result<Url, HttpToolError> {
    let url = Url::parse(raw.trim()).map_err(|e| HttpToolError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpToolError::UnsupportedScheme(other.to_string())),
    }
}

fn build_headers(headers: &BTreeMap<String, String>) -> Result<HeaderMap, HttpToolError> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HttpToolError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| HttpToolError::InvalidHeader(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Reduces an HTML document to its visible text.
fn html_to_text(html: &str) -> String {
    static SCRIPTS: OnceLock<Regex> = OnceLock::new();
    static TAGS: OnceLock<Regex> = OnceLock::new();
    static BLANKS: OnceLock<Regex> = OnceLock::new();

    let scripts = SCRIPTS.get_or_init(|| {
        Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
            .expect("valid regex")
    });
    let tags = TAGS.get_or_init(|| Regex::new(r"(?s)<[^>]+>").expect("valid regex"));
    let blanks = BLANKS.get_or_init(|| Regex::new(r"\n\s*\n+").expect("valid regex"));

    let text = scripts.replace_all(html, " ");
    let text = tags.replace_all(&text, "\n");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    blanks.replace_all(&lines.join("\n"), "\n").into_owned()
}

/// Appends `chunk` to `buf` without letting `buf` grow past `max` bytes.
///
/// Returns `true` once the cap is hit and the rest of the body should be
/// left unread.
fn push_capped(buf: &mut Vec<u8>, chunk: &[u8], max: usize) -> bool {
    let room = max.saturating_sub(buf.len());
    if chunk.len() > room {
        buf.extend_from_slice(&chunk[..room]);
        true
    } else {
        buf.extend_from_slice(chunk);
        false
    }
}

/// Decodes a capped body. A truncated body loses any UTF-8 sequence the cap
/// split in half and gets a trailing notice.
fn finish_body(mut buf: Vec<u8>, truncated: bool, max: usize) -> String {
    if !truncated {
        return String::from_utf8_lossy(&buf).into_owned();
    }
    if let Err(e) = std::str::from_utf8(&buf) {
        if e.error_len().is_none() {
            buf.truncate(e.valid_up_to());
        }
    }
    format!(
        "{}\n... response truncated at {} bytes",
        String::from_utf8_lossy(&buf),
        max
    )
}

/// Reads at most `max` bytes of the response body, chunk by chunk.
async fn read_capped(mut response: reqwest::Response, max: usize) -> Result<String, HttpToolError> {
    let mut buf = Vec::new();
    let mut truncated = false;
    while let Some(chunk) = response.chunk().await? {
        if push_capped(&mut buf, &chunk, max) {
            truncated = true;
            break;
        }
    }
    Ok(finish_body(buf, truncated, max))
}

#[async_trait::async_trait]
impl Tool for HttpRequestTool {
    fn name(&self) -> &str {
        "http_request"
    }

    fn description(&self) -> &str {
        "Make an HTTP request to a URL and return the status and response body. \
Use only when the Knowledge Base does not have enough information."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http or https URL"
                },
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD"],
                    "description": "HTTP method (default GET)"
                },
                "headers": {
                    "type": "object",
                    "additionalProperties": {"type": "string"},
                    "description": "Extra request headers"
                },
                "body": {
                    "type": "string",
                    "description": "Request body"
                },
                "convert_to_text": {
                    "type": "boolean",
                    "description": "Strip HTML responses down to readable text (default true)"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let input: HttpRequestInput = serde_json::from_value(input)?;
        let method = parse_method(input.method.as_deref())?;
        let url = parse_url(&input.url)?;
        let headers = build_headers(&input.headers)?;

        tracing::debug!(%method, %url, "http_request");
        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = input.body {
            request = request.body(body);
        }
        let response = request.send().await.map_err(HttpToolError::from)?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = read_capped(response, self.max_response_bytes).await?;
        tracing::debug!(status = status.as_u16(), bytes = body.len(), "http_request done");

        let body = if input.convert_to_text.unwrap_or(true) && content_type.contains("text/html") {
            html_to_text(&body)
        } else {
            body
        };

        let content = format!("Status: {}\nContent-Type: {}\n\n{}", status, content_type, body);
        Ok(if status.is_success() {
            ToolResult::success(content)
        } else {
            ToolResult::error(content)
        })
    }
}
