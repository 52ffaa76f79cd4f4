use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE,
};
use reqwest::{Method, Url};
use serde::Serialize;

use arbor_protocol::{expand, GZIP_ENCODING, REST_PREFIX};

use crate::error::{StoreError, StoreResult};
use crate::transport::WireRequest;

const APPLICATION_JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain";

enum Body {
    Empty,
    Json(Vec<u8>),
    Text(String),
}

/// Builds one [`WireRequest`] from a method, an endpoint template, path
/// variables, query parameters and a typed body.
///
/// Every façade operation goes through this builder, so header and URI
/// assembly live in exactly one place.
pub struct RequestBuilder {
    method: Method,
    template: &'static str,
    vars: Vec<(&'static str, String)>,
    query: Vec<(&'static str, String)>,
    gzip: bool,
    accept_gzip: bool,
    body: Body,
}

impl RequestBuilder {
    pub fn new(method: Method, template: &'static str) -> Self {
        Self {
            method,
            template,
            vars: Vec::new(),
            query: Vec::new(),
            gzip: false,
            accept_gzip: false,
            body: Body::Empty,
        }
    }

    /// Bind a `{name}` template variable.
    pub fn var(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.vars.push((key, value.into()));
        self
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    /// Declare the request body as gzip-encoded. The compression transport
    /// performs the encoding (and retracts the header for empty bodies).
    pub fn gzip(mut self) -> Self {
        self.gzip = true;
        self
    }

    /// Ask the remote side to gzip its response body.
    pub fn accept_gzip(mut self) -> Self {
        self.accept_gzip = true;
        self
    }

    pub fn json<T: Serialize>(mut self, entity: &T) -> StoreResult<Self> {
        self.body = Body::Json(serde_json::to_vec(entity)?);
        Ok(self)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.body = Body::Text(text.into());
        self
    }

    pub fn build(self, base_url: &Url, token: Option<&str>) -> StoreResult<WireRequest> {
        let path = expand(self.template, &to_refs(&self.vars))?;
        let mut url = base_url.join(&format!("{REST_PREFIX}/{path}"))?;
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| StoreError::InvalidArgument("token is not header-safe".into()))?,
            );
        }
        let content_type = match &self.body {
            Body::Text(_) => TEXT_PLAIN,
            Body::Empty | Body::Json(_) => APPLICATION_JSON,
        };
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers.insert(ACCEPT, HeaderValue::from_static(content_type));
        if self.gzip {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static(GZIP_ENCODING));
        }
        if self.accept_gzip {
            headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(GZIP_ENCODING));
        }

        let body = match self.body {
            Body::Empty => Vec::new(),
            Body::Json(bytes) => bytes,
            Body::Text(text) => text.into_bytes(),
        };

        Ok(WireRequest {
            method: self.method,
            url,
            headers,
            body,
        })
    }
}

fn to_refs<'a>(vars: &'a [(&'static str, String)]) -> Vec<(&'a str, &'a str)> {
    vars.iter().map(|(k, v)| (*k, v.as_str())).collect()
}
