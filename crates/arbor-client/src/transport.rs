use std::io::{Read, Write};

use async_trait::async_trait;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::header::{HeaderMap, CONTENT_ENCODING};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;

use arbor_protocol::{status, GZIP_ENCODING};

use crate::error::{StoreError, StoreResult};

/// A fully materialized outbound request, before any encoding is applied.
#[derive(Debug)]
pub struct WireRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// An inbound response after any transport decoding, body fully read.
#[derive(Debug)]
pub struct WireResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// One network exchange. Transports compose: a layer wraps another
/// `Transport` and transforms the bytes/headers passing through without
/// knowing anything about the payload semantics.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: WireRequest) -> StoreResult<WireResponse>;
}

/// Plain HTTP transport over a shared `reqwest` client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: WireRequest) -> StoreResult<WireResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();
        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}

/// Compression layer over any [`Transport`].
///
/// Outbound: a body-bearing request declaring `Content-Encoding: gzip` has
/// its body run through a gzip encoder, finished trailer included. An empty
/// body retracts the header instead of sending a lie; retrieval/delete
/// methods never carry an encoded body, so the header is retracted there
/// too. Inbound: a response declaring gzip is decoded before the caller
/// sees a byte of it.
pub struct GzipTransport<T> {
    inner: T,
}

impl<T> GzipTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

fn declares_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .map(|v| v.as_bytes().eq_ignore_ascii_case(GZIP_ENCODING.as_bytes()))
        .unwrap_or(false)
}

fn bears_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::DELETE && *method != Method::HEAD
}

fn gzip_encode(data: &[u8]) -> StoreResult<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn gzip_decode(data: &[u8]) -> StoreResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

#[async_trait]
impl<T: Transport> Transport for GzipTransport<T> {
    async fn execute(&self, mut request: WireRequest) -> StoreResult<WireResponse> {
        if declares_gzip(&request.headers) {
            if bears_body(&request.method) && !request.body.is_empty() {
                request.body = gzip_encode(&request.body)?;
            } else {
                request.headers.remove(CONTENT_ENCODING);
            }
        }

        let mut response = self.inner.execute(request).await?;
        if declares_gzip(&response.headers) {
            response.body = gzip_decode(&response.body)?;
            response.headers.remove(CONTENT_ENCODING);
        }
        Ok(response)
    }
}

/// Fail unless the response carries the single success status.
///
/// A server fault (500) surfaces the server's message; any other status is
/// reported as unexpected.
pub fn check_ok(response: &WireResponse) -> StoreResult<()> {
    match response.status.as_u16() {
        status::OK => Ok(()),
        status::SERVER_FAULT => Err(StoreError::ServerFault(
            String::from_utf8_lossy(&response.body).into_owned(),
        )),
        other => Err(StoreError::UnexpectedStatus(other)),
    }
}

/// Deserialize the response body after [`check_ok`].
pub fn read_entity_if_ok<T: DeserializeOwned>(response: &WireResponse) -> StoreResult<T> {
    check_ok(response)?;
    let entity = serde_json::from_slice(&response.body)?;
    Ok(entity)
}

/// Like [`read_entity_if_ok`], but maps an empty or no-content response to
/// `None` instead of a decode failure.
pub fn read_optional_entity<T: DeserializeOwned>(
    response: &WireResponse,
) -> StoreResult<Option<T>> {
    if response.status.as_u16() == status::NO_CONTENT {
        return Ok(None);
    }
    check_ok(response)?;
    if response.body.is_empty() || response.body == b"null" {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&response.body)?))
}
