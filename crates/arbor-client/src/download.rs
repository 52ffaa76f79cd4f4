use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::StoreResult;

/// Streaming reader over one attachment's content.
///
/// Chunks arrive in order; the attachment may be arbitrarily large, so
/// callers that care about memory should consume chunk by chunk instead of
/// calling [`read_to_end`](Self::read_to_end).
pub struct DataReader {
    stream: BoxStream<'static, reqwest::Result<Bytes>>,
}

impl DataReader {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        Self {
            stream: response.bytes_stream().boxed(),
        }
    }

    /// Next chunk of content, `None` once the body is exhausted.
    pub async fn next_chunk(&mut self) -> StoreResult<Option<Bytes>> {
        match self.stream.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk)),
            Some(Err(e)) => Err(e.into()),
            None => Ok(None),
        }
    }

    /// Drain the remaining content into one buffer.
    pub async fn read_to_end(mut self) -> StoreResult<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(chunk) = self.next_chunk().await? {
            out.extend_from_slice(&chunk);
        }
        Ok(out)
    }
}
