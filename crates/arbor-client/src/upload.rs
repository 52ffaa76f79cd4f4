use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;

use arbor_protocol::status;

use crate::error::{StoreError, StoreResult};

/// Streaming sink for one attachment upload.
///
/// Bytes passed to [`write`](Self::write) are forwarded to the in-flight
/// request body; nothing is durable until [`close`](Self::close) has
/// returned `Ok`. Dropping the writer without closing aborts the exchange
/// and the content is not guaranteed stored.
pub struct DataWriter {
    sender: Option<mpsc::Sender<StoreResult<Bytes>>>,
    exchange: Option<JoinHandle<StoreResult<()>>>,
}

impl DataWriter {
    /// Start the upload request. The builder must already carry the target
    /// URL and headers; only the streaming body is attached here.
    pub(crate) fn spawn(request: reqwest::RequestBuilder) -> Self {
        let (sender, receiver) = mpsc::channel::<StoreResult<Bytes>>(16);
        let exchange = tokio::spawn(async move {
            let response = request
                .body(reqwest::Body::wrap_stream(ReceiverStream::new(receiver)))
                .send()
                .await?;
            match response.status().as_u16() {
                status::OK => Ok(()),
                status::SERVER_FAULT => {
                    let message = response.text().await.unwrap_or_default();
                    Err(StoreError::ServerFault(message))
                }
                other => Err(StoreError::UnexpectedStatus(other)),
            }
        });
        Self {
            sender: Some(sender),
            exchange: Some(exchange),
        }
    }

    /// Forward a chunk to the request body.
    ///
    /// A transport fault in the in-flight exchange is not reported here; it
    /// surfaces from [`close`](Self::close), the commit point.
    pub async fn write(&mut self, chunk: &[u8]) -> StoreResult<()> {
        let Some(sender) = &self.sender else {
            return Err(StoreError::Closed);
        };
        if chunk.is_empty() {
            return Ok(());
        }
        // A closed channel means the exchange already ended; close() reports it.
        let _ = sender.send(Ok(Bytes::copy_from_slice(chunk))).await;
        Ok(())
    }

    /// Finish the body, await the remote acknowledgement, and report the
    /// outcome. Cancellation of the exchange surfaces as a typed error.
    pub async fn close(mut self) -> StoreResult<()> {
        // Dropping the sender ends the body stream.
        self.sender.take();
        let Some(exchange) = self.exchange.take() else {
            return Err(StoreError::Closed);
        };
        match exchange.await {
            Ok(result) => result,
            Err(join_error) => Err(StoreError::Canceled(join_error.to_string())),
        }
    }
}

impl Drop for DataWriter {
    fn drop(&mut self) {
        if let Some(exchange) = &self.exchange {
            exchange.abort();
        }
    }
}
