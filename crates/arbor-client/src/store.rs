use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, Url};

use arbor_protocol::{endpoints, expand, StorageChange, StorageChangeSet, REST_PREFIX};
use arbor_types::{
    check_version, DoubleDataChunk, NodeDependency, NodeGenericMetadata, NodeId, NodeInfo,
    StringDataChunk, TimeSeriesMetadata,
};

use crate::buffer::{ChangeBuffer, ChangeSink};
use crate::config::StoreConfig;
use crate::download::DataReader;
use crate::error::{StoreError, StoreResult};
use crate::request::RequestBuilder;
use crate::transport::{
    check_ok, read_entity_if_ok, read_optional_entity, GzipTransport, HttpTransport, Transport,
    WireResponse,
};
use crate::upload::DataWriter;

const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";

/// Client connection to one logical store of a remote Arbor endpoint.
///
/// Every operation is issued over the network, except the deferrable
/// time-series mutations, which accumulate in a per-connection change
/// buffer and travel as one batched request. Any mutation that is not
/// itself buffered flushes the buffer before executing, so the remote store
/// observes effects exactly in call order. Reads never flush: a reader
/// sharing a connection with a concurrent writer may observe state that
/// predates the writer's unflushed changes.
pub struct RemoteStore {
    config: StoreConfig,
    base_url: Url,
    client: reqwest::Client,
    transport: Arc<dyn Transport>,
    buffer: ChangeBuffer,
    closed: AtomicBool,
}

impl std::fmt::Debug for RemoteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteStore")
            .field("config", &self.config)
            .field("base_url", &self.base_url)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

struct HttpChangeSink {
    transport: Arc<dyn Transport>,
    base_url: Url,
    store: String,
    token: Option<String>,
}

#[async_trait]
impl ChangeSink for HttpChangeSink {
    async fn send(&self, change_set: StorageChangeSet) -> StoreResult<()> {
        tracing::debug!(store = %self.store, changes = change_set.len(), "sending change set");
        let request = RequestBuilder::new(Method::POST, endpoints::FLUSH)
            .var("store", self.store.clone())
            .gzip()
            .json(&change_set)?
            .build(&self.base_url, self.token.as_deref())?;
        let response = self.transport.execute(request).await?;
        check_ok(&response)
    }
}

fn parse_base_url(raw: &str) -> StoreResult<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn require(value: &str, what: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::InvalidArgument(format!(
            "{what} must not be empty"
        )));
    }
    Ok(())
}

impl RemoteStore {
    /// Connect to the store named in `config`. No request is issued until
    /// the first operation.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        require(&config.store, "store name")?;
        let base_url = parse_base_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let transport: Arc<dyn Transport> =
            Arc::new(GzipTransport::new(HttpTransport::new(client.clone())));
        let sink = Arc::new(HttpChangeSink {
            transport: Arc::clone(&transport),
            base_url: base_url.clone(),
            store: config.store.clone(),
            token: config.token.clone(),
        });
        let buffer = ChangeBuffer::new(
            sink,
            config.max_buffered_changes,
            config.max_buffered_bytes,
        );
        Ok(Self {
            config,
            base_url,
            client,
            transport,
            buffer,
            closed: AtomicBool::new(false),
        })
    }

    /// Logical store names available at a remote endpoint.
    pub async fn store_names(base_url: &str, token: Option<&str>) -> StoreResult<Vec<String>> {
        let base_url = parse_base_url(base_url)?;
        let client = reqwest::Client::builder().build()?;
        let transport = GzipTransport::new(HttpTransport::new(client));
        let request =
            RequestBuilder::new(Method::GET, endpoints::STORES).build(&base_url, token)?;
        let response = transport.execute(request).await?;
        read_entity_if_ok(&response)
    }

    pub fn store_name(&self) -> &str {
        &self.config.store
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn request(&self, method: Method, template: &'static str) -> RequestBuilder {
        RequestBuilder::new(method, template).var("store", self.config.store.clone())
    }

    async fn execute(&self, builder: RequestBuilder) -> StoreResult<WireResponse> {
        let request = builder.build(&self.base_url, self.config.token.as_deref())?;
        self.transport.execute(request).await
    }

    fn data_url(&self, node: &NodeId, name: &str) -> StoreResult<Url> {
        let path = expand(
            endpoints::NODE_DATA,
            &[
                ("store", self.config.store.as_str()),
                ("node", node.as_str()),
                ("name", name),
            ],
        )?;
        Ok(self.base_url.join(&format!("{REST_PREFIX}/{path}"))?)
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> StoreResult<reqwest::RequestBuilder> {
        match &self.config.token {
            Some(token) => {
                let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    StoreError::InvalidArgument("token is not header-safe".into())
                })?;
                Ok(builder.header(AUTHORIZATION, value))
            }
            None => Ok(builder),
        }
    }

    // ---- Node operations ----

    /// Upsert a root node: per (name, pseudo-class) the remote store creates
    /// it at most once and returns the existing node afterwards.
    pub async fn create_root_node(
        &self,
        name: &str,
        pseudo_class: &str,
    ) -> StoreResult<NodeInfo> {
        self.ensure_open()?;
        require(name, "node name")?;
        require(pseudo_class, "pseudo class")?;
        tracing::debug!(store = %self.config.store, name, pseudo_class, "create_root_node");

        let response = self
            .execute(
                self.request(Method::PUT, endpoints::ROOT_NODE)
                    .query("nodeName", name)
                    .query("nodePseudoClass", pseudo_class)
                    .gzip(),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn is_writable(&self, node: &NodeId) -> StoreResult<bool> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "is_writable");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::NODE_WRITABLE)
                    .var("node", node.as_str()),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn get_node_info(&self, node: &NodeId) -> StoreResult<NodeInfo> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "get_node_info");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::NODE)
                    .var("node", node.as_str()),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn set_description(&self, node: &NodeId, description: &str) -> StoreResult<()> {
        self.ensure_open()?;
        // Unbuffered mutation: flush first to keep change order.
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, "set_description");

        let response = self
            .execute(
                self.request(Method::PUT, endpoints::NODE_DESCRIPTION)
                    .var("node", node.as_str())
                    .text(description)
                    .gzip(),
            )
            .await?;
        check_ok(&response)
    }

    pub async fn rename_node(&self, node: &NodeId, name: &str) -> StoreResult<()> {
        self.ensure_open()?;
        require(name, "node name")?;
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, name, "rename_node");

        let response = self
            .execute(
                self.request(Method::PUT, endpoints::NODE_NAME)
                    .var("node", node.as_str())
                    .text(name)
                    .gzip(),
            )
            .await?;
        check_ok(&response)
    }

    pub async fn update_modification_time(&self, node: &NodeId) -> StoreResult<()> {
        self.ensure_open()?;
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, "update_modification_time");

        let response = self
            .execute(
                self.request(Method::PUT, endpoints::NODE_MODIFICATION_TIME)
                    .var("node", node.as_str())
                    .gzip(),
            )
            .await?;
        check_ok(&response)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_node(
        &self,
        parent: &NodeId,
        name: &str,
        pseudo_class: &str,
        description: &str,
        version: u64,
        metadata: &NodeGenericMetadata,
    ) -> StoreResult<NodeInfo> {
        self.ensure_open()?;
        require(name, "node name")?;
        require(pseudo_class, "pseudo class")?;
        self.buffer.flush().await?;
        tracing::debug!(
            store = %self.config.store, %parent, name, pseudo_class, version,
            "create_node"
        );

        let response = self
            .execute(
                self.request(Method::POST, endpoints::NODE_CHILD)
                    .var("node", parent.as_str())
                    .var("name", name)
                    .query("nodePseudoClass", pseudo_class)
                    .query("description", description)
                    .query("version", version)
                    .json(metadata)?
                    .gzip(),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn get_child_nodes(&self, node: &NodeId) -> StoreResult<Vec<NodeInfo>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "get_child_nodes");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::NODE_CHILDREN)
                    .var("node", node.as_str()),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn get_child_node(
        &self,
        node: &NodeId,
        name: &str,
    ) -> StoreResult<Option<NodeInfo>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, name, "get_child_node");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::NODE_CHILD)
                    .var("node", node.as_str())
                    .var("name", name),
            )
            .await?;
        read_optional_entity(&response)
    }

    pub async fn get_parent_node(&self, node: &NodeId) -> StoreResult<Option<NodeInfo>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "get_parent_node");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::NODE_PARENT)
                    .var("node", node.as_str()),
            )
            .await?;
        read_optional_entity(&response)
    }

    /// Re-parent a node. The node keeps its identity; it is never duplicated.
    pub async fn set_parent_node(&self, node: &NodeId, new_parent: &NodeId) -> StoreResult<()> {
        self.ensure_open()?;
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, %new_parent, "set_parent_node");

        let response = self
            .execute(
                self.request(Method::PUT, endpoints::NODE_PARENT)
                    .var("node", node.as_str())
                    .text(new_parent.as_str())
                    .gzip(),
            )
            .await?;
        check_ok(&response)
    }

    /// Delete a node and return the id of its former parent.
    pub async fn delete_node(&self, node: &NodeId) -> StoreResult<NodeId> {
        self.ensure_open()?;
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, "delete_node");

        let response = self
            .execute(
                self.request(Method::DELETE, endpoints::NODE)
                    .var("node", node.as_str()),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    // ---- Attachment operations ----

    pub async fn data_exists(&self, node: &NodeId, name: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, name, "data_exists");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::NODE_DATA_EXISTS)
                    .var("node", node.as_str())
                    .var("name", name),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn get_data_names(&self, node: &NodeId) -> StoreResult<BTreeSet<String>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "get_data_names");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::NODE_DATA_NAMES)
                    .var("node", node.as_str()),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    /// Stream an attachment's content. `None` means the attachment does not
    /// exist, which is distinct from an existing empty one.
    pub async fn read_data(&self, node: &NodeId, name: &str) -> StoreResult<Option<DataReader>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, name, "read_data");

        let url = self.data_url(node, name)?;
        let builder = self
            .authorize(self.client.get(url))?
            .header(ACCEPT, APPLICATION_OCTET_STREAM);
        let response = builder.send().await?;
        match response.status().as_u16() {
            arbor_protocol::status::OK => Ok(Some(DataReader::new(response))),
            arbor_protocol::status::NO_CONTENT => Ok(None),
            arbor_protocol::status::SERVER_FAULT => {
                let message = response.text().await.unwrap_or_default();
                Err(StoreError::ServerFault(message))
            }
            other => Err(StoreError::UnexpectedStatus(other)),
        }
    }

    /// Open a streaming upload for a named attachment. The content becomes
    /// durable only once [`DataWriter::close`] returns `Ok`.
    pub async fn write_data(&self, node: &NodeId, name: &str) -> StoreResult<DataWriter> {
        self.ensure_open()?;
        require(name, "data name")?;
        // An attachment write is ordering-sensitive.
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, name, "write_data");

        let url = self.data_url(node, name)?;
        let builder = self
            .authorize(self.client.put(url))?
            .header(CONTENT_TYPE, APPLICATION_OCTET_STREAM);
        Ok(DataWriter::spawn(builder))
    }

    pub async fn remove_data(&self, node: &NodeId, name: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, name, "remove_data");

        let response = self
            .execute(
                self.request(Method::DELETE, endpoints::NODE_DATA)
                    .var("node", node.as_str())
                    .var("name", name),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    // ---- Dependency operations ----

    pub async fn add_dependency(
        &self,
        node: &NodeId,
        name: &str,
        to: &NodeId,
    ) -> StoreResult<()> {
        self.ensure_open()?;
        require(name, "dependency name")?;
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, name, %to, "add_dependency");

        let response = self
            .execute(
                self.request(Method::PUT, endpoints::DEPENDENCY_EDGE)
                    .var("node", node.as_str())
                    .var("name", name)
                    .var("to", to.as_str())
                    .gzip(),
            )
            .await?;
        check_ok(&response)
    }

    /// Targets of this node's dependencies carrying the given name.
    pub async fn get_named_dependencies(
        &self,
        node: &NodeId,
        name: &str,
    ) -> StoreResult<Vec<NodeInfo>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, name, "get_named_dependencies");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::DEPENDENCIES_NAMED)
                    .var("node", node.as_str())
                    .var("name", name),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    /// All outgoing dependency edges of a node.
    pub async fn get_dependencies(&self, node: &NodeId) -> StoreResult<Vec<NodeDependency>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "get_dependencies");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::DEPENDENCIES)
                    .var("node", node.as_str()),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    /// Nodes holding a dependency that targets this node.
    pub async fn get_backward_dependencies(&self, node: &NodeId) -> StoreResult<Vec<NodeInfo>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "get_backward_dependencies");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::BACKWARD_DEPENDENCIES)
                    .var("node", node.as_str()),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn remove_dependency(
        &self,
        node: &NodeId,
        name: &str,
        to: &NodeId,
    ) -> StoreResult<()> {
        self.ensure_open()?;
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, name, %to, "remove_dependency");

        let response = self
            .execute(
                self.request(Method::DELETE, endpoints::DEPENDENCY_EDGE)
                    .var("node", node.as_str())
                    .var("name", name)
                    .var("to", to.as_str()),
            )
            .await?;
        check_ok(&response)
    }

    // ---- Time series operations ----

    /// Buffered: the metadata creation is deferred until the next flush.
    pub async fn create_time_series(
        &self,
        node: &NodeId,
        metadata: TimeSeriesMetadata,
    ) -> StoreResult<()> {
        self.ensure_open()?;
        require(&metadata.name, "time series name")?;
        tracing::debug!(
            store = %self.config.store, %node, name = %metadata.name,
            "create_time_series [buffered]"
        );

        self.buffer
            .record(StorageChange::TimeSeriesCreation {
                node_id: node.clone(),
                metadata,
            })
            .await
    }

    pub async fn get_time_series_names(&self, node: &NodeId) -> StoreResult<BTreeSet<String>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "get_time_series_names");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::TIME_SERIES_NAMES)
                    .var("node", node.as_str())
                    .accept_gzip(),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn time_series_exists(&self, node: &NodeId, name: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, name, "time_series_exists");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::TIME_SERIES_EXISTS)
                    .var("node", node.as_str())
                    .var("name", name),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    pub async fn get_time_series_metadata(
        &self,
        node: &NodeId,
        names: &BTreeSet<String>,
    ) -> StoreResult<Vec<TimeSeriesMetadata>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, count = names.len(), "get_time_series_metadata");

        let response = self
            .execute(
                self.request(Method::POST, endpoints::TIME_SERIES_METADATA)
                    .var("node", node.as_str())
                    .json(names)?
                    .accept_gzip(),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    /// Versions holding data for any series of the node.
    pub async fn get_time_series_data_versions(
        &self,
        node: &NodeId,
    ) -> StoreResult<BTreeSet<i64>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, "get_time_series_data_versions");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::TIME_SERIES_VERSIONS)
                    .var("node", node.as_str()),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    /// Versions holding data for one named series.
    pub async fn get_time_series_data_versions_named(
        &self,
        node: &NodeId,
        name: &str,
    ) -> StoreResult<BTreeSet<i64>> {
        self.ensure_open()?;
        tracing::debug!(store = %self.config.store, %node, name, "get_time_series_data_versions_named");

        let response = self
            .execute(
                self.request(Method::GET, endpoints::TIME_SERIES_NAMED_VERSIONS)
                    .var("node", node.as_str())
                    .var("name", name),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    /// Buffered: the chunks are deferred until the next flush.
    pub async fn add_double_time_series_data(
        &self,
        node: &NodeId,
        version: i64,
        name: &str,
        chunks: Vec<DoubleDataChunk>,
    ) -> StoreResult<()> {
        self.ensure_open()?;
        check_version(version)?;
        require(name, "time series name")?;
        tracing::debug!(
            store = %self.config.store, %node, version, name, chunks = chunks.len(),
            "add_double_time_series_data [buffered]"
        );

        self.buffer
            .record(StorageChange::DoubleTimeSeriesChunksAddition {
                node_id: node.clone(),
                version,
                time_series_name: name.to_string(),
                chunks,
            })
            .await
    }

    pub async fn get_double_time_series_data(
        &self,
        node: &NodeId,
        names: &BTreeSet<String>,
        version: i64,
    ) -> StoreResult<BTreeMap<String, Vec<DoubleDataChunk>>> {
        self.ensure_open()?;
        check_version(version)?;
        tracing::debug!(
            store = %self.config.store, %node, version, count = names.len(),
            "get_double_time_series_data"
        );

        let response = self
            .execute(
                self.request(Method::POST, endpoints::TIME_SERIES_DOUBLE_DATA)
                    .var("node", node.as_str())
                    .var("version", version.to_string())
                    .json(names)?
                    .accept_gzip(),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    /// Buffered: the chunks are deferred until the next flush.
    pub async fn add_string_time_series_data(
        &self,
        node: &NodeId,
        version: i64,
        name: &str,
        chunks: Vec<StringDataChunk>,
    ) -> StoreResult<()> {
        self.ensure_open()?;
        check_version(version)?;
        require(name, "time series name")?;
        tracing::debug!(
            store = %self.config.store, %node, version, name, chunks = chunks.len(),
            "add_string_time_series_data [buffered]"
        );

        self.buffer
            .record(StorageChange::StringTimeSeriesChunksAddition {
                node_id: node.clone(),
                version,
                time_series_name: name.to_string(),
                chunks,
            })
            .await
    }

    pub async fn get_string_time_series_data(
        &self,
        node: &NodeId,
        names: &BTreeSet<String>,
        version: i64,
    ) -> StoreResult<BTreeMap<String, Vec<StringDataChunk>>> {
        self.ensure_open()?;
        check_version(version)?;
        tracing::debug!(
            store = %self.config.store, %node, version, count = names.len(),
            "get_string_time_series_data"
        );

        let response = self
            .execute(
                self.request(Method::POST, endpoints::TIME_SERIES_STRING_DATA)
                    .var("node", node.as_str())
                    .var("version", version.to_string())
                    .json(names)?
                    .accept_gzip(),
            )
            .await?;
        read_entity_if_ok(&response)
    }

    /// Remove every time series of the node, metadata and data.
    pub async fn clear_time_series(&self, node: &NodeId) -> StoreResult<()> {
        self.ensure_open()?;
        self.buffer.flush().await?;
        tracing::debug!(store = %self.config.store, %node, "clear_time_series");

        let response = self
            .execute(
                self.request(Method::DELETE, endpoints::TIME_SERIES)
                    .var("node", node.as_str()),
            )
            .await?;
        check_ok(&response)
    }

    // ---- Lifecycle ----

    /// Explicit sync point: push every pending buffered change.
    pub async fn flush(&self) -> StoreResult<()> {
        self.ensure_open()?;
        self.buffer.flush().await
    }

    /// Flush pending changes and mark the client unusable.
    pub async fn close(&self) -> StoreResult<()> {
        self.ensure_open()?;
        self.buffer.flush().await?;
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
