use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::transport::{Method, Transport};
use crate::{ClientError, Result};
use tiledoc_core::models::{CollectionListing, MetadataDocument};
use tiledoc_core::query::Predicate;
use tiledoc_core::Config;

/// What to do with the target collection when a client is connected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateOptions {
    /// Create the collection as part of connecting
    pub create: bool,
    /// Drop and recreate the collection if it already exists
    pub overwrite: bool,
}

impl CreateOptions {
    /// Use a collection that must already exist
    pub fn open() -> Self {
        Self::default()
    }

    /// Create the collection, failing if it already exists
    pub fn create() -> Self {
        Self {
            create: true,
            overwrite: false,
        }
    }

    /// Create the collection, replacing any existing one
    pub fn overwrite() -> Self {
        Self {
            create: true,
            overwrite: true,
        }
    }
}

/// SODA REST API client bound to a single collection
pub struct Client {
    pub(crate) transport: Transport,
    soda_root: String,
    pub(crate) collection_url: String,
    collection: String,
    pub(crate) page_limit: Option<usize>,
}

impl Client {
    /// Create a client for `collection` without contacting the store
    pub fn new(
        base_url: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let config = Config {
            base_url: base_url.into(),
            user: user.into(),
            password: password.into(),
            ..Config::default()
        };
        Self::from_config(&config, collection)
    }

    /// Create a client from a configuration without contacting the store
    pub fn from_config(config: &Config, collection: impl Into<String>) -> Result<Self> {
        let collection = collection.into();
        Ok(Self {
            transport: Transport::new(config)?,
            soda_root: config.soda_root(),
            collection_url: config.collection_url(&collection),
            collection,
            page_limit: config.page_limit,
        })
    }

    /// Create a client and, if asked to, create its collection
    pub async fn connect(
        config: &Config,
        collection: impl Into<String>,
        options: CreateOptions,
    ) -> Result<Self> {
        let client = Self::from_config(config, collection)?;
        if options.create {
            client.create_collection(options.overwrite).await?;
        }
        Ok(client)
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    /// Create the collection this client is bound to
    ///
    /// If it already exists the call fails with
    /// [`ClientError::CollectionExists`], unless `overwrite` is set, in which
    /// case the existing collection and all its documents are deleted first.
    #[tracing::instrument(skip(self), fields(collection = %self.collection))]
    pub async fn create_collection(&self, overwrite: bool) -> Result<()> {
        if self.collection_exists().await? {
            if !overwrite {
                return Err(ClientError::CollectionExists(self.collection.clone()));
            }
            tracing::info!("Collection exists, deleting before recreating it");
            self.delete_collection().await?;
        }

        self.transport
            .send_request(Method::PUT, &self.collection_url, None)
            .await?
            .into_body(|status, reason| ClientError::CreateCollection { status, reason })?;

        tracing::info!("Collection created");
        Ok(())
    }

    /// Names of every collection visible to the user
    #[tracing::instrument(skip(self))]
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let body = self.get_listing().await?;
        let listing: CollectionListing = serde_json::from_str(&body)?;
        Ok(listing.names())
    }

    /// The raw collection listing, including each collection's schema
    #[tracing::instrument(skip(self))]
    pub async fn list_collections_schema(&self) -> Result<Value> {
        let body = self.get_listing().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn collection_exists(&self) -> Result<bool> {
        Ok(self
            .list_collections()
            .await?
            .iter()
            .any(|name| name == &self.collection))
    }

    async fn get_listing(&self) -> Result<String> {
        self.transport
            .send_request(Method::GET, &self.soda_root, None)
            .await?
            .into_body(|status, reason| ClientError::Access { status, reason })
    }

    /// Delete the collection and every document in it
    #[tracing::instrument(skip(self), fields(collection = %self.collection))]
    pub async fn delete_collection(&self) -> Result<()> {
        self.transport
            .send_request(Method::DELETE, &self.collection_url, None)
            .await?
            .into_body(|status, reason| ClientError::DeleteCollection { status, reason })?;

        tracing::info!("Collection deleted");
        Ok(())
    }

    /// Insert one document
    #[tracing::instrument(skip(self, item), fields(collection = %self.collection))]
    pub async fn add_item<T: Serialize + ?Sized>(&self, item: &T) -> Result<()> {
        let payload = serde_json::to_value(item)?;
        self.insert(&self.collection_url, &payload).await
    }

    /// Insert several documents with a single bulk insert request
    #[tracing::instrument(skip(self, items), fields(collection = %self.collection, count = items.len()))]
    pub async fn add_multiple_items<T: Serialize>(&self, items: &[T]) -> Result<()> {
        let payload = serde_json::to_value(items)?;
        let url = format!("{}?action=insert", self.collection_url);
        self.insert(&url, &payload).await
    }

    async fn insert(&self, url: &str, payload: &Value) -> Result<()> {
        self.transport
            .send_request(Method::POST, url, Some(payload))
            .await?
            .into_body(|status, reason| ClientError::AddItem { status, reason })?;
        Ok(())
    }

    /// Store the collection's metadata document
    ///
    /// `metadata` must serialize to a JSON object. A collection holds at most
    /// one metadata document, so this fails with
    /// [`ClientError::MetadataAlreadyExists`] when one is already stored, and
    /// with [`ClientError::TooManyMetadata`] when the store already holds more.
    #[tracing::instrument(skip(self, metadata), fields(collection = %self.collection))]
    pub async fn add_metadata<T: Serialize + ?Sized>(&self, metadata: &T) -> Result<()> {
        let content = serde_json::to_value(metadata)?;
        if !content.is_object() {
            return Err(ClientError::InvalidDocument(
                "metadata must be a JSON object".to_string(),
            ));
        }

        match self.metadata_documents().await?.0 {
            0 => {}
            1 => return Err(ClientError::MetadataAlreadyExists),
            count => return Err(ClientError::TooManyMetadata { count }),
        }

        let payload = serde_json::to_value(MetadataDocument::wrap(content))?;
        self.insert(&self.collection_url, &payload).await
    }

    /// Content of the collection's metadata document
    ///
    /// Returns an empty map when the collection has no metadata.
    #[tracing::instrument(skip(self), fields(collection = %self.collection))]
    pub async fn extract_metadata(&self) -> Result<Map<String, Value>> {
        let (count, documents) = self.metadata_documents().await?;

        match count {
            0 => Ok(Map::new()),
            1 => {
                let document = documents.into_iter().next().ok_or_else(|| {
                    ClientError::InvalidResponse("count is 1 but no items returned".to_string())
                })?;
                match document.get("content") {
                    Some(Value::Object(content)) => Ok(content.clone()),
                    _ => Err(ClientError::InvalidResponse(
                        "metadata document has no content object".to_string(),
                    )),
                }
            }
            count => Err(ClientError::TooManyMetadata { count }),
        }
    }

    /// Metadata decoded into a caller-chosen type, `None` when absent
    pub async fn extract_metadata_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        let content = self.extract_metadata().await?;
        if content.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(Value::Object(content))?))
    }

    /// Count and bodies of the stored metadata documents
    ///
    /// Pages are followed only until a second document shows up, so the count
    /// is exact for zero or one and a lower bound otherwise.
    async fn metadata_documents(&self) -> Result<(usize, Vec<Value>)> {
        let predicate = Predicate::metadata();
        let mut offset = 0;
        let mut count = 0;
        let mut documents = Vec::new();

        loop {
            let page = self.fetch_page(&predicate, offset).await?;
            count += page.count;
            let has_next = page.has_next();
            offset = page.next_offset();
            documents.extend(page.items);

            if !has_next || count > 1 {
                break;
            }
        }

        Ok((count, documents))
    }
}
