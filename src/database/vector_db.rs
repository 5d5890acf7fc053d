use qdrant_client::{
    config::QdrantConfig,
    qdrant::{
        point_id::PointIdOptions, with_payload_selector::SelectorOptions, CountPoints,
        CreateCollection, DeleteCollection, Distance, PointId, PointStruct, SearchPoints,
        UpsertPoints, Value, VectorParams, VectorsConfig, WithPayloadSelector,
    },
    Qdrant,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum VectorDBError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Operation failed: {0}")]
    Operation(String),
}

/// One indexed passage of documentation with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub text: String,
    pub source: String,
    pub score: f32,
}

#[derive(Clone)]
pub struct VectorDB {
    client: Arc<Qdrant>,
}

impl VectorDB {
    pub async fn connect(url: &str) -> Result<Self, VectorDBError> {
        // Configs usually carry the REST port; the client speaks gRPC on 6334
        let clean_url = url.split("://").last().unwrap_or(url);
        let grpc_url = if clean_url.ends_with(":6333") {
            clean_url.replace(":6333", ":6334")
        } else {
            clean_url.to_string()
        };

        let mut config = QdrantConfig::from_url(&format!("http://{}", grpc_url));
        config.check_compatibility = false;
        config.timeout = Duration::from_secs(30);
        config.connect_timeout = Duration::from_secs(10);

        let client = Qdrant::new(config).map_err(|e| VectorDBError::Connection(e.to_string()))?;
        client
            .list_collections()
            .await
            .map_err(|e| VectorDBError::Connection(format!("Failed to connect to Qdrant: {}", e)))?;
        log::info!("Connected to Qdrant at {}", url);

        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorDBError> {
        let vectors_config = VectorsConfig {
            config: Some(qdrant_client::qdrant::vectors_config::Config::Params(
                VectorParams {
                    size: vector_size,
                    distance: Distance::Cosine.into(),
                    ..Default::default()
                },
            )),
        };

        let request = CreateCollection {
            collection_name: name.to_string(),
            vectors_config: Some(vectors_config),
            ..Default::default()
        };

        match self.client.create_collection(request).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("AlreadyExists") || e.to_string().contains("already exists") => {
                log::debug!("Collection {} already exists, skipping creation", name);
                Ok(())
            }
            Err(e) => Err(VectorDBError::Operation(e.to_string())),
        }
    }

    /// Number of points currently indexed; a missing collection counts as
    /// empty so callers can treat "never loaded" and "dropped" alike.
    pub async fn collection_size(&self, name: &str) -> Result<u64, VectorDBError> {
        let request = CountPoints {
            collection_name: name.to_string(),
            exact: Some(true),
            ..Default::default()
        };

        match self.client.count(request).await {
            Ok(response) => Ok(response.result.map(|r| r.count).unwrap_or(0)),
            Err(e) if e.to_string().contains("doesn't exist") || e.to_string().contains("Not found") => {
                Ok(0)
            }
            Err(e) => Err(VectorDBError::Operation(e.to_string())),
        }
    }

    pub async fn delete_collection(&self, name: &str) -> Result<(), VectorDBError> {
        let request = DeleteCollection {
            collection_name: name.to_string(),
            ..Default::default()
        };

        match self.client.delete_collection(request).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("doesn't exist") || e.to_string().contains("Not found") => {
                Ok(())
            }
            Err(e) => Err(VectorDBError::Operation(e.to_string())),
        }
    }

    pub async fn store_chunk(
        &self,
        collection: &str,
        embedding: Vec<f32>,
        text: &str,
        source: &str,
    ) -> Result<String, VectorDBError> {
        let point_id = Uuid::new_v4().to_string();

        let mut payload: HashMap<String, serde_json::Value> = HashMap::new();
        payload.insert(
            "text".to_string(),
            serde_json::Value::String(text.to_string()),
        );
        payload.insert(
            "source".to_string(),
            serde_json::Value::String(source.to_string()),
        );
        let payload: HashMap<String, Value> = payload
            .into_iter()
            .map(|(k, v)| (k, Value::from(v)))
            .collect();

        let point = PointStruct {
            id: Some(PointId {
                point_id_options: Some(PointIdOptions::Uuid(point_id.clone())),
            }),
            vectors: Some(embedding.into()),
            payload,
        };

        let request = UpsertPoints {
            collection_name: collection.to_string(),
            points: vec![point],
            ..Default::default()
        };

        self.client
            .upsert_points(request)
            .await
            .map_err(|e| VectorDBError::Operation(e.to_string()))?;

        Ok(point_id)
    }

    pub async fn search_chunks(
        &self,
        collection: &str,
        query_vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredChunk>, VectorDBError> {
        let request = SearchPoints {
            collection_name: collection.to_string(),
            vector: query_vector,
            limit,
            with_payload: Some(WithPayloadSelector {
                selector_options: Some(SelectorOptions::Enable(true)),
            }),
            ..Default::default()
        };

        let results = self
            .client
            .search_points(request)
            .await
            .map_err(|e| VectorDBError::Operation(e.to_string()))?;

        let chunks = results
            .result
            .into_iter()
            .filter_map(|point| {
                let text = payload_str(&point.payload, "text")?;
                let source = payload_str(&point.payload, "source").unwrap_or_default();
                Some(ScoredChunk {
                    text,
                    source,
                    score: point.score,
                })
            })
            .collect();

        Ok(chunks)
    }
}

fn payload_str(payload: &HashMap<String, Value>, key: &str) -> Option<String> {
    payload
        .get(key)
        .cloned()
        .and_then(|v| serde_json::Value::try_from(v).ok())
        .and_then(|v| v.as_str().map(str::to_string))
}
