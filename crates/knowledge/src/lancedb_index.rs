//! LanceDB-backed vector index implementation.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Fragment, ScoredFragment};
use crate::vector_index::{cosine_distance, rank, VectorIndex};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase, Select};
use lancedb::{DistanceType, Table};
use siteqa_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;

/// Ids per delete predicate
const DELETE_CHUNK: usize = 500;

/// LanceDB-backed vector index for website fragments.
///
/// Rows carry `id`, `text`, `source` (the page URL) and `vector`.
pub struct LanceDbIndex {
    table: Table,
    name: String,
    embedder: Arc<dyn EmbeddingProvider>,
    dimensions: usize,
}

fn upstream(context: &str) -> impl Fn(lancedb::Error) -> AppError + '_ {
    move |e| AppError::UpstreamUnavailable(format!("{}: {}", context, e))
}

impl LanceDbIndex {
    /// Create or open the collection `collection` in the database at `db_path`.
    ///
    /// # Errors
    /// Returns `AppError::Config` when an existing collection was built with
    /// a different embedding width than `embedder` produces.
    pub async fn open(
        db_path: &Path,
        collection: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        std::fs::create_dir_all(db_path).map_err(|e| {
            AppError::UpstreamUnavailable(format!(
                "Failed to create vector store directory {:?}: {}",
                db_path, e
            ))
        })?;

        let uri = db_path.to_string_lossy().to_string();
        let conn = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(upstream("Failed to connect to LanceDB"))?;

        let table_names = conn
            .table_names()
            .execute()
            .await
            .map_err(upstream("Failed to list collections"))?;

        let dimensions = embedder.dimensions();
        let table = if table_names.iter().any(|t| t == collection) {
            let table = conn
                .open_table(collection)
                .execute()
                .await
                .map_err(upstream("Failed to open collection"))?;
            Self::check_dimensions(&table, collection, dimensions).await?;
            table
        } else {
            conn.create_empty_table(collection, Self::create_schema(dimensions))
                .execute()
                .await
                .map_err(upstream("Failed to create collection"))?
        };

        tracing::debug!("Opened collection '{}' at {:?}", collection, db_path);

        Ok(Self {
            table,
            name: collection.to_string(),
            embedder,
            dimensions,
        })
    }

    fn create_schema(dimensions: usize) -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    dimensions as i32,
                ),
                false,
            ),
        ]))
    }

    async fn check_dimensions(table: &Table, collection: &str, expected: usize) -> AppResult<()> {
        let schema = table
            .schema()
            .await
            .map_err(upstream("Failed to read collection schema"))?;

        let stored = schema
            .field_with_name("vector")
            .ok()
            .and_then(|field| match field.data_type() {
                DataType::FixedSizeList(_, n) => Some(*n as usize),
                _ => None,
            });

        match stored {
            Some(n) if n == expected => Ok(()),
            Some(n) => Err(AppError::Config(format!(
                "Collection '{}' holds {}-dimensional vectors but the embedding provider produces {}; re-run indexing after changing embedding settings",
                collection, n, expected
            ))),
            None => Err(AppError::Config(format!(
                "Collection '{}' has no vector column",
                collection
            ))),
        }
    }

    /// Convert fragments and their embeddings into one Arrow RecordBatch.
    fn fragments_to_batch(
        &self,
        fragments: &[Fragment],
        embeddings: Vec<Vec<f32>>,
    ) -> AppResult<RecordBatch> {
        let mut flat = Vec::with_capacity(fragments.len() * self.dimensions);
        for embedding in embeddings {
            if embedding.len() != self.dimensions {
                return Err(AppError::Config(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.dimensions,
                    embedding.len()
                )));
            }
            flat.extend(embedding);
        }

        let vectors = FixedSizeListArray::try_new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            self.dimensions as i32,
            Arc::new(Float32Array::from(flat)),
            None,
        )
        .map_err(|e| AppError::Serialization(format!("Failed to build vector column: {}", e)))?;

        RecordBatch::try_new(
            Self::create_schema(self.dimensions),
            vec![
                Arc::new(StringArray::from_iter_values(fragments.iter().map(|f| f.id.as_str()))),
                Arc::new(StringArray::from_iter_values(fragments.iter().map(|f| f.text.as_str()))),
                Arc::new(StringArray::from_iter_values(
                    fragments.iter().map(|f| f.source_url.as_str()),
                )),
                Arc::new(vectors),
            ],
        )
        .map_err(|e| AppError::Serialization(format!("Failed to create RecordBatch: {}", e)))
    }

    /// Read every row of a query result batch back as a scored fragment.
    fn batch_to_hits(batch: &RecordBatch, query: &[f32]) -> AppResult<Vec<ScoredFragment>> {
        let strings = |name: &str| -> AppResult<&StringArray> {
            batch
                .column_by_name(name)
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| AppError::Serialization(format!("Invalid {} column", name)))
        };
        let ids = strings("id")?;
        let texts = strings("text")?;
        let sources = strings("source")?;
        let vectors = batch
            .column_by_name("vector")
            .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
            .ok_or_else(|| AppError::Serialization("Invalid vector column".to_string()))?;

        (0..batch.num_rows())
            .map(|row| {
                let values = vectors.value(row);
                let values = values
                    .as_any()
                    .downcast_ref::<Float32Array>()
                    .ok_or_else(|| AppError::Serialization("Invalid vector values".to_string()))?;

                Ok(ScoredFragment {
                    fragment: Fragment {
                        id: ids.value(row).to_string(),
                        text: texts.value(row).to_string(),
                        source_url: sources.value(row).to_string(),
                    },
                    distance: cosine_distance(query, values.values()),
                })
            })
            .collect()
    }
}

/// `id IN ('a', 'b')` with single quotes doubled.
fn id_predicate(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("'{}'", id.replace('\'', "''")))
        .collect();
    format!("id IN ({})", quoted.join(", "))
}

#[async_trait::async_trait]
impl VectorIndex for LanceDbIndex {
    fn collection_name(&self) -> &str {
        &self.name
    }

    async fn add(&self, fragments: &[Fragment]) -> AppResult<()> {
        if fragments.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = fragments.iter().map(|f| f.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != fragments.len() {
            return Err(AppError::UpstreamUnavailable(format!(
                "Embedding provider returned {} vectors for {} fragments",
                embeddings.len(),
                fragments.len()
            )));
        }

        let batch = self.fragments_to_batch(fragments, embeddings)?;
        let schema = batch.schema();
        self.table
            .add(RecordBatchIterator::new(vec![Ok(batch)], schema))
            .execute()
            .await
            .map_err(upstream("Failed to add fragments"))?;

        tracing::debug!("Inserted {} fragments into '{}'", fragments.len(), self.name);
        Ok(())
    }

    async fn get_all_ids(&self) -> AppResult<Vec<String>> {
        let total = self.count().await?;
        if total == 0 {
            return Ok(Vec::new());
        }

        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .select(Select::columns(&["id"]))
            .limit(total)
            .execute()
            .await
            .map_err(upstream("Failed to list fragment ids"))?
            .try_collect()
            .await
            .map_err(upstream("Failed to collect fragment ids"))?;

        let mut ids = Vec::with_capacity(total);
        for batch in &batches {
            let column = batch
                .column_by_name("id")
                .and_then(|c| c.as_any().downcast_ref::<StringArray>())
                .ok_or_else(|| AppError::Serialization("Invalid id column".to_string()))?;
            ids.extend(column.iter().flatten().map(str::to_string));
        }

        Ok(ids)
    }

    async fn delete(&self, ids: &[String]) -> AppResult<()> {
        for chunk in ids.chunks(DELETE_CHUNK) {
            self.table
                .delete(&id_predicate(chunk))
                .await
                .map_err(upstream("Failed to delete fragments"))?;
        }
        Ok(())
    }

    async fn query(&self, text: &str, top_k: usize) -> AppResult<Vec<ScoredFragment>> {
        if top_k == 0 || self.count().await? == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(text).await?;

        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .nearest_to(query_embedding.clone())
            .map_err(upstream("Failed to create query"))?
            .distance_type(DistanceType::Cosine)
            .limit(top_k)
            .execute()
            .await
            .map_err(upstream("Failed to execute query"))?
            .try_collect()
            .await
            .map_err(upstream("Failed to collect query results"))?;

        let mut hits = Vec::new();
        for batch in &batches {
            hits.extend(Self::batch_to_hits(batch, &query_embedding)?);
        }
        rank(&mut hits, top_k);

        tracing::debug!("Retrieved {} fragments (requested top-{})", hits.len(), top_k);
        Ok(hits)
    }

    async fn count(&self) -> AppResult<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(upstream("Failed to count fragments"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::TrigramProvider;
    use tempfile::TempDir;

    fn fragment(id: &str, text: &str, url: &str) -> Fragment {
        Fragment {
            id: id.to_string(),
            text: text.to_string(),
            source_url: url.to_string(),
        }
    }

    async fn open(dir: &TempDir, dims: usize) -> AppResult<LanceDbIndex> {
        LanceDbIndex::open(
            &dir.path().join("vector_db"),
            "website_content",
            Arc::new(TrigramProvider::new(dims)),
        )
        .await
    }

    #[test]
    fn test_id_predicate_escapes_quotes() {
        let ids = vec!["id_0_0".to_string(), "it's".to_string()];
        assert_eq!(id_predicate(&ids), "id IN ('id_0_0', 'it''s')");
    }

    #[tokio::test]
    async fn test_add_query_and_delete() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir, 64).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 0);
        assert!(index.query("widgets", 3).await.unwrap().is_empty());

        index
            .add(&[
                fragment("id_0_0", "Alpha library docs about widgets.", "https://a.test/1"),
                fragment("id_1_0", "Beta pricing page lists plans.", "https://a.test/2"),
            ])
            .await
            .unwrap();
        assert_eq!(index.count().await.unwrap(), 2);

        let hits = index.query("Alpha widgets", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].fragment.id, "id_0_0");
        assert_eq!(hits[0].fragment.source_url, "https://a.test/1");

        let mut ids = index.get_all_ids().await.unwrap();
        ids.sort();
        assert_eq!(ids, vec!["id_0_0", "id_1_0"]);

        index.delete(&ids).await.unwrap();
        assert_eq!(index.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reopen_persists_and_checks_width() {
        let dir = TempDir::new().unwrap();
        {
            let index = open(&dir, 32).await.unwrap();
            index
                .add(&[fragment("id_0_0", "Alpha", "https://a.test/")])
                .await
                .unwrap();
        }

        let reopened = open(&dir, 32).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);

        let mismatched = open(&dir, 64).await;
        assert!(matches!(mismatched, Err(AppError::Config(_))));
    }
}
