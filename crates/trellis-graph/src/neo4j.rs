//! Neo4j graph adapter.
//!
//! Talks to Neo4j through the HTTP transactional Cypher endpoint
//! (`/db/{database}/tx/commit`), so no bolt driver is needed. Relationship
//! types are stored as a `type` property on `:RELATIONSHIP` edges because
//! Cypher cannot parameterize relationship type names.
//!
//! # Feature Flag
//!
//! This module requires the `neo4j` feature:
//! ```toml
//! trellis-graph = { version = "0.3", features = ["neo4j"] }
//! ```

use crate::{ExpansionLimits, GraphError, GraphResult, GraphStore, Hops};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use trellis_core::{Entity, EntityId, Triple};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ONE_HOP_CYPHER: &str = "MATCH (e:Entity {id: $id})-[r]-(m:Entity) \
     RETURN startNode(r).id, startNode(r).name, r.type, endNode(r).id, endNode(r).name \
     LIMIT $fanout";

const TWO_HOP_CYPHER: &str = "MATCH (e:Entity {id: $id})-[r1]-(m:Entity)-[r2]-(n:Entity) \
     WHERE n.id <> e.id \
     RETURN startNode(r2).id, startNode(r2).name, r2.type, endNode(r2).id, endNode(r2).name \
     LIMIT $limit";

const CREATE_RELATIONSHIP_CYPHER: &str = "OPTIONAL MATCH (a:Entity {id: $source}) \
     OPTIONAL MATCH (b:Entity {id: $target}) \
     FOREACH (x IN CASE WHEN a IS NOT NULL AND b IS NOT NULL THEN [1] ELSE [] END | \
     CREATE (a)-[:RELATIONSHIP {type: $rel_type}]->(b)) \
     RETURN a IS NOT NULL, b IS NOT NULL";

#[derive(Debug, Serialize)]
struct CypherRequest {
    statements: Vec<CypherStatement>,
}

#[derive(Debug, Serialize)]
struct CypherStatement {
    statement: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CypherResponse {
    #[serde(default)]
    results: Vec<CypherResult>,
    #[serde(default)]
    errors: Vec<Neo4jError>,
}

#[derive(Debug, Deserialize)]
struct CypherResult {
    #[serde(default)]
    data: Vec<CypherRow>,
}

#[derive(Debug, Deserialize)]
struct CypherRow {
    row: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Neo4jError {
    code: String,
    message: String,
}

/// Neo4j graph store.
pub struct Neo4jStore {
    client: reqwest::Client,
    url: String,
    database: String,
    username: String,
    password: String,
    timeout_secs: u64,
}

impl Neo4jStore {
    /// Create a client for a Neo4j server.
    ///
    /// The connection itself is lazy; nothing is sent until the store is used.
    pub fn connect(
        url: &str,
        database: &str,
        username: &str,
        password: &str,
    ) -> GraphResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            database: database.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    fn tx_url(&self) -> String {
        format!("{}/db/{}/tx/commit", self.url, self.database)
    }

    /// Run statements in a single auto-committed transaction.
    async fn commit(&self, statements: Vec<CypherStatement>) -> GraphResult<Vec<CypherResult>> {
        let request = CypherRequest { statements };

        let response = self
            .client
            .post(self.tx_url())
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    GraphError::Connection(format!(
                        "cannot reach Neo4j at {} (is it running?)",
                        self.url
                    ))
                } else if e.is_timeout() {
                    GraphError::Timeout(self.timeout_secs)
                } else {
                    GraphError::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GraphError::Api(format!("Neo4j returned {status}: {body}")));
        }

        let resp: CypherResponse = response
            .json()
            .await
            .map_err(|e| GraphError::Api(format!("bad response body: {}", e)))?;

        if let Some(err) = resp.errors.first() {
            return Err(GraphError::Query(format!("{}: {}", err.code, err.message)));
        }

        Ok(resp.results)
    }

    fn parse_entity(id: &serde_json::Value, name: &serde_json::Value) -> GraphResult<Entity> {
        let id = id
            .as_str()
            .ok_or_else(|| GraphError::Query("entity id missing in expansion row".to_string()))?;
        let id = id
            .parse::<EntityId>()
            .map_err(|e| GraphError::Query(format!("invalid entity id {}: {}", id, e)))?;

        Ok(Entity::new(id, name.as_str().unwrap_or_default()))
    }

    fn parse_triple(row: &[serde_json::Value]) -> GraphResult<Triple> {
        if row.len() != 5 {
            return Err(GraphError::Query(format!(
                "expected 5 columns in expansion row, got {}",
                row.len()
            )));
        }

        let source = Self::parse_entity(&row[0], &row[1])?;
        let rel_type = row[2].as_str().unwrap_or_default().to_string();
        let target = Self::parse_entity(&row[3], &row[4])?;

        Ok(Triple::new(source, rel_type, target))
    }

    fn scalar_count(results: &[CypherResult]) -> usize {
        results
            .first()
            .and_then(|r| r.data.first())
            .and_then(|row| row.row.first())
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize
    }
}

#[async_trait]
impl GraphStore for Neo4jStore {
    fn name(&self) -> &str {
        "neo4j"
    }

    async fn upsert_node(&self, id: &EntityId, name: &str) -> GraphResult<()> {
        let statement = CypherStatement {
            statement: "MERGE (n:Entity {id: $id}) ON CREATE SET n.name = $name".to_string(),
            parameters: json!({ "id": id.to_string(), "name": name }),
        };

        self.commit(vec![statement]).await?;
        Ok(())
    }

    async fn create_relationship(
        &self,
        source: &EntityId,
        target: &EntityId,
        rel_type: &str,
    ) -> GraphResult<()> {
        let statement = CypherStatement {
            statement: CREATE_RELATIONSHIP_CYPHER.to_string(),
            parameters: json!({
                "source": source.to_string(),
                "target": target.to_string(),
                "rel_type": rel_type,
            }),
        };

        let results = self.commit(vec![statement]).await?;

        let row = results
            .first()
            .and_then(|r| r.data.first())
            .ok_or_else(|| {
                GraphError::Query("relationship creation returned no rows".to_string())
            })?;

        let source_ok = row.row.first().and_then(|v| v.as_bool()).unwrap_or(false);
        let target_ok = row.row.get(1).and_then(|v| v.as_bool()).unwrap_or(false);

        if !source_ok {
            return Err(GraphError::MissingEndpoint(*source));
        }
        if !target_ok {
            return Err(GraphError::MissingEndpoint(*target));
        }

        Ok(())
    }

    async fn neighbors(
        &self,
        seeds: &[EntityId],
        hops: Hops,
        limits: &ExpansionLimits,
    ) -> GraphResult<Vec<Triple>> {
        let mut statements = Vec::new();
        for seed in seeds {
            statements.push(CypherStatement {
                statement: ONE_HOP_CYPHER.to_string(),
                parameters: json!({
                    "id": seed.to_string(),
                    "fanout": limits.fanout_per_hop,
                }),
            });

            if hops == Hops::Two {
                statements.push(CypherStatement {
                    statement: TWO_HOP_CYPHER.to_string(),
                    parameters: json!({
                        "id": seed.to_string(),
                        "limit": limits.fanout_per_hop.saturating_mul(limits.fanout_per_hop),
                    }),
                });
            }
        }

        if statements.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.commit(statements).await?;

        let mut triples = Vec::new();
        let mut seen: HashSet<(EntityId, String, EntityId)> = HashSet::new();

        'results: for result in results {
            for row in result.data {
                let triple = Self::parse_triple(&row.row)?;
                if seen.insert((triple.source.id, triple.rel_type.clone(), triple.target.id)) {
                    triples.push(triple);
                    if triples.len() >= limits.max_triples {
                        break 'results;
                    }
                }
            }
        }

        Ok(triples)
    }

    async fn node_count(&self) -> GraphResult<usize> {
        let statement = CypherStatement {
            statement: "MATCH (n:Entity) RETURN count(n)".to_string(),
            parameters: json!({}),
        };

        let results = self.commit(vec![statement]).await?;
        Ok(Self::scalar_count(&results))
    }

    async fn relationship_count(&self) -> GraphResult<usize> {
        let statement = CypherStatement {
            statement: "MATCH (:Entity)-[r]->(:Entity) RETURN count(r)".to_string(),
            parameters: json!({}),
        };

        let results = self.commit(vec![statement]).await?;
        Ok(Self::scalar_count(&results))
    }

    async fn health_check(&self) -> GraphResult<bool> {
        let statement = CypherStatement {
            statement: "RETURN 1".to_string(),
            parameters: json!({}),
        };

        Ok(self.commit(vec![statement]).await.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_triple_row() {
        let source = EntityId::new();
        let target = EntityId::new();
        let row = vec![
            json!(source.to_string()),
            json!("Pancreas"),
            json!("produces"),
            json!(target.to_string()),
            json!("Insulin"),
        ];

        let triple = Neo4jStore::parse_triple(&row).unwrap();
        assert_eq!(triple.source.id, source);
        assert_eq!(triple.source.name, "Pancreas");
        assert_eq!(triple.rel_type, "produces");
        assert_eq!(triple.target.id, target);
    }

    #[test]
    fn test_parse_triple_rejects_short_rows() {
        let row = vec![json!("not-enough")];
        assert!(matches!(
            Neo4jStore::parse_triple(&row),
            Err(GraphError::Query(_))
        ));
    }

    #[test]
    fn test_parse_triple_rejects_bad_ids() {
        let row = vec![
            json!("not-a-uuid"),
            json!("A"),
            json!("links"),
            json!(EntityId::new().to_string()),
            json!("B"),
        ];
        assert!(matches!(
            Neo4jStore::parse_triple(&row),
            Err(GraphError::Query(_))
        ));
    }

    #[test]
    fn test_cypher_response_deserializes() {
        let body = r#"{
            "results": [
                {
                    "columns": ["count(n)"],
                    "data": [ { "row": [42], "meta": [null] } ]
                }
            ],
            "errors": []
        }"#;

        let resp: CypherResponse = serde_json::from_str(body).unwrap();
        assert!(resp.errors.is_empty());
        assert_eq!(Neo4jStore::scalar_count(&resp.results), 42);
    }

    #[test]
    fn test_error_payload_deserializes() {
        let body = r#"{
            "results": [],
            "errors": [
                {
                    "code": "Neo.ClientError.Statement.SyntaxError",
                    "message": "Invalid input"
                }
            ]
        }"#;

        let resp: CypherResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.errors.len(), 1);
        assert_eq!(resp.errors[0].code, "Neo.ClientError.Statement.SyntaxError");
    }

    #[test]
    fn test_request_serialization() {
        let request = CypherRequest {
            statements: vec![CypherStatement {
                statement: "RETURN 1".to_string(),
                parameters: json!({}),
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["statements"][0]["statement"], json!("RETURN 1"));
    }
}
