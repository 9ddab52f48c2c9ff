// ABOUTME: Taxonomy resource operations on a stack
// ABOUTME: Create, update, delete, fetch and list taxonomies via /v3/taxonomies

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::client::ManagementClient;
use crate::error::ManagementResult;
use crate::stack::StackInstance;

const TAXONOMIES_PATH: &str = "/v3/taxonomies";

/// A taxonomy as returned by the management API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub uid: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Missing and `null` strings both decode as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Payload for creating or updating a taxonomy.
///
/// Fields left as `None` are omitted from the request, so an update only
/// touches the fields that are set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaxonomyInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaxonomyInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.uid = Some(uid.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct TaxonomyRequest<'a> {
    taxonomy: &'a TaxonomyInput,
}

#[derive(Debug, Deserialize)]
struct TaxonomyResponse {
    taxonomy: Taxonomy,
}

#[derive(Debug, Deserialize)]
struct TaxonomyListResponse {
    #[serde(default)]
    taxonomies: Option<Vec<Taxonomy>>,
}

/// Delete responses carry at most a notice
#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    notice: Option<String>,
}

fn taxonomy_path(uid: &str) -> String {
    format!("{}/{}", TAXONOMIES_PATH, uid)
}

impl StackInstance {
    /// Create a taxonomy. `POST /v3/taxonomies/`
    pub async fn taxonomy_create(&self, input: &TaxonomyInput) -> ManagementResult<Taxonomy> {
        let data = ManagementClient::serialize_input(&TaxonomyRequest { taxonomy: input })?;

        let resp = self
            .client
            .post(
                &format!("{}/", TAXONOMIES_PATH),
                &[],
                self.headers(),
                Some(data),
            )
            .await?;

        let result: TaxonomyResponse = ManagementClient::process_response(resp)?;
        Ok(result.taxonomy)
    }

    /// Update the taxonomy identified by `uid`. `PUT /v3/taxonomies/{uid}`
    pub async fn taxonomy_update(
        &self,
        uid: &str,
        input: &TaxonomyInput,
    ) -> ManagementResult<Taxonomy> {
        let data = ManagementClient::serialize_input(&TaxonomyRequest { taxonomy: input })?;

        let resp = self
            .client
            .put(&taxonomy_path(uid), &[], self.headers(), Some(data))
            .await?;

        let result: TaxonomyResponse = ManagementClient::process_response(resp)?;
        Ok(result.taxonomy)
    }

    /// Delete the taxonomy identified by `uid`. `DELETE /v3/taxonomies/{uid}`
    ///
    /// An empty success body is accepted; otherwise the body must be a JSON object.
    pub async fn taxonomy_delete(&self, uid: &str) -> ManagementResult<()> {
        let resp = self
            .client
            .delete(&taxonomy_path(uid), &[], self.headers(), None)
            .await?;

        if resp.is_success() && resp.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let result: DeleteResponse = ManagementClient::process_response(resp)?;
        if let Some(notice) = result.notice {
            debug!(uid, notice = %notice, "Taxonomy deleted");
        }

        Ok(())
    }

    /// Fetch a single taxonomy. `GET /v3/taxonomies/{uid}`
    pub async fn taxonomy_fetch(&self, uid: &str) -> ManagementResult<Taxonomy> {
        let resp = self
            .client
            .get(&taxonomy_path(uid), &[], self.headers())
            .await?;

        let result: TaxonomyResponse = ManagementClient::process_response(resp)?;
        Ok(result.taxonomy)
    }

    /// List all taxonomies in server order. `GET /v3/taxonomies`
    pub async fn taxonomy_fetch_all(&self) -> ManagementResult<Vec<Taxonomy>> {
        let resp = self
            .client
            .get(TAXONOMIES_PATH, &[], self.headers())
            .await?;

        let result: TaxonomyListResponse = ManagementClient::process_response(resp)?;
        Ok(result.taxonomies.unwrap_or_default())
    }
}
