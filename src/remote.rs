//! REST client for the category backend.
//!
//! A 404 on any GET means "resource absent" and surfaces as `Ok(None)`,
//! never as an error. Transport failures surface as
//! [`RemoteError::Network`]/[`RemoteError::Timeout`], which the
//! orchestrator treats as "remote unreachable" and answers from the local
//! store instead.

use std::time::Duration;

use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::storage::{Card, Category};

/// Inline-encoded card images can be sizable, but nothing legitimate
/// approaches this.
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024; // 5MB

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("The server already has a category with this id")]
    Conflict,
    #[error("Category not found on the server")]
    NotFound,
    #[error("HTTP error: status {0}")]
    Status(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed response body: {0}")]
    Body(#[from] serde_json::Error),
    #[error("Invalid API base URL: {0}")]
    BaseUrl(String),
}

/// Body for `PATCH /categories/{id}`: the full replacement card array.
#[derive(Serialize)]
struct PatchCards<'a> {
    cards: &'a [Card],
}

// ============================================================================
// Remote Category Client
// ============================================================================

#[derive(Clone)]
pub struct RemoteClient {
    client: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl RemoteClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Result<Self, RemoteError> {
        let base = Url::parse(base_url).map_err(|e| RemoteError::BaseUrl(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(RemoteError::BaseUrl(format!(
                "'{base_url}' cannot carry path segments"
            )));
        }
        Ok(Self {
            client,
            base,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `GET /categories`.
    ///
    /// `Ok(None)` means the server has no category collection yet (404),
    /// which is distinct from an empty collection (`Ok(Some(vec![]))`).
    pub async fn list_categories(&self) -> Result<Option<Vec<Category>>, RemoteError> {
        let url = self.endpoint(&["categories"]);
        let response = self.send(self.client.get(url)).await?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }

        Ok(Some(read_json(response).await?))
    }

    /// `GET /categories/{id}`. 404 is `Ok(None)`.
    pub async fn get_category(&self, id: &str) -> Result<Option<Category>, RemoteError> {
        let url = self.endpoint(&["categories", id]);
        let response = self.send(self.client.get(url)).await?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RemoteError::Status(response.status().as_u16()));
        }

        Ok(Some(read_json(response).await?))
    }

    /// `POST /categories` with a pre-computed slug id.
    ///
    /// A duplicate-id rejection (409) becomes [`RemoteError::Conflict`] so
    /// the orchestrator can regenerate a disambiguated id instead of
    /// silently overwriting anything.
    pub async fn create_category(&self, category: &Category) -> Result<Category, RemoteError> {
        let url = self.endpoint(&["categories"]);
        let response = self.send(self.client.post(url).json(category)).await?;

        match response.status().as_u16() {
            409 => Err(RemoteError::Conflict),
            status if !response.status().is_success() => Err(RemoteError::Status(status)),
            _ => Ok(read_json(response).await?),
        }
    }

    /// Append a card: read-modify-write against the server's current card
    /// list, submitting the full updated array via PATCH.
    ///
    /// Fails with [`RemoteError::NotFound`] when the category does not
    /// exist remotely.
    pub async fn append_card(
        &self,
        category_id: &str,
        card: Card,
    ) -> Result<Category, RemoteError> {
        let current = self
            .get_category(category_id)
            .await?
            .ok_or(RemoteError::NotFound)?;

        let mut cards = current.cards;
        cards.push(card);

        let url = self.endpoint(&["categories", &current.id]);
        let response = self
            .send(self.client.patch(url).json(&PatchCards { cards: &cards }))
            .await?;

        match response.status().as_u16() {
            404 => Err(RemoteError::NotFound),
            status if !response.status().is_success() => Err(RemoteError::Status(status)),
            _ => Ok(read_json(response).await?),
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, RemoteError> {
        tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| RemoteError::Timeout)?
            .map_err(RemoteError::Network)
    }

    /// Build an endpoint URL from path segments. Segments are
    /// percent-encoded, so ids are safe in paths. The base was validated at
    /// construction, so `path_segments_mut` cannot fail here.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Read a response body with a size cap, then decode it as JSON.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, RemoteError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > MAX_BODY_SIZE {
            return Err(RemoteError::ResponseTooLarge(MAX_BODY_SIZE));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(RemoteError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > MAX_BODY_SIZE {
            return Err(RemoteError::ResponseTooLarge(MAX_BODY_SIZE));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_card(id: &str, label: &str) -> Card {
        Card {
            id: id.to_string(),
            label: label.to_string(),
            image_url: format!("https://example.com/{id}.jpg"),
            speak: None,
        }
    }

    fn test_category(id: &str, cards: Vec<Card>) -> Category {
        Category {
            id: id.to_string(),
            title: id.to_uppercase(),
            color: "#ffd166".to_string(),
            cards,
        }
    }

    fn client_for(server: &MockServer) -> RemoteClient {
        RemoteClient::new(reqwest::Client::new(), &server.uri()).unwrap()
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let result = RemoteClient::new(reqwest::Client::new(), "not a url");
        assert!(matches!(result, Err(RemoteError::BaseUrl(_))));
    }

    #[tokio::test]
    async fn test_list_categories_success() {
        let server = MockServer::start().await;
        let cats = vec![test_category("animals", vec![test_card("a-cat", "Cat")])];
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&cats))
            .mount(&server)
            .await;

        let listed = client_for(&server).list_categories().await.unwrap();
        assert_eq!(listed, Some(cats));
    }

    #[tokio::test]
    async fn test_list_categories_404_is_absent_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let listed = client_for(&server).list_categories().await.unwrap();
        assert_eq!(listed, None);
    }

    #[tokio::test]
    async fn test_list_categories_500_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let result = client_for(&server).list_categories().await;
        assert!(matches!(result, Err(RemoteError::Status(500))));
    }

    #[tokio::test]
    async fn test_get_category_404_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories/ghosts"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let got = client_for(&server).get_category("ghosts").await.unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn test_create_category_round_trips() {
        let server = MockServer::start().await;
        let cat = test_category("shapes", vec![]);
        Mock::given(method("POST"))
            .and(path("/categories"))
            .and(body_json(&cat))
            .respond_with(ResponseTemplate::new(201).set_body_json(&cat))
            .mount(&server)
            .await;

        let created = client_for(&server).create_category(&cat).await.unwrap();
        assert_eq!(created, cat);
    }

    #[tokio::test]
    async fn test_create_category_409_is_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .create_category(&test_category("animals", vec![]))
            .await;
        assert!(matches!(result, Err(RemoteError::Conflict)));
    }

    #[tokio::test]
    async fn test_append_card_reads_then_patches_full_array() {
        let server = MockServer::start().await;
        let existing = test_category("animals", vec![test_card("a-cat", "Cat")]);
        Mock::given(method("GET"))
            .and(path("/categories/animals"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&existing))
            .mount(&server)
            .await;

        let new_card = test_card("a-dog", "Dog");
        let mut updated = existing.clone();
        updated.cards.push(new_card.clone());

        // The PATCH must carry the complete updated card array.
        Mock::given(method("PATCH"))
            .and(path("/categories/animals"))
            .and(body_json(serde_json::json!({
                "cards": updated.cards,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&updated))
            .expect(1)
            .mount(&server)
            .await;

        let returned = client_for(&server)
            .append_card("animals", new_card)
            .await
            .unwrap();
        assert_eq!(returned, updated);
    }

    #[tokio::test]
    async fn test_append_card_missing_category_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories/ghosts"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .append_card("ghosts", test_card("g-1", "Boo"))
            .await;
        assert!(matches!(result, Err(RemoteError::NotFound)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Nothing listens on this port; connection is refused immediately.
        let client = RemoteClient::new(reqwest::Client::new(), "http://127.0.0.1:1").unwrap();
        let result = client.list_categories().await;
        assert!(matches!(
            result,
            Err(RemoteError::Network(_)) | Err(RemoteError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_category_id_is_percent_encoded_in_path() {
        let server = MockServer::start().await;
        let cat = test_category("odd id", vec![]);
        Mock::given(method("GET"))
            .and(path("/categories/odd%20id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&cat))
            .mount(&server)
            .await;

        let got = client_for(&server).get_category("odd id").await.unwrap();
        assert_eq!(got, Some(cat));
    }

    #[tokio::test]
    async fn test_malformed_body_is_body_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let result = client_for(&server).list_categories().await;
        assert!(matches!(result, Err(RemoteError::Body(_))));
    }
}
