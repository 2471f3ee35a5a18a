//! HTTP implementation of [`BoardApi`].

use crate::api::{card_placement, section_placement, ApiResult, BoardApi, CardUpdate};
use crate::config::ClientConfig;
use crate::error::Result;
use futures::future::{BoxFuture, FutureExt};
use kanban_engine::{
    Board, BoardId, Card, CardId, Placement, Position, RemoteFailure, Section, SectionId,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// Board service client over HTTP with a bearer credential.
#[derive(Debug, Clone)]
pub struct HttpBoardApi {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpBoardApi {
    /// Build a client with the configured timeout.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send_raw(request).await?;
        serde_json::from_str(&body.text).map_err(|e| RemoteFailure::Server {
            status: body.status.as_u16(),
            message: format!("undecodable response: {}", e),
        })
    }

    async fn send_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send_raw(request).await.map(|_| ())
    }

    /// Send a move request. A 2xx means the move was persisted, so a body
    /// that cannot be read downgrades to a confirmation without placement.
    async fn send_move<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        placement: impl FnOnce(&T) -> Option<Placement>,
    ) -> ApiResult<Option<Placement>> {
        let body = self.send_raw(request).await?;
        match serde_json::from_str::<T>(&body.text) {
            Ok(entity) => Ok(placement(&entity)),
            Err(e) => {
                tracing::warn!(error = %e, "Move confirmed without a readable placement");
                Ok(None)
            }
        }
    }

    async fn send_raw(&self, request: RequestBuilder) -> ApiResult<RawBody> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(failure_from_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(failure_from_transport)?;
        if !status.is_success() {
            return Err(failure_from_status(status, &text));
        }
        Ok(RawBody { status, text })
    }
}

struct RawBody {
    status: StatusCode,
    text: String,
}

impl BoardApi for HttpBoardApi {
    fn fetch_board(&self, board_id: BoardId) -> BoxFuture<'static, ApiResult<Board>> {
        let this = self.clone();
        async move {
            let request = this.client.get(this.url(&format!("/boards/{}", board_id)));
            this.send(request).await
        }
        .boxed()
    }

    fn move_section(
        &self,
        section_id: SectionId,
        position: Position,
    ) -> BoxFuture<'static, ApiResult<Option<Placement>>> {
        let this = self.clone();
        async move {
            let request = this
                .client
                .put(this.url(&format!("/sections/{}/move", section_id)))
                .query(&[("position", position)]);
            this.send_move(request, |s: &Section| Some(section_placement(s)))
                .await
        }
        .boxed()
    }

    fn move_card(
        &self,
        card_id: CardId,
        section_id: SectionId,
        position: Position,
    ) -> BoxFuture<'static, ApiResult<Option<Placement>>> {
        let this = self.clone();
        async move {
            let request = this
                .client
                .put(this.url(&format!("/cards/{}/move", card_id)))
                .query(&[("sectionId", section_id), ("position", position as i64)]);
            this.send_move(request, card_placement).await
        }
        .boxed()
    }

    fn create_section(
        &self,
        board_id: BoardId,
        title: String,
    ) -> BoxFuture<'static, ApiResult<Section>> {
        let this = self.clone();
        async move {
            let board_id = board_id.to_string();
            let request = this
                .client
                .post(this.url("/sections"))
                .form(&[("boardId", board_id.as_str()), ("title", title.as_str())]);
            this.send(request).await
        }
        .boxed()
    }

    fn rename_section(
        &self,
        section_id: SectionId,
        title: String,
    ) -> BoxFuture<'static, ApiResult<Section>> {
        let this = self.clone();
        async move {
            let request = this
                .client
                .put(this.url(&format!("/sections/{}", section_id)))
                .query(&[("newTitle", title)]);
            this.send(request).await
        }
        .boxed()
    }

    fn delete_section(&self, section_id: SectionId) -> BoxFuture<'static, ApiResult<()>> {
        let this = self.clone();
        async move {
            let request = this
                .client
                .delete(this.url(&format!("/sections/{}", section_id)));
            this.send_empty(request).await
        }
        .boxed()
    }

    fn create_card(
        &self,
        section_id: SectionId,
        title: String,
    ) -> BoxFuture<'static, ApiResult<Card>> {
        let this = self.clone();
        async move {
            let section_id = section_id.to_string();
            let request = this
                .client
                .post(this.url("/cards"))
                .query(&[("sectionId", section_id.as_str()), ("title", title.as_str())]);
            this.send(request).await
        }
        .boxed()
    }

    fn update_card(
        &self,
        card_id: CardId,
        update: CardUpdate,
    ) -> BoxFuture<'static, ApiResult<Card>> {
        let this = self.clone();
        async move {
            let request = this
                .client
                .put(this.url(&format!("/cards/{}", card_id)))
                .json(&update);
            this.send(request).await
        }
        .boxed()
    }

    fn delete_card(&self, card_id: CardId) -> BoxFuture<'static, ApiResult<()>> {
        let this = self.clone();
        async move {
            let request = this.client.delete(this.url(&format!("/cards/{}", card_id)));
            this.send_empty(request).await
        }
        .boxed()
    }
}

/// Map a non-success status to a failure.
pub fn failure_from_status(status: StatusCode, body: &str) -> RemoteFailure {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteFailure::Unauthorized,
        StatusCode::NOT_FOUND => RemoteFailure::NotFound,
        _ => RemoteFailure::Server {
            status: status.as_u16(),
            message: extract_error_message(body),
        },
    }
}

fn failure_from_transport(e: reqwest::Error) -> RemoteFailure {
    let message = if e.is_timeout() {
        format!("timeout: {}", e)
    } else {
        e.to_string()
    };
    RemoteFailure::Network { message }
}

/// Pull a readable message out of an error body.
///
/// Tries the service's `error` and `details` fields, then falls back to the
/// raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        let error = json.get("error").and_then(|v| v.as_str());
        let details = json.get("details").and_then(|v| v.as_str());
        match (error, details) {
            (Some(error), Some(details)) => return format!("{}: {}", error, details),
            (Some(error), None) => return error.to_string(),
            _ => {}
        }
        if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
            return message.to_string();
        }
    }
    body.to_string()
}
