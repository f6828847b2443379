use crate::domain::model::{
    BookingDetail, BookingId, CreateBookingRequest, CreateRoomRequest, ErrorBody, RoomDetail,
    RoomFilter, RoomId, RoomSummary,
};
use crate::domain::ports::{ApiResult, BookingApi};
use crate::utils::error::{ApiError, Result};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

const API_PREFIX: &str = "/api/v1";

/// `BookingApi` over the service's REST surface.
#[derive(Debug, Clone)]
pub struct HttpBookingClient {
    client: Client,
    base_url: String,
}

impl HttpBookingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&body)?);
        }

        let error_body: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
        let message = error_body
            .message
            .clone()
            .or_else(|| error_body.error.clone())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        let mut error = ApiError::from_status(status.as_u16(), message, error_body.error_code);
        if let (ApiError::Validation { field_errors, .. }, Some(fields)) =
            (&mut error, error_body.field_errors)
        {
            *field_errors = fields
                .into_iter()
                .map(|f| format!("{}: {}", f.field, f.message))
                .collect();
        }
        Err(error)
    }
}

#[async_trait::async_trait]
impl BookingApi for HttpBookingClient {
    async fn list_rooms(&self, filter: RoomFilter) -> ApiResult<Vec<RoomSummary>> {
        let url = self.url("/rooms");
        tracing::debug!("GET {} (activeOnly={})", url, filter.active_only());
        let request = self
            .client
            .get(url)
            .query(&[("activeOnly", filter.active_only())]);
        self.send(request).await
    }

    async fn create_room(&self, request: CreateRoomRequest) -> ApiResult<RoomDetail> {
        let url = self.url("/rooms");
        tracing::debug!("POST {}", url);
        self.send(self.client.post(url).json(&request)).await
    }

    async fn get_room(&self, id: RoomId) -> ApiResult<RoomDetail> {
        let url = self.url(&format!("/rooms/{}", id));
        tracing::debug!("GET {}", url);
        self.send(self.client.get(url)).await
    }

    async fn create_booking(&self, request: CreateBookingRequest) -> ApiResult<BookingDetail> {
        let url = self.url("/bookings");
        tracing::debug!("POST {}", url);
        self.send(self.client.post(url).json(&request)).await
    }

    async fn confirm_booking(&self, id: BookingId) -> ApiResult<BookingDetail> {
        let url = self.url(&format!("/bookings/{}/confirm", id));
        tracing::debug!("POST {}", url);
        self.send(self.client.post(url)).await
    }

    async fn cancel_booking(&self, id: BookingId) -> ApiResult<BookingDetail> {
        let url = self.url(&format!("/bookings/{}/cancel", id));
        tracing::debug!("POST {}", url);
        self.send(self.client.post(url)).await
    }
}
