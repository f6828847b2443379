use crate::domain::model::{
    BookingDetail, BookingId, CreateBookingRequest, CreateRoomRequest, RoomDetail, RoomFilter,
    RoomId, RoomSummary,
};
use crate::utils::error::ApiError;
use async_trait::async_trait;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Operations of the room-booking service used by the demo.
#[async_trait]
pub trait BookingApi: Send + Sync {
    async fn list_rooms(&self, filter: RoomFilter) -> ApiResult<Vec<RoomSummary>>;
    async fn create_room(&self, request: CreateRoomRequest) -> ApiResult<RoomDetail>;
    async fn get_room(&self, id: RoomId) -> ApiResult<RoomDetail>;
    async fn create_booking(&self, request: CreateBookingRequest) -> ApiResult<BookingDetail>;
    async fn confirm_booking(&self, id: BookingId) -> ApiResult<BookingDetail>;
    async fn cancel_booking(&self, id: BookingId) -> ApiResult<BookingDetail>;
}
