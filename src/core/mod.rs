pub mod runner;
pub mod settings;
pub mod transcript;

pub use crate::domain::model::{
    BookingDetail, BookingStatus, CreateBookingRequest, CreateRoomRequest, RoomDetail, RoomFilter,
    RoomSummary,
};
pub use crate::domain::ports::{ApiResult, BookingApi};
pub use runner::{DemoContext, DemoRunner};
pub use settings::{DemoStep, Fixtures, Pacing, RunnerSettings};
pub use transcript::{MemorySink, Transcript};
