use crate::domain::model::RoomId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(1000);

/// One of the six demo steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemoStep {
    ListRooms,
    CreateRoom,
    GetRoom,
    CreateBooking,
    ConfirmBooking,
    CancelBooking,
}

impl DemoStep {
    pub const ALL: &'static [DemoStep] = &[
        DemoStep::ListRooms,
        DemoStep::CreateRoom,
        DemoStep::GetRoom,
        DemoStep::CreateBooking,
        DemoStep::ConfirmBooking,
        DemoStep::CancelBooking,
    ];

    /// 1-based position in the full sequence; used as the transcript step number.
    pub fn number(&self) -> usize {
        match self {
            DemoStep::ListRooms => 1,
            DemoStep::CreateRoom => 2,
            DemoStep::GetRoom => 3,
            DemoStep::CreateBooking => 4,
            DemoStep::ConfirmBooking => 5,
            DemoStep::CancelBooking => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DemoStep::ListRooms => "list-rooms",
            DemoStep::CreateRoom => "create-room",
            DemoStep::GetRoom => "get-room",
            DemoStep::CreateBooking => "create-booking",
            DemoStep::ConfirmBooking => "confirm-booking",
            DemoStep::CancelBooking => "cancel-booking",
        }
    }
}

impl fmt::Display for DemoStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DemoStep {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DemoStep::ALL
            .iter()
            .copied()
            .find(|step| step.as_str() == s.trim())
            .ok_or_else(|| {
                let names: Vec<&str> = DemoStep::ALL.iter().map(|s| s.as_str()).collect();
                format!("unknown step '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// How the runner paces calls against their completions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pacing {
    /// Spawn the call, print its outcome whenever it completes, start the delay immediately.
    #[default]
    FireAndForget,
    /// Await the call, then the delay.
    Sequential,
}

impl FromStr for Pacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "fire-and-forget" => Ok(Pacing::FireAndForget),
            "sequential" => Ok(Pacing::Sequential),
            other => Err(format!(
                "unknown pacing '{}', expected fire-and-forget or sequential",
                other
            )),
        }
    }
}

/// Fixed request values used by the demo steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub room_name_prefix: String,
    pub room_capacity: u32,
    pub room_description: String,
    pub lookup_room_id: RoomId,
    pub booking_room_id: RoomId,
    pub booking_title: String,
    pub organizer_email: String,
    pub booking_lead_minutes: i64,
    pub booking_duration_minutes: i64,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self {
            room_name_prefix: "Тестовая-".to_string(),
            room_capacity: 8,
            room_description: "Создана через Rust клиент".to_string(),
            lookup_room_id: 1,
            booking_room_id: 1,
            booking_title: "Тестовое совещание".to_string(),
            organizer_email: "test@example.com".to_string(),
            booking_lead_minutes: 60,
            booking_duration_minutes: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunnerSettings {
    pub step_delay: Duration,
    pub pacing: Pacing,
    pub fixtures: Fixtures,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            pacing: Pacing::default(),
            fixtures: Fixtures::default(),
        }
    }
}
