use crate::core::settings::{DemoStep, Fixtures, Pacing, RunnerSettings};
use crate::core::transcript::{self, Transcript};
use crate::domain::model::{
    BookingId, BookingStatus, CreateBookingRequest, CreateRoomRequest, RoomFilter, RoomId,
};
use crate::domain::ports::BookingApi;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};

/// State handed from one step to a later one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoContext {
    pub created_room_id: Option<RoomId>,
    pub created_booking_id: Option<BookingId>,
}

/// A fully-formed call for one step.
#[derive(Debug, Clone)]
enum StepCall {
    ListRooms(RoomFilter),
    CreateRoom(CreateRoomRequest),
    GetRoom(RoomId),
    CreateBooking(CreateBookingRequest),
    ConfirmBooking(BookingId),
    CancelBooking(BookingId),
}

enum Prepared {
    Call(StepCall),
    /// Step guard not satisfied.
    Skipped,
    /// Request could not be built; the message is printed like a call error.
    Rejected(String),
}

struct StepOutcome {
    lines: Vec<String>,
    created_room_id: Option<RoomId>,
    created_booking_id: Option<BookingId>,
}

impl StepOutcome {
    fn lines(lines: Vec<String>) -> Self {
        Self {
            lines,
            created_room_id: None,
            created_booking_id: None,
        }
    }

    fn apply(&self, context: &mut DemoContext) {
        if let Some(id) = self.created_room_id {
            context.created_room_id = Some(id);
        }
        if let Some(id) = self.created_booking_id {
            context.created_booking_id = Some(id);
        }
    }
}

/// Room name made unique per run by a millisecond timestamp suffix.
pub fn unique_room_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}{}", prefix, now.timestamp_millis())
}

/// Start and end of the demo booking relative to `now`.
pub fn booking_window(now: DateTime<Utc>, fixtures: &Fixtures) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now + Duration::minutes(fixtures.booking_lead_minutes);
    let end = start + Duration::minutes(fixtures.booking_duration_minutes);
    (start, end)
}

/// Runs the fixed demo sequence against a `BookingApi`, writing a transcript.
///
/// Every step announces itself, issues one call, prints the outcome and then
/// waits `step_delay`. Errors are printed and never stop the sequence. With
/// [`Pacing::FireAndForget`] the delay starts as soon as the call is issued, so
/// a slow call may print after the next step's header, and a guarded step may
/// find its precursor id missing.
pub struct DemoRunner<A: BookingApi + ?Sized + 'static> {
    api: Arc<A>,
    transcript: Transcript,
    settings: RunnerSettings,
}

impl<A: BookingApi + ?Sized + 'static> DemoRunner<A> {
    pub fn new(api: Arc<A>, transcript: Transcript, settings: RunnerSettings) -> Self {
        Self {
            api,
            transcript,
            settings,
        }
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub async fn run(&self) -> DemoContext {
        self.run_steps(DemoStep::ALL).await
    }

    /// Runs `steps` in the given order between the opening and closing banners.
    pub async fn run_steps(&self, steps: &[DemoStep]) -> DemoContext {
        tracing::info!(
            "🚀 Starting demo: {} steps, pacing {:?}, delay {:?}",
            steps.len(),
            self.settings.pacing,
            self.settings.step_delay
        );
        self.transcript.opening_banner();

        let context = match self.settings.pacing {
            Pacing::Sequential => self.run_sequential(steps).await,
            Pacing::FireAndForget => self.run_fire_and_forget(steps).await,
        };

        self.transcript.closing_banner();
        tracing::info!("✅ Demo finished: {:?}", context);
        context
    }

    async fn run_sequential(&self, steps: &[DemoStep]) -> DemoContext {
        let mut context = DemoContext::default();

        for &step in steps {
            self.announce(step);

            match self.prepare(step, &context) {
                Prepared::Call(call) => {
                    let outcome = perform(self.api.as_ref(), step, call).await;
                    outcome.apply(&mut context);
                    self.transcript.block(&outcome.lines);
                }
                Prepared::Rejected(message) => {
                    self.transcript.block(&transcript::error_lines(&message))
                }
                Prepared::Skipped => log_skipped(step),
            }

            self.pause().await;
        }

        context
    }

    async fn run_fire_and_forget(&self, steps: &[DemoStep]) -> DemoContext {
        let shared = Arc::new(Mutex::new(DemoContext::default()));

        for &step in steps {
            self.announce(step);

            // The slot may not be written yet if the producing call is still in flight.
            let snapshot = read_context(&shared);

            match self.prepare(step, &snapshot) {
                Prepared::Call(call) => {
                    let api = Arc::clone(&self.api);
                    let transcript = self.transcript.clone();
                    let shared = Arc::clone(&shared);
                    tokio::spawn(async move {
                        let outcome = perform(api.as_ref(), step, call).await;
                        if let Ok(mut context) = shared.lock() {
                            outcome.apply(&mut context);
                        }
                        transcript.block(&outcome.lines);
                    });
                }
                Prepared::Rejected(message) => {
                    self.transcript.block(&transcript::error_lines(&message))
                }
                Prepared::Skipped => log_skipped(step),
            }

            self.pause().await;
        }

        read_context(&shared)
    }

    fn announce(&self, step: DemoStep) {
        tracing::debug!("▶️ Step {}: {}", step.number(), step);
        self.transcript.line(&transcript::step_header(
            step,
            self.settings.fixtures.lookup_room_id,
        ));
    }

    async fn pause(&self) {
        if !self.settings.step_delay.is_zero() {
            tokio::time::sleep(self.settings.step_delay).await;
        }
    }

    /// Builds a fresh request for `step`, or reports why it cannot run.
    fn prepare(&self, step: DemoStep, context: &DemoContext) -> Prepared {
        let fixtures = &self.settings.fixtures;
        match step {
            DemoStep::ListRooms => Prepared::Call(StepCall::ListRooms(RoomFilter {
                include_inactive: true,
            })),
            DemoStep::CreateRoom => Prepared::Call(StepCall::CreateRoom(CreateRoomRequest {
                name: unique_room_name(&fixtures.room_name_prefix, Utc::now()),
                capacity: fixtures.room_capacity,
                description: Some(fixtures.room_description.clone()),
            })),
            DemoStep::GetRoom => Prepared::Call(StepCall::GetRoom(fixtures.lookup_room_id)),
            DemoStep::CreateBooking => {
                let (start, end) = booking_window(Utc::now(), fixtures);
                match CreateBookingRequest::new(
                    fixtures.booking_room_id,
                    fixtures.booking_title.clone(),
                    fixtures.organizer_email.clone(),
                    start,
                    end,
                ) {
                    Some(request) => Prepared::Call(StepCall::CreateBooking(request)),
                    None => Prepared::Rejected("End time must be after start time".to_string()),
                }
            }
            DemoStep::ConfirmBooking => match context.created_booking_id {
                Some(id) => Prepared::Call(StepCall::ConfirmBooking(id)),
                None => Prepared::Skipped,
            },
            DemoStep::CancelBooking => match context.created_booking_id {
                Some(id) => Prepared::Call(StepCall::CancelBooking(id)),
                None => Prepared::Skipped,
            },
        }
    }
}

fn read_context(shared: &Mutex<DemoContext>) -> DemoContext {
    shared
        .lock()
        .map(|context| context.clone())
        .unwrap_or_default()
}

fn log_skipped(step: DemoStep) {
    tracing::info!("⏭️ Skipping step {} ({}): no booking id captured", step.number(), step);
}

/// A confirm that leaves the booking pending, or a cancel that leaves it
/// active, means the service accepted the call without the transition.
fn unexpected_status(step: DemoStep, status: &BookingStatus) -> bool {
    match step {
        DemoStep::ConfirmBooking => status.is_confirmable(),
        DemoStep::CancelBooking => status.is_cancellable(),
        _ => false,
    }
}

fn log_unexpected_status(step: DemoStep, status: &BookingStatus) {
    if unexpected_status(step, status) {
        tracing::debug!(
            "⚠️ Step {} ({}) returned status {} (active: {})",
            step.number(),
            step,
            status,
            status.is_active()
        );
    }
}

async fn perform<A: BookingApi + ?Sized>(api: &A, step: DemoStep, call: StepCall) -> StepOutcome {
    let result = match call {
        StepCall::ListRooms(filter) => api.list_rooms(filter).await.map(|rooms| {
            tracing::debug!("📥 Listed {} rooms", rooms.len());
            StepOutcome::lines(transcript::room_list_lines(&rooms))
        }),
        StepCall::CreateRoom(request) => api.create_room(request).await.map(|room| StepOutcome {
            lines: transcript::created_room_lines(&room),
            created_room_id: Some(room.id),
            created_booking_id: None,
        }),
        StepCall::GetRoom(id) => api
            .get_room(id)
            .await
            .map(|room| StepOutcome::lines(transcript::room_detail_lines(&room))),
        StepCall::CreateBooking(request) => {
            api.create_booking(request).await.map(|booking| StepOutcome {
                lines: transcript::created_booking_lines(&booking),
                created_room_id: None,
                created_booking_id: Some(booking.id),
            })
        }
        StepCall::ConfirmBooking(id) => api.confirm_booking(id).await.map(|booking| {
            log_unexpected_status(step, &booking.status);
            StepOutcome::lines(transcript::confirmed_booking_lines(&booking))
        }),
        StepCall::CancelBooking(id) => api.cancel_booking(id).await.map(|booking| {
            log_unexpected_status(step, &booking.status);
            StepOutcome::lines(transcript::cancelled_booking_lines(&booking))
        }),
    };

    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            match e.details() {
                Some(details) => tracing::warn!(
                    "❌ Step {} ({}) failed: {} (kind: {:?}, details: {})",
                    step.number(),
                    step,
                    e,
                    e.kind(),
                    details
                ),
                None => tracing::warn!(
                    "❌ Step {} ({}) failed: {} (kind: {:?})",
                    step.number(),
                    step,
                    e,
                    e.kind()
                ),
            }
            StepOutcome::lines(transcript::error_lines(&e.message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transcript::{MemorySink, CLOSING_BANNER, OPENING_BANNER};
    use crate::domain::model::{BookingDetail, BookingStatus, RoomDetail, RoomSummary};
    use crate::domain::ports::ApiResult;
    use crate::utils::error::ApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const INJECTED: &str = "injected failure";

    #[derive(Default)]
    struct MockBookingApi {
        fail_all: bool,
        fail_booking: bool,
        latency: std::time::Duration,
        rooms: Vec<RoomSummary>,
        list_calls: AtomicUsize,
        create_booking_calls: AtomicUsize,
        confirm_calls: AtomicUsize,
        cancel_calls: AtomicUsize,
        room_requests: Mutex<Vec<CreateRoomRequest>>,
        booking_requests: Mutex<Vec<CreateBookingRequest>>,
    }

    impl MockBookingApi {
        fn succeeding() -> Self {
            Self {
                rooms: vec![
                    RoomSummary { id: 1, name: "A".to_string(), capacity: 4 },
                    RoomSummary { id: 2, name: "B".to_string(), capacity: 8 },
                ],
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail_all: true,
                ..Default::default()
            }
        }

        fn with_failing_booking(mut self) -> Self {
            self.fail_booking = true;
            self
        }

        fn with_latency(mut self, latency: std::time::Duration) -> Self {
            self.latency = latency;
            self
        }

        async fn gate(&self) -> ApiResult<()> {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if self.fail_all {
                return Err(ApiError::Network {
                    message: INJECTED.to_string(),
                });
            }
            Ok(())
        }

        fn booking(id: BookingId, status: BookingStatus) -> BookingDetail {
            BookingDetail {
                id,
                room_id: Some(1),
                room_name: "Everest".to_string(),
                title: Some("Тестовое совещание".to_string()),
                organizer_email: Some("test@example.com".to_string()),
                start_time: None,
                end_time: None,
                duration_minutes: Some(60),
                status,
            }
        }
    }

    #[async_trait::async_trait]
    impl BookingApi for MockBookingApi {
        async fn list_rooms(&self, filter: RoomFilter) -> ApiResult<Vec<RoomSummary>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            assert!(filter.include_inactive);
            self.gate().await?;
            Ok(self.rooms.clone())
        }

        async fn create_room(&self, request: CreateRoomRequest) -> ApiResult<RoomDetail> {
            self.room_requests.lock().unwrap().push(request.clone());
            self.gate().await?;
            Ok(RoomDetail {
                id: 10,
                name: request.name,
                description: request.description,
                capacity: Some(request.capacity),
                active: Some(true),
            })
        }

        async fn get_room(&self, id: RoomId) -> ApiResult<RoomDetail> {
            self.gate().await?;
            Ok(RoomDetail {
                id,
                name: "Everest".to_string(),
                description: Some("3 этаж, проектор".to_string()),
                capacity: Some(12),
                active: Some(true),
            })
        }

        async fn create_booking(&self, request: CreateBookingRequest) -> ApiResult<BookingDetail> {
            self.create_booking_calls.fetch_add(1, Ordering::SeqCst);
            self.booking_requests.lock().unwrap().push(request);
            self.gate().await?;
            if self.fail_booking {
                return Err(ApiError::Conflict {
                    message: INJECTED.to_string(),
                    error_code: Some("BOOKING_CONFLICT".to_string()),
                });
            }
            Ok(Self::booking(42, BookingStatus::Pending))
        }

        async fn confirm_booking(&self, id: BookingId) -> ApiResult<BookingDetail> {
            self.confirm_calls.fetch_add(1, Ordering::SeqCst);
            self.gate().await?;
            Ok(Self::booking(id, BookingStatus::Confirmed))
        }

        async fn cancel_booking(&self, id: BookingId) -> ApiResult<BookingDetail> {
            self.cancel_calls.fetch_add(1, Ordering::SeqCst);
            self.gate().await?;
            Ok(Self::booking(id, BookingStatus::Cancelled))
        }
    }

    fn settings(pacing: Pacing, delay_ms: u64) -> RunnerSettings {
        RunnerSettings {
            step_delay: std::time::Duration::from_millis(delay_ms),
            pacing,
            fixtures: Fixtures::default(),
        }
    }

    fn build_runner(api: Arc<MockBookingApi>, pacing: Pacing, delay_ms: u64) -> (DemoRunner<MockBookingApi>, MemorySink) {
        let sink = MemorySink::new();
        let runner = DemoRunner::new(api, Transcript::new(sink.clone()), settings(pacing, delay_ms));
        (runner, sink)
    }

    fn assert_success_transcript(output: &str) {
        assert!(output.starts_with(OPENING_BANNER));
        assert!(output.trim_end().ends_with(CLOSING_BANNER));
        assert!(!output.contains("Ошибка"));
        assert!(output.contains("Найдено комнат: 2"));
        assert!(output.contains("- ID:1 | A | Вместимость: 4"));
        assert!(output.contains("Создана комната:"));
        assert!(output.contains("- ID: 10"));
        assert!(output.contains("- Название: Тестовая-"));
        assert!(output.contains("Комната: Everest"));
        assert!(output.contains("Описание: 3 этаж, проектор"));
        assert!(output.contains("Создано бронирование:"));
        assert!(output.contains("- ID: 42"));
        assert!(output.contains("- Статус: PENDING"));
        assert!(output.contains("Бронирование подтверждено:"));
        assert!(output.contains("- Статус: CONFIRMED"));
        assert!(output.contains("Бронирование отменено:"));
        assert!(output.contains("- Статус: CANCELLED"));
    }

    #[tokio::test]
    async fn test_all_steps_succeed_sequential() {
        let api = Arc::new(MockBookingApi::succeeding());
        let (runner, sink) = build_runner(api.clone(), Pacing::Sequential, 0);

        let context = runner.run().await;

        assert_success_transcript(&sink.contents());
        assert_eq!(context.created_room_id, Some(10));
        assert_eq!(context.created_booking_id, Some(42));
        assert_eq!(api.confirm_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.cancel_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_steps_succeed_fire_and_forget() {
        let api = Arc::new(MockBookingApi::succeeding());
        let (runner, sink) = build_runner(api.clone(), Pacing::FireAndForget, 20);

        let context = runner.run().await;

        assert_success_transcript(&sink.contents());
        assert_eq!(context.created_booking_id, Some(42));
        assert_eq!(api.confirm_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api.cancel_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_steps_fail_and_sequence_completes() {
        for pacing in [Pacing::Sequential, Pacing::FireAndForget] {
            let api = Arc::new(MockBookingApi::failing());
            let (runner, sink) = build_runner(api.clone(), pacing, 20);

            let context = runner.run().await;
            let output = sink.contents();

            let error_lines: Vec<&str> = output
                .lines()
                .filter(|line| line.contains("Ошибка"))
                .collect();
            assert_eq!(error_lines.len(), 4, "pacing {:?}: {}", pacing, output);
            assert!(error_lines
                .iter()
                .all(|line| *line == format!("   Ошибка: {}", INJECTED)));
            assert!(output.trim_end().ends_with(CLOSING_BANNER));
            assert!(output.contains("5. Подтверждаем бронирование..."));
            assert!(output.contains("6. Отменяем бронирование..."));
            assert_eq!(context, DemoContext::default());
            assert_eq!(api.confirm_calls.load(Ordering::SeqCst), 0);
            assert_eq!(api.cancel_calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_confirm_and_cancel_skipped_when_booking_fails() {
        for pacing in [Pacing::Sequential, Pacing::FireAndForget] {
            let api = Arc::new(MockBookingApi::succeeding().with_failing_booking());
            let (runner, sink) = build_runner(api.clone(), pacing, 20);

            let context = runner.run().await;

            assert_eq!(api.confirm_calls.load(Ordering::SeqCst), 0);
            assert_eq!(api.cancel_calls.load(Ordering::SeqCst), 0);
            assert_eq!(context.created_booking_id, None);
            assert_eq!(context.created_room_id, Some(10));
            assert!(sink.contents().contains(&format!("Ошибка: {}", INJECTED)));
        }
    }

    #[tokio::test]
    async fn test_room_name_differs_between_runs() {
        let api = Arc::new(MockBookingApi::succeeding());
        let (runner, _sink) = build_runner(api.clone(), Pacing::Sequential, 0);

        runner.run_steps(&[DemoStep::CreateRoom]).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        runner.run_steps(&[DemoStep::CreateRoom]).await;

        let requests = api.room_requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_ne!(requests[0].name, requests[1].name);
        assert!(requests[0].name.starts_with("Тестовая-"));
        assert_eq!(requests[0].capacity, 8);
    }

    #[tokio::test]
    async fn test_booking_window_is_in_the_future() {
        let api = Arc::new(MockBookingApi::succeeding());
        let (runner, _sink) = build_runner(api.clone(), Pacing::Sequential, 0);

        let before = Utc::now();
        runner.run_steps(&[DemoStep::CreateBooking]).await;
        let after = Utc::now();

        let requests = api.booking_requests.lock().unwrap();
        let request = &requests[0];
        assert!(request.start_time < request.end_time);
        assert!(request.start_time > after);
        assert!(request.start_time >= before + Duration::hours(1));
        assert!(request.start_time <= after + Duration::hours(1));
        assert!(request.end_time >= before + Duration::hours(2));
        assert!(request.end_time <= after + Duration::hours(2));
        assert_eq!(request.room_id, 1);
        assert_eq!(request.organizer_email, "test@example.com");
    }

    #[tokio::test]
    async fn test_list_rooms_alone_prints_rooms_in_order() {
        let api = Arc::new(MockBookingApi::succeeding());
        let (runner, sink) = build_runner(api.clone(), Pacing::Sequential, 0);

        runner.run_steps(&[DemoStep::ListRooms]).await;

        let expected = format!(
            "{}\n\n1. Получаем все комнаты...\n   Найдено комнат: 2\n   - ID:1 | A | Вместимость: 4\n   - ID:2 | B | Вместимость: 8\n\n{}\n",
            OPENING_BANNER, CLOSING_BANNER
        );
        assert_eq!(sink.contents(), expected);
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_fire_and_forget_guard_races_slow_booking() {
        let latency = std::time::Duration::from_millis(300);
        let steps = [DemoStep::CreateBooking, DemoStep::ConfirmBooking];

        let api = Arc::new(MockBookingApi::succeeding().with_latency(latency));
        let (runner, _sink) = build_runner(api.clone(), Pacing::FireAndForget, 10);
        runner.run_steps(&steps).await;
        assert_eq!(api.confirm_calls.load(Ordering::SeqCst), 0);

        let api = Arc::new(MockBookingApi::succeeding().with_latency(latency));
        let (runner, sink) = build_runner(api.clone(), Pacing::Sequential, 10);
        runner.run_steps(&steps).await;
        assert_eq!(api.confirm_calls.load(Ordering::SeqCst), 1);
        assert!(sink.contents().contains("- Статус: CONFIRMED"));
    }

    #[tokio::test]
    async fn test_zero_length_booking_is_rejected_before_the_call() {
        for pacing in [Pacing::Sequential, Pacing::FireAndForget] {
            let api = Arc::new(MockBookingApi::succeeding());
            let sink = MemorySink::new();
            let mut settings = settings(pacing, 10);
            settings.fixtures.booking_duration_minutes = 0;
            let runner = DemoRunner::new(api.clone(), Transcript::new(sink.clone()), settings);

            let context = runner.run().await;
            let output = sink.contents();

            assert!(
                output.contains("4. Создаём бронирование...\n   Ошибка: End time must be after start time\n"),
                "pacing {:?}: {}",
                pacing,
                output
            );
            assert_eq!(output.matches("Ошибка").count(), 1);
            assert_eq!(api.create_booking_calls.load(Ordering::SeqCst), 0);
            assert_eq!(api.confirm_calls.load(Ordering::SeqCst), 0);
            assert_eq!(api.cancel_calls.load(Ordering::SeqCst), 0);
            assert!(output.contains("5. Подтверждаем бронирование...\n"));
            assert!(output.contains("6. Отменяем бронирование...\n"));
            assert!(!output.contains("Бронирование подтверждено:"));
            assert!(!output.contains("Бронирование отменено:"));
            assert_eq!(context.created_booking_id, None);
            assert_eq!(context.created_room_id, Some(10));
        }
    }

    #[test]
    fn test_unexpected_status_after_confirm_and_cancel() {
        assert!(unexpected_status(DemoStep::ConfirmBooking, &BookingStatus::Pending));
        assert!(!unexpected_status(DemoStep::ConfirmBooking, &BookingStatus::Confirmed));
        assert!(unexpected_status(DemoStep::CancelBooking, &BookingStatus::Confirmed));
        assert!(unexpected_status(DemoStep::CancelBooking, &BookingStatus::Pending));
        assert!(!unexpected_status(DemoStep::CancelBooking, &BookingStatus::Cancelled));
        assert!(!unexpected_status(DemoStep::CancelBooking, &BookingStatus::Expired));
        assert!(!unexpected_status(DemoStep::CreateBooking, &BookingStatus::Pending));
    }

    #[test]
    fn test_unique_room_name_uses_millis() {
        let now = DateTime::parse_from_rfc3339("2026-01-01T00:00:00.123Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(unique_room_name("Room-", now), "Room-1767225600123");
    }
}
