use crate::core::settings::DemoStep;
use crate::domain::model::{BookingDetail, RoomDetail, RoomId, RoomSummary};
use std::io::Write;
use std::sync::{Arc, Mutex};

pub const OPENING_BANNER: &str = "=== ДЕМОНСТРАЦИЯ API КЛИЕНТА ===";
pub const CLOSING_BANNER: &str = "=== ДЕМОНСТРАЦИЯ ЗАВЕРШЕНА ===";
const INDENT: &str = "   ";
/// Printed in place of an optional field the service left out.
const MISSING_VALUE: &str = "null";

/// Line-oriented demo output, shared between the runner and in-flight completions.
///
/// A block (a step's outcome) is written under a single lock so that
/// concurrent completions never interleave their lines.
#[derive(Clone)]
pub struct Transcript {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Transcript {
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn line(&self, line: &str) {
        self.write_lines(std::iter::once(line));
    }

    /// Writes `lines` followed by an empty line.
    pub fn block(&self, lines: &[String]) {
        self.write_lines(lines.iter().map(String::as_str).chain(std::iter::once("")));
    }

    pub fn opening_banner(&self) {
        self.write_lines([OPENING_BANNER, ""].into_iter());
    }

    pub fn closing_banner(&self) {
        self.line(CLOSING_BANNER);
    }

    fn write_lines<'a>(&self, lines: impl Iterator<Item = &'a str>) {
        let Ok(mut out) = self.out.lock() else {
            tracing::warn!("transcript lock poisoned, dropping output");
            return;
        };
        for line in lines {
            if let Err(e) = writeln!(out, "{}", line) {
                tracing::warn!("failed to write transcript: {}", e);
                return;
            }
        }
        let _ = out.flush();
    }
}

/// Announcement printed before a step runs.
pub fn step_header(step: DemoStep, lookup_room_id: RoomId) -> String {
    let text = match step {
        DemoStep::ListRooms => "Получаем все комнаты...".to_string(),
        DemoStep::CreateRoom => "Создаём новую комнату...".to_string(),
        DemoStep::GetRoom => format!("Получаем комнату по ID={}...", lookup_room_id),
        DemoStep::CreateBooking => "Создаём бронирование...".to_string(),
        DemoStep::ConfirmBooking => "Подтверждаем бронирование...".to_string(),
        DemoStep::CancelBooking => "Отменяем бронирование...".to_string(),
    };
    format!("{}. {}", step.number(), text)
}

pub fn error_lines(message: &str) -> Vec<String> {
    vec![format!("{}Ошибка: {}", INDENT, message)]
}

pub fn room_list_lines(rooms: &[RoomSummary]) -> Vec<String> {
    let mut lines = vec![format!("{}Найдено комнат: {}", INDENT, rooms.len())];
    lines.extend(rooms.iter().map(|room| {
        format!(
            "{}- ID:{} | {} | Вместимость: {}",
            INDENT, room.id, room.name, room.capacity
        )
    }));
    lines
}

pub fn created_room_lines(room: &RoomDetail) -> Vec<String> {
    vec![
        format!("{}Создана комната:", INDENT),
        format!("{}- ID: {}", INDENT, room.id),
        format!("{}- Название: {}", INDENT, room.name),
    ]
}

pub fn room_detail_lines(room: &RoomDetail) -> Vec<String> {
    vec![
        format!("{}Комната: {}", INDENT, room.name),
        format!(
            "{}Описание: {}",
            INDENT,
            room.description.as_deref().unwrap_or(MISSING_VALUE)
        ),
    ]
}

pub fn created_booking_lines(booking: &BookingDetail) -> Vec<String> {
    vec![
        format!("{}Создано бронирование:", INDENT),
        format!("{}- ID: {}", INDENT, booking.id),
        format!("{}- Комната: {}", INDENT, booking.room_name),
        format!("{}- Статус: {}", INDENT, booking.status),
    ]
}

pub fn confirmed_booking_lines(booking: &BookingDetail) -> Vec<String> {
    vec![
        format!("{}Бронирование подтверждено:", INDENT),
        format!("{}- Статус: {}", INDENT, booking.status),
    ]
}

pub fn cancelled_booking_lines(booking: &BookingDetail) -> Vec<String> {
    vec![
        format!("{}Бронирование отменено:", INDENT),
        format!("{}- Статус: {}", INDENT, booking.status),
    ]
}

/// In-memory writer for capturing a transcript.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.buffer.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(_) => String::new(),
        }
    }
}

impl Write for MemorySink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| std::io::Error::other("memory sink lock poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
