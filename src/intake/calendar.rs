use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// 预约日期格式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 可预约窗口：今天起往后 14 天（含首尾共 15 天）
pub const LOOKAHEAD_DAYS: i64 = 14;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub date: NaiveDate,
    pub description: String,
}

/// 日历读写
///
/// 实现必须能被多个会话并发使用。
#[async_trait]
pub trait Calendar: Send + Sync {
    /// `start..=end` 之间的事件
    async fn list_events(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarEvent>>;
    async fn create_event(&self, date: NaiveDate, description: &str) -> Result<()>;

    /// 后端使用的日历标识
    fn calendar_id(&self) -> Option<&str> {
        None
    }
}

pub type DynCalendar = Arc<dyn Calendar>;

/// 内存日历
#[derive(Default)]
pub struct MemoryCalendar {
    id: Option<String>,
    events: RwLock<Vec<CalendarEvent>>,
}

impl MemoryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<CalendarEvent>) -> Self {
        Self {
            id: None,
            events: RwLock::new(events),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events.read().clone()
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

#[async_trait]
impl Calendar for MemoryCalendar {
    async fn list_events(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CalendarEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|event| event.date >= start && event.date <= end)
            .cloned()
            .collect())
    }

    async fn create_event(&self, date: NaiveDate, description: &str) -> Result<()> {
        tracing::debug!(date = %date, calendar = ?self.id, "creating calendar event");
        self.events.write().push(CalendarEvent {
            date,
            description: description.to_string(),
        });
        Ok(())
    }

    fn calendar_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// 窗口内没有事件的日期，升序
pub async fn available_dates(calendar: &dyn Calendar, today: NaiveDate) -> Result<Vec<String>> {
    let end = today + Duration::days(LOOKAHEAD_DAYS);
    let booked: Vec<String> = calendar
        .list_events(today, end)
        .await?
        .iter()
        .map(|event| event.date.format(DATE_FORMAT).to_string())
        .collect();

    Ok((0..=LOOKAHEAD_DAYS)
        .map(|offset| (today + Duration::days(offset)).format(DATE_FORMAT).to_string())
        .filter(|day| !booked.contains(day))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, DATE_FORMAT).unwrap()
    }

    fn booked(day: &str) -> CalendarEvent {
        CalendarEvent {
            date: date(day),
            description: "booked".into(),
        }
    }

    #[test]
    fn calendar_id_is_carried() {
        assert_eq!(MemoryCalendar::new().calendar_id(), None);
        let calendar = MemoryCalendar::new().with_id("clinic@example.com");
        assert_eq!(calendar.calendar_id(), Some("clinic@example.com"));
    }

    #[tokio::test]
    async fn empty_calendar_offers_full_window() {
        let calendar = MemoryCalendar::new();
        let dates = available_dates(&calendar, date("2024-12-20")).await.unwrap();
        assert_eq!(dates.len(), 15);
        assert_eq!(dates.first().map(String::as_str), Some("2024-12-20"));
        assert_eq!(dates.last().map(String::as_str), Some("2025-01-03"));
    }

    #[tokio::test]
    async fn events_outside_window_are_ignored() {
        let calendar =
            MemoryCalendar::with_events(vec![booked("2024-12-19"), booked("2025-01-04")]);
        let dates = available_dates(&calendar, date("2024-12-20")).await.unwrap();
        assert_eq!(dates.len(), 15);
    }

    #[tokio::test]
    async fn window_edges_can_be_booked() {
        let calendar =
            MemoryCalendar::with_events(vec![booked("2024-12-20"), booked("2025-01-03")]);
        let dates = available_dates(&calendar, date("2024-12-20")).await.unwrap();
        assert_eq!(dates.len(), 13);
        assert_eq!(dates.first().map(String::as_str), Some("2024-12-21"));
        assert_eq!(dates.last().map(String::as_str), Some("2025-01-02"));
    }
}
