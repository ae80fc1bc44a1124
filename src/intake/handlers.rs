use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::{IntakeFlowError, Result};
use crate::handlers::{FunctionHandler, FunctionOutcome};
use crate::state::SessionState;

use super::calendar::{available_dates, DynCalendar, DATE_FORMAT};
use super::patient::{summarize, Patient};

/// 中心提供的科室
pub const DEPARTMENTS: [&str; 3] = ["Cardiologie", "Kinésithérapie", "Dentiste"];

fn argument<'a>(arguments: &'a Value, key: &str) -> Result<&'a Value> {
    arguments
        .get(key)
        .ok_or_else(|| IntakeFlowError::MissingField(key.to_string()))
}

/// 把参数中的若干字段原样写入会话
pub struct RecordFields {
    keys: Vec<&'static str>,
}

impl RecordFields {
    pub fn new(keys: &[&'static str]) -> Self {
        Self {
            keys: keys.to_vec(),
        }
    }
}

#[async_trait]
impl FunctionHandler for RecordFields {
    async fn call(&self, arguments: &Value, session: &mut SessionState) -> Result<FunctionOutcome> {
        for key in &self.keys {
            let value = argument(arguments, key)?.clone();
            session.insert(*key, value);
        }
        Ok(FunctionOutcome::success())
    }
}

/// 就诊原因以 `", "` 连接后保存
pub struct RecordVisitReasons;

#[async_trait]
impl FunctionHandler for RecordVisitReasons {
    async fn call(&self, arguments: &Value, session: &mut SessionState) -> Result<FunctionOutcome> {
        let reasons = argument(arguments, "visit_reasons")?
            .as_array()
            .map(|reasons| {
                reasons
                    .iter()
                    .filter_map(|reason| reason.get("name").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();
        session.insert("visit_reasons", reasons);
        Ok(FunctionOutcome::success())
    }
}

pub struct GetDepartments;

#[async_trait]
impl FunctionHandler for GetDepartments {
    async fn call(
        &self,
        _arguments: &Value,
        _session: &mut SessionState,
    ) -> Result<FunctionOutcome> {
        Ok(FunctionOutcome::success_with(json!({ "departments": DEPARTMENTS })))
    }
}

/// 查询可预约日期
pub struct GetAvailableDates {
    calendar: DynCalendar,
    today: Option<NaiveDate>,
}

impl GetAvailableDates {
    pub fn new(calendar: DynCalendar) -> Self {
        Self {
            calendar,
            today: None,
        }
    }

    /// 固定“今天”，不读系统时钟
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }
}

#[async_trait]
impl FunctionHandler for GetAvailableDates {
    async fn call(
        &self,
        _arguments: &Value,
        _session: &mut SessionState,
    ) -> Result<FunctionOutcome> {
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let dates = available_dates(self.calendar.as_ref(), today).await?;
        debug!(count = dates.len(), "available dates computed");
        Ok(FunctionOutcome::success_with(json!({ "dates": dates })))
    }
}

/// 记录就诊日期并写入日历
pub struct RecordVisitDate {
    calendar: DynCalendar,
}

impl RecordVisitDate {
    pub fn new(calendar: DynCalendar) -> Self {
        Self { calendar }
    }
}

#[async_trait]
impl FunctionHandler for RecordVisitDate {
    async fn call(&self, arguments: &Value, session: &mut SessionState) -> Result<FunctionOutcome> {
        let visit_date = argument(arguments, "visit_date")?;
        let raw = visit_date.as_str().unwrap_or_default();
        let date = match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
            Ok(date) => date,
            Err(err) => {
                return Ok(FunctionOutcome::failure(format!(
                    "visit date `{raw}` is not in YYYY-MM-DD format: {err}"
                )))
            }
        };
        debug!(visit_date = %date, "recording visit date");
        session.insert("visit_date", visit_date.clone());

        let patient = match Patient::from_session(session) {
            Ok(patient) => patient,
            Err(err) => return Ok(FunctionOutcome::failure(err.to_string())),
        };

        match self.calendar.create_event(date, &summarize(&patient)).await {
            Ok(()) => Ok(FunctionOutcome::success()),
            Err(err) => {
                error!(error = %err, date = %date, "failed creating event");
                Ok(FunctionOutcome::failure(err.to_string()))
            }
        }
    }
}
