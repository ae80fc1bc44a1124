// 患者登记领域：handler、日历、流程图

pub mod calendar;
pub mod flow;
pub mod gate;
pub mod handlers;
pub mod patient;

pub use calendar::{
    available_dates, Calendar, CalendarEvent, DynCalendar, MemoryCalendar, DATE_FORMAT,
    LOOKAHEAD_DAYS,
};
pub use flow::{intake_handlers, intake_session, patient_intake_flow, INTAKE_FLOW};
pub use gate::DepartmentGate;
pub use handlers::{
    GetAvailableDates, GetDepartments, RecordFields, RecordVisitDate, RecordVisitReasons,
    DEPARTMENTS,
};
pub use patient::{summarize, Allergy, Condition, Patient, Prescription};
