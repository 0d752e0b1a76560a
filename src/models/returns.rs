use chrono::NaiveDate;
use serde::Serialize;

/// A `(date, value)` pair fed into the return transforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnPoint {
    pub date: NaiveDate,
    pub return_pct: f64,
}

// Monthly rows carry Some(month); yearly rows carry None.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalendarReturn {
    pub year: i32,
    pub month: Option<u32>,
    pub return_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReturnsCalendar {
    pub monthly: Vec<CalendarReturn>,
    pub yearly: Vec<CalendarReturn>,
}
