//! Counts shown above the appointment list.

use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};

use crate::filter::DateScope;
use crate::models::{Appointment, AppointmentState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppointmentStats {
    /// Server-reported total, independent of local filtering.
    pub total: usize,
    pub today: usize,
    /// Filtered appointments per resolved state name.
    pub by_state: BTreeMap<String, usize>,
}

impl AppointmentStats {
    /// Case-sensitive, exact name match.
    pub fn count_by_state_name(&self, name: &str) -> usize {
        self.by_state.get(name).copied().unwrap_or(0)
    }
}

/// Summarise `filtered`, each paired with its resolved state.
///
/// In single-day scope everything shown already belongs to that day, so
/// `today` is simply the number of rows. Otherwise it counts rows whose
/// `scheduled_at`, seen in `tz`, falls on `today`.
pub fn aggregate<'a, Tz: TimeZone>(
    filtered: impl IntoIterator<Item = (&'a Appointment, &'a AppointmentState)>,
    server_total: usize,
    scope: DateScope,
    today: NaiveDate,
    tz: &Tz,
) -> AppointmentStats {
    let mut stats = AppointmentStats {
        total: server_total,
        ..Default::default()
    };
    let mut shown = 0usize;
    let mut on_today = 0usize;

    for (appointment, state) in filtered {
        shown += 1;
        *stats.by_state.entry(state.name.clone()).or_default() += 1;
        if appointment.scheduled_at.with_timezone(tz).date_naive() == today {
            on_today += 1;
        }
    }

    stats.today = if scope.is_single_day() { shown } else { on_today };
    stats
}
