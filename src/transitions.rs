//! Which state changes are offered for an appointment.
//!
//! This is advisory only. The remote service decides whether a transition is
//! actually accepted; `change_state` never consults this module.

use crate::models::AppointmentState;

/// Every non-final state whose *name* differs from `current`'s.
///
/// Exclusion is by name, not id: two rows sharing `current`'s name are both
/// left out. Candidates are offered even when `current` itself is final; use
/// [`transition_menu`] for the UI-facing policy.
pub fn available_transitions(
    current: &AppointmentState,
    all: &[AppointmentState],
) -> Vec<AppointmentState> {
    all.iter()
        .filter(|s| !s.is_final && s.name != current.name)
        .cloned()
        .collect()
}

/// Transitions to show next to an appointment row. Appointments already in a
/// final state get no menu at all.
pub fn transition_menu(
    current: &AppointmentState,
    all: &[AppointmentState],
) -> Vec<AppointmentState> {
    if current.is_final {
        return Vec::new();
    }
    available_transitions(current, all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::Id;
    use pretty_assertions::assert_eq;

    fn state(id: i64, name: &str, is_final: bool) -> AppointmentState {
        AppointmentState {
            id: Id::from(id),
            name: name.into(),
            is_final,
        }
    }

    fn catalog() -> Vec<AppointmentState> {
        vec![
            state(1, "Scheduled", false),
            state(2, "Completed", true),
            state(3, "Canceled", true),
            state(4, "In Progress", false),
        ]
    }

    #[test]
    fn scheduled_only_moves_to_in_progress() {
        let all = catalog();
        let next = available_transitions(&all[0], &all);
        assert_eq!(next, vec![state(4, "In Progress", false)]);
    }

    #[test]
    fn never_offers_current_or_final_states() {
        let all = vec![
            state(1, "Programada", false),
            state(2, "En Proceso", false),
            state(3, "Reprogramada", false),
            state(4, "Completada", true),
            state(5, "Cancelada", true),
            state(6, "No Asistió", true),
        ];
        for current in &all {
            let next = available_transitions(current, &all);
            assert!(next.iter().all(|s| !s.is_final));
            assert!(next.iter().all(|s| s.name != current.name));
        }
    }

    #[test]
    fn rows_sharing_a_name_are_excluded_together() {
        let all = vec![
            state(1, "Programada", false),
            state(2, "Programada", false),
            state(3, "En Proceso", false),
        ];
        let next = available_transitions(&all[0], &all);
        assert_eq!(next, vec![state(3, "En Proceso", false)]);
    }

    #[test]
    fn final_current_still_yields_candidates() {
        let all = catalog();
        let completed = &all[1];
        let next = available_transitions(completed, &all);
        assert_eq!(
            next,
            vec![state(1, "Scheduled", false), state(4, "In Progress", false)]
        );
    }

    #[test]
    fn menu_is_empty_for_final_current() {
        let all = catalog();
        assert!(transition_menu(&all[1], &all).is_empty());
        assert!(transition_menu(&all[2], &all).is_empty());
        assert_eq!(transition_menu(&all[3], &all), vec![state(1, "Scheduled", false)]);
    }
}
