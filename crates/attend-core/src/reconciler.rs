//! Geofence reconciliation decision

use attend_api::{
    AttendanceRecord, AttendanceState, LocationSample, OfficeLocation, ReconcileAction,
    ReconciliationOutcome,
};

use crate::distance;

/// Decide the transition for a known distance and today's open record.
///
/// | inside | open record | action    |
/// |--------|-------------|-----------|
/// | yes    | no          | CheckIn   |
/// | no     | yes         | CheckOut  |
/// | *      | *           | None      |
pub fn decide(
    office: &OfficeLocation,
    distance_meters: f64,
    open: Option<&AttendanceRecord>,
) -> ReconciliationOutcome {
    let inside = office.is_within(distance_meters);
    let action = match (inside, open.is_some()) {
        (true, false) => ReconcileAction::CheckIn,
        (false, true) => ReconcileAction::CheckOut,
        _ => ReconcileAction::None,
    };

    ReconciliationOutcome {
        action,
        distance_meters,
    }
}

/// Distance from a sample to the office
pub fn distance_to_office(office: &OfficeLocation, sample: &LocationSample) -> f64 {
    distance(
        sample.latitude,
        sample.longitude,
        office.latitude,
        office.longitude,
    )
}

/// Sample-level entry point: compute the distance, then decide
pub fn reconcile(
    office: &OfficeLocation,
    sample: &LocationSample,
    open: Option<&AttendanceRecord>,
) -> ReconciliationOutcome {
    decide(office, distance_to_office(office, sample), open)
}

/// State after `action` has been confirmed by the service
pub fn next_state(current: AttendanceState, action: ReconcileAction) -> AttendanceState {
    match action {
        ReconcileAction::CheckIn => AttendanceState::Present,
        ReconcileAction::CheckOut => AttendanceState::Absent,
        ReconcileAction::None => current,
    }
}
