//! Attendance state fetcher

use attend_api::AttendanceRecord;
use attend_remote::{AttendanceApi, RemoteResult};
use attend_util::SessionToken;

/// The employee's records together with the open one for a date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedAttendance {
    pub records: Vec<AttendanceRecord>,
    pub open: Option<AttendanceRecord>,
}

/// Pick the record for `date` that has no check-out yet
pub fn open_record_for(records: &[AttendanceRecord], date: &str) -> Option<AttendanceRecord> {
    records
        .iter()
        .find(|r| r.date == date && r.lacks_check_out())
        .cloned()
}

/// List all records and locate the open one for `date` in a single call
pub async fn fetch_attendance(
    api: &dyn AttendanceApi,
    token: &SessionToken,
    date: &str,
) -> RemoteResult<FetchedAttendance> {
    let records = api.list_attendance(token).await?;
    let open = open_record_for(&records, date);
    Ok(FetchedAttendance { records, open })
}

/// Today's open record, if any
pub async fn fetch_open_record(
    api: &dyn AttendanceApi,
    token: &SessionToken,
    date: &str,
) -> RemoteResult<Option<AttendanceRecord>> {
    Ok(fetch_attendance(api, token, date).await?.open)
}
