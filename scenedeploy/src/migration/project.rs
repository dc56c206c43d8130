//! Project schema transforms.

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use super::{MigrationError, MigrationLadder, MigrationResult};
use crate::project::Project;

/// The built-in project ladder, up to version 2.
pub fn project_ladder() -> MigrationLadder<Project> {
    MigrationLadder::new().step_mut(2, replace_user_id_with_eth_address)
}

/// Drops the legacy `userId` in favour of a nullable `ethAddress`.
pub fn replace_user_id_with_eth_address(project: &mut Project) {
    project.extra.remove("userId");
    // `eth_address` already defaults to `None`, which serializes as null.
}

/// Normalizes a project for cloud storage, stamping `updatedAt` with now.
pub fn to_project_cloud_schema(project: &Project) -> MigrationResult<Project> {
    to_project_cloud_schema_at(project, Utc::now())
}

/// Normalizes a project for cloud storage using an explicit clock.
///
/// Strips `ownerEmail` and `parcels`, nulls `userId`, canonicalizes
/// `createdAt` to ISO-8601 in UTC and sets `updatedAt` to `now`.
pub fn to_project_cloud_schema_at(
    project: &Project,
    now: DateTime<Utc>,
) -> MigrationResult<Project> {
    let mut out = project.clone();
    out.extra.remove("ownerEmail");
    out.extra.remove("parcels");
    out.extra.insert("userId".to_string(), Value::Null);

    let created = parse_date(&project.created_at).ok_or_else(|| MigrationError::InvalidDate {
        field: "createdAt",
        value: project.created_at.clone(),
    })?;
    out.created_at = to_iso(created);
    out.updated_at = to_iso(now);

    Ok(out)
}

fn to_iso(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses RFC 3339, a bare `YYYY-MM-DD` date, or epoch milliseconds.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(millis) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| Utc.from_utc_datetime(&d))
}
