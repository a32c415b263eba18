use super::RotaError;
use crate::model::{Member, RotationTable, ShiftType};
use chrono::{Duration, NaiveDate};
use std::cmp::Ordering;

/// Bornes incluses de la semaine `index` (0-based) d'un run.
pub(super) fn week_window(
    start: NaiveDate,
    index: u32,
    duration_days: u32,
) -> Result<(NaiveDate, NaiveDate), RotaError> {
    let offset = i64::from(index) * i64::from(duration_days);
    let week_start = start
        .checked_add_signed(Duration::days(offset))
        .ok_or_else(|| RotaError::Validation(format!("date overflow at week {}", index + 1)))?;
    let week_end = week_start
        .checked_add_signed(Duration::days(i64::from(duration_days) - 1))
        .ok_or_else(|| RotaError::Validation(format!("date overflow at week {}", index + 1)))?;
    Ok((week_start, week_end))
}

/// Ordre par nom puis identifiant.
pub(super) fn by_name(a: &Member, b: &Member) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

/// Plus petit compteur pour `shift` d'abord, puis nom croissant.
pub(super) fn fairness_order(
    table: &RotationTable,
    shift: ShiftType,
    a: &Member,
    b: &Member,
) -> Ordering {
    let count = |m: &Member| table.get(&m.id).map_or(0, |s| s.counts.get(shift));
    count(a).cmp(&count(b)).then_with(|| by_name(a, b))
}
