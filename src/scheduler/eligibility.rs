use super::RotaError;
use crate::model::{LeavePeriod, Member};
use chrono::NaiveDate;

/// Membres sans aucun congé chevauchant [week_start, week_end].
pub fn eligible_members<'a>(
    members: &'a [Member],
    leaves: &[LeavePeriod],
    week_start: NaiveDate,
    week_end: NaiveDate,
) -> Vec<&'a Member> {
    members
        .iter()
        .filter(|m| {
            let blocking = leaves
                .iter()
                .find(|l| l.member_id == m.id && l.overlaps(week_start, week_end));
            if let Some(leave) = blocking {
                tracing::debug!(
                    member = %m.name,
                    leave_start = %leave.start,
                    leave_end = %leave.end,
                    "excluded from week (on leave)"
                );
            }
            blocking.is_none()
        })
        .collect()
}

/// Séparation administrateurs / pool de rotation.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    pub admins: Vec<&'a Member>,
    pub pool: Vec<&'a Member>,
}

pub fn partition<'a>(
    members: &[&'a Member],
    minimum_pool_size: usize,
) -> Result<Partition<'a>, RotaError> {
    let (admins, pool): (Vec<&Member>, Vec<&Member>) =
        members.iter().copied().partition(|m| m.is_admin);
    if admins.is_empty() {
        return Err(RotaError::Configuration(
            "no admin member available: daytime coverage cannot be guaranteed".into(),
        ));
    }
    if pool.len() < minimum_pool_size {
        return Err(RotaError::Configuration(format!(
            "rotation pool has {} member(s), at least {} required",
            pool.len(),
            minimum_pool_size
        )));
    }
    Ok(Partition { admins, pool })
}
