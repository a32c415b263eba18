//! Tenue du calendrier de congés d'un `Roster`.

use crate::model::{LeaveId, LeavePeriod, MemberId, Roster};
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LeaveError {
    #[error("leave end must not be before start")]
    InvertedRange,
    #[error("unknown member: {0}")]
    UnknownMember(String),
    #[error("unknown leave: {0}")]
    UnknownLeave(String),
    #[error("leave conflicts with an existing leave from {start} to {end}")]
    Overlap { start: NaiveDate, end: NaiveDate },
}

impl Roster {
    /// Ajoute un congé après contrôle du membre et des chevauchements.
    pub fn add_leave(&mut self, leave: LeavePeriod) -> Result<LeaveId, LeaveError> {
        if leave.end < leave.start {
            return Err(LeaveError::InvertedRange);
        }
        if self.find_member_by_id(&leave.member_id).is_none() {
            return Err(LeaveError::UnknownMember(leave.member_id.as_str().to_string()));
        }
        self.check_overlap(&leave.member_id, leave.start, leave.end, None)?;
        let id = leave.id.clone();
        self.leaves.push(leave);
        Ok(id)
    }

    pub fn edit_leave(
        &mut self,
        id: &LeaveId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), LeaveError> {
        if end < start {
            return Err(LeaveError::InvertedRange);
        }
        let member = self
            .leaves
            .iter()
            .find(|l| &l.id == id)
            .map(|l| l.member_id.clone())
            .ok_or_else(|| LeaveError::UnknownLeave(id.as_str().to_string()))?;
        self.check_overlap(&member, start, end, Some(id))?;
        if let Some(leave) = self.leaves.iter_mut().find(|l| &l.id == id) {
            leave.start = start;
            leave.end = end;
        }
        Ok(())
    }

    pub fn remove_leave(&mut self, id: &LeaveId) -> Result<LeavePeriod, LeaveError> {
        let pos = self
            .leaves
            .iter()
            .position(|l| &l.id == id)
            .ok_or_else(|| LeaveError::UnknownLeave(id.as_str().to_string()))?;
        Ok(self.leaves.remove(pos))
    }

    /// Congés non terminés à la date donnée, triés par début.
    pub fn leaves_ongoing(&self, today: NaiveDate) -> Vec<&LeavePeriod> {
        let mut out: Vec<&LeavePeriod> = self.leaves.iter().filter(|l| l.end >= today).collect();
        out.sort_by_key(|l| (l.start, l.end));
        out
    }

    fn check_overlap(
        &self,
        member: &MemberId,
        start: NaiveDate,
        end: NaiveDate,
        ignore: Option<&LeaveId>,
    ) -> Result<(), LeaveError> {
        let clash = self
            .leaves_of(member)
            .filter(|l| Some(&l.id) != ignore)
            .find(|l| l.overlaps(start, end));
        match clash {
            Some(l) => Err(LeaveError::Overlap {
                start: l.start,
                end: l.end,
            }),
            None => Ok(()),
        }
    }
}
