use crate::model::{ExemptionLevel, GenerationRun, Member, Roster, ShiftCounts, ShiftType};

/// Nombre théorique de créneaux par type sur un run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExpectedCounts {
    pub morning: f64,
    pub evening: f64,
    pub night: f64,
    pub night_off: f64,
}

impl ExpectedCounts {
    pub fn get(&self, shift: ShiftType) -> f64 {
        match shift {
            ShiftType::Morning => self.morning,
            ShiftType::Evening => self.evening,
            ShiftType::Night => self.night,
            ShiftType::NightOff => self.night_off,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FairnessRow {
    pub name: String,
    pub is_admin: bool,
    pub exemption: ExemptionLevel,
    pub actual: ShiftCounts,
    pub expected: ExpectedCounts,
}

impl FairnessRow {
    /// Écart réel - théorique pour `shift`.
    pub fn deviation(&self, shift: ShiftType) -> f64 {
        f64::from(self.actual.get(shift)) - self.expected.get(shift)
    }
}

/// Bilan d'équité d'un run, une ligne par membre du roster.
#[derive(Debug, Clone, PartialEq)]
pub struct FairnessReport {
    pub weeks: usize,
    pub rows: Vec<FairnessRow>,
}

impl FairnessReport {
    /// Plus grand écart absolu observé, tous membres et créneaux confondus.
    pub fn max_deviation(&self) -> f64 {
        self.rows
            .iter()
            .flat_map(|row| ShiftType::ALL.iter().map(move |s| row.deviation(*s).abs()))
            .fold(0.0, f64::max)
    }
}

pub fn expected_counts(
    member: &Member,
    weeks: usize,
    evening_eligible: usize,
    night_eligible: usize,
) -> ExpectedCounts {
    let weeks = weeks as f64;
    if member.is_admin {
        return ExpectedCounts {
            morning: weeks,
            ..ExpectedCounts::default()
        };
    }
    let share = |eligible: usize| {
        if eligible == 0 {
            0.0
        } else {
            weeks / eligible as f64
        }
    };
    let evening = share(evening_eligible);
    let night = share(night_eligible);

    match member.exemption {
        ExemptionLevel::None => ExpectedCounts {
            morning: weeks - (evening + night + night),
            evening,
            night,
            night_off: night,
        },
        ExemptionLevel::EveningExempt => ExpectedCounts {
            morning: weeks - (night + night),
            evening: 0.0,
            night,
            night_off: night,
        },
        ExemptionLevel::NightAndRestExempt => ExpectedCounts {
            morning: weeks - evening,
            evening,
            night: 0.0,
            night_off: 0.0,
        },
    }
}

pub fn fairness_report(roster: &Roster, run: &GenerationRun) -> FairnessReport {
    let weeks = run.weeks.len();
    let pool: Vec<&Member> = roster.members.iter().filter(|m| !m.is_admin).collect();
    let evening_eligible = pool
        .iter()
        .filter(|m| m.exemption.permits(ShiftType::Evening))
        .count();
    let night_eligible = pool
        .iter()
        .filter(|m| m.exemption.permits(ShiftType::Night))
        .count();

    let rows = roster
        .members
        .iter()
        .map(|member| {
            let actual = match run.state_of(&member.id) {
                Some(state) => state.counts,
                None => counts_from_weeks(run, &member.name),
            };
            FairnessRow {
                name: member.name.clone(),
                is_admin: member.is_admin,
                exemption: member.exemption,
                actual,
                expected: expected_counts(member, weeks, evening_eligible, night_eligible),
            }
        })
        .collect();

    FairnessReport { weeks, rows }
}

fn counts_from_weeks(run: &GenerationRun, name: &str) -> ShiftCounts {
    let mut counts = ShiftCounts::default();
    for shift in run.weeks.iter().filter_map(|w| w.shift_of(name)) {
        counts.bump(shift);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_counts_follow_exemptions() {
        let standard = expected_counts(&Member::new("A"), 12, 6, 6);
        assert_eq!(standard.evening, 2.0);
        assert_eq!(standard.night, 2.0);
        assert_eq!(standard.night_off, 2.0);
        assert_eq!(standard.morning, 6.0);

        let no_evening = Member::new("B").with_exemption(ExemptionLevel::EveningExempt);
        let e = expected_counts(&no_evening, 12, 4, 6);
        assert_eq!(e.evening, 0.0);
        assert_eq!(e.morning, 8.0);

        let no_night = Member::new("C").with_exemption(ExemptionLevel::NightAndRestExempt);
        let n = expected_counts(&no_night, 12, 4, 0);
        assert_eq!(n.night, 0.0);
        assert_eq!(n.evening, 3.0);
        assert_eq!(n.morning, 9.0);

        let admin = expected_counts(&Member::admin("Z"), 5, 3, 3);
        assert_eq!(admin.morning, 5.0);
        assert_eq!(admin.evening, 0.0);
    }
}
