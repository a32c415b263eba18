use super::{eligibility, util, EngineOptions, RotaError};
use crate::model::{GenerationId, Member, MemberId, RotationTable, ShiftType, WeekAssignment};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Ordre de remplissage des créneaux uniques.
const FILL_ORDER: [ShiftType; 3] = [ShiftType::NightOff, ShiftType::Evening, ShiftType::Night];

/// Contexte d'une semaine à calculer.
#[derive(Debug, Clone, Copy)]
pub struct WeekContext<'a> {
    pub generation_id: &'a GenerationId,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    /// Titulaire de la nuit précédente (ou repos forcé en semaine 1).
    pub last_night: Option<&'a MemberId>,
}

/// Résultat d'une semaine : l'affectation et les titulaires à propager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekOutcome {
    pub assignment: WeekAssignment,
    pub night: Option<MemberId>,
    pub evening: Option<MemberId>,
}

/// Calcule une semaine et fait avancer `table`.
///
/// `table` n'est modifiée que si la semaine aboutit.
pub fn assign_week(
    eligible: &[&Member],
    table: &mut RotationTable,
    ctx: WeekContext<'_>,
    opts: &EngineOptions,
) -> Result<WeekOutcome, RotaError> {
    let split = eligibility::partition(eligible, opts.minimum_pool_size)?;

    let mut available: Vec<&Member> = split.pool.clone();
    available.sort_by(|a, b| util::by_name(a, b));

    let mut filled: BTreeMap<ShiftType, &Member> = BTreeMap::new();

    // repos obligatoire après une nuit
    if let Some(last) = ctx.last_night {
        if let Some(pos) = available.iter().position(|m| &m.id == last) {
            let member = available[pos];
            if member.exemption.permits(ShiftType::NightOff) {
                tracing::debug!(member = %member.name, "mandatory rest after night");
                filled.insert(ShiftType::NightOff, member);
                available.remove(pos);
            }
        }
    }

    let mut due: BTreeMap<ShiftType, Vec<&Member>> = BTreeMap::new();
    for member in &available {
        let state = table.get(&member.id).ok_or_else(|| {
            RotaError::IntegrityFailure(anyhow::anyhow!(
                "no rotation state for member {}",
                member.name
            ))
        })?;
        let cycle = member.cycle();
        let shift = cycle[state.cycle_index % cycle.len()];
        due.entry(shift).or_default().push(*member);
    }

    for shift in FILL_ORDER {
        if filled.contains_key(&shift) {
            continue;
        }
        let winner = pick(table, due.get(&shift), shift).or_else(|| {
            let borrowed = pick(table, due.get(&ShiftType::Morning), shift);
            if let Some(m) = borrowed {
                tracing::debug!(member = %m.name, %shift, "nobody due, borrowing from morning");
            }
            borrowed
        });

        let Some(winner) = winner else {
            if shift == ShiftType::NightOff {
                tracing::debug!("no eligible candidate for night_off, left empty");
                continue;
            }
            return Err(RotaError::constraint(
                ctx.week_start,
                format!("no eligible candidate for {shift}"),
            ));
        };

        tracing::debug!(member = %winner.name, %shift, "assigned");
        filled.insert(shift, winner);
        available.retain(|m| m.id != winner.id);
        for pool in due.values_mut() {
            pool.retain(|m| m.id != winner.id);
        }
    }

    let mut morning: Vec<&Member> = split.admins.iter().copied().chain(available).collect();
    morning.sort_by(|a, b| util::by_name(a, b));
    if morning.len() < opts.morning_floor {
        return Err(RotaError::constraint(
            ctx.week_start,
            format!(
                "morning has {} member(s), at least {} required",
                morning.len(),
                opts.morning_floor
            ),
        ));
    }

    for member in &split.pool {
        let shift = filled
            .iter()
            .find(|(_, m)| m.id == member.id)
            .map_or(ShiftType::Morning, |(s, _)| *s);
        if let Some(state) = table.get_mut(&member.id) {
            state.counts.bump(shift);
            state.cycle_index = (state.cycle_index + 1) % member.cycle().len();
        }
    }

    let holder = |shift: ShiftType| filled.get(&shift).copied();
    let name_of = |shift: ShiftType| holder(shift).map(|m| m.name.clone());
    let assignment = WeekAssignment {
        generation_id: ctx.generation_id.clone(),
        week_start: ctx.week_start,
        week_end: ctx.week_end,
        morning: morning.iter().map(|m| m.name.clone()).collect(),
        evening: name_of(ShiftType::Evening),
        night: name_of(ShiftType::Night),
        night_off: name_of(ShiftType::NightOff),
    };

    tracing::info!(
        week = %assignment.range_label(),
        morning = assignment.morning.len(),
        evening = assignment.evening.as_deref().unwrap_or("-"),
        night = assignment.night.as_deref().unwrap_or("-"),
        night_off = assignment.night_off.as_deref().unwrap_or("-"),
        "week generated"
    );

    Ok(WeekOutcome {
        night: holder(ShiftType::Night).map(|m| m.id.clone()),
        evening: holder(ShiftType::Evening).map(|m| m.id.clone()),
        assignment,
    })
}

/// Meilleur candidat non exempté : compteur le plus bas, puis nom.
fn pick<'a>(
    table: &RotationTable,
    candidates: Option<&Vec<&'a Member>>,
    shift: ShiftType,
) -> Option<&'a Member> {
    candidates?
        .iter()
        .copied()
        .filter(|m| m.exemption.permits(shift))
        .min_by(|a, b| util::fairness_order(table, shift, a, b))
}
