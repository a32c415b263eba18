use super::weekly::{self, WeekContext};
use super::{eligibility, seed, util, EngineOptions, LeaveCyclePolicy, RotaError, RunRequest};
use crate::model::{GenerationRun, Member, MemberId, Roster, RotationState, RotationTable};
use std::collections::HashSet;

/// Calcule un run complet en mémoire, sans rien persister.
///
/// Toutes les semaines et tous les états sont accumulés puis rendus
/// ensemble : la première erreur interrompt le run et rien n'est rendu.
pub fn plan_run(
    roster: &Roster,
    request: &RunRequest,
    opts: &EngineOptions,
) -> Result<GenerationRun, RotaError> {
    opts.validate()?;
    if request.week_count == 0 {
        return Err(RotaError::Validation("week count must be at least 1".into()));
    }
    check_unique_names(&roster.members)?;

    let everyone: Vec<&Member> = roster.members.iter().collect();
    let full = eligibility::partition(&everyone, opts.minimum_pool_size)?;

    let first_rest = request
        .first_rest
        .as_ref()
        .map(|id| {
            roster.find_member_by_id(id).ok_or_else(|| {
                RotaError::Validation(format!("unknown first rest member: {}", id.as_str()))
            })
        })
        .transpose()?;

    tracing::info!(
        generation = %request.generation_id,
        start = %request.start_date,
        weeks = request.week_count,
        pool = full.pool.len(),
        admins = full.admins.len(),
        "starting rota generation"
    );

    let mut table = seed::seed_rotation(&request.generation_id, &full.pool, first_rest)?;
    let mut weeks = Vec::with_capacity(request.week_count as usize);
    let mut last_night: Option<MemberId> = first_rest.map(|m| m.id.clone());

    for index in 0..request.week_count {
        let (week_start, week_end) =
            util::week_window(request.start_date, index, opts.week_duration_days)?;
        let eligible =
            eligibility::eligible_members(&roster.members, &roster.leaves, week_start, week_end);

        let ctx = WeekContext {
            generation_id: &request.generation_id,
            week_start,
            week_end,
            last_night: last_night.as_ref(),
        };
        let outcome = weekly::assign_week(&eligible, &mut table, ctx, opts)?;

        if opts.leave_policy == LeaveCyclePolicy::Advance {
            advance_absent(&mut table, &full.pool, &eligible);
        }

        last_night = outcome.night;
        weeks.push(outcome.assignment);
    }

    Ok(GenerationRun {
        generation_id: request.generation_id.clone(),
        start_date: request.start_date,
        week_duration_days: opts.week_duration_days,
        first_rest: request.first_rest.clone(),
        weeks,
        states: sorted_states(table),
    })
}

fn check_unique_names(members: &[Member]) -> Result<(), RotaError> {
    let mut seen = HashSet::new();
    for m in members {
        if !seen.insert(m.name.as_str()) {
            return Err(RotaError::Configuration(format!(
                "duplicate member name: {}",
                m.name
            )));
        }
    }
    Ok(())
}

/// La semaine manquée compte comme consommée pour les absents.
fn advance_absent(table: &mut RotationTable, pool: &[&Member], eligible: &[&Member]) {
    for member in pool {
        if eligible.iter().any(|e| e.id == member.id) {
            continue;
        }
        if let Some(state) = table.get_mut(&member.id) {
            state.cycle_index = (state.cycle_index + 1) % member.cycle().len();
            tracing::debug!(member = %member.name, "absent, cycle advanced");
        }
    }
}

fn sorted_states(table: RotationTable) -> Vec<RotationState> {
    let mut states: Vec<_> = table.into_values().collect();
    states.sort_by(|a, b| {
        a.member_name
            .cmp(&b.member_name)
            .then_with(|| a.member_id.cmp(&b.member_id))
    });
    states
}
