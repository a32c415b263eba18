#![forbid(unsafe_code)]
use chrono::NaiveDate;
use rota_engine::{
    scheduler::plan_run, EngineOptions, ExemptionLevel, GenerationId, GenerationRun,
    LeaveCyclePolicy, LeavePeriod, Member, Roster, RotaError, RunRequest, ShiftType,
};
use std::collections::HashSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn six_pack() -> Roster {
    let mut members = vec![Member::admin("Admin")];
    members.extend(
        ["Alice", "Bob", "Charlie", "Diana", "Eve", "Frank"]
            .iter()
            .map(|n| Member::new(*n)),
    );
    Roster::new(members)
}

fn request(weeks: u32) -> RunRequest {
    RunRequest::new(GenerationId::new("rota-2025"), date(2025, 9, 1), weeks)
}

fn member<'a>(roster: &'a Roster, name: &str) -> &'a Member {
    roster.find_member_by_name(name).unwrap()
}

/// Vérifie les invariants de chaque semaine d'un run.
fn assert_invariants(roster: &Roster, run: &GenerationRun) {
    let mut previous_night: Option<String> = None;
    for week in &run.weeks {
        let on_leave: HashSet<&str> = roster
            .members
            .iter()
            .filter(|m| {
                roster
                    .leaves_of(&m.id)
                    .any(|l| l.overlaps(week.week_start, week.week_end))
            })
            .map(|m| m.name.as_str())
            .collect();

        let mut seen = HashSet::new();
        let singles = [&week.evening, &week.night, &week.night_off];
        for name in week.morning.iter().chain(singles.into_iter().flatten()) {
            assert!(seen.insert(name.as_str()), "{name} holds two slots");
            assert!(!on_leave.contains(name.as_str()), "{name} is on leave");
        }

        for m in &roster.members {
            let shift = week.shift_of(&m.name);
            if on_leave.contains(m.name.as_str()) {
                assert_eq!(shift, None);
                continue;
            }
            let shift = shift.unwrap_or_else(|| panic!("{} has no slot", m.name));
            if m.is_admin {
                assert_eq!(shift, ShiftType::Morning, "admin {} off morning", m.name);
            }
            assert!(m.exemption.permits(shift), "{} exempt from {shift}", m.name);
        }

        assert!(week.morning.len() >= 2);
        assert!(week.evening.is_some());
        assert!(week.night.is_some());

        if let Some(prev) = &previous_night {
            if !on_leave.contains(prev.as_str()) {
                assert_eq!(week.night_off.as_ref(), Some(prev), "no rest after night");
            }
        }
        previous_night = week.night.clone();
    }
}

#[test]
fn full_cycle_twice_gives_equal_counts() {
    let roster = six_pack();
    let run = plan_run(&roster, &request(12), &EngineOptions::default()).unwrap();
    assert_eq!(run.weeks.len(), 12);
    assert_invariants(&roster, &run);

    for state in &run.states {
        assert_eq!(state.counts.morning, 6, "{}", state.member_name);
        assert_eq!(state.counts.evening, 2, "{}", state.member_name);
        assert_eq!(state.counts.night, 2, "{}", state.member_name);
        assert_eq!(state.counts.night_off, 2, "{}", state.member_name);
    }

    let first = &run.weeks[0];
    assert_eq!(first.morning, vec!["Admin", "Alice", "Diana", "Frank"]);
    assert_eq!(first.evening.as_deref(), Some("Eve"));
    assert_eq!(first.night.as_deref(), Some("Bob"));
    assert_eq!(first.night_off.as_deref(), Some("Charlie"));
    assert_eq!(run.weeks[11].week_end, date(2025, 11, 23));
}

#[test]
fn minimum_pool_with_exemptions_borrows_every_week() {
    let roster = Roster::new(vec![
        Member::admin("Yann"),
        Member::admin("Zoe"),
        Member::new("Ada"),
        Member::new("Eli").with_exemption(ExemptionLevel::EveningExempt),
        Member::new("Noa").with_exemption(ExemptionLevel::NightAndRestExempt),
    ]);
    let run = plan_run(&roster, &request(8), &EngineOptions::default()).unwrap();
    assert_invariants(&roster, &run);

    for week in &run.weeks {
        assert_eq!(week.morning, vec!["Yann", "Zoe"]);
        assert_eq!(week.evening.as_deref(), Some("Noa"));
        let night = week.night.as_deref().unwrap();
        let rest = week.night_off.as_deref().unwrap();
        assert!(["Ada", "Eli"].contains(&night));
        assert!(["Ada", "Eli"].contains(&rest));
        assert_ne!(night, rest);
    }
    let noa = run.state_of(&member(&roster, "Noa").id).unwrap();
    assert_eq!(noa.counts.evening, 8);
    assert_eq!(noa.counts.night + noa.counts.night_off, 0);
}

#[test]
fn empty_night_off_does_not_stop_the_run() {
    let rest_exempt = |n: &str| Member::new(n).with_exemption(ExemptionLevel::NightAndRestExempt);
    let roster = Roster::new(vec![
        Member::admin("Yann"),
        Member::admin("Zoe"),
        rest_exempt("Ada"),
        Member::new("Ben"),
        rest_exempt("Cid"),
        rest_exempt("Dan"),
        Member::new("Eva"),
    ]);
    let run = plan_run(&roster, &request(6), &EngineOptions::default()).unwrap();
    assert_invariants(&roster, &run);

    let first = &run.weeks[0];
    assert_eq!(first.night_off, None);
    assert_eq!(first.night.as_deref(), Some("Ben"));
    assert_eq!(first.evening.as_deref(), Some("Eva"));
    assert_eq!(first.morning, vec!["Ada", "Cid", "Dan", "Yann", "Zoe"]);

    let second = &run.weeks[1];
    assert_eq!(second.night_off.as_deref(), Some("Ben"));
    assert_eq!(second.night.as_deref(), Some("Eva"));
    assert_eq!(second.evening.as_deref(), Some("Ada"));
}

#[test]
fn member_on_leave_skips_one_week_then_returns() {
    let mut roster = six_pack();
    let diana = member(&roster, "Diana").id.clone();
    roster
        .add_leave(LeavePeriod::new(diana.clone(), date(2025, 9, 29), date(2025, 10, 5)).unwrap())
        .unwrap();

    let run = plan_run(&roster, &request(8), &EngineOptions::default()).unwrap();
    assert_invariants(&roster, &run);

    let week5 = &run.weeks[4];
    assert_eq!(week5.shift_of("Diana"), None);
    assert_eq!(week5.morning, vec!["Admin", "Bob", "Frank"]);
    assert_eq!(week5.evening.as_deref(), Some("Alice"));

    let week6 = &run.weeks[5];
    assert_eq!(week6.night.as_deref(), Some("Diana"));
    assert_eq!(run.weeks[6].night_off.as_deref(), Some("Diana"));

    let state = run.state_of(&diana).unwrap();
    assert_eq!(state.counts.total(), 7);
    assert_eq!(state.cycle_index, 4);
}

#[test]
fn advance_policy_consumes_the_missed_week() {
    let mut roster = six_pack();
    let diana = member(&roster, "Diana").id.clone();
    roster
        .add_leave(LeavePeriod::new(diana.clone(), date(2025, 9, 29), date(2025, 10, 5)).unwrap())
        .unwrap();
    let opts = EngineOptions {
        leave_policy: LeaveCyclePolicy::Advance,
        ..EngineOptions::default()
    };

    let run = plan_run(&roster, &request(8), &opts).unwrap();
    assert_invariants(&roster, &run);
    assert_eq!(run.weeks[5].shift_of("Diana"), Some(ShiftType::Morning));
    assert_eq!(run.weeks[5].night.as_deref(), Some("Alice"));
    assert_eq!(run.weeks[7].evening.as_deref(), Some("Diana"));

    let state = run.state_of(&diana).unwrap();
    assert_eq!(state.counts.total(), 7);
    assert_eq!(state.cycle_index, 5);
}

#[test]
fn leave_touching_last_day_excludes_whole_week() {
    let mut roster = six_pack();
    let diana = member(&roster, "Diana").id.clone();
    roster
        .add_leave(LeavePeriod::new(diana, date(2025, 10, 5), date(2025, 10, 5)).unwrap())
        .unwrap();
    let run = plan_run(&roster, &request(6), &EngineOptions::default()).unwrap();
    assert_eq!(run.weeks[4].shift_of("Diana"), None);
    assert_eq!(run.weeks[5].shift_of("Diana"), Some(ShiftType::Night));
}

#[test]
fn forced_first_rest_takes_night_off_in_week_one() {
    let roster = six_pack();
    let frank = member(&roster, "Frank").id.clone();
    let run = plan_run(
        &roster,
        &request(3).with_first_rest(frank.clone()),
        &EngineOptions::default(),
    )
    .unwrap();
    assert_invariants(&roster, &run);
    assert_eq!(run.weeks[0].night_off.as_deref(), Some("Frank"));
    assert_eq!(run.weeks[0].evening.as_deref(), Some("Diana"));
    assert_eq!(run.first_rest, Some(frank));
}

#[test]
fn night_exempt_first_rest_aborts_before_seeding() {
    let mut roster = six_pack();
    roster.members.push(Member::new("Gus").with_exemption(ExemptionLevel::NightAndRestExempt));
    let gus = member(&roster, "Gus").id.clone();
    let err = plan_run(
        &roster,
        &request(3).with_first_rest(gus),
        &EngineOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RotaError::Validation(_)));
}

#[test]
fn identical_inputs_give_identical_output() {
    // deux rosters construits séparément : identifiants différents, mêmes noms
    let mut a = six_pack();
    let mut b = six_pack();
    for roster in [&mut a, &mut b] {
        let eve = roster.find_member_by_name("Eve").unwrap().id.clone();
        roster
            .add_leave(LeavePeriod::new(eve, date(2025, 9, 10), date(2025, 9, 20)).unwrap())
            .unwrap();
    }
    let run_a = plan_run(&a, &request(10), &EngineOptions::default()).unwrap();
    let run_b = plan_run(&b, &request(10), &EngineOptions::default()).unwrap();
    assert_eq!(
        serde_json::to_string(&run_a.weeks).unwrap(),
        serde_json::to_string(&run_b.weeks).unwrap()
    );
}

#[test]
fn no_admin_is_a_configuration_error() {
    let roster = Roster::new(
        ["Alice", "Bob", "Charlie"]
            .iter()
            .map(|n| Member::new(*n))
            .collect(),
    );
    let err = plan_run(&roster, &request(1), &EngineOptions::default()).unwrap_err();
    assert!(matches!(err, RotaError::Configuration(_)));
}

#[test]
fn pool_shrinking_below_minimum_mid_run_fails() {
    let mut roster = Roster::new(vec![
        Member::admin("Admin"),
        Member::new("Alice"),
        Member::new("Bob"),
        Member::new("Charlie"),
    ]);
    let bob = member(&roster, "Bob").id.clone();
    roster
        .add_leave(LeavePeriod::new(bob, date(2025, 9, 15), date(2025, 9, 16)).unwrap())
        .unwrap();
    let opts = EngineOptions {
        morning_floor: 1,
        ..EngineOptions::default()
    };
    let err = plan_run(&roster, &request(4), &opts).unwrap_err();
    assert!(matches!(err, RotaError::Configuration(_)));
}

#[test]
fn custom_week_length_shifts_windows() {
    let roster = six_pack();
    let opts = EngineOptions {
        week_duration_days: 14,
        ..EngineOptions::default()
    };
    let run = plan_run(&roster, &request(2), &opts).unwrap();
    assert_eq!(run.weeks[0].week_end, date(2025, 9, 14));
    assert_eq!(run.weeks[1].week_start, date(2025, 9, 15));
    assert_eq!(run.week_duration_days, 14);
    insta::assert_snapshot!(run.weeks[1].range_label(), @"2025-09-15 - 2025-09-28");
}
