use super::{util, RotaError};
use crate::model::{
    ExemptionLevel, GenerationId, Member, RotationState, RotationTable, ShiftCounts,
    NIGHT_OFF_INDEX, STANDARD_CYCLE,
};

/// Construit la table initiale d'une génération.
///
/// Le membre `first_rest`, s'il est donné, est placé sur la position NightOff ;
/// les autres prennent, par ordre de nom, les positions libres du cycle
/// canonique dans l'ordre. Au-delà de la longueur du cycle, on repart pour
/// un nouveau tour. Tous les compteurs partent de zéro.
pub(super) fn seed_rotation(
    generation_id: &GenerationId,
    pool: &[&Member],
    first_rest: Option<&Member>,
) -> Result<RotationTable, RotaError> {
    let cycle_len = STANDARD_CYCLE.len();
    let mut claimed = vec![false; cycle_len];
    let mut table = RotationTable::new();

    if let Some(forced) = first_rest {
        if forced.is_admin || !pool.iter().any(|m| m.id == forced.id) {
            return Err(RotaError::Validation(format!(
                "first rest member {} is not in the rotation pool",
                forced.name
            )));
        }
        if forced.exemption == ExemptionLevel::NightAndRestExempt {
            return Err(RotaError::Validation(format!(
                "member {} is night-exempt and cannot take the first night off",
                forced.name
            )));
        }
        claimed[NIGHT_OFF_INDEX] = true;
        table.insert(forced.id.clone(), initial_state(generation_id, forced, NIGHT_OFF_INDEX));
        tracing::debug!(member = %forced.name, index = NIGHT_OFF_INDEX, "forced first rest");
    }

    let mut remaining: Vec<&Member> = pool
        .iter()
        .copied()
        .filter(|m| !table.contains_key(&m.id))
        .collect();
    remaining.sort_by(|a, b| util::by_name(a, b));

    let mut cursor = 0usize;
    for member in remaining {
        if claimed.iter().all(|c| *c) {
            claimed.fill(false);
        }
        while claimed[cursor] {
            cursor = (cursor + 1) % cycle_len;
        }
        claimed[cursor] = true;
        let index = cursor % member.cycle().len();
        table.insert(member.id.clone(), initial_state(generation_id, member, index));
        tracing::debug!(member = %member.name, index, "seeded cycle position");
        cursor = (cursor + 1) % cycle_len;
    }

    Ok(table)
}

fn initial_state(generation_id: &GenerationId, member: &Member, index: usize) -> RotationState {
    RotationState {
        generation_id: generation_id.clone(),
        member_id: member.id.clone(),
        member_name: member.name.clone(),
        cycle_index: index,
        counts: ShiftCounts::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(names: &[&str]) -> Vec<Member> {
        names.iter().map(|n| Member::new(*n)).collect()
    }

    fn index_of(table: &RotationTable, m: &Member) -> usize {
        table[&m.id].cycle_index
    }

    #[test]
    fn positions_follow_name_order() {
        let members = pool(&["Frank", "Alice", "Diana", "Bob", "Eve", "Charlie"]);
        let refs: Vec<&Member> = members.iter().collect();
        let table = seed_rotation(&GenerationId::new("g"), &refs, None).unwrap();
        let by_name = |n: &str| index_of(&table, members.iter().find(|m| m.name == n).unwrap());
        assert_eq!(by_name("Alice"), 0);
        assert_eq!(by_name("Bob"), 1);
        assert_eq!(by_name("Charlie"), 2);
        assert_eq!(by_name("Frank"), 5);
        assert!(table.values().all(|s| s.counts.total() == 0));
    }

    #[test]
    fn forced_first_rest_claims_night_off() {
        let members = pool(&["Alice", "Bob", "Charlie", "Diana"]);
        let refs: Vec<&Member> = members.iter().collect();
        let table = seed_rotation(&GenerationId::new("g"), &refs, Some(&members[3])).unwrap();
        assert_eq!(index_of(&table, &members[3]), NIGHT_OFF_INDEX);
        assert_eq!(index_of(&table, &members[0]), 0);
        assert_eq!(index_of(&table, &members[1]), 1);
        assert_eq!(index_of(&table, &members[2]), 3);
    }

    #[test]
    fn large_pool_wraps_around() {
        let names = ["A", "B", "C", "D", "E", "F", "G", "H"];
        let members = pool(&names);
        let refs: Vec<&Member> = members.iter().collect();
        let table = seed_rotation(&GenerationId::new("g"), &refs, None).unwrap();
        assert_eq!(index_of(&table, &members[6]), 0);
        assert_eq!(index_of(&table, &members[7]), 1);
    }

    #[test]
    fn night_exempt_first_rest_is_rejected() {
        let mut members = pool(&["Alice", "Bob", "Charlie"]);
        members[1] = members[1].clone().with_exemption(ExemptionLevel::NightAndRestExempt);
        let refs: Vec<&Member> = members.iter().collect();
        let err = seed_rotation(&GenerationId::new("g"), &refs, Some(&members[1])).unwrap_err();
        assert!(matches!(err, RotaError::Validation(_)));
    }

    #[test]
    fn admin_first_rest_is_rejected() {
        let members = pool(&["Alice", "Bob", "Charlie"]);
        let admin = Member::admin("Zed");
        let refs: Vec<&Member> = members.iter().collect();
        let err = seed_rotation(&GenerationId::new("g"), &refs, Some(&admin)).unwrap_err();
        assert!(matches!(err, RotaError::Validation(_)));
    }
}
