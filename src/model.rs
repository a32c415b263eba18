use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour Member
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour LeavePeriod
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeaveId(String);

impl LeaveId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant d'une génération (un run complet de planning).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GenerationId(String);

impl GenerationId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Les quatre créneaux hebdomadaires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    Morning,
    Evening,
    Night,
    NightOff,
}

impl ShiftType {
    pub const ALL: [ShiftType; 4] = [
        ShiftType::Morning,
        ShiftType::Evening,
        ShiftType::Night,
        ShiftType::NightOff,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftType::Morning => "morning",
            ShiftType::Evening => "evening",
            ShiftType::Night => "night",
            ShiftType::NightOff => "night_off",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cycle canonique d'un membre sans exemption.
pub const STANDARD_CYCLE: [ShiftType; 6] = [
    ShiftType::Morning,
    ShiftType::Night,
    ShiftType::NightOff,
    ShiftType::Morning,
    ShiftType::Evening,
    ShiftType::Morning,
];

/// Variante sans soirée : la position Evening redevient Morning.
pub const EVENING_EXEMPT_CYCLE: [ShiftType; 6] = [
    ShiftType::Morning,
    ShiftType::Night,
    ShiftType::NightOff,
    ShiftType::Morning,
    ShiftType::Morning,
    ShiftType::Morning,
];

/// Variante sans nuit ni repos : deux soirées par cycle.
pub const NIGHT_EXEMPT_CYCLE: [ShiftType; 6] = [
    ShiftType::Morning,
    ShiftType::Evening,
    ShiftType::Morning,
    ShiftType::Morning,
    ShiftType::Morning,
    ShiftType::Evening,
];

/// Position de NightOff dans le cycle canonique.
pub const NIGHT_OFF_INDEX: usize = 2;

/// Niveau d'exemption d'un membre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExemptionLevel {
    #[default]
    None,
    EveningExempt,
    NightAndRestExempt,
}

impl ExemptionLevel {
    /// Le membre peut-il tenir ce créneau ?
    pub fn permits(&self, shift: ShiftType) -> bool {
        match (self, shift) {
            (ExemptionLevel::EveningExempt, ShiftType::Evening) => false,
            (ExemptionLevel::NightAndRestExempt, ShiftType::Night | ShiftType::NightOff) => false,
            _ => true,
        }
    }

    pub fn cycle(&self) -> &'static [ShiftType] {
        match self {
            ExemptionLevel::None => &STANDARD_CYCLE,
            ExemptionLevel::EveningExempt => &EVENING_EXEMPT_CYCLE,
            ExemptionLevel::NightAndRestExempt => &NIGHT_EXEMPT_CYCLE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExemptionLevel::None => "none",
            ExemptionLevel::EveningExempt => "evening",
            ExemptionLevel::NightAndRestExempt => "night",
        }
    }
}

/// Membre de l'équipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default)]
    pub exemption: ExemptionLevel,
    #[serde(default)]
    pub is_admin: bool,
}

impl Member {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self {
            id: MemberId::random(),
            name: name.into(),
            exemption: ExemptionLevel::None,
            is_admin: false,
        }
    }

    /// Administrateur : toujours en journée, jamais dans la rotation.
    pub fn admin<N: Into<String>>(name: N) -> Self {
        Self {
            is_admin: true,
            ..Self::new(name)
        }
    }

    pub fn with_exemption(mut self, exemption: ExemptionLevel) -> Self {
        self.exemption = exemption;
        self
    }

    pub fn with_id(mut self, id: MemberId) -> Self {
        self.id = id;
        self
    }

    pub fn cycle(&self) -> &'static [ShiftType] {
        self.exemption.cycle()
    }
}

/// Période de congés, bornes incluses [start, end].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePeriod {
    pub id: LeaveId,
    pub member_id: MemberId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LeavePeriod {
    pub fn new(member_id: MemberId, start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if end < start {
            return Err("leave end must not be before start".to_string());
        }
        Ok(Self {
            id: LeaveId::random(),
            member_id,
            start,
            end,
        })
    }

    /// Intersection avec [start, end], bornes incluses des deux côtés.
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start <= end && self.end >= start
    }

    /// Nombre de jours posés (bornes incluses).
    pub fn days_taken(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end - today).num_days().max(0)
    }
}

/// Compteurs cumulés par type de créneau.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftCounts {
    pub morning: u32,
    pub evening: u32,
    pub night: u32,
    pub night_off: u32,
}

impl ShiftCounts {
    pub fn get(&self, shift: ShiftType) -> u32 {
        match shift {
            ShiftType::Morning => self.morning,
            ShiftType::Evening => self.evening,
            ShiftType::Night => self.night,
            ShiftType::NightOff => self.night_off,
        }
    }

    pub fn bump(&mut self, shift: ShiftType) {
        match shift {
            ShiftType::Morning => self.morning += 1,
            ShiftType::Evening => self.evening += 1,
            ShiftType::Night => self.night += 1,
            ShiftType::NightOff => self.night_off += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.morning + self.evening + self.night + self.night_off
    }
}

/// État de rotation d'un membre pour une génération donnée.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationState {
    pub generation_id: GenerationId,
    pub member_id: MemberId,
    pub member_name: String,
    pub cycle_index: usize,
    #[serde(default)]
    pub counts: ShiftCounts,
}

/// Table des états d'une génération, ordonnée par membre.
pub type RotationTable = BTreeMap<MemberId, RotationState>;

/// Affectation d'une semaine (immuable une fois écrite).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekAssignment {
    pub generation_id: GenerationId,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub morning: Vec<String>,
    pub evening: Option<String>,
    pub night: Option<String>,
    pub night_off: Option<String>,
}

impl WeekAssignment {
    /// Libellé `YYYY-MM-DD - YYYY-MM-DD`.
    pub fn range_label(&self) -> String {
        format!(
            "{} - {}",
            self.week_start.format("%Y-%m-%d"),
            self.week_end.format("%Y-%m-%d")
        )
    }

    /// Créneau tenu par `name` cette semaine, s'il apparaît.
    pub fn shift_of(&self, name: &str) -> Option<ShiftType> {
        if self.morning.iter().any(|m| m == name) {
            return Some(ShiftType::Morning);
        }
        [
            (ShiftType::Evening, &self.evening),
            (ShiftType::Night, &self.night),
            (ShiftType::NightOff, &self.night_off),
        ]
        .into_iter()
        .find(|(_, holder)| holder.as_deref() == Some(name))
        .map(|(shift, _)| shift)
    }
}

/// Run complet : semaines ordonnées + états finaux.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRun {
    pub generation_id: GenerationId,
    pub start_date: NaiveDate,
    pub week_duration_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_rest: Option<MemberId>,
    pub weeks: Vec<WeekAssignment>,
    pub states: Vec<RotationState>,
}

impl GenerationRun {
    pub fn state_of(&self, member: &MemberId) -> Option<&RotationState> {
        self.states.iter().find(|s| &s.member_id == member)
    }
}

/// Annuaire : membres + calendrier de congés.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Roster {
    pub members: Vec<Member>,
    #[serde(default)]
    pub leaves: Vec<LeavePeriod>,
}

impl Roster {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            members,
            leaves: Vec::new(),
        }
    }
    pub fn find_member_by_name<'a>(&'a self, name: &str) -> Option<&'a Member> {
        self.members.iter().find(|m| m.name == name)
    }
    pub fn find_member_by_id<'a>(&'a self, id: &MemberId) -> Option<&'a Member> {
        self.members.iter().find(|m| &m.id == id)
    }
    pub fn leaves_of<'a>(&'a self, id: &'a MemberId) -> impl Iterator<Item = &'a LeavePeriod> + 'a {
        self.leaves.iter().filter(move |l| &l.member_id == id)
    }
}
