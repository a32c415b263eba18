use crate::model::{
    ExemptionLevel, GenerationRun, LeavePeriod, Member, MemberId, Roster, ShiftType,
};
use crate::scheduler::EngineOptions;
use crate::summary::FairnessReport;
use anyhow::{bail, Context};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import des membres depuis CSV: header `name,exemption,is_admin[,id]`
pub fn import_members_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Member>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing name")?.trim();
        if name.is_empty() {
            bail!("invalid member row (empty name)");
        }
        let mut member = Member::new(name);
        if let Some(raw) = rec.get(1) {
            member.exemption = parse_exemption(raw.trim())
                .with_context(|| format!("invalid exemption for member {name}"))?;
        }
        if let Some(flag) = rec.get(2) {
            let flag = flag.trim();
            if !flag.is_empty() {
                member.is_admin = parse_bool(flag)
                    .with_context(|| format!("invalid is_admin value for member {name}"))?;
            }
        }
        if let Some(id) = rec.get(3) {
            let id = id.trim();
            if !id.is_empty() {
                member = member.with_id(MemberId::new(id));
            }
        }
        out.push(member);
    }
    Ok(out)
}

/// Import des congés: header `member,start,end` (nom du membre, dates ISO incluses)
pub fn import_leaves_csv<P: AsRef<Path>>(
    path: P,
    members: &[Member],
) -> anyhow::Result<Vec<LeavePeriod>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let name = rec.get(0).context("missing member")?.trim();
        let member = members
            .iter()
            .find(|m| m.name == name)
            .with_context(|| format!("unknown member in leave file: {name}"))?;
        let start = parse_date(rec.get(1).context("missing start")?.trim())?;
        let end = parse_date(rec.get(2).context("missing end")?.trim())?;
        let leave = LeavePeriod::new(member.id.clone(), start, end)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid leave for member {name}"))?;
        out.push(leave);
    }
    Ok(out)
}

/// Charge un roster complet ; le fichier de congés est optionnel.
pub fn load_roster<P: AsRef<Path>>(members: P, leaves: Option<&Path>) -> anyhow::Result<Roster> {
    let members = import_members_csv(members)?;
    let leaves = match leaves {
        Some(path) if path.exists() => import_leaves_csv(path, &members)?,
        _ => Vec::new(),
    };
    Ok(Roster { members, leaves })
}

pub fn parse_date(raw: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").with_context(|| format!("invalid date: {raw}"))
}

fn parse_bool(s: &str) -> anyhow::Result<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "oui" => Ok(true),
        "false" | "0" | "no" | "n" | "non" => Ok(false),
        _ => bail!("expected boolean"),
    }
}

pub fn parse_exemption(s: &str) -> anyhow::Result<ExemptionLevel> {
    match s.to_ascii_lowercase().as_str() {
        "" | "none" => Ok(ExemptionLevel::None),
        "evening" | "evening_exempt" => Ok(ExemptionLevel::EveningExempt),
        "night" | "night_and_rest_exempt" => Ok(ExemptionLevel::NightAndRestExempt),
        other => bail!("unknown exemption level: {other}"),
    }
}

/// Export CSV des semaines:
/// header `generation_id,week_start,week_end,morning,evening,night,night_off`
pub fn export_weeks_csv<P: AsRef<Path>>(path: P, run: &GenerationRun) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record([
        "generation_id",
        "week_start",
        "week_end",
        "morning",
        "evening",
        "night",
        "night_off",
    ])?;
    for week in &run.weeks {
        let start = week.week_start.format("%Y-%m-%d").to_string();
        let end = week.week_end.format("%Y-%m-%d").to_string();
        let morning = week.morning.join(", ");
        w.write_record([
            week.generation_id.as_str(),
            start.as_str(),
            end.as_str(),
            morning.as_str(),
            week.evening.as_deref().unwrap_or(""),
            week.night.as_deref().unwrap_or(""),
            week.night_off.as_deref().unwrap_or(""),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Export JSON du run (jolie mise en forme)
pub fn export_run_json<P: AsRef<Path>>(path: P, run: &GenerationRun) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(run)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des congés: header `member,start,end`
pub fn export_leaves_csv<P: AsRef<Path>>(path: P, roster: &Roster) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["member", "start", "end"])?;
    for leave in &roster.leaves {
        let name = roster
            .find_member_by_id(&leave.member_id)
            .map(|m| m.name.as_str())
            .with_context(|| format!("leave for unknown member {}", leave.member_id.as_str()))?;
        let start = leave.start.format("%Y-%m-%d").to_string();
        let end = leave.end.format("%Y-%m-%d").to_string();
        w.write_record([name, start.as_str(), end.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

/// Export CSV du bilan d'équité:
/// header `name,admin,exemption,<shift>,<shift>_expected...`
pub fn export_summary_csv<P: AsRef<Path>>(path: P, report: &FairnessReport) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    let mut header = vec!["name".to_string(), "admin".into(), "exemption".into()];
    for shift in ShiftType::ALL {
        header.push(shift.as_str().to_string());
        header.push(format!("{}_expected", shift.as_str()));
    }
    w.write_record(&header)?;

    let mut buf = itoa::Buffer::new();
    for row in &report.rows {
        let mut record = vec![
            row.name.clone(),
            row.is_admin.to_string(),
            row.exemption.as_str().to_string(),
        ];
        for shift in ShiftType::ALL {
            record.push(buf.format(row.actual.get(shift)).to_string());
            record.push(format!("{:.2}", row.expected.get(shift)));
        }
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

/// Charge des options moteur depuis un JSON (champs absents = valeurs par défaut).
pub fn load_options_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<EngineOptions> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading options {}", path.display()))?;
    let opts: EngineOptions = serde_json::from_slice(&data)
        .with_context(|| format!("parsing options {}", path.display()))?;
    Ok(opts)
}
