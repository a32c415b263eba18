#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use rota_engine::{
    fairness_report, io,
    model::{GenerationId, GenerationRun, LeavePeriod, Roster},
    scheduler::{EngineOptions, LeaveCyclePolicy, RotaEngine, RunRequest},
    storage::JsonLedger,
};
use std::path::{Path, PathBuf};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de génération de planning hebdomadaire (journée / soirée / nuit / repos)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du registre des plannings
    #[arg(long, global = true, default_value = "rota.json")]
    ledger: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Freeze,
    Advance,
}

impl From<PolicyArg> for LeaveCyclePolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Freeze => LeaveCyclePolicy::Freeze,
            PolicyArg::Advance => LeaveCyclePolicy::Advance,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer (ou régénérer) un planning multi-semaines
    Generate {
        /// CSV `name,exemption,is_admin[,id]`
        #[arg(long)]
        members: PathBuf,
        /// CSV `member,start,end`
        #[arg(long)]
        leaves: Option<PathBuf>,
        /// Premier jour (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        #[arg(long)]
        weeks: u32,
        /// Membre forcé en repos la première semaine
        #[arg(long)]
        first_rest: Option<String>,
        /// Identifiant du run (aléatoire si absent)
        #[arg(long)]
        generation_id: Option<String>,
        /// Options moteur (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        week_days: Option<u32>,
        #[arg(long)]
        min_pool: Option<usize>,
        #[arg(long)]
        morning_floor: Option<usize>,
        #[arg(long, value_enum)]
        leave_policy: Option<PolicyArg>,
    },

    /// Afficher et optionnellement exporter un planning
    List {
        #[arg(long)]
        generation_id: String,
        #[arg(long)]
        out_csv: Option<PathBuf>,
        #[arg(long)]
        out_json: Option<PathBuf>,
    },

    /// Bilan d'équité réel / théorique par membre
    Summary {
        #[arg(long)]
        generation_id: String,
        #[arg(long)]
        members: PathBuf,
        #[arg(long)]
        out_csv: Option<PathBuf>,
    },

    /// Supprimer un planning
    Delete {
        #[arg(long)]
        generation_id: String,
    },

    /// Lister les plannings du registre
    Runs,

    /// Poser un congé (contrôle des chevauchements)
    AddLeave {
        #[arg(long)]
        members: PathBuf,
        #[arg(long)]
        leaves: PathBuf,
        #[arg(long)]
        member: String,
        #[arg(long)]
        start: String,
        #[arg(long)]
        end: String,
    },

    /// Congés en cours ou à venir
    OnLeave {
        #[arg(long)]
        members: PathBuf,
        #[arg(long)]
        leaves: PathBuf,
        /// Date de référence (aujourd'hui par défaut)
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Generate {
            members,
            leaves,
            start,
            weeks,
            first_rest,
            generation_id,
            config,
            week_days,
            min_pool,
            morning_floor,
            leave_policy,
        } => {
            let roster = io::load_roster(&members, leaves.as_deref())?;
            let mut opts = match config {
                Some(path) => io::load_options_from_file(path)?,
                None => EngineOptions::default(),
            };
            if let Some(days) = week_days {
                opts.week_duration_days = days;
            }
            if let Some(n) = min_pool {
                opts.minimum_pool_size = n;
            }
            if let Some(n) = morning_floor {
                opts.morning_floor = n;
            }
            if let Some(policy) = leave_policy {
                opts.leave_policy = policy.into();
            }

            let id = generation_id
                .map(GenerationId::new)
                .unwrap_or_else(GenerationId::random);
            let mut request = RunRequest::new(id, io::parse_date(&start)?, weeks);
            if let Some(name) = first_rest {
                let member = roster
                    .find_member_by_name(&name)
                    .with_context(|| format!("unknown member: {name}"))?;
                request = request.with_first_rest(member.id.clone());
            }

            let engine = RotaEngine::new(JsonLedger::open(&cli.ledger)?, opts);
            let run = engine.generate(&roster, &request)?;
            print_run(&run);
            println!(
                "Generated {} week(s) for generation {}",
                run.weeks.len(),
                run.generation_id
            );
            0
        }
        Commands::List {
            generation_id,
            out_csv,
            out_json,
        } => match load_run(&cli.ledger, &generation_id)? {
            Some(run) => {
                if let Some(path) = out_csv {
                    io::export_weeks_csv(path, &run)?;
                }
                if let Some(path) = out_json {
                    io::export_run_json(path, &run)?;
                }
                print_run(&run);
                0
            }
            None => {
                eprintln!("No rota stored for generation {generation_id}");
                2
            }
        },
        Commands::Summary {
            generation_id,
            members,
            out_csv,
        } => match load_run(&cli.ledger, &generation_id)? {
            Some(run) => {
                let roster = Roster::new(io::import_members_csv(members)?);
                let report = fairness_report(&roster, &run);
                if let Some(path) = out_csv {
                    io::export_summary_csv(path, &report)?;
                }
                println!("{} week(s)", report.weeks);
                for row in &report.rows {
                    println!(
                        "{:<20} morning {:>3} ({:>5.2}) | evening {:>3} ({:>5.2}) | night {:>3} ({:>5.2}) | night_off {:>3} ({:>5.2})",
                        row.name,
                        row.actual.morning,
                        row.expected.morning,
                        row.actual.evening,
                        row.expected.evening,
                        row.actual.night,
                        row.expected.night,
                        row.actual.night_off,
                        row.expected.night_off,
                    );
                }
                0
            }
            None => {
                eprintln!("No rota stored for generation {generation_id}");
                2
            }
        },
        Commands::Delete { generation_id } => {
            let engine = RotaEngine::new(JsonLedger::open(&cli.ledger)?, EngineOptions::default());
            if engine.delete(&GenerationId::new(&generation_id))? {
                println!("Deleted generation {generation_id}");
                0
            } else {
                eprintln!("No rota stored for generation {generation_id}");
                2
            }
        }
        Commands::Runs => {
            let engine = RotaEngine::new(JsonLedger::open(&cli.ledger)?, EngineOptions::default());
            for id in engine.run_ids()? {
                println!("{id}");
            }
            0
        }
        Commands::AddLeave {
            members,
            leaves,
            member,
            start,
            end,
        } => {
            let mut roster = io::load_roster(&members, Some(leaves.as_path()))?;
            let member_id = roster
                .find_member_by_name(&member)
                .map(|m| m.id.clone())
                .with_context(|| format!("unknown member: {member}"))?;
            let leave =
                LeavePeriod::new(member_id, io::parse_date(&start)?, io::parse_date(&end)?)
                    .map_err(anyhow::Error::msg)?;
            let days = leave.days_taken();
            roster.add_leave(leave)?;
            io::export_leaves_csv(&leaves, &roster)?;
            println!("Leave added for {member} ({days} day(s))");
            0
        }
        Commands::OnLeave {
            members,
            leaves,
            date,
        } => {
            let roster = io::load_roster(&members, Some(leaves.as_path()))?;
            let today = match date {
                Some(raw) => io::parse_date(&raw)?,
                None => Utc::now().date_naive(),
            };
            let ongoing = roster.leaves_ongoing(today);
            if ongoing.is_empty() {
                println!("Nobody on leave");
            }
            for leave in ongoing {
                let name = roster
                    .find_member_by_id(&leave.member_id)
                    .map(|m| m.name.as_str())
                    .unwrap_or("?");
                println!(
                    "{} | {} → {} | {} day(s), {} remaining",
                    name,
                    leave.start,
                    leave.end,
                    leave.days_taken(),
                    leave.days_remaining(today)
                );
            }
            0
        }
    };

    std::process::exit(code);
}

fn load_run(ledger: &Path, id: &str) -> Result<Option<GenerationRun>> {
    let engine = RotaEngine::new(JsonLedger::open(ledger)?, EngineOptions::default());
    Ok(engine.run(&GenerationId::new(id))?)
}

// impression compacte
fn print_run(run: &GenerationRun) {
    for week in &run.weeks {
        println!(
            "{} | morning: {} | evening: {} | night: {} | night_off: {}",
            week.range_label(),
            week.morning.join(", "),
            week.evening.as_deref().unwrap_or("-"),
            week.night.as_deref().unwrap_or("-"),
            week.night_off.as_deref().unwrap_or("-"),
        );
    }
}
