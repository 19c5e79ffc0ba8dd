//! Textual command layer: a command table built once at startup and a
//! dispatcher that turns one input line into one session operation.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use outbreak_core::game::error::SessionError;
use outbreak_core::game::lookup::{resolve_card, resolve_location, resolve_player};
use outbreak_core::game::serialization::{SessionSnapshot, SnapshotError};
use outbreak_core::game::session::{CrisisOutcome, InfectionOutcome, Session, SpreadEffect};
use outbreak_core::game::turns::PlayerId;
use outbreak_core::model::affliction::Affliction;
use outbreak_core::odds::forecast::Risk;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Infect,
    Crisis,
    Draw,
    Deal,
    Start,
    NextTurn,
    GiveCard,
    Discard,
    Rate,
    Level,
    Treat,
    Quarantine,
    RemoveQuarantine,
    Move,
    PlayerLocation,
    Odds,
    Cure,
    Urgent,
    Status,
    Save,
    Help,
    Quit,
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub kind: CommandKind,
    /// Canonical name first, then aliases.
    pub names: &'static [&'static str],
    pub usage: &'static str,
    pub summary: &'static str,
}

impl CommandSpec {
    pub fn name(&self) -> &'static str {
        self.names[0]
    }
}

const STANDARD_COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        kind: CommandKind::Infect,
        names: &["infect", "i"],
        usage: "infect <location>",
        summary: "draw a location from the spread deck",
    },
    CommandSpec {
        kind: CommandKind::Crisis,
        names: &["crisis", "epidemic", "e"],
        usage: "crisis <location>",
        summary: "resolve a crisis card on the location pulled from the bottom",
    },
    CommandSpec {
        kind: CommandKind::Draw,
        names: &["draw", "city-draw", "c"],
        usage: "draw <card>",
        summary: "current player draws a discovery card",
    },
    CommandSpec {
        kind: CommandKind::Deal,
        names: &["deal"],
        usage: "deal <card>",
        summary: "deal a starting card to the current player",
    },
    CommandSpec {
        kind: CommandKind::Start,
        names: &["start"],
        usage: "start",
        summary: "start the game once hands are dealt",
    },
    CommandSpec {
        kind: CommandKind::NextTurn,
        names: &["next-turn", "n"],
        usage: "next-turn",
        summary: "pass play to the next player",
    },
    CommandSpec {
        kind: CommandKind::GiveCard,
        names: &["give-card", "g"],
        usage: "give-card <player> <card>",
        summary: "current player hands a card to another player",
    },
    CommandSpec {
        kind: CommandKind::Discard,
        names: &["discard", "d"],
        usage: "discard <card>",
        summary: "current player discards a card",
    },
    CommandSpec {
        kind: CommandKind::Rate,
        names: &["rate", "infect-rate", "r"],
        usage: "rate <n>",
        summary: "set the crisis rate",
    },
    CommandSpec {
        kind: CommandKind::Level,
        names: &["level", "city-infect-level", "ci"],
        usage: "level <location> <n>",
        summary: "set a location's severity",
    },
    CommandSpec {
        kind: CommandKind::Treat,
        names: &["treat", "treat-disease", "t"],
        usage: "treat <location> [n]",
        summary: "remove severity from a location",
    },
    CommandSpec {
        kind: CommandKind::Quarantine,
        names: &["quarantine", "q"],
        usage: "quarantine <location>",
        summary: "quarantine a location",
    },
    CommandSpec {
        kind: CommandKind::RemoveQuarantine,
        names: &["remove-quarantine", "rq"],
        usage: "remove-quarantine <location>",
        summary: "lift a quarantine",
    },
    CommandSpec {
        kind: CommandKind::Move,
        names: &["move", "m"],
        usage: "move <location>",
        summary: "move the current player",
    },
    CommandSpec {
        kind: CommandKind::PlayerLocation,
        names: &["player-location", "pl"],
        usage: "player-location <player> <location>",
        summary: "place any player on a location",
    },
    CommandSpec {
        kind: CommandKind::Odds,
        names: &["odds", "p"],
        usage: "odds <location>",
        summary: "chance a location worsens this round",
    },
    CommandSpec {
        kind: CommandKind::Cure,
        names: &["cure", "cu"],
        usage: "cure <player> <affliction>",
        summary: "chance a player can still cure an affliction",
    },
    CommandSpec {
        kind: CommandKind::Urgent,
        names: &["urgent", "u"],
        usage: "urgent [n]",
        summary: "locations most in need of attention",
    },
    CommandSpec {
        kind: CommandKind::Status,
        names: &["status", "st"],
        usage: "status",
        summary: "turn, counters and afflicted locations",
    },
    CommandSpec {
        kind: CommandKind::Save,
        names: &["save", "s"],
        usage: "save",
        summary: "write a snapshot of the session",
    },
    CommandSpec {
        kind: CommandKind::Help,
        names: &["help", "h"],
        usage: "help",
        summary: "list commands",
    },
    CommandSpec {
        kind: CommandKind::Quit,
        names: &["quit"],
        usage: "quit",
        summary: "leave the console",
    },
];

/// Name-to-command mapping. Built once in `main` and lent to the dispatcher.
#[derive(Debug, Clone)]
pub struct CommandTable {
    specs: Vec<CommandSpec>,
    index: HashMap<&'static str, usize>,
}

impl CommandTable {
    pub fn standard() -> Self {
        let specs = STANDARD_COMMANDS.to_vec();
        let index = specs
            .iter()
            .enumerate()
            .flat_map(|(i, spec)| spec.names.iter().map(move |name| (*name, i)))
            .collect();
        Self { specs, index }
    }

    pub fn lookup(&self, word: &str) -> Option<&CommandSpec> {
        self.index
            .get(word.to_ascii_lowercase().as_str())
            .map(|&i| &self.specs[i])
    }

    pub fn specs(&self) -> &[CommandSpec] {
        &self.specs
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusReport {
    pub turn: Option<(usize, String)>,
    pub started: bool,
    pub crisis_rate: usize,
    pub overloads: usize,
    pub crisis_chance: f64,
    pub discovery_remaining: usize,
    pub spread_drawn: Vec<String>,
    pub afflicted: Vec<(String, u8, bool)>,
}

/// Outcome of one command. `Display` renders the console text.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Infected(InfectionOutcome),
    Crisis(CrisisOutcome),
    Drew {
        player: String,
        card: String,
        effect: Option<SpreadEffect>,
    },
    Dealt {
        player: String,
        card: String,
    },
    Started {
        first: String,
    },
    Turn {
        number: usize,
        player: String,
    },
    Gave {
        from: String,
        to: String,
        card: String,
    },
    Discarded {
        player: String,
        card: String,
    },
    Rate(usize),
    Severity {
        location: String,
        severity: u8,
    },
    Quarantined(String),
    QuarantineLifted(String),
    Moved {
        player: String,
        location: String,
    },
    Odds(Risk),
    Cure {
        player: String,
        affliction: Affliction,
        probability: f64,
    },
    Urgent(Vec<Risk>),
    Status(StatusReport),
    Saved(PathBuf),
    Help(Vec<String>),
    Quit,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Infected(outcome) => {
                write!(f, "Infected {}. ", outcome.location)?;
                write_effect(f, &outcome.location, &outcome.effect)
            }
            Reply::Crisis(outcome) => {
                write!(
                    f,
                    "Crisis in {}. Crisis rate is {}, {} spread cards reshuffled on top. ",
                    outcome.location, outcome.crisis_rate, outcome.reshuffled
                )?;
                write_effect(f, &outcome.location, &outcome.effect)
            }
            Reply::Drew {
                player,
                card,
                effect,
            } => {
                write!(f, "{player} drew {card} from the discovery deck")?;
                match effect {
                    Some(effect) => {
                        f.write_str(". ")?;
                        write_effect(f, card, effect)
                    }
                    None => Ok(()),
                }
            }
            Reply::Dealt { player, card } => write!(f, "{player} starts with {card}"),
            Reply::Started { first } => write!(f, "Game started. {first} goes first"),
            Reply::Turn { number, player } => write!(f, "Turn {number}: it is now {player}'s turn"),
            Reply::Gave { from, to, card } => write!(f, "{from} gave {card} to {to}"),
            Reply::Discarded { player, card } => write!(f, "{player} discarded {card}"),
            Reply::Rate(rate) => write!(f, "Crisis rate now {rate}"),
            Reply::Severity { location, severity } => {
                write!(f, "{location} is at severity {severity}")
            }
            Reply::Quarantined(location) => write!(f, "Quarantined {location}"),
            Reply::QuarantineLifted(location) => write!(f, "Removed quarantine from {location}"),
            Reply::Moved { player, location } => write!(f, "{player} moved to {location}"),
            Reply::Odds(risk) => {
                write!(
                    f,
                    "{}: {:.1}% chance to worsen (severity {})",
                    risk.location,
                    risk.probability * 100.0,
                    risk.severity
                )?;
                if risk.can_overload {
                    f.write_str(", can overload")?;
                }
                Ok(())
            }
            Reply::Cure {
                player,
                affliction,
                probability,
            } => write!(
                f,
                "{player} has a {:.1}% chance to cure {affliction}",
                probability * 100.0
            ),
            Reply::Urgent(risks) => {
                if risks.is_empty() {
                    return f.write_str("Nothing needs attention");
                }
                for (i, risk) in risks.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(
                        f,
                        "{:>2}. {:<20} severity {}  {:>5.1}%{}",
                        i + 1,
                        risk.location,
                        risk.severity,
                        risk.probability * 100.0,
                        if risk.can_overload { "  overload risk" } else { "" }
                    )?;
                }
                Ok(())
            }
            Reply::Status(status) => write_status(f, status),
            Reply::Saved(path) => write!(f, "Saved to {}", path.display()),
            Reply::Help(lines) => f.write_str(&lines.join("\n")),
            Reply::Quit => f.write_str("Bye"),
        }
    }
}

fn write_effect(f: &mut fmt::Formatter<'_>, location: &str, effect: &SpreadEffect) -> fmt::Result {
    match effect {
        SpreadEffect::Suppressed {
            quarantine_lifted: true,
        } => write!(f, "Quarantine absorbed it and was lifted from {location}"),
        SpreadEffect::Suppressed {
            quarantine_lifted: false,
        } => write!(f, "Quarantine held in {location}"),
        SpreadEffect::Raised { severity } => write!(f, "{location} is at severity {severity}"),
        SpreadEffect::Overloaded(report) => {
            write!(
                f,
                "OVERLOAD: {} (cascade depth {})",
                report.overloaded.join(", "),
                report.depth
            )?;
            if !report.quarantines_lifted.is_empty() {
                write!(
                    f,
                    "; quarantine lifted in {}",
                    report.quarantines_lifted.join(", ")
                )?;
            }
            Ok(())
        }
    }
}

fn write_status(f: &mut fmt::Formatter<'_>, status: &StatusReport) -> fmt::Result {
    match &status.turn {
        Some((number, player)) => write!(f, "Turn {number} ({player})")?,
        None => f.write_str("Waiting for players")?,
    }
    if !status.started {
        f.write_str(", not started")?;
    }
    writeln!(f)?;
    writeln!(
        f,
        "Crisis rate {}, overloads {}, next crisis {:.1}%, {} discovery cards left",
        status.crisis_rate,
        status.overloads,
        status.crisis_chance * 100.0,
        status.discovery_remaining
    )?;
    write!(f, "Spread drawn: ")?;
    if status.spread_drawn.is_empty() {
        f.write_str("none")?;
    } else {
        f.write_str(&status.spread_drawn.join(", "))?;
    }
    for (location, severity, quarantined) in &status.afflicted {
        writeln!(f)?;
        write!(f, "  {location}: {severity}")?;
        if *quarantined {
            f.write_str(" (quarantined)")?;
        }
    }
    Ok(())
}

/// Owns the session for the lifetime of the console and applies one command
/// per input line.
pub struct Dispatcher<'t> {
    table: &'t CommandTable,
    session: Session,
    save_dir: PathBuf,
    urgent_limit: usize,
}

impl<'t> Dispatcher<'t> {
    pub fn new(
        table: &'t CommandTable,
        session: Session,
        save_dir: impl Into<PathBuf>,
        urgent_limit: usize,
    ) -> Self {
        Self {
            table,
            session,
            save_dir: save_dir.into(),
            urgent_limit,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn execute(&mut self, line: &str) -> Result<Option<Reply>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(word) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();
        let table = self.table;
        let spec = table
            .lookup(word)
            .ok_or_else(|| CommandError::Unknown(word.to_string()))?;
        debug!(command = spec.name(), args = args.len(), "dispatching command");
        self.run(spec, &args).map(Some)
    }

    fn run(&mut self, spec: &CommandSpec, args: &[&str]) -> Result<Reply, CommandError> {
        let usage = CommandError::Usage(spec.usage);
        let reply = match spec.kind {
            CommandKind::Infect => {
                let location = resolve_location(&self.session, &rest(args, 0, usage)?)?;
                Reply::Infected(self.session.infect(&location)?)
            }
            CommandKind::Crisis => {
                let location = resolve_location(&self.session, &rest(args, 0, usage)?)?;
                Reply::Crisis(self.session.crisis(&location)?)
            }
            CommandKind::Draw => {
                let card = resolve_card(&self.session, &rest(args, 0, usage)?)?;
                let outcome = self.session.draw_card(&card)?;
                Reply::Drew {
                    player: self.player_name(outcome.player)?,
                    card: outcome.card.name().to_string(),
                    effect: outcome.effect,
                }
            }
            CommandKind::Deal => {
                let card = resolve_card(&self.session, &rest(args, 0, usage)?)?;
                let player = self.session.draw_starting_card(&card)?;
                Reply::Dealt {
                    player: self.player_name(player)?,
                    card,
                }
            }
            CommandKind::Start => {
                self.session.start_game()?;
                let first = self.session.turns().current_player()?;
                Reply::Started {
                    first: self.player_name(first)?,
                }
            }
            CommandKind::NextTurn => {
                let player = self.session.next_turn()?.player();
                Reply::Turn {
                    number: self.session.turns().turn_number(),
                    player: self.player_name(player)?,
                }
            }
            CommandKind::GiveCard => {
                let [target, ..] = args else {
                    return Err(usage);
                };
                let from = self.session.turns().current_player()?;
                let to = resolve_player(&self.session, target)?;
                let card = resolve_card(&self.session, &rest(args, 1, usage)?)?;
                self.session.give_card(from, to, &card)?;
                Reply::Gave {
                    from: self.player_name(from)?,
                    to: self.player_name(to)?,
                    card,
                }
            }
            CommandKind::Discard => {
                let card = resolve_card(&self.session, &rest(args, 0, usage)?)?;
                let player = self.session.turns().current_player()?;
                self.session.discard(player, &card)?;
                Reply::Discarded {
                    player: self.player_name(player)?,
                    card,
                }
            }
            CommandKind::Rate => {
                let [value] = args else {
                    return Err(usage);
                };
                let rate = parse_number(value, "crisis rate")?;
                self.session.set_crisis_rate(rate)?;
                Reply::Rate(rate)
            }
            CommandKind::Level => {
                let Some((value, location)) = args.split_last() else {
                    return Err(usage);
                };
                if location.is_empty() {
                    return Err(usage);
                }
                let severity = parse_number(value, "severity")?;
                let location = resolve_location(&self.session, &location.join(" "))?;
                self.session.set_severity(&location, severity)?;
                Reply::Severity { location, severity }
            }
            CommandKind::Treat => {
                let (location, levels) = match args.split_last() {
                    Some((value, location)) if !location.is_empty() && value.parse::<u8>().is_ok() => {
                        (location.join(" "), parse_number(value, "treatment")?)
                    }
                    _ => (rest(args, 0, usage)?, 1),
                };
                let location = resolve_location(&self.session, &location)?;
                let severity = self.session.treat(&location, levels)?;
                Reply::Severity { location, severity }
            }
            CommandKind::Quarantine => {
                let location = resolve_location(&self.session, &rest(args, 0, usage)?)?;
                self.session.quarantine(&location)?;
                Reply::Quarantined(location)
            }
            CommandKind::RemoveQuarantine => {
                let location = resolve_location(&self.session, &rest(args, 0, usage)?)?;
                self.session.lift_quarantine(&location)?;
                Reply::QuarantineLifted(location)
            }
            CommandKind::Move => {
                let location = resolve_location(&self.session, &rest(args, 0, usage)?)?;
                let player = self.session.turns().current_player()?;
                self.session.move_player(player, &location)?;
                Reply::Moved {
                    player: self.player_name(player)?,
                    location,
                }
            }
            CommandKind::PlayerLocation => {
                let [target, ..] = args else {
                    return Err(usage);
                };
                let player = resolve_player(&self.session, target)?;
                let location = resolve_location(&self.session, &rest(args, 1, usage)?)?;
                self.session.move_player(player, &location)?;
                Reply::Moved {
                    player: self.player_name(player)?,
                    location,
                }
            }
            CommandKind::Odds => {
                let location = resolve_location(&self.session, &rest(args, 0, usage)?)?;
                Reply::Odds(self.session.forecast().assess(&location)?)
            }
            CommandKind::Cure => {
                let [target, affliction] = args else {
                    return Err(usage);
                };
                let player = resolve_player(&self.session, target)?;
                let affliction = Affliction::from_str(affliction).ok_or_else(|| {
                    SessionError::InvalidArgument(format!("unknown affliction '{affliction}'"))
                })?;
                let probability = self
                    .session
                    .forecast()
                    .probability_of_curing(player, affliction)?;
                Reply::Cure {
                    player: self.player_name(player)?,
                    affliction,
                    probability,
                }
            }
            CommandKind::Urgent => {
                let limit = match args {
                    [] => self.urgent_limit,
                    [value] => parse_number(value, "limit")?,
                    _ => return Err(usage),
                };
                Reply::Urgent(self.session.forecast().urgent(limit))
            }
            CommandKind::Status => Reply::Status(self.status()),
            CommandKind::Save => Reply::Saved(self.save()?),
            CommandKind::Help => Reply::Help(
                self.table
                    .specs()
                    .iter()
                    .map(|spec| {
                        format!(
                            "{:<36} {:<22} {}",
                            spec.usage,
                            spec.names[1..].join(", "),
                            spec.summary
                        )
                    })
                    .collect(),
            ),
            CommandKind::Quit => Reply::Quit,
        };
        Ok(reply)
    }

    fn status(&self) -> StatusReport {
        let session = &self.session;
        let turns = session.turns();
        let turn = turns
            .current_player()
            .ok()
            .and_then(|id| turns.player(id))
            .map(|player| (turns.turn_number(), player.name().to_string()));
        let mut afflicted: Vec<(String, u8, bool)> = session
            .locations()
            .iter()
            .filter(|l| l.severity() > 0 || l.is_quarantined())
            .map(|l| (l.name().to_string(), l.severity(), l.is_quarantined()))
            .collect();
        afflicted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        StatusReport {
            turn,
            started: session.is_started(),
            crisis_rate: session.crisis_rate(),
            overloads: session.overloads(),
            crisis_chance: session.forecast().probability_of_crisis(),
            discovery_remaining: session.discovery().remaining_cards(),
            spread_drawn: session.spread().drawn().to_vec(),
            afflicted,
        }
    }

    fn save(&self) -> Result<PathBuf, CommandError> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let path = snapshot_path(&self.save_dir, self.session.name(), nanos);
        SessionSnapshot::save(&self.session, &path)?;
        info!(path = %path.display(), "session saved");
        Ok(path)
    }

    fn player_name(&self, id: PlayerId) -> Result<String, SessionError> {
        self.session.player(id).map(|p| p.name().to_string())
    }
}

pub fn snapshot_path(save_dir: &Path, session: &str, nanos: u128) -> PathBuf {
    save_dir.join(session).join(format!("game_{nanos}.json"))
}

/// Joins `args[from..]` back into one name so multi-word entries resolve.
fn rest(args: &[&str], from: usize, usage: CommandError) -> Result<String, CommandError> {
    match args.get(from..) {
        Some(tail) if !tail.is_empty() => Ok(tail.join(" ")),
        _ => Err(usage),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, SessionError> {
    value
        .parse()
        .map_err(|_| SessionError::InvalidArgument(format!("{value} is not a valid {what}")))
}
