use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Medic,
    Dispatcher,
    Researcher,
    Scientist,
    Civilian,
    QuarantineSpecialist,
    Colonel,
    OperationsExpert,
    Generalist,
    Soldier,
    Virologist,
    Epidemiologist,
    GeneSplicer,
    FirstResponder,
    Pharmacist,
    LocalLiaison,
    FieldDirector,
    Pilot,
    FieldOperative,
    Troubleshooter,
    Archivist,
    ContainmentSpecialist,
    ContingencyPlanner,
}

/// How a role changes the number of matching cards needed to cure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CureModifier {
    Adjust(i64),
    CannotCure,
}

impl Role {
    pub const ALL: [Role; 23] = [
        Role::Medic,
        Role::Dispatcher,
        Role::Researcher,
        Role::Scientist,
        Role::Civilian,
        Role::QuarantineSpecialist,
        Role::Colonel,
        Role::OperationsExpert,
        Role::Generalist,
        Role::Soldier,
        Role::Virologist,
        Role::Epidemiologist,
        Role::GeneSplicer,
        Role::FirstResponder,
        Role::Pharmacist,
        Role::LocalLiaison,
        Role::FieldDirector,
        Role::Pilot,
        Role::FieldOperative,
        Role::Troubleshooter,
        Role::Archivist,
        Role::ContainmentSpecialist,
        Role::ContingencyPlanner,
    ];

    pub const fn cure_modifier(self) -> CureModifier {
        match self {
            Role::Scientist => CureModifier::Adjust(-1),
            Role::Colonel => CureModifier::Adjust(2),
            Role::Soldier => CureModifier::CannotCure,
            _ => CureModifier::Adjust(0),
        }
    }

    /// A counter-agent keeps quarantine in place at its location.
    pub const fn is_counter_agent(self) -> bool {
        matches!(self, Role::QuarantineSpecialist)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Medic => "Medic",
            Role::Dispatcher => "Dispatcher",
            Role::Researcher => "Researcher",
            Role::Scientist => "Scientist",
            Role::Civilian => "Civilian",
            Role::QuarantineSpecialist => "QuarantineSpecialist",
            Role::Colonel => "Colonel",
            Role::OperationsExpert => "OperationsExpert",
            Role::Generalist => "Generalist",
            Role::Soldier => "Soldier",
            Role::Virologist => "Virologist",
            Role::Epidemiologist => "Epidemiologist",
            Role::GeneSplicer => "GeneSplicer",
            Role::FirstResponder => "FirstResponder",
            Role::Pharmacist => "Pharmacist",
            Role::LocalLiaison => "LocalLiaison",
            Role::FieldDirector => "FieldDirector",
            Role::Pilot => "Pilot",
            Role::FieldOperative => "FieldOperative",
            Role::Troubleshooter => "Troubleshooter",
            Role::Archivist => "Archivist",
            Role::ContainmentSpecialist => "ContainmentSpecialist",
            Role::ContingencyPlanner => "ContingencyPlanner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
