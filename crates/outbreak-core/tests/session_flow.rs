use outbreak_core::game::error::SessionError;
use outbreak_core::game::lookup::{resolve_card, resolve_location, resolve_player};
use outbreak_core::game::serialization::SessionSnapshot;
use outbreak_core::game::session::{Session, SpreadEffect};
use outbreak_core::game::setup::GameSetup;
use outbreak_core::model::affliction::Affliction;

fn fixture() -> GameSetup {
    GameSetup::from_json(include_str!("fixtures/small_map.json")).expect("valid setup json")
}

fn assert_cardinality(session: &Session, discovery_total: usize, spread_total: usize) {
    assert_eq!(session.discovery().total_cards(), discovery_total);
    assert_eq!(session.spread().total(), spread_total);
    assert!(session.spread().is_consistent());
    assert!(session.discovery().first_duplicate().is_none());
}

#[test]
fn full_session_keeps_decks_consistent() {
    let mut session = Session::new(&fixture(), "table", 2024).expect("session builds");
    let discovery_total = session.discovery().total_cards();
    let spread_total = session.spread().total();
    assert_eq!(discovery_total, 15 + 3);
    assert_eq!(spread_total, 13);
    assert_eq!(session.discovery().drawn().len(), 9);

    session.start_game().unwrap();
    let undrawn: Vec<String> = session
        .discovery()
        .striations()
        .iter()
        .flat_map(|s| s.cards().iter().map(|c| c.name().to_string()))
        .collect();
    assert_eq!(undrawn.len(), 6);

    session.draw_card(&undrawn[0]).unwrap();
    assert_cardinality(&session, discovery_total, spread_total);
    session.crisis("Chicago").unwrap();
    assert_cardinality(&session, discovery_total, spread_total);
    assert!(matches!(
        session.draw_card(&undrawn[1]),
        Err(SessionError::Sequence(_))
    ));

    for location in ["Washington", "Miami"] {
        session.infect(location).unwrap();
        assert_cardinality(&session, discovery_total, spread_total);
    }

    session.next_turn().unwrap();
    session.draw_card(&undrawn[1]).unwrap();
    session.draw_card(&undrawn[2]).unwrap();
    assert_cardinality(&session, discovery_total, spread_total);

    session.next_turn().unwrap();
    let current = session.turns().current_player().unwrap();
    assert_eq!(session.player(current).unwrap().name(), "Cy");
}

#[test]
fn crisis_probability_resets_after_crisis() {
    let mut session = Session::new(&fixture(), "table", 5).unwrap();
    let deck = session.discovery();
    assert_eq!(deck.probability_of_crisis(), 1.0 / 3.0);

    let first_block: Vec<String> = deck.striations()[0]
        .cards()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    for card in &first_block {
        session.draw_card(card).unwrap();
    }
    assert_eq!(session.discovery().probability_of_crisis(), 1.0);

    session.crisis("Seoul").unwrap();
    assert_eq!(session.discovery().striations().len(), 2);
    assert_eq!(session.discovery().probability_of_crisis(), 1.0 / 3.0);
}

#[test]
fn cascade_reaches_each_location_once() {
    let mut session = Session::new(&fixture(), "table", 9).unwrap();
    for name in ["Atlanta", "Chicago", "Montreal", "Washington"] {
        session.set_severity(name, 3).unwrap();
    }
    let outcome = session.infect("Atlanta").unwrap();
    let SpreadEffect::Overloaded(report) = outcome.effect else {
        panic!("expected an overload");
    };
    let mut seen = report.overloaded.clone();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), report.overloaded.len());
    assert_eq!(report.overloaded.len(), 4);
    assert_eq!(session.overloads(), 4);
    assert_eq!(session.locations().get("Miami").unwrap().severity(), 1);
}

#[test]
fn fuzzy_lookup_feeds_operations() {
    let mut session = Session::new(&fixture(), "table", 9).unwrap();
    let city = resolve_location(&session, "wash").unwrap();
    session.quarantine(&city).unwrap();
    assert!(matches!(
        resolve_location(&session, "m"),
        Err(SessionError::Ambiguous { .. })
    ));
    assert_eq!(resolve_card(&session, "air").unwrap(), "Airlift");

    let ana = resolve_player(&session, "an").unwrap();
    let bo = resolve_player(&session, "BO").unwrap();
    session.give_card(ana, bo, "Tokyo").unwrap();
    assert!(session.player(bo).unwrap().holds("Tokyo"));
}

#[test]
fn snapshot_restores_played_session() {
    let mut session = Session::new(&fixture(), "table", 77).unwrap();
    session.start_game().unwrap();
    session.infect("Lima").unwrap();
    session.crisis("Tokyo").unwrap();
    session.set_affliction("Bogota", Affliction::Red).unwrap();
    session.next_turn().unwrap();

    let json = SessionSnapshot::to_json(&session).unwrap();
    let restored = SessionSnapshot::from_json(&json).unwrap().restore().unwrap();
    assert_eq!(restored, session);
    assert_eq!(
        restored.forecast().urgent(5),
        session.forecast().urgent(5)
    );
}
