use tilequest_game::{ActionCategory, GameState, Pending, Position};

mod common;

#[test]
fn dangerous_move_asks_and_no_stays_put() {
    let north = common::tile("Cursed Barrow", 0.65, false);
    let (mut game, _) = common::game_with_north(north, 11);
    let out = game.execute_action("move_n").unwrap();
    assert_eq!(
        out,
        "Warning: 'Cursed Barrow' seems very dangerous (danger 0.65). Proceed? [y/N]"
    );
    assert_eq!(game.state(), GameState::AskingQuestion);
    assert_eq!(game.pending(), Some(&Pending::Move(Position::new(1, 0))));

    let ids: Vec<String> = game.available_actions().into_iter().map(|a| a.id).collect();
    assert_eq!(ids[..4], ["answer_yes", "answer_no", "look", "stats"]);

    assert_eq!(
        game.execute_action("answer_no").as_deref(),
        Some("You decide not to proceed there.")
    );
    assert_eq!(game.state(), GameState::Exploring);
    assert_eq!(game.position(), Position::new(1, 1));
    assert!(!game.explored().contains(&Position::new(1, 0)));
}

#[test]
fn mild_danger_moves_without_asking() {
    let north = common::tile("Windy Hill", 0.0, false);
    let (mut game, _) = common::game_with_north(north, 11);
    let out = game.execute_action("ArrowUp").unwrap();
    assert!(out.contains("You arrive at Windy Hill."), "{out}");
    assert_eq!(game.position(), Position::new(1, 0));
}

#[test]
fn unknown_input_and_wrong_state_are_distinguished() {
    let (mut game, _) = common::seeded_game(42);
    assert_eq!(game.execute_action("xyzzy"), None);
    assert_eq!(
        game.execute_action("shop_exit").as_deref(),
        Some("You are not browsing a shop.")
    );
    assert_eq!(
        game.execute_action("answer_no").as_deref(),
        Some("No question pending.")
    );
    assert_eq!(game.state(), GameState::Exploring);
}

#[test]
fn ids_win_over_aliases_and_input_is_normalised() {
    let (mut game, _) = common::seeded_game(42);
    assert!(game.execute_action("  MAP ").unwrap().starts_with("Map (5x5)"));
    assert!(game.execute_action("I").unwrap().starts_with("Inventory: Potions x1"));
    assert!(game.execute_action("?").unwrap().starts_with("Available actions:"));
}

#[test]
fn every_state_ends_with_system_actions() {
    let (mut game, _) = common::seeded_game(42);
    let tail = |game: &tilequest_game::Game| -> Vec<ActionCategory> {
        game.available_actions()
            .iter()
            .rev()
            .take(4)
            .map(|a| a.category)
            .collect()
    };
    assert!(tail(&game).iter().all(|c| *c == ActionCategory::System));
    game.execute_action("quit");
    assert!(game.is_ended());
    assert!(tail(&game).iter().all(|c| *c == ActionCategory::System));
}

#[test]
fn log_keeps_the_most_recent_outputs() {
    let (mut game, _) = common::seeded_game(42);
    for _ in 0..15 {
        game.execute_action("inventory");
    }
    assert_eq!(game.log().len(), 10);
    assert!(game.get_log().lines().all(|line| line.ends_with("Inventory: Potions x1; Gold 50")));
}
