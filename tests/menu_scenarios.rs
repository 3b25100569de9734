use proptest::prelude::*;

use termmenu::app::{ExitReason, MenuController, MenuState};
use termmenu::input::{KeyDecoder, KeyEvent, NamedKey};
use termmenu::search::{filter, SearchPattern};
use termmenu::selection::{Selection, SelectionModel, SelectionOptions};
use termmenu::{MenuConfig, MenuEntry};

const DOWN: KeyEvent = KeyEvent::Named(NamedKey::Down);
const SPACE: KeyEvent = KeyEvent::Named(NamedKey::Space);

fn entries(texts: &[&str], skip_empty: bool) -> Vec<MenuEntry> {
    texts
        .iter()
        .map(|text| MenuEntry::parse(text, skip_empty))
        .collect()
}

/// Decode a byte script the way the event loop does, flushing a trailing lone ESC.
fn decode(bytes: &[u8]) -> Vec<KeyEvent> {
    let mut decoder = KeyDecoder::new();
    let mut keys = decoder.feed(bytes);
    keys.extend(decoder.flush());
    keys
}

fn play(controller: &mut MenuController<'_>, keys: &[KeyEvent]) {
    for key in keys {
        controller.handle_key(*key);
        if controller.is_exited() {
            break;
        }
    }
}

fn accepted(controller: &MenuController<'_>) -> Selection {
    match controller.outcome() {
        Some(ExitReason::Accepted(selection)) => selection.clone(),
        other => panic!("menu did not accept: {other:?}"),
    }
}

#[test]
fn arrow_keys_then_enter_select_third_entry() {
    let list = entries(&["entry 1", "entry 2", "entry 3"], false);
    let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();

    play(&mut controller, &decode(b"\x1b[B\x1b[B\r"));

    assert_eq!(accepted(&controller), Selection::Single(2));
    assert_eq!(controller.accept_key(), Some(KeyEvent::ENTER));
}

#[test]
fn shortcut_key_exits_on_its_entry() {
    let list = entries(&["[a] apple", "[b] banana", "[o] orange"], false);
    let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();

    play(&mut controller, &decode(b"b"));

    assert_eq!(controller.current_index(), Some(1));
    assert_eq!(accepted(&controller), Selection::Single(1));
    // Leaving through a shortcut is not an accept key.
    assert_eq!(controller.accept_key(), None);
}

#[test]
fn multi_select_toggles_and_accepts() {
    let list = entries(&["dog", "cat", "mouse", "squirrel"], false);
    let config = MenuConfig {
        multi_select: true,
        ..MenuConfig::default()
    };
    let mut controller = MenuController::new(&list, &config).unwrap();

    play(&mut controller, &[SPACE, DOWN, DOWN, SPACE, KeyEvent::ENTER]);

    assert_eq!(accepted(&controller), Selection::Multiple(vec![0, 2]));
}

#[test]
fn multi_select_accept_adds_cursor_entry() {
    let list = entries(&["dog", "cat", "mouse", "squirrel"], false);
    let config = MenuConfig {
        multi_select: true,
        ..MenuConfig::default()
    };
    let mut controller = MenuController::new(&list, &config).unwrap();

    play(&mut controller, &[SPACE, DOWN, KeyEvent::ENTER]);

    assert_eq!(accepted(&controller), Selection::Multiple(vec![0, 1]));
}

#[test]
fn multi_select_empty_accept_follows_configuration() {
    let list = entries(&["dog", "cat"], false);
    let forced = MenuConfig {
        multi_select: true,
        multi_select_select_on_accept: false,
        ..MenuConfig::default()
    };
    let mut controller = MenuController::new(&list, &forced).unwrap();
    play(&mut controller, &[DOWN, KeyEvent::ENTER]);
    assert_eq!(accepted(&controller), Selection::Multiple(vec![1]));

    let allowed = MenuConfig {
        multi_select_empty_ok: true,
        ..forced
    };
    let mut controller = MenuController::new(&list, &allowed).unwrap();
    play(&mut controller, &[DOWN, KeyEvent::ENTER]);
    assert_eq!(accepted(&controller), Selection::Multiple(Vec::new()));
}

#[test]
fn preselected_entries_are_part_of_the_result() {
    let list = entries(&["dog", "cat", "mouse"], false);
    let config = MenuConfig {
        multi_select: true,
        multi_select_select_on_accept: false,
        preselected_entries: vec![
            termmenu::Preselect::Text("mouse".into()),
            termmenu::Preselect::Index(1),
        ],
        ..MenuConfig::default()
    };
    let mut controller = MenuController::new(&list, &config).unwrap();

    play(&mut controller, &[DOWN, SPACE, KeyEvent::ENTER]);

    assert_eq!(accepted(&controller), Selection::Multiple(vec![2]));
}

#[test]
fn empty_entries_are_skipped() {
    let list = entries(&["entry 1", "", "entry 2"], true);
    let config = MenuConfig {
        multi_select: true,
        skip_empty_entries: true,
        ..MenuConfig::default()
    };
    let mut controller = MenuController::new(&list, &config).unwrap();

    for _ in 0..5 {
        play(&mut controller, &[DOWN]);
        assert_ne!(controller.current_index(), Some(1));
    }
    play(
        &mut controller,
        &[SPACE, DOWN, SPACE, DOWN, SPACE, KeyEvent::ENTER],
    );
    match accepted(&controller) {
        Selection::Multiple(indices) => assert!(!indices.contains(&1)),
        other => panic!("unexpected selection {other:?}"),
    }
}

#[test]
fn invalid_pattern_keeps_previous_view() {
    let list = entries(&["alpha", "beta", "gamma"], false);
    let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();

    play(&mut controller, &decode(b"/a"));
    let before: Vec<usize> = controller.search().view().iter().map(|e| e.index).collect();
    play(&mut controller, &decode(b"[b-"));

    let after: Vec<usize> = controller.search().view().iter().map(|e| e.index).collect();
    assert!(controller.search().is_invalid());
    assert_eq!(before, after);
    assert_eq!(controller.state(), &MenuState::Searching);

    // Repairing the pattern filters again.
    play(&mut controller, &decode(b"]"));
    assert!(!controller.search().is_invalid());
}

#[test]
fn search_then_accept_returns_original_index() {
    let list = entries(&["red", "green", "blue"], false);
    let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();

    play(&mut controller, &decode(b"/bl\r"));

    assert_eq!(accepted(&controller), Selection::Single(2));
}

#[test]
fn escape_then_timeout_cancels() {
    let list = entries(&["one"], false);
    let mut controller = MenuController::new(&list, &MenuConfig::default()).unwrap();

    let mut decoder = KeyDecoder::new();
    assert!(decoder.feed(b"\x1b").is_empty());
    assert!(decoder.is_pending());
    play(&mut controller, &decoder.flush().into_iter().collect::<Vec<_>>());

    assert_eq!(controller.outcome(), Some(&ExitReason::Cancelled));
}

proptest! {
    #[test]
    fn cycling_down_full_laps_returns_to_start(
        len in 1usize..20,
        start in 0usize..20,
        laps in 0usize..4
    ) {
        let start = start % len;
        let texts: Vec<String> = (0..len).map(|i| format!("entry {i}")).collect();
        let list: Vec<MenuEntry> = texts.iter().map(|t| MenuEntry::parse(t, false)).collect();
        let config = MenuConfig { cursor_index: Some(start), ..MenuConfig::default() };
        let mut controller = MenuController::new(&list, &config).unwrap();

        for _ in 0..laps * len {
            controller.handle_key(DOWN);
        }
        prop_assert_eq!(controller.current_index(), Some(start));
    }

    #[test]
    fn filtering_is_idempotent(
        texts in prop::collection::vec("[a-c ]{0,6}", 1..12),
        pattern in "[a-c]{1,2}"
    ) {
        let list: Vec<MenuEntry> = texts.iter().map(|t| MenuEntry::parse(t, true)).collect();
        let pattern = SearchPattern::compile(&pattern, false).unwrap();

        let once = filter(&list, Some(&pattern));
        let kept: Vec<MenuEntry> = once.iter().map(|item| list[item.index].clone()).collect();
        let twice = filter(&kept, Some(&pattern));

        prop_assert_eq!(twice.len(), once.len());
        for (again, first) in twice.iter().zip(&once) {
            prop_assert_eq!(&kept[again.index], &list[first.index]);
            prop_assert_eq!(&again.spans, &first.spans);
        }
    }

    #[test]
    fn double_toggle_restores_selection(
        len in 1usize..10,
        moves in 0usize..20,
        preselect in prop::collection::btree_set(0usize..10, 0..5)
    ) {
        let texts: Vec<String> = (0..len).map(|i| format!("item {i}")).collect();
        let list: Vec<MenuEntry> = texts.iter().map(|t| MenuEntry::parse(t, false)).collect();
        let view = filter(&list, None);
        let preselected: Vec<termmenu::Preselect> = preselect
            .into_iter()
            .filter(|index| *index < len)
            .map(termmenu::Preselect::Index)
            .collect();

        let mut model = SelectionModel::new(SelectionOptions {
            multi_select: true,
            ..SelectionOptions::default()
        });
        model.initialize(&list, &view, None, &preselected).unwrap();
        for _ in 0..moves {
            model.move_down(view.len());
        }

        let before = model.selected().clone();
        model.toggle(&view);
        model.toggle(&view);
        prop_assert_eq!(model.selected(), &before);
    }
}
