//! termmenu - Interactive Terminal Menus
//!
//! Shows the given entries as a menu and reports the choice through the exit status:
//! the 1-based index of the (first) chosen entry, or 0 when the menu was cancelled or an
//! error occurred.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::process::ExitCode;
use std::time::Duration;
use termmenu::{
    HintPlacement, MenuConfig, MenuResult, Preselect, PreviewSource, StatusBar, TerminalMenu,
};

/// Style flags and the theme element each one sets.
const STYLE_FLAGS: &[(&str, &str)] = &[
    ("cursor-style", "cursor"),
    ("highlight-style", "highlight"),
    ("search-highlight-style", "search_highlight"),
    ("shortcut-key-highlight-style", "shortcut_key"),
    ("shortcut-brackets-highlight-style", "shortcut_brackets"),
    ("status-bar-style", "status_bar"),
    ("multi-select-cursor-style", "multi_select_cursor"),
    ("multi-select-cursor-brackets-style", "multi_select_cursor_brackets"),
];

fn build_cli() -> Command {
    let mut command = Command::new("termmenu")
        .version(termmenu::VERSION)
        .about("Create interactive menus in the terminal")
        .long_about(
            "termmenu shows the given entries as an interactive menu and returns the selected \
             entry as exit code (1-based; 0 means cancelled or error).",
        )
        .arg(
            Arg::new("entries")
                .help("The menu entries to show ([k] text|data)")
                .num_args(0..)
                .index(1),
        )
        .arg(Arg::new("title").short('t').long("title").help("Menu title"))
        .arg(
            Arg::new("cursor")
                .long("cursor")
                .help("Menu cursor (default: \"> \")"),
        )
        .arg(
            Arg::new("cursor-index")
                .short('i')
                .long("cursor-index")
                .value_parser(clap::value_parser!(usize))
                .help("Initially selected entry index"),
        )
        .arg(flag("no-cycle", Some('C'), "Do not cycle the menu selection"))
        .arg(flag(
            "clear-screen",
            Some('l'),
            "Clear the screen before the menu is shown and after it exits",
        ))
        .arg(flag("no-clear-menu-on-exit", Some('X'), "Do not clear the menu on exit"))
        .arg(
            Arg::new("accept-keys")
                .long("accept-keys")
                .help("Keys that accept the selection, comma separated (default: \"enter\")"),
        )
        .arg(
            Arg::new("quit-keys")
                .long("quit-keys")
                .help("Keys that cancel the menu, comma separated (default: \"escape,q\")"),
        )
        .arg(
            Arg::new("search-key")
                .short('k')
                .long("search-key")
                .help(
                    "Key to start a search (default: \"/\"); \"none\" searches on any letter \
                     key",
                ),
        )
        .arg(flag("case-sensitive", Some('s'), "Searches are case sensitive"))
        .arg(flag("show-search-hint", Some('u'), "Show a search hint in the search line"))
        .arg(
            Arg::new("show-search-hint-text")
                .long("show-search-hint-text")
                .help("Custom search hint; {key} is replaced by the search key"),
        )
        .arg(flag("show-shortcut-hints", None, "Show shortcut hints in the status bar"))
        .arg(flag(
            "show-shortcut-hints-in-title",
            None,
            "Show shortcut hints in the menu title",
        ))
        .arg(flag("no-exit-on-shortcut", Some('E'), "Do not exit on shortcut keys"))
        .arg(
            Arg::new("preview")
                .short('p')
                .long("preview")
                .help(
                    "Command generating a preview of the highlighted entry; \"{}\" is replaced \
                     by the entry's data part, or its text when it has none",
                ),
        )
        .arg(
            Arg::new("preview-size")
                .long("preview-size")
                .value_parser(clap::value_parser!(f64))
                .help("Maximum preview height as fraction of the terminal height (default: 0.25)"),
        )
        .arg(
            Arg::new("preview-title")
                .long("preview-title")
                .help("Title of the preview window (default: \"preview\")"),
        )
        .arg(flag("no-preview-border", None, "Do not draw a border around the preview"))
        .arg(flag(
            "multi-select",
            Some('m'),
            "Allow the selection of multiple entries (implies --stdout)",
        ))
        .arg(
            Arg::new("multi-select-cursor")
                .long("multi-select-cursor")
                .help("Multi-select cursor (default: \"[*] \")"),
        )
        .arg(
            Arg::new("multi-select-keys")
                .long("multi-select-keys")
                .help("Keys toggling an entry in a multi-selection (default: \"space,tab\")"),
        )
        .arg(flag(
            "multi-select-no-select-on-accept",
            None,
            "Do not select the highlighted entry when accepting",
        ))
        .arg(flag(
            "multi-select-empty-ok",
            None,
            "Allow accepting an empty multi-selection",
        ))
        .arg(flag("show-multi-select-hint", None, "Show a multi-select hint in the status bar"))
        .arg(
            Arg::new("show-multi-select-hint-text")
                .long("show-multi-select-hint-text")
                .help("Custom multi-select hint with {multi_select_keys} and {accept_keys}"),
        )
        .arg(
            Arg::new("preselected-entries")
                .short('r')
                .long("preselected-entries")
                .conflicts_with("preselected-indices")
                .help("Comma separated entry texts to preselect in a multi-select menu"),
        )
        .arg(
            Arg::new("preselected-indices")
                .short('R')
                .long("preselected-indices")
                .help("Comma separated entry indices to preselect in a multi-select menu"),
        )
        .arg(flag("skip-empty-entries", None, "Hide blank entries; the cursor never stops on them"))
        .arg(
            Arg::new("status-bar")
                .short('b')
                .long("status-bar")
                .help("Status bar text"),
        )
        .arg(flag(
            "status-bar-below-preview",
            Some('d'),
            "Show the status bar below the preview window",
        ))
        .arg(
            Arg::new("escape-timeout")
                .long("escape-timeout")
                .value_parser(clap::value_parser!(u64))
                .help("Milliseconds to wait for the rest of an escape sequence (default: 25)"),
        )
        .arg(flag(
            "stdout",
            None,
            "Print the selected 0-based index or indices to stdout, separated by \";\"",
        ));

    for (id, _) in STYLE_FLAGS {
        command = command.arg(
            Arg::new(*id)
                .long(*id)
                .help("Style as comma separated list of fg_<color>, bg_<color>, bold, ..."),
        );
    }
    command
}

fn flag(id: &'static str, short: Option<char>, help: &'static str) -> Arg {
    let arg = Arg::new(id).long(id).action(ArgAction::SetTrue).help(help);
    match short {
        Some(short) => arg.short(short),
        None => arg,
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|item| !item.is_empty())
}

#[cfg(feature = "config")]
fn load_config_file(config: &mut MenuConfig) -> Result<()> {
    if let Some(file) = termmenu::config::file::FileConfig::load()? {
        log::debug!("applying configuration file");
        file.apply(config)?;
    }
    Ok(())
}

#[cfg(not(feature = "config"))]
fn load_config_file(_config: &mut MenuConfig) -> Result<()> {
    Ok(())
}

/// Build a menu configuration from defaults, the config file and the command line.
fn config_from_matches(matches: &ArgMatches) -> Result<MenuConfig> {
    let mut config = MenuConfig::default();
    load_config_file(&mut config)?;

    let text = |id: &str| matches.get_one::<String>(id).cloned();
    let set = |id: &str| matches.get_flag(id);

    config.title = text("title");
    if let Some(cursor) = text("cursor") {
        config.cursor = cursor;
    }
    config.cursor_index = matches.get_one::<usize>("cursor-index").copied();
    config.cycle_cursor &= !set("no-cycle");
    config.clear_screen |= set("clear-screen");
    config.clear_menu_on_exit &= !set("no-clear-menu-on-exit");

    if let Some(keys) = text("accept-keys") {
        config.accept_keys = MenuConfig::parse_keys(&keys)?;
    }
    if let Some(keys) = text("quit-keys") {
        config.quit_keys = MenuConfig::parse_keys(&keys)?;
    }
    if let Some(key) = text("search-key") {
        let key = (!key.eq_ignore_ascii_case("none")).then_some(key);
        config.search_key = MenuConfig::parse_search_key(key.as_deref())?;
    }
    config.search_case_sensitive |= set("case-sensitive");
    config.show_search_hint |= set("show-search-hint");
    config.search_hint_text = text("show-search-hint-text");

    if set("show-shortcut-hints-in-title") {
        config.show_shortcut_hints = true;
        config.shortcut_hint_placement = HintPlacement::Title;
    } else if set("show-shortcut-hints") {
        config.show_shortcut_hints = true;
        config.shortcut_hint_placement = HintPlacement::StatusBar;
    }
    config.exit_on_shortcut &= !set("no-exit-on-shortcut");

    if let Some(command) = text("preview") {
        config.preview = Some(PreviewSource::command(&command)?);
    }
    if let Some(size) = matches.get_one::<f64>("preview-size") {
        config.preview_size = *size;
    }
    if let Some(title) = text("preview-title") {
        config.preview_title = title;
    }
    config.preview_border &= !set("no-preview-border");

    config.multi_select |= set("multi-select");
    if let Some(cursor) = text("multi-select-cursor") {
        config.multi_select_cursor = cursor;
    }
    if let Some(keys) = text("multi-select-keys") {
        config.multi_select_keys = MenuConfig::parse_keys(&keys)?;
    }
    config.multi_select_select_on_accept &= !set("multi-select-no-select-on-accept");
    config.multi_select_empty_ok |= set("multi-select-empty-ok");
    config.show_multi_select_hint |= set("show-multi-select-hint");
    config.multi_select_hint_text = text("show-multi-select-hint-text");

    if let Some(list) = text("preselected-entries") {
        config.preselected_entries = split_list(&list)
            .map(|item| Preselect::Text(item.to_string()))
            .collect();
    } else if let Some(list) = text("preselected-indices") {
        config.preselected_entries = split_list(&list)
            .map(|item| {
                item.parse()
                    .map(Preselect::Index)
                    .with_context(|| format!("invalid preselected index \"{}\"", item))
            })
            .collect::<Result<_>>()?;
    }
    config.skip_empty_entries |= set("skip-empty-entries");

    config.status_bar = text("status-bar").map(StatusBar::Static);
    config.status_bar_below_preview |= set("status-bar-below-preview");
    if let Some(ms) = matches.get_one::<u64>("escape-timeout") {
        config.escape_timeout = Duration::from_millis(*ms);
    }

    for (id, element) in STYLE_FLAGS {
        if let Some(list) = text(*id) {
            config
                .theme
                .set(element, &list)
                .with_context(|| format!("--{}", id))?;
        }
    }
    Ok(config)
}

/// Exit status for a menu result: the 1-based index of the first chosen entry.
fn exit_status(result: &MenuResult) -> u8 {
    match result.indices().first() {
        Some(index) => u8::try_from(index + 1).unwrap_or(u8::MAX),
        None => 0,
    }
}

/// The `--stdout` rendering of a result.
fn stdout_line(result: &MenuResult) -> Option<String> {
    match result {
        MenuResult::Cancelled => None,
        result => Some(
            result
                .indices()
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(";"),
        ),
    }
}

async fn run(matches: ArgMatches) -> Result<u8> {
    let config = config_from_matches(&matches)?;
    let print = matches.get_flag("stdout") || config.multi_select;
    let entries: Vec<String> = matches
        .get_many::<String>("entries")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let mut menu = TerminalMenu::new(&entries, config)?;
    let result = menu.run().await?;
    if print {
        if let Some(line) = stdout_line(&result) {
            println!("{}", line);
        }
    }
    Ok(exit_status(&result))
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; the menu itself draws on /dev/tty
    env_logger::init();

    // Exit status 0 doubles as the error status, so argument errors must not use clap's 2
    let matches = match build_cli().try_get_matches() {
        Ok(matches) => matches,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(0);
        }
    };

    match run(matches).await {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::from(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use termmenu::{KeyEvent, SearchKey};

    fn parse(args: &[&str]) -> MenuConfig {
        let matches = build_cli()
            .try_get_matches_from(std::iter::once("termmenu").chain(args.iter().copied()))
            .unwrap();
        config_from_matches(&matches).unwrap()
    }

    #[test]
    fn test_version_constant() {
        assert!(!termmenu::VERSION.is_empty());
    }

    #[test]
    fn cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn flags_map_to_configuration() {
        let config = parse(&[
            "-t",
            "Pick one",
            "--no-cycle",
            "--search-key",
            "none",
            "--accept-keys",
            "enter,alt-d",
            "--cursor-style",
            "fg_green",
            "--show-shortcut-hints",
            "-m",
            "-R",
            "0, 2",
            "a",
            "b",
            "c",
        ]);
        assert_eq!(config.title.as_deref(), Some("Pick one"));
        assert!(!config.cycle_cursor);
        assert_eq!(config.search_key, SearchKey::AnyLetter);
        assert_eq!(config.accept_keys, vec![KeyEvent::ENTER, KeyEvent::Alt('d')]);
        assert_eq!(config.theme.cursor.to_string(), "fg_green");
        assert_eq!(config.shortcut_hint_placement, HintPlacement::StatusBar);
        assert!(config.multi_select);
        assert_eq!(
            config.preselected_entries,
            vec![Preselect::Index(0), Preselect::Index(2)]
        );
    }

    #[test]
    fn screen_and_blank_entry_flags() {
        let help = |id: &str| {
            build_cli()
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .and_then(|arg| arg.get_help())
                .map(|text| text.to_string())
                .unwrap_or_default()
        };
        assert!(help("clear-screen").contains("after it exits"));
        assert!(help("skip-empty-entries").starts_with("Hide blank entries"));

        let config = parse(&["-l", "--skip-empty-entries", "a", "", "b"]);
        assert!(config.clear_screen);
        assert!(config.skip_empty_entries);
    }

    #[test]
    fn invalid_values_are_errors() {
        let matches = build_cli()
            .try_get_matches_from(["termmenu", "--cursor-style", "fg_pink", "a"])
            .unwrap();
        assert!(config_from_matches(&matches).is_err());

        let matches = build_cli()
            .try_get_matches_from(["termmenu", "-R", "one", "a"])
            .unwrap();
        assert!(config_from_matches(&matches).is_err());

        assert!(build_cli()
            .try_get_matches_from(["termmenu", "-r", "a", "-R", "0", "a"])
            .is_err());
    }

    #[test]
    fn results_map_to_exit_status_and_stdout() {
        assert_eq!(exit_status(&MenuResult::Single(2)), 3);
        assert_eq!(exit_status(&MenuResult::Multiple(vec![1, 3])), 2);
        assert_eq!(exit_status(&MenuResult::Cancelled), 0);
        assert_eq!(exit_status(&MenuResult::Multiple(Vec::new())), 0);
        assert_eq!(
            stdout_line(&MenuResult::Multiple(vec![0, 2])).as_deref(),
            Some("0;2")
        );
        assert_eq!(stdout_line(&MenuResult::Cancelled), None);
    }
}
