//! Owner setup menu.
//!
//! Three forms: the setup root, the map selector and the hunter selector.
//! Building a form and reading back its answer both live here so button
//! order is defined in exactly one place.

use crate::game::state::SessionState;
use crate::host::FormRequest;

/// Which form is being shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuKind {
    /// Root: map, hunters, start
    Setup,
    /// One button per map
    MapSelector,
    /// One button per allowed hunter count
    HunterSelector,
}

/// A final choice the owner can make.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuSelection {
    /// Select the map at this index
    Map(usize),
    /// Select this many hunters
    HunterCount(u8),
    /// Start the game
    StartGame,
}

/// What a button press leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    /// Show another form
    Open(MenuKind),
    /// Apply a choice
    Select(MenuSelection),
}

const SETUP_MAP: usize = 0;
const SETUP_HUNTERS: usize = 1;
const SETUP_START: usize = 2;

/// Build the form for `kind` from the current session settings.
pub fn build_form(kind: MenuKind, form_id: u32, state: &SessionState) -> FormRequest {
    match kind {
        MenuKind::Setup => {
            let map_name = state
                .selected_map()
                .map(|m| m.name.as_str())
                .unwrap_or("-");
            FormRequest {
                form_id,
                title: "Prop Hunt Setup".to_string(),
                body: "Choose an action:".to_string(),
                buttons: vec![
                    format!("Map: {}", map_name),
                    format!("Hunters: {}", state.selected_hunter_count()),
                    "Start Game".to_string(),
                ],
            }
        }
        MenuKind::MapSelector => FormRequest {
            form_id,
            title: "Select Map".to_string(),
            body: "Choose a map:".to_string(),
            buttons: state.maps().iter().map(|m| m.name.clone()).collect(),
        },
        MenuKind::HunterSelector => FormRequest {
            form_id,
            title: "Select Hunters".to_string(),
            body: "How many hunters?".to_string(),
            buttons: (1..=state.max_hunters()).map(|n| n.to_string()).collect(),
        },
    }
}

/// Translate a button index of `kind` into an action. Indices outside the
/// form yield `None`.
pub fn interpret(kind: MenuKind, index: usize, state: &SessionState) -> Option<MenuAction> {
    match kind {
        MenuKind::Setup => match index {
            SETUP_MAP => Some(MenuAction::Open(MenuKind::MapSelector)),
            SETUP_HUNTERS => Some(MenuAction::Open(MenuKind::HunterSelector)),
            SETUP_START => Some(MenuAction::Select(MenuSelection::StartGame)),
            _ => None,
        },
        MenuKind::MapSelector => {
            (index < state.maps().len()).then_some(MenuAction::Select(MenuSelection::Map(index)))
        }
        MenuKind::HunterSelector => {
            let count = u8::try_from(index + 1).ok()?;
            (count <= state.max_hunters()).then_some(MenuAction::Select(MenuSelection::HunterCount(count)))
        }
    }
}
