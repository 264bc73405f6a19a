//! Selection state and the transitions user actions cause.
//!
//! `reduce` is pure: it returns the next state plus the timer effects the
//! controller has to apply. Every selection change cancels the refresh timer
//! and the poller of the old selection before starting new ones.

use crate::domain::model::{Community, Platform, Selection};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub selection: Selection,
    pub dark_mode: bool,
    pub mounted: bool,
    pub torn_down: bool,
}

impl DashboardState {
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            dark_mode: false,
            mounted: false,
            torn_down: false,
        }
    }

    /// Opens on yesterday, the newest day that can have a snapshot.
    pub fn initial(platform: Platform, community: Community, today: NaiveDate) -> Self {
        Self::new(Selection {
            platform,
            community,
            date: today.pred_opt().unwrap_or(today),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Mount,
    SelectPlatform(Platform),
    SelectCommunity(Community),
    SelectDate(NaiveDate),
    ToggleDarkMode,
    /// Reload the current selection now and restart the refresh timer.
    Refresh,
    Teardown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    CancelRefresh,
    StartRefresh(Selection),
    CancelPoller(Community),
    StartPoller {
        community: Community,
        platform: Platform,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: DashboardState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn unchanged(state: &DashboardState) -> Self {
        Self {
            state: state.clone(),
            effects: Vec::new(),
        }
    }
}

fn start_effects(selection: &Selection, today: NaiveDate) -> Vec<Effect> {
    let mut effects = vec![Effect::StartRefresh(selection.clone())];
    if selection.date < today {
        effects.push(Effect::StartPoller {
            community: selection.community.clone(),
            platform: selection.platform,
        });
    }
    effects
}

fn reselect(state: &DashboardState, next: Selection, today: NaiveDate) -> Transition {
    if next == state.selection {
        return Transition::unchanged(state);
    }
    if !state.mounted {
        return Transition {
            state: DashboardState {
                selection: next,
                ..state.clone()
            },
            effects: Vec::new(),
        };
    }

    let mut effects = vec![
        Effect::CancelRefresh,
        Effect::CancelPoller(state.selection.community.clone()),
    ];
    effects.extend(start_effects(&next, today));

    Transition {
        state: DashboardState {
            selection: next,
            ..state.clone()
        },
        effects,
    }
}

pub fn reduce(state: &DashboardState, action: Action, today: NaiveDate) -> Transition {
    if state.torn_down {
        return Transition::unchanged(state);
    }

    match action {
        Action::Mount if state.mounted => Transition::unchanged(state),
        Action::Mount => Transition {
            state: DashboardState {
                mounted: true,
                ..state.clone()
            },
            effects: start_effects(&state.selection, today),
        },
        Action::SelectPlatform(platform) => reselect(
            state,
            Selection {
                platform,
                ..state.selection.clone()
            },
            today,
        ),
        Action::SelectCommunity(community) => reselect(
            state,
            Selection {
                community,
                ..state.selection.clone()
            },
            today,
        ),
        Action::SelectDate(date) => reselect(
            state,
            Selection {
                date,
                ..state.selection.clone()
            },
            today,
        ),
        Action::ToggleDarkMode => Transition {
            state: DashboardState {
                dark_mode: !state.dark_mode,
                ..state.clone()
            },
            effects: Vec::new(),
        },
        Action::Refresh if !state.mounted => Transition::unchanged(state),
        Action::Refresh => Transition {
            state: state.clone(),
            effects: vec![
                Effect::CancelRefresh,
                Effect::StartRefresh(state.selection.clone()),
            ],
        },
        Action::Teardown => {
            let effects = if state.mounted {
                vec![
                    Effect::CancelRefresh,
                    Effect::CancelPoller(state.selection.community.clone()),
                ]
            } else {
                Vec::new()
            };
            Transition {
                state: DashboardState {
                    mounted: false,
                    torn_down: true,
                    ..state.clone()
                },
                effects,
            }
        }
    }
}
