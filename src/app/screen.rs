//! Application screen state management
//!
//! Handles transitions between different application screens:
//! - Profile selection
//! - Main menu
//! - Practice setup (question count)
//! - Playing, including the game over view of a finished round
//! - Leaderboard

use crate::config::Config;
use crate::game::round::{Mode, DEFAULT_TARGET, PRACTICE_TARGETS};
use crate::storage::{leaderboard_or_empty, profiles_or_default, Backend, LeaderboardEntry, Profile};
use std::time::{Duration, Instant};

use super::state::GameSession;

/// Menu option on the main screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    Practice,
    TimeAttack,
    Survival,
    Leaderboard,
    SwitchProfile,
    Quit,
}

impl MenuOption {
    /// Get all menu options in order
    pub fn all() -> &'static [MenuOption] {
        &[
            MenuOption::Practice,
            MenuOption::TimeAttack,
            MenuOption::Survival,
            MenuOption::Leaderboard,
            MenuOption::SwitchProfile,
            MenuOption::Quit,
        ]
    }

    /// Get the display label for this option
    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::Practice => "Practice",
            MenuOption::TimeAttack => "Time Attack",
            MenuOption::Survival => "Survival",
            MenuOption::Leaderboard => "Leaderboard",
            MenuOption::SwitchProfile => "Switch Profile",
            MenuOption::Quit => "Quit",
        }
    }
}

/// The current application screen
pub enum Screen {
    /// Choosing who plays
    ProfileSelect {
        profiles: Vec<Profile>,
        selected: usize,
    },
    /// Main menu
    Menu { selected: usize },
    /// Choosing the practice question count
    PracticeSetup { selected: usize },
    /// Playing a round; shows the game over view once the round ends
    Playing { session: GameSession },
    /// Best results per ranked mode
    Leaderboard {
        /// Index into [`Mode::RANKED`]
        tab: usize,
        entries: Vec<LeaderboardEntry>,
    },
}

/// Main application coordinator
pub struct AppCoordinator {
    /// Current screen
    pub screen: Screen,
    /// Whether the application should quit
    pub should_quit: bool,
    /// One-line notice, e.g. when a score could not be saved
    pub status: Option<String>,
    backend: Box<dyn Backend>,
    profile: Option<Profile>,
    leaderboard_limit: usize,
    reveal_delay: Duration,
}

impl AppCoordinator {
    /// Create a coordinator. Starts at the menu when a remembered profile
    /// still exists, otherwise at profile selection.
    pub fn new(backend: Box<dyn Backend>, config: &Config) -> Self {
        let remembered = match backend.current_profile() {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load remembered profile");
                None
            }
        };

        let mut coordinator = Self {
            screen: Screen::Menu { selected: 0 },
            should_quit: false,
            status: None,
            backend,
            profile: None,
            leaderboard_limit: config.leaderboard_limit,
            reveal_delay: config.reveal_delay,
        };

        match remembered {
            Some(profile) => {
                tracing::info!(profile = %profile.name, "resuming with remembered profile");
                coordinator.profile = Some(profile);
            }
            None => coordinator.go_to_profile_select(),
        }
        coordinator
    }

    /// Currently selected player
    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Go back to the main menu
    pub fn go_to_menu(&mut self) {
        if let Screen::Playing { session } = &mut self.screen {
            session.leave();
        }
        self.screen = Screen::Menu { selected: 0 };
    }

    fn go_to_profile_select(&mut self) {
        let profiles = profiles_or_default(self.backend.as_ref());
        let selected = self
            .profile
            .as_ref()
            .and_then(|current| profiles.iter().position(|p| p.id == current.id))
            .unwrap_or(0);
        self.screen = Screen::ProfileSelect { profiles, selected };
    }

    fn go_to_leaderboard(&mut self, tab: usize) {
        let tab = tab % Mode::RANKED.len();
        let entries = leaderboard_or_empty(self.backend.as_ref(), Mode::RANKED[tab], self.leaderboard_limit);
        self.screen = Screen::Leaderboard { tab, entries };
    }

    fn start_game(&mut self, mode: Mode, target: Option<u32>, now: Instant) {
        let mut session = GameSession::new(self.reveal_delay);
        session.start(mode, target, now);
        tracing::info!(mode = mode.key(), ?target, "starting round");
        self.screen = Screen::Playing { session };
    }

    /// Navigation (up)
    pub fn up(&mut self) {
        match &mut self.screen {
            Screen::ProfileSelect { selected, .. }
            | Screen::Menu { selected }
            | Screen::PracticeSetup { selected } => {
                *selected = selected.saturating_sub(1);
            }
            _ => {}
        }
    }

    /// Navigation (down)
    pub fn down(&mut self) {
        match &mut self.screen {
            Screen::ProfileSelect { profiles, selected } => {
                if *selected + 1 < profiles.len() {
                    *selected += 1;
                }
            }
            Screen::Menu { selected } => {
                if *selected + 1 < MenuOption::all().len() {
                    *selected += 1;
                }
            }
            Screen::PracticeSetup { selected } => {
                if *selected + 1 < PRACTICE_TARGETS.len() {
                    *selected += 1;
                }
            }
            _ => {}
        }
    }

    /// Left arrow: previous leaderboard tab or practice target
    pub fn left(&mut self) {
        match &self.screen {
            Screen::Leaderboard { tab, .. } => {
                let tab = (*tab + Mode::RANKED.len() - 1) % Mode::RANKED.len();
                self.go_to_leaderboard(tab);
            }
            Screen::PracticeSetup { .. } => self.up(),
            _ => {}
        }
    }

    /// Right arrow: next leaderboard tab or practice target
    pub fn right(&mut self) {
        match &self.screen {
            Screen::Leaderboard { tab, .. } => {
                let tab = *tab + 1;
                self.go_to_leaderboard(tab);
            }
            Screen::PracticeSetup { .. } => self.down(),
            _ => {}
        }
    }

    /// Enter: confirm the highlighted choice, submit an answer, or play
    /// again from the game over view
    pub fn select(&mut self, now: Instant) {
        match &mut self.screen {
            Screen::ProfileSelect { profiles, selected } => {
                if let Some(profile) = profiles.get(*selected).cloned() {
                    self.choose_profile(profile);
                }
            }
            Screen::Menu { selected } => {
                let option = MenuOption::all()[*selected];
                self.menu_select(option, now);
            }
            Screen::PracticeSetup { selected } => {
                let target = PRACTICE_TARGETS.get(*selected).copied().unwrap_or(DEFAULT_TARGET);
                self.start_game(Mode::Practice, Some(target), now);
            }
            Screen::Playing { session } => {
                if session.is_over() {
                    self.status = None;
                    session.restart(now);
                } else {
                    session.on_submit(now);
                    self.record_finished();
                }
            }
            Screen::Leaderboard { .. } => {}
        }
    }

    fn choose_profile(&mut self, profile: Profile) {
        if let Err(e) = self.backend.set_current_profile(Some(profile.id)) {
            tracing::warn!(error = %e, "failed to remember profile");
        }
        tracing::info!(profile = %profile.name, "profile selected");
        self.profile = Some(profile);
        self.status = None;
        self.screen = Screen::Menu { selected: 0 };
    }

    fn menu_select(&mut self, option: MenuOption, now: Instant) {
        self.status = None;
        match option {
            MenuOption::Practice => {
                let selected = PRACTICE_TARGETS
                    .iter()
                    .position(|&t| t == DEFAULT_TARGET)
                    .unwrap_or(0);
                self.screen = Screen::PracticeSetup { selected };
            }
            MenuOption::TimeAttack => self.start_game(Mode::TimeAttack, None, now),
            MenuOption::Survival => self.start_game(Mode::Survival, None, now),
            MenuOption::Leaderboard => self.go_to_leaderboard(0),
            MenuOption::SwitchProfile => self.go_to_profile_select(),
            MenuOption::Quit => self.quit(),
        }
    }

    /// Esc: step back one screen, quitting from the top
    pub fn back(&mut self) {
        match &self.screen {
            Screen::ProfileSelect { .. } => {
                if self.profile.is_some() {
                    self.go_to_menu();
                } else {
                    self.quit();
                }
            }
            Screen::Menu { .. } => self.quit(),
            Screen::PracticeSetup { .. } | Screen::Playing { .. } | Screen::Leaderboard { .. } => {
                self.go_to_menu();
            }
        }
    }

    /// Digit key while playing
    pub fn digit(&mut self, digit: char) {
        if let Screen::Playing { session } = &mut self.screen {
            session.on_digit(digit);
        }
    }

    /// Backspace while playing
    pub fn backspace(&mut self) {
        if let Screen::Playing { session } = &mut self.screen {
            session.on_backspace();
        }
    }

    /// Clear key while playing
    pub fn clear(&mut self) {
        if let Screen::Playing { session } = &mut self.screen {
            session.on_clear();
        }
    }

    /// Fire due timers (call regularly)
    pub fn poll(&mut self, now: Instant) {
        if let Screen::Playing { session } = &mut self.screen {
            session.poll_timers(now);
            self.record_finished();
        }
    }

    /// When [`AppCoordinator::poll`] next has work to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match &self.screen {
            Screen::Playing { session } => session.next_deadline(),
            _ => None,
        }
    }

    /// Save the result of a round that just ended
    fn record_finished(&mut self) {
        let Screen::Playing { session } = &mut self.screen else {
            return;
        };
        let Some(result) = session.take_result() else {
            return;
        };

        let Some(profile) = &self.profile else {
            tracing::warn!(?result, "round finished without a profile, result dropped");
            return;
        };

        if let Err(e) = self.backend.record_result(profile.id, &result) {
            tracing::warn!(error = %e, profile_id = profile.id, "failed to save result");
            self.status = Some("Score could not be saved".to_string());
        }
    }
}
