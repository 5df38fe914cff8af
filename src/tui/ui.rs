//! UI rendering using ratatui
//!
//! Supports multiple screens:
//! - ProfileSelect: who is playing
//! - Menu: Main menu with options
//! - PracticeSetup: question count for practice
//! - Playing: In-game screen, and the game over summary
//! - Leaderboard: best results per ranked mode

use crate::app::{AppCoordinator, GameSession, MenuOption, Screen};
use crate::game::round::{Mode, RoundSnapshot, INITIAL_LIVES, PRACTICE_TARGETS};
use crate::storage::{LeaderboardEntry, Profile};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table, Tabs},
};

/// Render the appropriate screen based on app state
pub fn render(frame: &mut Frame, coordinator: &AppCoordinator) {
    match &coordinator.screen {
        Screen::ProfileSelect { profiles, selected } => {
            render_profile_select(frame, profiles, *selected);
        }
        Screen::Menu { selected } => {
            render_menu(frame, *selected, coordinator.profile(), coordinator.status.as_deref());
        }
        Screen::PracticeSetup { selected } => {
            render_practice_setup(frame, *selected);
        }
        Screen::Playing { session } => {
            render_game(frame, session, coordinator.profile(), coordinator.status.as_deref());
        }
        Screen::Leaderboard { tab, entries } => {
            render_leaderboard(frame, *tab, entries);
        }
    }
}

const LOGO: &str = r#"
 __  __       _   _     __     ___ _
|  \/  | __ _| |_| |__  \ \   / (_) |__   ___
| |\/| |/ _` | __| '_ \  \ \ / /| | '_ \ / _ \
| |  | | (_| | |_| | | |  \ V / | | |_) |  __/
|_|  |_|\__,_|\__|_| |_|   \_/  |_|_.__/ \___|
"#;

/// Render the profile picker
fn render_profile_select(frame: &mut Frame, profiles: &[Profile], selected: usize) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Logo
            Constraint::Length(2), // Prompt
            Constraint::Min(4),    // Profiles
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let logo = Paragraph::new(LOGO)
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center);
    frame.render_widget(logo, layout[0]);

    let prompt = Paragraph::new("Who's playing?")
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(prompt, layout[1]);

    let items: Vec<ListItem> = profiles
        .iter()
        .enumerate()
        .map(|(i, profile)| {
            let prefix = if i == selected { "> " } else { "  " };
            let mut name_style = Style::default().fg(Color::White);
            if i == selected {
                name_style = name_style.bold();
            }
            ListItem::new(Line::from(vec![
                Span::raw(prefix),
                Span::styled("● ", Style::default().fg(avatar_color(&profile.avatar_color))),
                Span::styled(profile.name.clone(), name_style),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default());
    frame.render_widget(list, centered(layout[2], 24));

    let footer = Paragraph::new("↑↓ Navigate  Enter Select  Esc Back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[3]);
}

/// Render the main menu
fn render_menu(frame: &mut Frame, selected: usize, profile: Option<&Profile>, status: Option<&str>) {
    let area = frame.area();

    // Main layout
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Logo
            Constraint::Length(2), // Player
            Constraint::Min(6),    // Menu options
            Constraint::Length(1), // Status
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let logo = Paragraph::new(LOGO)
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center);
    frame.render_widget(logo, layout[0]);

    if let Some(profile) = profile {
        let player = Paragraph::new(profile_line(profile)).alignment(Alignment::Center);
        frame.render_widget(player, layout[1]);
    }

    // Menu options
    let items: Vec<ListItem> = MenuOption::all()
        .iter()
        .enumerate()
        .map(|(i, opt)| {
            let style = if i == selected {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::White)
            };
            let prefix = if i == selected { "> " } else { "  " };
            ListItem::new(format!("{}{}", prefix, opt.label())).style(style)
        })
        .collect();

    let menu = List::new(items).block(Block::default());
    frame.render_widget(menu, centered(layout[2], 20));

    render_status(frame, layout[3], status);

    // Footer
    let footer = Paragraph::new("↑↓ Navigate  Enter Select  Esc Quit")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[4]);
}

/// Render the practice question count picker
fn render_practice_setup(frame: &mut Frame, selected: usize) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Length(2), // Title
            Constraint::Length(3), // Options
            Constraint::Min(0),
            Constraint::Length(2), // Footer
        ])
        .margin(2)
        .split(area);

    let title = Paragraph::new("How many questions?")
        .style(Style::default().fg(Color::Cyan).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, layout[1]);

    let mut spans = Vec::new();
    for (i, target) in PRACTICE_TARGETS.iter().enumerate() {
        let style = if i == selected {
            Style::default().fg(Color::Black).bg(Color::Yellow).bold()
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("  {}  ", target), style));
        spans.push(Span::raw("   "));
    }
    let options = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(options, layout[2]);

    let footer = Paragraph::new("←→ Choose  Enter Start  Esc Back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[4]);
}

/// Render the in-game screen
fn render_game(frame: &mut Frame, session: &GameSession, profile: Option<&Profile>, status: Option<&str>) {
    let area = frame.area();
    let snapshot = session.snapshot();

    // Main layout: header (3 lines) + content
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with player, progress
            Constraint::Min(0),    // Main content area
        ])
        .split(area);

    render_header(frame, layout[0], &snapshot, profile);

    if snapshot.is_over() {
        render_game_over(frame, layout[1], &snapshot, status);
    } else {
        render_problem(frame, layout[1], &snapshot, &session.feedback);
    }
}

/// Render the header: player, score, and the mode's progress indicator
fn render_header(frame: &mut Frame, area: Rect, snapshot: &RoundSnapshot, profile: Option<&Profile>) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Split header into: player | score | progress
    let header_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(16), // Player
            Constraint::Min(10),    // Score
            Constraint::Length(16), // Timer, hearts or question count
        ])
        .split(inner);

    if let Some(profile) = profile {
        let player = Paragraph::new(profile_line(profile)).alignment(Alignment::Left);
        frame.render_widget(player, header_layout[0]);
    }

    let score = Paragraph::new(format!("{}  |  Score: {}", snapshot.mode.label(), snapshot.score))
        .style(Style::default().fg(Color::Magenta).bold())
        .alignment(Alignment::Center);
    frame.render_widget(score, header_layout[1]);

    let progress = match snapshot.mode {
        Mode::TimeAttack => {
            let timer_color = if snapshot.time_left <= 10 {
                Color::Red
            } else if snapshot.time_left <= 30 {
                Color::Yellow
            } else {
                Color::Green
            };
            Paragraph::new(format_timer(snapshot.time_left))
                .style(Style::default().fg(timer_color).bold())
        }
        Mode::Survival => Paragraph::new(format_hearts(snapshot.lives, INITIAL_LIVES))
            .style(Style::default().fg(Color::Red).bold()),
        Mode::Practice => Paragraph::new(format!(
            "{}/{}",
            snapshot.total_questions, snapshot.target_questions
        ))
        .style(Style::default().fg(Color::Cyan).bold()),
    };
    frame.render_widget(progress.alignment(Alignment::Right), header_layout[2]);
}

/// Render the current problem, the typed answer and feedback
fn render_problem(frame: &mut Frame, area: Rect, snapshot: &RoundSnapshot, feedback: &str) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(1), // Problem
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Input line
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Feedback line
            Constraint::Min(0),    // Remaining space
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let problem_text = snapshot
        .problem
        .as_ref()
        .map(|p| format!("{} = ?", p.display))
        .unwrap_or_default();
    let problem = Paragraph::new(problem_text)
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center);
    frame.render_widget(problem, main_layout[1]);

    // Input line: struck through in red while the correct answer is shown
    let input = match snapshot.revealed_answer {
        Some(answer) => Line::from(vec![
            Span::styled(
                snapshot.input.clone(),
                Style::default().fg(Color::Red).add_modifier(Modifier::CROSSED_OUT),
            ),
            Span::raw("  "),
            Span::styled(answer.to_string(), Style::default().fg(Color::Green).bold()),
        ]),
        None => Line::from(format!("> {}_", snapshot.input)),
    };
    frame.render_widget(Paragraph::new(input).alignment(Alignment::Center), main_layout[3]);

    let (feedback_text, feedback_color) = format_feedback(feedback);
    let feedback = Paragraph::new(feedback_text)
        .style(Style::default().fg(feedback_color))
        .alignment(Alignment::Center);
    frame.render_widget(feedback, main_layout[5]);

    let footer = Paragraph::new("0-9 Type  Enter Submit  Backspace Delete  C Clear  Esc Menu")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, main_layout[7]);
}

/// Render the end-of-round summary
fn render_game_over(frame: &mut Frame, area: Rect, snapshot: &RoundSnapshot, status: Option<&str>) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Final score
            Constraint::Length(1), // Answered
            Constraint::Length(1), // Accuracy
            Constraint::Length(1), // Spacer
            Constraint::Length(1), // Status
            Constraint::Length(1), // Instructions
            Constraint::Min(0),    // Remaining space
        ])
        .split(area);

    let (title, title_color) = match snapshot.mode {
        Mode::Practice => ("DONE! Great job!", Color::Green),
        Mode::TimeAttack => ("TIME'S UP!", Color::Red),
        Mode::Survival => ("GAME OVER", Color::Red),
    };
    let title = Paragraph::new(title)
        .style(Style::default().fg(title_color).bold())
        .alignment(Alignment::Center);
    frame.render_widget(title, main_layout[0]);

    let score = Paragraph::new(format!("Final Score: {}", snapshot.score))
        .style(Style::default().fg(Color::Yellow).bold())
        .alignment(Alignment::Center);
    frame.render_widget(score, main_layout[2]);

    let answered = Paragraph::new(format!(
        "Correct: {} / {}",
        snapshot.score, snapshot.total_questions
    ))
    .style(Style::default().fg(Color::Cyan))
    .alignment(Alignment::Center);
    frame.render_widget(answered, main_layout[3]);

    let accuracy = Paragraph::new(format!("Accuracy: {}%", snapshot.accuracy))
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);
    frame.render_widget(accuracy, main_layout[4]);

    render_status(frame, main_layout[6], status);

    let instructions = Paragraph::new("Enter Play again  Esc Menu")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(instructions, main_layout[7]);
}

/// Render the leaderboard with one tab per ranked mode
fn render_leaderboard(frame: &mut Frame, tab: usize, entries: &[LeaderboardEntry]) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tabs
            Constraint::Min(4),    // Table
            Constraint::Length(2), // Footer
        ])
        .margin(1)
        .split(area);

    let titles: Vec<&str> = Mode::RANKED.iter().map(|m| m.label()).collect();
    let tabs = Tabs::new(titles)
        .select(tab)
        .block(Block::default().borders(Borders::BOTTOM).title("Leaderboard"))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow).bold());
    frame.render_widget(tabs, layout[0]);

    if entries.is_empty() {
        let empty = Paragraph::new("No scores yet. Be the first!")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(empty, layout[1]);
    } else {
        let rows: Vec<Row> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let rank_style = match i {
                    0 => Style::default().fg(Color::Yellow).bold(),
                    1 | 2 => Style::default().fg(Color::White).bold(),
                    _ => Style::default().fg(Color::DarkGray),
                };
                Row::new(vec![
                    Cell::from(format!("{}.", i + 1)).style(rank_style),
                    Cell::from(Line::from(vec![
                        Span::styled("● ", Style::default().fg(avatar_color(&entry.avatar_color))),
                        Span::raw(entry.profile_name.clone()),
                    ])),
                    Cell::from(entry.result.score.to_string())
                        .style(Style::default().fg(Color::Magenta).bold()),
                    Cell::from(format!("{}%", entry.result.accuracy())),
                    Cell::from(entry.played_on.clone()).style(Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Min(12),
                Constraint::Length(6),
                Constraint::Length(6),
                Constraint::Length(11),
            ],
        )
        .header(
            Row::new(vec!["#", "Player", "Score", "Acc", "Date"])
                .style(Style::default().fg(Color::Cyan).bold()),
        )
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(table, layout[1]);
    }

    let footer = Paragraph::new("←→ Switch mode  Esc Back")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(footer, layout[2]);
}

fn render_status(frame: &mut Frame, area: Rect, status: Option<&str>) {
    if let Some(status) = status {
        let widget = Paragraph::new(status)
            .style(Style::default().fg(Color::Yellow))
            .alignment(Alignment::Center);
        frame.render_widget(widget, area);
    }
}

fn profile_line(profile: &Profile) -> Line<'static> {
    Line::from(vec![
        Span::styled("● ", Style::default().fg(avatar_color(&profile.avatar_color))),
        Span::styled(profile.name.clone(), Style::default().fg(Color::White).bold()),
    ])
}

/// A horizontally centered column of `width` cells
fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

/// Parse a `#RRGGBB` avatar color, white if malformed
fn avatar_color(hex: &str) -> Color {
    let Some(digits) = hex.strip_prefix('#') else {
        return Color::White;
    };
    if digits.len() != 6 {
        return Color::White;
    }
    match u32::from_str_radix(digits, 16) {
        Ok(rgb) => Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8),
        Err(_) => Color::White,
    }
}

/// Format the timer display
fn format_timer(seconds: u32) -> String {
    let mins = seconds / 60;
    let secs = seconds % 60;
    format!("{}:{:02}", mins, secs)
}

/// Full hearts for remaining lives, empty for lost ones
fn format_hearts(lives: u32, max: u32) -> String {
    let lost = max.saturating_sub(lives);
    let mut hearts: Vec<&str> = Vec::new();
    hearts.extend(std::iter::repeat("♥").take(lives.min(max) as usize));
    hearts.extend(std::iter::repeat("♡").take(lost as usize));
    hearts.join(" ")
}

/// Format feedback with appropriate color
fn format_feedback(feedback: &str) -> (String, Color) {
    if feedback.is_empty() {
        return (String::new(), Color::White);
    }

    let color = if feedback.starts_with("OK") || feedback.starts_with("DONE") {
        Color::Green
    } else if feedback.starts_with("WRONG") || feedback.starts_with("GAME OVER") {
        Color::Red
    } else if feedback.starts_with("MISS") || feedback.starts_with("TIME'S UP") {
        Color::Yellow
    } else {
        Color::White
    };

    (feedback.to_string(), color)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timer() {
        assert_eq!(format_timer(60), "1:00");
        assert_eq!(format_timer(59), "0:59");
        assert_eq!(format_timer(5), "0:05");
        assert_eq!(format_timer(0), "0:00");
    }

    #[test]
    fn test_format_hearts() {
        assert_eq!(format_hearts(3, 3), "♥ ♥ ♥");
        assert_eq!(format_hearts(1, 3), "♥ ♡ ♡");
        assert_eq!(format_hearts(0, 3), "♡ ♡ ♡");
    }

    #[test]
    fn test_avatar_color() {
        assert_eq!(avatar_color("#FF6B9D"), Color::Rgb(0xFF, 0x6B, 0x9D));
        assert_eq!(avatar_color("#4ecdc4"), Color::Rgb(0x4E, 0xCD, 0xC4));
        assert_eq!(avatar_color("FF6B9D"), Color::White);
        assert_eq!(avatar_color("#FFF"), Color::White);
        assert_eq!(avatar_color("#GGGGGG"), Color::White);
    }

    #[test]
    fn test_format_feedback_colors() {
        assert_eq!(format_feedback("OK! Correct").1, Color::Green);
        assert_eq!(format_feedback("WRONG! The answer is 7").1, Color::Red);
        assert_eq!(format_feedback("MISS").1, Color::Yellow);
        assert_eq!(format_feedback("").0, "");
    }

    #[test]
    fn test_centered() {
        let area = Rect::new(0, 0, 80, 10);
        let column = centered(area, 20);
        assert_eq!(column.x, 30);
        assert_eq!(column.width, 20);
        assert_eq!(column.height, 10);

        let narrow = centered(Rect::new(5, 0, 10, 1), 20);
        assert_eq!(narrow.x, 5);
        assert_eq!(narrow.width, 10);
    }
}
