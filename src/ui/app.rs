//! Main UI Application
//!
//! Plays the page-controller role: owns the registry and energy store,
//! turns key presses into triggers and unlocks, and draws the scene.

use std::collections::HashSet;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::canvas::{Canvas, Line as CanvasLine, Points},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::achievements::{AchievementRegistry, UnlockOutcome};
use crate::config::ForgeConfig;
use crate::energy::{EnergySimulationStore, EnergyType, Rgb, Vec3};
use crate::storage::{Door, KeyValueStore, PathSelection, PathTiers, load_path, select_path};

/// Half-width of the visible scene in world units
const VIEW_EXTENT: f64 = 6.0;
/// Oblique projection factor for depth
const DEPTH_SKEW: f32 = 0.35;
const MAX_MESSAGES: usize = 6;
/// Consciousness triggers needed for the resonance achievement
const RESONANCE_TRIGGERS: u32 = 5;

/// Main UI application
pub struct App<S> {
    registry: AchievementRegistry<S>,
    store: EnergySimulationStore,
    /// Seed text being typed
    input: String,
    /// Pattern the next Enter triggers
    selected: EnergyType,
    /// Recent status lines, oldest first
    messages: Vec<String>,
    /// Distinct types triggered this session
    triggered: HashSet<EnergyType>,
    consciousness_triggers: u32,
    ambient_particles: usize,
    path_tiers: PathTiers,
    path: Option<PathSelection>,
    rng: StdRng,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(registry: AchievementRegistry<S>, store: EnergySimulationStore, config: &ForgeConfig) -> Self {
        let path = load_path(registry.storage());
        if let Some(path) = &path {
            log::info!("Returning traveller {} ({})", path.identity, path.door.id());
        }

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            registry,
            store,
            input: String::new(),
            selected: EnergyType::Lightning,
            messages: vec!["Type a query and press Enter to strike.".to_string()],
            triggered: HashSet::new(),
            consciousness_triggers: 0,
            ambient_particles: config.ambient_particles,
            path_tiers: config.path_tiers,
            path,
            rng,
        }
    }

    pub fn registry(&self) -> &AchievementRegistry<S> {
        &self.registry
    }

    pub fn store(&self) -> &EnergySimulationStore {
        &self.store
    }

    pub fn selected(&self) -> EnergyType {
        self.selected
    }

    pub fn path(&self) -> Option<&PathSelection> {
        self.path.as_ref()
    }

    /// Handle a key press. Returns true when the app should quit.
    pub fn handle_input(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(true),
            KeyCode::Esc => {
                if self.registry.pending_celebration().is_some() {
                    self.registry.acknowledge_celebration();
                } else {
                    return Ok(true);
                }
            }
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Tab => {
                self.selected = self.selected.next();
                self.push_message(format!("Pattern: {}", self.selected));
            }
            KeyCode::F(2) => {
                self.store.add_ambient_particles(self.ambient_particles, self.selected);
                self.push_message(format!("+{} ambient {} particles", self.ambient_particles, self.selected));
            }
            KeyCode::F(3) => {
                self.store.clear_all();
                self.push_message("Energy cleared".to_string());
            }
            KeyCode::F(n @ 5..=7) => {
                let door = Door::ALL[usize::from(n - 5)];
                self.choose_door(door)?;
            }
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
        Ok(false)
    }

    /// Advance the simulation by one frame
    pub fn update(&mut self, delta: Duration) {
        self.store.advance_simulation(delta.as_secs_f32());
    }

    /// Trigger the selected pattern with the typed text
    fn submit(&mut self) {
        let text = std::mem::take(&mut self.input);
        let count = self.store.trigger_pattern(self.selected, &text);
        self.push_message(format!("{} strike: {} particles", self.selected, count));
        self.record_trigger(self.selected);
    }

    /// Page-level unlock rules
    fn record_trigger(&mut self, energy_type: EnergyType) {
        self.triggered.insert(energy_type);

        match energy_type {
            EnergyType::Lightning => self.unlock("first_lightning"),
            EnergyType::Council => self.unlock("council_master"),
            EnergyType::Consciousness => {
                self.consciousness_triggers += 1;
                self.unlock("consciousness_pioneer");
                if self.consciousness_triggers >= RESONANCE_TRIGGERS {
                    self.unlock("resonance_master");
                }
            }
            EnergyType::Architecture | EnergyType::Adaptive => {}
        }

        if self.triggered.len() >= 3 {
            self.unlock("energy_explorer");
        }
    }

    fn unlock(&mut self, id: &str) {
        if self.registry.unlock_achievement(id) == UnlockOutcome::Unlocked {
            let name = self.registry.achievement(id).map(|a| a.name).unwrap_or(id);
            self.push_message(format!("Unlocked: {}", name));
        }
    }

    fn choose_door(&mut self, door: Door) -> Result<()> {
        let selection = select_path(self.registry.storage(), door, self.path_tiers, &mut self.rng)?;
        self.push_message(format!("Door {} chosen: {}", door.name(), selection.identity));
        self.path = Some(selection);
        Ok(())
    }

    fn push_message(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_header(frame, rows[0]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(rows[1]);
        self.render_scene(frame, columns[0]);
        self.render_sidebar(frame, columns[1]);

        self.render_input(frame, rows[2]);

        if self.registry.pending_celebration().is_some() {
            self.render_celebration(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let accent = hex_color(self.selected.hex_color());
        let mut spans = vec![
            Span::styled("WIRTHFORGE", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("  "),
            Span::styled(format!("[{}]", self.selected), Style::default().fg(accent)),
            Span::raw(format!(
                "  particles {}/{}",
                self.store.live_particle_count(),
                self.store.energy_flow().particles.len()
            )),
        ];

        if self.store.is_generating() {
            spans.push(Span::styled(
                "  ⚡ generating",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ));
        }

        if let Some(path) = &self.path {
            spans.push(Span::styled(
                format!("  {} · {}", path.door.name(), path.identity),
                Style::default().fg(hex_color(path.door.color())),
            ));
        }

        let header = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, area);
    }

    fn render_scene(&self, frame: &mut Frame, area: Rect) {
        let flow = self.store.energy_flow();
        let strike = self.store.strikes().last().filter(|_| self.store.is_generating());

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} field ", flow.energy_type)),
            )
            .marker(Marker::Braille)
            .x_bounds([-VIEW_EXTENT, VIEW_EXTENT])
            .y_bounds([-VIEW_EXTENT, VIEW_EXTENT])
            .paint(|ctx| {
                if let Some(strike) = strike {
                    let color = hex_color(&strike.color);
                    for branch in &strike.branches {
                        for pair in branch.windows(2) {
                            let (x1, y1) = project(pair[0]);
                            let (x2, y2) = project(pair[1]);
                            ctx.draw(&CanvasLine { x1, y1, x2, y2, color });
                        }
                    }
                }

                for particle in flow.live_particles() {
                    let fade = 0.3 + 0.7 * particle.remaining_fraction();
                    let (r, g, b) = particle.color.scaled(fade).to_u8();
                    ctx.draw(&Points {
                        coords: &[project(particle.position)],
                        color: Color::Rgb(r, g, b),
                    });
                }
            });

        frame.render_widget(canvas, area);
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let sections = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(7), Constraint::Length(MAX_MESSAGES as u16 + 2)])
            .split(area);

        let (unlocked, total) = self.registry.progress();
        let lines: Vec<Line> = self
            .registry
            .catalog()
            .iter()
            .map(|a| {
                if self.registry.is_unlocked(a.id) {
                    Line::from(Span::styled(format!("✓ {}", a.name), Style::default().fg(Color::Green)))
                } else {
                    Line::from(Span::styled(format!("· {}", a.name), Style::default().fg(Color::DarkGray)))
                }
            })
            .collect();

        let achievements = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Achievements {}/{} ", unlocked, total)),
        );
        frame.render_widget(achievements, sections[0]);

        let log_lines: Vec<Line> = self.messages.iter().map(|m| Line::from(m.as_str())).collect();
        let log = Paragraph::new(log_lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Log "));
        frame.render_widget(log, sections[1]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect) {
        let input = Paragraph::new(Line::from(vec![
            Span::styled("> ", Style::default().fg(hex_color(self.selected.hex_color()))),
            Span::raw(self.input.as_str()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Enter: trigger  Tab: pattern  F2: ambient  F3: clear  F5-F7: door  Esc: quit "),
        );
        frame.render_widget(input, area);
    }

    fn render_celebration(&self, frame: &mut Frame, area: Rect) {
        let Some(achievement) = self.registry.pending_celebration() else {
            return;
        };

        let popup = centered_rect(50, 30, area);
        let text = vec![
            Line::from(Span::styled(
                achievement.name,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(achievement.description),
            Line::from(Span::styled(
                achievement.burst_pattern.unwrap_or("energy_burst"),
                Style::default().fg(Color::Magenta),
            )),
            Line::from(""),
            Line::from(Span::styled("Esc to continue", Style::default().fg(Color::DarkGray))),
        ];

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(text)
                .alignment(ratatui::layout::Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow))
                        .title(" Achievement Unlocked "),
                ),
            popup,
        );
    }
}

/// World position to canvas coordinates, skewing depth up and to the right
fn project(position: Vec3) -> (f64, f64) {
    let x = position.x + position.z * DEPTH_SKEW;
    let y = position.y + position.z * DEPTH_SKEW;
    (x as f64, y as f64)
}

fn hex_color(hex: &str) -> Color {
    let (r, g, b) = Rgb::from_hex(hex).unwrap_or(Rgb::new(1.0, 1.0, 1.0)).to_u8();
    Color::Rgb(r, g, b)
}

/// Rect of the given percentage size centred in `area`
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, PATH_KEY};
    use ratatui::{Terminal, backend::TestBackend};

    fn app() -> App<MemoryStore> {
        let mut registry = AchievementRegistry::new(MemoryStore::new());
        registry.initialize();
        let config = ForgeConfig {
            rng_seed: Some(3),
            ..ForgeConfig::default()
        };
        App::new(registry, EnergySimulationStore::with_seed(3), &config)
    }

    fn press(app: &mut App<MemoryStore>, code: KeyCode) -> bool {
        app.handle_input(KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_text(app: &mut App<MemoryStore>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_strike_unlocks_first_lightning() {
        let mut app = app();
        type_text(&mut app, "hello");
        assert!(!press(&mut app, KeyCode::Enter));

        assert_eq!(app.store().energy_flow().particles.len(), 10);
        assert!(app.store().is_generating());
        assert!(app.registry().is_unlocked("first_lightning"));
        assert_eq!(
            app.registry().pending_celebration().map(|a| a.id),
            Some("first_lightning")
        );

        // First Esc dismisses the celebration, second quits
        assert!(!press(&mut app, KeyCode::Esc));
        assert!(app.registry().pending_celebration().is_none());
        assert!(press(&mut app, KeyCode::Esc));
    }

    #[test]
    fn test_three_patterns_unlock_explorer() {
        let mut app = app();
        press(&mut app, KeyCode::Enter); // lightning
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.selected(), EnergyType::Council);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Tab);
        assert!(!app.registry().is_unlocked("energy_explorer"));
        press(&mut app, KeyCode::Enter); // architecture

        assert!(app.registry().is_unlocked("energy_explorer"));
        assert_eq!(app.registry().progress(), (3, 5));
    }

    #[test]
    fn test_resonance_after_repeated_consciousness() {
        let mut app = app();
        for _ in 0..4 {
            press(&mut app, KeyCode::Tab);
        }
        assert_eq!(app.selected(), EnergyType::Consciousness);

        for i in 0..RESONANCE_TRIGGERS {
            assert!(!app.registry().is_unlocked("resonance_master"), "early at {}", i);
            type_text(&mut app, "om");
            press(&mut app, KeyCode::Enter);
        }
        assert!(app.registry().is_unlocked("resonance_master"));
    }

    #[test]
    fn test_editing_and_time() {
        let mut app = app();
        type_text(&mut app, "abcd");
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store().energy_flow().particles.len(), 6);

        app.update(Duration::from_secs(1));
        assert!(!app.store().is_generating());

        press(&mut app, KeyCode::F(2));
        assert_eq!(app.store().energy_flow().particles.len(), 6 + 50);
        press(&mut app, KeyCode::F(3));
        assert!(app.store().energy_flow().particles.is_empty());
    }

    #[test]
    fn test_door_choice_is_persisted() {
        let mut app = app();
        press(&mut app, KeyCode::F(6));

        let path = app.path().unwrap();
        assert_eq!(path.door, Door::Scholar);
        assert!(app.registry().storage().get(PATH_KEY).unwrap().is_some());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let mut app = app();
        let quit = app
            .handle_input(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
            .unwrap();
        assert!(quit);
    }

    #[test]
    fn test_render_smoke() {
        let mut app = app();
        type_text(&mut app, "render me");
        press(&mut app, KeyCode::Enter);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("WIRTHFORGE"));
        assert!(text.contains("Achievement Unlocked"));
    }
}
