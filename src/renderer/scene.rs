//! Scene drawing: background, map, entities, bars, floating numbers

use glam::Vec2;

use super::{Color, Surface};
use crate::consts::{PLAYFIELD_HEIGHT, PLAYFIELD_WIDTH};
use crate::sim::{
    Enemy, FeedbackColor, FeedbackEvent, GameState, Player, Projectile, ResourcePool, RunMode,
};

const GRASS: Color = [0.18, 0.32, 0.18, 1.0];
const GRASS_DARK: Color = [0.14, 0.27, 0.15, 1.0];
const PATH: Color = [0.45, 0.38, 0.26, 1.0];
const ENEMY: Color = [0.75, 0.2, 0.22, 1.0];
const PROJECTILE: Color = [1.0, 0.85, 0.3, 1.0];
const BAR_BACK: Color = [0.0, 0.0, 0.0, 0.55];
const MANA: Color = [0.25, 0.45, 1.0, 1.0];
const TEXT: Color = [1.0, 1.0, 1.0, 1.0];
const DIM: Color = [0.0, 0.0, 0.0, 0.45];

/// Map tile size in playfield units
const TILE: f32 = 40.0;

/// Health color: green when full -> yellow -> red when empty
fn health_color(fraction: f32, alpha: f32) -> Color {
    let t = fraction.clamp(0.0, 1.0);
    let (r, g, b) = if t > 0.5 {
        // Green to yellow
        let u = (1.0 - t) / 0.5;
        (0.2 + 0.8 * u, 0.85, 0.2)
    } else {
        // Yellow to red
        let u = (0.5 - t) / 0.5;
        (1.0, 0.85 - 0.65 * u, 0.2)
    };
    [r, g, b, alpha]
}

fn class_color(player: &Player) -> Color {
    use crate::sim::ClassKind;
    match player.class {
        ClassKind::Warrior => [0.85, 0.55, 0.25, 1.0],
        ClassKind::Mage => [0.55, 0.4, 0.95, 1.0],
        ClassKind::Ranger => [0.35, 0.8, 0.4, 1.0],
        ClassKind::Cleric => [0.95, 0.95, 0.75, 1.0],
    }
}

/// Deterministic per-tile hash for map decoration
fn tile_hash(x: u32, y: u32) -> u32 {
    x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)
}

pub fn draw_background(s: &mut dyn Surface) {
    s.fill_rect(Vec2::ZERO, Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT), GRASS);
}

pub fn draw_map(s: &mut dyn Surface) {
    let cols = (PLAYFIELD_WIDTH / TILE) as u32;
    let rows = (PLAYFIELD_HEIGHT / TILE) as u32;
    for y in 0..rows {
        for x in 0..cols {
            if tile_hash(x, y) % 5 == 0 {
                let pos = Vec2::new(x as f32 * TILE, y as f32 * TILE);
                s.fill_rect(pos, Vec2::splat(TILE), GRASS_DARK);
            }
        }
    }
    // Crossroads
    let half = TILE / 2.0;
    s.fill_rect(
        Vec2::new(0.0, PLAYFIELD_HEIGHT / 2.0 - half),
        Vec2::new(PLAYFIELD_WIDTH, TILE),
        PATH,
    );
    s.fill_rect(
        Vec2::new(PLAYFIELD_WIDTH / 2.0 - half, 0.0),
        Vec2::new(TILE, PLAYFIELD_HEIGHT),
        PATH,
    );
}

/// Small bar centered above `center`
fn draw_bar(s: &mut dyn Surface, center: Vec2, width: f32, fraction: f32, color: Color) {
    let pos = center - Vec2::new(width / 2.0, 0.0);
    s.fill_rect(pos, Vec2::new(width, 4.0), BAR_BACK);
    s.fill_rect(pos, Vec2::new(width * fraction.clamp(0.0, 1.0), 4.0), color);
}

pub fn draw_player(s: &mut dyn Surface, player: &Player) {
    s.fill_circle(player.pos, player.radius, class_color(player));
    s.stroke_circle(player.pos, player.radius, 2.0, [0.0, 0.0, 0.0, 0.8]);
    s.text(
        player.pos - Vec2::new(0.0, player.radius + 14.0),
        &format!("{} Lv{}", player.name, player.level),
        11.0,
        TEXT,
    );
}

pub fn draw_enemy(s: &mut dyn Surface, enemy: &Enemy) {
    s.fill_circle(enemy.pos, enemy.radius, ENEMY);
    let fraction = enemy.hp.fraction();
    draw_bar(
        s,
        enemy.pos - Vec2::new(0.0, enemy.radius + 8.0),
        enemy.radius * 2.0,
        fraction,
        health_color(fraction, 1.0),
    );
}

pub fn draw_projectile(s: &mut dyn Surface, projectile: &Projectile) {
    s.fill_circle(projectile.pos, projectile.radius, PROJECTILE);
}

/// HUD bars in the top-left corner
pub fn draw_hud(s: &mut dyn Surface, hp: ResourcePool, mana: ResourcePool) {
    let size = Vec2::new(180.0, 12.0);
    for (row, (pool, color)) in [(hp, health_color(hp.fraction(), 1.0)), (mana, MANA)]
        .into_iter()
        .enumerate()
    {
        let pos = Vec2::new(12.0, 12.0 + row as f32 * 18.0);
        s.fill_rect(pos, size, BAR_BACK);
        s.fill_rect(pos, Vec2::new(size.x * pool.fraction(), size.y), color);
        s.text(
            pos + size / 2.0,
            &format!("{:.0}/{:.0}", pool.current(), pool.max()),
            10.0,
            TEXT,
        );
    }
}

/// Draw the whole frame. Without a player only the background and map are drawn.
pub fn draw_scene(s: &mut dyn Surface, state: &GameState) {
    draw_background(s);
    draw_map(s);

    let Some(player) = state.player.as_ref() else {
        return;
    };
    if state.mode == RunMode::Idle {
        return;
    }

    for enemy in &state.enemies {
        draw_enemy(s, enemy);
    }
    for projectile in &state.projectiles {
        draw_projectile(s, projectile);
    }
    draw_player(s, player);
    draw_hud(s, player.hp, player.mana);

    let center = Vec2::new(PLAYFIELD_WIDTH / 2.0, PLAYFIELD_HEIGHT / 2.0);
    match state.mode {
        RunMode::Paused => {
            s.fill_rect(Vec2::ZERO, Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT), DIM);
            s.text(center, "Paused", 32.0, TEXT);
        }
        RunMode::Defeated => {
            s.fill_rect(Vec2::ZERO, Vec2::new(PLAYFIELD_WIDTH, PLAYFIELD_HEIGHT), DIM);
            s.text(center, "Defeated", 40.0, health_color(0.0, 1.0));
        }
        RunMode::Idle | RunMode::Exploring => {}
    }
}

/// Frames a floating number stays visible
const FLOAT_LIFE_FRAMES: u32 = 45;

#[derive(Debug, Clone)]
struct FloatingText {
    pos: Vec2,
    text: String,
    color: Color,
    frames_left: u32,
}

/// Short-lived rising numbers fed from feedback events
#[derive(Debug, Default, Clone)]
pub struct FloatingNumbers {
    items: Vec<FloatingText>,
}

impl FloatingNumbers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Pick up floating-number and status events
    pub fn ingest(&mut self, event: &FeedbackEvent) {
        let (pos, text, color) = match event {
            FeedbackEvent::FloatingNumber { pos, text, color } => {
                let color = match color {
                    FeedbackColor::Damage => [1.0, 1.0, 1.0, 1.0],
                    FeedbackColor::Crit => [1.0, 0.8, 0.1, 1.0],
                    FeedbackColor::Hurt => [1.0, 0.3, 0.3, 1.0],
                    FeedbackColor::Heal => [0.4, 1.0, 0.4, 1.0],
                    FeedbackColor::Mana => MANA,
                    FeedbackColor::Experience => [0.8, 0.6, 1.0, 1.0],
                };
                (*pos, text.clone(), color)
            }
            FeedbackEvent::InsufficientResource { pos, .. } => {
                (*pos, "No mana".to_string(), [0.6, 0.6, 1.0, 1.0])
            }
            FeedbackEvent::LevelUp { level, pos } => {
                (*pos, format!("Level {level}!"), [1.0, 0.9, 0.3, 1.0])
            }
            _ => return,
        };
        self.items.push(FloatingText {
            pos,
            text,
            color,
            frames_left: FLOAT_LIFE_FRAMES,
        });
    }

    /// Rise and fade one frame
    pub fn update(&mut self) {
        for item in &mut self.items {
            item.pos.y -= 0.8;
            item.frames_left = item.frames_left.saturating_sub(1);
        }
        self.items.retain(|i| i.frames_left > 0);
    }

    pub fn draw(&self, s: &mut dyn Surface) {
        for item in &self.items {
            let mut color = item.color;
            color[3] = item.frames_left as f32 / FLOAT_LIFE_FRAMES as f32;
            s.text(item.pos, &item.text, 14.0, color);
        }
    }
}
