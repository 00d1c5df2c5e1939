use crate::boss::Boss;
use crate::config;
use crate::game::{Game, GameResult, Scene, STAGE_COUNT};
use crate::player::PlayerState;
use crate::scrap::{ScrapState, ScrapType};
use crate::utils;
use macroquad::prelude::*;

// State colors, matching the gameplay debug palette: free blue, sucked
// yellow, held green, fired red
fn scrap_color(state: ScrapState, scrap_type: ScrapType) -> Color {
    let mut color = match state {
        ScrapState::Free => Color::from_rgba(0x00, 0x00, 0xff, 0xff),
        ScrapState::BeingSucked => Color::from_rgba(0xff, 0xff, 0x00, 0xff),
        ScrapState::Held => Color::from_rgba(0x1e, 0xd7, 0x60, 0xff),
        ScrapState::Fired => Color::from_rgba(0xff, 0x00, 0x00, 0xff),
        ScrapState::Hit => Color::from_rgba(0xff, 0x88, 0x44, 0xff),
        ScrapState::Idle => Color::from_rgba(0x44, 0x44, 0x44, 0xff),
    };

    // Heavier sizes render more solid
    color.a = match scrap_type {
        ScrapType::Small => 0.67,
        ScrapType::Medium => 0.8,
        ScrapType::Large => 1.0,
    };
    color
}

fn health_gradient_color(ratio: f32) -> Color {
    if ratio > 0.5 {
        let t = (ratio - 0.5) * 2.0;
        Color::new(1.0 - t, 1.0, 0.0, 1.0)
    } else {
        let t = ratio * 2.0;
        Color::new(1.0, t, 0.0, 1.0)
    }
}

fn draw_centered_text(text: &str, y: f32, font_size: f32, color: Color) {
    let dims = measure_text(text, None, font_size as u16, 1.0);
    draw_text(
        text,
        (config::PLAY_AREA_WIDTH - dims.width) * 0.5,
        y,
        font_size,
        color,
    );
}

/// Draws the whole frame from the game state using macroquad shapes only.
pub struct Renderer {
    background: Color,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            background: Color::from_rgba(0x14, 0x12, 0x1c, 0xff),
        }
    }

    pub fn draw_frame(&mut self, game: &Game) {
        clear_background(self.background);

        match game.scene {
            Scene::Title => self.draw_title(),
            Scene::StageSelect => self.draw_stage_select(),
            Scene::Playing => self.draw_playing(game),
            Scene::Result => {
                // Keep the final board visible under the result banner
                self.draw_playing(game);
                self.draw_result(game);
            }
        }
    }

    fn draw_title(&self) {
        draw_centered_text("SCRAPSTORM", 280.0, 96.0, WHITE);
        draw_centered_text("vacuum the scrap, return it to sender", 340.0, 28.0, GRAY);
        draw_centered_text("press ENTER", 460.0, 32.0, YELLOW);
    }

    fn draw_stage_select(&self) {
        draw_centered_text("STAGE SELECT", 220.0, 64.0, WHITE);
        for stage in 1..=STAGE_COUNT {
            let label = format!("[{}]  stage {}", stage, stage);
            draw_centered_text(&label, 300.0 + stage as f32 * 50.0, 32.0, LIGHTGRAY);
        }
        draw_centered_text("ESC to go back", 580.0, 24.0, GRAY);
    }

    fn draw_result(&self, game: &Game) {
        let (banner, color) = match game.result {
            Some(GameResult::Cleared) => ("STAGE CLEAR", GREEN),
            Some(GameResult::Failed) => ("WRECKED", RED),
            None => ("...", GRAY),
        };
        draw_centered_text(banner, 320.0, 96.0, color);
        draw_centered_text("ENTER: title    R: retry", 400.0, 28.0, LIGHTGRAY);
    }

    fn draw_playing(&self, game: &Game) {
        self.draw_boss(&game.boss);
        self.draw_scraps(game);
        self.draw_supply_link(game);
        self.draw_player(game);
        game.particles.draw();
        self.draw_hud(game);

        if game.debug_overlay {
            self.draw_debug_overlay(game);
        }
    }

    fn draw_scraps(&self, game: &Game) {
        for scrap in game.scrap_manager.scraps() {
            if !scrap.is_active {
                continue;
            }

            let color = scrap_color(scrap.state, scrap.scrap_type);
            if scrap.state == ScrapState::Hit {
                // Break effect: expanding ring instead of a body
                draw_circle_lines(
                    scrap.position.x,
                    scrap.position.y,
                    scrap.radius * (1.0 + scrap.hit_timer * 3.0),
                    2.0,
                    color,
                );
                continue;
            }

            draw_circle(scrap.position.x, scrap.position.y, scrap.radius, color);

            // A spoke shows the cosmetic spin
            let spoke = Vec2::new(scrap.angle.cos(), scrap.angle.sin()) * scrap.radius;
            draw_line(
                scrap.position.x,
                scrap.position.y,
                scrap.position.x + spoke.x,
                scrap.position.y + spoke.y,
                1.5,
                Color::new(0.0, 0.0, 0.0, 0.4),
            );
        }
    }

    fn draw_player(&self, game: &Game) {
        let player = &game.player;

        let body_color = match player.draw_state() {
            PlayerState::Normal => SKYBLUE,
            PlayerState::Sucking => Color::from_rgba(0x7f, 0xe0, 0xff, 0xff),
            PlayerState::Shooting => ORANGE,
            PlayerState::DeadEffect => DARKGRAY,
        };

        draw_circle(player.position.x, player.position.y, player.radius, body_color);

        // Nozzle shows aim plus the recoil kick
        let display_angle = player.angle + player.recoil_angle_offset;
        let nozzle = Vec2::new(display_angle.cos(), display_angle.sin());
        draw_line(
            player.position.x,
            player.position.y,
            player.position.x + nozzle.x * player.radius * 1.6,
            player.position.y + nozzle.y * player.radius * 1.6,
            6.0,
            WHITE,
        );

        // Vacuum marker and reach line
        draw_line(
            player.position.x,
            player.position.y,
            player.vacuum_pos.x,
            player.vacuum_pos.y,
            1.0,
            Color::new(1.0, 1.0, 0.0, 0.5),
        );
        draw_circle(player.vacuum_pos.x, player.vacuum_pos.y, 4.0, RED);

        if player.is_sucking {
            draw_circle_lines(
                player.vacuum_pos.x,
                player.vacuum_pos.y,
                game.tuning.vacuum_radius,
                1.0,
                Color::new(1.0, 1.0, 0.0, 0.35),
            );
        }
    }

    fn draw_boss(&self, boss: &Boss) {
        if !boss.is_alive() {
            return;
        }

        draw_circle(
            boss.center.x,
            boss.center.y,
            boss.radius,
            Color::from_rgba(0x66, 0x22, 0x44, 0xff),
        );
        draw_circle_lines(
            boss.center.x,
            boss.center.y,
            boss.radius,
            3.0,
            Color::from_rgba(0xaa, 0x44, 0x66, 0xff),
        );

        for (index, part) in boss.parts.iter().enumerate() {
            if part.is_broken {
                continue;
            }
            let pos = boss.part_position(index);
            draw_circle(pos.x, pos.y, part.radius, Color::from_rgba(0x99, 0x33, 0x55, 0xff));
            draw_circle_lines(pos.x, pos.y, part.radius, 2.0, PINK);
        }

        // Attack telegraphs and active hitboxes
        if let Some((pos, radius)) = boss.punch_telegraph() {
            draw_circle_lines(pos.x, pos.y, radius, 2.0, Color::new(1.0, 0.3, 0.3, 0.8));
        }
        if let Some((pos, radius)) = boss.punch_collider() {
            draw_circle(pos.x, pos.y, radius, Color::new(1.0, 0.3, 0.3, 0.7));
        }
        if let Some((start, end)) = boss.beam_telegraph() {
            draw_line(start.x, start.y, end.x, end.y, 2.0, Color::new(1.0, 0.3, 0.3, 0.6));
        }
        if let Some((start, end, thickness)) = boss.beam_collider() {
            draw_line(
                start.x,
                start.y,
                end.x,
                end.y,
                thickness * 2.0,
                Color::new(1.0, 0.4, 0.2, 0.8),
            );
        }
    }

    // Energy link between player and boss while the supply is in reach,
    // drawn as ticks along a bezier arc
    fn draw_supply_link(&self, game: &Game) {
        if !game.player.is_sucking {
            return;
        }
        if !game
            .boss
            .can_supply_scrap_to_player(game.player.vacuum_pos, game.tuning.vacuum_radius)
        {
            return;
        }

        let start = game.player.position;
        let end = game.boss.center;
        let control = (start + end) * 0.5 + Vec2::new(0.0, -100.0);

        let segments = 24;
        let color = Color::new(0.4, 0.9, 1.0, 0.6);
        for i in 0..segments {
            let t = i as f32 / segments as f32;
            let point = utils::bezier_point(start, control, end, t);
            // Ticks sit perpendicular to the curve direction
            let tangent = utils::bezier_tangent(start, control, end, t);
            let tick = Vec2::new(-tangent.y, tangent.x) * 8.0;
            draw_line(
                point.x - tick.x,
                point.y - tick.y,
                point.x + tick.x,
                point.y + tick.y,
                2.0,
                color,
            );
        }
    }

    fn draw_hud(&self, game: &Game) {
        // Player HP
        let hp_ratio = game.player.hit_point as f32 / game.player.max_hit_point as f32;
        draw_rectangle(
            config::HIT_POINT_GAUGE_X,
            config::HIT_POINT_GAUGE_Y,
            config::HIT_POINT_GAUGE_WIDTH,
            config::HIT_POINT_GAUGE_HEIGHT,
            Color::from_rgba(0x44, 0x44, 0x44, 0xff),
        );
        draw_rectangle(
            config::HIT_POINT_GAUGE_X,
            config::HIT_POINT_GAUGE_Y,
            config::HIT_POINT_GAUGE_WIDTH * hp_ratio,
            config::HIT_POINT_GAUGE_HEIGHT,
            health_gradient_color(hp_ratio),
        );
        draw_rectangle_lines(
            config::HIT_POINT_GAUGE_X,
            config::HIT_POINT_GAUGE_Y,
            config::HIT_POINT_GAUGE_WIDTH,
            config::HIT_POINT_GAUGE_HEIGHT,
            2.0,
            WHITE,
        );

        // Carried weight
        let weight_ratio = game.player.weight_ratio(&game.tuning);
        draw_rectangle(
            config::WEIGHT_GAUGE_X,
            config::WEIGHT_GAUGE_Y,
            config::WEIGHT_GAUGE_WIDTH,
            config::WEIGHT_GAUGE_HEIGHT,
            Color::from_rgba(0x44, 0x44, 0x44, 0xff),
        );
        draw_rectangle(
            config::WEIGHT_GAUGE_X,
            config::WEIGHT_GAUGE_Y,
            config::WEIGHT_GAUGE_WIDTH * weight_ratio,
            config::WEIGHT_GAUGE_HEIGHT,
            SKYBLUE,
        );
        draw_rectangle_lines(
            config::WEIGHT_GAUGE_X,
            config::WEIGHT_GAUGE_Y,
            config::WEIGHT_GAUGE_WIDTH,
            config::WEIGHT_GAUGE_HEIGHT,
            2.0,
            WHITE,
        );

        // Boss HP across the top
        if game.boss.is_alive() {
            let boss_ratio = game.boss.hit_point as f32 / game.boss.max_hit_point as f32;
            let x = (config::PLAY_AREA_WIDTH - config::BOSS_HP_GAUGE_WIDTH) * 0.5;
            draw_rectangle(
                x,
                config::HIT_POINT_GAUGE_Y,
                config::BOSS_HP_GAUGE_WIDTH,
                config::BOSS_HP_GAUGE_HEIGHT,
                Color::from_rgba(0x44, 0x44, 0x44, 0xff),
            );
            draw_rectangle(
                x,
                config::HIT_POINT_GAUGE_Y,
                config::BOSS_HP_GAUGE_WIDTH * boss_ratio,
                config::BOSS_HP_GAUGE_HEIGHT,
                Color::from_rgba(0xaa, 0x44, 0x66, 0xff),
            );
            draw_rectangle_lines(
                x,
                config::HIT_POINT_GAUGE_Y,
                config::BOSS_HP_GAUGE_WIDTH,
                config::BOSS_HP_GAUGE_HEIGHT,
                2.0,
                WHITE,
            );
        }
    }

    fn draw_debug_overlay(&self, game: &Game) {
        for collider in game.collision_manager.colliders() {
            if !collider.is_active {
                continue;
            }
            match collider.shape {
                crate::collision::CollisionShape::Circle { radius } => {
                    draw_circle_lines(
                        collider.position.x,
                        collider.position.y,
                        radius,
                        1.0,
                        GREEN,
                    );
                }
                crate::collision::CollisionShape::Rectangle { width, height, .. } => {
                    draw_rectangle_lines(
                        collider.position.x - width * 0.5,
                        collider.position.y - height * 0.5,
                        width,
                        height,
                        1.0,
                        GREEN,
                    );
                }
                crate::collision::CollisionShape::Line { start, end, .. } => {
                    draw_line(start.x, start.y, end.x, end.y, 1.0, GREEN);
                }
            }
        }

        for event in game.collision_manager.events() {
            draw_circle(event.contact_point.x, event.contact_point.y, 5.0, RED);
        }

        let text = format!(
            "scraps {} (free {})  held {} / {:.0}wt  colliders {}  hits {}",
            game.scrap_manager.active_count(),
            game.scrap_manager.free_count(),
            game.scrap_manager.held_count(),
            game.scrap_manager.held_weight(),
            game.collision_manager.collider_count(),
            game.collision_manager.collision_count(),
        );
        draw_text(&text, 10.0, config::PLAY_AREA_HEIGHT - 10.0, 20.0, GREEN);
    }
}
