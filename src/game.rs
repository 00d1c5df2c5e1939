use crate::boss::Boss;
use crate::collision::{CollisionHit, CollisionLayer, CollisionManager, ColliderOwner};
use crate::config;
use crate::particles::ParticleSystem;
use crate::player::{Player, PlayerInput};
use crate::render::Renderer;
use crate::scrap::{ScrapState, ScrapType};
use crate::scrap_manager::{ScrapGenerateSize, ScrapManager};
use crate::tuning::Tuning;
use log::info;
use macroquad::input::{
    is_key_down, is_key_pressed, is_mouse_button_down, mouse_position, KeyCode, MouseButton,
};
use macroquad::math::Vec2;
use macroquad::time::get_frame_time;
use macroquad::window::next_frame;

// Contact damage dealt to the player, gated by a short mercy window
const PUNCH_DAMAGE: i32 = 15;
const BEAM_DAMAGE: i32 = 10;
const TOUCH_DAMAGE: i32 = 5;
const PLAYER_HIT_COOLDOWN: f32 = 0.5;

pub const STAGE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Title,
    StageSelect,
    Playing,
    Result,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Cleared,
    Failed,
}

/// Owns the whole simulation and the scene flow around it. One `step` is one
/// fixed 60Hz frame of the gameplay pipeline: player control, scrap pool,
/// boss behavior, collision dispatch, particles, win/lose.
pub struct Game {
    pub scene: Scene,
    pub stage: usize,
    pub result: Option<GameResult>,

    pub player: Player,
    pub scrap_manager: ScrapManager,
    pub collision_manager: CollisionManager,
    pub boss: Boss,
    pub particles: ParticleSystem,
    pub tuning: Tuning,

    pub debug_overlay: bool,

    player_hit_cooldown: f32,
    was_shooting: bool,
    time_accumulator: f32,
}

impl Game {
    pub fn new(tuning: Tuning) -> Self {
        Game {
            scene: Scene::Title,
            stage: 1,
            result: None,
            player: Player::new(),
            scrap_manager: ScrapManager::new(),
            collision_manager: CollisionManager::new(),
            boss: Boss::new(300),
            particles: ParticleSystem::new(),
            tuning,
            debug_overlay: false,
            player_hit_cooldown: 0.0,
            was_shooting: false,
            time_accumulator: 0.0,
        }
    }

    /// Reset and seed everything for a stage, then enter Playing
    pub fn start_stage(&mut self, stage: usize) {
        let stage = stage.clamp(1, STAGE_COUNT);
        info!("Starting stage {}", stage);

        self.stage = stage;
        self.result = None;
        self.player.initialize();
        self.scrap_manager.initialize();
        self.collision_manager.clear_all_colliders();
        self.particles.clear();
        self.player_hit_cooldown = 0.0;
        self.was_shooting = false;
        self.time_accumulator = 0.0;

        let field_center = Vec2::new(
            config::PLAY_AREA_WIDTH * 0.5,
            config::PLAY_AREA_HEIGHT * 0.5,
        );

        match stage {
            1 => {
                self.boss = Boss::new(200);
                self.scrap_manager.spawn_scrap_random(
                    field_center,
                    20,
                    100.0,
                    300.0,
                    ScrapType::Small,
                );
            }
            2 => {
                self.boss = Boss::new(300);
                self.scrap_manager.spawn_scrap_circle(
                    field_center,
                    12,
                    180.0,
                    ScrapType::Small,
                    60.0,
                );
                self.scrap_manager.spawn_scrap_random(
                    field_center,
                    8,
                    120.0,
                    280.0,
                    ScrapType::Medium,
                );
            }
            _ => {
                self.boss = Boss::new(400);
                self.scrap_manager.spawn_scrap_explosion_kinds(
                    field_center,
                    24,
                    4,
                    ScrapGenerateSize::SmallAndMediumAndLarge,
                    180.0,
                    6,
                );
            }
        }

        self.scene = Scene::Playing;
    }

    fn finish(&mut self, result: GameResult) {
        info!("Stage {} finished: {:?}", self.stage, result);
        self.result = Some(result);
        self.scene = Scene::Result;
    }

    /// One fixed simulation step of the gameplay scene
    pub fn step(&mut self, input: &PlayerInput) {
        if self.scene != Scene::Playing {
            return;
        }

        let dt = config::SIM_DT;

        // Player control loop: aim, suction, fire, movement, recoil
        self.player.update(
            dt,
            input,
            &self.tuning,
            Some(&mut self.scrap_manager),
            Some(&mut self.boss),
        );

        // Scrap pool: per-scrap updates, pack resolution, arrangement, culling
        self.scrap_manager
            .update(dt, self.player.vacuum_pos, self.player.is_sucking);

        // Boss behavior and its scrap generators
        if self.boss.is_alive() {
            self.boss
                .update(dt, self.player.position, &mut self.scrap_manager);
        }

        // Collision detection and typed dispatch
        self.register_colliders();
        let hits = self.collision_manager.process_all_collisions();
        self.consume_hits(&hits);

        // Cosmetic feedback
        if self.player.is_sucking {
            self.particles
                .emit_suction_dust(self.player.vacuum_pos, self.tuning.vacuum_radius);
        }
        if self.player.is_shooting && !self.was_shooting {
            self.particles
                .emit_fire_burst(self.player.vacuum_pos, self.player.fire_direction());
        }
        self.was_shooting = self.player.is_shooting;
        self.particles.update(dt);

        if self.player_hit_cooldown > 0.0 {
            self.player_hit_cooldown -= dt;
        }

        if !self.boss.is_alive() {
            self.finish(GameResult::Cleared);
        } else if !self.player.is_alive {
            self.finish(GameResult::Failed);
        }
    }

    // Colliders are rebuilt every frame: entity positions are fresh and the
    // scrap indices registered here stay valid until the hits are consumed
    // below, before the pool is compacted again.
    fn register_colliders(&mut self) {
        self.collision_manager.clear_all_colliders();

        self.collision_manager.register_circle_collider(
            CollisionLayer::Player,
            self.player.position,
            self.player.radius,
            ColliderOwner::Player,
        );

        if self.boss.is_alive() {
            self.collision_manager.register_circle_collider(
                CollisionLayer::Boss,
                self.boss.center,
                self.boss.radius,
                ColliderOwner::Boss,
            );

            for (index, part) in self.boss.parts.iter().enumerate() {
                if part.is_broken {
                    continue;
                }
                self.collision_manager.register_circle_collider(
                    CollisionLayer::BossPart,
                    self.boss.part_position(index),
                    part.radius,
                    ColliderOwner::BossPart(index),
                );
            }

            if let Some((punch_pos, punch_radius)) = self.boss.punch_collider() {
                self.collision_manager.register_circle_collider(
                    CollisionLayer::BossWeapon,
                    punch_pos,
                    punch_radius,
                    ColliderOwner::BossWeapon,
                );
            }

            if let Some((start, end, thickness)) = self.boss.beam_collider() {
                self.collision_manager.register_line_collider(
                    CollisionLayer::BossWeapon,
                    start,
                    end,
                    thickness,
                    ColliderOwner::BossWeapon,
                );
            }
        }

        for (index, scrap) in self.scrap_manager.scraps().iter().enumerate() {
            if scrap.is_active && scrap.state == ScrapState::Fired {
                self.collision_manager.register_circle_collider(
                    CollisionLayer::PlayerWeapon,
                    scrap.position,
                    scrap.collision_radius(),
                    ColliderOwner::Scrap(index),
                );
            }
        }
    }

    fn consume_hits(&mut self, hits: &[CollisionHit]) {
        for hit in hits {
            match *hit {
                CollisionHit::ScrapHitBoss { scrap, event } => {
                    let Some(scrap) = self.scrap_manager.scrap_mut(scrap) else {
                        continue;
                    };
                    // A scrap only lands once
                    if scrap.state != ScrapState::Fired {
                        continue;
                    }
                    let damage = scrap.damage(&self.tuning);
                    scrap.state = ScrapState::Hit;
                    scrap.velocity = Vec2::ZERO;
                    self.boss.take_damage(damage);
                    self.particles.emit_explosion(event.contact_point);
                }
                CollisionHit::ScrapHitBossPart { scrap, part, event } => {
                    let Some(scrap) = self.scrap_manager.scrap_mut(scrap) else {
                        continue;
                    };
                    if scrap.state != ScrapState::Fired {
                        continue;
                    }
                    let damage = scrap.damage(&self.tuning);
                    scrap.state = ScrapState::Hit;
                    scrap.velocity = Vec2::ZERO;
                    self.boss.damage_part(part, damage);
                    self.particles.emit_hit_spark(event.contact_point);
                }
                CollisionHit::BossAttackHitPlayer { event } => {
                    if self.player_hit_cooldown > 0.0 {
                        continue;
                    }
                    self.player_hit_cooldown = PLAYER_HIT_COOLDOWN;
                    // Punches hit harder than beam ticks
                    let damage = if self.boss.punch_collider().is_some() {
                        PUNCH_DAMAGE
                    } else {
                        BEAM_DAMAGE
                    };
                    self.player.take_damage(damage);
                    self.particles.emit_hit_spark(event.contact_point);
                }
                CollisionHit::PlayerTouchBoss { event } => {
                    if self.player_hit_cooldown > 0.0 {
                        continue;
                    }
                    self.player_hit_cooldown = PLAYER_HIT_COOLDOWN;
                    self.player.take_damage(TOUCH_DAMAGE);
                    self.particles.emit_hit_spark(event.contact_point);
                }
            }
        }
    }

    // ========================================
    // Main loop (macroquad)
    // ========================================

    pub async fn run(&mut self, renderer: &mut Renderer) {
        info!("Starting main loop");

        loop {
            if is_key_pressed(KeyCode::F1) {
                self.debug_overlay = !self.debug_overlay;
            }

            match self.scene {
                Scene::Title => {
                    if is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::Space) {
                        self.scene = Scene::StageSelect;
                    }
                }
                Scene::StageSelect => {
                    if is_key_pressed(KeyCode::Key1) {
                        self.start_stage(1);
                    } else if is_key_pressed(KeyCode::Key2) {
                        self.start_stage(2);
                    } else if is_key_pressed(KeyCode::Key3) {
                        self.start_stage(3);
                    } else if is_key_pressed(KeyCode::Escape) {
                        self.scene = Scene::Title;
                    }
                }
                Scene::Playing => {
                    if is_key_pressed(KeyCode::Escape) {
                        self.scene = Scene::Title;
                    } else {
                        let input = poll_input();
                        self.time_accumulator += get_frame_time();
                        // Fixed-step updates, draining the accumulator
                        while self.time_accumulator >= config::SIM_DT {
                            self.time_accumulator -= config::SIM_DT;
                            self.step(&input);
                        }
                    }
                }
                Scene::Result => {
                    if is_key_pressed(KeyCode::Enter) {
                        self.scene = Scene::Title;
                    } else if is_key_pressed(KeyCode::R) {
                        self.start_stage(self.stage);
                    }
                }
            }

            renderer.draw_frame(self);
            next_frame().await;
        }
    }
}

// Snapshot the devices into the input struct the simulation consumes
fn poll_input() -> PlayerInput {
    let mut move_axis = Vec2::ZERO;
    if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
        move_axis.y -= 1.0;
    }
    if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
        move_axis.y += 1.0;
    }
    if is_key_down(KeyCode::A) || is_key_down(KeyCode::Left) {
        move_axis.x -= 1.0;
    }
    if is_key_down(KeyCode::D) || is_key_down(KeyCode::Right) {
        move_axis.x += 1.0;
    }

    let (mouse_x, mouse_y) = mouse_position();

    PlayerInput {
        move_axis,
        aim_axis: Vec2::ZERO,
        cursor: Some(Vec2::new(mouse_x, mouse_y)),
        suck_held: is_key_down(KeyCode::Space) || is_mouse_button_down(MouseButton::Left),
    }
}
