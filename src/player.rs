use crate::boss::Boss;
use crate::config;
use crate::debug_fire;
use crate::scrap_manager::ScrapManager;
use crate::tuning::Tuning;
use crate::utils;
use macroquad::math::Vec2;

// Presentation state, derived after each update. DeadEffect is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Normal,
    Sucking,
    Shooting,
    DeadEffect,
}

// One frame of input, already decoupled from the device that produced it.
// Axes are raw in [-1, 1]; dead zones are applied here, not at the poll site.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub aim_axis: Vec2,
    pub cursor: Option<Vec2>,
    pub suck_held: bool,
}

const AIM_DEAD_ZONE: f32 = 0.4;
const MOVE_DEAD_ZONE: f32 = 0.2;
const CURSOR_MIN_DISTANCE: f32 = 10.0;
const RECOIL_VELOCITY_EPSILON: f32 = 0.1;
const RECOIL_ANGLE_EPSILON: f32 = 0.001;

/// The player: converts input into the aim/suction/fire loop, carries the
/// scrap load, and takes the recoil for every shot.
pub struct Player {
    pub position: Vec2,
    pub velocity: Vec2,
    pub recoil_velocity: Vec2,
    pub radius: f32,
    pub angle: f32,
    pub recoil_angle_offset: f32,
    pub is_alive: bool,

    pub hit_point: i32,
    pub max_hit_point: i32,

    pub vacuum_pos: Vec2,
    pub current_weight: f32,

    pub is_sucking: bool,
    pub was_sucking: bool,
    pub is_shooting: bool,

    draw_state: PlayerState,
    shooting_state_timer: f32,

    // Aim never snaps back to a default once set; the last direction holds
    // until new input arrives
    last_aim_direction: Vec2,
}

impl Player {
    pub fn new() -> Self {
        let mut player = Player {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            recoil_velocity: Vec2::ZERO,
            radius: config::PLAYER_RADIUS,
            angle: 0.0,
            recoil_angle_offset: 0.0,
            is_alive: true,
            hit_point: config::PLAYER_MAX_HIT_POINT,
            max_hit_point: config::PLAYER_MAX_HIT_POINT,
            vacuum_pos: Vec2::ZERO,
            current_weight: 0.0,
            is_sucking: false,
            was_sucking: false,
            is_shooting: false,
            draw_state: PlayerState::Normal,
            shooting_state_timer: 0.0,
            last_aim_direction: Vec2::ZERO,
        };
        player.initialize();
        player
    }

    // Reset for (re)spawn
    pub fn initialize(&mut self) {
        self.position = Vec2::new(config::PLAYER_START_X, config::PLAYER_START_Y);
        self.velocity = Vec2::ZERO;
        self.recoil_velocity = Vec2::ZERO;
        self.angle = 0.0;
        self.recoil_angle_offset = 0.0;
        self.is_alive = true;
        self.hit_point = self.max_hit_point;
        self.vacuum_pos = self.position;
        self.current_weight = 0.0;
        self.is_sucking = false;
        self.was_sucking = false;
        self.is_shooting = false;
        self.draw_state = PlayerState::Normal;
        self.shooting_state_timer = 0.0;
        self.last_aim_direction = Vec2::ZERO;
    }

    pub fn draw_state(&self) -> PlayerState {
        self.draw_state
    }

    pub fn weight_ratio(&self, tuning: &Tuning) -> f32 {
        (self.current_weight / tuning.max_weight).clamp(0.0, 1.0)
    }

    pub fn current_move_speed(&self, tuning: &Tuning) -> f32 {
        utils::lerp(
            tuning.move_speed_at_zero_weight,
            tuning.move_speed_at_max_weight,
            self.weight_ratio(tuning),
        )
    }

    pub fn fire_spread_angle(&self, tuning: &Tuning) -> f32 {
        utils::lerp(
            tuning.fire_spread_min_deg,
            tuning.fire_spread_max_deg,
            self.weight_ratio(tuning),
        )
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.hit_point -= damage;
        if self.hit_point <= 0 {
            self.hit_point = 0;
            self.is_alive = false;
        }
    }

    pub fn update(
        &mut self,
        dt: f32,
        input: &PlayerInput,
        tuning: &Tuning,
        mut scrap_manager: Option<&mut ScrapManager>,
        mut boss: Option<&mut Boss>,
    ) {
        if !self.is_alive {
            self.update_draw_state(dt);
            return;
        }

        self.update_vacuum_position(input, tuning);
        self.update_suction(input, tuning, scrap_manager.as_deref_mut(), boss.as_deref_mut());
        self.update_fire(tuning, scrap_manager.as_deref_mut());
        self.update_movement(input, tuning);
        self.update_recoil(dt, tuning);

        self.position += self.velocity * dt;
        self.position += self.recoil_velocity * dt;
        self.clamp_to_play_area();

        self.update_draw_state(dt);
    }

    // Aim from the stick when it clears the dead zone, otherwise from the
    // cursor relative to the player, otherwise keep the previous direction.
    // The default-right fallback only applies before any aim input ever
    // arrived.
    fn update_vacuum_position(&mut self, input: &PlayerInput, tuning: &Tuning) {
        let mut direction = Vec2::ZERO;
        let mut has_input = false;

        if input.aim_axis.x.abs() > AIM_DEAD_ZONE || input.aim_axis.y.abs() > AIM_DEAD_ZONE {
            direction = input.aim_axis;
            has_input = true;
        }

        if !has_input {
            if let Some(cursor) = input.cursor {
                let to_cursor = cursor - self.position;
                if to_cursor.length() > CURSOR_MIN_DISTANCE {
                    direction = to_cursor;
                    has_input = true;
                }
            }
        }

        if has_input {
            direction = utils::normalize_or(direction, Vec2::new(1.0, 0.0));
            self.last_aim_direction = direction;
        } else {
            direction = self.last_aim_direction;
            if direction.length() < 0.01 {
                direction = Vec2::new(1.0, 0.0);
                self.last_aim_direction = direction;
            }
        }

        self.vacuum_pos = self.position + direction * tuning.vacuum_distance;
        self.angle = direction.y.atan2(direction.x);
    }

    fn update_suction(
        &mut self,
        input: &PlayerInput,
        tuning: &Tuning,
        scrap_manager: Option<&mut ScrapManager>,
        boss: Option<&mut Boss>,
    ) {
        let Some(scrap_manager) = scrap_manager else {
            return;
        };

        // Previous frame's state feeds the fire edge detection
        self.was_sucking = self.is_sucking;
        self.is_sucking = input.suck_held;

        if self.is_sucking {
            scrap_manager.process_suction(
                self.vacuum_pos,
                tuning.vacuum_radius,
                self.current_weight,
                tuning.max_weight,
                tuning,
            );

            if let Some(boss) = boss {
                boss.process_player_suction(
                    self.vacuum_pos,
                    tuning.vacuum_radius,
                    true,
                    scrap_manager,
                );
            }

            self.current_weight = scrap_manager.held_weight();
        } else {
            scrap_manager.release_being_sucked_scraps();

            if let Some(boss) = boss {
                boss.process_player_suction(
                    self.vacuum_pos,
                    tuning.vacuum_radius,
                    false,
                    scrap_manager,
                );
            }
        }
    }

    // Fire triggers exactly on the suction release edge, and only with
    // something to throw.
    fn update_fire(&mut self, tuning: &Tuning, scrap_manager: Option<&mut ScrapManager>) {
        let Some(scrap_manager) = scrap_manager else {
            return;
        };

        let released_suction = self.was_sucking && !self.is_sucking;

        if released_suction && self.current_weight > 0.0 {
            let fire_direction = self.fire_direction();
            let spread_angle = self.fire_spread_angle(tuning);

            debug_fire!(
                "firing weight {:.1} spread {:.1} deg",
                self.current_weight,
                spread_angle
            );

            scrap_manager.fire_all_held_scraps(fire_direction, tuning.fire_speed, spread_angle);

            self.apply_recoil(fire_direction, tuning);

            self.current_weight = 0.0;
            self.is_shooting = true;
            self.shooting_state_timer = tuning.shooting_state_duration;
        }
    }

    fn update_movement(&mut self, input: &PlayerInput, tuning: &Tuning) {
        let mut move_dir = Vec2::ZERO;
        if input.move_axis.x.abs() > MOVE_DEAD_ZONE || input.move_axis.y.abs() > MOVE_DEAD_ZONE {
            move_dir = input.move_axis;
        }

        if move_dir.length() > 0.01 {
            move_dir = move_dir / move_dir.length();
        }

        self.velocity = move_dir * self.current_move_speed(tuning);
    }

    fn clamp_to_play_area(&mut self) {
        self.position.x = self
            .position
            .x
            .clamp(self.radius, config::PLAY_AREA_WIDTH - self.radius);
        self.position.y = self
            .position
            .y
            .clamp(self.radius, config::PLAY_AREA_HEIGHT - self.radius);
    }

    fn update_recoil(&mut self, dt: f32, tuning: &Tuning) {
        // Positional recoil: friction decay per frame, snapped to zero once
        // negligible
        self.recoil_velocity *= tuning.recoil_friction;
        if self.recoil_velocity.x.abs() < RECOIL_VELOCITY_EPSILON {
            self.recoil_velocity.x = 0.0;
        }
        if self.recoil_velocity.y.abs() < RECOIL_VELOCITY_EPSILON {
            self.recoil_velocity.y = 0.0;
        }

        // Angular recoil: exponential decay
        if self.recoil_angle_offset.abs() > RECOIL_ANGLE_EPSILON {
            self.recoil_angle_offset -=
                self.recoil_angle_offset * tuning.recoil_angle_decay * dt;
            if self.recoil_angle_offset.abs() < RECOIL_ANGLE_EPSILON {
                self.recoil_angle_offset = 0.0;
            }
        }
    }

    // Kick backward from the fire direction, scaled by the carried weight
    fn apply_recoil(&mut self, fire_direction: Vec2, tuning: &Tuning) {
        let weight_t = self.weight_ratio(tuning);

        let recoil_distance = utils::lerp(
            tuning.recoil_distance_min,
            tuning.recoil_distance_max,
            weight_t,
        );
        let recoil_speed = recoil_distance * (tuning.recoil_acceleration / tuning.recoil_distance_max);

        self.recoil_velocity = -fire_direction * recoil_speed;

        let recoil_angle =
            utils::lerp(tuning.recoil_angle_min, tuning.recoil_angle_max, weight_t);
        self.recoil_angle_offset = -recoil_angle;
    }

    pub fn fire_direction(&self) -> Vec2 {
        utils::normalize_or(self.vacuum_pos - self.position, Vec2::new(1.0, 0.0))
    }

    fn update_draw_state(&mut self, dt: f32) {
        if !self.is_alive {
            self.draw_state = PlayerState::DeadEffect;
            return;
        }

        if self.draw_state == PlayerState::Shooting {
            self.shooting_state_timer -= dt;
            if self.shooting_state_timer <= 0.0 {
                self.is_shooting = false;
            }
        }

        // Priority: shooting > sucking > normal
        self.draw_state = if self.is_shooting {
            PlayerState::Shooting
        } else if self.is_sucking {
            PlayerState::Sucking
        } else {
            PlayerState::Normal
        };
    }
}
