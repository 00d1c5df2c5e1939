use crate::config;
use crate::debug_boss;
use crate::scrap::ScrapType;
use crate::scrap_manager::{ScrapGenerateSize, ScrapManager};
use crate::utils;
use macroquad::math::Vec2;
use std::f32::consts::TAU;

// Orbiting boss parts. The eye sits close to the core, the hands patrol the
// outer ring and soak up incoming scraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPartKind {
    Eye,
    LeftTopHand,
    LeftBottomHand,
    RightTopHand,
    RightBottomHand,
}

#[derive(Debug, Clone)]
pub struct BossPart {
    pub kind: BossPartKind,
    pub offset_angle: f32,
    pub orbit_radius: f32,
    pub radius: f32,
    pub hit_point: i32,
    pub is_broken: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    Hover,
    Move,
    Punch,
    Beam,
}

const HOVER_DURATION: f32 = 2.0;
const MOVE_SPEED: f32 = 180.0;
const MOVE_TIMEOUT: f32 = 4.0;
const PUNCH_TELEGRAPH: f32 = 0.6;
const PUNCH_ACTIVE: f32 = 0.3;
const PUNCH_REACH: f32 = 80.0;
const PUNCH_RADIUS: f32 = 56.0;
const BEAM_TELEGRAPH: f32 = 0.8;
const BEAM_ACTIVE: f32 = 0.5;
const BEAM_LENGTH: f32 = 900.0;
const BEAM_THICKNESS: f32 = 24.0;
const PART_ORBIT_SPEED: f32 = 0.5; // rad/s
const PART_HIT_POINT: i32 = 30;

// Scrap supply toward the player's vacuum point
const SUPPLY_RANGE_MARGIN: f32 = 80.0;
const SUPPLY_INTERVAL_FRAMES: i32 = 20;
const SUPPLY_SPEED: f32 = 250.0;

// Move-trail scrap shedding
const MOVE_SPAWN_INTERVAL_FRAMES: i32 = 10;
const MOVE_SPAWN_COUNT: usize = 3;
const MOVE_SPAWN_SPEED: f32 = 80.0;

/// The boss: a core with orbiting parts, a scrap supply point, and a simple
/// timed attack cycle (hover, relocate, punch, beam) that feeds the scrap
/// spawn generators.
pub struct Boss {
    pub center: Vec2,
    pub radius: f32,
    pub hit_point: i32,
    pub max_hit_point: i32,
    pub parts: Vec<BossPart>,

    phase: BossPhase,
    phase_timer: f32,
    next_attack: u32,
    part_orbit_phase: f32,

    move_target: Vec2,

    punch_pos: Vec2,
    punch_fired: bool,

    beam_start: Vec2,
    beam_end: Vec2,
    beam_fired: bool,

    supply_frame_counter: i32,
}

impl Boss {
    pub fn new(max_hit_point: i32) -> Self {
        let parts = vec![
            BossPart {
                kind: BossPartKind::Eye,
                offset_angle: 0.0,
                orbit_radius: 0.0,
                radius: 40.0,
                hit_point: PART_HIT_POINT,
                is_broken: false,
            },
            BossPart {
                kind: BossPartKind::LeftTopHand,
                offset_angle: TAU * 0.125,
                orbit_radius: config::BOSS_RADIUS + 40.0,
                radius: 32.0,
                hit_point: PART_HIT_POINT,
                is_broken: false,
            },
            BossPart {
                kind: BossPartKind::LeftBottomHand,
                offset_angle: TAU * 0.375,
                orbit_radius: config::BOSS_RADIUS + 40.0,
                radius: 32.0,
                hit_point: PART_HIT_POINT,
                is_broken: false,
            },
            BossPart {
                kind: BossPartKind::RightBottomHand,
                offset_angle: TAU * 0.625,
                orbit_radius: config::BOSS_RADIUS + 40.0,
                radius: 32.0,
                hit_point: PART_HIT_POINT,
                is_broken: false,
            },
            BossPart {
                kind: BossPartKind::RightTopHand,
                offset_angle: TAU * 0.875,
                orbit_radius: config::BOSS_RADIUS + 40.0,
                radius: 32.0,
                hit_point: PART_HIT_POINT,
                is_broken: false,
            },
        ];

        Boss {
            center: Vec2::new(config::BOSS_START_X, config::BOSS_START_Y),
            radius: config::BOSS_RADIUS,
            hit_point: max_hit_point,
            max_hit_point,
            parts,
            phase: BossPhase::Hover,
            phase_timer: 0.0,
            next_attack: 0,
            part_orbit_phase: 0.0,
            move_target: Vec2::new(config::BOSS_START_X, config::BOSS_START_Y),
            punch_pos: Vec2::ZERO,
            punch_fired: false,
            beam_start: Vec2::ZERO,
            beam_end: Vec2::ZERO,
            beam_fired: false,
            supply_frame_counter: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hit_point > 0
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    pub fn phase(&self) -> BossPhase {
        self.phase
    }

    pub fn part_position(&self, index: usize) -> Vec2 {
        let part = &self.parts[index];
        let angle = part.offset_angle + self.part_orbit_phase;
        self.center + Vec2::new(angle.cos(), angle.sin()) * part.orbit_radius
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.hit_point = (self.hit_point - damage).max(0);
        debug_boss!("core hit for {}, {} hp left", damage, self.hit_point);
    }

    pub fn damage_part(&mut self, index: usize, damage: i32) {
        let Some(part) = self.parts.get_mut(index) else {
            return;
        };
        if part.is_broken {
            return;
        }
        part.hit_point = (part.hit_point - damage).max(0);
        if part.hit_point == 0 {
            part.is_broken = true;
            debug_boss!("part {:?} broken", part.kind);
        }
    }

    // ========================================
    // Interface consumed by the player/core
    // ========================================

    /// Whether the vacuum point is close enough to draw from the supply
    pub fn can_supply_scrap_to_player(&self, point: Vec2, radius: f32) -> bool {
        (point - self.center).length() <= self.radius + SUPPLY_RANGE_MARGIN + radius
    }

    /// While suction is active and in range, shed Small scraps from the edge
    /// of the core toward the vacuum point on a frame interval. Stopping
    /// suction resets the interval.
    pub fn process_player_suction(
        &mut self,
        point: Vec2,
        radius: f32,
        active: bool,
        scrap_manager: &mut ScrapManager,
    ) {
        if !active || !self.can_supply_scrap_to_player(point, radius) {
            self.supply_frame_counter = 0;
            return;
        }

        self.supply_frame_counter += 1;
        if self.supply_frame_counter < SUPPLY_INTERVAL_FRAMES {
            return;
        }
        self.supply_frame_counter = 0;

        let direction = utils::normalize_or(point - self.center, Vec2::new(-1.0, 0.0));
        let spawn_pos = self.center + direction * self.radius;
        scrap_manager.spawn_scrap(ScrapType::Small, spawn_pos, direction * SUPPLY_SPEED);
        debug_boss!("supplied scrap toward ({:.0}, {:.0})", point.x, point.y);
    }

    // ========================================
    // Attack colliders, registered by the game while active
    // ========================================

    pub fn punch_collider(&self) -> Option<(Vec2, f32)> {
        if self.phase == BossPhase::Punch && self.phase_timer >= PUNCH_TELEGRAPH {
            Some((self.punch_pos, PUNCH_RADIUS))
        } else {
            None
        }
    }

    /// Warning marker shown before the punch lands
    pub fn punch_telegraph(&self) -> Option<(Vec2, f32)> {
        if self.phase == BossPhase::Punch && self.phase_timer < PUNCH_TELEGRAPH {
            Some((self.punch_pos, PUNCH_RADIUS))
        } else {
            None
        }
    }

    /// Warning line shown before the beam fires
    pub fn beam_telegraph(&self) -> Option<(Vec2, Vec2)> {
        if self.phase == BossPhase::Beam && self.phase_timer < BEAM_TELEGRAPH {
            Some((self.beam_start, self.beam_end))
        } else {
            None
        }
    }

    pub fn beam_collider(&self) -> Option<(Vec2, Vec2, f32)> {
        if self.phase == BossPhase::Beam && self.phase_timer >= BEAM_TELEGRAPH {
            Some((self.beam_start, self.beam_end, BEAM_THICKNESS))
        } else {
            None
        }
    }

    // ========================================
    // Behavior cycle
    // ========================================

    pub fn update(&mut self, dt: f32, player_pos: Vec2, scrap_manager: &mut ScrapManager) {
        self.part_orbit_phase += PART_ORBIT_SPEED * dt;
        self.phase_timer += dt;

        let is_moving = self.phase == BossPhase::Move;
        scrap_manager.spawn_boss_scrap_move(
            is_moving,
            self.center,
            self.radius,
            MOVE_SPAWN_INTERVAL_FRAMES,
            MOVE_SPAWN_COUNT,
            MOVE_SPAWN_SPEED,
        );

        match self.phase {
            BossPhase::Hover => {
                if self.phase_timer >= HOVER_DURATION {
                    self.start_next_attack(player_pos);
                }
            }
            BossPhase::Move => {
                let to_target = self.move_target - self.center;
                let distance = to_target.length();
                if distance < MOVE_SPEED * dt || self.phase_timer >= MOVE_TIMEOUT {
                    self.center = self.move_target;
                    self.enter_phase(BossPhase::Hover);
                } else {
                    self.center += to_target / distance * MOVE_SPEED * dt;
                }
            }
            BossPhase::Punch => {
                if self.phase_timer >= PUNCH_TELEGRAPH && !self.punch_fired {
                    self.punch_fired = true;
                    scrap_manager.spawn_boss_scrap_punch(
                        self.punch_pos,
                        15,
                        2,
                        ScrapGenerateSize::SmallAndLarge,
                        250.0,
                        0,
                    );
                    debug_boss!("punch lands at ({:.0}, {:.0})", self.punch_pos.x, self.punch_pos.y);
                }
                if self.phase_timer >= PUNCH_TELEGRAPH + PUNCH_ACTIVE {
                    self.enter_phase(BossPhase::Hover);
                }
            }
            BossPhase::Beam => {
                if self.phase_timer >= BEAM_TELEGRAPH && !self.beam_fired {
                    self.beam_fired = true;
                    scrap_manager.spawn_boss_scrap_beam(
                        self.beam_start,
                        self.beam_end,
                        128.0,
                        15,
                        ScrapGenerateSize::SmallAndMedium,
                        100.0,
                    );
                    debug_boss!("beam fires");
                }
                if self.phase_timer >= BEAM_TELEGRAPH + BEAM_ACTIVE {
                    self.enter_phase(BossPhase::Hover);
                }
            }
        }
    }

    fn enter_phase(&mut self, phase: BossPhase) {
        self.phase = phase;
        self.phase_timer = 0.0;
    }

    // Attacks cycle deterministically: relocate, punch, beam
    fn start_next_attack(&mut self, player_pos: Vec2) {
        match self.next_attack % 3 {
            0 => {
                // Drift toward the player's half-height, staying on the right
                let target_y = player_pos
                    .y
                    .clamp(self.radius, config::PLAY_AREA_HEIGHT - self.radius);
                self.move_target = Vec2::new(config::BOSS_START_X, target_y);
                self.enter_phase(BossPhase::Move);
            }
            1 => {
                let direction =
                    utils::normalize_or(player_pos - self.center, Vec2::new(-1.0, 0.0));
                self.punch_pos = self.center + direction * (self.radius + PUNCH_REACH);
                self.punch_fired = false;
                self.enter_phase(BossPhase::Punch);
            }
            _ => {
                let direction =
                    utils::normalize_or(player_pos - self.center, Vec2::new(-1.0, 0.0));
                self.beam_start = self.center + direction * self.radius;
                self.beam_end = self.beam_start + direction * BEAM_LENGTH;
                self.beam_fired = false;
                self.enter_phase(BossPhase::Beam);
            }
        }
        self.next_attack += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_supply_range() {
        let boss = Boss::new(300);
        let near = boss.center - Vec2::new(boss.radius + 50.0, 0.0);
        let far = boss.center - Vec2::new(boss.radius + 500.0, 0.0);
        assert!(boss.can_supply_scrap_to_player(near, 150.0));
        assert!(!boss.can_supply_scrap_to_player(far, 150.0));
    }

    #[test]
    fn test_supply_spawns_on_interval() {
        let mut boss = Boss::new(300);
        let mut manager = ScrapManager::new();
        let point = boss.center - Vec2::new(boss.radius + 50.0, 0.0);

        for _ in 0..SUPPLY_INTERVAL_FRAMES - 1 {
            boss.process_player_suction(point, 150.0, true, &mut manager);
        }
        assert_eq!(manager.active_count(), 0);

        boss.process_player_suction(point, 150.0, true, &mut manager);
        assert_eq!(manager.active_count(), 1);

        // The shed scrap heads toward the vacuum point
        let scrap = &manager.scraps()[0];
        assert!(scrap.velocity.x < 0.0);
    }

    #[test]
    fn test_supply_inactive_resets_interval() {
        let mut boss = Boss::new(300);
        let mut manager = ScrapManager::new();
        let point = boss.center - Vec2::new(boss.radius + 50.0, 0.0);

        for _ in 0..SUPPLY_INTERVAL_FRAMES - 1 {
            boss.process_player_suction(point, 150.0, true, &mut manager);
        }
        boss.process_player_suction(point, 150.0, false, &mut manager);
        boss.process_player_suction(point, 150.0, true, &mut manager);
        assert_eq!(manager.active_count(), 0);
    }

    #[test]
    fn test_hover_leads_to_attack_and_back() {
        let mut boss = Boss::new(300);
        let mut manager = ScrapManager::new();
        // Off-center so the relocation actually has somewhere to go
        let player_pos = Vec2::new(240.0, 120.0);

        assert_eq!(boss.phase(), BossPhase::Hover);
        for _ in 0..(HOVER_DURATION / DT) as usize + 2 {
            boss.update(DT, player_pos, &mut manager);
        }
        assert_eq!(boss.phase(), BossPhase::Move);

        // The move phase ends back in hover and sheds a trail
        for _ in 0..(MOVE_TIMEOUT / DT) as usize + 2 {
            boss.update(DT, player_pos, &mut manager);
        }
        assert_eq!(boss.phase(), BossPhase::Hover);
    }

    #[test]
    fn test_punch_fires_once_with_collider_window() {
        let mut boss = Boss::new(300);
        let mut manager = ScrapManager::new();
        let player_pos = Vec2::new(240.0, 360.0);
        boss.next_attack = 1; // skip straight to punch
        boss.start_next_attack(player_pos);
        assert_eq!(boss.phase(), BossPhase::Punch);
        assert!(boss.punch_collider().is_none());

        // Run through telegraph into the active window
        for _ in 0..(PUNCH_TELEGRAPH / DT) as usize + 2 {
            boss.update(DT, player_pos, &mut manager);
        }
        assert!(boss.punch_collider().is_some());
        let spawned = manager.active_count();
        assert!(spawned > 0, "punch spawned no scraps");

        // Active window ends, collider gone, no double spawn
        for _ in 0..(PUNCH_ACTIVE / DT) as usize + 2 {
            boss.update(DT, player_pos, &mut manager);
        }
        assert_eq!(boss.phase(), BossPhase::Hover);
        assert!(boss.punch_collider().is_none());
        assert_eq!(manager.active_count(), spawned);
    }

    #[test]
    fn test_beam_collider_points_at_player() {
        let mut boss = Boss::new(300);
        let mut manager = ScrapManager::new();
        let player_pos = Vec2::new(240.0, 360.0);
        boss.next_attack = 2; // skip straight to beam
        boss.start_next_attack(player_pos);
        assert_eq!(boss.phase(), BossPhase::Beam);

        for _ in 0..(BEAM_TELEGRAPH / DT) as usize + 2 {
            boss.update(DT, player_pos, &mut manager);
        }
        let (start, end, _) = boss.beam_collider().expect("beam not active");
        assert!(end.x < start.x, "beam should head toward the player");
    }

    #[test]
    fn test_damage_and_part_break() {
        let mut boss = Boss::new(100);
        boss.take_damage(40);
        assert_eq!(boss.hit_point, 60);
        boss.take_damage(100);
        assert_eq!(boss.hit_point, 0);
        assert!(!boss.is_alive());

        let mut boss = Boss::new(100);
        boss.damage_part(1, PART_HIT_POINT - 1);
        assert!(!boss.parts[1].is_broken);
        boss.damage_part(1, 1);
        assert!(boss.parts[1].is_broken);
        // Further damage to a broken part is a no-op
        boss.damage_part(1, 50);
        assert_eq!(boss.parts[1].hit_point, 0);
    }
}
