use crate::tuning::Tuning;
use macroquad::math::Vec2;

// Size class. Radius and weight are pure functions of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapType {
    Small,
    Medium,
    Large,
}

// Behavior trait. Magnetic is stored for future behavior but currently inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapTrait {
    Normal,
    Magnetic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapState {
    Free,        // Scattered on the field
    BeingSucked, // Pulled toward the vacuum point
    Held,        // Carried in the player's pack
    Fired,       // Launched as a projectile
    Hit,         // Impacted, playing the break effect
    Idle,        // Inactive pool slot
}

// Size constants
const SMALL_RADIUS: f32 = 16.0;
const MEDIUM_RADIUS: f32 = 24.0;
const LARGE_RADIUS: f32 = 32.0;

// Weight constants
const SMALL_WEIGHT: f32 = 1.0;
const MEDIUM_WEIGHT: f32 = 2.0;
const LARGE_WEIGHT: f32 = 3.0;

// Suction speed scale per size, simulating inertia
const MEDIUM_SUCTION_SCALE: f32 = 0.6;
const LARGE_SUCTION_SCALE: f32 = 0.4;

// Physics constants
const FREE_FRICTION: f32 = 0.95; // velocity decay per frame while Free
const SUCK_COLLISION_SCALE: f32 = 0.7; // smaller hitbox while being sucked
const HELD_COLLISION_SCALE: f32 = 0.6; // smaller still while held
const SUCTION_BASE_SPEED: f32 = 200.0;
const SUCTION_ACCELERATION: f32 = 500.0;
const SUCTION_SMOOTH_FACTOR: f32 = 0.3; // fraction of old velocity kept
const FIRED_LIFETIME_FRAMES: i32 = 180;
const ORBIT_ROTATION_SPEED: f32 = 2.0; // rad/s while held
const SPIN_SPEED: f32 = 2.0; // cosmetic spin, rad/s
const HIT_EFFECT_DURATION: f32 = 0.4; // seconds of break effect

// Damage constants
const BASE_DAMAGE_PER_WEIGHT: f32 = 1.0;
const MIN_DAMAGE: i32 = 1;
const MAX_DAMAGE: i32 = 100;

// A single scrap pickup/projectile. Pool slots are never dropped, only
// deactivated and reinitialized.
#[derive(Debug, Clone)]
pub struct Scrap {
    pub scrap_type: ScrapType,
    pub scrap_trait: ScrapTrait,
    pub state: ScrapState,
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,       // cosmetic spin
    pub orbit_angle: f32, // angular position while held
    pub radius: f32,
    pub lifetime_timer: i32, // frames since fired
    pub hit_timer: f32,      // seconds since hit
    pub is_active: bool,
}

impl Scrap {
    pub fn new() -> Self {
        Scrap {
            scrap_type: ScrapType::Small,
            scrap_trait: ScrapTrait::Normal,
            state: ScrapState::Idle,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            angle: 0.0,
            orbit_angle: 0.0,
            radius: SMALL_RADIUS,
            lifetime_timer: 0,
            hit_timer: 0.0,
            is_active: false,
        }
    }

    // (Re)activate a pool slot. Always succeeds.
    pub fn initialize(
        &mut self,
        scrap_type: ScrapType,
        scrap_trait: ScrapTrait,
        position: Vec2,
        initial_velocity: Vec2,
    ) {
        self.scrap_type = scrap_type;
        self.scrap_trait = scrap_trait;
        self.position = position;
        self.velocity = initial_velocity;
        self.state = ScrapState::Free;
        self.is_active = true;
        self.angle = 0.0;
        self.orbit_angle = 0.0;
        self.lifetime_timer = 0;
        self.hit_timer = 0.0;

        self.radius = match scrap_type {
            ScrapType::Small => SMALL_RADIUS,
            ScrapType::Medium => MEDIUM_RADIUS,
            ScrapType::Large => LARGE_RADIUS,
        };
    }

    pub fn weight(&self) -> f32 {
        match self.scrap_type {
            ScrapType::Small => SMALL_WEIGHT,
            ScrapType::Medium => MEDIUM_WEIGHT,
            ScrapType::Large => LARGE_WEIGHT,
        }
    }

    // Hitbox shrinks while sucked/held to reduce crowding in the pack
    pub fn collision_radius(&self) -> f32 {
        match self.state {
            ScrapState::BeingSucked => self.radius * SUCK_COLLISION_SCALE,
            ScrapState::Held => self.radius * HELD_COLLISION_SCALE,
            _ => self.radius,
        }
    }

    pub fn update(&mut self, dt: f32) {
        match self.state {
            ScrapState::Free => {
                // Friction decay, per frame
                self.velocity *= FREE_FRICTION;
            }
            ScrapState::BeingSucked => {
                // Driven externally by apply_suction
            }
            ScrapState::Held => {
                // Driven externally by update_held_position
                self.velocity = Vec2::ZERO;
            }
            ScrapState::Fired => {
                // Straight flight with a frame-counted lifetime
                self.lifetime_timer += 1;
                if self.lifetime_timer > FIRED_LIFETIME_FRAMES {
                    self.is_active = false;
                }
            }
            ScrapState::Hit => {
                // Break effect only, no position integration
                self.hit_timer += dt;
                if self.hit_timer >= HIT_EFFECT_DURATION {
                    self.is_active = false;
                }
                return;
            }
            ScrapState::Idle => {
                return;
            }
        }

        self.position += self.velocity * dt;
        self.angle += SPIN_SPEED * dt;
    }

    // Pull toward the vacuum point. Speed grows as the scrap closes in,
    // scaled down for heavier sizes, and the new velocity is blended into
    // the old one so direction changes stay smooth.
    pub fn apply_suction(&mut self, vacuum_pos: Vec2, vacuum_radius: f32, _dt: f32) {
        if self.state != ScrapState::BeingSucked {
            return;
        }

        let to_vacuum = vacuum_pos - self.position;
        let distance = to_vacuum.length();
        if distance < 0.01 {
            return;
        }
        let direction = to_vacuum / distance;

        let distance_ratio = (1.0 - distance / vacuum_radius).clamp(0.0, 1.0);
        let mut speed = SUCTION_BASE_SPEED + SUCTION_ACCELERATION * distance_ratio;

        match self.scrap_type {
            ScrapType::Small => {}
            ScrapType::Medium => speed *= MEDIUM_SUCTION_SCALE,
            ScrapType::Large => speed *= LARGE_SUCTION_SCALE,
        }

        let target_velocity = direction * speed;
        self.velocity =
            self.velocity * SUCTION_SMOOTH_FACTOR + target_velocity * (1.0 - SUCTION_SMOOTH_FACTOR);
    }

    // Kinematic orbit around the vacuum point while held
    pub fn update_held_position(&mut self, vacuum_pos: Vec2, orbit_radius: f32, dt: f32) {
        if self.state != ScrapState::Held {
            return;
        }

        self.orbit_angle += ORBIT_ROTATION_SPEED * dt;
        self.position = vacuum_pos
            + Vec2::new(
                self.orbit_angle.cos() * orbit_radius,
                self.orbit_angle.sin() * orbit_radius,
            );
    }

    pub fn fire(&mut self, direction: Vec2, speed: f32) {
        self.state = ScrapState::Fired;
        self.velocity = direction * speed;
        self.lifetime_timer = 0;
    }

    pub fn damage(&self, tuning: &Tuning) -> i32 {
        let base_damage = self.weight() * BASE_DAMAGE_PER_WEIGHT * tuning.damage_multiplier;
        (base_damage as i32).clamp(MIN_DAMAGE, MAX_DAMAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn active_scrap(scrap_type: ScrapType) -> Scrap {
        let mut scrap = Scrap::new();
        scrap.initialize(scrap_type, ScrapTrait::Normal, Vec2::ZERO, Vec2::ZERO);
        scrap
    }

    #[test]
    fn test_initialize_resets_fields() {
        let mut scrap = Scrap::new();
        scrap.angle = 3.0;
        scrap.lifetime_timer = 99;
        scrap.initialize(
            ScrapType::Medium,
            ScrapTrait::Magnetic,
            Vec2::new(10.0, 20.0),
            Vec2::new(1.0, 0.0),
        );

        assert_eq!(scrap.state, ScrapState::Free);
        assert!(scrap.is_active);
        assert_eq!(scrap.lifetime_timer, 0);
        assert_approx_eq!(scrap.angle, 0.0);
        assert_approx_eq!(scrap.radius, 24.0);
        assert_eq!(scrap.scrap_trait, ScrapTrait::Magnetic);
    }

    #[test]
    fn test_radius_and_weight_per_type() {
        assert_approx_eq!(active_scrap(ScrapType::Small).radius, 16.0);
        assert_approx_eq!(active_scrap(ScrapType::Medium).radius, 24.0);
        assert_approx_eq!(active_scrap(ScrapType::Large).radius, 32.0);
        assert_approx_eq!(active_scrap(ScrapType::Small).weight(), 1.0);
        assert_approx_eq!(active_scrap(ScrapType::Medium).weight(), 2.0);
        assert_approx_eq!(active_scrap(ScrapType::Large).weight(), 3.0);
    }

    #[test]
    fn test_collision_radius_shrinks_by_state() {
        let mut scrap = active_scrap(ScrapType::Large);
        assert_approx_eq!(scrap.collision_radius(), 32.0);
        scrap.state = ScrapState::BeingSucked;
        assert_approx_eq!(scrap.collision_radius(), 32.0 * 0.7);
        scrap.state = ScrapState::Held;
        assert_approx_eq!(scrap.collision_radius(), 32.0 * 0.6);
    }

    #[test]
    fn test_free_scrap_decelerates() {
        let mut scrap = active_scrap(ScrapType::Small);
        scrap.velocity = Vec2::new(100.0, 0.0);
        scrap.update(1.0 / 60.0);
        assert_approx_eq!(scrap.velocity.x, 95.0);
    }

    #[test]
    fn test_held_velocity_forced_zero() {
        let mut scrap = active_scrap(ScrapType::Small);
        scrap.state = ScrapState::Held;
        scrap.velocity = Vec2::new(100.0, 50.0);
        scrap.update(1.0 / 60.0);
        assert_approx_eq!(scrap.velocity.x, 0.0);
        assert_approx_eq!(scrap.velocity.y, 0.0);
    }

    #[test]
    fn test_fired_lifetime_deactivates() {
        let mut scrap = active_scrap(ScrapType::Small);
        scrap.fire(Vec2::new(1.0, 0.0), 820.0);
        for _ in 0..180 {
            scrap.update(1.0 / 60.0);
            assert!(scrap.is_active);
        }
        scrap.update(1.0 / 60.0);
        assert!(!scrap.is_active);
    }

    #[test]
    fn test_hit_skips_position_integration() {
        let mut scrap = active_scrap(ScrapType::Small);
        scrap.state = ScrapState::Hit;
        scrap.velocity = Vec2::new(500.0, 0.0);
        scrap.update(1.0 / 60.0);
        assert_approx_eq!(scrap.position.x, 0.0);
        assert!(scrap.is_active);

        // Break effect runs out and the slot deactivates
        for _ in 0..30 {
            scrap.update(1.0 / 60.0);
        }
        assert!(!scrap.is_active);
    }

    #[test]
    fn test_fire_sets_velocity_and_state() {
        let mut scrap = active_scrap(ScrapType::Small);
        scrap.lifetime_timer = 50;
        scrap.fire(Vec2::new(0.0, 1.0), 820.0);
        assert_eq!(scrap.state, ScrapState::Fired);
        assert_eq!(scrap.lifetime_timer, 0);
        assert_approx_eq!(scrap.velocity.y, 820.0);
    }

    #[test]
    fn test_apply_suction_noop_unless_being_sucked() {
        let mut scrap = active_scrap(ScrapType::Small);
        scrap.position = Vec2::new(100.0, 0.0);
        scrap.apply_suction(Vec2::ZERO, 150.0, 1.0 / 60.0);
        assert_approx_eq!(scrap.velocity.x, 0.0);
    }

    #[test]
    fn test_suction_pulls_toward_vacuum() {
        let mut scrap = active_scrap(ScrapType::Small);
        scrap.position = Vec2::new(100.0, 0.0);
        scrap.state = ScrapState::BeingSucked;
        scrap.apply_suction(Vec2::ZERO, 150.0, 1.0 / 60.0);
        assert!(scrap.velocity.x < 0.0);
        assert_approx_eq!(scrap.velocity.y, 0.0);
    }

    #[test]
    fn test_heavier_scrap_sucked_slower() {
        let mut small = active_scrap(ScrapType::Small);
        let mut large = active_scrap(ScrapType::Large);
        for scrap in [&mut small, &mut large] {
            scrap.position = Vec2::new(100.0, 0.0);
            scrap.state = ScrapState::BeingSucked;
            scrap.apply_suction(Vec2::ZERO, 150.0, 1.0 / 60.0);
        }
        assert!(small.velocity.length() > large.velocity.length());
    }

    #[test]
    fn test_held_position_orbits_at_radius() {
        let mut scrap = active_scrap(ScrapType::Small);
        scrap.state = ScrapState::Held;
        let vacuum = Vec2::new(640.0, 360.0);
        scrap.update_held_position(vacuum, 30.0, 1.0 / 60.0);
        assert_approx_eq!((scrap.position - vacuum).length(), 30.0, 1e-3);
    }

    #[test]
    fn test_damage_scales_and_clamps() {
        let tuning = Tuning::default();
        assert_eq!(active_scrap(ScrapType::Small).damage(&tuning), 1);
        assert_eq!(active_scrap(ScrapType::Large).damage(&tuning), 3);

        let mut boosted = Tuning::default();
        boosted.damage_multiplier = 1000.0;
        assert_eq!(active_scrap(ScrapType::Large).damage(&boosted), 100);

        let mut floored = Tuning::default();
        floored.damage_multiplier = 0.0;
        assert_eq!(active_scrap(ScrapType::Small).damage(&floored), 1);
    }
}
