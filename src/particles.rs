use macroquad::color::Color;
use macroquad::math::Vec2;
use macroquad::shapes::draw_circle;
use rand::prelude::*;
use std::f32::consts::TAU;

const MAX_PARTICLES: usize = 2048;

// A single particle in the fixed pool
#[derive(Debug, Clone, Copy)]
struct Particle {
    position: Vec2,
    velocity: Vec2,
    gravity: Vec2,
    color: Color,
    size: f32,
    lifetime: f32, // seconds remaining
    initial_lifetime: f32,
}

impl Particle {
    fn inert() -> Self {
        Particle {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            gravity: Vec2::ZERO,
            color: Color::new(1.0, 1.0, 1.0, 1.0),
            size: 2.0,
            lifetime: 0.0,
            initial_lifetime: 1.0,
        }
    }

    fn update(&mut self, dt: f32) {
        self.velocity += self.gravity * dt;
        self.position += self.velocity * dt;
        self.lifetime -= dt;

        // Fade out over the lifetime
        let fade_factor = (self.lifetime / self.initial_lifetime).max(0.0);
        self.color.a = fade_factor;
    }

    fn is_alive(&self) -> bool {
        self.lifetime > 0.0
    }
}

// Fixed-pool particle system: slots are overwritten round-robin, never
// allocated per emit.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    next_index: usize,
    rng: ThreadRng,
}

impl ParticleSystem {
    pub fn new() -> Self {
        ParticleSystem {
            particles: vec![Particle::inert(); MAX_PARTICLES],
            next_index: 0,
            rng: thread_rng(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    pub fn clear(&mut self) {
        for particle in self.particles.iter_mut() {
            particle.lifetime = 0.0;
        }
        self.next_index = 0;
    }

    fn next_slot(&mut self) -> &mut Particle {
        let index = self.next_index;
        self.next_index = (self.next_index + 1) % MAX_PARTICLES;
        &mut self.particles[index]
    }

    fn spawn(
        &mut self,
        position: Vec2,
        velocity: Vec2,
        gravity: Vec2,
        color: Color,
        size: f32,
        lifetime: f32,
    ) {
        let particle = self.next_slot();
        *particle = Particle {
            position,
            velocity,
            gravity,
            color,
            size,
            lifetime,
            initial_lifetime: lifetime,
        };
    }

    /// Radial burst where a fired scrap breaks on the boss
    pub fn emit_explosion(&mut self, position: Vec2) {
        let base_color = Color::new(1.0, 0.6, 0.2, 1.0);
        for _ in 0..16 {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(60.0..240.0);
            let velocity = Vec2::new(angle.cos() * speed, angle.sin() * speed);
            let lifetime = self.rng.gen_range(0.3..0.7);
            let size = self.rng.gen_range(2.0..5.0);
            self.spawn(position, velocity, Vec2::new(0.0, 120.0), base_color, size, lifetime);
        }
    }

    /// Small white flash at a contact point
    pub fn emit_hit_spark(&mut self, position: Vec2) {
        let color = Color::new(1.0, 1.0, 1.0, 1.0);
        for _ in 0..6 {
            let angle = self.rng.gen_range(0.0..TAU);
            let speed = self.rng.gen_range(100.0..300.0);
            let velocity = Vec2::new(angle.cos() * speed, angle.sin() * speed);
            let lifetime = self.rng.gen_range(0.1..0.25);
            self.spawn(position, velocity, Vec2::ZERO, color, 2.0, lifetime);
        }
    }

    /// Directional cone when the player fires the pack
    pub fn emit_fire_burst(&mut self, position: Vec2, direction: Vec2) {
        let base_angle = direction.y.atan2(direction.x);
        let spread = 25.0f32.to_radians();
        let color = Color::new(1.0, 0.9, 0.4, 1.0);
        for _ in 0..10 {
            let angle = base_angle + self.rng.gen_range(-spread..spread);
            let speed = self.rng.gen_range(200.0..500.0);
            let velocity = Vec2::new(angle.cos() * speed, angle.sin() * speed);
            let lifetime = self.rng.gen_range(0.15..0.35);
            let size = self.rng.gen_range(2.0..4.0);
            self.spawn(position, velocity, Vec2::ZERO, color, size, lifetime);
        }
    }

    /// Faint dust drifting into the vacuum point while suction runs
    pub fn emit_suction_dust(&mut self, vacuum_pos: Vec2, vacuum_radius: f32) {
        let color = Color::new(0.6, 0.8, 1.0, 0.6);
        for _ in 0..2 {
            let angle = self.rng.gen_range(0.0..TAU);
            let distance = self.rng.gen_range(vacuum_radius * 0.5..vacuum_radius);
            let position = vacuum_pos + Vec2::new(angle.cos() * distance, angle.sin() * distance);
            // Drift inward; dies before it arrives
            let velocity = (vacuum_pos - position) * 2.0;
            let lifetime = self.rng.gen_range(0.2..0.4);
            self.spawn(position, velocity, Vec2::ZERO, color, 1.5, lifetime);
        }
    }

    pub fn update(&mut self, dt: f32) {
        for particle in self.particles.iter_mut() {
            if particle.is_alive() {
                particle.update(dt);
            }
        }
    }

    pub fn draw(&self) {
        for particle in self.particles.iter() {
            if particle.is_alive() {
                draw_circle(
                    particle.position.x,
                    particle.position.y,
                    particle.size,
                    particle.color,
                );
            }
        }
    }
}
