use crate::debug_collision;
use macroquad::math::Vec2;

// Coarse category gating which pairs are ever tested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionLayer {
    Player,
    PlayerWeapon, // fired scraps
    Boss,
    BossPart,
    BossWeapon, // punches, beams
    Neutral,
}

// Rectangle-vs-rectangle is intentionally unsupported: no allow-listed layer
// pair can produce it, and the shape dispatch returns no hit for that arm.
#[derive(Debug, Clone, Copy)]
pub enum CollisionShape {
    Circle { radius: f32 },
    Rectangle { width: f32, height: f32, angle: f32 },
    Line { start: Vec2, end: Vec2, thickness: f32 },
}

// The layer implies the concrete owner, but the tag makes that explicit
// instead of trusting a cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderOwner {
    Player,
    Boss,
    BossPart(usize),
    Scrap(usize),
    BossWeapon,
}

#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub layer: CollisionLayer,
    pub shape: CollisionShape,
    pub position: Vec2,
    pub owner: ColliderOwner,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionEvent {
    pub contact_point: Vec2,
    pub normal: Vec2,
}

// One typed hit per detected overlap, consumed by the game the same frame
#[derive(Debug, Clone, Copy)]
pub enum CollisionHit {
    ScrapHitBoss {
        scrap: usize,
        event: CollisionEvent,
    },
    ScrapHitBossPart {
        scrap: usize,
        part: usize,
        event: CollisionEvent,
    },
    BossAttackHitPlayer {
        event: CollisionEvent,
    },
    PlayerTouchBoss {
        event: CollisionEvent,
    },
}

/// Symmetric allow-list: only these pairs are ever geometrically tested.
pub fn should_check_collision(layer_a: CollisionLayer, layer_b: CollisionLayer) -> bool {
    use CollisionLayer::*;
    matches!(
        (layer_a, layer_b),
        (PlayerWeapon, Boss)
            | (Boss, PlayerWeapon)
            | (PlayerWeapon, BossPart)
            | (BossPart, PlayerWeapon)
            | (BossWeapon, Player)
            | (Player, BossWeapon)
            | (Player, Boss)
            | (Boss, Player)
    )
}

/// Broad phase O(n^2) over active registered colliders, narrow phase per
/// shape pair, typed dispatch per ordered layer pair. Events are retained
/// one frame for the debug overlay.
pub struct CollisionManager {
    colliders: Vec<Collider>,
    collision_count_this_frame: usize,
    events_this_frame: Vec<CollisionEvent>,
}

impl CollisionManager {
    pub fn new() -> Self {
        CollisionManager {
            colliders: Vec::with_capacity(100),
            collision_count_this_frame: 0,
            events_this_frame: Vec::new(),
        }
    }

    // ========================================
    // Registration
    // ========================================

    pub fn register_circle_collider(
        &mut self,
        layer: CollisionLayer,
        position: Vec2,
        radius: f32,
        owner: ColliderOwner,
    ) -> usize {
        self.push_collider(Collider {
            layer,
            shape: CollisionShape::Circle { radius },
            position,
            owner,
            is_active: true,
        })
    }

    pub fn register_rect_collider(
        &mut self,
        layer: CollisionLayer,
        position: Vec2,
        width: f32,
        height: f32,
        angle: f32,
        owner: ColliderOwner,
    ) -> usize {
        self.push_collider(Collider {
            layer,
            shape: CollisionShape::Rectangle {
                width,
                height,
                angle,
            },
            position,
            owner,
            is_active: true,
        })
    }

    pub fn register_line_collider(
        &mut self,
        layer: CollisionLayer,
        start: Vec2,
        end: Vec2,
        thickness: f32,
        owner: ColliderOwner,
    ) -> usize {
        self.push_collider(Collider {
            layer,
            shape: CollisionShape::Line {
                start,
                end,
                thickness,
            },
            position: (start + end) * 0.5,
            owner,
            is_active: true,
        })
    }

    fn push_collider(&mut self, collider: Collider) -> usize {
        self.colliders.push(collider);
        self.colliders.len() - 1
    }

    /// Deactivate a collider. Indices stay valid until `clear_all_colliders`.
    pub fn unregister_collider(&mut self, index: usize) {
        if let Some(collider) = self.colliders.get_mut(index) {
            collider.is_active = false;
        }
    }

    pub fn clear_all_colliders(&mut self) {
        self.colliders.clear();
        self.collision_count_this_frame = 0;
        self.events_this_frame.clear();
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    pub fn collision_count(&self) -> usize {
        self.collision_count_this_frame
    }

    pub fn events(&self) -> &[CollisionEvent] {
        &self.events_this_frame
    }

    // ========================================
    // Detection and dispatch
    // ========================================

    pub fn process_all_collisions(&mut self) -> Vec<CollisionHit> {
        self.collision_count_this_frame = 0;
        self.events_this_frame.clear();

        let mut hits = Vec::new();

        for i in 0..self.colliders.len() {
            for j in (i + 1)..self.colliders.len() {
                let a = self.colliders[i];
                let b = self.colliders[j];

                if !a.is_active || !b.is_active {
                    continue;
                }
                if !should_check_collision(a.layer, b.layer) {
                    continue;
                }

                // Canonicalize the pair to the dispatch order so registration
                // order never matters
                let (first, second) = if pair_is_canonical(a.layer, b.layer) {
                    (a, b)
                } else {
                    (b, a)
                };

                let Some(event) = check_collision(&first, &second) else {
                    continue;
                };

                self.collision_count_this_frame += 1;
                self.events_this_frame.push(event);

                if let Some(hit) = dispatch_hit(&first, &second, event) {
                    hits.push(hit);
                }
            }
        }

        if !hits.is_empty() {
            debug_collision!("{} hits this frame", hits.len());
        }

        hits
    }
}

fn pair_is_canonical(layer_a: CollisionLayer, layer_b: CollisionLayer) -> bool {
    use CollisionLayer::*;
    matches!(
        (layer_a, layer_b),
        (PlayerWeapon, Boss) | (PlayerWeapon, BossPart) | (BossWeapon, Player) | (Player, Boss)
    )
}

// One dispatch per collision, selected by the canonical layer pair. The
// owner tags carry the entity identity the layers imply.
fn dispatch_hit(first: &Collider, second: &Collider, event: CollisionEvent) -> Option<CollisionHit> {
    use CollisionLayer::*;
    match (first.layer, second.layer) {
        (PlayerWeapon, Boss) => {
            let ColliderOwner::Scrap(scrap) = first.owner else {
                return None;
            };
            Some(CollisionHit::ScrapHitBoss { scrap, event })
        }
        (PlayerWeapon, BossPart) => {
            let ColliderOwner::Scrap(scrap) = first.owner else {
                return None;
            };
            let ColliderOwner::BossPart(part) = second.owner else {
                return None;
            };
            Some(CollisionHit::ScrapHitBossPart { scrap, part, event })
        }
        (BossWeapon, Player) => Some(CollisionHit::BossAttackHitPlayer { event }),
        (Player, Boss) => Some(CollisionHit::PlayerTouchBoss { event }),
        _ => None,
    }
}

fn check_collision(a: &Collider, b: &Collider) -> Option<CollisionEvent> {
    use CollisionShape::*;
    match (a.shape, b.shape) {
        (Circle { .. }, Circle { .. }) => check_circle_vs_circle(a, b),
        (Circle { .. }, Rectangle { .. }) => check_circle_vs_rect(a, b),
        (Rectangle { .. }, Circle { .. }) => check_circle_vs_rect(b, a),
        (Circle { .. }, Line { .. }) => check_circle_vs_line(a, b),
        (Line { .. }, Circle { .. }) => check_circle_vs_line(b, a),
        // Rectangle-vs-rectangle deliberately undetected
        _ => None,
    }
}

fn circle_radius(collider: &Collider) -> f32 {
    match collider.shape {
        CollisionShape::Circle { radius } => radius,
        _ => 0.0,
    }
}

fn check_circle_vs_circle(a: &Collider, b: &Collider) -> Option<CollisionEvent> {
    let radius_a = circle_radius(a);
    let radius_b = circle_radius(b);

    let diff = b.position - a.position;
    let distance = diff.length();

    if distance >= radius_a + radius_b {
        return None;
    }

    // Concentric circles have no meaningful normal; pick one
    let normal = if distance > 0.01 {
        diff / distance
    } else {
        Vec2::new(1.0, 0.0)
    };

    Some(CollisionEvent {
        contact_point: a.position + normal * radius_a,
        normal,
    })
}

// The rectangle is approximated by its bounding circle. Good enough for the
// boss punch telegraphs it exists for; exact OBB math is not warranted.
fn check_circle_vs_rect(circle: &Collider, rect: &Collider) -> Option<CollisionEvent> {
    let CollisionShape::Rectangle { width, height, .. } = rect.shape else {
        return None;
    };
    let rect_radius = width.max(height) * 0.5;

    let diff = rect.position - circle.position;
    let distance = diff.length();

    if distance >= circle_radius(circle) + rect_radius {
        return None;
    }

    let normal = if distance > 0.01 {
        diff / distance
    } else {
        Vec2::new(1.0, 0.0)
    };

    Some(CollisionEvent {
        contact_point: circle.position,
        normal,
    })
}

fn check_circle_vs_line(circle: &Collider, line: &Collider) -> Option<CollisionEvent> {
    let CollisionShape::Line {
        start,
        end,
        thickness,
    } = line.shape
    else {
        return None;
    };

    // Closest point on the segment via clamped projection
    let line_vec = end - start;
    let line_len_sq = line_vec.length_squared();
    if line_len_sq < 0.0001 {
        return None;
    }

    let t = ((circle.position - start).dot(line_vec) / line_len_sq).clamp(0.0, 1.0);
    let closest_point = start + line_vec * t;

    let diff = circle.position - closest_point;
    let distance = diff.length();

    if distance >= circle_radius(circle) + thickness {
        return None;
    }

    let normal = if distance > 0.01 {
        diff / distance
    } else {
        Vec2::new(1.0, 0.0)
    };

    Some(CollisionEvent {
        contact_point: closest_point,
        normal,
    })
}
