use serde::{Deserialize, Serialize};

use super::geometry::Vec2;

/// Distance a robot keeps from any surface it is stopped by.
const CONTACT_GAP: f32 = 1e-3;

/// Axis-aligned rectangular obstacle inside the arena.
///
/// The boundary of the rectangle belongs to the wall: a robot can never stand on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub min: Vec2,
    pub max: Vec2,
}

impl Wall {
    #[must_use]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        (self.min.x..=self.max.x).contains(&p.x) && (self.min.y..=self.max.y).contains(&p.y)
    }

    /// Distance along the ray `origin + t * dir` at which it enters this wall.
    ///
    /// Returns `Some(0.0)` if `origin` is already inside, `None` if the ray misses.
    /// `dir` must be a unit vector.
    #[must_use]
    pub fn ray_entry(&self, origin: Vec2, dir: Vec2) -> Option<f32> {
        let (x_enter, x_exit) = slab(origin.x, dir.x, self.min.x, self.max.x)?;
        let (y_enter, y_exit) = slab(origin.y, dir.y, self.min.y, self.max.y)?;
        let enter = x_enter.max(y_enter);
        let exit = x_exit.min(y_exit);
        if exit < enter || exit < 0.0 {
            return None;
        }
        Some(enter.max(0.0))
    }
}

fn slab(origin: f32, dir: f32, min: f32, max: f32) -> Option<(f32, f32)> {
    if dir == 0.0 {
        return (min..=max)
            .contains(&origin)
            .then_some((f32::NEG_INFINITY, f32::INFINITY));
    }
    let t1 = (min - origin) / dir;
    let t2 = (max - origin) / dir;
    Some((t1.min(t2), t1.max(t2)))
}

/// Static geometry of the battlefield: a `width` x `height` rectangle anchored at
/// the origin, plus optional interior walls.
///
/// # Example
///
/// ```
/// use duelgp_engine::{Arena, Vec2};
///
/// let arena = Arena::new(200.0, 100.0);
/// let origin = Vec2::new(50.0, 50.0);
///
/// // Facing +x the boundary is 150 units away.
/// assert!((arena.ray_distance(origin, Vec2::new(1.0, 0.0)) - 150.0).abs() < 1e-3);
///
/// // Motion is clipped instead of crossing the boundary.
/// let end = arena.clip_motion(origin, Vec2::new(0.0, -1.0), 80.0);
/// assert!(arena.is_legal(end));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub walls: Vec<Wall>,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(200.0, 200.0)
    }
}

impl Arena {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            walls: vec![],
        }
    }

    #[must_use]
    pub fn with_walls(mut self, walls: impl IntoIterator<Item = Wall>) -> Self {
        self.walls.extend(walls);
        self
    }

    /// Length of the arena diagonal, the largest possible distance between two robots.
    #[must_use]
    pub fn diagonal(&self) -> f32 {
        self.width.hypot(self.height)
    }

    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    #[must_use]
    pub fn in_bounds(&self, p: Vec2) -> bool {
        (0.0..=self.width).contains(&p.x) && (0.0..=self.height).contains(&p.y)
    }

    /// Returns `true` if a robot may stand at `p`.
    #[must_use]
    pub fn is_legal(&self, p: Vec2) -> bool {
        self.in_bounds(p) && !self.walls.iter().any(|w| w.contains(p))
    }

    /// Clamps a point into the arena rectangle.
    #[must_use]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(0.0, self.width), p.y.clamp(0.0, self.height))
    }

    /// Distance from `origin` along unit direction `dir` to the first boundary or wall.
    #[must_use]
    pub fn ray_distance(&self, origin: Vec2, dir: Vec2) -> f32 {
        let mut distance = f32::INFINITY;
        if dir.x > 0.0 {
            distance = distance.min((self.width - origin.x) / dir.x);
        } else if dir.x < 0.0 {
            distance = distance.min(-origin.x / dir.x);
        }
        if dir.y > 0.0 {
            distance = distance.min((self.height - origin.y) / dir.y);
        } else if dir.y < 0.0 {
            distance = distance.min(-origin.y / dir.y);
        }
        for wall in &self.walls {
            if let Some(t) = wall.ray_entry(origin, dir) {
                distance = distance.min(t);
            }
        }
        if distance.is_finite() {
            distance.max(0.0)
        } else {
            0.0
        }
    }

    /// Moves from `from` along unit direction `dir` by at most `step`, stopping just
    /// short of the first boundary or wall in the way.
    #[must_use]
    pub fn clip_motion(&self, from: Vec2, dir: Vec2, step: f32) -> Vec2 {
        let free = self.ray_distance(from, dir);
        let travel = if free > step {
            step
        } else {
            (free - CONTACT_GAP).max(0.0)
        };
        let to = self.clamp(from + dir * travel);
        if self.is_legal(to) { to } else { from }
    }

    /// Returns `true` if nothing blocks the straight segment from `from` to `to`.
    #[must_use]
    pub fn line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        let distance = from.distance(to);
        if distance <= f32::EPSILON {
            return true;
        }
        let dir = (to - from) * (1.0 / distance);
        self.walls
            .iter()
            .filter_map(|w| w.ray_entry(from, dir))
            .all(|t| t >= distance)
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::{FRAC_PI_4, PI};

    use super::*;

    const EPS: f32 = 1e-3;

    fn boxed_arena() -> Arena {
        Arena::new(100.0, 100.0).with_walls([Wall::new(
            Vec2::new(40.0, 40.0),
            Vec2::new(60.0, 60.0),
        )])
    }

    #[test]
    fn test_ray_distance_to_boundaries() {
        let arena = Arena::new(100.0, 50.0);
        let p = Vec2::new(10.0, 20.0);
        assert!((arena.ray_distance(p, Vec2::new(1.0, 0.0)) - 90.0).abs() < EPS);
        assert!((arena.ray_distance(p, Vec2::new(-1.0, 0.0)) - 10.0).abs() < EPS);
        assert!((arena.ray_distance(p, Vec2::new(0.0, 1.0)) - 30.0).abs() < EPS);
        assert!((arena.ray_distance(p, Vec2::new(0.0, -1.0)) - 20.0).abs() < EPS);
        let diag = arena.ray_distance(Vec2::new(0.0, 0.0), Vec2::from_angle(FRAC_PI_4));
        assert!((diag - 50.0 * 2f32.sqrt()).abs() < EPS);
    }

    #[test]
    fn test_ray_distance_hits_wall_first() {
        let arena = boxed_arena();
        let d = arena.ray_distance(Vec2::new(10.0, 50.0), Vec2::new(1.0, 0.0));
        assert!((d - 30.0).abs() < EPS);
        // passing below the wall reaches the boundary
        let d = arena.ray_distance(Vec2::new(10.0, 20.0), Vec2::new(1.0, 0.0));
        assert!((d - 90.0).abs() < EPS);
    }

    #[test]
    fn test_clip_motion_stops_before_boundary() {
        let arena = Arena::new(100.0, 100.0);
        let end = arena.clip_motion(Vec2::new(98.0, 50.0), Vec2::new(1.0, 0.0), 5.0);
        assert!(arena.is_legal(end));
        assert!(end.x > 99.9 && end.x <= 100.0);
        assert!((end.y - 50.0).abs() < EPS);
    }

    #[test]
    fn test_clip_motion_free_path_moves_full_step() {
        let arena = Arena::new(100.0, 100.0);
        let end = arena.clip_motion(Vec2::new(50.0, 50.0), Vec2::from_angle(PI), 5.0);
        assert!((end.x - 45.0).abs() < EPS);
    }

    #[test]
    fn test_clip_motion_never_enters_wall() {
        let arena = boxed_arena();
        let end = arena.clip_motion(Vec2::new(38.0, 50.0), Vec2::new(1.0, 0.0), 5.0);
        assert!(arena.is_legal(end));
        assert!(end.x < 40.0 && end.x > 39.9);
    }

    #[test]
    fn test_line_of_sight_blocked_by_wall() {
        let arena = boxed_arena();
        assert!(!arena.line_of_sight(Vec2::new(10.0, 50.0), Vec2::new(90.0, 50.0)));
        assert!(arena.line_of_sight(Vec2::new(10.0, 10.0), Vec2::new(90.0, 10.0)));
        assert!(arena.line_of_sight(Vec2::new(10.0, 50.0), Vec2::new(30.0, 50.0)));
    }
}
