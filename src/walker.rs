// Stand-in for the game world: an agent walking on the ground plane,
// steered by the host's walk keys. Yaw 0 faces +z; positive yaw turns right.

use crate::input::WorldSample;

pub struct Walker {
    position: [f32; 3],
    yaw_degrees: f32,
    speed: f32,     // world units / sec
    turn_rate: f32, // degrees / sec
}

impl Default for Walker {
    fn default() -> Self {
        Self::new([0.0, 0.0, 0.0])
    }
}

impl Walker {
    pub fn new(position: [f32; 3]) -> Self {
        Self { position, yaw_degrees: 0.0, speed: 40.0, turn_rate: 120.0 }
    }

    /// Integrate one step. `dt` is already scaled by the simulation clock, so
    /// a paused clock (time scale 0) freezes the walker.
    pub fn update(&mut self, dt: f32, forward: f32, turn: f32) {
        self.yaw_degrees = (self.yaw_degrees + turn * self.turn_rate * dt).rem_euclid(360.0);
        let (sin, cos) = self.yaw_degrees.to_radians().sin_cos();
        let step = forward * self.speed * dt;
        self.position[0] += sin * step;
        self.position[2] += cos * step;
    }

    pub fn sample(&self) -> WorldSample {
        WorldSample { position: self.position, yaw_degrees: self.yaw_degrees }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_forward_along_z() {
        let mut w = Walker::default();
        w.update(1.0, 1.0, 0.0);
        let s = w.sample();
        assert!(s.position[0].abs() < 1e-4);
        assert!((s.position[2] - 40.0).abs() < 1e-4);
    }

    #[test]
    fn test_turn_right_then_walk_moves_along_x() {
        let mut w = Walker::default();
        w.update(0.75, 0.0, 1.0); // 90 degrees
        assert!((w.sample().yaw_degrees - 90.0).abs() < 1e-3);
        w.update(0.5, 1.0, 0.0);
        assert!((w.sample().position[0] - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_paused_clock_freezes() {
        let mut w = Walker::new([5.0, 1.0, -3.0]);
        w.update(0.0, 1.0, 1.0);
        assert_eq!(w.sample(), WorldSample { position: [5.0, 1.0, -3.0], yaw_degrees: 0.0 });
    }
}
