//! Energy simulation data types
//!
//! Particles, flow descriptors and the aggregate `EnergyFlow` the renderer
//! consumes.

use std::fmt;

pub use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Linear RGB colour, components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb`
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// 8-bit channels, e.g. for terminal true colour
    pub fn to_u8(&self) -> (u8, u8, u8) {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (quantize(self.r), quantize(self.g), quantize(self.b))
    }

    /// Scale brightness
    pub fn scaled(&self, factor: f32) -> Rgb {
        Rgb::new(self.r * factor, self.g * factor, self.b * factor)
    }
}

/// Closed set of energy pattern kinds, one per level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyType {
    #[default]
    Lightning,
    Council,
    Architecture,
    Adaptive,
    Consciousness,
}

impl EnergyType {
    pub const ALL: [EnergyType; 5] = [
        EnergyType::Lightning,
        EnergyType::Council,
        EnergyType::Architecture,
        EnergyType::Adaptive,
        EnergyType::Consciousness,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EnergyType::Lightning => "lightning",
            EnergyType::Council => "council",
            EnergyType::Architecture => "architecture",
            EnergyType::Adaptive => "adaptive",
            EnergyType::Consciousness => "consciousness",
        }
    }

    /// Signature colour as hex
    pub fn hex_color(&self) -> &'static str {
        match self {
            EnergyType::Lightning => "#00ffff",
            EnergyType::Council => "#4ecdc4",
            EnergyType::Architecture => "#ff6b35",
            EnergyType::Adaptive => "#45b7d1",
            EnergyType::Consciousness => "#9b59b6",
        }
    }

    pub fn color(&self) -> Rgb {
        Rgb::from_hex(self.hex_color()).unwrap_or(Rgb::new(0.0, 1.0, 1.0))
    }

    /// Next type in level order, wrapping
    pub fn next(&self) -> EnergyType {
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for EnergyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-store unique particle identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ParticleId(pub u64);

/// A single time-limited particle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub id: ParticleId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Rgb,
    /// Remaining seconds; may go negative once expired
    pub lifetime: f32,
    pub max_lifetime: f32,
    pub size: f32,
    pub energy: f32,
}

/// Default particle lifetime in seconds
pub const PARTICLE_LIFETIME: f32 = 3.0;
/// Default base size
pub const PARTICLE_SIZE: f32 = 0.1;

impl Particle {
    /// Fresh particle with the default lifetime and size
    pub fn new(position: Vec3, velocity: Vec3, color: Rgb, energy: f32) -> Self {
        Self {
            id: ParticleId::default(),
            position,
            velocity,
            color,
            lifetime: PARTICLE_LIFETIME,
            max_lifetime: PARTICLE_LIFETIME,
            size: PARTICLE_SIZE,
            energy,
        }
    }

    /// Integrate one step
    pub fn advance(&mut self, dt: f32) {
        self.lifetime -= dt;
        self.position += self.velocity * dt;
    }

    pub fn is_expired(&self) -> bool {
        self.lifetime <= 0.0
    }

    /// Remaining share of the lifetime, 0 once expired
    pub fn remaining_fraction(&self) -> f32 {
        if self.max_lifetime <= 0.0 || self.is_expired() {
            return 0.0;
        }
        (self.lifetime / self.max_lifetime).clamp(0.0, 1.0)
    }

    /// Point size in pixels, never below 1
    pub fn render_size(&self) -> f32 {
        (self.size * self.energy * self.remaining_fraction() * 20.0).max(1.0)
    }
}

/// Continuous energy path descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowPattern {
    /// Empty for field-like patterns
    pub path: Vec<Vec3>,
    pub intensity: f32,
    pub direction: Vec3,
    pub speed: f32,
    pub color: String,
}

impl Default for FlowPattern {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            intensity: 0.0,
            direction: Vec3::Y,
            speed: 1.0,
            color: EnergyType::Lightning.hex_color().to_string(),
        }
    }
}

/// Pulsing spherical field around a centre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonanceField {
    pub center: Vec3,
    pub radius: f32,
    pub strength: f32,
    pub frequency: f32,
}

/// Aggregate state of the displayed pattern
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyFlow {
    pub particles: Vec<Particle>,
    pub flow: FlowPattern,
    pub resonance: Option<ResonanceField>,
    pub intensity: f32,
    pub energy_type: EnergyType,
}

impl EnergyFlow {
    /// Step every particle forward by `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.advance(dt);
        }
    }

    /// Copy of this flow stepped forward by `dt` seconds
    pub fn advanced(&self, dt: f32) -> EnergyFlow {
        let mut next = self.clone();
        next.advance(dt);
        next
    }

    /// Particles not yet expired
    pub fn live_particles(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| !p.is_expired())
    }
}

/// One lightning discharge: main jagged path plus side branches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightningStrike {
    pub start: Vec3,
    pub end: Vec3,
    pub color: String,
    /// Seconds
    pub duration: f32,
    pub intensity: f32,
    /// First entry is the main path, the rest are branch segments
    pub branches: Vec<Vec<Vec3>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_math() {
        let a = Vec3::new(-3.0, -2.0, 0.0);
        let b = Vec3::ZERO;
        assert_eq!(a.lerp(b, 0.5), Vec3::new(-1.5, -1.0, 0.0));
        assert!((a.normalize_or_zero().length() - 1.0).abs() < 1e-6);
        assert_eq!(Vec3::ZERO.normalize_or_zero(), Vec3::ZERO);
    }

    #[test]
    fn test_hex_colors() {
        let cyan = Rgb::from_hex("#00ffff").unwrap();
        assert_eq!(cyan.to_u8(), (0, 255, 255));
        assert_eq!(EnergyType::Architecture.color().to_u8(), (0xff, 0x6b, 0x35));
        assert!(Rgb::from_hex("#fff").is_none());
        assert!(Rgb::from_hex("#zzzzzz").is_none());
    }

    #[test]
    fn test_particle_expiry() {
        let mut p = Particle::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Rgb::default(), 1.0);
        assert!((p.remaining_fraction() - 1.0).abs() < 1e-6);
        assert!((p.render_size() - 2.0).abs() < 1e-6); // 0.1 * 1 * 1 * 20

        p.advance(1.5);
        assert!((p.remaining_fraction() - 0.5).abs() < 1e-6);
        assert!((p.position.x - 1.5).abs() < 1e-6);

        p.advance(2.0);
        assert!(p.is_expired());
        assert!(p.lifetime < 0.0);
        assert_eq!(p.remaining_fraction(), 0.0);
        assert_eq!(p.render_size(), 1.0);
    }

    #[test]
    fn test_energy_type_cycle() {
        let mut t = EnergyType::Lightning;
        for _ in 0..EnergyType::ALL.len() {
            t = t.next();
        }
        assert_eq!(t, EnergyType::Lightning);
        assert_eq!(EnergyType::Adaptive.to_string(), "adaptive");
    }

    #[test]
    fn test_default_flow_is_empty() {
        let flow = EnergyFlow::default();
        assert!(flow.particles.is_empty());
        assert_eq!(flow.intensity, 0.0);
        assert_eq!(flow.energy_type, EnergyType::Lightning);
        assert_eq!(flow.flow.direction, Vec3::Y);
        assert_eq!(flow.flow.color, "#00ffff");
    }
}
