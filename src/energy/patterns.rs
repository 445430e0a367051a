//! Pattern generators
//!
//! One pure generator per `EnergyType`. Each maps (seed text, particle count,
//! base seed) to a particle batch plus flow metadata, so the same inputs always
//! produce the same pattern.

use std::f32::consts::{PI, TAU};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::types::{
    EnergyFlow, EnergyType, FlowPattern, LightningStrike, Particle, ResonanceField, Vec3,
};

/// Where every lightning strike starts
pub const LIGHTNING_START: Vec3 = Vec3::new(-3.0, -2.0, 0.0);
/// Where every lightning strike lands
pub const LIGHTNING_END: Vec3 = Vec3::ZERO;
/// Full width of the per-axis jitter around the strike segment
pub const LIGHTNING_JITTER: f32 = 0.5;

const LIGHTNING_SEGMENTS: usize = 10;
const LIGHTNING_BRANCHES: usize = 3;

const SPIRAL_TURNS: f32 = 2.0;
pub const SPIRAL_BASE_RADIUS: f32 = 0.5;
pub const SPIRAL_GROWTH: f32 = 3.5;
pub const SPIRAL_WOBBLE: f32 = 0.3;

pub const RING_LAYERS: usize = 5;
pub const RING_BASE_RADIUS: f32 = 1.5;
pub const RING_SPACING: f32 = 0.75;
/// Angular offset between consecutive rings
pub const RING_LAYER_ROTATION: f32 = PI / 5.0;
pub const RING_HEIGHT: f32 = 0.5;

/// How a trigger sizes its batch and how long it counts as generating
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternTuning {
    /// Particles per character of seed text
    pub per_char: usize,
    /// Upper bound on the batch
    pub max_particles: usize,
    /// Seconds the generation flag stays raised
    pub flag_seconds: f64,
}

impl PatternTuning {
    pub const fn new(per_char: usize, max_particles: usize, flag_seconds: f64) -> Self {
        Self {
            per_char,
            max_particles,
            flag_seconds,
        }
    }

    /// Batch size for `seed_text`, never zero
    pub fn particle_count(&self, seed_text: &str) -> usize {
        let len = seed_text.chars().count();
        len.saturating_mul(self.per_char)
            .min(self.max_particles)
            .max(1)
    }
}

/// Tuning for every energy type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTable {
    pub lightning: PatternTuning,
    pub council: PatternTuning,
    pub architecture: PatternTuning,
    pub adaptive: PatternTuning,
    pub consciousness: PatternTuning,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self {
            lightning: PatternTuning::new(2, 100, 1.0),
            council: PatternTuning::new(2, 200, 2.0),
            architecture: PatternTuning::new(2, 150, 2.0),
            adaptive: PatternTuning::new(3, 150, 2.0),
            consciousness: PatternTuning::new(4, 200, 3.0),
        }
    }
}

impl PatternTable {
    pub fn get(&self, energy_type: EnergyType) -> PatternTuning {
        match energy_type {
            EnergyType::Lightning => self.lightning,
            EnergyType::Council => self.council,
            EnergyType::Architecture => self.architecture,
            EnergyType::Adaptive => self.adaptive,
            EnergyType::Consciousness => self.consciousness,
        }
    }
}

/// Output of a generator
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPattern {
    pub flow: EnergyFlow,
    /// Only lightning produces a strike
    pub strike: Option<LightningStrike>,
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Mix the store seed with an FNV-1a hash of the seed text
///
/// Fixed across platforms and toolchains, so a configured seed replays the
/// same session anywhere.
pub fn pattern_seed(base_seed: u64, seed_text: &str) -> u64 {
    let text_hash = seed_text
        .bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME));
    base_seed ^ text_hash
}

/// Run the generator for `energy_type`
pub fn generate(
    energy_type: EnergyType,
    seed_text: &str,
    count: usize,
    base_seed: u64,
) -> GeneratedPattern {
    let count = count.max(1);
    let mut rng = StdRng::seed_from_u64(pattern_seed(base_seed, seed_text));

    match energy_type {
        EnergyType::Lightning => lightning(count, &mut rng),
        EnergyType::Council | EnergyType::Architecture => scatter(energy_type, count, &mut rng),
        EnergyType::Adaptive => adaptive_spiral(count, &mut rng),
        EnergyType::Consciousness => consciousness_rings(count, &mut rng),
    }
}

/// Uniform value in `[-span/2, span/2)`
fn centered<R: Rng>(rng: &mut R, span: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * span
}

fn jitter<R: Rng>(rng: &mut R, span: f32) -> Vec3 {
    Vec3::new(centered(rng, span), centered(rng, span), centered(rng, span))
}

/// Upward-biased random drift
fn drift<R: Rng>(rng: &mut R) -> Vec3 {
    Vec3::new(centered(rng, 2.0), rng.gen::<f32>() * 2.0, centered(rng, 2.0))
}

/// Particles jittered along the strike segment
fn lightning<R: Rng>(count: usize, rng: &mut R) -> GeneratedPattern {
    let color = EnergyType::Lightning.color();
    let particles = (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            let position = LIGHTNING_START.lerp(LIGHTNING_END, t) + jitter(rng, LIGHTNING_JITTER);
            Particle::new(position, drift(rng), color, 1.0)
        })
        .collect();

    let strike = LightningStrike {
        start: LIGHTNING_START,
        end: LIGHTNING_END,
        color: EnergyType::Lightning.hex_color().to_string(),
        duration: 0.5,
        intensity: 1.0,
        branches: lightning_branches(LIGHTNING_START, LIGHTNING_END, rng),
    };

    GeneratedPattern {
        flow: EnergyFlow {
            particles,
            flow: FlowPattern {
                path: vec![LIGHTNING_START, LIGHTNING_END],
                intensity: 1.0,
                direction: (LIGHTNING_END - LIGHTNING_START).normalize_or_zero(),
                speed: 2.0,
                color: EnergyType::Lightning.hex_color().to_string(),
            },
            resonance: None,
            intensity: 1.0,
            energy_type: EnergyType::Lightning,
        },
        strike: Some(strike),
    }
}

/// Jagged main path followed by short branch segments
fn lightning_branches<R: Rng>(start: Vec3, end: Vec3, rng: &mut R) -> Vec<Vec<Vec3>> {
    let main_path: Vec<Vec3> = (0..=LIGHTNING_SEGMENTS)
        .map(|i| {
            let point = start.lerp(end, i as f32 / LIGHTNING_SEGMENTS as f32);
            if i == 0 || i == LIGHTNING_SEGMENTS {
                point
            } else {
                point + jitter(rng, 0.3)
            }
        })
        .collect();

    let mut branches = Vec::with_capacity(LIGHTNING_BRANCHES + 1);
    for _ in 0..LIGHTNING_BRANCHES {
        let from = main_path[rng.gen_range(0..main_path.len())];
        let to = from + Vec3::new(centered(rng, 2.0), centered(rng, 2.0), centered(rng, 1.0));
        branches.push(vec![from, to]);
    }
    branches.insert(0, main_path);
    branches
}

/// Random cloud used by council, architecture and ambient effects
pub fn scatter_particles<R: Rng>(energy_type: EnergyType, count: usize, rng: &mut R) -> Vec<Particle> {
    let color = energy_type.color();
    (0..count)
        .map(|_| {
            let position = Vec3::new(centered(rng, 10.0), centered(rng, 10.0), centered(rng, 5.0));
            Particle::new(position, drift(rng), color, 1.0)
        })
        .collect()
}

fn scatter<R: Rng>(energy_type: EnergyType, count: usize, rng: &mut R) -> GeneratedPattern {
    GeneratedPattern {
        flow: EnergyFlow {
            particles: scatter_particles(energy_type, count, rng),
            flow: FlowPattern {
                path: Vec::new(),
                intensity: 0.6,
                direction: Vec3::Y,
                speed: 1.0,
                color: energy_type.hex_color().to_string(),
            },
            resonance: None,
            intensity: 0.6,
            energy_type,
        },
        strike: None,
    }
}

/// Expected planar radius of spiral particle `t` before the wobble term
pub fn spiral_radius(t: f32) -> f32 {
    SPIRAL_BASE_RADIUS + t * SPIRAL_GROWTH
}

/// Expanding spiral around the origin
fn adaptive_spiral<R: Rng>(count: usize, rng: &mut R) -> GeneratedPattern {
    let color = EnergyType::Adaptive.color();
    let particles = (0..count)
        .map(|i| {
            let t = i as f32 / count as f32;
            let angle = t * SPIRAL_TURNS * TAU;
            let radius = spiral_radius(t) + SPIRAL_WOBBLE * (angle * 3.0).sin();
            let outward = Vec3::new(angle.cos(), angle.sin(), 0.0);

            let position = outward * radius + Vec3::new(0.0, 0.0, centered(rng, 0.3));
            let velocity = outward * (0.3 + rng.gen::<f32>() * 0.4)
                + Vec3::new(0.0, 0.0, centered(rng, 0.2));
            Particle::new(position, velocity, color, 0.8 + t * 0.6)
        })
        .collect();

    GeneratedPattern {
        flow: EnergyFlow {
            particles,
            flow: FlowPattern {
                path: Vec::new(),
                intensity: 0.8,
                direction: Vec3::new(0.0, 0.0, 1.0),
                speed: 1.5,
                color: EnergyType::Adaptive.hex_color().to_string(),
            },
            resonance: None,
            intensity: 0.8,
            energy_type: EnergyType::Adaptive,
        },
        strike: None,
    }
}

/// Radius of ring `layer`
pub fn ring_radius(layer: usize) -> f32 {
    RING_BASE_RADIUS + layer as f32 * RING_SPACING
}

/// Stacked rotating rings with a sine-modulated height
fn consciousness_rings<R: Rng>(count: usize, rng: &mut R) -> GeneratedPattern {
    let color = EnergyType::Consciousness.color();
    let particles = (0..count)
        .map(|i| {
            let layer = i % RING_LAYERS;
            let slot = i / RING_LAYERS;
            // Particles landing in this layer
            let in_layer = (count - layer + RING_LAYERS - 1) / RING_LAYERS;

            let angle = slot as f32 / in_layer as f32 * TAU + layer as f32 * RING_LAYER_ROTATION;
            let radius = ring_radius(layer);
            let height = (angle * 2.0 + layer as f32).sin() * RING_HEIGHT;
            let position = Vec3::new(angle.cos() * radius, height, angle.sin() * radius);

            // Alternate spin direction per ring
            let spin = if layer % 2 == 0 { 1.0 } else { -1.0 };
            let speed = 0.4 + rng.gen::<f32>() * 0.2;
            let velocity = Vec3::new(-angle.sin(), 0.0, angle.cos()) * (spin * speed);

            Particle::new(position, velocity, color, 1.0 + layer as f32 * 0.1)
        })
        .collect();

    GeneratedPattern {
        flow: EnergyFlow {
            particles,
            flow: FlowPattern {
                path: Vec::new(),
                intensity: 1.0,
                direction: Vec3::Y,
                speed: 1.0,
                color: EnergyType::Consciousness.hex_color().to_string(),
            },
            resonance: Some(ResonanceField {
                center: Vec3::ZERO,
                radius: 5.0,
                strength: 0.3,
                frequency: 1.0,
            }),
            intensity: 1.0,
            energy_type: EnergyType::Consciousness,
        },
        strike: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: u64 = 42;

    fn run(energy_type: EnergyType, text: &str) -> GeneratedPattern {
        let count = PatternTable::default().get(energy_type).particle_count(text);
        generate(energy_type, text, count, SEED)
    }

    #[test]
    fn test_particle_counts() {
        let table = PatternTable::default();
        assert_eq!(table.lightning.particle_count("hello"), 10);
        assert_eq!(table.lightning.particle_count(&"x".repeat(80)), 100);
        assert_eq!(table.adaptive.particle_count("hello world"), 33);
        assert_eq!(table.adaptive.particle_count(&"x".repeat(60)), 150);
        assert_eq!(table.consciousness.particle_count("abc"), 12);
        assert_eq!(table.consciousness.particle_count(&"x".repeat(60)), 200);
        // Counted in characters, not bytes
        assert_eq!(table.lightning.particle_count("⚡⚡"), 4);
        // Never empty
        assert_eq!(table.lightning.particle_count(""), 1);
    }

    #[test]
    fn test_lightning_follows_segment() {
        let text = "why is the sky blue";
        let pattern = run(EnergyType::Lightning, text);
        let particles = &pattern.flow.particles;
        assert_eq!(particles.len(), 2 * text.len());

        let half = LIGHTNING_JITTER / 2.0 + 1e-5;
        for (i, p) in particles.iter().enumerate() {
            let expected = LIGHTNING_START.lerp(LIGHTNING_END, i as f32 / particles.len() as f32);
            let offset = p.position - expected;
            assert!(offset.x.abs() <= half, "particle {} x off by {}", i, offset.x);
            assert!(offset.y.abs() <= half, "particle {} y off by {}", i, offset.y);
            assert!(offset.z.abs() <= half, "particle {} z off by {}", i, offset.z);
            assert!(p.velocity.y >= 0.0);
            assert_eq!(p.lifetime, p.max_lifetime);
        }

        assert_eq!(pattern.flow.flow.path, vec![LIGHTNING_START, LIGHTNING_END]);
        assert_eq!(pattern.flow.energy_type, EnergyType::Lightning);
        assert!((pattern.flow.flow.direction.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_lightning_strike_shape() {
        let strike = run(EnergyType::Lightning, "branching").strike.unwrap();
        assert_eq!(strike.branches.len(), 1 + LIGHTNING_BRANCHES);

        let main = &strike.branches[0];
        assert_eq!(main.len(), LIGHTNING_SEGMENTS + 1);
        assert_eq!(main[0], LIGHTNING_START);
        assert_eq!(main[LIGHTNING_SEGMENTS], LIGHTNING_END);

        for branch in &strike.branches[1..] {
            assert_eq!(branch.len(), 2);
            assert!(main.contains(&branch[0]));
        }
    }

    #[test]
    fn test_adaptive_hello_world() {
        let pattern = run(EnergyType::Adaptive, "hello world");
        assert_eq!(pattern.flow.particles.len(), 33);
        assert!(pattern.flow.flow.path.is_empty());
        assert_eq!(pattern.flow.energy_type, EnergyType::Adaptive);
        assert!(pattern.strike.is_none());
    }

    #[test]
    fn test_adaptive_spiral_expands() {
        let pattern = run(EnergyType::Adaptive, &"s".repeat(40));
        let count = pattern.flow.particles.len();
        for (i, p) in pattern.flow.particles.iter().enumerate() {
            let t = i as f32 / count as f32;
            let planar = (p.position.x * p.position.x + p.position.y * p.position.y).sqrt();
            let base = spiral_radius(t);
            assert!(
                (planar - base).abs() <= SPIRAL_WOBBLE + 1e-4,
                "particle {} at radius {} expected near {}",
                i,
                planar,
                base
            );
        }
    }

    #[test]
    fn test_consciousness_rings() {
        let pattern = run(EnergyType::Consciousness, "who am i");
        let particles = &pattern.flow.particles;
        assert_eq!(particles.len(), 32);
        assert!(pattern.flow.flow.path.is_empty());
        assert!(pattern.flow.resonance.is_some());

        for (i, p) in particles.iter().enumerate() {
            let horizontal = (p.position.x * p.position.x + p.position.z * p.position.z).sqrt();
            assert!((horizontal - ring_radius(i % RING_LAYERS)).abs() < 1e-4);
            assert!(p.position.y.abs() <= RING_HEIGHT + 1e-6);
        }
    }

    #[test]
    fn test_scatter_types_stay_in_box() {
        for energy_type in [EnergyType::Council, EnergyType::Architecture] {
            let pattern = run(energy_type, "ambient");
            assert_eq!(pattern.flow.energy_type, energy_type);
            for p in &pattern.flow.particles {
                assert!(p.position.x.abs() <= 5.0 && p.position.y.abs() <= 5.0);
                assert!(p.position.z.abs() <= 2.5);
                assert_eq!(p.color, energy_type.color());
            }
        }
    }

    #[test]
    fn test_zero_count_yields_one_particle() {
        for energy_type in EnergyType::ALL {
            let pattern = generate(energy_type, "", 0, SEED);
            assert_eq!(pattern.flow.particles.len(), 1, "{} produced no particles", energy_type);
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = run(EnergyType::Lightning, "same text");
        let b = run(EnergyType::Lightning, "same text");
        assert_eq!(a, b);

        let c = generate(EnergyType::Lightning, "other text", 18, SEED);
        assert_ne!(a.flow.particles, c.flow.particles);
    }

    #[test]
    fn test_pattern_seed_is_fixed() {
        assert_eq!(pattern_seed(0, ""), FNV_OFFSET);
        assert_eq!(pattern_seed(0, "a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(pattern_seed(0, "lightning"), 0x6d0c_f187_cd10_e4a5);
        assert_eq!(pattern_seed(7, "a"), 0xaf63_dc4c_8601_ec8c ^ 7);
        assert_ne!(pattern_seed(SEED, "a"), pattern_seed(SEED, "b"));
    }
}
