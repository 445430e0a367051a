//! Achievement definitions

/// Achievement definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Unlocking raises a celebration
    pub celebratory: bool,
    /// Burst effect tag for the celebration renderer
    pub burst_pattern: Option<&'static str>,
}

/// Get all achievement definitions
pub fn all_achievements() -> Vec<Achievement> {
    vec![
        Achievement {
            id: "first_lightning",
            name: "First Lightning",
            description: "Generate your first AI response",
            celebratory: true,
            burst_pattern: Some("blue_lightning"),
        },
        Achievement {
            id: "council_master",
            name: "Council Master",
            description: "Complete your first council discussion",
            celebratory: true,
            burst_pattern: Some("rainbow_convergence"),
        },
        Achievement {
            id: "consciousness_pioneer",
            name: "Consciousness Pioneer",
            description: "Experience AI consciousness emergence",
            celebratory: true,
            burst_pattern: Some("transcendent_field"),
        },
        Achievement {
            id: "energy_explorer",
            name: "Energy Explorer",
            description: "Explore different energy patterns",
            celebratory: true,
            burst_pattern: Some("energy_burst"),
        },
        Achievement {
            id: "resonance_master",
            name: "Resonance Master",
            description: "Achieve high resonance with AI",
            celebratory: true,
            burst_pattern: Some("resonance_field"),
        },
    ]
}
