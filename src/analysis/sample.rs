use super::models::{Analysis, Timbre};

/// The fixed analysis returned when no model credential is configured.
pub fn sample_analysis() -> Analysis {
    Analysis {
        title: "lofi hip hop radio - beats to relax/study to".to_string(),
        genre: "Lofi Hip-Hop".to_string(),
        tempo: 80,
        key: "C".to_string(),
        mode: "Minor".to_string(),
        chord_progression: ["Am7", "Dm7", "G7", "Cmaj7"]
            .into_iter()
            .map(String::from)
            .collect(),
        timbre: vec![
            Timbre::new("Rhodes Piano", 0.9),
            Timbre::new("Lo-fi Drums", 0.8),
            Timbre::new("Sub Bass", 0.7),
            Timbre::new("Chilled Guitar", 0.5),
            Timbre::new("Vinyl Crackle", 0.4),
        ],
        energy: 0.2,
        mood: "Relaxing, Chill, Study".to_string(),
    }
}
