//! Instruction texts sent to the model, and the offline prompt template.

use crate::analysis::Analysis;
use crate::llm::ResponseSchema;
use std::cmp::Ordering;

/// The structured-output contract for an [`Analysis`].
pub fn analysis_schema() -> ResponseSchema {
    let timbre_entry = ResponseSchema::object(
        vec![
            (
                "name",
                ResponseSchema::string("Name of the instrument or sound source."),
            ),
            (
                "value",
                ResponseSchema::number(
                    "A value from 0 to 1 representing the prominence of this instrument.",
                ),
            ),
        ],
        &["name", "value"],
    );

    ResponseSchema::object(
        vec![
            ("title", ResponseSchema::string("The title of the song. If it cannot be determined, estimate a plausible title.")),
            ("genre", ResponseSchema::string("The primary genre of the song, e.g., \"Indie Pop\", \"Classic Rock\".")),
            ("tempo", ResponseSchema::integer("The tempo of the song in beats per minute (BPM), as an integer.")),
            ("key", ResponseSchema::string("The musical key of the song, e.g., \"C#\", \"F\", \"A\".")),
            ("mode", ResponseSchema::string("The mode of the song, typically \"Major\" or \"Minor\".")),
            (
                "chordProgression",
                ResponseSchema::array(
                    ResponseSchema::plain_string(),
                    "A common 4-chord progression found in the song, as an array of strings.",
                ),
            ),
            (
                "timbre",
                ResponseSchema::array(
                    timbre_entry,
                    "A profile of the top 5 most prominent instruments or sounds.",
                ),
            ),
            ("energy", ResponseSchema::number("A value from 0 to 1 representing the energy level of the song.")),
            ("mood", ResponseSchema::string("A few words describing the mood of the song, e.g., \"Uplifting, Energetic\".")),
        ],
        &[
            "title",
            "genre",
            "tempo",
            "key",
            "mode",
            "chordProgression",
            "timbre",
            "energy",
            "mood",
        ],
    )
}

pub fn analysis_instruction(source: &str, context: Option<&str>) -> String {
    let context_line = match context {
        Some(context) => format!("\nContext from URL metadata: {}\n", context),
        None => String::new(),
    };

    format!(
        r#"You are an expert musicologist AI. A user has provided the following text, which could be a song title, an artist, a genre, or a YouTube URL.
Your task is to identify the song and generate a plausible and detailed musical analysis for it.

Input: "{source}"
{context_line}
First, use the provided input and context (if available) to identify the song's title and primary genre. If you cannot determine the exact song, create a plausible title and genre based on the available information.
Then, generate the rest of the analysis. The timbre profile should list the 5 most prominent instruments. The chord progression should be a typical 4-chord loop appropriate for the genre.
The final output MUST be a single JSON object matching the provided schema. Do not include any other text or markdown."#
    )
}

/// Names of the three most prominent instruments, lower-cased.
pub fn instrumentation_summary(analysis: &Analysis) -> String {
    let mut timbre: Vec<_> = analysis.timbre.iter().collect();
    timbre.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal));
    timbre
        .into_iter()
        .take(3)
        .map(|t| t.name.to_lowercase())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn energy_label(energy: f64) -> &'static str {
    if energy > 0.7 {
        "High"
    } else if energy > 0.4 {
        "Medium"
    } else {
        "Low"
    }
}

pub fn prompt_instruction(analysis: &Analysis) -> String {
    format!(
        r#"You are an expert music prompt engineer for generative AI music tools like Suno AI.
Based on the following musical analysis data, create a single, cohesive, and descriptive prompt in one block of text.
The prompt should be evocative and capture the essence of the song's style.
Include genre, mood, instrumentation, tempo (BPM), and key.
Do not use markdown or formatting.

Analysis Data:
- Genre: {genre}
- Tempo: {tempo} BPM
- Key: {key} {mode}
- Mood: {mood}
- Primary Instruments (Timbre): {instruments}
- Energy Level: {energy}
- Chord Progression Feel: A standard progression like {chords}

Generate the prompt."#,
        genre = analysis.genre,
        tempo = analysis.tempo,
        key = analysis.key,
        mode = analysis.mode,
        mood = analysis.mood,
        instruments = instrumentation_summary(analysis),
        energy = energy_label(analysis.energy),
        chords = analysis.chord_progression.join(" - "),
    )
}

/// Prompt produced without a model.
pub fn offline_prompt(analysis: &Analysis) -> String {
    format!(
        "[ Instrumental ], {}, upbeat {}, driving bassline, rhythmic drums, {}, energetic and danceable, {} BPM, key of {} {}",
        analysis.mood.to_lowercase(),
        analysis.genre.to_lowercase(),
        instrumentation_summary(analysis),
        analysis.tempo,
        analysis.key,
        analysis.mode,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{sample_analysis, Timbre};

    #[test]
    fn summary_takes_top_three_by_value() {
        let mut analysis = sample_analysis();
        analysis.timbre = vec![
            Timbre::new("Pad", 0.2),
            Timbre::new("Lead Synth", 0.95),
            Timbre::new("Kick", 0.6),
            Timbre::new("Vocals", 0.8),
        ];
        assert_eq!(instrumentation_summary(&analysis), "lead synth, vocals, kick");
    }

    #[test]
    fn summary_handles_short_profiles() {
        let mut analysis = sample_analysis();
        analysis.timbre = vec![Timbre::new("Piano", 0.5)];
        assert_eq!(instrumentation_summary(&analysis), "piano");
        analysis.timbre.clear();
        assert_eq!(instrumentation_summary(&analysis), "");
    }

    #[test]
    fn energy_labels_use_strict_thresholds() {
        assert_eq!(energy_label(0.71), "High");
        assert_eq!(energy_label(0.7), "Medium");
        assert_eq!(energy_label(0.41), "Medium");
        assert_eq!(energy_label(0.4), "Low");
        assert_eq!(energy_label(0.0), "Low");
    }

    #[test]
    fn analysis_instruction_embeds_source_and_context() {
        let without = analysis_instruction("Bohemian Rhapsody", None);
        assert!(without.contains("Input: \"Bohemian Rhapsody\""));
        assert!(!without.contains("Context from URL metadata"));

        let with = analysis_instruction("https://youtu.be/x", Some("Title: \"Song\""));
        assert!(with.contains("Context from URL metadata: Title: \"Song\""));
    }

    #[test]
    fn prompt_instruction_embeds_analysis_fields() {
        let instruction = prompt_instruction(&sample_analysis());
        assert!(instruction.contains("- Genre: Lofi Hip-Hop"));
        assert!(instruction.contains("- Tempo: 80 BPM"));
        assert!(instruction.contains("- Key: C Minor"));
        assert!(instruction.contains("- Primary Instruments (Timbre): rhodes piano, lo-fi drums, sub bass"));
        assert!(instruction.contains("- Energy Level: Low"));
        assert!(instruction.contains("Am7 - Dm7 - G7 - Cmaj7"));
    }

    #[test]
    fn offline_prompt_is_templated() {
        assert_eq!(
            offline_prompt(&sample_analysis()),
            "[ Instrumental ], relaxing, chill, study, upbeat lofi hip-hop, driving bassline, rhythmic drums, rhodes piano, lo-fi drums, sub bass, energetic and danceable, 80 BPM, key of C Minor"
        );
    }

    #[test]
    fn schema_requires_every_field() {
        let schema = analysis_schema();
        assert_eq!(schema.required.len(), 9);
        assert_eq!(schema.properties.len(), 9);
        assert_eq!(schema.property_ordering[0], "title");
    }
}
