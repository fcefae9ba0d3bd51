use clap::builder::styling::{AnsiColor, Color, Style};
use clap::builder::Styles;
use crossterm::style::{Attribute, Color as CtColor, Stylize};
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::analysis::{AnalysisResult, VariationParams};

// ═══════════════════════════════════════════════════════════════════════════════
// Clap Styles
// ═══════════════════════════════════════════════════════════════════════════════

pub fn get_styles() -> Styles {
    clap::builder::Styles::styled()
        .usage(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .header(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .invalid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
        .valid(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Color Palette
// ═══════════════════════════════════════════════════════════════════════════════

pub mod colors {
    use crossterm::style::Color;

    pub const CYAN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 255,
    };
    pub const MAGENTA: Color = Color::Rgb {
        r: 255,
        g: 0,
        b: 255,
    };
    pub const PURPLE: Color = Color::Rgb {
        r: 180,
        g: 100,
        b: 255,
    };
    pub const GREEN: Color = Color::Rgb {
        r: 0,
        g: 255,
        b: 136,
    };
    pub const ORANGE: Color = Color::Rgb {
        r: 255,
        g: 165,
        b: 0,
    };
    pub const RED: Color = Color::Rgb {
        r: 255,
        g: 85,
        b: 85,
    };
    pub const DIM: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Box Drawing Characters
// ═══════════════════════════════════════════════════════════════════════════════

pub mod box_chars {
    pub const SINGLE_HORIZONTAL: &str = "─";

    // Rounded box
    pub const ROUND_TOP_LEFT: &str = "╭";
    pub const ROUND_TOP_RIGHT: &str = "╮";
    pub const ROUND_BOTTOM_LEFT: &str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &str = "╯";

    // Meters
    pub const METER_FULL: &str = "█";
    pub const METER_EMPTY: &str = "░";

    // Arrows and bullets
    pub const ARROW_RIGHT: &str = "▶";
    pub const BULLET: &str = "●";
    pub const DIAMOND: &str = "◆";
    pub const CHECK: &str = "✓";
    pub const CROSS_MARK: &str = "✗";
}

// ═══════════════════════════════════════════════════════════════════════════════
// Status Indicators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_success(message: &str) {
    println!(
        " {} {}",
        box_chars::CHECK.to_string().with(colors::GREEN).bold(),
        message.with(colors::GREEN)
    );
}

pub fn print_error(message: &str) {
    eprintln!(
        " {} {}",
        box_chars::CROSS_MARK.to_string().with(colors::RED).bold(),
        message.with(colors::RED)
    );
}

pub fn print_warning(message: &str) {
    println!(
        " {} {}",
        "⚠".with(colors::ORANGE).bold(),
        message.with(colors::ORANGE)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Section Headers
// ═══════════════════════════════════════════════════════════════════════════════

const SECTION_WIDTH: usize = 60;

pub fn print_section_header(title: &str) {
    let title_len = title.width();
    let padding = SECTION_WIDTH.saturating_sub(title_len + 4) / 2;

    println!();
    print!("{}", box_chars::ROUND_TOP_LEFT.with(colors::CYAN));
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(padding)
            .with(colors::CYAN)
    );
    print!(
        " {} ",
        title.with(colors::CYAN).bold().attribute(Attribute::Italic)
    );
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(SECTION_WIDTH.saturating_sub(title_len + 4 + padding))
            .with(colors::CYAN)
    );
    println!("{}", box_chars::ROUND_TOP_RIGHT.with(colors::CYAN));
}

pub fn print_section_footer() {
    print!("{}", box_chars::ROUND_BOTTOM_LEFT.with(colors::CYAN));
    print!(
        "{}",
        box_chars::SINGLE_HORIZONTAL
            .repeat(SECTION_WIDTH)
            .with(colors::CYAN)
    );
    println!("{}", box_chars::ROUND_BOTTOM_RIGHT.with(colors::CYAN));
    println!();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Key-Value Display
// ═══════════════════════════════════════════════════════════════════════════════

pub fn print_key_value(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::BULLET.with(colors::PURPLE),
        format!("{}:", key).with(colors::DIM),
        value.with(colors::WHITE)
    );
}

pub fn print_key_value_highlight(key: &str, value: &str) {
    println!(
        "  {} {} {}",
        box_chars::DIAMOND.with(colors::MAGENTA),
        format!("{}:", key).with(colors::CYAN).bold(),
        value.with(colors::GREEN).bold()
    );
}

pub fn print_list_item(item: &str, indent: usize) {
    let indent_str = "  ".repeat(indent);
    println!(
        "{}{}  {}",
        indent_str,
        box_chars::ARROW_RIGHT.with(colors::CYAN),
        item.with(colors::WHITE)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Meters
// ═══════════════════════════════════════════════════════════════════════════════

pub const METER_WIDTH: usize = 20;

/// Unstyled bar for a value in [0, 1]; out of range values are clamped.
pub fn meter_bar(value: f64, width: usize) -> String {
    let filled = (value.clamp(0.0, 1.0) * width as f64).round() as usize;
    format!(
        "{}{}",
        box_chars::METER_FULL.repeat(filled),
        box_chars::METER_EMPTY.repeat(width - filled)
    )
}

fn meter_color(value: f64) -> CtColor {
    if value > 0.7 {
        colors::MAGENTA
    } else if value > 0.4 {
        colors::PURPLE
    } else {
        colors::CYAN
    }
}

pub fn print_meter(label: &str, value: f64, label_width: usize) {
    let padding = label_width.saturating_sub(label.width());
    println!(
        "  {}{} {} {}",
        label.with(colors::DIM),
        " ".repeat(padding),
        meter_bar(value, METER_WIDTH).with(meter_color(value)),
        format!("{:>3}%", (value.clamp(0.0, 1.0) * 100.0).round() as u32).with(colors::WHITE)
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Analysis Display
// ═══════════════════════════════════════════════════════════════════════════════

pub fn format_variation(params: &VariationParams) -> String {
    format!(
        "tempo {:+}%, key {:+} st, energy {:+}%",
        params.tempo, params.key, params.energy
    )
}

pub fn print_analysis(result: &AnalysisResult, params: &VariationParams) {
    let analysis = &result.analysis;

    print_section_header(&result.title);
    print_key_value("Source", &result.source_url);
    print_key_value(
        "Confidence",
        &format!("{:.0}%", result.confidence * 100.0),
    );
    print_key_value("Analyzed at", &result.timestamp);
    if !params.is_identity() {
        print_key_value("Variation", &format_variation(params));
    }
    println!();

    print_key_value_highlight("Tempo", &format!("{} BPM", analysis.tempo));
    print_key_value_highlight("Key", &format!("{} {}", analysis.key, analysis.mode));
    print_key_value_highlight("Mood", &analysis.mood);
    println!();

    print_key_value("Chord progression", "");
    for chord in &analysis.chord_progression {
        print_list_item(chord, 2);
    }
    println!();

    let label_width = analysis
        .timbre
        .iter()
        .map(|t| t.name.width())
        .chain(std::iter::once("Energy".width()))
        .max()
        .unwrap_or(0);
    for timbre in &analysis.timbre {
        print_meter(&timbre.name, timbre.value, label_width);
    }
    print_meter("Energy", analysis.energy, label_width);

    print_section_footer();
}

pub fn print_prompt(prompt: &str) {
    print_section_header("Music prompt");
    println!("  {}", prompt.with(colors::GREEN));
    print_section_footer();
}

pub fn flush() {
    let _ = io::stdout().flush();
}
