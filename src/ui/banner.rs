use console::{style, Term};
use tui_banner::{Align, Banner, ColorMode, Fill, Gradient, GradientDirection, Palette};

const BRAND: u8 = 214;      // amber
const BRAND_DIM: u8 = 130;  // burnt orange
const DIM: u8 = 240;

const SEP_CHAR: char = '\u{2026}'; // …

const TAGLINE: &str = "Origin IP discovery behind WAF and CDN providers";

/// Print the startup banner to stderr so piped stdout stays clean.
pub fn print_banner() {
    let term = Term::stderr();
    let (_, term_cols) = term.size();
    let term_w = term_cols as usize;

    let center = |text_w: usize| -> String {
        if term_w > text_w + 4 {
            " ".repeat((term_w - text_w) / 2)
        } else {
            "  ".to_string()
        }
    };

    let palette = Palette::from_hex(&[
        "#FFF1C1", // pale gold
        "#FFAF00", // amber
        "#D75F00", // burnt orange
        "#5F5F87", // slate
    ]);
    let gradient = Gradient::new(palette.colors().to_vec(), GradientDirection::Diagonal);

    let banner_text = match Banner::new("CLOUDMARE") {
        Ok(b) => b
            .gradient(gradient)
            .fill(Fill::Keep)
            .align(Align::Center)
            .trim_vertical(true)
            .color_mode(ColorMode::TrueColor)
            .width(term_w)
            .render(),
        Err(_) => format!("{}{}\n", center(9), style("CLOUDMARE").color256(BRAND).bold()),
    };

    eprintln!();
    eprint!("{}", banner_text);

    let built = option_env!("BUILD_TIMESTAMP").and_then(|t| t.get(..10)).unwrap_or("unknown");
    let version_str = format!(
        "v{} ({}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_HASH").unwrap_or("dev"),
        built
    );
    eprintln!("{}{}", center(version_str.len()), style(&version_str).color256(DIM));

    let scene_w = term_w.clamp(40, 76);
    let pad = center(scene_w);
    let sep = SEP_CHAR.to_string().repeat(scene_w);
    eprintln!("{}{}", pad, style(&sep).color256(BRAND_DIM));
    eprintln!("{}{}", center(TAGLINE.len()), style(TAGLINE).white().bold());
    eprintln!("{}{}", pad, style(&sep).color256(BRAND_DIM));
    eprintln!(
        "{}{}",
        center(48),
        style("Only test infrastructure you are authorized to assess.").dim()
    );
    eprintln!();
}
