//! Neon ASCII banner with gradient (NEWS-SENTINEL).
//! Uses figlet's built-in standard font.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Alert Red (#ff3b3b).
const ALERT_RED: (u8, u8, u8) = (0xff, 0x3b, 0x3b);
/// Verified Green (#2bd97c).
const VERIFIED_GREEN: (u8, u8, u8) = (0x2b, 0xd9, 0x7c);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Banner art, or the plain name if the font cannot render it.
fn banner_lines() -> Vec<String> {
    FIGfont::standard()
        .ok()
        .and_then(|font| font.convert("NEWS-SENTINEL").map(|fig| fig.to_string()))
        .map(|art| art.lines().map(str::to_string).collect())
        .unwrap_or_else(|| vec!["NEWS-SENTINEL".to_string()])
}

/// Prints the welcome banner with a gradient from Alert Red to Verified Green,
/// then version and key count.
pub fn print_welcome(key_count: usize) {
    let mut out = stdout();
    let lines = banner_lines();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(ALERT_RED, VERIFIED_GREEN, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: VERIFIED_GREEN.0,
        g: VERIFIED_GREEN.1,
        b: VERIFIED_GREEN.2,
    }));
    let _ = out.execute(Print(format!(
        "v{} | {} Gemini key(s) in rotation\r\n",
        version, key_count
    )));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints() {
        assert_eq!(lerp_rgb(ALERT_RED, VERIFIED_GREEN, 0.0), ALERT_RED);
        assert_eq!(lerp_rgb(ALERT_RED, VERIFIED_GREEN, 1.0), VERIFIED_GREEN);
    }

    #[test]
    fn test_banner_has_lines() {
        assert!(!banner_lines().is_empty());
    }
}
