/// Converts a `#RRGGBB` or `#RRGGBBAA` hex string into normalized RGB.
///
/// The leading marker is optional. Each 2-character group parses as a base-16
/// integer divided by 255; an 8-digit string's alpha group is ignored.
/// Malformed input (wrong length, non-hex digit) degrades to a zero vector
/// so a bad palette slot renders black instead of failing the frame.
pub fn hex_to_rgb(hex: &str) -> [f32; 3] {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if !digits.is_ascii() || (digits.len() != 6 && digits.len() != 8) {
        return [0.0; 3];
    }

    let mut rgb = [0.0f32; 3];
    for (slot, pair) in rgb.iter_mut().zip(digits.as_bytes().chunks_exact(2)) {
        let text = std::str::from_utf8(pair).expect("ascii checked above");
        match u8::from_str_radix(text, 16) {
            Ok(value) => *slot = value as f32 / 255.0,
            Err(_) => return [0.0; 3],
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_black_and_white_exactly() {
        assert_eq!(hex_to_rgb("#000000"), [0.0, 0.0, 0.0]);
        assert_eq!(hex_to_rgb("#FFFFFF"), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn converts_mixed_channels() {
        let [r, g, b] = hex_to_rgb("#CCFF00");
        assert!((r - 204.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(g, 1.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn accepts_missing_marker_and_lowercase() {
        assert_eq!(hex_to_rgb("ffffff"), [1.0, 1.0, 1.0]);
        assert_eq!(hex_to_rgb("00f2ff"), hex_to_rgb("#00F2FF"));
    }

    #[test]
    fn ignores_alpha_group() {
        assert_eq!(hex_to_rgb("#FF005580"), hex_to_rgb("#FF0055"));
    }

    #[test]
    fn every_valid_conversion_stays_normalized() {
        for hex in ["#123456", "#ABCDEF", "#808080", "#010203"] {
            for channel in hex_to_rgb(hex) {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
    }

    #[test]
    fn malformed_strings_degrade_to_zero() {
        assert_eq!(hex_to_rgb(""), [0.0; 3]);
        assert_eq!(hex_to_rgb("#CCFF0"), [0.0; 3]);
        assert_eq!(hex_to_rgb("#CCFF000"), [0.0; 3]);
        assert_eq!(hex_to_rgb("#GGHHII"), [0.0; 3]);
        assert_eq!(hex_to_rgb("not a color"), [0.0; 3]);
        assert_eq!(hex_to_rgb("#éééééé"), [0.0; 3]);
    }
}
