/// Parse a comma-separated numeric profile string ("350,abc,370") into
/// per-token values, with unparseable tokens mapped to `None`.
///
/// Tokens are parsed through f64 first so values recorded with a fractional
/// part ("350.0") still resolve; non-finite values are treated as unknown.
pub fn parse_numeric_profile(profile: &str) -> Vec<Option<i32>> {
    if profile.trim().is_empty() {
        return Vec::new();
    }
    profile
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| v as i32)
        })
        .collect()
}
