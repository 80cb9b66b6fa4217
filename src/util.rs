const LCG_MULTIPLIER: u64 = 9301;
const LCG_INCREMENT: u64 = 49_297;
const LCG_MODULUS: u64 = 233_280;

/// Seed derived from the sum of the character codes of `id`.
///
/// Anagrams share a seed; the grid cell separates them.
pub fn id_seed(id: &str) -> u64 {
    id.chars().map(|ch| ch as u64).sum()
}

fn lcg_next(state: u64) -> u64 {
    (state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT)) % LCG_MODULUS
}

/// Two pseudo-random values in `[-1, 1]` that only depend on `id`.
pub fn stable_pair(id: &str) -> (f32, f32) {
    let first = lcg_next(id_seed(id));
    let second = lcg_next(first);

    let x = first as f64 / LCG_MODULUS as f64;
    let y = second as f64 / LCG_MODULUS as f64;
    (((x * 2.0) - 1.0) as f32, ((y * 2.0) - 1.0) as f32)
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head = chars.by_ref().take(max_chars).collect::<String>();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

pub fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.trim().is_empty() {
        placeholder
    } else {
        value
    }
}
