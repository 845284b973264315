//! Random test data. Anything that lands in shared backend state is unique
//! per call so parallel runs do not collide.

use std::collections::BTreeSet;

use rand::Rng;
use rand::seq::SliceRandom;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const PUNCTUATION: &[u8] = b"~!@#$%^&*()_+|{}[]:;<>,.?/-";
const UNDERSCORE: &[u8] = b"_";
const EMAIL_DOMAINS: [&str; 4] = ["gmail.com", "yahoo.com", "outlook.com", "yandex.ru"];

/// `<label><6..=12 random chars>@<domain>`.
pub fn email(label: &str) -> String {
    let mut rng = rand::thread_rng();
    let alphabet: Vec<u8> = [LOWER, DIGITS, UNDERSCORE].concat();
    let len = rng.gen_range(6..=12);
    let local = random_string(&mut rng, &alphabet, len);
    let domain = EMAIL_DOMAINS.choose(&mut rng).copied().unwrap_or("gmail.com");
    format!("{label}{local}@{domain}")
}

/// A valid password mixes lower, upper, digit and punctuation; an invalid
/// one is lower-case letters only.
pub fn password(length: usize, valid: bool) -> String {
    let mut rng = rand::thread_rng();
    if !valid {
        return random_string(&mut rng, LOWER, length);
    }

    let classes = [LOWER, UPPER, DIGITS, PUNCTUATION];
    let alphabet: Vec<u8> = classes.concat();
    let mut chars: Vec<u8> = classes
        .iter()
        .filter_map(|class| class.choose(&mut rng).copied())
        .collect();
    while chars.len() < length.max(classes.len()) {
        if let Some(byte) = alphabet.choose(&mut rng) {
            chars.push(*byte);
        }
    }
    chars.shuffle(&mut rng);
    String::from_utf8_lossy(&chars).into_owned()
}

/// Letters, digits and underscores only; at least three characters.
pub fn nickname(length: usize) -> String {
    let mut rng = rand::thread_rng();
    let alphabet: Vec<u8> = [LOWER, DIGITS, UNDERSCORE].concat();
    random_string(&mut rng, &alphabet, length.max(3))
}

/// `UTC-12` .. `UTC+14`.
pub fn timezone() -> String {
    let offset: i32 = rand::thread_rng().gen_range(-12..=14);
    format!("UTC{offset:+}")
}

/// First id in `pool` not in `used`, else a random id above the pool.
pub fn free_id(used: &BTreeSet<i64>, pool: std::ops::RangeInclusive<i64>) -> i64 {
    if let Some(id) = pool.clone().find(|id| !used.contains(id)) {
        return id;
    }
    let mut rng = rand::thread_rng();
    let low = pool.end() + 1;
    loop {
        let candidate = rng.gen_range(low..=low + 150);
        if !used.contains(&candidate) {
            return candidate;
        }
    }
}

fn random_string(rng: &mut impl Rng, alphabet: &[u8], len: usize) -> String {
    (0..len)
        .filter_map(|_| alphabet.choose(&mut *rng).map(|byte| *byte as char))
        .collect()
}
