//! Generated credentials for platforms that require an account before applying.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
const DIGITS: &[u8] = b"23456789";
const SYMBOLS: &[u8] = b"!@#$%^&*-_=+?";

pub const DEFAULT_PASSWORD_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCredentials {
    pub username: String,
    pub password: String,
}

impl AccountCredentials {
    pub fn for_email(email: &str) -> Self {
        Self {
            username: email.trim().to_string(),
            password: generate_password(DEFAULT_PASSWORD_LEN),
        }
    }
}

/// Random password with at least one character from each class.
/// Lengths below 8 are raised to 8.
pub fn generate_password(len: usize) -> String {
    let len = len.max(8);
    let mut rng = OsRng;
    let classes = [LOWER, UPPER, DIGITS, SYMBOLS];

    let mut chars: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    let all: Vec<u8> = classes.concat();
    while chars.len() < len {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);
    chars.into_iter().map(char::from).collect()
}
