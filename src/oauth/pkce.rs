use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

use crate::error::VkwallError;

pub const MIN_VERIFIER_LENGTH: usize = 43;
pub const MAX_VERIFIER_LENGTH: usize = 128;
pub const DEFAULT_VERIFIER_LENGTH: usize = 64;
pub const CHALLENGE_METHOD: &str = "S256";

const FILLER: char = 'A';

/// Verifier/challenge pair for one authorization attempt.
///
/// Not `Clone`: the verifier is handed over by value to the code exchange,
/// so a pair cannot be reused across attempts.
pub struct PkceChallenge {
    code_verifier: String,
    code_challenge: String,
}

impl std::fmt::Debug for PkceChallenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceChallenge")
            .field("code_challenge", &self.code_challenge)
            .finish_non_exhaustive()
    }
}

impl PkceChallenge {
    pub fn with_length(length: usize) -> Result<Self, VkwallError> {
        let code_verifier = generate_verifier(length)?;
        let code_challenge = derive_challenge(&code_verifier);
        Ok(Self {
            code_verifier,
            code_challenge,
        })
    }

    pub fn challenge(&self) -> &str {
        &self.code_challenge
    }

    /// Give up the pair, keeping only the verifier for the token exchange.
    pub fn into_verifier(self) -> String {
        self.code_verifier
    }
}

/// Random code verifier of exactly `length` URL-safe characters.
pub fn generate_verifier(length: usize) -> Result<String, VkwallError> {
    if !(MIN_VERIFIER_LENGTH..=MAX_VERIFIER_LENGTH).contains(&length) {
        return Err(VkwallError::config(
            "code_verifier length",
            format!(
                "must be between {MIN_VERIFIER_LENGTH} and {MAX_VERIFIER_LENGTH}, got {length}"
            ),
        ));
    }

    // base64 of n bytes is at least n characters long, so `length` bytes always suffice.
    let mut buf = vec![0u8; length];
    rand::RngCore::fill_bytes(&mut rand::rng(), &mut buf);
    let mut verifier = URL_SAFE_NO_PAD.encode(&buf);

    if verifier.len() < length {
        verifier.extend(std::iter::repeat_n(FILLER, length - verifier.len()));
    }
    verifier.truncate(length);
    Ok(verifier)
}

/// S256 transform: BASE64URL(SHA256(ASCII(verifier))) without padding.
pub fn derive_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
