//! Generated login passwords.
//!
//! Passwords leave the process exactly once, in the response to the request
//! that created them. They are never logged or persisted, and the backing
//! buffer is wiped on drop.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

/// Characters a generated password may contain.
pub const PASSWORD_ALPHABET: &[u8; 70] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

/// Default password length for new logins and rotations.
pub const DEFAULT_PASSWORD_LENGTH: usize = 16;

// Largest multiple of the alphabet size that fits in a byte; bytes at or
// above it are discarded so every character is equally likely.
const ACCEPT_BELOW: u8 = 210;
const ENTROPY_CHUNK: usize = 64;

/// Failures raised while generating a password.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordError {
    /// Requested length was zero.
    #[error("password length must be positive")]
    InvalidLength,
    /// The operating system entropy source failed.
    #[error("entropy source failed: {message}")]
    Randomness { message: String },
}

/// A plaintext password held in memory that is zeroed on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Reveal the plaintext. Callers must not log the result.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    #[cfg(test)]
    pub(crate) fn from_plaintext(value: &str) -> Self {
        Self(Zeroizing::new(value.to_owned()))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Generate a password of `length` characters drawn uniformly from
/// [`PASSWORD_ALPHABET`] using the operating system CSPRNG.
///
/// # Errors
/// [`PasswordError::InvalidLength`] for a zero length and
/// [`PasswordError::Randomness`] when the entropy source fails.
///
/// # Examples
/// ```
/// use pgtenant::domain::{generate_password, PASSWORD_ALPHABET};
///
/// let password = generate_password(16).expect("entropy available");
/// assert_eq!(password.expose().len(), 16);
/// assert!(password.expose().bytes().all(|b| PASSWORD_ALPHABET.contains(&b)));
/// ```
pub fn generate_password(length: usize) -> Result<Password, PasswordError> {
    generate_with(&mut OsRng, length)
}

fn generate_with<R: RngCore>(rng: &mut R, length: usize) -> Result<Password, PasswordError> {
    if length == 0 {
        return Err(PasswordError::InvalidLength);
    }

    let mut output = Zeroizing::new(String::with_capacity(length));
    let mut chunk = Zeroizing::new([0_u8; ENTROPY_CHUNK]);
    while output.len() < length {
        rng.try_fill_bytes(chunk.as_mut_slice())
            .map_err(|err| PasswordError::Randomness {
                message: err.to_string(),
            })?;
        for byte in chunk.iter().copied().filter(|b| *b < ACCEPT_BELOW) {
            if output.len() == length {
                break;
            }
            if let Some(symbol) = alphabet_symbol(byte) {
                output.push(symbol);
            }
        }
    }
    Ok(Password(output))
}

fn alphabet_symbol(byte: u8) -> Option<char> {
    PASSWORD_ALPHABET
        .get(usize::from(byte) % PASSWORD_ALPHABET.len())
        .copied()
        .map(char::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    struct FailingRng;

    impl RngCore for FailingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::other("no entropy")))
        }
    }

    /// Emits bytes that are all rejected except for one accepted value.
    struct MostlyRejectingRng;

    impl RngCore for MostlyRejectingRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(255);
            if let Some(last) = dest.last_mut() {
                *last = 71;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[rstest]
    fn generates_requested_length_from_alphabet() {
        let password = generate_password(DEFAULT_PASSWORD_LENGTH).expect("password");
        assert_eq!(password.expose().len(), DEFAULT_PASSWORD_LENGTH);
        assert!(
            password
                .expose()
                .bytes()
                .all(|b| PASSWORD_ALPHABET.contains(&b))
        );
    }

    #[rstest]
    fn successive_passwords_differ() {
        let first = generate_password(DEFAULT_PASSWORD_LENGTH).expect("first");
        let second = generate_password(DEFAULT_PASSWORD_LENGTH).expect("second");
        assert_ne!(first, second);
    }

    #[rstest]
    fn zero_length_is_rejected() {
        assert_eq!(generate_password(0), Err(PasswordError::InvalidLength));
    }

    #[rstest]
    fn entropy_failure_is_reported() {
        let error = generate_with(&mut FailingRng, 8).expect_err("entropy fails");
        assert!(matches!(error, PasswordError::Randomness { .. }));
    }

    #[rstest]
    fn out_of_range_bytes_are_discarded() {
        let password = generate_with(&mut MostlyRejectingRng, 3).expect("password");
        // 71 % 70 == 1 -> 'b'
        assert_eq!(password.expose(), "bbb");
    }

    #[rstest]
    fn debug_output_is_redacted() {
        let password = Password::from_plaintext("hunter2");
        assert_eq!(format!("{password:?}"), "Password(<redacted>)");
    }

    #[rstest]
    fn every_alphabet_position_is_reachable() {
        for byte in 0..ACCEPT_BELOW {
            assert!(alphabet_symbol(byte).is_some());
        }
        assert_eq!(alphabet_symbol(0), Some('a'));
        assert_eq!(alphabet_symbol(69), Some('*'));
        assert_eq!(alphabet_symbol(70), Some('a'));
    }
}
