//! Password padding applied before obfuscation.
//!
//! The server strips the same token after decoding, so both the token and the length
//! thresholds must stay byte-for-byte identical to the server's.

use secrecy::SecretString;

/// Maximum password length accepted by the server, in bytes.
pub const MAX_PASSWORD_LEN: usize = 50;

const PADDING_TOKEN: &str = "1gCBizHWbwIYyWLoysGzTe6SyzqFKMniZX05faZHWAwQKXf6Fs";

// Short passwords are padded up to this many bytes.
const PADDED_LEN: usize = MAX_PASSWORD_LEN - 10;

// Padding only applies when more than this many bytes would be added.
const MIN_PADDING: usize = 15;

/// Truncates and pads a new password the way the server expects.
///
/// The password is cut to [`MAX_PASSWORD_LEN`] bytes. Passwords shorter than 25 bytes are then
/// extended to 40 bytes with a prefix of the fixed padding token.
#[must_use]
pub fn pad_password(new_password: &str) -> SecretString {
    let mut padded = truncate(new_password, MAX_PASSWORD_LEN).to_string();

    if let Some(pad) = PADDED_LEN.checked_sub(new_password.len()) {
        if pad > MIN_PADDING {
            padded.push_str(&PADDING_TOKEN[..pad]);
        }
    }

    SecretString::from(padded)
}

fn truncate(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }

    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
