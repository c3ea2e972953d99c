use argon2::Config;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::db::user::NewUser;

pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// bcrypt-compatible upper bound; long passwords add nothing but hash time.
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Raw user credentials, received from a client. These are never stored
/// directly, since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

impl TryFrom<UserCredentials> for NewUser {
    type Error = Error;

    /// Convert [`UserCredentials`] to a [`NewUser`] by hashing the password.
    /// This enforces that the username is non-empty after trimming and within
    /// length limits, and that the password meets the length requirements.
    fn try_from(cred: UserCredentials) -> Result<Self, Self::Error> {
        let username = cred.username.trim().to_string();
        if username.is_empty() || username.len() > MAX_USERNAME_LENGTH {
            return Err(Error::bad_request(format!(
                "Username must be between 1 and {} characters",
                MAX_USERNAME_LENGTH
            )));
        }
        if cred.password.len() < MIN_PASSWORD_LENGTH || cred.password.len() > MAX_PASSWORD_LENGTH {
            return Err(Error::bad_request(format!(
                "Password must be between {} and {} characters",
                MIN_PASSWORD_LENGTH, MAX_PASSWORD_LENGTH
            )));
        }

        // 16 bytes is recommended for password hashing:
        //  https://en.wikipedia.org/wiki/Argon2
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(cred.password.as_bytes(), &salt, &Config::default()).unwrap(); // Safe because the default `Config` is valid.
        Ok(Self {
            username,
            password_hash,
        })
    }
}

#[cfg(test)]
mod examples {
    use super::*;

    impl UserCredentials {
        pub fn example1() -> Self {
            Self {
                username: "alice".into(),
                password: "correct horse".into(),
            }
        }

        pub fn example2() -> Self {
            Self {
                username: "bob".into(),
                password: "battery staple".into(),
            }
        }

        pub fn empty() -> Self {
            Self {
                username: "".into(),
                password: "".into(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_credentials_hash_to_a_verifiable_user() {
        let cred = UserCredentials::example1();
        let user = NewUser::try_from(cred.clone()).unwrap();
        assert_eq!(user.username, cred.username);
        assert!(user.verify_password(cred.password));
        assert!(!user.verify_password("wrong"));
    }

    #[test]
    fn username_is_trimmed() {
        let cred = UserCredentials {
            username: "  alice  ".into(),
            password: "correct horse".into(),
        };
        let user = NewUser::try_from(cred).unwrap();
        assert_eq!(user.username, "alice");
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(NewUser::try_from(UserCredentials::empty()).is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let cred = UserCredentials {
            username: "alice".into(),
            password: "hunter".into(),
        };
        assert!(NewUser::try_from(cred).is_ok());
        let cred = UserCredentials {
            username: "alice".into(),
            password: "hunt".into(),
        };
        assert!(NewUser::try_from(cred).is_err());
    }
}
