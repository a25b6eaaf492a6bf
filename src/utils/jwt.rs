use std::{collections::HashSet, env};

use jsonwebtoken::{
    decode, encode, errors::Error, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
    Validation,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Minimum acceptable size for the signing secret in bytes.
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
/// Minimum number of unique bytes expected in the signing secret, so trivially
/// guessable values are rejected.
const MIN_UNIQUE_JWT_BYTES: usize = 8;

/// Variables checked, in order, for the shared signing secret.
pub const SECRET_ENV_VARS: [&str; 2] = ["AUTH_SECRET", "NEXTAUTH_SECRET"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JwtSecretError {
    #[error("AUTH_SECRET (or NEXTAUTH_SECRET) must be set")]
    Missing,
    #[error("signing secret must be at least {required} bytes, but {actual} bytes were provided")]
    TooShort { actual: usize, required: usize },
    #[error(
        "signing secret must contain sufficient entropy (at least {required} unique bytes); only {actual} unique bytes found"
    )]
    LowEntropy { actual: usize, required: usize },
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn from_env() -> Result<Self, JwtSecretError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the first non-blank secret variable through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, JwtSecretError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = SECRET_ENV_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .ok_or(JwtSecretError::Missing)?;
        Self::from_secret(value)
    }

    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, JwtSecretError> {
        let bytes = secret.as_ref();
        validate_secret(bytes)?;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }

    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

fn validate_secret(secret: &[u8]) -> Result<(), JwtSecretError> {
    if secret.is_empty() {
        return Err(JwtSecretError::Missing);
    }

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(JwtSecretError::TooShort {
            actual: secret.len(),
            required: MIN_JWT_SECRET_LENGTH,
        });
    }

    let unique = secret.iter().copied().collect::<HashSet<_>>().len();
    if unique < MIN_UNIQUE_JWT_BYTES {
        return Err(JwtSecretError::LowEntropy {
            actual: unique,
            required: MIN_UNIQUE_JWT_BYTES,
        });
    }

    Ok(())
}

pub fn create_jwt<T: Serialize>(claims: &T, keys: &JwtKeys) -> Result<String, Error> {
    encode(&Header::new(Algorithm::HS256), claims, keys.encoding_key())
}

/// Checks the HS256 signature only. Expiry is left to the caller so it can
/// be compared against an injected clock and told apart from a bad signature.
pub fn decode_jwt<T: DeserializeOwned>(token: &str, keys: &JwtKeys) -> Result<TokenData<T>, Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::new();
    decode::<T>(token, keys.decoding_key(), &validation)
}
