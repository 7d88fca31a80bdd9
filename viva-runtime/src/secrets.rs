use anyhow::Context;

/// Where we store secrets in the OS keyring.
///
/// This is intentionally constant so upgrades don't orphan secrets.
const SERVICE: &str = "viva";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretKey {
    /// Backend token sent verbatim in the `Authorization` header.
    ApiToken,
    ElevenLabsApiKey,
}

impl SecretKey {
    fn user(self) -> &'static str {
        match self {
            SecretKey::ApiToken => "api_token",
            SecretKey::ElevenLabsApiKey => "elevenlabs_api_key",
        }
    }
}

pub fn set_secret(key: SecretKey, value: &str) -> anyhow::Result<()> {
    let entry = keyring::Entry::new(SERVICE, key.user()).context("create keyring entry")?;
    entry.set_password(value).context("set secret")
}

pub fn get_secret(key: SecretKey) -> anyhow::Result<Option<String>> {
    let entry = keyring::Entry::new(SERVICE, key.user()).context("create keyring entry")?;

    match entry.get_password() {
        Ok(v) => Ok(Some(v)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(anyhow::Error::new(e)).context("get secret"),
    }
}

pub fn delete_secret(key: SecretKey) -> anyhow::Result<()> {
    let entry = keyring::Entry::new(SERVICE, key.user()).context("create keyring entry")?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(anyhow::Error::new(e)).context("delete secret"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_stable_users() {
        // We don't want to touch the developer's real keyring state in
        // tests. This only validates the mapping logic.
        assert_eq!(SecretKey::ApiToken.user(), "api_token");
        assert_eq!(SecretKey::ElevenLabsApiKey.user(), "elevenlabs_api_key");
    }
}
