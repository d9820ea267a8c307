// Smell-It — Access-point credentials
//
// Read once at boot, before any core task runs. First boot seeds the store
// with the factory defaults.

use anyhow::{anyhow, Result};

use crate::config::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub ssid: heapless::String<32>,
    pub password: heapless::String<64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApAuth {
    Open,
    Wpa2Personal,
}

impl Credentials {
    pub fn new(ssid: &str, password: &str) -> Result<Self> {
        Ok(Self {
            ssid: ssid
                .try_into()
                .map_err(|_| anyhow!("SSID too long ({} bytes)", ssid.len()))?,
            password: password
                .try_into()
                .map_err(|_| anyhow!("password too long ({} bytes)", password.len()))?,
        })
    }

    pub fn factory_default() -> Result<Self> {
        Self::new(DEFAULT_SSID, DEFAULT_PASSWORD)
    }

    /// WPA2 needs at least 8 characters; anything shorter runs an open AP.
    pub fn auth(&self) -> ApAuth {
        if self.password.len() >= WPA2_MIN_PASSWORD_LEN {
            ApAuth::Wpa2Personal
        } else {
            ApAuth::Open
        }
    }
}

/// Persistent key/value storage for the credentials (NVS on the device).
pub trait CredentialStore {
    fn read(&mut self) -> Result<Option<Credentials>>;
    fn write(&mut self, creds: &Credentials) -> Result<()>;
}

/// Stored credentials, writing the factory defaults first if none exist.
pub fn load_credentials<S: CredentialStore>(store: &mut S) -> Result<Credentials> {
    if let Some(creds) = store.read()? {
        log::info!("Loaded AP credentials for SSID {:?}", creds.ssid.as_str());
        return Ok(creds);
    }

    let defaults = Credentials::factory_default()?;
    store.write(&defaults)?;
    log::info!("Default WiFi credentials written to NVS");
    Ok(defaults)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        creds: Option<Credentials>,
        writes: usize,
    }

    impl CredentialStore for MemoryStore {
        fn read(&mut self) -> Result<Option<Credentials>> {
            Ok(self.creds.clone())
        }
        fn write(&mut self, creds: &Credentials) -> Result<()> {
            self.creds = Some(creds.clone());
            self.writes += 1;
            Ok(())
        }
    }

    #[test]
    fn first_boot_seeds_defaults() {
        let mut store = MemoryStore::default();
        let creds = load_credentials(&mut store).unwrap();
        assert_eq!(creds.ssid.as_str(), DEFAULT_SSID);
        assert_eq!(creds.password.as_str(), DEFAULT_PASSWORD);
        assert_eq!(store.writes, 1);

        // Second boot reads back without rewriting.
        load_credentials(&mut store).unwrap();
        assert_eq!(store.writes, 1);
    }

    #[test]
    fn stored_credentials_win_over_defaults() {
        let mut store = MemoryStore {
            creds: Some(Credentials::new("lab", "correct horse").unwrap()),
            writes: 0,
        };
        let creds = load_credentials(&mut store).unwrap();
        assert_eq!(creds.ssid.as_str(), "lab");
        assert_eq!(store.writes, 0);
    }

    #[test]
    fn short_password_means_open_network() {
        assert_eq!(Credentials::new("x", "1234567").unwrap().auth(), ApAuth::Open);
        assert_eq!(Credentials::new("x", "12345678").unwrap().auth(), ApAuth::Wpa2Personal);
        assert_eq!(Credentials::new("x", "").unwrap().auth(), ApAuth::Open);
    }

    #[test]
    fn oversized_ssid_is_rejected() {
        assert!(Credentials::new(&"s".repeat(33), "password").is_err());
    }
}
