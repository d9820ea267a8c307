// Smell-It — NVS-backed credential store

use anyhow::Result;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

use crate::config::*;
use crate::credentials::{CredentialStore, Credentials};

pub struct NvsCredentials {
    nvs: EspNvs<NvsDefault>,
}

impl NvsCredentials {
    pub fn open(partition: EspDefaultNvsPartition) -> Result<Self> {
        Ok(Self {
            nvs: EspNvs::new(partition, NVS_WIFI_NAMESPACE, true)?,
        })
    }

    fn get_str(&self, key: &str) -> Result<Option<String>> {
        let mut buf = [0u8; 65];
        Ok(self
            .nvs
            .get_str(key, &mut buf)?
            .map(|s| s.trim_end_matches('\0').to_string()))
    }
}

impl CredentialStore for NvsCredentials {
    fn read(&mut self) -> Result<Option<Credentials>> {
        let Some(ssid) = self.get_str(NVS_KEY_SSID)? else {
            return Ok(None);
        };
        let password = self.get_str(NVS_KEY_PASSWORD)?.unwrap_or_default();
        Credentials::new(&ssid, &password).map(Some)
    }

    fn write(&mut self, creds: &Credentials) -> Result<()> {
        self.nvs.set_str(NVS_KEY_SSID, &creds.ssid)?;
        self.nvs.set_str(NVS_KEY_PASSWORD, &creds.password)?;
        Ok(())
    }
}
