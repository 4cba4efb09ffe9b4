//! Configuration and settings persistence
//!
//! The clock configuration comes from a TOML override in flash, falling
//! back to the `clock.toml` embedded at build time. User settings are a
//! postcard blob; flash trouble leaves the clock on the in-RAM copy.

use core::str;

use defmt::*;

use horologe_core::config::{parse_config, ClockConfig, ParseError};
use horologe_drivers::store::{MirroredStore, StoreError, MAX_BLOB_SIZE};
use horologe_hal_rp2040::flash::{FlashError, Rp2040FlashStorage, StorageKey, MAX_ITEM_SIZE};
use horologe_hal_rp2040::FlashStorageTrait;

/// Compiled-in configuration; edit clock.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../clock.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum ConfigError {
    Flash(FlashError),
    /// TOML override is not UTF-8
    InvalidUtf8,
    Parse(ParseError),
    Settings(StoreError),
}

impl From<FlashError> for ConfigError {
    fn from(e: FlashError) -> Self {
        ConfigError::Flash(e)
    }
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<StoreError> for ConfigError {
    fn from(e: StoreError) -> Self {
        ConfigError::Settings(e)
    }
}

/// Clock configuration: flash override, else embedded, else stock defaults
pub async fn load_config(storage: &mut Rp2040FlashStorage<'_>) -> ClockConfig {
    match load_override(storage).await {
        Ok(config) => {
            info!("Loaded configuration override from flash");
            config
        }
        Err(ConfigError::Flash(FlashError::NotFound)) => {
            debug!("No configuration override in flash");
            embedded_config()
        }
        Err(e) => {
            warn!("Ignoring configuration override: {:?}", e);
            embedded_config()
        }
    }
}

async fn load_override(storage: &mut Rp2040FlashStorage<'_>) -> Result<ClockConfig, ConfigError> {
    let mut buffer = [0u8; MAX_ITEM_SIZE];
    let len = storage
        .read(StorageKey::ClockConfigToml, &mut buffer)
        .await?;
    debug!("Read {} bytes of TOML from flash", len);

    let text = str::from_utf8(&buffer[..len]).map_err(|_| ConfigError::InvalidUtf8)?;
    Ok(parse_config(text)?)
}

fn embedded_config() -> ClockConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            // build.rs validates the file, so this means the two disagree
            warn!("Embedded clock.toml rejected: {:?}, using stock defaults", e);
            ClockConfig::default()
        }
    }
}

/// User settings from flash, or factory values
pub async fn load_settings(storage: &mut Rp2040FlashStorage<'_>) -> MirroredStore {
    let mut buffer = [0u8; MAX_BLOB_SIZE];
    let result = match storage.read(StorageKey::Settings, &mut buffer).await {
        Ok(len) => MirroredStore::load(&buffer[..len]).map_err(ConfigError::from),
        Err(e) => Err(ConfigError::from(e)),
    };
    match result {
        Ok(store) => {
            info!("Loaded settings from flash");
            store
        }
        Err(ConfigError::Flash(FlashError::NotFound)) => {
            info!("No settings in flash, using factory values");
            MirroredStore::new()
        }
        Err(e) => {
            warn!("Failed to load settings: {:?}, using factory values", e);
            MirroredStore::new()
        }
    }
}

/// Write the settings table to flash
pub async fn save_settings(
    storage: &mut Rp2040FlashStorage<'_>,
    store: &MirroredStore,
) -> Result<(), ConfigError> {
    let mut buffer = [0u8; MAX_BLOB_SIZE];
    let blob = store.to_blob(&mut buffer)?;
    storage.write(StorageKey::Settings, blob).await?;
    debug!("Saved {} bytes of settings", blob.len());
    Ok(())
}
