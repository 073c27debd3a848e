//! Profile files on disk.
//!
//! One directory holds `default_config.json` and any number of
//! `<app>_config.json` files. Writes go to a temporary file that is renamed
//! over the target, so a crash mid-save never leaves a truncated profile.
//!
//! The default profile is a full document. Application profiles carry only
//! the [`PROFILE_KEYS`] and are layered over the running config, so window,
//! layout and port settings always come from the default profile.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use openstereo_errors::ProfileError;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::config::StereoConfig;
use crate::document::{
    PROFILE_KEYS, overlay_profile_keys, patch_keys, reorder_fill, to_document, to_profile_document,
};
use crate::{DEFAULT_PROFILE, PROFILE_FILE_SUFFIX};

/// Directory of profile documents.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Use `dir` for every profile. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Profile directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidName`] for empty names and names that
    /// would escape the directory.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, ProfileError> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', ':'])
            || name.contains('\0')
        {
            return Err(ProfileError::InvalidName(name.to_owned()));
        }
        Ok(self.dir.join(format!("{name}{PROFILE_FILE_SUFFIX}")))
    }

    /// Whether a profile file exists for `name`.
    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_ok_and(|path| path.is_file())
    }

    /// Read and sanitize a profile.
    ///
    /// Fields absent from the document take their default value.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::NotFound`] if there is no file for `name`
    /// - [`ProfileError::InvalidFormat`] for bad JSON or a field of the wrong type
    /// - [`ProfileError::LoadFailed`] for other I/O failures
    pub fn load_profile(&self, name: &str) -> Result<StereoConfig, ProfileError> {
        let (path, text) = self.read(name)?;
        let mut config: StereoConfig = serde_json::from_str(&text)
            .map_err(|e| ProfileError::invalid_format(path.display().to_string(), e.to_string()))?;
        config.sanitize_and_log(name);
        debug!(profile = name, path = %path.display(), "Loaded profile");
        Ok(config)
    }

    /// The default profile, or the compiled-in defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Same as [`load_profile`](Self::load_profile), minus `NotFound`.
    pub fn load_default_profile(&self) -> Result<StereoConfig, ProfileError> {
        match self.load_profile(DEFAULT_PROFILE) {
            Err(ProfileError::NotFound(_)) => Ok(StereoConfig::default()),
            other => other,
        }
    }

    /// Layer the profile keys of `name` over `current`.
    ///
    /// The default profile's profile keys go on first, then those of `name`
    /// when it is an application profile. Every other field keeps its value
    /// from `current`. Without a default profile the compiled-in defaults
    /// stand in for it.
    ///
    /// # Errors
    ///
    /// - [`ProfileError::NotFound`] if `name` is an application without a
    ///   profile
    /// - [`ProfileError::InvalidFormat`] if either document is not JSON, not
    ///   an object, or has a profile key of the wrong type
    /// - [`ProfileError::LoadFailed`] for other I/O failures
    pub fn load_layered(
        &self,
        name: &str,
        current: &StereoConfig,
    ) -> Result<StereoConfig, ProfileError> {
        let mut config = match self.overlay(DEFAULT_PROFILE, current) {
            Err(ProfileError::NotFound(_)) => {
                let defaults = serde_json::to_value(StereoConfig::default())
                    .map_err(|e| ProfileError::invalid_format(DEFAULT_PROFILE, e.to_string()))?;
                overlay_profile_keys(current, &defaults)
                    .map_err(|e| ProfileError::invalid_format(DEFAULT_PROFILE, e.to_string()))?
            }
            other => other?,
        };
        if name != DEFAULT_PROFILE {
            config = self.overlay(name, &config)?;
        }
        config.sanitize_and_log(name);
        debug!(profile = name, "Layered profile");
        Ok(config)
    }

    /// Write the profile keys of `config`, nothing else.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SaveFailed`] if the document cannot be written.
    pub fn save_profile_keys(&self, name: &str, config: &StereoConfig) -> Result<(), ProfileError> {
        let path = self.path_for(name)?;
        let text = to_profile_document(config)
            .map_err(|e| ProfileError::save_failed(name, e.to_string()))?;
        write_atomic(&path, &text).map_err(|e| ProfileError::save_failed(name, e.to_string()))?;
        info!(profile = name, path = %path.display(), keys = PROFILE_KEYS.len(), "Saved profile");
        Ok(())
    }

    fn read(&self, name: &str) -> Result<(PathBuf, String), ProfileError> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok((path, text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ProfileError::not_found(name)),
            Err(e) => Err(ProfileError::load_failed(path.display().to_string(), e.to_string())),
        }
    }

    fn overlay(&self, name: &str, base: &StereoConfig) -> Result<StereoConfig, ProfileError> {
        let (path, text) = self.read(name)?;
        let invalid = |e: serde_json::Error| {
            ProfileError::invalid_format(path.display().to_string(), e.to_string())
        };
        let document: Value = serde_json::from_str(&text).map_err(invalid)?;
        overlay_profile_keys(base, &document).map_err(invalid)
    }

    /// Write a complete profile snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SaveFailed`] if the document cannot be written.
    pub fn save_profile(&self, name: &str, config: &StereoConfig) -> Result<(), ProfileError> {
        let path = self.path_for(name)?;
        let text = to_document(config).map_err(|e| ProfileError::save_failed(name, e.to_string()))?;
        write_atomic(&path, &text).map_err(|e| ProfileError::save_failed(name, e.to_string()))?;
        info!(profile = name, path = %path.display(), "Saved profile");
        Ok(())
    }

    /// Create `default_config.json` if missing, otherwise rewrite it in
    /// canonical order with missing keys back-filled and unknown keys removed.
    ///
    /// An unparsable default file is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SaveFailed`] if the file cannot be written and
    /// [`ProfileError::InvalidFormat`] if the existing file is not JSON.
    pub fn ensure_default_profile(&self) -> Result<(), ProfileError> {
        let path = self.path_for(DEFAULT_PROFILE)?;
        let existing = match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(ProfileError::load_failed(path.display().to_string(), e.to_string())),
        };

        let config = match existing {
            None => {
                info!(path = %path.display(), "Writing default profile");
                StereoConfig::default()
            }
            Some(text) => {
                let value: Value = serde_json::from_str(&text).map_err(|e| {
                    ProfileError::invalid_format(path.display().to_string(), e.to_string())
                })?;
                debug!(path = %path.display(), "Default profile exists, back-filling keys");
                reorder_fill(&value)
            }
        };
        self.save_profile(DEFAULT_PROFILE, &config)
    }

    /// Store the pose offsets in the default profile, leaving its other keys
    /// as they are.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidFormat`] if the default profile exists
    /// but is not JSON, or [`ProfileError::SaveFailed`] if writing fails.
    pub fn save_hmd_offsets(&self, config: &StereoConfig) -> Result<(), ProfileError> {
        let path = self.path_for(DEFAULT_PROFILE)?;
        let mut document = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text).map_err(|e| {
                ProfileError::invalid_format(path.display().to_string(), e.to_string())
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                serde_json::to_value(StereoConfig::default())
                    .map_err(|e| ProfileError::save_failed(DEFAULT_PROFILE, e.to_string()))?
            }
            Err(e) => return Err(ProfileError::load_failed(path.display().to_string(), e.to_string())),
        };

        patch_keys(
            &mut document,
            [
                ("hmd_x", json!(config.hmd_x)),
                ("hmd_y", json!(config.hmd_y)),
                ("hmd_yaw", json!(config.hmd_yaw)),
                ("hmd_height", json!(config.hmd_height)),
            ],
        );

        let text = serde_json::to_string_pretty(&document)
            .map_err(|e| ProfileError::save_failed(DEFAULT_PROFILE, e.to_string()))?;
        write_atomic(&path, &text)
            .map_err(|e| ProfileError::save_failed(DEFAULT_PROFILE, e.to_string()))?;
        info!(
            hmd_x = config.hmd_x,
            hmd_y = config.hmd_y,
            hmd_yaw = config.hmd_yaw,
            hmd_height = config.hmd_height,
            "Saved HMD offsets to default profile"
        );
        Ok(())
    }
}

/// Write `content` to a sibling temp file, then rename it over `path`.
fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content)?;
    if let Err(e) = fs::rename(&temp_path, path) {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp profile");
        }
        return Err(e);
    }
    Ok(())
}
