//! # Profile Registry
//!
//! In-memory store of named [`Profile`]s plus the "current" selection.
//!
//! ## Concurrency
//! The registry sits behind a single reader/writer lock. Reads (`current`,
//! `list`, `message_name`, ...) take the shared lock and return owned
//! snapshots, so a parse that started before a mutation keeps a consistent
//! view and never observes a half-applied change. Every mutation holds the
//! exclusive lock only for the in-memory update itself; JSON parsing and
//! file I/O for message-name import/export run outside it.
//!
//! ## Deleting the current profile
//! When the selected profile is deleted the selection falls back to *some*
//! remaining profile, picked in hash-map iteration order. That choice is
//! unspecified and may differ between runs; callers that care must call
//! [`ProfileRegistry::select`] explicitly afterwards.

use super::Profile;
use crate::error::{constants, AnalyzerError, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default)]
struct RegistryState {
    profiles: HashMap<String, Profile>,
    current: Option<String>,
}

impl RegistryState {
    fn current_mut(&mut self) -> Result<&mut Profile> {
        let name = self
            .current
            .as_ref()
            .ok_or(AnalyzerError::NoProfileSelected)?;
        self.profiles
            .get_mut(name)
            .ok_or(AnalyzerError::NoProfileSelected)
    }
}

/// Thread-safe registry of decryption profiles.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    state: RwLock<RegistryState>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from profiles and select `current` if given.
    pub fn with_profiles(
        profiles: impl IntoIterator<Item = Profile>,
        current: Option<&str>,
    ) -> Result<Self> {
        let registry = Self::new();
        for profile in profiles {
            registry.register(profile)?;
        }
        if let Some(name) = current {
            registry.select(name)?;
        }
        Ok(registry)
    }

    /// Insert or replace a profile by name. Never changes the selection.
    #[instrument(skip(self, profile), fields(name = %profile.name))]
    pub fn register(&self, profile: Profile) -> Result<()> {
        profile.validate()?;
        let mut state = self.state.write();
        let replaced = state.profiles.insert(profile.name.clone(), profile).is_some();
        info!(replaced, "Profile registered");
        Ok(())
    }

    /// Make `name` the current profile.
    pub fn select(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();
        if !state.profiles.contains_key(name) {
            return Err(AnalyzerError::ProfileNotFound(name.to_string()));
        }
        state.current = Some(name.to_string());
        debug!(name, "Profile selected");
        Ok(())
    }

    /// Snapshot of the current profile, if one is selected.
    pub fn current(&self) -> Option<Profile> {
        let state = self.state.read();
        state
            .current
            .as_ref()
            .and_then(|name| state.profiles.get(name))
            .cloned()
    }

    /// Like [`current`](Self::current) but failing with `NoProfileSelected`.
    pub fn require_current(&self) -> Result<Profile> {
        self.current().ok_or(AnalyzerError::NoProfileSelected)
    }

    pub fn current_name(&self) -> Option<String> {
        self.state.read().current.clone()
    }

    /// Snapshot of a single profile by name.
    pub fn get(&self, name: &str) -> Option<Profile> {
        self.state.read().profiles.get(name).cloned()
    }

    /// Snapshot of every profile, in no particular order.
    pub fn list(&self) -> Vec<Profile> {
        self.state.read().profiles.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove a profile. Deleting the current profile moves the selection to
    /// an arbitrary remaining profile, or clears it if none remain.
    #[instrument(skip(self))]
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut state = self.state.write();
        if state.profiles.remove(name).is_none() {
            return Err(AnalyzerError::ProfileNotFound(name.to_string()));
        }
        if state.current.as_deref() == Some(name) {
            state.current = state.profiles.keys().next().cloned();
            info!(new_current = ?state.current, "Current profile deleted, selection moved");
        }
        Ok(())
    }

    /// Upsert a message name on the current profile.
    pub fn set_message_name(&self, id: u32, name: impl Into<String>) -> Result<()> {
        let mut state = self.state.write();
        state.current_mut()?.message_names.insert(id, name.into());
        Ok(())
    }

    /// Mapped name for `id` on the current profile. `None` when unmapped or
    /// when no profile is selected.
    pub fn message_name(&self, id: u32) -> Option<String> {
        let state = self.state.read();
        let current = state.current.as_ref()?;
        state.profiles.get(current)?.message_names.get(&id).cloned()
    }

    /// Merge message names from a flat JSON object (`{"30000": "heartbeat"}`)
    /// into the current profile.
    ///
    /// Keys that do not parse as a message id are skipped without error.
    /// The target is the profile selected when the call starts; if it is
    /// deleted before the names are written the call fails with
    /// `ProfileNotFound`. Returns the number of entries written.
    pub fn import_message_names<R: Read>(&self, reader: R) -> Result<usize> {
        let Some(target) = self.current_name() else {
            warn!("{}", constants::ERR_NO_PROFILE_SELECTED);
            return Err(AnalyzerError::NoProfileSelected);
        };

        let raw: HashMap<String, String> = serde_json::from_reader(reader)?;
        let parsed: Vec<(u32, String)> = raw
            .into_iter()
            .filter_map(|(key, name)| match key.trim().parse::<u32>() {
                Ok(id) => Some((id, name)),
                Err(_) => {
                    debug!(key = %key, "Skipping non-numeric message id");
                    None
                }
            })
            .collect();

        let mut state = self.state.write();
        let profile = state
            .profiles
            .get_mut(&target)
            .ok_or_else(|| AnalyzerError::ProfileNotFound(target.clone()))?;
        let imported = parsed.len();
        profile.message_names.extend(parsed);
        info!(imported, profile = %profile.name, "Message names imported");
        Ok(imported)
    }

    /// Write every message name of the current profile as a flat JSON object,
    /// ordered by id. Returns the number of entries written.
    pub fn export_message_names<W: Write>(&self, writer: W) -> Result<usize> {
        let names: BTreeMap<u32, String> = {
            let state = self.state.read();
            let current = state
                .current
                .as_ref()
                .ok_or(AnalyzerError::NoProfileSelected)?;
            state
                .profiles
                .get(current)
                .ok_or(AnalyzerError::NoProfileSelected)?
                .message_names
                .iter()
                .map(|(id, name)| (*id, name.clone()))
                .collect()
        };

        serde_json::to_writer_pretty(writer, &names)?;
        Ok(names.len())
    }

    pub fn import_message_names_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let file = File::open(path)?;
        self.import_message_names(BufReader::new(file))
    }

    pub fn export_message_names_file<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let mut writer = BufWriter::new(File::create(path)?);
        let written = self.export_message_names(&mut writer)?;
        writer.flush()?;
        Ok(written)
    }
}
