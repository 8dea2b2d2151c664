use crate::assembler::{ParseOptions, parse_with_options};
use crate::edit;
use crate::error::SaveError;
use crate::header::Variant;
use crate::record::{PlayerStatus, SaveRecord};

use super::error::{CoreError, CoreErrorCode};
use super::types::{Capabilities, Snapshot};

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine {
    options: ParseOptions,
}

/// An opened save. Edits apply to a working copy which is re-parsed after
/// every change, so `record()` always reflects `to_bytes_modified()`.
#[derive(Debug)]
pub struct Session {
    options: ParseOptions,
    original: Vec<u8>,
    current: Vec<u8>,
    record: SaveRecord,
    snapshot: Snapshot,
    capabilities: Capabilities,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        hint: Option<Variant>,
    ) -> Result<Session, CoreError> {
        let bytes = bytes.as_ref();

        if let Some(expected) = hint {
            let detected = Variant::detect(bytes).map_err(|e| parse_error(e, Some(expected)))?;
            if detected != expected {
                return Err(CoreError::new(
                    CoreErrorCode::VariantMismatch,
                    format!("expected a {expected} save, file header says {detected}"),
                ));
            }
        }

        let record = parse_with_options(bytes, self.options).map_err(|e| parse_error(e, hint))?;
        Ok(Session::new(self.options, bytes.to_vec(), record))
    }
}

impl Session {
    fn new(options: ParseOptions, bytes: Vec<u8>, record: SaveRecord) -> Self {
        let snapshot = Snapshot::from_record(&record);
        let capabilities = Capabilities::for_record(&record);
        Self {
            options,
            original: bytes.clone(),
            current: bytes,
            record,
            snapshot,
            capabilities,
        }
    }

    pub fn variant(&self) -> Variant {
        self.record.variant()
    }

    pub fn record(&self) -> &SaveRecord {
        &self.record
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Current buffer, including any applied edits.
    pub fn bytes(&self) -> &[u8] {
        &self.current
    }

    pub fn is_modified(&self) -> bool {
        self.original != self.current
    }

    pub fn to_bytes_unmodified(&self) -> Vec<u8> {
        self.original.clone()
    }

    pub fn to_bytes_modified(&self) -> Vec<u8> {
        self.current.clone()
    }

    pub fn set_player_status(
        &mut self,
        slot_index: usize,
        status: PlayerStatus,
    ) -> Result<(), CoreError> {
        let edited = edit::set_player_status(&self.current, slot_index, status)
            .map_err(|e| edit_error(e, format!("failed to set status of slot {slot_index}")))?;
        self.commit(edited)
    }

    pub fn set_active_player(&mut self, slot_index: usize) -> Result<(), CoreError> {
        let edited = edit::set_active_player(&self.current, slot_index)
            .map_err(|e| edit_error(e, format!("failed to make slot {slot_index} active")))?;
        self.commit(edited)
    }

    pub fn set_player_password(&mut self, slot_index: usize, password: &str) -> Result<(), CoreError> {
        let edited = edit::set_player_password(&self.current, slot_index, password)
            .map_err(|e| edit_error(e, format!("failed to set password of slot {slot_index}")))?;
        self.commit(edited)
    }

    pub fn set_player_display_name(&mut self, slot_index: usize, name: &str) -> Result<(), CoreError> {
        let edited = edit::set_player_display_name(&self.current, slot_index, name)
            .map_err(|e| edit_error(e, format!("failed to rename slot {slot_index}")))?;
        self.commit(edited)
    }

    fn commit(&mut self, edited: Vec<u8>) -> Result<(), CoreError> {
        let record = parse_with_options(&edited, self.options).map_err(|e| {
            CoreError::with_source(
                CoreErrorCode::InvalidEdit,
                format!("edited save no longer parses: {e}"),
                e,
            )
        })?;

        self.snapshot = Snapshot::from_record(&record);
        self.capabilities = Capabilities::for_record(&record);
        self.record = record;
        self.current = edited;
        Ok(())
    }
}

fn parse_error(e: SaveError, hint: Option<Variant>) -> CoreError {
    let message = match hint {
        Some(variant) => format!("failed to parse as {variant}: {e}"),
        None => format!("failed to parse input: {e}"),
    };
    CoreError::with_source(CoreErrorCode::Parse, message, e)
}

fn edit_error(e: SaveError, context: String) -> CoreError {
    CoreError::with_source(CoreErrorCode::InvalidEdit, format!("{context}: {e}"), e)
}
