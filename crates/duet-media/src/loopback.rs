//! In-process media provider.
//!
//! Mints room ids and random tokens without any SFU behind them. Used when
//! `media.provider = "loopback"` for local development, and by tests that
//! need a provider which can be told to fail.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use rand::RngCore;
use tracing::debug;

use crate::{Credential, MediaError, MediaProvider, RoomId};

pub struct LoopbackMediaProvider {
    prefix: String,
    rooms: Mutex<HashSet<RoomId>>,
    fail_allocation: AtomicBool,
    fail_credentials: AtomicBool,
}

impl LoopbackMediaProvider {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            rooms: Mutex::new(HashSet::new()),
            fail_allocation: AtomicBool::new(false),
            fail_credentials: AtomicBool::new(false),
        }
    }

    /// Make every following `allocate_room` fail.
    pub fn set_fail_allocation(&self, fail: bool) {
        self.fail_allocation.store(fail, Ordering::SeqCst);
    }

    /// Make every following `issue_credential` fail.
    pub fn set_fail_credentials(&self, fail: bool) {
        self.fail_credentials.store(fail, Ordering::SeqCst);
    }

    pub fn room_count(&self) -> usize {
        self.rooms.lock().map(|rooms| rooms.len()).unwrap_or(0)
    }
}

fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[async_trait]
impl MediaProvider for LoopbackMediaProvider {
    async fn allocate_room(&self) -> Result<RoomId, MediaError> {
        if self.fail_allocation.load(Ordering::SeqCst) {
            return Err(MediaError::Allocation("loopback allocation disabled".into()));
        }
        let room = RoomId::new(format!("{}-{}", self.prefix, uuid::Uuid::new_v4().simple()));
        let mut rooms = self
            .rooms
            .lock()
            .map_err(|_| MediaError::Allocation("room table poisoned".into()))?;
        // Allocation is create-or-fetch, so a repeated name is not an error.
        rooms.insert(room.clone());
        debug!(room = %room, "loopback room allocated");
        Ok(room)
    }

    async fn issue_credential(&self, room: &RoomId) -> Result<Credential, MediaError> {
        if self.fail_credentials.load(Ordering::SeqCst) {
            return Err(MediaError::Credential("loopback credentials disabled".into()));
        }
        let known = self
            .rooms
            .lock()
            .map_err(|_| MediaError::Credential("room table poisoned".into()))?
            .contains(room);
        if !known {
            return Err(MediaError::Credential(format!("unknown room {room}")));
        }
        Ok(Credential::new(random_token()))
    }
}
