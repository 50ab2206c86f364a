use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::api::ApiClient;
use crate::models::{AttendanceRecord, Direction};
use crate::services::scan_processor::{self, ScanResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Ready to accept the next decoded frame
    Idle,
    /// One scan in flight; further frames are ignored
    Submitting,
    /// Result on screen; scanning paused until the operator dismisses it
    AwaitingOperatorAck,
}

#[derive(Debug)]
struct SessionInner {
    state: ScanState,
    direction: Direction,
    records: Vec<AttendanceRecord>,
    last_result: Option<ScanResult>,
}

/// A guard's long-lived scanning session.
///
/// Scans are strictly serialized: a decoded frame is only submitted from
/// `Idle`, so duplicate camera reads of one QR code while a submission is
/// in flight are dropped. Successful records are appended to a local list
/// for on-screen confirmation; the Backend API remains the system of record.
#[derive(Debug)]
pub struct ScanSession {
    id: Uuid,
    client: ApiClient,
    require_ack: bool,
    inner: Mutex<SessionInner>,
}

impl ScanSession {
    pub fn new(client: ApiClient, direction: Direction) -> Self {
        Self {
            id: Uuid::new_v4(),
            client,
            require_ack: false,
            inner: Mutex::new(SessionInner {
                state: ScanState::Idle,
                direction,
                records: Vec::new(),
                last_result: None,
            }),
        }
    }

    /// Pause after every result until [`acknowledge`](Self::acknowledge) is called
    pub fn with_operator_ack(mut self, require_ack: bool) -> Self {
        self.require_ack = require_ack;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ScanState {
        self.lock().state
    }

    pub fn direction(&self) -> Direction {
        self.lock().direction
    }

    /// Changes the sticky direction used by every following scan
    pub fn set_direction(&self, direction: Direction) {
        let mut inner = self.lock();
        if inner.direction != direction {
            tracing::info!(session_id = %self.id, direction = %direction, "Scan direction changed");
        }
        inner.direction = direction;
    }

    /// Records appended by successful scans in this session, oldest first
    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.lock().records.clone()
    }

    pub fn last_result(&self) -> Option<ScanResult> {
        self.lock().last_result.clone()
    }

    /// Handles one decoded QR frame.
    ///
    /// Returns `None` when the frame was ignored because the session is not
    /// `Idle`; otherwise the outcome of the submission.
    pub async fn on_decoded(&self, raw: &str) -> Option<ScanResult> {
        let direction = {
            let mut inner = self.lock();
            if inner.state != ScanState::Idle {
                tracing::debug!(session_id = %self.id, state = ?inner.state, "Ignoring decoded frame");
                return None;
            }
            inner.state = ScanState::Submitting;
            inner.direction
        };

        let gate = SubmitGate::new(self);

        let result = scan_processor::submit_scan(&self.client, raw, direction).await;

        {
            let mut inner = self.lock();
            if let Some(record) = result.record() {
                inner.records.push(record.clone());
            }
            inner.state = if self.require_ack {
                ScanState::AwaitingOperatorAck
            } else {
                ScanState::Idle
            };
            inner.last_result = Some(result.clone());
        }
        gate.release();

        tracing::info!(
            session_id = %self.id,
            outcome = result.result_type(),
            "Scan resolved"
        );

        Some(result)
    }

    /// Operator dismissed the result. Returns whether the session resumed.
    pub fn acknowledge(&self) -> bool {
        let mut inner = self.lock();
        if inner.state == ScanState::AwaitingOperatorAck {
            inner.state = ScanState::Idle;
            true
        } else {
            false
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Returns the session to `Idle` if a submission future is dropped mid-flight
struct SubmitGate<'a> {
    session: &'a ScanSession,
    released: bool,
}

impl<'a> SubmitGate<'a> {
    fn new(session: &'a ScanSession) -> Self {
        Self {
            session,
            released: false,
        }
    }

    fn release(mut self) {
        self.released = true;
    }
}

impl Drop for SubmitGate<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let mut inner = self.session.lock();
        if inner.state == ScanState::Submitting {
            tracing::warn!(session_id = %self.session.id, "Scan submission abandoned");
            inner.state = ScanState::Idle;
        }
    }
}
