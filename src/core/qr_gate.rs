use crate::core::scanner::QrScanner;
use crate::domain::ports::{FrameSource, QrDecoder, SessionIssuer};
use crate::domain::qr::{QrSession, SessionOrigin};
use crate::domain::token::Role;
use crate::utils::error::{ClientError, Result};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Idle,
    Scanning,
    Validating,
    Ready(QrSession),
    Failed(String),
}

/// Gatekeeper in front of maintenance creation for one elevator: obtains a
/// QR session by scan, manual code entry, or (admins only) remote start.
pub struct QrGate<I: SessionIssuer> {
    issuer: I,
    elevator_id: i64,
    role: Option<Role>,
    state: GateState,
}

impl<I: SessionIssuer> QrGate<I> {
    pub fn new(issuer: I, elevator_id: i64, role: Option<Role>) -> Self {
        Self {
            issuer,
            elevator_id,
            role,
            state: GateState::Idle,
        }
    }

    pub fn elevator_id(&self) -> i64 {
        self.elevator_id
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn can_remote_start(&self) -> bool {
        self.role.as_ref().is_some_and(Role::is_admin)
    }

    pub fn session(&self) -> Option<&QrSession> {
        match &self.state {
            GateState::Ready(session) => Some(session),
            _ => None,
        }
    }

    /// Hand the session to the form; the gate goes back to idle.
    pub fn take_session(&mut self) -> Option<QrSession> {
        match std::mem::replace(&mut self.state, GateState::Idle) {
            GateState::Ready(session) => Some(session),
            other => {
                self.state = other;
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = GateState::Idle;
    }

    fn fail(&mut self, err: ClientError) -> ClientError {
        // 使用者關閉掃描視窗不算失敗
        self.state = match err {
            ClientError::ScanCancelled => GateState::Idle,
            ref e => GateState::Failed(e.user_friendly_message()),
        };
        err
    }

    fn settle(&mut self, outcome: Result<QrSession>) -> Result<QrSession> {
        match outcome {
            Ok(session) => {
                self.state = GateState::Ready(session.clone());
                Ok(session)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub async fn scan_and_validate<D, F>(
        &mut self,
        scanner: &QrScanner<D>,
        source: &mut F,
        cancel: &CancellationToken,
    ) -> Result<QrSession>
    where
        D: QrDecoder,
        F: FrameSource,
    {
        self.state = GateState::Scanning;
        let code = match scanner.scan(source, cancel).await {
            Ok(code) => code,
            Err(e) => return Err(self.fail(e)),
        };
        self.validate_code(&code, SessionOrigin::Scanned).await
    }

    pub async fn validate_manual(&mut self, code: &str) -> Result<QrSession> {
        self.validate_code(code, SessionOrigin::Manual).await
    }

    async fn validate_code(&mut self, code: &str, origin: SessionOrigin) -> Result<QrSession> {
        self.state = GateState::Validating;
        let outcome = self.issuer.validate(code, self.elevator_id, origin).await;
        self.settle(outcome)
    }

    pub async fn remote_start(&mut self) -> Result<QrSession> {
        if !self.can_remote_start() {
            return Err(self.fail(ClientError::Forbidden {
                message: "remote start is only available to PATRON users".to_string(),
            }));
        }
        self.state = GateState::Validating;
        let outcome = self
            .issuer
            .remote_start(self.elevator_id, self.role.as_ref())
            .await;
        self.settle(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeIssuer {
        calls: AtomicUsize,
        wrong_elevator: bool,
    }

    #[async_trait]
    impl SessionIssuer for FakeIssuer {
        async fn validate(
            &self,
            code: &str,
            elevator_id: i64,
            origin: SessionOrigin,
        ) -> Result<QrSession> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if code != "ASN-0007" {
                return Err(ClientError::ApiError {
                    status: 400,
                    message: "Geçersiz QR kodu".into(),
                });
            }
            if self.wrong_elevator {
                return Err(ClientError::ElevatorMismatch {
                    expected: elevator_id,
                    actual: elevator_id + 1,
                });
            }
            Ok(QrSession {
                token: format!("sess-{}", code),
                elevator_id,
                expires_at: None,
                origin,
            })
        }

        async fn remote_start(&self, elevator_id: i64, _role: Option<&Role>) -> Result<QrSession> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(QrSession {
                token: "remote".into(),
                elevator_id,
                expires_at: None,
                origin: SessionOrigin::RemoteStart,
            })
        }
    }

    #[tokio::test]
    async fn test_manual_code_reaches_ready() {
        let mut gate = QrGate::new(FakeIssuer::default(), 7, Some(Role::Personel));
        let session = gate.validate_manual("ASN-0007").await.unwrap();
        assert_eq!(session.origin, SessionOrigin::Manual);
        assert_eq!(gate.session().map(|s| s.token.as_str()), Some("sess-ASN-0007"));

        let taken = gate.take_session().unwrap();
        assert_eq!(taken.elevator_id, 7);
        assert_eq!(gate.state(), &GateState::Idle);
        assert!(gate.take_session().is_none());
    }

    #[tokio::test]
    async fn test_invalid_code_fails_with_message() {
        let mut gate = QrGate::new(FakeIssuer::default(), 7, None);
        assert!(gate.validate_manual("WRONG").await.is_err());
        assert_eq!(gate.state(), &GateState::Failed("Geçersiz QR kodu".into()));

        gate.reset();
        assert_eq!(gate.state(), &GateState::Idle);
    }

    #[tokio::test]
    async fn test_mismatch_leaves_no_session() {
        let issuer = FakeIssuer {
            wrong_elevator: true,
            ..FakeIssuer::default()
        };
        let mut gate = QrGate::new(issuer, 7, None);
        assert!(matches!(
            gate.validate_manual("ASN-0007").await,
            Err(ClientError::ElevatorMismatch { .. })
        ));
        assert!(gate.session().is_none());
    }

    #[tokio::test]
    async fn test_remote_start_requires_patron() {
        let mut gate = QrGate::new(FakeIssuer::default(), 3, Some(Role::Personel));
        assert!(!gate.can_remote_start());
        assert!(matches!(
            gate.remote_start().await,
            Err(ClientError::Forbidden { .. })
        ));
        assert_eq!(gate.issuer.calls.load(Ordering::SeqCst), 0);

        let mut gate = QrGate::new(FakeIssuer::default(), 3, Some(Role::Patron));
        assert!(gate.can_remote_start());
        let session = gate.remote_start().await.unwrap();
        assert_eq!(session.origin, SessionOrigin::RemoteStart);
        assert_eq!(gate.issuer.calls.load(Ordering::SeqCst), 1);
    }
}
