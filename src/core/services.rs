use crate::core::api_client::ApiClient;
use crate::domain::model::{
    Ariza, ArizaDurumu, Asansor, Bakim, BakimTalebi, BakimYurutme, Denetim, Odeme, Parca, Teklif,
    TeklifDurumu,
};
use crate::domain::ports::TokenPair;
use crate::domain::qr::QrSession;
use crate::domain::token::{decode_claims, TokenClaims};
use crate::utils::dates::format_date_for_api;
use crate::utils::error::{ClientError, Result};
use crate::utils::table::Tabular;
use crate::utils::validation::validate_non_empty_string;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::marker::PhantomData;

/// A backend collection with the usual CRUD endpoints.
pub trait Resource: Send + Sync + 'static {
    const PATH: &'static str;
    const NAME: &'static str;
    type Model: Serialize + DeserializeOwned + Tabular + Send + Sync;
}

macro_rules! resource {
    ($marker:ident, $path:literal, $name:literal, $model:ty) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $marker;

        impl Resource for $marker {
            const PATH: &'static str = $path;
            const NAME: &'static str = $name;
            type Model = $model;
        }
    };
}

resource!(Elevators, "/elevators", "elevator", Asansor);
resource!(Maintenances, "/maintenances", "maintenance", Bakim);
resource!(Inspections, "/inspections", "inspection", Denetim);
resource!(Faults, "/faults", "fault", Ariza);
resource!(Parts, "/parts", "part", Parca);
resource!(Payments, "/payments", "payment", Odeme);
resource!(Offers, "/offers", "offer", Teklif);

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub elevator_id: Option<i64>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ListFilter {
    pub fn for_elevator(elevator_id: i64) -> Self {
        Self {
            elevator_id: Some(elevator_id),
            ..Self::default()
        }
    }

    pub fn to_query(&self) -> Result<Vec<(String, String)>> {
        let mut query = Vec::new();
        if let Some(id) = self.elevator_id {
            query.push(("elevatorId".to_string(), id.to_string()));
        }
        if let Some(start) = &self.start_date {
            query.push(("startDate".to_string(), format_date_for_api(start)?));
        }
        if let Some(end) = &self.end_date {
            query.push(("endDate".to_string(), format_date_for_api(end)?));
        }
        if let Some(status) = self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            query.push(("status".to_string(), status.trim().to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.trim().is_empty()) {
            query.push(("search".to_string(), search.trim().to_string()));
        }
        Ok(query)
    }
}

pub struct CrudService<R: Resource> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for CrudService<R> {
    fn clone(&self) -> Self {
        Self::new(self.client.clone())
    }
}

impl<R: Resource> CrudService<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    fn item_path(id: i64) -> String {
        format!("{}/{}", R::PATH, id)
    }

    pub async fn list(&self, filter: &ListFilter) -> Result<Vec<R::Model>> {
        let records: Vec<R::Model> = self.client.get_list(R::PATH, &filter.to_query()?).await?;
        tracing::debug!("Fetched {} {} record(s)", records.len(), R::NAME);
        Ok(records)
    }

    pub async fn get(&self, id: i64) -> Result<R::Model> {
        self.client.get(&Self::item_path(id)).await
    }

    pub async fn create(&self, model: &R::Model) -> Result<R::Model> {
        let created = self.client.post(R::PATH, model).await?;
        tracing::info!("✅ {} created", R::NAME);
        Ok(created)
    }

    pub async fn update(&self, id: i64, model: &R::Model) -> Result<R::Model> {
        let updated = self.client.put(&Self::item_path(id), model).await?;
        tracing::info!("✅ {} {} updated", R::NAME, id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client.delete(&Self::item_path(id)).await?;
        tracing::info!("🗑️  {} {} deleted", R::NAME, id);
        Ok(())
    }
}

#[derive(Clone)]
pub struct AuthService {
    client: ApiClient,
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// `POST /auth/login`, stores the returned token pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<TokenClaims>> {
        validate_non_empty_string("username", username)?;
        validate_non_empty_string("password", password)?;

        let tokens: TokenPair = self
            .client
            .post_public(
                "/auth/login",
                &json!({ "username": username.trim(), "password": password }),
            )
            .await?;
        self.client.tokens().save(&tokens)?;

        match decode_claims(&tokens.access_token) {
            Ok(claims) => Ok(Some(claims)),
            Err(e) => {
                tracing::warn!("Logged in but the access token is not decodable: {}", e);
                Ok(None)
            }
        }
    }

    pub fn logout(&self) -> Result<()> {
        self.client.tokens().clear()
    }

    /// Claims of the stored access token, `None` when logged out.
    pub fn current_claims(&self) -> Result<Option<(String, TokenClaims)>> {
        match self.client.tokens().access_token()? {
            Some(token) => {
                let claims = decode_claims(&token)?;
                Ok(Some((token, claims)))
            }
            None => Ok(None),
        }
    }
}

fn ensure_session_usable(session: &QrSession, elevator_id: i64) -> Result<()> {
    if session.elevator_id != elevator_id {
        return Err(ClientError::ElevatorMismatch {
            expected: elevator_id,
            actual: session.elevator_id,
        });
    }
    if session.is_expired(Utc::now()) {
        return Err(ClientError::QrSessionExpired);
    }
    Ok(())
}

#[derive(Clone)]
pub struct MaintenanceService {
    client: ApiClient,
}

impl MaintenanceService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a maintenance record authorised by a QR session.
    pub async fn create_with_session(&self, bakim: &Bakim, session: &QrSession) -> Result<Bakim> {
        ensure_session_usable(session, bakim.asansor_id)?;

        let talep = BakimTalebi {
            bakim,
            qr_oturum_anahtari: &session.token,
        };
        let created: Bakim = self.client.post(Maintenances::PATH, &talep).await?;
        tracing::info!(
            "✅ Maintenance recorded for elevator {} ({})",
            bakim.asansor_id,
            session.origin
        );
        Ok(created)
    }
}

/// Status transitions for faults and offers.
#[derive(Clone)]
pub struct StatusService {
    client: ApiClient,
}

impl StatusService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn update_fault_status(&self, id: i64, status: ArizaDurumu) -> Result<Ariza> {
        self.client
            .patch(&format!("{}/{}/status", Faults::PATH, id), &json!({ "status": status }))
            .await
    }

    pub async fn update_offer_status(&self, id: i64, status: TeklifDurumu) -> Result<Teklif> {
        self.client
            .patch(&format!("{}/{}/status", Offers::PATH, id), &json!({ "status": status }))
            .await
    }
}

#[derive(Clone)]
pub struct ExecutionService {
    client: ApiClient,
}

impl ExecutionService {
    const PATH: &'static str = "/maintenance-executions";

    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, elevator_id: Option<i64>) -> Result<Vec<BakimYurutme>> {
        let filter = elevator_id
            .map(ListFilter::for_elevator)
            .unwrap_or_default();
        self.client.get_list(Self::PATH, &filter.to_query()?).await
    }

    /// Open a visit on `elevator_id`; the session must have been issued for it.
    pub async fn start(&self, elevator_id: i64, session: &QrSession) -> Result<BakimYurutme> {
        ensure_session_usable(session, elevator_id)?;
        self.client
            .post(
                &format!("{}/start", Self::PATH),
                &json!({
                    "elevatorId": session.elevator_id,
                    "qrSessionToken": session.token,
                }),
            )
            .await
    }

    pub async fn complete(&self, id: i64, notes: Option<&str>) -> Result<BakimYurutme> {
        self.client
            .post(
                &format!("{}/{}/complete", Self::PATH, id),
                &json!({ "notes": notes }),
            )
            .await
    }
}
