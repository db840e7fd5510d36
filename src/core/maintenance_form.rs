use crate::core::services::MaintenanceService;
use crate::domain::model::{Bakim, Etiket};
use crate::domain::qr::QrSession;
use crate::utils::dates::{format_date_for_api, parse_api_date};
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::validate_non_empty_string;

/// Raw maintenance form input, as typed by the technician.
#[derive(Debug, Clone, Default)]
pub struct BakimFormu {
    pub tarih: String,
    pub teknisyen: Option<String>,
    pub aciklama: String,
    pub etiket: Option<String>,
    pub tutar: String,
    pub odendi: bool,
}

/// Accepts `1500`, `1500.5` and the Turkish `1500,5`; empty means zero.
fn parse_amount(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    let normalized = if raw.contains(',') && !raw.contains('.') {
        raw.replace(',', ".")
    } else {
        raw.replace(',', "")
    };

    let amount: f64 = normalized
        .parse()
        .map_err(|_| ClientError::validation("tutar", format!("'{}' is not a number", raw)))?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ClientError::validation("tutar", "Amount must be zero or positive"));
    }
    Ok(amount)
}

impl BakimFormu {
    pub fn to_bakim(&self, asansor_id: i64) -> Result<Bakim> {
        let tarih = format_date_for_api(&self.tarih)
            .ok()
            .and_then(|api| parse_api_date(&api))
            .ok_or_else(|| {
                ClientError::validation("tarih", format!("Invalid date '{}'", self.tarih.trim()))
            })?;
        validate_non_empty_string("aciklama", &self.aciklama)?;

        let etiket = match self.etiket.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(Etiket::parse(raw).ok_or_else(|| {
                ClientError::validation("etiket", format!("Unknown label '{}'", raw))
            })?),
            None => None,
        };

        Ok(Bakim {
            id: None,
            asansor_id,
            tarih,
            teknisyen: self
                .teknisyen
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            aciklama: self.aciklama.trim().to_string(),
            etiket,
            tutar: parse_amount(&self.tutar)?,
            odendi: self.odendi,
        })
    }

    /// Validate and submit against the elevator the session was issued for.
    pub async fn submit(&self, service: &MaintenanceService, session: &QrSession) -> Result<Bakim> {
        let bakim = self.to_bakim(session.elevator_id)?;
        service.create_with_session(&bakim, session).await
    }
}
