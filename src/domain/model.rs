//! Frontend models (Turkish names) and their backend wire names.
//!
//! Every field carries a `serde(rename)` to the English camelCase name the
//! backend uses, so one struct serves as request body and response DTO.

use crate::domain::elevator_code::ElevatorCode;
use crate::utils::dates::{api_date, api_date_opt, format_date_for_display, format_optional_date};
use crate::utils::table::{Column, Tabular};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Inspection label colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Etiket {
    #[serde(alias = "yesil", alias = "green", alias = "YESIL")]
    Green,
    #[serde(alias = "mavi", alias = "blue", alias = "MAVI")]
    Blue,
    #[serde(alias = "sari", alias = "yellow", alias = "SARI")]
    Yellow,
    #[serde(alias = "kirmizi", alias = "red", alias = "KIRMIZI")]
    Red,
}

impl Etiket {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "green" | "yesil" | "yeşil" => Some(Etiket::Green),
            "blue" | "mavi" => Some(Etiket::Blue),
            "yellow" | "sari" | "sarı" => Some(Etiket::Yellow),
            "red" | "kirmizi" | "kırmızı" => Some(Etiket::Red),
            _ => None,
        }
    }
}

impl fmt::Display for Etiket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Etiket::Green => "Yeşil",
            Etiket::Blue => "Mavi",
            Etiket::Yellow => "Sarı",
            Etiket::Red => "Kırmızı",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArizaDurumu {
    Open,
    InProgress,
    Completed,
}

impl ArizaDurumu {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().replace('-', "_").as_str() {
            "open" | "acik" | "açık" => Some(ArizaDurumu::Open),
            "in_progress" | "islemde" | "işlemde" => Some(ArizaDurumu::InProgress),
            "completed" | "tamamlandi" | "tamamlandı" => Some(ArizaDurumu::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ArizaDurumu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArizaDurumu::Open => "Açık",
            ArizaDurumu::InProgress => "İşlemde",
            ArizaDurumu::Completed => "Tamamlandı",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TeklifDurumu {
    Pending,
    Accepted,
    Rejected,
}

impl TeklifDurumu {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "pending" | "beklemede" => Some(TeklifDurumu::Pending),
            "accepted" | "kabul" => Some(TeklifDurumu::Accepted),
            "rejected" | "red" | "ret" => Some(TeklifDurumu::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for TeklifDurumu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TeklifDurumu::Pending => "Beklemede",
            TeklifDurumu::Accepted => "Kabul",
            TeklifDurumu::Rejected => "Red",
        })
    }
}

fn opt<T: ToString>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_else(|| "-".to_string())
}

fn money(amount: f64) -> String {
    format!("{:.2} ₺", amount)
}

fn id_cell(id: Option<i64>) -> String {
    opt(id.as_ref())
}

/// Asansör
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asansor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "identityNumber")]
    pub kimlik_no: String,
    #[serde(rename = "buildingName")]
    pub bina_adi: String,
    #[serde(rename = "address", default)]
    pub adres: String,
    #[serde(rename = "blockName", default)]
    pub blok: String,
    #[serde(rename = "elevatorNumber", default)]
    pub numara: String,
    #[serde(rename = "floorCount", default, skip_serializing_if = "Option::is_none")]
    pub durak_sayisi: Option<u32>,
    #[serde(rename = "capacity", default, skip_serializing_if = "Option::is_none")]
    pub kapasite_kg: Option<u32>,
    #[serde(rename = "managerName", default, skip_serializing_if = "Option::is_none")]
    pub yonetici_adi: Option<String>,
    #[serde(rename = "managerPhone", default, skip_serializing_if = "Option::is_none")]
    pub yonetici_telefon: Option<String>,
    #[serde(rename = "labelType", default, skip_serializing_if = "Option::is_none")]
    pub etiket: Option<Etiket>,
    #[serde(
        rename = "labelDate",
        default,
        with = "api_date_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub etiket_tarihi: Option<NaiveDate>,
    #[serde(
        rename = "expiryDate",
        default,
        with = "api_date_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub etiket_bitis: Option<NaiveDate>,
}

impl Asansor {
    pub fn kod(&self) -> String {
        ElevatorCode::new(self.blok.clone(), self.numara.clone()).to_string()
    }
}

impl Tabular for Asansor {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", 0),
            Column::new("Kod", 0),
            Column::new("Kimlik No", 1),
            Column::new("Bina", 1),
            Column::new("Etiket", 2),
            Column::new("Etiket Bitiş", 2),
            Column::new("Yönetici", 3),
            Column::new("Telefon", 4),
            Column::new("Adres", 5),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.kod(),
            self.kimlik_no.clone(),
            self.bina_adi.clone(),
            opt(self.etiket.as_ref()),
            format_optional_date(self.etiket_bitis.as_ref()),
            opt(self.yonetici_adi.as_ref()),
            opt(self.yonetici_telefon.as_ref()),
            self.adres.clone(),
        ]
    }
}

/// Bakım
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bakim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "elevatorId")]
    pub asansor_id: i64,
    #[serde(rename = "date", with = "api_date")]
    pub tarih: NaiveDate,
    #[serde(rename = "technicianName", default, skip_serializing_if = "Option::is_none")]
    pub teknisyen: Option<String>,
    #[serde(rename = "description", default)]
    pub aciklama: String,
    #[serde(rename = "labelType", default, skip_serializing_if = "Option::is_none")]
    pub etiket: Option<Etiket>,
    #[serde(rename = "amount", default)]
    pub tutar: f64,
    #[serde(rename = "isPaid", default)]
    pub odendi: bool,
}

/// Creation request: the maintenance plus the QR session token that
/// authorises it server-side.
#[derive(Debug, Clone, Serialize)]
pub struct BakimTalebi<'a> {
    #[serde(flatten)]
    pub bakim: &'a Bakim,
    #[serde(rename = "qrSessionToken")]
    pub qr_oturum_anahtari: &'a str,
}

impl Tabular for Bakim {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", 0),
            Column::new("Asansör", 0),
            Column::new("Tarih", 0),
            Column::new("Tutar", 1),
            Column::new("Ödendi", 1),
            Column::new("Etiket", 2),
            Column::new("Teknisyen", 3),
            Column::new("Açıklama", 4),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.asansor_id.to_string(),
            format_date_for_display(&self.tarih),
            money(self.tutar),
            if self.odendi { "Evet" } else { "Hayır" }.to_string(),
            opt(self.etiket.as_ref()),
            opt(self.teknisyen.as_ref()),
            self.aciklama.clone(),
        ]
    }
}

/// Denetim (periodic inspection)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Denetim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "elevatorId")]
    pub asansor_id: i64,
    #[serde(rename = "inspectionDate", with = "api_date")]
    pub denetim_tarihi: NaiveDate,
    #[serde(rename = "inspectorName", default, skip_serializing_if = "Option::is_none")]
    pub denetci: Option<String>,
    #[serde(rename = "result", default, skip_serializing_if = "Option::is_none")]
    pub sonuc: Option<Etiket>,
    #[serde(rename = "notes", default, skip_serializing_if = "Option::is_none")]
    pub notlar: Option<String>,
}

impl Tabular for Denetim {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", 0),
            Column::new("Asansör", 0),
            Column::new("Tarih", 0),
            Column::new("Sonuç", 1),
            Column::new("Denetçi", 2),
            Column::new("Notlar", 3),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.asansor_id.to_string(),
            format_date_for_display(&self.denetim_tarihi),
            opt(self.sonuc.as_ref()),
            opt(self.denetci.as_ref()),
            opt(self.notlar.as_ref()),
        ]
    }
}

/// Arıza
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ariza {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "elevatorId")]
    pub asansor_id: i64,
    #[serde(rename = "reportedDate", with = "api_date")]
    pub bildirim_tarihi: NaiveDate,
    #[serde(rename = "reportedBy", default, skip_serializing_if = "Option::is_none")]
    pub bildiren: Option<String>,
    #[serde(rename = "description", default)]
    pub aciklama: String,
    #[serde(rename = "status")]
    pub durum: ArizaDurumu,
}

impl Tabular for Ariza {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", 0),
            Column::new("Asansör", 0),
            Column::new("Tarih", 1),
            Column::new("Durum", 0),
            Column::new("Bildiren", 3),
            Column::new("Açıklama", 2),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.asansor_id.to_string(),
            format_date_for_display(&self.bildirim_tarihi),
            self.durum.to_string(),
            opt(self.bildiren.as_ref()),
            self.aciklama.clone(),
        ]
    }
}

/// Parça (spare part)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parca {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "name")]
    pub ad: String,
    #[serde(rename = "stock", default)]
    pub stok: i64,
    #[serde(rename = "unitPrice", default)]
    pub birim_fiyat: f64,
}

impl Tabular for Parca {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", 0),
            Column::new("Ad", 0),
            Column::new("Stok", 1),
            Column::new("Birim Fiyat", 2),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.ad.clone(),
            self.stok.to_string(),
            money(self.birim_fiyat),
        ]
    }
}

/// Ödeme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Odeme {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "elevatorId", default, skip_serializing_if = "Option::is_none")]
    pub asansor_id: Option<i64>,
    #[serde(rename = "maintenanceId", default, skip_serializing_if = "Option::is_none")]
    pub bakim_id: Option<i64>,
    #[serde(rename = "amount")]
    pub tutar: f64,
    #[serde(rename = "paymentDate", with = "api_date")]
    pub odeme_tarihi: NaiveDate,
    #[serde(rename = "payerName", default, skip_serializing_if = "Option::is_none")]
    pub odeyen: Option<String>,
    #[serde(rename = "description", default, skip_serializing_if = "Option::is_none")]
    pub aciklama: Option<String>,
}

impl Tabular for Odeme {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", 0),
            Column::new("Tarih", 0),
            Column::new("Tutar", 0),
            Column::new("Asansör", 1),
            Column::new("Bakım", 2),
            Column::new("Ödeyen", 2),
            Column::new("Açıklama", 3),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            format_date_for_display(&self.odeme_tarihi),
            money(self.tutar),
            opt(self.asansor_id.as_ref()),
            opt(self.bakim_id.as_ref()),
            opt(self.odeyen.as_ref()),
            opt(self.aciklama.as_ref()),
        ]
    }
}

/// Teklif (repair/modernisation offer)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teklif {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(rename = "elevatorId")]
    pub asansor_id: i64,
    #[serde(rename = "date", with = "api_date")]
    pub tarih: NaiveDate,
    #[serde(rename = "amount")]
    pub tutar: f64,
    #[serde(rename = "description", default)]
    pub aciklama: String,
    #[serde(rename = "status")]
    pub durum: TeklifDurumu,
}

impl Tabular for Teklif {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", 0),
            Column::new("Asansör", 0),
            Column::new("Tarih", 1),
            Column::new("Tutar", 0),
            Column::new("Durum", 0),
            Column::new("Açıklama", 2),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            id_cell(self.id),
            self.asansor_id.to_string(),
            format_date_for_display(&self.tarih),
            money(self.tutar),
            self.durum.to_string(),
            self.aciklama.clone(),
        ]
    }
}

/// Bakım yürütme: an on-site maintenance visit opened with a QR session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakimYurutme {
    pub id: i64,
    #[serde(rename = "elevatorId")]
    pub asansor_id: i64,
    #[serde(rename = "startedAt", default, skip_serializing_if = "Option::is_none")]
    pub baslangic: Option<String>,
    #[serde(rename = "completedAt", default, skip_serializing_if = "Option::is_none")]
    pub bitis: Option<String>,
    #[serde(rename = "status", default)]
    pub durum: String,
    #[serde(rename = "technicianName", default, skip_serializing_if = "Option::is_none")]
    pub teknisyen: Option<String>,
    #[serde(rename = "notes", default, skip_serializing_if = "Option::is_none")]
    pub notlar: Option<String>,
}

impl Tabular for BakimYurutme {
    fn columns() -> Vec<Column> {
        vec![
            Column::new("Id", 0),
            Column::new("Asansör", 0),
            Column::new("Durum", 0),
            Column::new("Başlangıç", 1),
            Column::new("Bitiş", 2),
            Column::new("Teknisyen", 3),
            Column::new("Notlar", 4),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.asansor_id.to_string(),
            self.durum.clone(),
            opt(self.baslangic.as_ref()),
            opt(self.bitis.as_ref()),
            opt(self.teknisyen.as_ref()),
            opt(self.notlar.as_ref()),
        ]
    }
}
