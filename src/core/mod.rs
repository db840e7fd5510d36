pub mod api_client;
pub mod maintenance_form;
pub mod qr_gate;
pub mod qr_session;
pub mod scanner;
pub mod services;

pub use crate::domain::model::{
    Ariza, ArizaDurumu, Asansor, Bakim, BakimYurutme, Denetim, Etiket, Odeme, Parca, Teklif,
    TeklifDurumu,
};
pub use crate::domain::ports::{
    Frame, FrameSource, QrDecoder, SessionIssuer, TokenPair, TokenStore,
};
pub use crate::domain::qr::{QrSession, SessionOrigin};
pub use crate::utils::error::Result;
