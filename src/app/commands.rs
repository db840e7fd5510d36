use crate::adapters::{FileTokenStore, ImageFileSource, RqrrDecoder};
use crate::app::output::{notify_success, render_list, render_one, OutputFormat};
use crate::config::cli::{
    CliConfig, Command, ElevatorCommand, ElevatorCreateArgs, ExecutionCommand, FaultCommand,
    ListArgs, MaintenanceCommand, MaintenanceCreateArgs, OfferCommand, QrCommand, QrSourceArgs,
    RecordCommand,
};
use crate::config::toml_config::ClientConfig;
use crate::core::api_client::ApiClient;
use crate::core::maintenance_form::BakimFormu;
use crate::core::qr_gate::QrGate;
use crate::core::qr_session::QrSessionService;
use crate::core::scanner::QrScanner;
use crate::core::services::{
    AuthService, CrudService, Elevators, ExecutionService, Faults, Inspections, ListFilter,
    MaintenanceService, Maintenances, Offers, Parts, Payments, Resource, StatusService,
};
use crate::domain::elevator_code::parse_elevator_code;
use crate::domain::model::{ArizaDurumu, Asansor, TeklifDurumu};
use crate::domain::qr::QrSession;
use crate::domain::token::{expires_in, Role};
use crate::utils::error::{ClientError, Result};
use crate::utils::table::{terminal_width, Tabular};
use crate::utils::validation::Validate;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct App {
    config: ClientConfig,
    client: ApiClient,
    format: OutputFormat,
    width: usize,
}

impl App {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let tokens = Arc::new(FileTokenStore::new(&config.auth.token_dir));
        let client = ApiClient::new(&config, tokens)?;
        let format = OutputFormat::parse(&config.output.format)?;
        let width = terminal_width(config.output.max_width);

        Ok(Self {
            config,
            client,
            format,
            width,
        })
    }

    fn print_list<T: Tabular + Serialize>(&self, records: &[T]) -> Result<()> {
        println!("{}", render_list(records, self.format, self.width)?);
        Ok(())
    }

    fn print_one<T: Tabular + Serialize>(&self, record: &T) -> Result<()> {
        println!("{}", render_one(record, self.format, self.width)?);
        Ok(())
    }

    /// Role of the logged-in user, used to offer remote start.
    fn current_role(&self) -> Option<Role> {
        match AuthService::new(self.client.clone()).current_claims() {
            Ok(Some((_, claims))) => claims.role,
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("Could not read current role: {}", e);
                None
            }
        }
    }

    pub async fn run(&self, command: &Command) -> Result<()> {
        match command {
            Command::Login { username, password } => self.login(username, password).await,
            Command::Logout => {
                AuthService::new(self.client.clone()).logout()?;
                notify_success("Çıkış yapıldı (logged out)");
                Ok(())
            }
            Command::Whoami => self.whoami(),
            Command::Elevators { action } => match action {
                ElevatorCommand::Record(cmd) => self.run_record::<Elevators>(cmd).await,
                ElevatorCommand::Create(args) => self.create_elevator(args).await,
            },
            Command::Maintenances { action } => match action {
                MaintenanceCommand::Record(cmd) => self.run_record::<Maintenances>(cmd).await,
                MaintenanceCommand::Create(args) => self.create_maintenance(args).await,
            },
            Command::Inspections { action } => self.run_record::<Inspections>(action).await,
            Command::Parts { action } => self.run_record::<Parts>(action).await,
            Command::Payments { action } => self.run_record::<Payments>(action).await,
            Command::Faults { action } => match action {
                FaultCommand::Record(cmd) => self.run_record::<Faults>(cmd).await,
                FaultCommand::Status { id, status } => {
                    let durum = ArizaDurumu::parse(status).ok_or_else(|| {
                        ClientError::validation("status", "use open, in_progress or completed")
                    })?;
                    let ariza = StatusService::new(self.client.clone())
                        .update_fault_status(*id, durum)
                        .await?;
                    self.print_one(&ariza)?;
                    notify_success(&format!("Arıza {} → {}", id, durum));
                    Ok(())
                }
            },
            Command::Offers { action } => match action {
                OfferCommand::Record(cmd) => self.run_record::<Offers>(cmd).await,
                OfferCommand::Status { id, status } => {
                    let durum = TeklifDurumu::parse(status).ok_or_else(|| {
                        ClientError::validation("status", "use pending, accepted or rejected")
                    })?;
                    let teklif = StatusService::new(self.client.clone())
                        .update_offer_status(*id, durum)
                        .await?;
                    self.print_one(&teklif)?;
                    notify_success(&format!("Teklif {} → {}", id, durum));
                    Ok(())
                }
            },
            Command::Qr { action } => self.run_qr(action).await,
            Command::Executions { action } => self.run_execution(action).await,
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<()> {
        let claims = AuthService::new(self.client.clone())
            .login(username, password)
            .await?;
        let role = claims
            .and_then(|c| c.role)
            .map(|r| r.to_string())
            .unwrap_or_else(|| "-".to_string());
        notify_success(&format!("Giriş başarılı: {} ({})", username.trim(), role));
        Ok(())
    }

    fn whoami(&self) -> Result<()> {
        let Some((token, claims)) = AuthService::new(self.client.clone()).current_claims()? else {
            return Err(ClientError::NotAuthenticated);
        };

        println!("Kullanıcı : {}", claims.username.as_deref().unwrap_or("-"));
        println!(
            "Rol       : {}",
            claims
                .role
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string())
        );
        match expires_in(&token, Utc::now()) {
            Some(remaining) => println!(
                "Oturum    : {} dk kaldı",
                remaining.num_minutes().max(0)
            ),
            None => return Err(ClientError::SessionExpired),
        }
        Ok(())
    }

    async fn run_record<R: Resource>(&self, command: &RecordCommand) -> Result<()> {
        let service = CrudService::<R>::new(self.client.clone());
        match command {
            RecordCommand::List(args) => {
                let records = service.list(&list_filter(args)).await?;
                self.print_list(&records)
            }
            RecordCommand::Get { id } => {
                let record = service.get(*id).await?;
                self.print_one(&record)
            }
            RecordCommand::Delete { id } => {
                service.delete(*id).await?;
                notify_success(&format!("{} {} silindi (deleted)", R::NAME, id));
                Ok(())
            }
        }
    }

    async fn create_elevator(&self, args: &ElevatorCreateArgs) -> Result<()> {
        let code = parse_elevator_code(&args.code).ok_or_else(|| {
            ClientError::validation("code", format!("'{}' is not a block+number code like A2", args.code))
        })?;

        let asansor = Asansor {
            id: None,
            kimlik_no: args.identity.trim().to_string(),
            bina_adi: args.building.trim().to_string(),
            adres: args.address.trim().to_string(),
            blok: code.block,
            numara: code.number,
            durak_sayisi: args.floors,
            kapasite_kg: args.capacity,
            yonetici_adi: args.manager.clone(),
            yonetici_telefon: args.phone.clone(),
            etiket: None,
            etiket_tarihi: None,
            etiket_bitis: None,
        };

        let created = CrudService::<Elevators>::new(self.client.clone())
            .create(&asansor)
            .await?;
        self.print_one(&created)?;
        notify_success(&format!("Asansör {} kaydedildi", created.kod()));
        Ok(())
    }

    /// Obtain a QR session through the gate, the way the UI's validation dialog does.
    async fn acquire_session(&self, elevator_id: i64, qr: &QrSourceArgs) -> Result<QrSession> {
        let issuer = QrSessionService::new(self.client.clone());
        let mut gate = QrGate::new(issuer, elevator_id, self.current_role());
        tracing::debug!(
            "QR gate for elevator {} (remote start allowed: {})",
            gate.elevator_id(),
            gate.can_remote_start()
        );

        if qr.remote_start {
            return gate.remote_start().await;
        }
        if let Some(code) = &qr.qr_code {
            return gate.validate_manual(code).await;
        }

        let scanner = QrScanner::new(RqrrDecoder, &self.config.scanner);
        let mut source = ImageFileSource::new(qr.qr_image.clone());
        let cancel = CancellationToken::new();

        // Ctrl-C 取消掃描並釋放來源
        let on_interrupt = cancel.clone();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_interrupt.cancel();
            }
        });

        let outcome = gate.scan_and_validate(&scanner, &mut source, &cancel).await;
        interrupt.abort();
        outcome
    }

    async fn create_maintenance(&self, args: &MaintenanceCreateArgs) -> Result<()> {
        let form = BakimFormu {
            tarih: args.date.clone(),
            teknisyen: args.technician.clone(),
            aciklama: args.description.clone(),
            etiket: args.label.clone(),
            tutar: args.amount.clone(),
            odendi: args.paid,
        };
        // 先檢查表單，避免掃描後才發現輸入錯誤
        form.to_bakim(args.elevator)?;

        let session = self.acquire_session(args.elevator, &args.qr).await?;
        tracing::info!("QR session ready via {}", session.origin);

        let created = form
            .submit(&MaintenanceService::new(self.client.clone()), &session)
            .await?;
        self.print_one(&created)?;
        notify_success("Bakım kaydı oluşturuldu");
        Ok(())
    }

    async fn run_qr(&self, command: &QrCommand) -> Result<()> {
        let session = match command {
            QrCommand::Validate { elevator, code } => {
                let qr = QrSourceArgs {
                    qr_code: Some(code.clone()),
                    qr_image: Vec::new(),
                    remote_start: false,
                };
                self.acquire_session(*elevator, &qr).await?
            }
            QrCommand::Scan { elevator, image } => {
                let qr = QrSourceArgs {
                    qr_code: None,
                    qr_image: image.clone(),
                    remote_start: false,
                };
                self.acquire_session(*elevator, &qr).await?
            }
            QrCommand::RemoteStart { elevator } => {
                let qr = QrSourceArgs {
                    qr_code: None,
                    qr_image: Vec::new(),
                    remote_start: true,
                };
                self.acquire_session(*elevator, &qr).await?
            }
        };

        println!("Asansör   : {}", session.elevator_id);
        println!("Kaynak    : {}", session.origin);
        println!(
            "Geçerlilik: {}",
            session
                .expires_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".to_string())
        );
        println!("Oturum    : {}", session.token);
        notify_success("QR oturumu doğrulandı");
        Ok(())
    }

    async fn run_execution(&self, command: &ExecutionCommand) -> Result<()> {
        let service = ExecutionService::new(self.client.clone());
        match command {
            ExecutionCommand::List { elevator } => {
                let executions = service.list(*elevator).await?;
                self.print_list(&executions)
            }
            ExecutionCommand::Start { elevator, qr } => {
                let session = self.acquire_session(*elevator, qr).await?;
                let execution = service.start(*elevator, &session).await?;
                self.print_one(&execution)?;
                notify_success(&format!("Bakım başlatıldı (#{})", execution.id));
                Ok(())
            }
            ExecutionCommand::Complete { id, notes } => {
                let execution = service.complete(*id, notes.as_deref()).await?;
                self.print_one(&execution)?;
                notify_success(&format!("Bakım tamamlandı (#{})", id));
                Ok(())
            }
        }
    }
}

fn list_filter(args: &ListArgs) -> ListFilter {
    ListFilter {
        elevator_id: args.elevator,
        start_date: args.from.clone(),
        end_date: args.to.clone(),
        status: args.status.clone(),
        search: args.search.clone(),
    }
}

/// Entry point used by the binary.
pub async fn run(cli: &CliConfig) -> Result<()> {
    let config = cli.resolve()?;
    tracing::debug!("Resolved config: {:?}", config);
    let app = App::new(config)?;
    app.run(&cli.command).await
}
