//! Application state machine, grounded on `internal/client/client.go`'s
//! `Application`/`Page` model: an auth menu leading to login/register forms,
//! then a data screen with one tab per record kind, expressed as an enum
//! state machine instead of `tview`'s page stack.

use datakeeper_protos::datakeeper::v1::Snapshot;
use tokio::sync::mpsc;

use crate::grpc::GrpcClient;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
  PasswordPairs,
  Texts,
  Cards,
  Bins,
}

impl DataKind {
  pub const ALL: [DataKind; 4] = [
    DataKind::PasswordPairs,
    DataKind::Texts,
    DataKind::Cards,
    DataKind::Bins,
  ];

  pub fn label(self) -> &'static str {
    match self {
      DataKind::PasswordPairs => "password pairs",
      DataKind::Texts => "texts",
      DataKind::Cards => "cards",
      DataKind::Bins => "bins",
    }
  }

  pub fn index(self) -> usize {
    DataKind::ALL.iter().position(|k| *k == self).unwrap()
  }

  pub fn form_fields(self) -> &'static [&'static str] {
    match self {
      DataKind::PasswordPairs => &["login", "password", "description"],
      DataKind::Texts => &["name", "text", "description"],
      DataKind::Cards => &[
        "name",
        "number",
        "valid through month",
        "valid through year",
        "cvv",
        "description",
      ],
      DataKind::Bins => &["name", "data", "description"],
    }
  }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
  Login,
  Password,
}

pub struct AuthForm {
  pub login: String,
  pub password: String,
  pub field: AuthField,
  pub error: Option<String>,
}

impl AuthForm {
  fn new() -> Self {
    Self {
      login: String::new(),
      password: String::new(),
      field: AuthField::Login,
      error: None,
    }
  }

  fn active_value_mut(&mut self) -> &mut String {
    match self.field {
      AuthField::Login => &mut self.login,
      AuthField::Password => &mut self.password,
    }
  }
}

pub struct CreateForm {
  pub kind: DataKind,
  pub values: Vec<String>,
  pub field: usize,
}

impl CreateForm {
  fn new(kind: DataKind) -> Self {
    Self {
      values: vec![String::new(); kind.form_fields().len()],
      kind,
      field: 0,
    }
  }
}

pub enum DataMode {
  Browsing,
  Creating(CreateForm),
  ConfirmRemove(i64),
}

pub struct DataScreen {
  pub kind: DataKind,
  pub list_index: usize,
  pub mode: DataMode,
  pub error: Option<String>,
}

impl DataScreen {
  fn new() -> Self {
    Self {
      kind: DataKind::PasswordPairs,
      list_index: 0,
      mode: DataMode::Browsing,
      error: None,
    }
  }
}

pub enum Screen {
  AuthMenu { selected: usize },
  Login(AuthForm),
  Register(AuthForm),
  Data(DataScreen),
}

fn list_len(snapshot: &Snapshot, kind: DataKind) -> usize {
  match kind {
    DataKind::PasswordPairs => snapshot.password_pairs.len(),
    DataKind::Texts => snapshot.texts.len(),
    DataKind::Cards => snapshot.cards.len(),
    DataKind::Bins => snapshot.bins.len(),
  }
}

fn item_id(snapshot: &Snapshot, kind: DataKind, index: usize) -> Option<i64> {
  match kind {
    DataKind::PasswordPairs => snapshot.password_pairs.get(index).map(|p| p.id),
    DataKind::Texts => snapshot.texts.get(index).map(|t| t.id),
    DataKind::Cards => snapshot.cards.get(index).map(|c| c.id),
    DataKind::Bins => snapshot.bins.get(index).map(|b| b.id),
  }
}

pub struct App {
  pub grpc: GrpcClient,
  pub screen: Screen,
  pub snapshot: Snapshot,
  pub snapshot_rx: Option<mpsc::Receiver<Snapshot>>,
  pub should_quit: bool,
}

impl App {
  pub fn new(grpc: GrpcClient) -> Self {
    Self {
      grpc,
      screen: Screen::AuthMenu { selected: 0 },
      snapshot: Snapshot::default(),
      snapshot_rx: None,
      should_quit: false,
    }
  }

  /// Drains any snapshots pushed since the last tick without blocking;
  /// only the most recent is kept, matching the server's "last write wins"
  /// refresh semantics on the read side.
  pub fn poll_snapshot(&mut self) {
    let Some(rx) = self.snapshot_rx.as_mut() else {
      return;
    };

    let mut latest = None;
    while let Ok(snapshot) = rx.try_recv() {
      latest = Some(snapshot);
    }
    if let Some(snapshot) = latest {
      self.snapshot = snapshot;
    }
  }

  fn enter_data_screen(&mut self) {
    match self.grpc.spawn_snapshot_stream() {
      Ok(rx) => self.snapshot_rx = Some(rx),
      Err(e) => tracing::error!(error = %e, "failed to start data stream"),
    }
    self.screen = Screen::Data(DataScreen::new());
  }

  pub async fn handle_key(&mut self, key: crossterm::event::KeyCode) {
    if matches!(self.screen, Screen::AuthMenu { .. }) {
      self.handle_auth_menu_key(key);
    } else if matches!(self.screen, Screen::Login(_)) {
      self.handle_login_key(key).await;
    } else if matches!(self.screen, Screen::Register(_)) {
      self.handle_register_key(key).await;
    } else {
      self.handle_data_key(key).await;
    }
  }

  fn handle_auth_menu_key(&mut self, key: crossterm::event::KeyCode) {
    let Screen::AuthMenu { selected } = &mut self.screen else {
      return;
    };
    match key {
      crossterm::event::KeyCode::Up | crossterm::event::KeyCode::Down => {
        *selected = 1 - *selected;
      }
      crossterm::event::KeyCode::Enter => {
        self.screen = if *selected == 0 {
          Screen::Login(AuthForm::new())
        } else {
          Screen::Register(AuthForm::new())
        };
      }
      crossterm::event::KeyCode::Char('q') => self.should_quit = true,
      _ => {}
    }
  }

  async fn handle_login_key(&mut self, key: crossterm::event::KeyCode) {
    if key == crossterm::event::KeyCode::Esc {
      self.screen = Screen::AuthMenu { selected: 0 };
      return;
    }

    let Screen::Login(form) = &mut self.screen else {
      return;
    };
    match key {
      crossterm::event::KeyCode::Tab => {
        form.field = match form.field {
          AuthField::Login => AuthField::Password,
          AuthField::Password => AuthField::Login,
        };
      }
      crossterm::event::KeyCode::Backspace => {
        form.active_value_mut().pop();
      }
      crossterm::event::KeyCode::Char(c) => form.active_value_mut().push(c),
      crossterm::event::KeyCode::Enter => {
        let login = form.login.clone();
        let password = form.password.clone();
        match self.grpc.sign_in(login, password).await {
          Ok(None) => self.enter_data_screen(),
          Ok(Some(err)) => {
            if let Screen::Login(form) = &mut self.screen {
              form.error = Some(err);
            }
          }
          Err(e) => {
            if let Screen::Login(form) = &mut self.screen {
              form.error = Some(e.to_string());
            }
          }
        }
      }
      _ => {}
    }
  }

  async fn handle_register_key(&mut self, key: crossterm::event::KeyCode) {
    if key == crossterm::event::KeyCode::Esc {
      self.screen = Screen::AuthMenu { selected: 1 };
      return;
    }

    let Screen::Register(form) = &mut self.screen else {
      return;
    };
    match key {
      crossterm::event::KeyCode::Tab => {
        form.field = match form.field {
          AuthField::Login => AuthField::Password,
          AuthField::Password => AuthField::Login,
        };
      }
      crossterm::event::KeyCode::Backspace => {
        form.active_value_mut().pop();
      }
      crossterm::event::KeyCode::Char(c) => form.active_value_mut().push(c),
      crossterm::event::KeyCode::Enter => {
        let login = form.login.clone();
        let password = form.password.clone();
        match self.grpc.sign_up(login, password).await {
          Ok(None) => self.screen = Screen::Login(AuthForm::new()),
          Ok(Some(err)) => {
            if let Screen::Register(form) = &mut self.screen {
              form.error = Some(err);
            }
          }
          Err(e) => {
            if let Screen::Register(form) = &mut self.screen {
              form.error = Some(e.to_string());
            }
          }
        }
      }
      _ => {}
    }
  }


  async fn handle_data_key(&mut self, key: crossterm::event::KeyCode) {
    let mode_is_browsing = matches!(
      &self.screen,
      Screen::Data(DataScreen {
        mode: DataMode::Browsing,
        ..
      })
    );

    if mode_is_browsing {
      self.handle_data_browsing_key(key).await;
      return;
    }

    let is_confirm = matches!(
      &self.screen,
      Screen::Data(DataScreen {
        mode: DataMode::ConfirmRemove(_),
        ..
      })
    );
    if is_confirm {
      self.handle_confirm_remove_key(key).await;
      return;
    }

    self.handle_create_form_key(key).await;
  }

  async fn handle_data_browsing_key(&mut self, key: crossterm::event::KeyCode) {
    if key == crossterm::event::KeyCode::Char('q') {
      self.should_quit = true;
      return;
    }

    let snapshot = &self.snapshot;
    let Screen::Data(data) = &mut self.screen else {
      return;
    };
    match key {
      crossterm::event::KeyCode::Left => {
        let idx = data.kind.index();
        data.kind = DataKind::ALL[(idx + DataKind::ALL.len() - 1) % DataKind::ALL.len()];
        data.list_index = 0;
      }
      crossterm::event::KeyCode::Right | crossterm::event::KeyCode::Tab => {
        let idx = data.kind.index();
        data.kind = DataKind::ALL[(idx + 1) % DataKind::ALL.len()];
        data.list_index = 0;
      }
      crossterm::event::KeyCode::Up => {
        data.list_index = data.list_index.saturating_sub(1);
      }
      crossterm::event::KeyCode::Down => {
        let len = list_len(snapshot, data.kind);
        if data.list_index + 1 < len {
          data.list_index += 1;
        }
      }
      crossterm::event::KeyCode::Char('n') => {
        data.mode = DataMode::Creating(CreateForm::new(data.kind));
      }
      crossterm::event::KeyCode::Char('d') => {
        if let Some(id) = item_id(snapshot, data.kind, data.list_index) {
          data.mode = DataMode::ConfirmRemove(id);
        }
      }
      _ => {}
    }
  }

  async fn handle_confirm_remove_key(&mut self, key: crossterm::event::KeyCode) {
    let Screen::Data(data) = &mut self.screen else {
      return;
    };
    let DataMode::ConfirmRemove(id) = &data.mode else {
      return;
    };
    let id = *id;

    match key {
      crossterm::event::KeyCode::Char('y') => {
        let kind = data.kind;
        data.mode = DataMode::Browsing;
        let result = match kind {
          DataKind::PasswordPairs => self.grpc.remove_password_pair(id).await,
          DataKind::Texts => self.grpc.remove_text(id).await,
          DataKind::Cards => self.grpc.remove_card(id).await,
          DataKind::Bins => self.grpc.remove_bin(id).await,
        };
        if let (Err(e), Screen::Data(data)) = (result, &mut self.screen) {
          data.error = Some(e.to_string());
        }
      }
      crossterm::event::KeyCode::Char('n') | crossterm::event::KeyCode::Esc => {
        data.mode = DataMode::Browsing;
      }
      _ => {}
    }
  }

  async fn handle_create_form_key(&mut self, key: crossterm::event::KeyCode) {
    if key == crossterm::event::KeyCode::Esc {
      if let Screen::Data(data) = &mut self.screen {
        data.mode = DataMode::Browsing;
      }
      return;
    }

    if key == crossterm::event::KeyCode::Enter {
      let advanced = match &mut self.screen {
        Screen::Data(data) => match &mut data.mode {
          DataMode::Creating(form) if form.field + 1 < form.values.len() => {
            form.field += 1;
            true
          }
          DataMode::Creating(_) => false,
          _ => return,
        },
        _ => return,
      };
      if !advanced {
        self.submit_create_form().await;
      }
      return;
    }

    let Screen::Data(data) = &mut self.screen else {
      return;
    };
    let DataMode::Creating(form) = &mut data.mode else {
      return;
    };

    match key {
      crossterm::event::KeyCode::Tab => {
        form.field = (form.field + 1) % form.values.len();
      }
      crossterm::event::KeyCode::Backspace => {
        form.values[form.field].pop();
      }
      crossterm::event::KeyCode::Char(c) => form.values[form.field].push(c),
      _ => {}
    }
  }

  async fn submit_create_form(&mut self) {
    let Screen::Data(data) = &mut self.screen else {
      return;
    };
    let DataMode::Creating(form) = &data.mode else {
      return;
    };

    let description = |raw: &str| {
      if raw.is_empty() {
        None
      } else {
        Some(raw.to_string())
      }
    };

    let result = match form.kind {
      DataKind::PasswordPairs => {
        self
          .grpc
          .create_password_pair(
            form.values[0].clone(),
            form.values[1].clone(),
            description(&form.values[2]),
          )
          .await
      }
      DataKind::Texts => {
        self
          .grpc
          .create_text(
            form.values[0].clone(),
            form.values[1].clone(),
            description(&form.values[2]),
          )
          .await
      }
      DataKind::Cards => match (form.values[2].parse::<i32>(), form.values[3].parse::<i32>(), form.values[4].parse::<i32>()) {
        (Ok(month), Ok(year), Ok(cvv)) => {
          self
            .grpc
            .create_card(
              form.values[0].clone(),
              form.values[1].clone(),
              month,
              year,
              cvv,
              description(&form.values[5]),
            )
            .await
        }
        _ => Err(anyhow::anyhow!(
          "month, year, and cvv must be numbers"
        )),
      },
      DataKind::Bins => {
        self
          .grpc
          .create_bin(
            form.values[0].clone(),
            form.values[1].clone().into_bytes(),
            description(&form.values[2]),
          )
          .await
      }
    };

    let Screen::Data(data) = &mut self.screen else {
      return;
    };
    match result {
      Ok(()) => data.mode = DataMode::Browsing,
      Err(e) => data.error = Some(e.to_string()),
    }
  }
}
