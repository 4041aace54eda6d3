//! Record store (C1) and credential store (C2), backed by Postgres via
//! `sqlx`. Grounded on `internal/server/storage/{sqlite,storage}.go`'s
//! operation set, adapted to the teacher's `sqlx::PgPool` stack — a
//! deliberate deviation from the original's SQLite backend (see DESIGN.md).

use async_trait::async_trait;
use datakeeper_core::{
  Bin, BinId, Card, CardId, CoreError, PasswordPair, PasswordPairId, RecordSource, Text, TextId,
  User, UserId, UserStore,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgStorage {
  pool: PgPool,
}

impl PgStorage {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(db_url: &str) -> Result<Self, CoreError> {
    let pool = sqlx::postgres::PgPoolOptions::new()
      .max_connections(10)
      .connect(db_url)
      .await
      .map_err(CoreError::from_database_error)?;

    Ok(Self::new(pool))
  }

  pub async fn migrate(&self) -> Result<(), CoreError> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .map_err(|e| CoreError::Internal(e.to_string()))
  }

  pub async fn create_password_pair(
    &self,
    owner_id: UserId,
    login: &str,
    password: &str,
    description: Option<&str>,
  ) -> Result<PasswordPair, CoreError> {
    let row = sqlx::query_as!(
      PasswordPairRow,
      r#"INSERT INTO password_pairs (owner_id, login, password, description)
         VALUES ($1, $2, $3, $4)
         RETURNING id, owner_id, login, password, description"#,
      owner_id.inner(),
      login,
      password,
      description,
    )
    .fetch_one(&self.pool)
    .await?;

    Ok(row.into())
  }

  pub async fn remove_password_pair(&self, owner_id: UserId, id: PasswordPairId) -> Result<(), CoreError> {
    sqlx::query!(
      "DELETE FROM password_pairs WHERE owner_id = $1 AND id = $2",
      owner_id.inner(),
      id.inner(),
    )
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  pub async fn list_password_pairs(&self, owner_id: UserId) -> Result<Vec<PasswordPair>, CoreError> {
    let rows = sqlx::query_as!(
      PasswordPairRow,
      r#"SELECT id, owner_id, login, password, description FROM password_pairs
         WHERE owner_id = $1 ORDER BY id ASC"#,
      owner_id.inner(),
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
  }

  pub async fn create_text(
    &self,
    owner_id: UserId,
    name: &str,
    body: &str,
    description: Option<&str>,
  ) -> Result<Text, CoreError> {
    let row = sqlx::query_as!(
      TextRow,
      r#"INSERT INTO texts (owner_id, name, body, description)
         VALUES ($1, $2, $3, $4)
         RETURNING id, owner_id, name, body, description"#,
      owner_id.inner(),
      name,
      body,
      description,
    )
    .fetch_one(&self.pool)
    .await?;

    Ok(row.into())
  }

  pub async fn remove_text(&self, owner_id: UserId, id: TextId) -> Result<(), CoreError> {
    sqlx::query!(
      "DELETE FROM texts WHERE owner_id = $1 AND id = $2",
      owner_id.inner(),
      id.inner(),
    )
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  pub async fn list_texts(&self, owner_id: UserId) -> Result<Vec<Text>, CoreError> {
    let rows = sqlx::query_as!(
      TextRow,
      r#"SELECT id, owner_id, name, body, description FROM texts
         WHERE owner_id = $1 ORDER BY id ASC"#,
      owner_id.inner(),
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
  }

  #[allow(clippy::too_many_arguments)]
  pub async fn create_card(
    &self,
    owner_id: UserId,
    name: &str,
    number: &str,
    valid_through_month: i16,
    valid_through_year: i16,
    cvv: i16,
    description: Option<&str>,
  ) -> Result<Card, CoreError> {
    let row = sqlx::query_as!(
      CardRow,
      r#"INSERT INTO cards (owner_id, name, number, valid_through_month, valid_through_year, cvv, description)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, owner_id, name, number, valid_through_month, valid_through_year, cvv, description"#,
      owner_id.inner(),
      name,
      number,
      valid_through_month,
      valid_through_year,
      cvv,
      description,
    )
    .fetch_one(&self.pool)
    .await?;

    Ok(row.into())
  }

  pub async fn remove_card(&self, owner_id: UserId, id: CardId) -> Result<(), CoreError> {
    sqlx::query!(
      "DELETE FROM cards WHERE owner_id = $1 AND id = $2",
      owner_id.inner(),
      id.inner(),
    )
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  pub async fn list_cards(&self, owner_id: UserId) -> Result<Vec<Card>, CoreError> {
    let rows = sqlx::query_as!(
      CardRow,
      r#"SELECT id, owner_id, name, number, valid_through_month, valid_through_year, cvv, description
         FROM cards WHERE owner_id = $1 ORDER BY id ASC"#,
      owner_id.inner(),
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
  }

  pub async fn create_bin(
    &self,
    owner_id: UserId,
    name: &str,
    data: &[u8],
    description: Option<&str>,
  ) -> Result<Bin, CoreError> {
    let row = sqlx::query_as!(
      BinRow,
      r#"INSERT INTO bins (owner_id, name, data, description)
         VALUES ($1, $2, $3, $4)
         RETURNING id, owner_id, name, data, description"#,
      owner_id.inner(),
      name,
      data,
      description,
    )
    .fetch_one(&self.pool)
    .await?;

    Ok(row.into())
  }

  pub async fn remove_bin(&self, owner_id: UserId, id: BinId) -> Result<(), CoreError> {
    sqlx::query!(
      "DELETE FROM bins WHERE owner_id = $1 AND id = $2",
      owner_id.inner(),
      id.inner(),
    )
    .execute(&self.pool)
    .await?;

    Ok(())
  }

  pub async fn list_bins(&self, owner_id: UserId) -> Result<Vec<Bin>, CoreError> {
    let rows = sqlx::query_as!(
      BinRow,
      r#"SELECT id, owner_id, name, data, description FROM bins
         WHERE owner_id = $1 ORDER BY id ASC"#,
      owner_id.inner(),
    )
    .fetch_all(&self.pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
  }
}

#[async_trait]
impl UserStore for PgStorage {
  async fn create_user(&self, login: &str, password_hash: &str) -> Result<User, CoreError> {
    let row = sqlx::query_as!(
      UserRow,
      r#"INSERT INTO users (login, password) VALUES ($1, $2)
         RETURNING id, login, password"#,
      login,
      password_hash,
    )
    .fetch_one(&self.pool)
    .await?;

    Ok(row.into())
  }

  async fn get_user(&self, login: &str) -> Result<Option<User>, CoreError> {
    let row = sqlx::query_as!(
      UserRow,
      "SELECT id, login, password FROM users WHERE login = $1",
      login,
    )
    .fetch_optional(&self.pool)
    .await?;

    Ok(row.map(Into::into))
  }
}

#[async_trait]
impl RecordSource for PgStorage {
  async fn list_password_pairs(&self, owner_id: UserId) -> Result<Vec<PasswordPair>, CoreError> {
    PgStorage::list_password_pairs(self, owner_id).await
  }

  async fn list_texts(&self, owner_id: UserId) -> Result<Vec<Text>, CoreError> {
    PgStorage::list_texts(self, owner_id).await
  }

  async fn list_cards(&self, owner_id: UserId) -> Result<Vec<Card>, CoreError> {
    PgStorage::list_cards(self, owner_id).await
  }

  async fn list_bins(&self, owner_id: UserId) -> Result<Vec<Bin>, CoreError> {
    PgStorage::list_bins(self, owner_id).await
  }
}

struct UserRow {
  id: i64,
  login: String,
  password: String,
}

impl From<UserRow> for User {
  fn from(row: UserRow) -> Self {
    User {
      id: UserId::new(row.id),
      login: row.login,
      password_hash: row.password,
    }
  }
}

struct PasswordPairRow {
  id: i64,
  owner_id: i64,
  login: String,
  password: String,
  description: Option<String>,
}

impl From<PasswordPairRow> for PasswordPair {
  fn from(row: PasswordPairRow) -> Self {
    PasswordPair {
      id: PasswordPairId::new(row.id),
      owner_id: UserId::new(row.owner_id),
      login: row.login,
      password: row.password,
      description: row.description,
    }
  }
}

struct TextRow {
  id: i64,
  owner_id: i64,
  name: String,
  body: String,
  description: Option<String>,
}

impl From<TextRow> for Text {
  fn from(row: TextRow) -> Self {
    Text {
      id: TextId::new(row.id),
      owner_id: UserId::new(row.owner_id),
      name: row.name,
      body: row.body,
      description: row.description,
    }
  }
}

struct CardRow {
  id: i64,
  owner_id: i64,
  name: String,
  number: String,
  valid_through_month: i16,
  valid_through_year: i16,
  cvv: i16,
  description: Option<String>,
}

impl From<CardRow> for Card {
  fn from(row: CardRow) -> Self {
    Card {
      id: CardId::new(row.id),
      owner_id: UserId::new(row.owner_id),
      name: row.name,
      number: row.number,
      valid_through_month: row.valid_through_month,
      valid_through_year: row.valid_through_year,
      cvv: row.cvv,
      description: row.description,
    }
  }
}

struct BinRow {
  id: i64,
  owner_id: i64,
  name: String,
  data: Vec<u8>,
  description: Option<String>,
}

impl From<BinRow> for Bin {
  fn from(row: BinRow) -> Self {
    Bin {
      id: BinId::new(row.id),
      owner_id: UserId::new(row.owner_id),
      name: row.name,
      data: row.data,
      description: row.description,
    }
  }
}
