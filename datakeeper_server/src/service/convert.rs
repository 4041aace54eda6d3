//! Domain → wire conversions for the four record kinds and the snapshot
//! that bundles them.

use datakeeper_core::{Bin, Card, PasswordPair, Snapshot, Text};
use datakeeper_protos::datakeeper::v1 as proto;

impl From<PasswordPair> for proto::PasswordPair {
  fn from(p: PasswordPair) -> Self {
    proto::PasswordPair {
      id: p.id.inner(),
      login: p.login,
      password: p.password,
      description: p.description,
    }
  }
}

impl From<Text> for proto::Text {
  fn from(t: Text) -> Self {
    proto::Text {
      id: t.id.inner(),
      name: t.name,
      text: t.body,
      description: t.description,
    }
  }
}

impl From<Card> for proto::Card {
  fn from(c: Card) -> Self {
    proto::Card {
      id: c.id.inner(),
      name: c.name,
      number: c.number,
      valid_through_month: c.valid_through_month as i32,
      valid_through_year: c.valid_through_year as i32,
      cvv: c.cvv as i32,
      description: c.description,
    }
  }
}

impl From<Bin> for proto::Bin {
  fn from(b: Bin) -> Self {
    proto::Bin {
      id: b.id.inner(),
      name: b.name,
      data: b.data,
      description: b.description,
    }
  }
}

impl From<Snapshot> for proto::Snapshot {
  fn from(s: Snapshot) -> Self {
    proto::Snapshot {
      password_pairs: s.password_pairs.into_iter().map(Into::into).collect(),
      texts: s.texts.into_iter().map(Into::into).collect(),
      cards: s.cards.into_iter().map(Into::into).collect(),
      bins: s.bins.into_iter().map(Into::into).collect(),
    }
  }
}
