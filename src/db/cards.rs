//! Vocabulary cards and per-user card states

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{CardExample, CardState, CefrLevel, MemoryState, VocabularyCard};

const CARD_COLUMNS: &str = "id, hungarian, korean, part_of_speech, level, examples, tags";

pub fn insert_card(conn: &Connection, card: &VocabularyCard) -> Result<i64> {
  conn.execute(
    r#"
    INSERT INTO vocabulary_cards (hungarian, korean, part_of_speech, level, examples, tags)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
    params![
      card.hungarian,
      card.korean,
      card.part_of_speech,
      card.level.as_str(),
      to_json(&card.examples)?,
      to_json(&card.tags)?,
    ],
  )?;
  Ok(conn.last_insert_rowid())
}

pub fn get_card_by_id(conn: &Connection, id: i64) -> Result<Option<VocabularyCard>> {
  conn
    .query_row(
      &format!("SELECT {CARD_COLUMNS} FROM vocabulary_cards WHERE id = ?1"),
      params![id],
      |row| row_to_card(row, 0),
    )
    .optional()
}

/// List cards, optionally restricted to one level, in insertion order
pub fn list_cards(conn: &Connection, level: Option<CefrLevel>, limit: usize) -> Result<Vec<VocabularyCard>> {
  let mut stmt = conn.prepare(&format!(
    r#"
    SELECT {CARD_COLUMNS}
    FROM vocabulary_cards
    WHERE ?1 IS NULL OR level = ?1
    ORDER BY id ASC
    LIMIT ?2
    "#
  ))?;

  let cards = stmt
    .query_map(params![level.map(|l| l.as_str()), limit as i64], |row| {
      row_to_card(row, 0)
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(cards)
}

pub fn count_cards(conn: &Connection) -> Result<i64> {
  conn.query_row("SELECT COUNT(*) FROM vocabulary_cards", [], |row| row.get(0))
}

/// Insert or replace the state for (user_id, card_id); returns the row id
pub fn upsert_card_state(conn: &Connection, state: &CardState) -> Result<i64> {
  conn.execute(
    r#"
    INSERT INTO card_states (user_id, card_id, stability, difficulty, retrievability, lapses,
                             reps, state, last_review, next_review)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT (user_id, card_id) DO UPDATE SET
      stability = excluded.stability,
      difficulty = excluded.difficulty,
      retrievability = excluded.retrievability,
      lapses = excluded.lapses,
      reps = excluded.reps,
      state = excluded.state,
      last_review = excluded.last_review,
      next_review = excluded.next_review
    "#,
    params![
      state.user_id,
      state.card_id,
      state.stability,
      state.difficulty,
      state.retrievability,
      state.lapses,
      state.reps,
      state.state.as_str(),
      state.last_review.map(|t| t.to_rfc3339()),
      state.next_review.to_rfc3339(),
    ],
  )?;

  conn.query_row(
    "SELECT id FROM card_states WHERE user_id = ?1 AND card_id = ?2",
    params![state.user_id, state.card_id],
    |row| row.get(0),
  )
}

/// A user's card states sorted by next_review ascending, card content joined in
pub fn get_card_states_for_user(conn: &Connection, user_id: &str, limit: usize) -> Result<Vec<CardState>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT s.id, s.user_id, s.card_id, s.stability, s.difficulty, s.retrievability, s.lapses,
           s.reps, s.state, s.last_review, s.next_review,
           c.id, c.hungarian, c.korean, c.part_of_speech, c.level, c.examples, c.tags
    FROM card_states s
    LEFT JOIN vocabulary_cards c ON c.id = s.card_id
    WHERE s.user_id = ?1
    ORDER BY s.next_review ASC
    LIMIT ?2
    "#,
  )?;

  let states = stmt
    .query_map(params![user_id, limit as i64], |row| {
      let state_str: String = row.get(8)?;
      let last_review: Option<String> = row.get(9)?;
      let next_review: String = row.get(10)?;
      let card_id: Option<i64> = row.get(11)?;

      Ok(CardState {
        id: row.get(0)?,
        user_id: row.get(1)?,
        card_id: row.get(2)?,
        stability: row.get(3)?,
        difficulty: row.get(4)?,
        retrievability: row.get(5)?,
        lapses: row.get(6)?,
        reps: row.get(7)?,
        state: MemoryState::from_str(&state_str),
        last_review: last_review.as_deref().and_then(parse_timestamp),
        next_review: parse_timestamp(&next_review).unwrap_or_else(Utc::now),
        card: match card_id {
          Some(_) => Some(row_to_card(row, 11)?),
          None => None,
        },
      })
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(states)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .ok()
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
  serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

/// Read card columns starting at `offset`
fn row_to_card(row: &rusqlite::Row, offset: usize) -> Result<VocabularyCard> {
  let level_str: String = row.get(offset + 4)?;
  let examples: String = row.get(offset + 5)?;
  let tags: String = row.get(offset + 6)?;

  Ok(VocabularyCard {
    id: row.get(offset)?,
    hungarian: row.get(offset + 1)?,
    korean: row.get(offset + 2)?,
    part_of_speech: row.get(offset + 3)?,
    level: CefrLevel::from_str(&level_str).unwrap_or(CefrLevel::A1),
    examples: serde_json::from_str::<Vec<CardExample>>(&examples).unwrap_or_default(),
    tags: serde_json::from_str(&tags).unwrap_or_default(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;
  use chrono::Duration;

  fn card(hu: &str, ko: &str, level: CefrLevel) -> VocabularyCard {
    VocabularyCard::new(hu, ko, level)
  }

  #[test]
  fn test_insert_and_get_card() {
    let env = TestEnv::new().unwrap();
    let mut c = card("víz", "물", CefrLevel::A1);
    c.examples.push(CardExample {
      hungarian: "Kérek egy pohár vizet.".into(),
      korean: "물 한 잔 주세요.".into(),
    });
    c.tags = vec!["drink".into()];

    let id = insert_card(&env.conn, &c).unwrap();
    let loaded = get_card_by_id(&env.conn, id).unwrap().unwrap();
    assert_eq!(loaded.hungarian, "víz");
    assert_eq!(loaded.examples.len(), 1);
    assert_eq!(loaded.tags, vec!["drink".to_string()]);

    assert!(get_card_by_id(&env.conn, id + 100).unwrap().is_none());
  }

  #[test]
  fn test_list_cards_filters_by_level() {
    let env = TestEnv::new().unwrap();
    insert_card(&env.conn, &card("ház", "집", CefrLevel::A1)).unwrap();
    insert_card(&env.conn, &card("azonban", "그러나", CefrLevel::B1)).unwrap();

    assert_eq!(list_cards(&env.conn, None, 10).unwrap().len(), 2);
    let b1 = list_cards(&env.conn, Some(CefrLevel::B1), 10).unwrap();
    assert_eq!(b1.len(), 1);
    assert_eq!(b1[0].korean, "그러나");
    assert_eq!(count_cards(&env.conn).unwrap(), 2);
  }

  #[test]
  fn test_states_sorted_by_next_review_and_limited() {
    let env = TestEnv::new().unwrap();
    let now = Utc::now();
    for (i, offset_hours) in [5i64, -3, 1].iter().enumerate() {
      let id = insert_card(&env.conn, &card(&format!("szó{i}"), "단어", CefrLevel::A1)).unwrap();
      let state = CardState::new("u1", id, now + Duration::hours(*offset_hours));
      upsert_card_state(&env.conn, &state).unwrap();
    }

    let states = get_card_states_for_user(&env.conn, "u1", 10).unwrap();
    assert_eq!(states.len(), 3);
    assert!(states.windows(2).all(|w| w[0].next_review <= w[1].next_review));
    assert!(states.iter().all(|s| s.card.is_some()));

    assert_eq!(get_card_states_for_user(&env.conn, "u1", 2).unwrap().len(), 2);
    assert!(get_card_states_for_user(&env.conn, "other", 10).unwrap().is_empty());
  }

  #[test]
  fn test_upsert_replaces_existing_state() {
    let env = TestEnv::new().unwrap();
    let id = insert_card(&env.conn, &card("kutya", "개", CefrLevel::A1)).unwrap();
    let mut state = CardState::new("u1", id, Utc::now());
    let first = upsert_card_state(&env.conn, &state).unwrap();

    state.lapses = 4;
    state.state = MemoryState::Relearning;
    let second = upsert_card_state(&env.conn, &state).unwrap();
    assert_eq!(first, second);

    let states = get_card_states_for_user(&env.conn, "u1", 10).unwrap();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].lapses, 4);
    assert_eq!(states[0].state, MemoryState::Relearning);
  }
}
