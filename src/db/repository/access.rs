use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::Role;

use super::{parse_uuid, DATETIME_FORMAT};

pub fn grant_role(conn: &Connection, user_id: &Uuid, role: Role) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT OR IGNORE INTO user_roles (user_id, role) VALUES (?1, ?2)",
        params![user_id.to_string(), role.as_str()],
    )?;
    Ok(())
}

pub fn has_role(conn: &Connection, user_id: &Uuid, role: Role) -> Result<bool, DatabaseError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM user_roles WHERE user_id = ?1 AND role = ?2",
        params![user_id.to_string(), role.as_str()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Store a session row. `token_hash` is the hex SHA-256 of the bearer token.
pub fn insert_session(
    conn: &Connection,
    token_hash: &str,
    user_id: &Uuid,
    expires_at: &NaiveDateTime,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO auth_sessions (token_hash, user_id, expires_at) VALUES (?1, ?2, ?3)",
        params![
            token_hash,
            user_id.to_string(),
            expires_at.format(DATETIME_FORMAT).to_string(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

/// User behind a session that has not expired at `now`.
pub fn find_session_user(
    conn: &Connection,
    token_hash: &str,
    now: &NaiveDateTime,
) -> Result<Option<Uuid>, DatabaseError> {
    let result = conn.query_row(
        "SELECT user_id FROM auth_sessions WHERE token_hash = ?1 AND expires_at > ?2",
        params![token_hash, now.format(DATETIME_FORMAT).to_string()],
        |row| row.get::<_, String>(0),
    );
    match result {
        Ok(user_id) => Ok(Some(parse_uuid("auth_sessions.user_id", &user_id)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}
