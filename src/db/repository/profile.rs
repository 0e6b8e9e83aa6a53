use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

use super::{parse_timestamp, parse_uuid, DATETIME_FORMAT};

/// Upsert a profile row. The hosted auth service owns these; the backend
/// only writes them when seeding or mirroring.
pub fn upsert_profile(conn: &Connection, profile: &Profile) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO profiles (id, full_name, email, created_at) VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET full_name = excluded.full_name, email = excluded.email",
        params![
            profile.id.to_string(),
            profile.full_name,
            profile.email,
            profile.created_at.format(DATETIME_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_profile(conn: &Connection, id: &Uuid) -> Result<Option<Profile>, DatabaseError> {
    let result = conn.query_row(
        "SELECT id, full_name, email, created_at FROM profiles WHERE id = ?1",
        params![id.to_string()],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
            ))
        },
    );

    match result {
        Ok(row) => Ok(Some(profile_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All profiles, newest first (admin roster order).
pub fn list_profiles(conn: &Connection) -> Result<Vec<Profile>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, full_name, email, created_at FROM profiles ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, String>(3)?,
        ))
    })?;

    let mut profiles = Vec::new();
    for row in rows {
        profiles.push(profile_from_row(row?)?);
    }
    Ok(profiles)
}

fn profile_from_row(
    (id, full_name, email, created_at): (String, Option<String>, Option<String>, String),
) -> Result<Profile, DatabaseError> {
    Ok(Profile {
        id: parse_uuid("profiles.id", &id)?,
        full_name,
        email,
        created_at: parse_timestamp("profiles.created_at", &created_at)?,
    })
}
