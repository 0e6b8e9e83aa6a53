use std::str::FromStr;

use rusqlite::{params, params_from_iter, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

use super::{parse_day, parse_timestamp, parse_uuid, DATETIME_FORMAT};

const APPOINTMENT_COLUMNS: &str = "id, user_id, full_name, service_type, appointment_date,
     appointment_time, status, notes, created_at";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, user_id, full_name, service_type, appointment_date,
         appointment_time, status, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            appt.id.to_string(),
            appt.owner_id.map(|id| id.to_string()),
            appt.full_name,
            appt.service_type.as_str(),
            appt.date.format("%Y-%m-%d").to_string(),
            appt.time,
            appt.status.as_str(),
            appt.notes,
            appt.created_at.format(DATETIME_FORMAT).to_string(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"
    ))?;

    let result = stmt.query_row(params![id.to_string()], appointment_row_from_rusqlite);

    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrite every mutable column. `id`, `user_id` and `created_at` never change.
pub fn update_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE appointments SET full_name = ?2, service_type = ?3, appointment_date = ?4,
             appointment_time = ?5, status = ?6, notes = ?7
             WHERE id = ?1",
            params![
                appt.id.to_string(),
                appt.full_name,
                appt.service_type.as_str(),
                appt.date.format("%Y-%m-%d").to_string(),
                appt.time,
                appt.status.as_str(),
                appt.notes,
            ],
        )
        .map_err(DatabaseError::from_write)?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: appt.id.to_string(),
        });
    }
    Ok(())
}

pub fn delete_appointment(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Appointment".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn query_appointments(
    conn: &Connection,
    filter: &AppointmentFilter,
    order: AppointmentOrder,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(owner) = filter.owner_id {
        values.push(owner.to_string());
        clauses.push(format!("user_id = ?{}", values.len()));
    }
    if let Some(status) = filter.status {
        values.push(status.as_str().to_string());
        clauses.push(format!("status = ?{}", values.len()));
    }
    if let Some(from) = filter.date_from {
        values.push(from.format("%Y-%m-%d").to_string());
        clauses.push(format!("appointment_date >= ?{}", values.len()));
    }
    if let Some(to) = filter.date_to {
        values.push(to.format("%Y-%m-%d").to_string());
        clauses.push(format!("appointment_date <= ?{}", values.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };
    let order_sql = match order {
        AppointmentOrder::Chronological => "ORDER BY appointment_date ASC, appointment_time ASC",
        AppointmentOrder::RecentlyCreated => "ORDER BY created_at DESC",
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments {where_sql} {order_sql}"
    ))?;
    let rows = stmt.query_map(params_from_iter(values.iter()), appointment_row_from_rusqlite)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}

struct AppointmentRow {
    id: String,
    user_id: Option<String>,
    full_name: String,
    service_type: String,
    appointment_date: String,
    appointment_time: String,
    status: String,
    notes: Option<String>,
    created_at: String,
}

fn appointment_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        full_name: row.get(2)?,
        service_type: row.get(3)?,
        appointment_date: row.get(4)?,
        appointment_time: row.get(5)?,
        status: row.get(6)?,
        notes: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: parse_uuid("appointments.id", &row.id)?,
        owner_id: row
            .user_id
            .as_deref()
            .map(|raw| parse_uuid("appointments.user_id", raw))
            .transpose()?,
        full_name: row.full_name,
        service_type: ServiceType::from_str(&row.service_type)?,
        date: parse_day("appointments.appointment_date", &row.appointment_date)?,
        time: row.appointment_time,
        status: AppointmentStatus::from_str(&row.status)?,
        notes: row.notes,
        created_at: parse_timestamp("appointments.created_at", &row.created_at)?,
    })
}
