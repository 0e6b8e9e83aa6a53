use std::str::FromStr;

use rusqlite::{params, params_from_iter, Connection};

use crate::db::DatabaseError;
use crate::models::*;

use super::{parse_rating, parse_timestamp, parse_uuid, DATETIME_FORMAT};

/// Insert a review. A second review for the same (appointment, owner)
/// fails with `ConstraintViolation`.
pub fn insert_review(conn: &Connection, review: &Review) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reviews (id, appointment_id, user_id, barber_name, service_type,
         rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            review.id.to_string(),
            review.appointment_id.to_string(),
            review.owner_id.to_string(),
            review.barber_name,
            review.service_type.as_str(),
            review.rating as i64,
            review.comment,
            review.created_at.format(DATETIME_FORMAT).to_string(),
        ],
    )
    .map_err(DatabaseError::from_write)?;
    Ok(())
}

/// Reviews matching `filter`, newest first.
pub fn query_reviews(conn: &Connection, filter: &ReviewFilter) -> Result<Vec<Review>, DatabaseError> {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(appointment_id) = filter.appointment_id {
        values.push(appointment_id.to_string());
        clauses.push(format!("appointment_id = ?{}", values.len()));
    }
    if let Some(owner_id) = filter.owner_id {
        values.push(owner_id.to_string());
        clauses.push(format!("user_id = ?{}", values.len()));
    }
    if let Some(service) = filter.service_type {
        values.push(service.as_str().to_string());
        clauses.push(format!("service_type = ?{}", values.len()));
    }
    if let Some(barber) = &filter.barber_name {
        values.push(barber.clone());
        clauses.push(format!("barber_name = ?{}", values.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT id, appointment_id, user_id, barber_name, service_type, rating, comment, created_at
         FROM reviews {where_sql} ORDER BY created_at DESC"
    ))?;

    let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
        Ok(ReviewRow {
            id: row.get(0)?,
            appointment_id: row.get(1)?,
            user_id: row.get(2)?,
            barber_name: row.get(3)?,
            service_type: row.get(4)?,
            rating: row.get(5)?,
            comment: row.get(6)?,
            created_at: row.get(7)?,
        })
    })?;

    let mut reviews = Vec::new();
    for row in rows {
        reviews.push(review_from_row(row?)?);
    }
    Ok(reviews)
}

struct ReviewRow {
    id: String,
    appointment_id: String,
    user_id: String,
    barber_name: String,
    service_type: String,
    rating: i64,
    comment: Option<String>,
    created_at: String,
}

fn review_from_row(row: ReviewRow) -> Result<Review, DatabaseError> {
    Ok(Review {
        id: parse_uuid("reviews.id", &row.id)?,
        appointment_id: parse_uuid("reviews.appointment_id", &row.appointment_id)?,
        owner_id: parse_uuid("reviews.user_id", &row.user_id)?,
        barber_name: row.barber_name,
        service_type: ServiceType::from_str(&row.service_type)?,
        rating: parse_rating(row.rating)?,
        comment: row.comment,
        created_at: parse_timestamp("reviews.created_at", &row.created_at)?,
    })
}
