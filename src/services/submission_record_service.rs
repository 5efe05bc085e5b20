use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

#[cfg(test)]
use crate::models::record_model::{ContactRecord, TourRecord};
use crate::models::submission_model::{ContactSubmission, Submission, TourSubmission};

/// Persistencia de submissions. Sólo inserta; nunca actualiza ni borra.
#[derive(Clone, Debug)]
pub struct SubmissionRecordService {
    db_pool: Pool<Sqlite>,
}

impl SubmissionRecordService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SubmissionRecordService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db_pool)
            .await
            .context("Failed to run submission migrations")?;
        Ok(())
    }

    /// Inserta la submission junto con el body original. Devuelve el id.
    pub async fn insert(&self, submission: &Submission, raw: &str) -> Result<String> {
        match submission {
            Submission::Contact(contact) => self.insert_contact(contact, raw).await,
            Submission::Tour(tour) => self.insert_tour(tour, raw).await,
        }
    }

    async fn insert_contact(&self, c: &ContactSubmission, raw: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO contacts (
                id, name, email, phone, message,
                preferred_contact, preferred_time, raw, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&id)
        .bind(&c.name)
        .bind(&c.email)
        .bind(&c.phone)
        .bind(&c.message)
        .bind(&c.preferred_contact)
        .bind(&c.preferred_time)
        .bind(raw)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Failed to insert contact")?;

        Ok(id)
    }

    async fn insert_tour(&self, t: &TourSubmission, raw: &str) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO tours (
                id, first_name, last_name, email, phone,
                tour_type, location, preferred_date, preferred_time,
                relationship, current_situation, timeline, special_needs,
                hear_about_us, marketing_consent, raw, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
        )
        .bind(&id)
        .bind(&t.first_name)
        .bind(&t.last_name)
        .bind(&t.email)
        .bind(&t.phone)
        .bind(&t.tour_type)
        .bind(&t.location)
        .bind(&t.preferred_date)
        .bind(&t.preferred_time)
        .bind(&t.relationship)
        .bind(&t.current_situation)
        .bind(&t.timeline)
        .bind(&t.special_needs)
        .bind(&t.hear_about_us)
        .bind(t.marketing_consent)
        .bind(raw)
        .bind(now)
        .execute(&self.db_pool)
        .await
        .context("Failed to insert tour")?;

        Ok(id)
    }
}

// Lecturas: sólo las usan las pruebas, el servicio nunca relee lo guardado.
#[cfg(test)]
impl SubmissionRecordService {
    pub async fn get_contact(&self, id: &str) -> Result<ContactRecord> {
        sqlx::query_as::<_, ContactRecord>(
            r#"
            SELECT id, name, email, phone, message,
                   preferred_contact, preferred_time, raw, created_at
            FROM contacts
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await
        .context("Contact not found")
    }

    pub async fn get_tour(&self, id: &str) -> Result<TourRecord> {
        sqlx::query_as::<_, TourRecord>(
            r#"
            SELECT id, first_name, last_name, email, phone,
                   tour_type, location, preferred_date, preferred_time,
                   relationship, current_situation, timeline, special_needs,
                   hear_about_us, marketing_consent, raw, created_at
            FROM tours
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_one(&self.db_pool)
        .await
        .context("Tour not found")
    }

    /// Contactos más recientes primero.
    pub async fn list_contacts(&self, limit: i64) -> Result<Vec<ContactRecord>> {
        let rows = sqlx::query_as::<_, ContactRecord>(
            r#"
            SELECT id, name, email, phone, message,
                   preferred_contact, preferred_time, raw, created_at
            FROM contacts
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_tours(&self, limit: i64) -> Result<Vec<TourRecord>> {
        let rows = sqlx::query_as::<_, TourRecord>(
            r#"
            SELECT id, first_name, last_name, email, phone,
                   tour_type, location, preferred_date, preferred_time,
                   relationship, current_situation, timeline, special_needs,
                   hear_about_us, marketing_consent, raw, created_at
            FROM tours
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?;
        Ok(rows)
    }
}
