use serde::Serialize;

/// Fila de la tabla `contacts`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ContactRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub preferred_contact: Option<String>,
    pub preferred_time: Option<String>,
    pub raw: String, // body original tal cual llegó
    pub created_at: String,
}

/// Fila de la tabla `tours`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TourRecord {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub tour_type: Option<String>,
    pub location: Option<String>,
    pub preferred_date: Option<String>,
    pub preferred_time: Option<String>,
    pub relationship: Option<String>,
    pub current_situation: Option<String>,
    pub timeline: Option<String>,
    pub special_needs: Option<String>,
    pub hear_about_us: Option<String>,
    pub marketing_consent: bool,
    pub raw: String,
    pub created_at: String,
}
