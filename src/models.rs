use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub const DEFAULT_MAX_STUDENTS: i64 = 30;
pub const MIN_CREDITS: i64 = 1;
pub const MAX_CREDITS: i64 = 10;

/// Day-of-week for course schedules. Stored as the English day name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Monday" => Some(Weekday::Monday),
            "Tuesday" => Some(Weekday::Tuesday),
            "Wednesday" => Some(Weekday::Wednesday),
            "Thursday" => Some(Weekday::Thursday),
            "Friday" => Some(Weekday::Friday),
            "Saturday" => Some(Weekday::Saturday),
            "Sunday" => Some(Weekday::Sunday),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.day.is_none() && self.time.is_none() && self.room.is_none()
    }
}

/// A subject of study. Codes are stored uppercase; removal is logical only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub credits: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subject {
    pub fn new(name: String, code: String, description: Option<String>, credits: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            code: code.trim().to_uppercase(),
            description,
            credits,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Only supplied fields change; `updated_at` is refreshed.
    pub fn apply(&mut self, update: &SubjectUpdate) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(code) = &update.code {
            self.code = code.trim().to_uppercase();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(credits) = update.credits {
            self.credits = credits;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubject {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub credits: i64,
}

impl CreateSubject {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() || self.code.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Missing required fields: name, code, credits".to_string(),
            ));
        }
        validate_credits(self.credits)
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub credits: Option<i64>,
    pub is_active: Option<bool>,
}

impl SubjectUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(credits) = self.credits {
            validate_credits(credits)?;
        }
        Ok(())
    }
}

fn validate_credits(credits: i64) -> AppResult<()> {
    if !(MIN_CREDITS..=MAX_CREDITS).contains(&credits) {
        return Err(AppError::BadRequest(format!(
            "Credits must be between {} and {}",
            MIN_CREDITS, MAX_CREDITS
        )));
    }
    Ok(())
}

/// A teacher. The `subjects` list holds the ids of subjects this teacher is
/// qualified to teach; it is the authority for course assignment checks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub subjects: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
    pub experience: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Teacher {
    pub fn new(
        name: String,
        email: String,
        department: String,
        subjects: Vec<String>,
        qualification: Option<String>,
        experience: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            department: department.trim().to_string(),
            subjects,
            qualification,
            experience,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: &TeacherUpdate) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(email) = &update.email {
            self.email = email.trim().to_lowercase();
        }
        if let Some(department) = &update.department {
            self.department = department.trim().to_string();
        }
        if let Some(subjects) = &update.subjects {
            self.subjects = subjects.clone();
        }
        if let Some(qualification) = &update.qualification {
            self.qualification = Some(qualification.clone());
        }
        if let Some(experience) = update.experience {
            self.experience = experience;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeacher {
    pub name: String,
    pub email: String,
    pub department: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub qualification: Option<String>,
    #[serde(default)]
    pub experience: Option<i64>,
}

impl CreateTeacher {
    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.department.trim().is_empty()
        {
            return Err(AppError::BadRequest(
                "Missing required fields: name, email, department".to_string(),
            ));
        }
        validate_email(&self.email)?;
        if let Some(experience) = self.experience {
            validate_experience(experience)?;
        }
        Ok(())
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct TeacherUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub qualification: Option<String>,
    pub experience: Option<i64>,
    pub is_active: Option<bool>,
}

impl TeacherUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(experience) = self.experience {
            validate_experience(experience)?;
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> AppResult<()> {
    if email.trim().parse::<email_address::EmailAddress>().is_err() {
        return Err(AppError::BadRequest(format!(
            "Invalid email address: {}",
            email
        )));
    }
    Ok(())
}

fn validate_experience(experience: i64) -> AppResult<()> {
    if experience < 0 {
        return Err(AppError::BadRequest(
            "Experience must not be negative".to_string(),
        ));
    }
    Ok(())
}

/// A course: one teacher teaching one subject, optionally scheduled.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub title: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub teacher_id: String,
    pub subject_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    pub max_students: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        title: String,
        code: String,
        description: Option<String>,
        teacher_id: String,
        subject_id: String,
        schedule: Option<Schedule>,
        max_students: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.trim().to_string(),
            code: code.trim().to_uppercase(),
            description,
            teacher_id,
            subject_id,
            schedule,
            max_students,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: &CourseUpdate) {
        if let Some(title) = &update.title {
            self.title = title.trim().to_string();
        }
        if let Some(code) = &update.code {
            self.code = code.trim().to_uppercase();
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(teacher_id) = &update.teacher {
            self.teacher_id = teacher_id.clone();
        }
        if let Some(subject_id) = &update.subject {
            self.subject_id = subject_id.clone();
        }
        if let Some(schedule) = &update.schedule {
            self.schedule = Some(schedule.clone());
        }
        if let Some(max_students) = update.max_students {
            self.max_students = max_students;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        self.updated_at = Utc::now();
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourse {
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub teacher: String,
    pub subject: String,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub max_students: Option<i64>,
}

impl CreateCourse {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty()
            || self.code.trim().is_empty()
            || self.teacher.trim().is_empty()
            || self.subject.trim().is_empty()
        {
            return Err(AppError::BadRequest(
                "Missing required fields: title, code, teacher, subject".to_string(),
            ));
        }
        validate_max_students(self.max_students.unwrap_or(DEFAULT_MAX_STUDENTS))
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub teacher: Option<String>,
    pub subject: Option<String>,
    pub schedule: Option<Schedule>,
    pub max_students: Option<i64>,
    pub is_active: Option<bool>,
}

impl CourseUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(max_students) = self.max_students {
            validate_max_students(max_students)?;
        }
        Ok(())
    }
}

fn validate_max_students(max_students: i64) -> AppResult<()> {
    if max_students < 1 {
        return Err(AppError::BadRequest(
            "maxStudents must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Filter for course listings.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub active_only: bool,
    pub teacher_id: Option<String>,
    pub subject_id: Option<String>,
}
