use crate::domain::error::{DomainError, DomainResult, EntityKind};
use crate::domain::repo::AcademicRepo;
use crate::models::{Course, Subject, Teacher};

/// Teacher and subject records resolved during course-assignment validation.
/// Callers reuse them when persisting instead of re-fetching.
#[derive(Debug)]
pub struct ResolvedAssignment {
    pub teacher: Teacher,
    /// Present only when the caller supplied a new subject id. A teacher-only
    /// update checks qualification against the course's stored subject without
    /// re-resolving the subject record.
    pub subject: Option<Subject>,
}

/// Stateless validation passes over externally-fetched snapshots.
///
/// Every operation is read-only; violations come back as [`DomainError`]
/// values and store faults propagate through the `Infrastructure` variant.
pub struct AssignmentValidator<'a, R: AcademicRepo + ?Sized> {
    repo: &'a R,
}

impl<'a, R: AcademicRepo + ?Sized> AssignmentValidator<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        Self { repo }
    }

    /// Validate that `teacher_id` may be assigned to teach a course.
    ///
    /// `subject_id` is the new subject when the caller is setting one;
    /// `current_course` is the pre-update record when an update omits a field.
    /// The effective subject for the qualification check is the new id if
    /// supplied, else the current course's subject, else none (teacher-only
    /// update with no course context skips the check).
    pub async fn validate_course_assignment(
        &self,
        teacher_id: &str,
        subject_id: Option<&str>,
        current_course: Option<&Course>,
    ) -> DomainResult<ResolvedAssignment> {
        let teacher = self.require_active_teacher(teacher_id).await?;

        let subject = match subject_id {
            Some(id) => Some(self.require_active_subject(id).await?),
            None => None,
        };

        let effective_subject_id = subject_id
            .map(str::to_string)
            .or_else(|| current_course.map(|course| course.subject_id.clone()));

        if let Some(effective) = effective_subject_id {
            if !teacher.subjects.iter().any(|s| s == &effective) {
                return Err(DomainError::UnqualifiedTeacher {
                    teacher_id: teacher.id.clone(),
                    subject_id: effective,
                });
            }
        }

        Ok(ResolvedAssignment { teacher, subject })
    }

    /// Check code uniqueness within one entity kind; codes in different kinds
    /// never collide. Returns the uppercase-normalized code for persistence.
    /// `existing_id` allows a record to resubmit its own code on update.
    pub async fn validate_unique_code(
        &self,
        kind: EntityKind,
        code: &str,
        existing_id: Option<&str>,
    ) -> DomainResult<String> {
        let normalized = code.trim().to_uppercase();

        let conflicting_id = match kind {
            EntityKind::Subject => self.repo.subject_by_code(&normalized).await?.map(|s| s.id),
            EntityKind::Course => self.repo.course_by_code(&normalized).await?.map(|c| c.id),
            // Teachers carry no code; their unique key is the email.
            EntityKind::Teacher => None,
        };

        if let Some(found) = conflicting_id {
            if existing_id != Some(found.as_str()) {
                return Err(DomainError::DuplicateCode {
                    kind,
                    code: normalized,
                });
            }
        }

        Ok(normalized)
    }

    /// Email counterpart of [`validate_unique_code`]: lowercase-normalized,
    /// scoped to teachers. Returns the normalized email.
    pub async fn validate_unique_email(
        &self,
        email: &str,
        existing_id: Option<&str>,
    ) -> DomainResult<String> {
        let normalized = email.trim().to_lowercase();

        if let Some(found) = self.repo.teacher_by_email(&normalized).await? {
            if existing_id != Some(found.id.as_str()) {
                return Err(DomainError::DuplicateEmail { email: normalized });
            }
        }

        Ok(normalized)
    }

    /// Validate adding a subject to a teacher's qualified set. Returns the
    /// appended set; the caller persists it. The set is unchanged on failure.
    pub async fn assign_subject_to_teacher(
        &self,
        teacher_id: &str,
        subject_id: &str,
    ) -> DomainResult<Vec<String>> {
        let teacher = self.require_active_teacher(teacher_id).await?;
        self.require_active_subject(subject_id).await?;

        if teacher.subjects.iter().any(|s| s == subject_id) {
            return Err(DomainError::AlreadyAssigned {
                teacher_id: teacher.id.clone(),
                subject_id: subject_id.to_string(),
            });
        }

        let mut subjects = teacher.subjects;
        subjects.push(subject_id.to_string());
        Ok(subjects)
    }

    /// Every id in a qualified-subjects list must resolve to an active subject.
    /// Used when a teacher is created or updated with a full subject list.
    pub async fn validate_subject_set(&self, subject_ids: &[String]) -> DomainResult<Vec<Subject>> {
        let mut subjects = Vec::with_capacity(subject_ids.len());
        for id in subject_ids {
            subjects.push(self.require_active_subject(id).await?);
        }
        Ok(subjects)
    }

    async fn require_active_teacher(&self, id: &str) -> DomainResult<Teacher> {
        let teacher =
            self.repo
                .teacher_by_id(id)
                .await?
                .ok_or_else(|| DomainError::NotFound {
                    kind: EntityKind::Teacher,
                    id: id.to_string(),
                })?;
        if !teacher.is_active {
            return Err(DomainError::Inactive {
                kind: EntityKind::Teacher,
                id: id.to_string(),
            });
        }
        Ok(teacher)
    }

    async fn require_active_subject(&self, id: &str) -> DomainResult<Subject> {
        let subject =
            self.repo
                .subject_by_id(id)
                .await?
                .ok_or_else(|| DomainError::NotFound {
                    kind: EntityKind::Subject,
                    id: id.to_string(),
                })?;
        if !subject.is_active {
            return Err(DomainError::Inactive {
                kind: EntityKind::Subject,
                id: id.to_string(),
            });
        }
        Ok(subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::error::AppResult;
    use crate::models::DEFAULT_MAX_STUDENTS;

    #[derive(Default)]
    struct FakeRepo {
        teachers: HashMap<String, Teacher>,
        subjects: HashMap<String, Subject>,
        courses: HashMap<String, Course>,
    }

    impl FakeRepo {
        fn with_teacher(mut self, teacher: Teacher) -> Self {
            self.teachers.insert(teacher.id.clone(), teacher);
            self
        }

        fn with_subject(mut self, subject: Subject) -> Self {
            self.subjects.insert(subject.id.clone(), subject);
            self
        }

        fn with_course(mut self, course: Course) -> Self {
            self.courses.insert(course.id.clone(), course);
            self
        }
    }

    #[async_trait]
    impl AcademicRepo for FakeRepo {
        async fn teacher_by_id(&self, id: &str) -> AppResult<Option<Teacher>> {
            Ok(self.teachers.get(id).cloned())
        }

        async fn subject_by_id(&self, id: &str) -> AppResult<Option<Subject>> {
            Ok(self.subjects.get(id).cloned())
        }

        async fn course_by_id(&self, id: &str) -> AppResult<Option<Course>> {
            Ok(self.courses.get(id).cloned())
        }

        async fn teacher_by_email(&self, email: &str) -> AppResult<Option<Teacher>> {
            Ok(self
                .teachers
                .values()
                .find(|t| t.email.eq_ignore_ascii_case(email))
                .cloned())
        }

        async fn subject_by_code(&self, code: &str) -> AppResult<Option<Subject>> {
            Ok(self
                .subjects
                .values()
                .find(|s| s.code.eq_ignore_ascii_case(code))
                .cloned())
        }

        async fn course_by_code(&self, code: &str) -> AppResult<Option<Course>> {
            Ok(self
                .courses
                .values()
                .find(|c| c.code.eq_ignore_ascii_case(code))
                .cloned())
        }
    }

    fn subject(name: &str, code: &str) -> Subject {
        Subject::new(name.to_string(), code.to_string(), None, 5)
    }

    fn teacher(email: &str, subject_ids: Vec<String>) -> Teacher {
        Teacher::new(
            "Test Teacher".to_string(),
            email.to_string(),
            "CS".to_string(),
            subject_ids,
            None,
            3,
        )
    }

    fn course(code: &str, teacher_id: &str, subject_id: &str) -> Course {
        Course::new(
            "Test Course".to_string(),
            code.to_string(),
            None,
            teacher_id.to_string(),
            subject_id.to_string(),
            None,
            DEFAULT_MAX_STUDENTS,
        )
    }

    #[tokio::test]
    async fn qualified_active_pair_passes_and_returns_both_records() {
        let s1 = subject("Algorithms", "CS101");
        let t = teacher("a@example.com", vec![s1.id.clone()]);
        let repo = FakeRepo::default()
            .with_subject(s1.clone())
            .with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let resolved = validator
            .validate_course_assignment(&t.id, Some(&s1.id), None)
            .await
            .unwrap();

        assert_eq!(resolved.teacher.id, t.id);
        assert_eq!(resolved.subject.unwrap().id, s1.id);
    }

    #[tokio::test]
    async fn absent_teacher_fails_regardless_of_subject_state() {
        let s1 = subject("Algorithms", "CS101");
        let repo = FakeRepo::default().with_subject(s1.clone());
        let validator = AssignmentValidator::new(&repo);

        let err = validator
            .validate_course_assignment("missing", Some(&s1.id), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::NotFound {
                kind: EntityKind::Teacher,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn inactive_teacher_fails_even_when_qualified() {
        let s1 = subject("Algorithms", "CS101");
        let mut t = teacher("a@example.com", vec![s1.id.clone()]);
        t.is_active = false;
        let repo = FakeRepo::default()
            .with_subject(s1.clone())
            .with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let err = validator
            .validate_course_assignment(&t.id, Some(&s1.id), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Inactive {
                kind: EntityKind::Teacher,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn inactive_subject_fails_after_teacher_resolves() {
        let mut s1 = subject("Algorithms", "CS101");
        s1.is_active = false;
        let t = teacher("a@example.com", vec![s1.id.clone()]);
        let repo = FakeRepo::default()
            .with_subject(s1.clone())
            .with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let err = validator
            .validate_course_assignment(&t.id, Some(&s1.id), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::Inactive {
                kind: EntityKind::Subject,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unqualified_teacher_is_rejected() {
        let s1 = subject("Algorithms", "CS101");
        let s2 = subject("Databases", "CS201");
        let t = teacher("a@example.com", vec![s1.id.clone()]);
        let repo = FakeRepo::default()
            .with_subject(s1)
            .with_subject(s2.clone())
            .with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let err = validator
            .validate_course_assignment(&t.id, Some(&s2.id), None)
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::UnqualifiedTeacher { .. }));
    }

    #[tokio::test]
    async fn teacher_only_update_checks_against_current_course_subject() {
        let s1 = subject("Algorithms", "CS101");
        let qualified = teacher("a@example.com", vec![s1.id.clone()]);
        let unqualified = teacher("b@example.com", vec![]);
        let existing = course("CS-101", &qualified.id, &s1.id);
        let repo = FakeRepo::default()
            .with_subject(s1)
            .with_teacher(qualified.clone())
            .with_teacher(unqualified.clone())
            .with_course(existing.clone());
        let validator = AssignmentValidator::new(&repo);

        // The replacement teacher is not qualified for the course's stored subject.
        let err = validator
            .validate_course_assignment(&unqualified.id, None, Some(&existing))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UnqualifiedTeacher { .. }));

        // A qualified replacement passes; no subject record is resolved.
        let resolved = validator
            .validate_course_assignment(&qualified.id, None, Some(&existing))
            .await
            .unwrap();
        assert!(resolved.subject.is_none());
    }

    #[tokio::test]
    async fn teacher_only_update_without_course_context_skips_qualification() {
        let t = teacher("a@example.com", vec![]);
        let repo = FakeRepo::default().with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let resolved = validator
            .validate_course_assignment(&t.id, None, None)
            .await
            .unwrap();
        assert!(resolved.subject.is_none());
    }

    #[tokio::test]
    async fn duplicate_code_check_is_case_insensitive() {
        let s1 = subject("Algorithms", "CS101");
        let repo = FakeRepo::default().with_subject(s1);
        let validator = AssignmentValidator::new(&repo);

        let err = validator
            .validate_unique_code(EntityKind::Subject, "cs101", None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DomainError::DuplicateCode {
                kind: EntityKind::Subject,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn resubmitting_own_code_on_update_is_a_no_op() {
        let s1 = subject("Algorithms", "CS101");
        let repo = FakeRepo::default().with_subject(s1.clone());
        let validator = AssignmentValidator::new(&repo);

        let normalized = validator
            .validate_unique_code(EntityKind::Subject, "cs101", Some(&s1.id))
            .await
            .unwrap();
        assert_eq!(normalized, "CS101");
    }

    #[tokio::test]
    async fn code_uniqueness_is_scoped_per_entity_kind() {
        let s1 = subject("Algorithms", "CS-101");
        let repo = FakeRepo::default().with_subject(s1);
        let validator = AssignmentValidator::new(&repo);

        // A course may reuse a subject's code: different kind, no collision.
        let normalized = validator
            .validate_unique_code(EntityKind::Course, "CS-101", None)
            .await
            .unwrap();
        assert_eq!(normalized, "CS-101");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_but_own_email_is_not() {
        let t = teacher("ada@example.com", vec![]);
        let repo = FakeRepo::default().with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let err = validator
            .validate_unique_email("Ada@Example.com", None)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateEmail { .. }));

        let normalized = validator
            .validate_unique_email("Ada@Example.com", Some(&t.id))
            .await
            .unwrap();
        assert_eq!(normalized, "ada@example.com");
    }

    #[tokio::test]
    async fn assignment_appends_without_persisting() {
        let s1 = subject("Algorithms", "CS101");
        let s2 = subject("Databases", "CS201");
        let t = teacher("a@example.com", vec![s1.id.clone()]);
        let repo = FakeRepo::default()
            .with_subject(s1.clone())
            .with_subject(s2.clone())
            .with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let updated = validator
            .assign_subject_to_teacher(&t.id, &s2.id)
            .await
            .unwrap();
        assert_eq!(updated, vec![s1.id.clone(), s2.id.clone()]);

        // The repository snapshot is untouched; the caller persists.
        assert_eq!(repo.teachers[&t.id].subjects, vec![s1.id]);
    }

    #[tokio::test]
    async fn second_assignment_of_same_pair_is_rejected_with_set_unchanged() {
        let s1 = subject("Algorithms", "CS101");
        let t = teacher("a@example.com", vec![s1.id.clone()]);
        let repo = FakeRepo::default()
            .with_subject(s1.clone())
            .with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let err = validator
            .assign_subject_to_teacher(&t.id, &s1.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyAssigned { .. }));
        assert_eq!(repo.teachers[&t.id].subjects.len(), 1);
    }

    #[tokio::test]
    async fn assignment_to_inactive_subject_is_rejected() {
        let mut s1 = subject("Algorithms", "CS101");
        s1.is_active = false;
        let t = teacher("a@example.com", vec![]);
        let repo = FakeRepo::default()
            .with_subject(s1.clone())
            .with_teacher(t.clone());
        let validator = AssignmentValidator::new(&repo);

        let err = validator
            .assign_subject_to_teacher(&t.id, &s1.id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Inactive {
                kind: EntityKind::Subject,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn subject_set_validation_rejects_unknown_and_inactive_ids() {
        let s1 = subject("Algorithms", "CS101");
        let mut s2 = subject("Databases", "CS201");
        s2.is_active = false;
        let repo = FakeRepo::default()
            .with_subject(s1.clone())
            .with_subject(s2.clone());
        let validator = AssignmentValidator::new(&repo);

        let resolved = validator
            .validate_subject_set(&[s1.id.clone()])
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);

        let err = validator
            .validate_subject_set(&[s1.id.clone(), "missing".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let err = validator
            .validate_subject_set(&[s2.id.clone()])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Inactive { .. }));
    }
}
