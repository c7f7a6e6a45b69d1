use chrono::Utc;
use query_core::{ParamMap, RelationSpec, ResultEnvelope};
use tracing::{debug, info, instrument};

use super::{ensure_owner, new_id, Service};
use crate::contract::model::{BootcampLink, Course, CoursePatch, NewCourse, User};
use crate::domain::aggregate::average_cost;
use crate::domain::error::DomainError;
use crate::domain::validation::Violations;

const COURSE: &str = "Course";

fn bootcamp_summary() -> RelationSpec {
    RelationSpec::select("bootcamp", "name description")
}

impl Service {
    /// Course listing with each course's bootcamp name and description.
    #[instrument(name = "devcamper.service.list_courses", skip(self, params))]
    pub async fn list_courses(&self, params: &ParamMap) -> Result<ResultEnvelope, DomainError> {
        debug!("Listing courses");
        let populate = bootcamp_summary();
        let page = self
            .repos
            .courses
            .list(params, Some(&populate), &self.config.translator)
            .await?;
        debug!("Listed {} courses", page.count);
        Ok(page)
    }

    #[instrument(name = "devcamper.service.bootcamp_courses", skip(self))]
    pub async fn bootcamp_courses(&self, bootcamp_id: &str) -> Result<Vec<Course>, DomainError> {
        debug!("Listing courses of bootcamp");
        self.get_bootcamp(bootcamp_id).await?;
        Ok(self.repos.courses.list_by_bootcamp(bootcamp_id).await?)
    }

    #[instrument(name = "devcamper.service.get_course", skip(self), fields(course_id = %id))]
    pub async fn get_course(&self, id: &str) -> Result<Course, DomainError> {
        debug!("Getting course by id");
        let populate = bootcamp_summary();
        self.repos
            .courses
            .find_by_id(id, Some(&populate))
            .await?
            .ok_or_else(|| DomainError::not_found(COURSE, id))
    }

    #[instrument(
        name = "devcamper.service.create_course",
        skip(self, actor, input),
        fields(bootcamp_id = %bootcamp_id, user_id = %actor.id)
    )]
    pub async fn create_course(
        &self,
        actor: &User,
        bootcamp_id: &str,
        input: NewCourse,
    ) -> Result<Course, DomainError> {
        info!("Creating new course");

        let bootcamp = self.get_bootcamp(bootcamp_id).await?;
        ensure_owner(
            actor,
            bootcamp.user.as_deref(),
            &format!("add a course to bootcamp {bootcamp_id}"),
        )?;

        let mut v = Violations::new();
        v.required(&input.title, "title", "Please add a course title");
        v.required(&input.description, "description", "Please add a description");
        v.required(&input.weeks, "weeks", "Please add number of weeks");
        check_tuition(&mut v, input.tuition, true);
        let skill = v.minimum_skill(&input.minimum_skill);
        v.into_result()?;

        let (Some(tuition), Some(minimum_skill)) = (input.tuition, skill) else {
            return Err(DomainError::validation("tuition", "Please add a tuition cost"));
        };

        let course = Course {
            id: new_id(),
            title: input.title.trim().to_string(),
            description: input.description,
            weeks: input.weeks,
            tuition,
            minimum_skill,
            scholarship_available: input.scholarship_available,
            bootcamp: BootcampLink::Id(bootcamp.id.clone()),
            user: Some(actor.id.clone()),
            created_at: Utc::now(),
        };

        let stored = self.repos.courses.insert(course).await?;
        self.refresh_average_cost(&bootcamp.id).await?;
        info!("Successfully created course with id={}", stored.id);
        Ok(stored)
    }

    #[instrument(
        name = "devcamper.service.update_course",
        skip(self, actor, patch),
        fields(course_id = %id, user_id = %actor.id)
    )]
    pub async fn update_course(
        &self,
        actor: &User,
        id: &str,
        patch: CoursePatch,
    ) -> Result<Course, DomainError> {
        info!("Updating course");

        let mut current = self
            .repos
            .courses
            .find_by_id(id, None)
            .await?
            .ok_or_else(|| DomainError::not_found(COURSE, id))?;
        ensure_owner(actor, current.user.as_deref(), "update this course")?;

        let mut v = Violations::new();
        if let Some(title) = &patch.title {
            v.required(title, "title", "Please add a course title");
        }
        if let Some(description) = &patch.description {
            v.required(description, "description", "Please add a description");
        }
        if let Some(weeks) = &patch.weeks {
            v.required(weeks, "weeks", "Please add number of weeks");
        }
        check_tuition(&mut v, patch.tuition, false);
        let skill = patch.minimum_skill.as_deref().map(|s| v.minimum_skill(s));
        v.into_result()?;

        if let Some(title) = patch.title {
            current.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if let Some(weeks) = patch.weeks {
            current.weeks = weeks;
        }
        if let Some(tuition) = patch.tuition {
            current.tuition = tuition;
        }
        if let Some(Some(skill)) = skill {
            current.minimum_skill = skill;
        }
        if let Some(scholarship) = patch.scholarship_available {
            current.scholarship_available = scholarship;
        }

        let bootcamp_id = current.bootcamp.id().map(str::to_string);
        let updated = self
            .repos
            .courses
            .update(current)
            .await?
            .ok_or_else(|| DomainError::not_found(COURSE, id))?;
        if let Some(bootcamp_id) = bootcamp_id {
            self.refresh_average_cost(&bootcamp_id).await?;
        }
        info!("Successfully updated course");
        Ok(updated)
    }

    #[instrument(
        name = "devcamper.service.delete_course",
        skip(self, actor),
        fields(course_id = %id, user_id = %actor.id)
    )]
    pub async fn delete_course(&self, actor: &User, id: &str) -> Result<(), DomainError> {
        info!("Deleting course");

        let current = self
            .repos
            .courses
            .find_by_id(id, None)
            .await?
            .ok_or_else(|| DomainError::not_found(COURSE, id))?;
        ensure_owner(actor, current.user.as_deref(), "delete this course")?;

        if !self.repos.courses.delete(id).await? {
            return Err(DomainError::not_found(COURSE, id));
        }
        if let Some(bootcamp_id) = current.bootcamp.id() {
            self.refresh_average_cost(bootcamp_id).await?;
        }
        info!("Successfully deleted course");
        Ok(())
    }

    /// Recompute `averageCost` of a bootcamp from its remaining courses.
    #[instrument(name = "devcamper.service.refresh_average_cost", skip(self))]
    pub async fn refresh_average_cost(&self, bootcamp_id: &str) -> Result<(), DomainError> {
        let tuitions: Vec<f64> = self
            .repos
            .courses
            .list_by_bootcamp(bootcamp_id)
            .await?
            .iter()
            .map(|c| c.tuition)
            .collect();
        let cost = average_cost(&tuitions);
        debug!(?cost, courses = tuitions.len(), "average cost");
        self.repos
            .bootcamps
            .set_average_cost(bootcamp_id, cost)
            .await?;
        Ok(())
    }
}

fn check_tuition(v: &mut Violations, tuition: Option<f64>, required: bool) {
    match tuition {
        None if required => v.push("tuition", "Please add a tuition cost"),
        None => {}
        Some(t) => v.check(
            t.is_finite() && t >= 0.0,
            "tuition",
            "Tuition must be a non-negative number",
        ),
    }
}

