use chrono::Utc;
use query_core::{ParamMap, RelationSpec, ResultEnvelope};
use tracing::{debug, info, instrument};

use super::{ensure_owner, new_id, Service};
use crate::contract::model::{BootcampLink, NewReview, Review, ReviewPatch, User};
use crate::domain::aggregate::average_rating;
use crate::domain::error::DomainError;
use crate::domain::validation::{Violations, MAX_REVIEW_TITLE_LEN};

const REVIEW: &str = "Review";

/// Listings embed only the bootcamp name.
fn bootcamp_name() -> RelationSpec {
    RelationSpec::select("bootcamp", "name")
}

fn bootcamp_summary() -> RelationSpec {
    RelationSpec::select("bootcamp", "name description")
}

impl Service {
    #[instrument(name = "devcamper.service.list_reviews", skip(self, params))]
    pub async fn list_reviews(&self, params: &ParamMap) -> Result<ResultEnvelope, DomainError> {
        debug!("Listing reviews");
        let populate = bootcamp_name();
        let page = self
            .repos
            .reviews
            .list(params, Some(&populate), &self.config.translator)
            .await?;
        debug!("Listed {} reviews", page.count);
        Ok(page)
    }

    #[instrument(name = "devcamper.service.bootcamp_reviews", skip(self))]
    pub async fn bootcamp_reviews(&self, bootcamp_id: &str) -> Result<Vec<Review>, DomainError> {
        debug!("Listing reviews of bootcamp");
        self.get_bootcamp(bootcamp_id).await?;
        Ok(self.repos.reviews.list_by_bootcamp(bootcamp_id).await?)
    }

    #[instrument(name = "devcamper.service.get_review", skip(self), fields(review_id = %id))]
    pub async fn get_review(&self, id: &str) -> Result<Review, DomainError> {
        debug!("Getting review by id");
        let populate = bootcamp_summary();
        self.repos
            .reviews
            .find_by_id(id, Some(&populate))
            .await?
            .ok_or_else(|| DomainError::not_found(REVIEW, id))
    }

    /// One review per user and bootcamp.
    #[instrument(
        name = "devcamper.service.create_review",
        skip(self, actor, input),
        fields(bootcamp_id = %bootcamp_id, user_id = %actor.id)
    )]
    pub async fn create_review(
        &self,
        actor: &User,
        bootcamp_id: &str,
        input: NewReview,
    ) -> Result<Review, DomainError> {
        info!("Creating new review");

        let bootcamp = self.get_bootcamp(bootcamp_id).await?;
        if self
            .repos
            .reviews
            .find_by_bootcamp_and_user(&bootcamp.id, &actor.id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyReviewed {
                bootcamp_id: bootcamp.id,
            });
        }

        let mut v = Violations::new();
        check_title(&mut v, &input.title);
        v.required(&input.text, "text", "Please add some text");
        v.rating(input.rating);
        v.into_result()?;
        let Some(rating) = input.rating else {
            return Err(DomainError::validation("rating", "Please add a rating between 1-10"));
        };

        let review = Review {
            id: new_id(),
            title: input.title.trim().to_string(),
            text: input.text,
            rating,
            bootcamp: BootcampLink::Id(bootcamp.id.clone()),
            user: actor.id.clone(),
            created_at: Utc::now(),
        };

        let stored = self.repos.reviews.insert(review).await?;
        self.refresh_average_rating(&bootcamp.id).await?;
        info!("Successfully created review with id={}", stored.id);
        Ok(stored)
    }

    #[instrument(
        name = "devcamper.service.update_review",
        skip(self, actor, patch),
        fields(review_id = %id, user_id = %actor.id)
    )]
    pub async fn update_review(
        &self,
        actor: &User,
        id: &str,
        patch: ReviewPatch,
    ) -> Result<Review, DomainError> {
        info!("Updating review");

        let mut current = self
            .repos
            .reviews
            .find_by_id(id, None)
            .await?
            .ok_or_else(|| DomainError::not_found(REVIEW, id))?;
        ensure_owner(actor, Some(&current.user), "update this review")?;

        let mut v = Violations::new();
        if let Some(title) = &patch.title {
            check_title(&mut v, title);
        }
        if let Some(text) = &patch.text {
            v.required(text, "text", "Please add some text");
        }
        if patch.rating.is_some() {
            v.rating(patch.rating);
        }
        v.into_result()?;

        if let Some(title) = patch.title {
            current.title = title.trim().to_string();
        }
        if let Some(text) = patch.text {
            current.text = text;
        }
        if let Some(rating) = patch.rating {
            current.rating = rating;
        }

        let bootcamp_id = current.bootcamp.id().map(str::to_string);
        let updated = self
            .repos
            .reviews
            .update(current)
            .await?
            .ok_or_else(|| DomainError::not_found(REVIEW, id))?;
        if let Some(bootcamp_id) = bootcamp_id {
            self.refresh_average_rating(&bootcamp_id).await?;
        }
        info!("Successfully updated review");
        Ok(updated)
    }

    #[instrument(
        name = "devcamper.service.delete_review",
        skip(self, actor),
        fields(review_id = %id, user_id = %actor.id)
    )]
    pub async fn delete_review(&self, actor: &User, id: &str) -> Result<(), DomainError> {
        info!("Deleting review");

        let current = self
            .repos
            .reviews
            .find_by_id(id, None)
            .await?
            .ok_or_else(|| DomainError::not_found(REVIEW, id))?;
        ensure_owner(actor, Some(&current.user), "delete this review")?;

        if !self.repos.reviews.delete(id).await? {
            return Err(DomainError::not_found(REVIEW, id));
        }
        if let Some(bootcamp_id) = current.bootcamp.id() {
            self.refresh_average_rating(bootcamp_id).await?;
        }
        info!("Successfully deleted review");
        Ok(())
    }

    /// Recompute `averageRating` of a bootcamp from its remaining reviews.
    #[instrument(name = "devcamper.service.refresh_average_rating", skip(self))]
    pub async fn refresh_average_rating(&self, bootcamp_id: &str) -> Result<(), DomainError> {
        let ratings: Vec<f64> = self
            .repos
            .reviews
            .list_by_bootcamp(bootcamp_id)
            .await?
            .iter()
            .map(|r| r.rating)
            .collect();
        let rating = average_rating(&ratings);
        debug!(?rating, reviews = ratings.len(), "average rating");
        self.repos
            .bootcamps
            .set_average_rating(bootcamp_id, rating)
            .await?;
        Ok(())
    }
}

fn check_title(v: &mut Violations, title: &str) {
    v.required(title, "title", "Please add a title for the review");
    v.max_len(
        title,
        MAX_REVIEW_TITLE_LEN,
        "title",
        "Title can not be more than 100 characters",
    );
}
