use chrono::Utc;
use query_core::{ParamMap, RelationSpec, ResultEnvelope};
use tracing::{debug, info, instrument};

use super::{ensure_owner, new_id, Service};
use crate::contract::model::{default_photo, Bootcamp, BootcampPatch, NewBootcamp, User};
use crate::domain::error::DomainError;
use crate::domain::slug::slugify;
use crate::domain::validation::{
    Violations, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_PHONE_LEN,
};

const BOOTCAMP: &str = "Bootcamp";

impl Service {
    /// Bootcamp listing with each bootcamp's courses embedded.
    #[instrument(name = "devcamper.service.list_bootcamps", skip(self, params))]
    pub async fn list_bootcamps(&self, params: &ParamMap) -> Result<ResultEnvelope, DomainError> {
        debug!("Listing bootcamps");
        let populate = RelationSpec::path("courses");
        let page = self
            .repos
            .bootcamps
            .list(params, Some(&populate), &self.config.translator)
            .await?;
        debug!("Listed {} bootcamps", page.count);
        Ok(page)
    }

    #[instrument(name = "devcamper.service.get_bootcamp", skip(self), fields(bootcamp_id = %id))]
    pub async fn get_bootcamp(&self, id: &str) -> Result<Bootcamp, DomainError> {
        debug!("Getting bootcamp by id");
        self.repos
            .bootcamps
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(BOOTCAMP, id))
    }

    #[instrument(
        name = "devcamper.service.create_bootcamp",
        skip(self, actor, input),
        fields(user_id = %actor.id, name = %input.name)
    )]
    pub async fn create_bootcamp(
        &self,
        actor: &User,
        input: NewBootcamp,
    ) -> Result<Bootcamp, DomainError> {
        info!("Creating new bootcamp");

        let mut v = Violations::new();
        check_name(&mut v, &input.name);
        check_description(&mut v, &input.description);
        v.required(&input.address, "address", "Please add an address");
        check_contact(&mut v, input.website.as_deref(), input.phone.as_deref(), input.email.as_deref());
        let careers = v.careers(&input.careers);
        v.into_result()?;

        let location = self.geocoder.geocode(&input.address).await?;

        let bootcamp = Bootcamp {
            id: new_id(),
            slug: slugify(&input.name),
            name: input.name,
            description: input.description,
            website: input.website,
            phone: input.phone,
            email: input.email,
            location: Some(location),
            careers,
            average_rating: None,
            average_cost: None,
            photo: default_photo(),
            housing: input.housing,
            job_assistance: input.job_assistance,
            job_guarantee: input.job_guarantee,
            accept_gi: input.accept_gi,
            user: Some(actor.id.clone()),
            created_at: Utc::now(),
        };

        let stored = self.repos.bootcamps.insert(bootcamp).await?;
        info!("Successfully created bootcamp with id={}", stored.id);
        Ok(stored)
    }

    #[instrument(
        name = "devcamper.service.update_bootcamp",
        skip(self, actor, patch),
        fields(bootcamp_id = %id, user_id = %actor.id)
    )]
    pub async fn update_bootcamp(
        &self,
        actor: &User,
        id: &str,
        patch: BootcampPatch,
    ) -> Result<Bootcamp, DomainError> {
        info!("Updating bootcamp");

        let mut current = self.get_bootcamp(id).await?;
        ensure_owner(actor, current.user.as_deref(), "update this bootcamp")?;

        let mut v = Violations::new();
        if let Some(name) = &patch.name {
            check_name(&mut v, name);
        }
        if let Some(description) = &patch.description {
            check_description(&mut v, description);
        }
        if let Some(address) = &patch.address {
            v.required(address, "address", "Please add an address");
        }
        check_contact(&mut v, patch.website.as_deref(), patch.phone.as_deref(), patch.email.as_deref());
        let careers = patch.careers.as_deref().map(|c| v.careers(c));
        v.into_result()?;

        if let Some(address) = &patch.address {
            current.location = Some(self.geocoder.geocode(address).await?);
        }
        if let Some(name) = patch.name {
            current.slug = slugify(&name);
            current.name = name;
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if patch.website.is_some() {
            current.website = patch.website;
        }
        if patch.phone.is_some() {
            current.phone = patch.phone;
        }
        if patch.email.is_some() {
            current.email = patch.email;
        }
        if let Some(careers) = careers {
            current.careers = careers;
        }
        if let Some(housing) = patch.housing {
            current.housing = housing;
        }
        if let Some(job_assistance) = patch.job_assistance {
            current.job_assistance = job_assistance;
        }
        if let Some(job_guarantee) = patch.job_guarantee {
            current.job_guarantee = job_guarantee;
        }
        if let Some(accept_gi) = patch.accept_gi {
            current.accept_gi = accept_gi;
        }

        let updated = self
            .repos
            .bootcamps
            .update(current)
            .await?
            .ok_or_else(|| DomainError::not_found(BOOTCAMP, id))?;
        info!("Successfully updated bootcamp");
        Ok(updated)
    }

    /// Deletes the bootcamp together with its courses and reviews.
    #[instrument(
        name = "devcamper.service.delete_bootcamp",
        skip(self, actor),
        fields(bootcamp_id = %id, user_id = %actor.id)
    )]
    pub async fn delete_bootcamp(&self, actor: &User, id: &str) -> Result<(), DomainError> {
        info!("Deleting bootcamp");

        let current = self.get_bootcamp(id).await?;
        ensure_owner(actor, current.user.as_deref(), "delete this bootcamp")?;

        let courses = self.repos.courses.delete_by_bootcamp(id).await?;
        let reviews = self.repos.reviews.delete_by_bootcamp(id).await?;
        if !self.repos.bootcamps.delete(id).await? {
            return Err(DomainError::not_found(BOOTCAMP, id));
        }

        info!(courses, reviews, "Successfully deleted bootcamp");
        Ok(())
    }

    /// Bootcamps within `distance` miles of the geocoded `zipcode`.
    #[instrument(name = "devcamper.service.bootcamps_in_radius", skip(self))]
    pub async fn bootcamps_in_radius(
        &self,
        zipcode: &str,
        distance: &str,
    ) -> Result<Vec<Bootcamp>, DomainError> {
        debug!("Searching bootcamps by radius");

        let miles = distance
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| {
                DomainError::validation("distance", "Please provide a distance in miles")
            })?;

        let loc = self.geocoder.geocode(zipcode).await?;
        let center = loc
            .lng_lat()
            .ok_or_else(|| DomainError::geocoder("geocoder returned no coordinates"))?;

        let radians = docstore::geo::miles_to_radians(miles);
        let found = self.repos.bootcamps.within_radius(center, radians).await?;
        debug!("Found {} bootcamps within {} miles", found.len(), miles);
        Ok(found)
    }
}

fn check_name(v: &mut Violations, name: &str) {
    v.required(name, "name", "Please add a name");
    v.max_len(
        name,
        MAX_NAME_LEN,
        "name",
        "Name can not be more than 50 characters",
    );
}

fn check_description(v: &mut Violations, description: &str) {
    v.required(description, "description", "Please add a description");
    v.max_len(
        description,
        MAX_DESCRIPTION_LEN,
        "description",
        "Description can not be more than 500 characters",
    );
}

fn check_contact(v: &mut Violations, website: Option<&str>, phone: Option<&str>, email: Option<&str>) {
    v.website(website);
    if let Some(phone) = phone {
        v.max_len(
            phone,
            MAX_PHONE_LEN,
            "phone",
            "Phone number can not be longer than 20 characters",
        );
    }
    if let Some(email) = email {
        v.email(email);
    }
}
