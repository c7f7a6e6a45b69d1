//! Bulk import and removal of fixture data (`bootcamps.json`, `courses.json`,
//! `users.json`, `reviews.json`).

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use docstore::{Collection, Document, MemoryStore, ID_FIELD};
use query_core::{Filter, FindQuery};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::aggregate::{average_cost, average_rating};
use crate::domain::ports::{Geocoder, PasswordHasher};
use crate::domain::slug::slugify;
use crate::infra::storage::{declare_collections, BOOTCAMPS, COURSES, REVIEWS, USERS};

/// Documents touched per collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub bootcamps: u64,
    pub courses: u64,
    pub users: u64,
    pub reviews: u64,
}

impl SeedReport {
    pub fn total(&self) -> u64 {
        self.bootcamps + self.courses + self.users + self.reviews
    }
}

pub struct Seeder {
    store: MemoryStore,
    hasher: Arc<dyn PasswordHasher>,
    geocoder: Option<Arc<dyn Geocoder>>,
}

impl Seeder {
    pub fn new(
        store: MemoryStore,
        hasher: Arc<dyn PasswordHasher>,
        geocoder: Option<Arc<dyn Geocoder>>,
    ) -> Self {
        declare_collections(&store);
        Self {
            store,
            hasher,
            geocoder,
        }
    }

    /// Insert every fixture file found in `dir`. Passwords are hashed,
    /// missing slugs derived, addresses geocoded and bootcamp averages
    /// recomputed afterwards.
    #[instrument(name = "devcamper.seed.import", skip(self), fields(dir = %dir.display()))]
    pub async fn import_dir(&self, dir: &Path) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        for mut doc in read_fixture(dir, BOOTCAMPS)? {
            self.prepare_bootcamp(&mut doc).await?;
            self.insert(BOOTCAMPS, doc).await?;
            report.bootcamps += 1;
        }
        for doc in read_fixture(dir, COURSES)? {
            self.insert(COURSES, doc).await?;
            report.courses += 1;
        }
        for mut doc in read_fixture(dir, USERS)? {
            self.prepare_user(&mut doc)?;
            self.insert(USERS, doc).await?;
            report.users += 1;
        }
        for doc in read_fixture(dir, REVIEWS)? {
            self.insert(REVIEWS, doc).await?;
            report.reviews += 1;
        }

        self.refresh_averages().await?;
        info!(?report, "Data imported");
        Ok(report)
    }

    /// Remove every document from the four collections.
    #[instrument(name = "devcamper.seed.destroy", skip(self))]
    pub async fn destroy(&self) -> Result<SeedReport> {
        let all = Filter::all();
        let report = SeedReport {
            bootcamps: self.handle(BOOTCAMPS)?.delete_many(&all).await?,
            courses: self.handle(COURSES)?.delete_many(&all).await?,
            users: self.handle(USERS)?.delete_many(&all).await?,
            reviews: self.handle(REVIEWS)?.delete_many(&all).await?,
        };
        info!(?report, "Data deleted");
        Ok(report)
    }

    fn handle(&self, name: &str) -> Result<Arc<dyn Collection>> {
        Ok(self.store.handle(name)?)
    }

    async fn insert(&self, collection: &str, doc: Document) -> Result<()> {
        let id = doc.get(ID_FIELD).cloned();
        self.handle(collection)?
            .insert_one(doc)
            .await
            .with_context(|| format!("failed to insert {collection} document {id:?}"))?;
        Ok(())
    }

    async fn prepare_bootcamp(&self, doc: &mut Document) -> Result<()> {
        if !doc.contains_key("slug") {
            if let Some(name) = doc.get("name").and_then(Value::as_str) {
                let slug = slugify(name);
                doc.insert("slug".into(), Value::String(slug));
            }
        }

        let Some(Value::String(address)) = doc.remove("address") else {
            return Ok(());
        };
        if doc.contains_key("location") {
            return Ok(());
        }
        match &self.geocoder {
            Some(geocoder) => {
                let loc = geocoder
                    .geocode(&address)
                    .await
                    .with_context(|| format!("failed to geocode '{address}'"))?;
                doc.insert("location".into(), serde_json::to_value(loc)?);
            }
            None => warn!(%address, "no geocoder configured, bootcamp stored without location"),
        }
        Ok(())
    }

    fn prepare_user(&self, doc: &mut Document) -> Result<()> {
        if let Some(Value::String(plain)) = doc.get("password") {
            let hash = self.hasher.hash(plain)?;
            doc.insert("password".into(), Value::String(hash));
        }
        Ok(())
    }

    async fn refresh_averages(&self) -> Result<()> {
        let bootcamps = self.handle(BOOTCAMPS)?;
        let courses = self.handle(COURSES)?;
        let reviews = self.handle(REVIEWS)?;

        for camp in bootcamps.find(&FindQuery::new(Filter::all())).await? {
            let Some(id) = camp.get(ID_FIELD).and_then(Value::as_str) else {
                continue;
            };
            let by_camp = FindQuery::new(Filter::eq("bootcamp", id));
            let tuitions = numbers(&courses.find(&by_camp).await?, "tuition");
            let ratings = numbers(&reviews.find(&by_camp).await?, "rating");

            let mut patch = Document::new();
            patch.insert("averageCost".into(), to_json(average_cost(&tuitions)));
            patch.insert("averageRating".into(), to_json(average_rating(&ratings)));
            bootcamps.update_by_id(id, patch).await?;
        }
        Ok(())
    }
}

fn to_json(v: Option<f64>) -> Value {
    v.map_or(Value::Null, Value::from)
}

fn numbers(docs: &[Document], field: &str) -> Vec<f64> {
    docs.iter()
        .filter_map(|d| d.get(field).and_then(Value::as_f64))
        .collect()
}

fn read_fixture(dir: &Path, name: &str) -> Result<Vec<Document>> {
    let path = dir.join(format!("{name}.json"));
    if !path.exists() {
        warn!(path = %path.display(), "fixture file missing, skipped");
        return Ok(Vec::new());
    }
    let raw = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let docs: Vec<Document> = serde_json::from_slice(&raw)
        .with_context(|| format!("{} must hold a JSON array of objects", path.display()))?;
    Ok(docs)
}
