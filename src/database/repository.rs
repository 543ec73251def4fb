use std::marker::PhantomData;

use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, DateTime, Document};
use mongodb::options::{FindOneOptions, FindOptions, IndexOptions};
use mongodb::{Collection, IndexModel};
use serde::de::DeserializeOwned;

use crate::database::manager::{Database, DatabaseError};
use crate::filter::{Page, PageRequest};
use crate::resources::Resource;

/// Result of a `$set` update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

/// Generic CRUD over one resource collection.
///
/// Writes take raw documents built by the resource; reads decode into the
/// resource DTO with its projection applied.
pub struct Repository<R> {
    db: Database,
    collection: Collection<Document>,
    _resource: PhantomData<R>,
}

impl<R> Repository<R>
where
    R: Resource,
{
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            collection: db.collection(R::COLLECTION),
            _resource: PhantomData,
        }
    }

    fn dtos(&self) -> Collection<R::Dto> {
        self.collection.clone_with_type()
    }

    pub async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        for field in R::UNIQUE_FIELDS {
            let mut keys = Document::new();
            keys.insert(*field, 1);
            let index = IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build();
            self.db
                .run("create_index", self.collection.create_index(index, None))
                .await?;
            tracing::debug!(collection = R::COLLECTION, field, "unique index ensured");
        }
        Ok(())
    }

    /// Insert with a server-assigned id and fresh timestamps.
    pub async fn insert(&self, mut document: Document) -> Result<ObjectId, DatabaseError> {
        document.remove("_id");
        let now = DateTime::now();
        document.insert("createdAt", now);
        document.insert("updatedAt", now);

        let result = self
            .db
            .run("insert_one", self.collection.insert_one(document, None))
            .await?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| DatabaseError::Decode("inserted id is not an ObjectId".to_string()))
    }

    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<R::Dto>, DatabaseError> {
        self.find_one(doc! { "_id": id }).await
    }

    pub async fn find_one(&self, filter: Document) -> Result<Option<R::Dto>, DatabaseError> {
        let options = FindOneOptions::builder().projection(R::projection()).build();
        let dtos = self.dtos();
        self.db.run("find_one", dtos.find_one(filter, options)).await
    }

    /// Unprojected lookup for callers that need stored-only fields.
    pub async fn find_as<T>(&self, filter: Document) -> Result<Option<T>, DatabaseError>
    where
        T: DeserializeOwned + Unpin + Send + Sync,
    {
        let typed = self.collection.clone_with_type::<T>();
        self.db.run("find_one", typed.find_one(filter, None)).await
    }

    /// Newest-first page of DTOs plus the total match count.
    pub async fn find_page(
        &self,
        filter: Document,
        page: PageRequest,
    ) -> Result<Page<R::Dto>, DatabaseError> {
        let total_rows = self.count(filter.clone()).await?;

        let options = FindOptions::builder()
            .sort(doc! { "_id": -1 })
            .skip(page.skip())
            .limit(page.limit())
            .projection(R::projection())
            .build();
        let dtos = self.dtos();
        let data = self
            .db
            .run("find", async {
                let cursor = dtos.find(filter, options).await?;
                cursor.try_collect::<Vec<R::Dto>>().await
            })
            .await?;

        Ok(Page::new(page, total_rows, data))
    }

    pub async fn count(&self, filter: Document) -> Result<u64, DatabaseError> {
        self.db
            .run("count_documents", self.collection.count_documents(filter, None))
            .await
    }

    /// `$set` the supplied fields and refresh `updatedAt`. Identity and
    /// creation time are never overwritten.
    pub async fn update_by_id(
        &self,
        id: ObjectId,
        mut fields: Document,
    ) -> Result<UpdateOutcome, DatabaseError> {
        fields.remove("_id");
        fields.remove("createdAt");
        fields.insert("updatedAt", DateTime::now());

        let result = self
            .db
            .run(
                "update_one",
                self.collection
                    .update_one(doc! { "_id": id }, doc! { "$set": fields }, None),
            )
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    pub async fn delete_by_id(&self, id: ObjectId) -> Result<u64, DatabaseError> {
        let result = self
            .db
            .run("delete_one", self.collection.delete_one(doc! { "_id": id }, None))
            .await?;
        Ok(result.deleted_count)
    }

    pub async fn aggregate<T>(&self, pipeline: Vec<Document>) -> Result<Vec<T>, DatabaseError>
    where
        T: DeserializeOwned,
    {
        let collection = &self.collection;
        let documents = self
            .db
            .run("aggregate", async {
                let cursor = collection.aggregate(pipeline, None).await?;
                cursor.try_collect::<Vec<Document>>().await
            })
            .await?;

        documents
            .into_iter()
            .map(|document| {
                bson::from_document(document).map_err(|e| DatabaseError::Decode(e.to_string()))
            })
            .collect()
    }
}
