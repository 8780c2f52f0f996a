//! Document-store gateway: CRUD on the `usuarios` collection.

use crate::{
    config::MongoSettings,
    errors::{GatewayError, GatewayResult},
    models::user::{NewUser, User, UserDocument, UserPatch},
};
use anyhow::Context;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc, oid::ObjectId},
    options::ReturnDocument,
};
use tracing::debug;

const COLLECTION: &str = "usuarios";
pub const USER_NOT_FOUND: &str = "Usuário não encontrado";

/// Operations the HTTP layer may run against stored users.
#[async_trait]
pub trait UserGateway: Send + Sync {
    /// Round-trip to the server without touching any collection.
    async fn ping(&self) -> GatewayResult<()>;
    async fn create(&self, user: NewUser) -> GatewayResult<User>;
    async fn list(&self) -> GatewayResult<Vec<User>>;
    async fn get(&self, id: &str) -> GatewayResult<User>;
    /// Apply `patch` and return the post-update document.
    async fn update(&self, id: &str, patch: UserPatch) -> GatewayResult<User>;
    async fn delete(&self, id: &str) -> GatewayResult<()>;
}

/// MongoDB-backed users. The client is created once and cloned cheaply.
#[derive(Clone)]
pub struct MongoUserGateway {
    database: Database,
    users: Collection<UserDocument>,
}

impl MongoUserGateway {
    /// Parse the connection string and build a client.
    ///
    /// The driver connects lazily; an unreachable server surfaces on the first
    /// operation, not here.
    pub async fn connect(settings: &MongoSettings) -> anyhow::Result<Self> {
        let client = Client::with_uri_str(&settings.uri)
            .await
            .context("parsing MONGODB_URI")?;
        Ok(Self::new(client.database(&settings.database)))
    }

    pub fn new(database: Database) -> Self {
        let users = database.collection::<UserDocument>(COLLECTION);
        Self { database, users }
    }
}

#[async_trait]
impl UserGateway for MongoUserGateway {
    async fn ping(&self) -> GatewayResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|err| GatewayError::store("Falha ao conectar ao MongoDB", err))?;
        Ok(())
    }

    async fn create(&self, user: NewUser) -> GatewayResult<User> {
        let doc = UserDocument {
            id: ObjectId::new(),
            name: user.name,
            email: user.email,
        };
        self.users
            .insert_one(&doc)
            .await
            .map_err(|err| GatewayError::store("Erro ao criar usuário", err))?;
        debug!(user_id = %doc.id, "inserted user document");
        Ok(doc.into())
    }

    async fn list(&self) -> GatewayResult<Vec<User>> {
        let cursor = self
            .users
            .find(doc! {})
            .await
            .map_err(|err| GatewayError::store("Erro ao buscar usuários", err))?;
        let docs: Vec<UserDocument> = cursor
            .try_collect()
            .await
            .map_err(|err| GatewayError::store("Erro ao buscar usuários", err))?;
        Ok(docs.into_iter().map(User::from).collect())
    }

    async fn get(&self, id: &str) -> GatewayResult<User> {
        let oid = parse_object_id(id)?;
        self.users
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|err| GatewayError::store("Erro ao buscar usuário", err))?
            .map(User::from)
            .ok_or_else(|| GatewayError::not_found(USER_NOT_FOUND))
    }

    async fn update(&self, id: &str, patch: UserPatch) -> GatewayResult<User> {
        let oid = parse_object_id(id)?;
        let changes = set_document(&patch)?;
        self.users
            .find_one_and_update(doc! { "_id": oid }, doc! { "$set": changes })
            .return_document(ReturnDocument::After)
            .await
            .map_err(|err| GatewayError::store("Erro ao atualizar usuário", err))?
            .map(User::from)
            .ok_or_else(|| GatewayError::not_found(USER_NOT_FOUND))
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let oid = parse_object_id(id)?;
        let result = self
            .users
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(|err| GatewayError::store("Erro ao deletar usuário", err))?;
        if result.deleted_count == 0 {
            return Err(GatewayError::not_found(USER_NOT_FOUND));
        }
        Ok(())
    }
}

/// A string that is not an ObjectId cannot name any stored user.
pub fn parse_object_id(id: &str) -> GatewayResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| GatewayError::not_found(USER_NOT_FOUND))
}

/// Build the `$set` body for a patch, rejecting patches that change nothing.
pub fn set_document(patch: &UserPatch) -> GatewayResult<Document> {
    if patch.is_empty() {
        return Err(GatewayError::client("Nenhum campo para atualizar"));
    }
    let mut changes = Document::new();
    if let Some(name) = &patch.name {
        changes.insert("name", name.as_str());
    }
    if let Some(email) = &patch.email {
        changes.insert("email", email.as_str());
    }
    Ok(changes)
}
