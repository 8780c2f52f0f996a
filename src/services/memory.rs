//! In-memory gateways used by the router tests.
//!
//! They follow the same not-found and validation rules as the real gateways
//! so handler behavior can be checked without running the stores.

use crate::{
    errors::{GatewayError, GatewayResult},
    models::{
        bucket::BucketSummary,
        object::{ObjectSummary, Upload, UploadReceipt},
        product::{NewProduct, Product},
        user::{NewUser, User, UserDocument, UserPatch},
    },
    services::{
        object_service::ObjectGateway,
        product_service::{PRODUCT_NOT_FOUND, ProductGateway},
        user_service::{USER_NOT_FOUND, UserGateway, parse_object_id, set_document},
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use std::{
    collections::BTreeMap,
    io,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Default)]
pub struct MemoryUsers {
    docs: Mutex<BTreeMap<String, UserDocument>>,
}

#[async_trait]
impl UserGateway for MemoryUsers {
    async fn ping(&self) -> GatewayResult<()> {
        Ok(())
    }

    async fn create(&self, user: NewUser) -> GatewayResult<User> {
        let doc = UserDocument {
            id: ObjectId::new(),
            name: user.name,
            email: user.email,
        };
        self.docs.lock().unwrap().insert(doc.id.to_hex(), doc.clone());
        Ok(doc.into())
    }

    async fn list(&self) -> GatewayResult<Vec<User>> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .values()
            .cloned()
            .map(User::from)
            .collect())
    }

    async fn get(&self, id: &str) -> GatewayResult<User> {
        let oid = parse_object_id(id)?;
        self.docs
            .lock()
            .unwrap()
            .get(&oid.to_hex())
            .cloned()
            .map(User::from)
            .ok_or_else(|| GatewayError::not_found(USER_NOT_FOUND))
    }

    async fn update(&self, id: &str, patch: UserPatch) -> GatewayResult<User> {
        let oid = parse_object_id(id)?;
        set_document(&patch)?;
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .get_mut(&oid.to_hex())
            .ok_or_else(|| GatewayError::not_found(USER_NOT_FOUND))?;
        if let Some(name) = patch.name {
            doc.name = name;
        }
        if let Some(email) = patch.email {
            doc.email = email;
        }
        Ok(doc.clone().into())
    }

    async fn delete(&self, id: &str) -> GatewayResult<()> {
        let oid = parse_object_id(id)?;
        self.docs
            .lock()
            .unwrap()
            .remove(&oid.to_hex())
            .map(|_| ())
            .ok_or_else(|| GatewayError::not_found(USER_NOT_FOUND))
    }
}

/// Mimics MySQL: the table must be created by `init_schema` before use.
#[derive(Default)]
pub struct MemoryProducts {
    table: Mutex<Option<BTreeMap<u64, Product>>>,
    next_id: AtomicUsize,
    pub init_calls: AtomicUsize,
}

impl MemoryProducts {
    fn with_table<T>(
        &self,
        f: impl FnOnce(&mut BTreeMap<u64, Product>) -> GatewayResult<T>,
    ) -> GatewayResult<T> {
        let mut guard = self.table.lock().unwrap();
        match guard.as_mut() {
            Some(rows) => f(rows),
            None => Err(GatewayError::store(
                "Erro ao acessar produtos",
                io::Error::other("Table 'loja.produtos' doesn't exist"),
            )),
        }
    }
}

#[async_trait]
impl ProductGateway for MemoryProducts {
    async fn ping(&self) -> GatewayResult<()> {
        Ok(())
    }

    async fn init_schema(&self) -> GatewayResult<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        self.table.lock().unwrap().get_or_insert_with(BTreeMap::new);
        Ok(())
    }

    async fn create(&self, product: NewProduct) -> GatewayResult<u64> {
        self.with_table(|rows| {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64 + 1;
            rows.insert(
                id,
                Product {
                    id,
                    name: product.name,
                    description: product.description,
                    price: product.price,
                },
            );
            Ok(id)
        })
    }

    async fn list(&self) -> GatewayResult<Vec<Product>> {
        self.with_table(|rows| Ok(rows.values().cloned().collect()))
    }

    async fn get(&self, id: u64) -> GatewayResult<Product> {
        self.with_table(|rows| {
            rows.get(&id)
                .cloned()
                .ok_or_else(|| GatewayError::not_found(PRODUCT_NOT_FOUND))
        })
    }

    async fn update(&self, id: u64, product: NewProduct) -> GatewayResult<()> {
        self.with_table(|rows| {
            let row = rows
                .get_mut(&id)
                .ok_or_else(|| GatewayError::not_found(PRODUCT_NOT_FOUND))?;
            row.name = product.name;
            row.description = product.description;
            row.price = product.price;
            Ok(())
        })
    }

    async fn delete(&self, id: u64) -> GatewayResult<()> {
        self.with_table(|rows| {
            rows.remove(&id)
                .map(|_| ())
                .ok_or_else(|| GatewayError::not_found(PRODUCT_NOT_FOUND))
        })
    }
}

/// Buckets must exist up front, as in S3.
#[derive(Default)]
pub struct MemoryObjects {
    buckets: Mutex<BTreeMap<String, BTreeMap<String, (Bytes, Option<String>)>>>,
}

impl MemoryObjects {
    pub fn with_buckets(names: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut buckets = store.buckets.lock().unwrap();
            for name in names {
                buckets.insert(name.to_string(), BTreeMap::new());
            }
        }
        store
    }

    pub fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.buckets
            .lock()
            .unwrap()
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .and_then(|(_, ct)| ct.clone())
    }
}

fn no_such_bucket() -> GatewayError {
    GatewayError::store(
        "The specified bucket does not exist",
        io::Error::other("NoSuchBucket"),
    )
}

#[async_trait]
impl ObjectGateway for MemoryObjects {
    async fn ping(&self) -> GatewayResult<()> {
        Ok(())
    }

    async fn list_buckets(&self) -> GatewayResult<Vec<BucketSummary>> {
        Ok(self
            .buckets
            .lock()
            .unwrap()
            .keys()
            .map(|name| BucketSummary {
                name: name.clone(),
                creation_date: None,
            })
            .collect())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: Option<String>,
    ) -> GatewayResult<Vec<ObjectSummary>> {
        let buckets = self.buckets.lock().unwrap();
        let objects = buckets.get(bucket).ok_or_else(no_such_bucket)?;
        let prefix = prefix.unwrap_or_default();
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(key, (content, _))| ObjectSummary {
                key: key.clone(),
                size: content.len() as i64,
                last_modified: Some(Utc::now()),
                etag: None,
                storage_class: Some("STANDARD".into()),
            })
            .collect())
    }

    async fn upload(&self, upload: Upload) -> GatewayResult<UploadReceipt> {
        if upload.content.is_empty() {
            return Err(GatewayError::client("Arquivo não enviado"));
        }
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets.get_mut(&upload.bucket).ok_or_else(no_such_bucket)?;
        let size = upload.content.len();
        objects.insert(upload.key.clone(), (upload.content, upload.content_type));
        Ok(UploadReceipt {
            bucket: upload.bucket,
            key: upload.key,
            size,
            etag: None,
            version_id: None,
        })
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> GatewayResult<()> {
        let mut buckets = self.buckets.lock().unwrap();
        let objects = buckets.get_mut(bucket).ok_or_else(no_such_bucket)?;
        objects.remove(key);
        Ok(())
    }
}

/// Every call fails as if the store were unreachable.
pub struct Broken;

pub const BROKEN_DETAIL: &str = "connection refused (os error 111) at 10.1.2.3";

fn broken<T>(msg: &str) -> GatewayResult<T> {
    Err(GatewayError::store(msg, io::Error::other(BROKEN_DETAIL)))
}

#[async_trait]
impl UserGateway for Broken {
    async fn ping(&self) -> GatewayResult<()> {
        broken("Falha ao conectar ao MongoDB")
    }
    async fn create(&self, _user: NewUser) -> GatewayResult<User> {
        broken("Erro ao criar usuário")
    }
    async fn list(&self) -> GatewayResult<Vec<User>> {
        broken("Erro ao buscar usuários")
    }
    async fn get(&self, _id: &str) -> GatewayResult<User> {
        broken("Erro ao buscar usuário")
    }
    async fn update(&self, _id: &str, _patch: UserPatch) -> GatewayResult<User> {
        broken("Erro ao atualizar usuário")
    }
    async fn delete(&self, _id: &str) -> GatewayResult<()> {
        broken("Erro ao deletar usuário")
    }
}

#[async_trait]
impl ProductGateway for Broken {
    async fn ping(&self) -> GatewayResult<()> {
        broken("Falha ao conectar ao MySQL")
    }
    async fn init_schema(&self) -> GatewayResult<()> {
        broken("Erro ao inicializar o banco de dados")
    }
    async fn create(&self, _product: NewProduct) -> GatewayResult<u64> {
        broken("Erro ao criar produto")
    }
    async fn list(&self) -> GatewayResult<Vec<Product>> {
        broken("Erro ao buscar produtos")
    }
    async fn get(&self, _id: u64) -> GatewayResult<Product> {
        broken("Erro ao buscar produto")
    }
    async fn update(&self, _id: u64, _product: NewProduct) -> GatewayResult<()> {
        broken("Erro ao atualizar produto")
    }
    async fn delete(&self, _id: u64) -> GatewayResult<()> {
        broken("Erro ao deletar produto")
    }
}

#[async_trait]
impl ObjectGateway for Broken {
    async fn ping(&self) -> GatewayResult<()> {
        broken("Falha ao conectar ao S3")
    }
    async fn list_buckets(&self) -> GatewayResult<Vec<BucketSummary>> {
        broken("Erro ao listar buckets")
    }
    async fn list_objects(
        &self,
        _bucket: &str,
        _prefix: Option<String>,
    ) -> GatewayResult<Vec<ObjectSummary>> {
        broken("Erro ao listar objetos")
    }
    async fn upload(&self, _upload: Upload) -> GatewayResult<UploadReceipt> {
        broken("Erro ao enviar arquivo")
    }
    async fn delete_object(&self, _bucket: &str, _key: &str) -> GatewayResult<()> {
        broken("Erro ao deletar arquivo")
    }
}
