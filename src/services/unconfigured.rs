//! Stand-in for a backend whose required settings were not provided.
//!
//! The process still starts and serves the other backends; every call into
//! this one fails with a configuration fault.

use crate::{
    errors::{GatewayError, GatewayResult},
    models::{
        bucket::BucketSummary,
        object::{ObjectSummary, Upload, UploadReceipt},
        product::{NewProduct, Product},
        user::{NewUser, User, UserPatch},
    },
    services::{
        object_service::ObjectGateway, product_service::ProductGateway, user_service::UserGateway,
    },
};
use async_trait::async_trait;

#[derive(Clone, Debug)]
pub struct Unconfigured {
    pub backend: &'static str,
    pub missing: Vec<&'static str>,
}

impl Unconfigured {
    pub fn new(backend: &'static str, missing: Vec<&'static str>) -> Self {
        Self { backend, missing }
    }

    fn fail<T>(&self) -> GatewayResult<T> {
        Err(GatewayError::Config {
            backend: self.backend,
            missing: self.missing.clone(),
        })
    }
}

#[async_trait]
impl UserGateway for Unconfigured {
    async fn ping(&self) -> GatewayResult<()> {
        self.fail()
    }
    async fn create(&self, _user: NewUser) -> GatewayResult<User> {
        self.fail()
    }
    async fn list(&self) -> GatewayResult<Vec<User>> {
        self.fail()
    }
    async fn get(&self, _id: &str) -> GatewayResult<User> {
        self.fail()
    }
    async fn update(&self, _id: &str, _patch: UserPatch) -> GatewayResult<User> {
        self.fail()
    }
    async fn delete(&self, _id: &str) -> GatewayResult<()> {
        self.fail()
    }
}

#[async_trait]
impl ProductGateway for Unconfigured {
    async fn ping(&self) -> GatewayResult<()> {
        self.fail()
    }
    async fn init_schema(&self) -> GatewayResult<()> {
        self.fail()
    }
    async fn create(&self, _product: NewProduct) -> GatewayResult<u64> {
        self.fail()
    }
    async fn list(&self) -> GatewayResult<Vec<Product>> {
        self.fail()
    }
    async fn get(&self, _id: u64) -> GatewayResult<Product> {
        self.fail()
    }
    async fn update(&self, _id: u64, _product: NewProduct) -> GatewayResult<()> {
        self.fail()
    }
    async fn delete(&self, _id: u64) -> GatewayResult<()> {
        self.fail()
    }
}

#[async_trait]
impl ObjectGateway for Unconfigured {
    async fn ping(&self) -> GatewayResult<()> {
        self.fail()
    }
    async fn list_buckets(&self) -> GatewayResult<Vec<BucketSummary>> {
        self.fail()
    }
    async fn list_objects(
        &self,
        _bucket: &str,
        _prefix: Option<String>,
    ) -> GatewayResult<Vec<ObjectSummary>> {
        self.fail()
    }
    async fn upload(&self, _upload: Upload) -> GatewayResult<UploadReceipt> {
        self.fail()
    }
    async fn delete_object(&self, _bucket: &str, _key: &str) -> GatewayResult<()> {
        self.fail()
    }
}
