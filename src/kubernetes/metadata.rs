// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Metadata-only listing and bulk deletion of dynamically discovered resources

use crate::deletion::{ObjectMetadataRef, ResourceClient, ResourceDescriptor};
use crate::error::{ReaperError, Result};
use crate::kubernetes::client::ClusterClients;
use crate::types::LogicalCluster;
use async_trait::async_trait;
use kube::{
    api::{ApiResource, DeleteParams, DynamicObject, ListParams},
    discovery::verbs,
    Api,
};
use std::sync::Arc;
use tracing::{debug, instrument};

const LIST_PAGE_SIZE: u32 = 500;

pub struct KubeResourceClient {
    clients: Arc<dyn ClusterClients>,
}

impl KubeResourceClient {
    pub fn new(clients: Arc<dyn ClusterClients>) -> Self {
        Self { clients }
    }

    fn api(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
    ) -> Result<Api<DynamicObject>> {
        let client = self.clients.client_for(cluster)?;
        let ar = api_resource(descriptor);
        Ok(match namespace {
            Some(ns) => Api::namespaced_with(client, ns, &ar),
            None => Api::all_with(client, &ar),
        })
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    #[instrument(skip(self, descriptor), fields(cluster = %cluster, resource = %descriptor))]
    async fn list<'a>(
        &self,
        cluster: &LogicalCluster,
        descriptor: &'a ResourceDescriptor,
        namespace: Option<&str>,
    ) -> Result<Vec<ObjectMetadataRef<'a>>> {
        let api = self.api(cluster, descriptor, namespace)?;
        let mut objects = Vec::new();
        let mut lp = ListParams::default().limit(LIST_PAGE_SIZE);

        loop {
            let page = api
                .list_metadata(&lp)
                .await
                .map_err(|e| ReaperError::operation(verbs::LIST, descriptor, e))?;

            objects.extend(page.items.into_iter().map(|item| ObjectMetadataRef {
                descriptor,
                name: item.metadata.name.unwrap_or_default(),
                namespace: item.metadata.namespace,
            }));

            match page.metadata.continue_ {
                Some(token) if !token.is_empty() => lp = lp.continue_token(&token),
                _ => break,
            }
        }

        debug!("Listed {} objects", objects.len());
        Ok(objects)
    }

    #[instrument(skip(self, descriptor), fields(cluster = %cluster, resource = %descriptor))]
    async fn delete_collection(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
    ) -> Result<()> {
        let api = self.api(cluster, descriptor, namespace)?;
        api.delete_collection(&DeleteParams::background(), &ListParams::default())
            .await
            .map_err(|e| ReaperError::operation(verbs::DELETE_COLLECTION, descriptor, e))?;
        Ok(())
    }

    #[instrument(skip(self, descriptor), fields(cluster = %cluster, resource = %descriptor))]
    async fn delete(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<()> {
        let api = self.api(cluster, descriptor, namespace)?;
        match api.delete(name, &DeleteParams::background()).await {
            Ok(_) => Ok(()),
            Err(kube::Error::Api(err)) if err.code == 404 => {
                debug!("{} {} already gone", descriptor, name);
                Ok(())
            }
            Err(e) => Err(ReaperError::operation(verbs::DELETE, descriptor, e)),
        }
    }
}

fn api_resource(descriptor: &ResourceDescriptor) -> ApiResource {
    ApiResource {
        group: descriptor.group.clone(),
        version: descriptor.version.clone(),
        api_version: descriptor.api_version(),
        kind: descriptor.kind.clone(),
        plural: descriptor.plural.clone(),
    }
}
