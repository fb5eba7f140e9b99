// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock Kubernetes API and in-memory sweep collaborators.

use crate::constants::WORKSPACE_FINALIZER;
use crate::deletion::{
    Discovered, DiscoveryProvider, ObjectMetadataRef, ResourceClient, ResourceDescriptor,
};
use crate::error::{ReaperError, Result};
use crate::kubernetes::ClusterClients;
use crate::types::{LogicalCluster, Workspace, WorkspaceSpec};
use async_trait::async_trait;
use futures::future;
use http::{Request, Response};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::chrono::Utc;
use kube::api::ObjectMeta;
use kube::client::Body;
use kube::Client;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for DELETE requests matching the exact path
    pub fn on_delete(self, path: &str, status: u16, body: &str) -> Self {
        self.on("DELETE", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.to_string()),
        );
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// Method and path of every request received so far
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        self.responses
            .lock()
            .unwrap()
            .get(&(method.to_string(), path.to_string()))
            .cloned()
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        self.requests.lock().unwrap().push((method, path.clone()));

        Box::pin(async move {
            let (status, body) =
                response.unwrap_or_else(|| (404, status_json(404, "NotFound", &path)));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a Kubernetes `Status` response body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    let status = if code < 400 { "Success" } else { "Failure" };
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": status,
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Hands out the same client for every logical cluster
pub struct StaticClusterClients(pub Client);

impl ClusterClients for StaticClusterClients {
    fn client_for(&self, _cluster: &LogicalCluster) -> Result<Client> {
        Ok(self.0.clone())
    }
}

fn descriptor(group: &str, plural: &str, kind: &str, namespaced: bool, verbs: &[&str]) -> ResourceDescriptor {
    ResourceDescriptor {
        group: group.to_string(),
        version: "v1".to_string(),
        kind: kind.to_string(),
        plural: plural.to_string(),
        namespaced,
        verbs: verbs.iter().map(|v| v.to_string()).collect(),
    }
}

const ALL_VERBS: &[&str] = &["get", "list", "delete", "deletecollection", "create", "update"];

pub fn secrets() -> ResourceDescriptor {
    descriptor("", "secrets", "Secret", true, ALL_VERBS)
}

pub fn crds() -> ResourceDescriptor {
    descriptor(
        "apiextensions.k8s.io",
        "customresourcedefinitions",
        "CustomResourceDefinition",
        false,
        ALL_VERBS,
    )
}

pub fn namespaced(plural: &str, kind: &str, verbs: &[&str]) -> ResourceDescriptor {
    descriptor("", plural, kind, true, verbs)
}

pub fn cluster_scoped(plural: &str, kind: &str, verbs: &[&str]) -> ResourceDescriptor {
    descriptor("", plural, kind, false, verbs)
}

/// A workspace marked for deletion that still carries the content finalizer
pub fn deleting_workspace(name: &str) -> Workspace {
    Workspace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            deletion_timestamp: Some(Time(Utc::now())),
            finalizers: Some(vec![WORKSPACE_FINALIZER.to_string()]),
            ..Default::default()
        },
        spec: WorkspaceSpec::default(),
        status: None,
    }
}

/// Discovery that always answers with a fixed list, optionally failing as well
pub struct FakeDiscovery {
    resources: Vec<ResourceDescriptor>,
    error: Option<String>,
    clusters: Arc<Mutex<Vec<String>>>,
}

impl FakeDiscovery {
    pub fn new(resources: Vec<ResourceDescriptor>) -> Self {
        Self {
            resources,
            error: None,
            clusters: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_error(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    /// Clusters discovery was asked about
    pub fn clusters(&self) -> Arc<Mutex<Vec<String>>> {
        self.clusters.clone()
    }
}

#[async_trait]
impl DiscoveryProvider for FakeDiscovery {
    async fn discover(&self, cluster: &LogicalCluster) -> Discovered {
        self.clusters.lock().unwrap().push(cluster.to_string());
        Discovered {
            resources: self.resources.clone(),
            error: self.error.as_ref().map(|message| ReaperError::Discovery {
                cluster: cluster.to_string(),
                message: message.clone(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FakeObject {
    resource: String,
    name: String,
    namespace: Option<String>,
    terminating: bool,
}

impl FakeObject {
    pub fn namespaced(resource: &str, name: &str, namespace: &str) -> Self {
        Self {
            resource: resource.to_string(),
            name: name.to_string(),
            namespace: Some(namespace.to_string()),
            terminating: false,
        }
    }

    pub fn cluster_scoped(resource: &str, name: &str) -> Self {
        Self {
            resource: resource.to_string(),
            name: name.to_string(),
            namespace: None,
            terminating: false,
        }
    }

    fn in_scope(&self, resource: &str, namespace: Option<&str>) -> bool {
        self.resource == resource
            && namespace.is_none_or(|ns| self.namespace.as_deref() == Some(ns))
    }
}

/// A call made against [`FakeResourceClient`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub resource: String,
    pub verb: String,
    pub namespace: Option<String>,
    pub name: Option<String>,
}

impl Action {
    pub fn list(resource: &str) -> Self {
        Self::new(resource, "list", None, None)
    }

    pub fn delete_collection(resource: &str, namespace: Option<&str>) -> Self {
        Self::new(resource, "deletecollection", namespace, None)
    }

    pub fn delete(resource: &str, namespace: Option<&str>, name: &str) -> Self {
        Self::new(resource, "delete", namespace, Some(name))
    }

    fn new(resource: &str, verb: &str, namespace: Option<&str>, name: Option<&str>) -> Self {
        Self {
            resource: resource.to_string(),
            verb: verb.to_string(),
            namespace: namespace.map(str::to_string),
            name: name.map(str::to_string),
        }
    }
}

/// In-memory object store that records every call made against it.
///
/// Deleted objects stay listed as terminating until [`finish_deletions`] runs,
/// the way objects with their own finalizers behave on a real server.
///
/// [`finish_deletions`]: FakeResourceClient::finish_deletions
pub struct FakeResourceClient {
    objects: Mutex<Vec<FakeObject>>,
    actions: Mutex<Vec<Action>>,
    clusters: Mutex<Vec<LogicalCluster>>,
    /// Calls of a resource and verb allowed to succeed before the rest fail
    failures: HashMap<(String, String), usize>,
    remove_on_delete: bool,
}

impl FakeResourceClient {
    pub fn new(objects: Vec<FakeObject>) -> Self {
        Self {
            objects: Mutex::new(objects),
            actions: Mutex::new(Vec::new()),
            clusters: Mutex::new(Vec::new()),
            failures: HashMap::new(),
            remove_on_delete: false,
        }
    }

    /// Fail every `verb` call on `resource`
    pub fn failing(self, resource: &str, verb: &str) -> Self {
        self.failing_after(resource, verb, 0)
    }

    /// Let the first `calls` `verb` calls on `resource` through, then fail
    pub fn failing_after(mut self, resource: &str, verb: &str, calls: usize) -> Self {
        self.failures
            .insert((resource.to_string(), verb.to_string()), calls);
        self
    }

    /// Drop deleted objects immediately instead of keeping them terminating
    pub fn removing_on_delete(mut self) -> Self {
        self.remove_on_delete = true;
        self
    }

    /// Remove every object whose deletion was requested
    pub fn finish_deletions(&self) {
        self.objects.lock().unwrap().retain(|o| !o.terminating);
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn clusters(&self) -> Vec<LogicalCluster> {
        self.clusters.lock().unwrap().clone()
    }

    pub fn list_count(&self, resource: &str) -> usize {
        self.count(resource, "list")
    }

    pub fn delete_collection_count(&self, resource: &str) -> usize {
        self.count(resource, "deletecollection")
    }

    fn count(&self, resource: &str, verb: &str) -> usize {
        self.actions
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.resource == resource && a.verb == verb)
            .count()
    }

    fn record(&self, cluster: &LogicalCluster, action: Action) -> Result<()> {
        let verb = action.verb.clone();
        let resource = action.resource.clone();
        let earlier = self.count(&resource, &verb);
        self.clusters.lock().unwrap().push(cluster.clone());
        self.actions.lock().unwrap().push(action);

        match self.failures.get(&(resource.clone(), verb.clone())) {
            Some(&allowed) if earlier >= allowed => {
                Err(ReaperError::operation(&verb, resource, "injected failure"))
            }
            _ => Ok(()),
        }
    }

    fn mark_deleted(&self, matches: impl Fn(&FakeObject) -> bool) {
        let mut objects = self.objects.lock().unwrap();
        if self.remove_on_delete {
            objects.retain(|o| !matches(o));
        } else {
            objects
                .iter_mut()
                .filter(|o| matches(o))
                .for_each(|o| o.terminating = true);
        }
    }
}

#[async_trait]
impl ResourceClient for FakeResourceClient {
    async fn list<'a>(
        &self,
        cluster: &LogicalCluster,
        descriptor: &'a ResourceDescriptor,
        namespace: Option<&str>,
    ) -> Result<Vec<ObjectMetadataRef<'a>>> {
        let mut action = Action::list(&descriptor.plural);
        action.namespace = namespace.map(str::to_string);
        self.record(cluster, action)?;

        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.in_scope(&descriptor.plural, namespace))
            .map(|o| ObjectMetadataRef {
                descriptor,
                name: o.name.clone(),
                namespace: o.namespace.clone(),
            })
            .collect())
    }

    async fn delete_collection(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
    ) -> Result<()> {
        self.record(cluster, Action::delete_collection(&descriptor.plural, namespace))?;
        self.mark_deleted(|o| o.in_scope(&descriptor.plural, namespace));
        Ok(())
    }

    async fn delete(
        &self,
        cluster: &LogicalCluster,
        descriptor: &ResourceDescriptor,
        namespace: Option<&str>,
        name: &str,
    ) -> Result<()> {
        self.record(cluster, Action::delete(&descriptor.plural, namespace, name))?;
        self.mark_deleted(|o| o.in_scope(&descriptor.plural, namespace) && o.name == name);
        Ok(())
    }
}

/// Resource client whose calls never complete
pub struct HangingResourceClient;

#[async_trait]
impl ResourceClient for HangingResourceClient {
    async fn list<'a>(
        &self,
        _cluster: &LogicalCluster,
        _descriptor: &'a ResourceDescriptor,
        _namespace: Option<&str>,
    ) -> Result<Vec<ObjectMetadataRef<'a>>> {
        future::pending().await
    }

    async fn delete_collection(
        &self,
        _cluster: &LogicalCluster,
        _descriptor: &ResourceDescriptor,
        _namespace: Option<&str>,
    ) -> Result<()> {
        future::pending().await
    }

    async fn delete(
        &self,
        _cluster: &LogicalCluster,
        _descriptor: &ResourceDescriptor,
        _namespace: Option<&str>,
        _name: &str,
    ) -> Result<()> {
        future::pending().await
    }
}
