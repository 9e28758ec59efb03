// src/app.rs
// =============================================================================
// This module owns the application state and its lifecycle.
//
// AppState is the single place the configured endpoint and the last known
// reachability status live. It is:
// - initialized from the config store at startup
// - mutated only through update_endpoint / clear_endpoint / refresh
// - observed through the status sink handed to refresh, never by poking
//   at internals
//
// It also hands out the probe sequence numbers, so "last requested wins"
// holds across every probe started through this state.
// =============================================================================

use anyhow::{anyhow, Result};

use crate::config::ConfigStore;
use crate::endpoint::{self, ServerEndpoint, ServiceLinks};
use crate::probe::{LatestWins, Prober, ReachabilityStatus, StatusSink};

pub struct AppState {
    store: ConfigStore,
    endpoint: Option<ServerEndpoint>,
    last_status: Option<ReachabilityStatus>,
    probe_seq: u64,
    primary_port: u16,
    secondary_port: u16,
}

impl AppState {
    // Initializes state from whatever the store holds
    //
    // A persisted URL is used as-is: it passed validation when it was
    // written, and we deliberately do not re-validate on load. An empty
    // store just means no endpoint yet.
    pub fn load(store: ConfigStore, primary_port: u16, secondary_port: u16) -> Result<Self> {
        let endpoint = store.load()?.map(|raw| ServerEndpoint {
            host: endpoint::normalize(&raw),
            primary_port,
            secondary_port,
        });

        Ok(Self {
            store,
            endpoint,
            last_status: None,
            probe_seq: 0,
            primary_port,
            secondary_port,
        })
    }

    pub fn endpoint(&self) -> Option<&ServerEndpoint> {
        self.endpoint.as_ref()
    }

    /// Composed service links, if an endpoint is configured
    pub fn links(&self) -> Option<ServiceLinks> {
        self.endpoint.as_ref().map(ServerEndpoint::links)
    }

    pub fn last_status(&self) -> Option<ReachabilityStatus> {
        self.last_status
    }

    // Validates raw input, persists it, and swaps in the new endpoint
    //
    // Invalid input errors out *before* anything is written, so the
    // previously persisted value survives a bad update. The raw string
    // goes to the store; the normalized form goes into the endpoint.
    pub fn update_endpoint(&mut self, raw: &str) -> Result<ServiceLinks> {
        let endpoint = ServerEndpoint::from_raw(raw, self.primary_port, self.secondary_port)?;
        self.store.save(raw)?;

        let links = endpoint.links();
        self.endpoint = Some(endpoint);
        Ok(links)
    }

    // Drops the configuration, both persisted and in memory
    pub fn clear_endpoint(&mut self) -> Result<()> {
        self.store.clear()?;
        self.endpoint = None;
        self.last_status = None;
        Ok(())
    }

    // Runs one probe against the configured endpoint
    //
    // Each call gets the next sequence number, so a probe started later
    // always outranks one started earlier at the sink, no matter which
    // finishes first. Requires a configured endpoint; the probe itself
    // cannot fail.
    pub async fn refresh<S: StatusSink>(
        &mut self,
        prober: &Prober,
        sink: &LatestWins<S>,
    ) -> Result<ReachabilityStatus> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or_else(|| anyhow!("No server configured - run 'set' first"))?;

        self.probe_seq += 1;
        let status = prober.probe(endpoint, self.probe_seq, sink).await;
        self.last_status = Some(status);
        Ok(status)
    }
}
