//! Minimal embedding example for dnsmirror-core
//!
//! This example demonstrates using dnsmirror-core as a library with a custom,
//! in-process remote DNS service. The engine lifecycle is fully managed by
//! the application.

use dnsmirror_core::{
    EngineConfig, Record, RecordAppender, RecordDeleter, RecordGetter, RecordPayload,
    RecordSetter, RecordSpec, ReconciliationEngine, RemoteDnsClient, RemoteZone, Result,
    ZoneFilter, ZoneLister,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Remote DNS service kept entirely in memory
struct EmbeddedRemote {
    zones: Vec<RemoteZone>,
    records: Mutex<HashMap<String, Vec<Record>>>,
    next_id: AtomicUsize,
}

impl EmbeddedRemote {
    fn new() -> Self {
        let zones = vec![RemoteZone {
            id: "zone-1".to_string(),
            name: "Example.COM.".to_string(),
            status: "active".to_string(),
        }];
        let mut records = HashMap::new();
        records.insert(
            "zone-1".to_string(),
            vec![Record::new(
                "rec-0",
                "www.example.com",
                "A",
                "192.0.2.1",
                Duration::from_secs(300),
            )],
        );

        Self {
            zones,
            records: Mutex::new(records),
            next_id: AtomicUsize::new(1),
        }
    }

    fn records_of(&self, zone_id: &str) -> Vec<Record> {
        self.records
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .get(zone_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl RemoteDnsClient for EmbeddedRemote {
    async fn list_zones(&self, _filter: ZoneFilter) -> Result<Vec<RemoteZone>> {
        Ok(self.zones.clone())
    }

    async fn list_records(&self, zone_id: &str) -> Result<Vec<Record>> {
        Ok(self.records_of(zone_id))
    }

    async fn create_record(&self, zone_id: &str, payload: &RecordPayload) -> Result<Record> {
        let id = format!("rec-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = payload.to_record(id);
        println!("[Embedded] create {} {} -> {}", record.record_type, record.name, record.content);

        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        records.entry(zone_id.to_string()).or_default().push(record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        zone_id: &str,
        record_id: &str,
        payload: &RecordPayload,
    ) -> Result<Record> {
        let record = payload.to_record(record_id);
        println!("[Embedded] update {} {} -> {}", record.record_type, record.name, record.content);

        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        let zone = records.entry(zone_id.to_string()).or_default();
        match zone.iter_mut().find(|r| r.id == record_id) {
            Some(slot) => *slot = record.clone(),
            None => return Err(dnsmirror_core::Error::not_found(record_id)),
        }
        Ok(record)
    }

    async fn delete_record(&self, zone_id: &str, record_id: &str) -> Result<String> {
        println!("[Embedded] delete {}", record_id);

        let mut records = self.records.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(zone) = records.get_mut(zone_id) {
            zone.retain(|r| r.id != record_id);
        }
        Ok(record_id.to_string())
    }

    fn provider_name(&self) -> &'static str {
        "embedded"
    }
}

fn print_records(records: &[RecordSpec]) {
    for r in records {
        println!("   {}\t{}\t{}\t{}", r.name, r.record_type, r.ttl.as_secs(), r.content);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== Embedded dnsmirror-core Example ===\n");

    let config = EngineConfig {
        event_channel_capacity: 100, // Small buffer for example
        ..EngineConfig::default()
    };

    println!("1. Creating engine...");
    let (engine, mut event_rx) = ReconciliationEngine::new(Box::new(EmbeddedRemote::new()), &config)?;

    let event_listener = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            println!("[Event] {:?}", event);
        }
    });

    println!("2. Warming cache...");
    engine.init_cache().await?;
    println!("   Zones: {:?}", engine.list_zones().await?);

    let ttl = Duration::from_secs(300);

    println!("\n3. Desired state: update www, add api");
    let applied = engine
        .set_records(
            "example.com",
            &[
                RecordSpec::new("www.example.com", "A", "192.0.2.10", ttl),
                RecordSpec::new("api.example.com", "A", "192.0.2.20", ttl),
            ],
        )
        .await?;
    print_records(&applied);

    println!("\n4. Appending a TXT record (must not exist yet)");
    engine
        .append_records(
            "example.com",
            &[RecordSpec::new("example.com", "TXT", "v=spf1 -all", ttl)],
        )
        .await?;

    println!("\n5. Appending it again is a conflict:");
    if let Err(e) = engine
        .append_records(
            "example.com",
            &[RecordSpec::new("example.com", "TXT", "v=spf1 -all", ttl)],
        )
        .await
    {
        println!("   {}", e);
    }

    println!("\n6. Removing api via empty content, then deleting the TXT record");
    engine
        .set_records("example.com", &[RecordSpec::removal("api.example.com", "A")])
        .await?;
    engine
        .delete_records("example.com", &[RecordSpec::removal("example.com", "TXT")])
        .await?;

    println!("\n7. Final mirror of example.com:");
    print_records(&engine.get_records("EXAMPLE.com.").await?);

    // Dropping the engine closes the event channel
    drop(engine);
    let _ = event_listener.await;

    println!("\n=== Embedding Successful ===");
    Ok(())
}
