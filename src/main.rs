use anyhow::Result;
use chrono::Utc;
use flexi_logger::Logger;
use log::info;
use std::sync::Arc;
use xritkit::assembly::ProcessingFlag;
use xritkit::config::AssemblerConfig;
use xritkit::core::{FrameId, Segment, SystemClock};
use xritkit::engine::{GroupRegistry, IngestService, RegistryEvent, Sweeper};
use xritkit::observability::AssemblyMonitor;
use xritkit::source::ChannelSource;

#[tokio::main]
async fn main() -> Result<()> {
    let _logger = Logger::try_with_env_or_str("info")?.start()?;

    info!("xritkit frame assembly demo");

    let config = AssemblerConfig::from_json(serde_json::json!({
        "timeout_seconds": 7200,
        "max_retries": 1,
        "sweep_interval_seconds": 1,
        "geo": [
            {
                "satellite": "GOES-13",
                "satellite_longitude": -75.0,
                "column_offset": 1402,
                "line_offset": 1402,
                "column_scale_factor": 10216334.0,
                "line_scale_factor": 10216334.0,
                "image_width": 2804
            }
        ]
    }))?;

    let (registry, events) = GroupRegistry::new(config.clone(), Arc::new(SystemClock));
    let registry = Arc::new(registry);
    let sweeper = Sweeper::spawn(registry.clone(), config.sweep_interval());

    // Consumer: reads completed frames, marks them handled and hands them back
    let consumer = tokio::task::spawn_blocking({
        let registry = Arc::downgrade(&registry);
        move || {
            for event in events.iter() {
                match event {
                    RegistryEvent::Completed(frame) => {
                        let mut group = frame.group.lock();
                        let bytes: usize = group
                            .visible()
                            .payloads()
                            .map(|(_, payload)| payload.len())
                            .sum();
                        info!("Exporting {} ({} visible bytes)", frame.id, bytes);
                        if let Some(geo) = &frame.geo {
                            if let Ok((lat, lon)) =
                                geo.geodetic_from_pixel(geo.column_offset(), geo.line_offset())
                            {
                                info!("  sub-satellite point at {:.3}, {:.3}", lat, lon);
                            }
                        }
                        group.mark_processed(ProcessingFlag::Visible);
                        group.mark_processed(ProcessingFlag::Processed);
                        drop(group);
                        if let Some(registry) = registry.upgrade() {
                            registry.acknowledge(&frame.id);
                        }
                    }
                    RegistryEvent::Evicted(notice) => {
                        info!("Evicted {} (failed: {})\n{}", notice.id, notice.failed, notice.summary);
                    }
                    RegistryEvent::RetryRequested(request) => {
                        info!("Retry {} for {}: {:?}", request.retry_count, request.id, request.missing);
                    }
                }
            }
        }
    });

    // Producer: two frames, segments interleaved and out of order
    let (tx, mut source) = ChannelSource::new(64);
    let producer = tokio::spawn(async move {
        let now = Utc::now();
        let frames = [
            FrameId::new("GOES-13", "Full Disk", now),
            FrameId::new("GOES-13", "Northern Hemisphere", now),
        ];
        for index in (0..4).rev() {
            for id in &frames {
                let segment = Segment::new(id, "VIS", index, 4, vec![index as u8; 464]);
                if tx.send(segment).await.is_err() {
                    return;
                }
            }
        }
        for id in &frames {
            for key in ["IR", "WV"] {
                if tx.send(Segment::new(id, key, 0, 1, vec![0u8; 464])).await.is_err() {
                    return;
                }
            }
        }
    });

    let report = IngestService::new(registry.clone()).run(&mut source).await?;
    producer.await?;
    info!(
        "Ingested {} segments, {} frames completed",
        report.received, report.completed
    );

    sweeper.shutdown().await?;
    let leftovers = registry.flush_all();
    info!("{} frames left at shutdown", leftovers.len());

    // The registry owns the only event sender; dropping it ends the consumer
    let monitor = AssemblyMonitor::new(registry.metrics().clone());
    drop(registry);
    consumer.await?;

    println!("{}", monitor.generate_report());
    Ok(())
}
