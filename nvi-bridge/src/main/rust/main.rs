use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use tokio::sync::oneshot;
use tracing::{info, warn};

use nvi_bridge::domain::media::HostAudioFrame;
use nvi_bridge::{
    serve_metrics, BridgeContext, Config, LoggingSink, LoopbackTransport, PrometheusReporter,
    ReceiveBridge, SendBridge, TestPattern, ToneGenerator,
};

/// How often the demo re-runs discovery, as a host would when showing its source list
const DIRECTORY_REFRESH: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration
    let config = Config::parse();
    config.validate()?;

    // Initialize logging
    let filter = if config.verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    // Initialize metrics
    PrometheusReporter::init_metrics()?;

    info!("Starting NVI bridge");
    info!("  Receive target: {}", config.target);
    info!("  Sender alias: {}", config.alias);
    info!("  Metrics port: {}", config.metrics_port);

    // Convert CLI config to domain configs
    let receive_config = config
        .to_receive_config()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let sender_config = config
        .to_sender_config()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let output_format = config
        .to_output_format()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    // Create infrastructure implementations (dependency injection)
    let transport = Arc::new(LoopbackTransport::new());
    let metrics_reporter = Arc::new(PrometheusReporter::new());
    let context = BridgeContext::new(transport, metrics_reporter.clone());

    // Output side: publish a test pattern under the sender alias
    let mut send_bridge = SendBridge::new(sender_config, metrics_reporter);
    send_bridge.start(context.transport.as_ref(), output_format)?;

    let running = Arc::new(AtomicBool::new(true));
    let host_delivery = {
        let running = running.clone();
        let config = config.clone();
        tokio::task::spawn_blocking(move || {
            deliver_test_media(&mut send_bridge, &config, &running);
            send_bridge.stop();
        })
    };

    // Receive side: discovery, then follow the configured target
    match context.refresh_directory(config.discovery_timeout(), config.discovery_capacity) {
        Ok(count) => info!(
            streams = count,
            selection = ?context.directory.selection_list(),
            "Discovered streams"
        ),
        Err(e) => warn!("Initial discovery failed: {}", e),
    }

    let mut receive_bridge = ReceiveBridge::start(
        &context,
        Box::new(LoggingSink::new(config.target.clone())),
        receive_config,
    )?;
    receive_bridge.set_target(&config.target)?;

    let refresher = {
        let context = context.clone();
        let timeout = config.discovery_timeout();
        let capacity = config.discovery_capacity;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(DIRECTORY_REFRESH);
            loop {
                ticker.tick().await;
                let context = context.clone();
                let refreshed = tokio::task::spawn_blocking(move || {
                    context.refresh_directory(timeout, capacity)
                })
                .await;
                if let Ok(Err(e)) = refreshed {
                    warn!("Directory refresh failed: {}", e);
                }
            }
        })
    };

    // Start metrics server
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let metrics_server = tokio::spawn(serve_metrics(
        config.metrics_port,
        context.directory.clone(),
        async move {
            shutdown_rx.await.ok();
        },
    ));

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal");

    refresher.abort();
    running.store(false, Ordering::SeqCst);

    // Joining the receive thread blocks for at most one poll plus one idle sleep
    tokio::task::spawn_blocking(move || receive_bridge.stop()).await?;
    host_delivery.await?;

    // Signal shutdown to metrics server
    let _ = shutdown_tx.send(());
    metrics_server.await?;

    info!("Bridge shutdown complete");
    Ok(())
}

/// Drive the output from two host-like threads, one per media kind, until `running` clears
fn deliver_test_media(send_bridge: &mut SendBridge, config: &Config, running: &AtomicBool) {
    let frame_interval = Duration::from_secs(1) / config.fps.max(1);
    let audio_frames = config.audio_frames_per_video_frame();
    let (video, audio) = send_bridge.outputs();

    thread::scope(|scope| {
        scope.spawn(|| {
            let mut pattern = TestPattern::new(config.width, config.height);
            let started = Instant::now();
            while running.load(Ordering::SeqCst) {
                let timestamp_ns = started.elapsed().as_nanos() as u64;
                video.send(&pattern.next_frame(timestamp_ns));
                thread::sleep(frame_interval);
            }
            info!(frames = pattern.frames_rendered(), "Video delivery stopped");
        });

        scope.spawn(|| {
            let mut tone = ToneGenerator::new(config.channels, config.sample_rate, 440.0);
            let started = Instant::now();
            while running.load(Ordering::SeqCst) {
                let planes = tone.next_planes(audio_frames);
                let planes = convert_planes(planes, config);
                let plane_refs: Vec<&[u8]> = planes.iter().map(Vec::as_slice).collect();
                audio.send(&HostAudioFrame {
                    format: config.audio_format.into(),
                    channels: config.channels,
                    sample_rate: config.sample_rate,
                    planes: &plane_refs,
                    frames: audio_frames,
                    timestamp_ns: started.elapsed().as_nanos() as u64,
                });
                thread::sleep(frame_interval);
            }
            info!(samples = audio.sample_tick(), "Audio delivery stopped");
        });
    });
}

/// Re-encode the generator's f32 planes into the configured demo sample format
fn convert_planes(planes: Vec<Vec<u8>>, config: &Config) -> Vec<Vec<u8>> {
    use nvi_bridge::config::DemoSampleFormat;

    let samples = |plane: &[u8]| -> Vec<f32> {
        plane
            .chunks_exact(4)
            .map(|bytes| f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect()
    };

    match config.audio_format {
        DemoSampleFormat::FloatPlanar => planes,
        DemoSampleFormat::S16Planar => planes
            .iter()
            .map(|plane| {
                samples(plane.as_slice())
                    .into_iter()
                    .flat_map(|sample| ((sample * f32::from(i16::MAX)) as i16).to_ne_bytes())
                    .collect::<Vec<u8>>()
            })
            .collect(),
        DemoSampleFormat::U8Planar => planes
            .iter()
            .map(|plane| {
                samples(plane.as_slice())
                    .into_iter()
                    .map(|sample| ((sample + 1.0) * 0.5 * f32::from(u8::MAX)) as u8)
                    .collect::<Vec<u8>>()
            })
            .collect(),
    }
}
