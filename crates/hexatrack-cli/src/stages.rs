// crates/hexatrack-cli/src/stages.rs
// ============================================================================
// Module: Stage Assembly
// Description: Wiring of sockets, adapters, and domain services per stage.
// Purpose: Build runnable A, B, and C stages from configuration.
// Dependencies: hexatrack-adapters, hexatrack-config, hexatrack-core, tokio
// ============================================================================

//! ## Overview
//! Each stage is an [`AdapterManager`] holding its pipelines plus, for the
//! queued stages, the domain service whose worker must run alongside them.
//! Sockets come from a factory so the same wiring runs over UDP or over an
//! in-process [`hexatrack_transport::MemoryBus`].
//!
//! # Invariants
//! - The domain worker starts before any adapter.
//! - On stop, the inputs close first, the worker drains its queue into the
//!   still-open outputs, and the outputs close last.
//! - A failed start leaves nothing running.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Display;
use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use hexatrack_adapters::AdapterManager;
use hexatrack_adapters::DelayStatisticsAdapter;
use hexatrack_adapters::DishIncomingAdapter;
use hexatrack_adapters::JsonLinesAdapter;
use hexatrack_adapters::MessagePipeline;
use hexatrack_adapters::RadioOutgoingAdapter;
use hexatrack_config::Channel;
use hexatrack_config::HexatrackConfig;
use hexatrack_config::ResolvedChannel;
use hexatrack_core::Clock;
use hexatrack_core::DelayCalcTrackData;
use hexatrack_core::ExtrapTrackData;
use hexatrack_core::FanOut;
use hexatrack_core::FinalCalcTrackData;
use hexatrack_core::LatencySummary;
use hexatrack_core::OutgoingPort;
use hexatrack_core::SystemClock;
use hexatrack_core::TrackData;
use hexatrack_core::logic::DelayCalculator;
use hexatrack_core::logic::ExtrapolationSchedule;
use hexatrack_core::logic::FinalCalculationService;
use hexatrack_core::logic::ProcessTrackUseCase;
use hexatrack_core::logic::TargetStatisticService;
use hexatrack_core::logic::TrackDataExtrapolator;
use hexatrack_core::telemetry::LatencySnapshot;
use hexatrack_transport::MessageSocket;
use hexatrack_transport::SocketType;
use hexatrack_transport::UdpGroupSocket;

use crate::CliError;
use crate::CliResult;

// ============================================================================
// SECTION: Socket Factory
// ============================================================================

/// Creates a fresh socket of the requested role.
pub(crate) type SocketFactory = dyn Fn(SocketType) -> Arc<dyn MessageSocket> + Send + Sync;

/// Returns a UDP RADIO/DISH socket whose DISH side buffers `receive_buffer`
/// messages.
pub(crate) fn udp_socket(socket_type: SocketType, receive_buffer: usize) -> UdpGroupSocket {
    UdpGroupSocket::new(socket_type).with_receive_buffer(receive_buffer)
}

/// Returns a factory of UDP sockets sized by `receive_buffer`.
pub(crate) fn udp_sockets(receive_buffer: usize) -> impl Fn(SocketType) -> Arc<dyn MessageSocket> + Send + Sync {
    move |socket_type| Arc::new(udp_socket(socket_type, receive_buffer)) as Arc<dyn MessageSocket>
}

/// Formats a stage build failure.
fn build_error(stage: &str, err: impl Display) -> CliError {
    CliError::new(format!("failed to build {stage} stage: {err}"))
}

// ============================================================================
// SECTION: Stage
// ============================================================================

/// Queued domain service owned by a stage.
enum QueuedService {
    /// Stage B delay processing.
    ProcessTrack(Arc<ProcessTrackUseCase>),
    /// Stage C final calculation.
    TargetStatistic(Arc<TargetStatisticService>),
}

impl QueuedService {
    /// Starts the worker.
    fn start(&self) {
        match self {
            Self::ProcessTrack(service) => service.start(),
            Self::TargetStatistic(service) => service.start(),
        }
    }

    /// Stops the worker.
    async fn stop(&self) {
        match self {
            Self::ProcessTrack(service) => service.stop().await,
            Self::TargetStatistic(service) => service.stop().await,
        }
    }
}

/// A runnable pipeline stage.
pub(crate) struct Stage {
    /// Stage label used in logs.
    name: &'static str,
    /// Registered pipelines.
    manager: AdapterManager,
    /// Worker started before the pipelines, if any.
    service: Option<QueuedService>,
    /// Delay statistics sink, stage B only.
    statistics: Option<Arc<DelayStatisticsAdapter>>,
    /// Latency statistics collected by the domain service.
    metrics: Arc<LatencySummary>,
}

impl Stage {
    /// Returns the stage label.
    pub(crate) const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the current latency statistics.
    pub(crate) fn snapshot(&self) -> LatencySnapshot {
        self.metrics.snapshot()
    }

    /// Starts the domain worker, then every pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`CliError`] when any pipeline fails to start; everything
    /// already started is stopped again.
    pub(crate) async fn start(&self) -> CliResult<()> {
        if let Some(service) = &self.service {
            service.start();
        }
        if let Err(err) = self.manager.start_all().await {
            self.stop().await;
            return Err(CliError::new(format!("failed to start {} stage: {err}", self.name)));
        }
        tracing::info!(
            stage = self.name,
            pipelines = self.manager.pipeline_count(),
            "stage started"
        );
        Ok(())
    }

    /// Stops the incoming adapters, the domain worker, then the outgoing
    /// adapters, and logs the latency summary.
    pub(crate) async fn stop(&self) {
        self.manager.stop_incoming().await;
        if let Some(service) = &self.service {
            service.stop().await;
        }
        self.manager.stop_outgoing().await;
        let snapshot = self.metrics.snapshot();
        tracing::info!(
            stage = self.name,
            hop1_count = snapshot.hop1.count,
            hop1_mean_us = snapshot.hop1.mean_us,
            hop2_count = snapshot.hop2.count,
            hop2_mean_us = snapshot.hop2.mean_us,
            total_count = snapshot.total.count,
            total_min_us = snapshot.total.min_us,
            total_max_us = snapshot.total.max_us,
            total_mean_us = snapshot.total.mean_us,
            dropped = snapshot.dropped,
            "latency summary"
        );
        if let Some(statistics) = &self.statistics {
            tracing::info!(
                stage = self.name,
                samples = statistics.sample_count(),
                moving_average_us = statistics.moving_average(),
                "first-hop delay moving average"
            );
        }
    }
}

/// Runs `stage` until `shutdown` resolves, then lingers and stops it.
///
/// # Errors
///
/// Returns [`CliError`] when the stage fails to start.
pub(crate) async fn run_stage(
    stage: &Stage,
    linger: Duration,
    shutdown: impl Future<Output = ()>,
) -> CliResult<LatencySnapshot> {
    stage.start().await?;
    shutdown.await;
    tracing::info!(stage = stage.name(), "shutdown requested");
    if !linger.is_zero() {
        tokio::time::sleep(linger).await;
    }
    stage.stop().await;
    Ok(stage.snapshot())
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Resolves a channel, labelling errors with the stage name.
fn resolve(config: &HexatrackConfig, stage: &str, channel: Channel) -> CliResult<ResolvedChannel> {
    config.channel(channel).map_err(|err| build_error(stage, err))
}

/// Builds stage A: TrackData DISH, extrapolator, ExtrapTrackData RADIO.
///
/// # Errors
///
/// Returns [`CliError`] for unresolvable channels or invalid rates.
pub(crate) fn build_extrapolate(config: &HexatrackConfig, sockets: &SocketFactory) -> CliResult<Stage> {
    const STAGE: &str = "extrapolate";
    let input = resolve(config, STAGE, Channel::TrackData)?;
    let output = resolve(config, STAGE, Channel::ExtrapTrackData)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics = Arc::new(LatencySummary::new());
    let schedule = ExtrapolationSchedule::new(
        config.pipeline.input_frequency_hz,
        config.pipeline.output_frequency_hz,
    )
    .map_err(|err| build_error(STAGE, err))?;

    let radio = Arc::new(RadioOutgoingAdapter::<ExtrapTrackData>::new(
        sockets(SocketType::Radio),
        output.endpoint,
        output.group,
    ));
    let extrapolator = Arc::new(
        TrackDataExtrapolator::new(radio.clone(), clock)
            .with_schedule(schedule)
            .with_emit_interval(config.pipeline.emit_interval())
            .with_metrics(metrics.clone()),
    );
    let dish = Arc::new(
        DishIncomingAdapter::<TrackData>::new(
            sockets(SocketType::Dish),
            input.endpoint,
            input.group,
            extrapolator,
        )
        .with_receive_timeout(config.network.receive_timeout()),
    );

    let manager = AdapterManager::new();
    manager.register(MessagePipeline::new(Channel::TrackData.as_str()).with_incoming(dish).with_outgoing(radio));
    Ok(Stage {
        name: STAGE,
        manager,
        service: None,
        statistics: None,
        metrics,
    })
}

/// Builds stage B: ExtrapTrackData DISH, delay processing, fan-out to the
/// DelayCalcTrackData RADIO and the delay statistics sink.
///
/// # Errors
///
/// Returns [`CliError`] for unresolvable channels or invalid queue limits.
pub(crate) fn build_delay(config: &HexatrackConfig, sockets: &SocketFactory) -> CliResult<Stage> {
    const STAGE: &str = "delay";
    let input = resolve(config, STAGE, Channel::ExtrapTrackData)?;
    let output = resolve(config, STAGE, Channel::DelayCalcTrackData)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics = Arc::new(LatencySummary::new());

    let radio = Arc::new(RadioOutgoingAdapter::<DelayCalcTrackData>::new(
        sockets(SocketType::Radio),
        output.endpoint,
        output.group,
    ));
    let statistics = Arc::new(
        DelayStatisticsAdapter::with_limits(
            config.pipeline.statistics_queue_capacity,
            config.pipeline.moving_average_window,
            config.pipeline.queue_wait(),
        )
        .map_err(|err| build_error(STAGE, err))?,
    );
    let targets = vec![
        radio.clone() as Arc<dyn OutgoingPort<DelayCalcTrackData>>,
        statistics.clone() as Arc<dyn OutgoingPort<DelayCalcTrackData>>,
    ];
    let service = Arc::new(
        ProcessTrackUseCase::with_queue(
            Arc::new(DelayCalculator::new(clock)),
            Arc::new(FanOut::new(targets)),
            config.pipeline.queue_capacity,
            config.pipeline.queue_wait(),
        )
        .map_err(|err| build_error(STAGE, err))?
        .with_metrics(metrics.clone()),
    );
    let dish = Arc::new(
        DishIncomingAdapter::<ExtrapTrackData>::new(
            sockets(SocketType::Dish),
            input.endpoint,
            input.group,
            service.clone(),
        )
        .with_receive_timeout(config.network.receive_timeout()),
    );

    let manager = AdapterManager::new();
    manager.register(
        MessagePipeline::new(Channel::ExtrapTrackData.as_str()).with_incoming(dish).with_outgoing(radio),
    );
    manager.register(MessagePipeline::new("DelayStatistics").with_outgoing(statistics.clone()));
    Ok(Stage {
        name: STAGE,
        manager,
        service: Some(QueuedService::ProcessTrack(service)),
        statistics: Some(statistics),
        metrics,
    })
}

/// Builds stage C: DelayCalcTrackData DISH, final calculation,
/// FinalCalcTrackData RADIO, plus an optional JSON-lines mirror.
///
/// # Errors
///
/// Returns [`CliError`] for unresolvable channels or invalid queue limits.
pub(crate) fn build_finalize(
    config: &HexatrackConfig,
    sockets: &SocketFactory,
    jsonl: Option<Box<dyn Write + Send>>,
) -> CliResult<Stage> {
    const STAGE: &str = "finalize";
    let input = resolve(config, STAGE, Channel::DelayCalcTrackData)?;
    let output = resolve(config, STAGE, Channel::FinalCalcTrackData)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metrics = Arc::new(LatencySummary::new());
    let manager = AdapterManager::new();

    let radio = Arc::new(RadioOutgoingAdapter::<FinalCalcTrackData>::new(
        sockets(SocketType::Radio),
        output.endpoint,
        output.group,
    ));
    let mut targets = vec![radio.clone() as Arc<dyn OutgoingPort<FinalCalcTrackData>>];
    if let Some(writer) = jsonl {
        let sink = Arc::new(JsonLinesAdapter::new(writer));
        targets.push(sink.clone());
        manager.register(MessagePipeline::new("FinalCalcJsonLines").with_outgoing(sink));
    }
    let calculation = FinalCalculationService::new(Arc::new(FanOut::new(targets)), clock).with_metrics(metrics.clone());
    let service = Arc::new(
        TargetStatisticService::with_queue(
            calculation,
            config.pipeline.queue_capacity,
            config.pipeline.queue_wait(),
        )
        .map_err(|err| build_error(STAGE, err))?,
    );
    let dish = Arc::new(
        DishIncomingAdapter::<DelayCalcTrackData>::new(
            sockets(SocketType::Dish),
            input.endpoint,
            input.group,
            service.clone(),
        )
        .with_receive_timeout(config.network.receive_timeout()),
    );

    manager.register(
        MessagePipeline::new(Channel::DelayCalcTrackData.as_str()).with_incoming(dish).with_outgoing(radio),
    );
    Ok(Stage {
        name: STAGE,
        manager,
        service: Some(QueuedService::TargetStatistic(service)),
        statistics: None,
        metrics,
    })
}
