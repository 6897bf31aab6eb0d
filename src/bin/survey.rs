use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use futures::future::join_all;
use lawnmower_guidance::geo::GeoPoint;
use lawnmower_guidance::messages::{
    AbortSignal, FollowState, PositionEstimate, Proximity, ReferenceCommand, ReferenceFeedback,
    SpeedUnits,
};
use lawnmower_guidance::pattern::LawnmowerPattern;
use lawnmower_guidance::{
    BUS_CAPACITY, BusEvent, GuidanceCommand, GuidanceConfig, GuidanceFleet, GuidanceRunner,
    MissionRequest, VehicleId, VehicleKind,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Simulation step of the fake vehicle.
const SIM_STEP: Duration = Duration::from_millis(200);
/// The fake vehicle moves this many times faster than the commanded speed.
const SIM_SPEEDUP: f64 = 5.0;
/// Survey origins of successive vehicles are this far apart (north, meters).
const VEHICLE_SEPARATION_M: f64 = 500.0;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let settings = SurveySettings::from_env()?;

    info!(
        vehicles = ?settings.vehicles,
        legs = settings.pattern.leg_count,
        leg_length = settings.pattern.leg_length,
        leg_spacing = settings.pattern.leg_spacing,
        "Starting lawnmower survey simulation"
    );

    let (bus, _) = broadcast::channel(BUS_CAPACITY);
    let fleet = GuidanceFleet::new();
    let mut runners = Vec::new();

    for (index, vehicle_id) in settings.vehicles.iter().enumerate() {
        let config = GuidanceConfig::builder()
            .vehicle_id(vehicle_id.clone())
            .vehicle_kind(settings.kind)
            .horizontal_tolerance(settings.horizontal_tolerance)
            .default_speed(settings.default_speed)
            .speed_units(settings.speed_units)
            .build();

        let (commands, outbound) = mpsc::unbounded_channel();
        let (runner, handle) = GuidanceRunner::init(config, bus.subscribe(), commands);
        runners.push(tokio::spawn(runner.run()));
        fleet.register(handle)?;

        let start = settings.origin_of(index).displaced(-30.0, -20.0);
        tokio::spawn(simulate_vehicle(vehicle_id.clone(), start, bus.clone(), outbound));
    }

    tokio::time::sleep(settings.startup_delay).await;

    for (index, vehicle_id) in settings.vehicles.iter().enumerate() {
        let handle = fleet.handle(vehicle_id)?;
        // Vehicles share the bus, so each needs its own entity id to tell feedback apart.
        let control_entity_id = u8::try_from(index).context("too many vehicles for one bus")?;
        let request = MissionRequest::builder()
            .origin(settings.origin_of(index))
            .pattern(settings.pattern)
            .control_entity_id(control_entity_id)
            .build();

        let mission = handle
            .start_mission(request)
            .await
            .with_context(|| format!("failed to start survey for {vehicle_id}"))?;
        info!(vehicle_id = %vehicle_id, mission_id = %mission.mission_id, "Survey started");
    }

    if let (Some(delay), Some(target)) = (settings.abort_after, settings.vehicles.first()) {
        let abort_bus = bus.clone();
        let destination_id = target.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            warn!(vehicle_id = %destination_id, "Sending abort");
            let _ = abort_bus.send(BusEvent::Abort(AbortSignal { destination_id }));
        });
    }

    let mut poll = interval(Duration::from_secs(1));
    loop {
        poll.tick().await;

        let mut finished = true;
        for handle in fleet.handles() {
            let status = handle.status().await?;
            debug!(vehicle_id = %handle.vehicle_id(), status = ?status, "Guidance status");
            finished &= status.state.is_terminal();
        }

        if finished {
            break;
        }
    }

    for handle in fleet.handles() {
        let status = handle.status().await?;
        info!(vehicle_id = %handle.vehicle_id(), state = ?status.state, "Survey finished");
        handle.shutdown().await?;
        fleet.remove(handle.vehicle_id())?;
    }

    join_all(runners).await;
    Ok(())
}

struct SurveySettings {
    vehicles: Vec<VehicleId>,
    kind: VehicleKind,
    origin: GeoPoint,
    pattern: LawnmowerPattern,
    horizontal_tolerance: f64,
    default_speed: f64,
    speed_units: SpeedUnits,
    startup_delay: Duration,
    abort_after: Option<Duration>,
}

impl SurveySettings {
    fn from_env() -> Result<Self> {
        let vehicles = std::env::var("VEHICLE_IDS")
            .unwrap_or_else(|_| "caravela".to_string())
            .split(',')
            .map(str::parse)
            .collect::<Result<Vec<VehicleId>, _>>()
            .context("invalid VEHICLE_IDS")?;

        let abort_after = match std::env::var("ABORT_AFTER_SECS") {
            Ok(secs) => Some(Duration::from_secs_f64(
                secs.parse()
                    .with_context(|| format!("invalid ABORT_AFTER_SECS: {secs}"))?,
            )),
            Err(_) => None,
        };

        Ok(Self {
            vehicles,
            kind: env_or("VEHICLE_KIND", VehicleKind::Auv)?,
            origin: GeoPoint::new(env_or("ORIGIN_LAT", 41.1850)?, env_or("ORIGIN_LON", -8.7060)?),
            pattern: LawnmowerPattern::new(
                env_or("LEG_LENGTH", 20.0)?,
                env_or("LEG_SPACING", 10.0)?,
                env_or("LEG_COUNT", 6)?,
            ),
            horizontal_tolerance: env_or("HORIZONTAL_TOLERANCE", 2.0)?,
            default_speed: env_or("DEFAULT_SPEED", 1.2)?,
            speed_units: env_or("SPEED_UNITS", SpeedUnits::MetersPerSecond)?,
            startup_delay: Duration::from_secs_f64(env_or("WAITING_TIME_SECS", 2.0)?),
            abort_after,
        })
    }

    fn origin_of(&self, index: usize) -> GeoPoint {
        self.origin.displaced(index as f64 * VEHICLE_SEPARATION_M, 0.0)
    }
}

fn env_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .with_context(|| format!("invalid {name}: {value}")),
        Err(_) => Ok(default),
    }
}

/// A vehicle that flies straight at whatever reference it was last given and publishes noisy
/// position estimates and follower feedback on the bus.
async fn simulate_vehicle(
    vehicle_id: VehicleId,
    start: GeoPoint,
    bus: broadcast::Sender<BusEvent>,
    mut commands: mpsc::UnboundedReceiver<GuidanceCommand>,
) {
    let mut rng = StdRng::from_os_rng();
    let mut position = start;
    let mut z = 0.0;
    let mut target: Option<ReferenceCommand> = None;
    let mut controller: Option<(u16, u8)> = None;
    let mut ticker = interval(SIM_STEP);

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(GuidanceCommand::StartMission(start)) => {
                    info!(vehicle_id = %vehicle_id, plan_id = %start.plan_id, "Vehicle executing plan");
                    controller = Some((start.control_source_id, start.control_entity_id));
                }
                Some(GuidanceCommand::StopMission(stop)) => {
                    info!(vehicle_id = %vehicle_id, plan_id = %stop.plan_id, "Vehicle stopping plan");
                    controller = None;
                    target = None;
                }
                Some(GuidanceCommand::Reference(reference)) => {
                    if controller.is_some() {
                        target = Some(reference);
                    }
                }
                None => break,
            },

            _ = ticker.tick() => {
                if let Some(reference) = &target {
                    let goal = GeoPoint::new(reference.latitude, reference.longitude);
                    let (north, east) = position.offset_to(&goal);
                    let distance = north.hypot(east);

                    let speed = match reference.speed_units {
                        SpeedUnits::MetersPerSecond => reference.speed,
                        SpeedUnits::Rpm | SpeedUnits::Percent => 1.5,
                    };
                    let step = (speed * SIM_SPEEDUP * SIM_STEP.as_secs_f64()).min(distance);
                    if distance > 0.0 {
                        position = position.displaced(north / distance * step, east / distance * step);
                    }

                    let dz = reference.depth_or_altitude - z;
                    z += dz.clamp(-0.5, 0.5);

                    if let Some((control_source_id, control_entity_id)) = controller {
                        let remaining = (distance - step).max(0.0);
                        let mut proximity = Proximity::empty();
                        if remaining <= reference.loiter_radius {
                            proximity |= Proximity::XY_NEAR;
                        }
                        if (reference.depth_or_altitude - z).abs() <= 1.0 {
                            proximity |= Proximity::Z_NEAR;
                        }
                        let follow_state = if proximity.is_near() {
                            FollowState::Loiter
                        } else {
                            proximity |= Proximity::FAR;
                            FollowState::Goto
                        };

                        let _ = bus.send(BusEvent::Feedback(ReferenceFeedback {
                            control_source_id,
                            control_entity_id,
                            proximity,
                            follow_state,
                        }));
                    }
                }

                let timestamp = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();

                let _ = bus.send(BusEvent::Position(PositionEstimate {
                    vehicle_id: vehicle_id.clone(),
                    latitude: position.latitude,
                    longitude: position.longitude,
                    depth_or_altitude: z,
                    local_offset_x: rng.random_range(-0.3..0.3),
                    local_offset_y: rng.random_range(-0.3..0.3),
                    timestamp,
                }));
            }
        }
    }

    debug!(vehicle_id = %vehicle_id, "Vehicle simulation ended");
}
