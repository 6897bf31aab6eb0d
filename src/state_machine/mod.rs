pub mod abort;
pub mod guidance;
pub mod plan;
pub mod position;
pub mod wrappers;

/// The [`StateMachine`] trait is the narrow capability interface every guidance component is
/// built on: events go in through [`process_input`](StateMachine::process_input) and commands come
/// out through [`poll_output`](StateMachine::poll_output).
///
/// # Functionality
/// A component usually consumes several kinds of event (position samples, follower feedback,
/// abort signals) and emits several kinds of command. These are grouped into the associated
/// [`Input`](StateMachine::Input) and [`Output`](StateMachine::Output) types, normally enums, while
/// the inherent impl of the component keeps one method per variant. The trait impl is only the
/// dispatch mapping between the two.
///
/// Keeping the mapping in the trait lets a runner drive any component the same way: feed one
/// input, then drain outputs until `None`, then feed the next input. Components never call back
/// into the runner and are never reentered while handling an input.
///
/// # Invariants
/// A [`StateMachine`] must be pure: its behavior depends only on the inputs it has been given.
/// Replaying the same inputs must produce the same outputs. Implementors *must* uphold all of the
/// following.
///
/// ## No Interior Mutability
/// State is mutated only through `&mut self`. No [`std::cell`] containers, no [`std::sync`]
/// locks, no [`Rc`](std::rc::Rc)/[`Arc`](std::sync::Arc) sharing of anything mutable.
/// `&'static` references and immutable shared names such as
/// [`VehicleId`](crate::vehicle::VehicleId) are fine.
///
/// ## No IO
/// No [`std::io`], [`std::net`], or anything built on them. Sending a command means queuing it
/// for [`poll_output`](StateMachine::poll_output); the runner performs the actual send.
///
/// ### No System Time
/// Reading [`std::time::Instant::now`] or [`std::time::SystemTime`] inside the machine makes
/// staleness and keep-alive decisions irreproducible. The current time is supplied as input,
/// usually through [`SystemInput`](wrappers::input::system::SystemInput).
///
/// ### No System RNG
/// Identifiers that need entropy, such as mission ids, are generated by the caller and passed in.
///
/// ## No Concurrency
/// No threads, no async. The machine is driven by exactly one owner, one input at a time.
///
/// ## No Blocking
/// No sleeping, no waiting on locks, no long computations. Waiting for the next event is the
/// runner's job.
///
/// # Side Effects
/// Logging through `tracing` is allowed since nothing in the machine depends on its outcome.
///
/// # Example
/// ```ignore
/// let mut machine = GuidanceMachine::new(config);
/// let handle = machine.start_mission(request)?;
///
/// machine.process_input(SystemInput::System(Instant::now()));
/// machine.process_input(SystemInput::Input(BusEvent::Position(sample)));
///
/// while let Some(command) = machine.poll_output() {
///     bus.send(command);
/// }
/// ```
pub trait StateMachine {
    /// The type of input that is [processed](StateMachine::process_input) by the state machine.
    type Input;
    /// The type of output that is [polled](StateMachine::poll_output) from the state machine.
    type Output;

    /// Process the provided `input`, dispatching it to the matching handler.
    fn process_input(&mut self, input: Self::Input);

    /// Poll the state machine for output, returning the first available output if present.
    fn poll_output(&mut self) -> Option<Self::Output>;
}
