use impl_trait_for_tuples::impl_for_tuples;

/// A resource that only the runtime can produce, such as the current time.
///
/// The runner calls [`generate`](SystemResource::generate) and hands the value to the state
/// machine as [`SystemInput::System`], keeping the machine itself free of system calls.
pub trait SystemResource {
    /// Produce an instance of this resource from the ambient system context.
    fn generate() -> Self;
}

#[impl_for_tuples(1, 12)]
impl SystemResource for Tuple {
    fn generate() -> Self {
        for_tuples!( ( #( Tuple::generate() ),* ) )
    }
}

impl SystemResource for std::time::Instant {
    fn generate() -> Self {
        std::time::Instant::now()
    }
}

/// A [`StateMachine`](crate::state_machine::StateMachine) input that is either a domain event or
/// a freshly generated [`SystemResource`].
///
/// A lone `System` input acts as a clock tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SystemInput<I, S> {
    Input(I),
    System(S),
}
