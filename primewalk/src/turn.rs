use crate::error::InternalError;
use crate::oracle::{PrimalityTest, PrimeOracle};
use crate::state::{CaseState, Dimensions};
use crate::store::ColorTag;

/// What a single step did to the heading.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Step {
    /// The verdict differs from the previous one; the (x, y) heading rotated.
    pub turned: bool,
    /// Previous value was not prime and the current one is.
    pub rising: bool,
}

impl Step {
    pub fn color(&self) -> ColorTag {
        ColorTag::from_turn(self.turned)
    }
}

/// Advances `state` by one iteration for the value `n`.
///
/// The planar heading rotates on any change of verdict, while the depth step (spatial
/// walks only) advances on rising edges alone. The sign flips unconditionally.
pub fn step<T: PrimalityTest>(
    oracle: &mut PrimeOracle<T>,
    n: i64,
    state: &mut CaseState,
    dims: Dimensions,
) -> Result<Step, InternalError> {
    let mut heading = state.heading.validate()?;

    let current = oracle.is_prime(n);
    let outcome = Step { turned: current != state.was_prime_previous, rising: current && !state.was_prime_previous };

    if current {
        state.stats.primes += 1;
    } else {
        state.stats.composites += 1;
    }
    state.stats.iterations += 1;
    state.was_prime_previous = current;
    state.last_value = n;

    if outcome.turned {
        heading = heading.rotated_ccw()?;
    }
    if dims == Dimensions::Spatial && outcome.rising {
        heading = heading.next_depth();
    }
    state.heading = heading;
    state.sign = state.sign.flip();
    state.position.advance(heading, dims);
    Ok(outcome)
}
