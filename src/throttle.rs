use crate::{Filter, Q};

/// Calibration state of a [`Throttle`].
///
/// The state only ever advances `CalMaxMin` → `CalCalc` → `Run`; it never
/// reverts on its own. Re-entering calibration requires an explicit
/// [`Calibration::Start`] command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Collecting the observed extrema of the raw input.
    CalMaxMin,
    /// Computing the affine coefficients from the collected extrema.
    CalCalc,
    /// Normal operation: mapping filtered input to the output range.
    Run,
}

/// Calibration command latched by [`Throttle::calibrate`] and consumed by
/// the next [`Throttle::run`] call.
///
/// Latching a new command before the next `run` replaces the previous one,
/// so the last write before a cycle wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Calibration {
    /// No pending command.
    #[default]
    None,
    /// Re-enter extrema collection, discarding the previous calibration.
    Start,
    /// Leave extrema collection and compute the affine coefficients.
    Stop,
}

/// Configuration for a [`Throttle`].
///
/// - `invert`: reverse the output polarity relative to the input direction
/// - `max_in`, `min_in`: expected bounds of the raw input; live calibration
///   replaces them with observed extrema
/// - `max_out`, `min_out`: bounds of the desired output range
///
/// The bounds are trusted as given: `max >= min` ordering is the caller's
/// responsibility and is only checked in debug builds.
///
/// # Examples
///
/// ```
/// use throttle_calibrator::{Config, Q};
///
/// let config = Config {
///     invert: false,
///     max_in: Q::from_num(9),   // raw sensor units
///     min_in: Q::from_num(1),
///     max_out: Q::from_num(1),  // per-unit output
///     min_out: Q::ZERO,
/// };
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub invert: bool,
    pub max_in: Q,
    pub min_in: Q,
    pub max_out: Q,
    pub min_out: Q,
}

/// Converts a raw throttle sensor reading into a calibrated, filtered
/// output value for a motor-control loop.
///
/// Each control cycle, [`run`](Throttle::run) feeds the raw sample through
/// the owned [`Filter`] and dispatches the calibration state machine: while
/// calibrating, the observed extrema of the raw input are collected; once a
/// [`Calibration::Stop`] command arrives, a two-point line fit maps the
/// input range onto the configured output range, and subsequent cycles
/// apply `result = slope * filtered + offset`, clamped to the output range.
#[derive(Debug)]
pub struct Throttle<F> {
    max_in: Q,
    min_in: Q,
    max_out: Q,
    min_out: Q,
    slope: Q,
    offset: Q,
    raw_value: Q,
    result: Q,
    command: Calibration,
    seeded: bool,
    state: State,
    filter: F,
}

impl<F: Filter> Throttle<F> {
    /// Returns a throttle owning `filter`, configured per `config`.
    ///
    /// The throttle starts in [`State::CalMaxMin`]; `slope`, `offset` and
    /// the result stay zero until a [`Calibration::Stop`] command completes
    /// calibration. A host that trusts the configured input bounds can skip
    /// live calibration by latching `Stop` before the first cycle.
    ///
    /// # Examples
    ///
    /// ```
    /// use throttle_calibrator::{Calibration, Config, Passthrough, Throttle, Q};
    ///
    /// let config = Config {
    ///     invert: false,
    ///     max_in: Q::from_num(9),
    ///     min_in: Q::from_num(1),
    ///     max_out: Q::from_num(1),
    ///     min_out: Q::ZERO,
    /// };
    /// let mut throttle = Throttle::new(Passthrough::default(), config);
    ///
    /// throttle.calibrate(Calibration::Stop);
    /// throttle.run(Q::from_num(5));
    /// throttle.run(Q::from_num(5));
    ///
    /// assert_eq!(throttle.result(), Q::from_num(0.5));
    /// ```
    pub fn new(filter: F, config: Config) -> Self {
        let mut throttle = Self {
            max_in: Q::ZERO,
            min_in: Q::ZERO,
            max_out: Q::ZERO,
            min_out: Q::ZERO,
            slope: Q::ZERO,
            offset: Q::ZERO,
            raw_value: Q::ZERO,
            result: Q::ZERO,
            command: Calibration::None,
            seeded: false,
            state: State::CalMaxMin,
            filter,
        };
        throttle.set_params(config);
        throttle
    }

    /// Stores the calibration bounds from `config`.
    ///
    /// With `invert` set, the output bounds are stored swapped, so the
    /// affine map reverses output polarity relative to input direction.
    /// Bounds set here survive into the line fit only if no extrema are
    /// collected before the [`Calibration::Stop`] command.
    pub fn set_params(&mut self, config: Config) {
        debug_assert!(
            config.max_in >= config.min_in,
            "input bounds must satisfy max_in >= min_in"
        );
        debug_assert!(
            config.max_out >= config.min_out,
            "output bounds must satisfy max_out >= min_out"
        );

        self.max_in = config.max_in;
        self.min_in = config.min_in;

        if config.invert {
            self.max_out = config.min_out;
            self.min_out = config.max_out;
        } else {
            self.max_out = config.max_out;
            self.min_out = config.min_out;
        }
    }

    /// Latches a calibration command for the next [`run`](Throttle::run)
    /// call, replacing any command latched earlier in the cycle.
    pub fn calibrate(&mut self, command: Calibration) {
        self.command = command;
    }

    /// Advances the throttle by one control cycle.
    ///
    /// Feeds `raw` into the owned filter, then dispatches the calibration
    /// state machine. Must be called exactly once per control cycle: the
    /// extrema collected during calibration track one sample per call.
    ///
    /// # Examples
    ///
    /// ```
    /// use throttle_calibrator::{Calibration, Config, Passthrough, State, Throttle, Q};
    ///
    /// let config = Config {
    ///     invert: false,
    ///     max_in: Q::ZERO,
    ///     min_in: Q::ZERO,
    ///     max_out: Q::from_num(1),
    ///     min_out: Q::ZERO,
    /// };
    /// let mut throttle = Throttle::new(Passthrough::default(), config);
    ///
    /// // Collect extrema over five cycles, then complete calibration.
    /// for raw in [5, 2, 9, 1, 7] {
    ///     throttle.run(Q::from_num(raw));
    /// }
    /// throttle.calibrate(Calibration::Stop);
    /// throttle.run(Q::from_num(7));
    ///
    /// assert_eq!(throttle.state(), State::Run);
    ///
    /// // Raw 1..=9 now maps onto 0..=1.
    /// throttle.run(Q::from_num(9));
    /// assert_eq!(throttle.result(), Q::from_num(1));
    /// ```
    pub fn run(&mut self, raw: Q) {
        let filtered = self.filter.update(raw);
        self.raw_value = raw;
        self.run_state(raw, filtered);
    }

    /// Returns the current calibration state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Returns the last computed output value.
    ///
    /// Meaningful only once the state has reached [`State::Run`]; before
    /// that it stays at zero.
    pub fn result(&self) -> Q {
        self.result
    }

    /// Returns the last raw sample passed to [`run`](Throttle::run).
    pub fn raw_value(&self) -> Q {
        self.raw_value
    }

    /// Returns the last filtered value from the owned filter, independent
    /// of calibration state.
    pub fn filter_result(&self) -> Q {
        self.filter.value()
    }

    /// Destroys the throttle and returns the owned filter.
    pub fn free(self) -> F {
        self.filter
    }

    fn run_state(&mut self, raw: Q, filtered: Q) {
        if self.state == State::CalMaxMin {
            match self.take_command() {
                Calibration::Stop => self.state = State::CalCalc,
                Calibration::Start => {
                    self.seeded = false;
                    self.track(raw);
                }
                Calibration::None => self.track(raw),
            }
        }

        if self.state == State::CalCalc {
            self.calc();
            self.state = State::Run;
        } else if self.state == State::Run {
            match self.take_command() {
                Calibration::Start => {
                    self.state = State::CalMaxMin;
                    self.seeded = false;
                }
                // A stray Stop is consumed and ignored.
                Calibration::Stop | Calibration::None => self.result = self.map(filtered),
            }
        }
    }

    fn take_command(&mut self) -> Calibration {
        core::mem::replace(&mut self.command, Calibration::None)
    }

    /// The first sample after (re)entering calibration seeds both bounds;
    /// later samples only widen them.
    fn track(&mut self, raw: Q) {
        if self.seeded {
            self.max_in = self.max_in.max(raw);
            self.min_in = self.min_in.min(raw);
        } else {
            self.max_in = raw;
            self.min_in = raw;
            self.seeded = true;
        }
    }

    /// Two-point line fit through `(min_in, min_out)` and
    /// `(max_in, max_out)`. A degenerate input range pins the output to
    /// `min_out` instead of dividing by zero.
    fn calc(&mut self) {
        let span = self.max_in.saturating_sub(self.min_in);

        if span == Q::ZERO {
            self.slope = Q::ZERO;
            self.offset = self.min_out;
        } else {
            self.slope = self
                .max_out
                .saturating_sub(self.min_out)
                .saturating_div(span);
            self.offset = self
                .min_out
                .saturating_sub(self.slope.saturating_mul(self.min_in));
        }
    }

    /// Applies the affine map and clamps to the output range. The bounds
    /// are reordered first since `invert` stores them swapped.
    fn map(&self, filtered: Q) -> Q {
        let result = self
            .slope
            .saturating_mul(filtered)
            .saturating_add(self.offset);

        let (low, high) = if self.min_out <= self.max_out {
            (self.min_out, self.max_out)
        } else {
            (self.max_out, self.min_out)
        };

        result.clamp(low, high)
    }
}
