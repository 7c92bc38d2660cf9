// timers always run at 60Hz
const TIMER_DELAY: u128 = 1_000_000 / 60;

/// Work due after some wall clock time has passed
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Due {
    pub cycles: u32,
    pub timer_ticks: u32,
}

/// Splits elapsed time into CPU cycles and timer ticks.
///
/// The two run at independent rates; leftover time is carried over to
/// the next call.
pub struct Clock {
    cycle_delay: u128,
    cpu_delta: u128,
    timer_delta: u128,
}

impl Clock {
    /// Clock running the CPU at `clock_speed` instructions per second.
    pub fn new(clock_speed: u32) -> Self {
        Clock {
            cycle_delay: 1_000_000 / clock_speed.max(1) as u128,
            cpu_delta: 0,
            timer_delta: 0,
        }
    }

    /// Account for `elapsed` microseconds.
    pub fn advance(&mut self, elapsed: u128) -> Due {
        let mut due = Due::default();
        self.cpu_delta += elapsed;
        self.timer_delta += elapsed;

        while self.cpu_delta >= self.cycle_delay {
            due.cycles += 1;
            self.cpu_delta -= self.cycle_delay;
        }

        while self.timer_delta >= TIMER_DELAY {
            due.timer_ticks += 1;
            self.timer_delta -= TIMER_DELAY;
        }

        due
    }
}
