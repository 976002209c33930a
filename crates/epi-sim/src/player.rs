//! A timer thread that owns a [`Simulation`] and ticks it while playing.
//!
//! The thread owns the simulation exclusively.  Control commands arrive over
//! a crossbeam channel and each carries its own reply channel; they are
//! handled only between ticks, so no caller ever observes a half-applied
//! tick.  Snapshots are immutable copies taken between ticks.
//!
//! ```text
//! loop:
//!   PLAYING  → wait for a command until the next tick is due
//!                command  → apply, reply (play / set_speed restart the timer)
//!                timeout  → step(); next tick = now + base_interval / speed
//!   otherwise → block until a command arrives
//!   channel closed → stop and hand the simulation back
//! ```

use std::thread::{self, JoinHandle};
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::{SimError, SimResult, SimState, Simulation, WorldSnapshot};

enum Command {
    Play,
    Pause,
    Reset,
    Step,
    SetSpeed(f64),
    Snapshot,
}

enum Reply {
    Done,
    Snapshot(Box<WorldSnapshot>),
}

struct Request {
    command: Command,
    reply:   Sender<SimResult<Reply>>,
}

/// Handle to a simulation running on its own thread.
///
/// Dropping the handle stops the thread; [`shutdown`](Self::shutdown) also
/// returns the simulation.
pub struct Player {
    commands: Option<Sender<Request>>,
    handle:   Option<JoinHandle<Simulation>>,
}

impl Player {
    /// Move `sim` onto a new timer thread.  It does not tick until
    /// [`play`](Self::play) is called.
    pub fn spawn(sim: Simulation) -> SimResult<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        let handle = thread::Builder::new()
            .name("epi-sim-player".into())
            .spawn(move || run(sim, rx))?;
        Ok(Self { commands: Some(tx), handle: Some(handle) })
    }

    pub fn play(&self) -> SimResult<()> {
        self.request(Command::Play).map(drop)
    }

    pub fn pause(&self) -> SimResult<()> {
        self.request(Command::Pause).map(drop)
    }

    pub fn reset(&self) -> SimResult<()> {
        self.request(Command::Reset).map(drop)
    }

    /// Run one tick now.  Refused while playing: the timer owns the ticks.
    pub fn step(&self) -> SimResult<()> {
        self.request(Command::Step).map(drop)
    }

    /// Change the speed multiplier; the timer restarts with the new period.
    pub fn set_speed(&self, multiplier: f64) -> SimResult<()> {
        self.request(Command::SetSpeed(multiplier)).map(drop)
    }

    pub fn snapshot(&self) -> SimResult<WorldSnapshot> {
        match self.request(Command::Snapshot)? {
            Reply::Snapshot(s) => Ok(*s),
            Reply::Done => Err(SimError::PlayerStopped),
        }
    }

    /// Stop the thread between ticks and take the simulation back.
    pub fn shutdown(mut self) -> SimResult<Simulation> {
        self.stop().ok_or(SimError::PlayerStopped)
    }

    fn request(&self, command: Command) -> SimResult<Reply> {
        let commands = self.commands.as_ref().ok_or(SimError::PlayerStopped)?;
        let (reply, response) = crossbeam_channel::bounded(1);
        commands
            .send(Request { command, reply })
            .map_err(|_| SimError::PlayerStopped)?;
        response.recv().map_err(|_| SimError::PlayerStopped)?
    }

    fn stop(&mut self) -> Option<Simulation> {
        // Closing the channel is the shutdown signal.
        self.commands = None;
        self.handle.take()?.join().ok()
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── Thread body ───────────────────────────────────────────────────────────────

fn run(mut sim: Simulation, rx: Receiver<Request>) -> Simulation {
    let mut next_tick = Instant::now() + sim.tick_interval();
    loop {
        let received = if sim.state() == SimState::Playing {
            rx.recv_timeout(next_tick.saturating_duration_since(Instant::now()))
        } else {
            rx.recv().map_err(|_| RecvTimeoutError::Disconnected)
        };

        match received {
            Ok(Request { command, reply }) => {
                let restart = matches!(command, Command::Play | Command::SetSpeed(_));
                let result = apply(&mut sim, command);
                if restart {
                    next_tick = Instant::now() + sim.tick_interval();
                }
                // Best-effort reply: the caller may have gone away.
                let _ = reply.send(result);
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Err(e) = sim.step() {
                    log::error!("tick failed, pausing: {e}");
                    let _ = sim.pause();
                }
                next_tick = Instant::now() + sim.tick_interval();
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    log::debug!("player stopped in state {}", sim.state());
    sim
}

fn apply(sim: &mut Simulation, command: Command) -> SimResult<Reply> {
    match command {
        Command::Play => sim.play()?,
        Command::Pause => sim.pause()?,
        Command::Reset => sim.reset()?,
        Command::Step => {
            if sim.state() == SimState::Playing {
                return Err(SimError::InvalidTransition { state: SimState::Playing, action: "step" });
            }
            sim.step()?;
        }
        Command::SetSpeed(m) => sim.set_speed(m)?,
        Command::Snapshot => return Ok(Reply::Snapshot(Box::new(sim.snapshot()?))),
    }
    Ok(Reply::Done)
}
