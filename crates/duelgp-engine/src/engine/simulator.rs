use rand::Rng as _;
use rand_pcg::Pcg32;
use tracing::warn;

use crate::{
    Action, Arena, RobotState, Side, Vec2, compute_sensors, normalize_angle, wrap_heading,
};

use super::{
    Controller, PhysicsConfig,
    match_runner::{MatchResult, Offender, RobotReport, TerminalCondition},
};

/// Tick-by-tick state machine of one match.
///
/// Owns both robots' state and a private random stream; borrows the arena geometry,
/// the physics parameters and the two controllers for the lifetime of the match.
/// The simulator never advances past `max_ticks`.
///
/// # Example
///
/// ```
/// use duelgp_engine::{
///     Action, Arena, MatchSeed, PhysicsConfig, Pose, RobotState, Side, Simulator,
/// };
///
/// let arena = Arena::default();
/// let physics = PhysicsConfig::default();
/// let robots = [
///     RobotState::new(Pose::new(50.0, 50.0, 0.0), 100, 50),
///     RobotState::new(Pose::new(80.0, 50.0, 0.0), 100, 50),
/// ];
/// let mut sim = Simulator::new(
///     &arena,
///     &physics,
///     [&Action::Shoot, &Action::Noop],
///     robots,
///     10,
///     MatchSeed::new(0).rng(),
/// );
/// sim.step();
/// assert_eq!(sim.robot(Side::B).health, 80);
/// ```
#[derive(Debug)]
pub struct Simulator<'a> {
    arena: &'a Arena,
    physics: &'a PhysicsConfig,
    controllers: [&'a dyn Controller; 2],
    robots: [RobotState; 2],
    reports: [RobotReport; 2],
    tick: u32,
    max_ticks: u32,
    rng: Pcg32,
    terminal: Option<TerminalCondition>,
}

impl<'a> Simulator<'a> {
    #[must_use]
    pub fn new(
        arena: &'a Arena,
        physics: &'a PhysicsConfig,
        controllers: [&'a dyn Controller; 2],
        robots: [RobotState; 2],
        max_ticks: u32,
        rng: Pcg32,
    ) -> Self {
        let mut this = Self {
            arena,
            physics,
            controllers,
            robots,
            reports: [RobotReport::default(), RobotReport::default()],
            tick: 0,
            max_ticks,
            rng,
            terminal: None,
        };
        this.enforce_invariants();
        this.terminal = this.check_terminal();
        this
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn tick(&self) -> u32 {
        self.tick
    }

    #[must_use]
    pub const fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    #[must_use]
    pub const fn robot(&self, side: Side) -> &RobotState {
        &self.robots[side.index()]
    }

    /// Mutable access to a robot, for setting up scenarios before the first tick.
    pub const fn robot_mut(&mut self, side: Side) -> &mut RobotState {
        &mut self.robots[side.index()]
    }

    #[must_use]
    pub const fn report(&self, side: Side) -> &RobotReport {
        &self.reports[side.index()]
    }

    #[must_use]
    pub const fn terminal(&self) -> Option<TerminalCondition> {
        self.terminal
    }

    /// Advances the match by one tick.
    ///
    /// Returns the terminal condition once the match is over; calling `step` on a
    /// finished match does nothing and returns the same condition again.
    pub fn step(&mut self) -> Option<TerminalCondition> {
        if self.terminal.is_some() {
            return self.terminal;
        }

        let [a, b] = &self.robots;
        let readings = [
            compute_sensors(a, b, self.arena),
            compute_sensors(b, a, self.arena),
        ];

        let mut actions = [None; 2];
        let mut failed = [false; 2];
        for side in Side::ALL {
            let i = side.index();
            if self.robots[i].is_eliminated() {
                continue;
            }
            match self.controllers[i].decide(&readings[i]) {
                Ok(action) => actions[i] = Some(action),
                Err(err) => {
                    warn!(tick = self.tick, %side, %err, "invalid program, ending match");
                    failed[i] = true;
                }
            }
        }
        if let Some(offender) = Offender::from_flags(failed) {
            self.terminal = Some(TerminalCondition::InvalidProgram { offender });
            return self.terminal;
        }

        for side in Side::ALL {
            // re-checked here: B may have been eliminated by A's action this tick
            if self.robots[side.index()].is_eliminated() {
                continue;
            }
            if let Some(action) = actions[side.index()] {
                self.apply(side, action);
            }
        }
        self.enforce_invariants();

        self.tick += 1;
        for side in Side::ALL {
            if !self.robots[side.index()].is_eliminated() {
                self.reports[side.index()].survival_ticks += 1;
            }
        }
        self.terminal = self.check_terminal();
        self.terminal
    }

    /// Steps until a terminal condition is reached.
    pub fn run(&mut self) -> TerminalCondition {
        loop {
            if let Some(terminal) = self.step() {
                return terminal;
            }
        }
    }

    /// Runs the match to completion and returns its result.
    #[must_use]
    pub fn finish(mut self) -> MatchResult {
        let terminal = self.run();
        let mut robots = self.reports;
        for side in Side::ALL {
            let state = &self.robots[side.index()];
            robots[side.index()].final_health = state.health;
            robots[side.index()].final_ammo = state.ammo;
        }
        MatchResult {
            ticks: self.tick,
            terminal,
            robots,
        }
    }

    fn apply(&mut self, side: Side, action: Action) {
        self.reports[side.index()].record_action(action);
        let physics = self.physics;
        let robot = &mut self.robots[side.index()];
        if action != Action::Reload {
            robot.reload_remaining = None;
        }
        match action {
            Action::MoveForward => {
                let dir = Vec2::from_angle(robot.heading);
                robot.position = self
                    .arena
                    .clip_motion(robot.position, dir, physics.move_step);
            }
            Action::TurnLeft => robot.heading = wrap_heading(robot.heading - physics.turn_step),
            Action::TurnRight => robot.heading = wrap_heading(robot.heading + physics.turn_step),
            Action::Shoot => self.shoot(side),
            Action::Reload => reload(robot, physics.reload_ticks),
            Action::Noop => {}
        }
    }

    fn shoot(&mut self, side: Side) {
        let physics = self.physics;
        let (shooter, target) = split_pair(&mut self.robots, side);
        if shooter.ammo == 0 {
            return;
        }
        shooter.ammo -= 1;
        self.reports[side.index()].shots_fired += 1;

        if target.is_eliminated() {
            return;
        }
        let offset = target.position - shooter.position;
        let distance = offset.length();
        let bearing = if distance <= f32::EPSILON {
            0.0
        } else {
            normalize_angle(offset.angle() - shooter.heading)
        };
        let in_cone = distance <= physics.shot_range
            && bearing.abs() <= physics.shot_half_angle
            && self.arena.line_of_sight(shooter.position, target.position);
        if !in_cone {
            return;
        }
        let lands = physics.hit_probability >= 1.0
            || (physics.hit_probability > 0.0
                && self
                    .rng
                    .random_bool(f64::from(physics.hit_probability)));
        if !lands {
            return;
        }

        let dealt = target.take_damage(physics.shot_damage);
        let shooter_report = &mut self.reports[side.index()];
        shooter_report.shots_hit += 1;
        shooter_report.damage_dealt += dealt;
        self.reports[side.opponent().index()].damage_taken += dealt;
    }

    fn enforce_invariants(&mut self) {
        let fallback = self.arena.center();
        for side in Side::ALL {
            let robot = &mut self.robots[side.index()];
            let report = robot.clamp(fallback);
            if !report.is_clean() {
                warn!(tick = self.tick, %side, ?report, "robot state out of range, clamped");
            }
            if !self.arena.in_bounds(robot.position) {
                warn!(
                    tick = self.tick,
                    %side,
                    x = robot.position.x,
                    y = robot.position.y,
                    "robot outside arena, clamped"
                );
                robot.position = self.arena.clamp(robot.position);
            }
        }
    }

    fn check_terminal(&self) -> Option<TerminalCondition> {
        let [a, b] = &self.robots;
        match (a.is_eliminated(), b.is_eliminated()) {
            (true, true) => Some(TerminalCondition::BothEliminated),
            (false, true) => Some(TerminalCondition::Elimination { winner: Side::A }),
            (true, false) => Some(TerminalCondition::Elimination { winner: Side::B }),
            (false, false) => (self.tick >= self.max_ticks).then_some(TerminalCondition::Timeout),
        }
    }
}

/// Starts or continues a reload; ammo is refilled when the countdown completes.
fn reload(robot: &mut RobotState, reload_ticks: u32) {
    if robot.ammo >= robot.max_ammo {
        robot.reload_remaining = None;
        return;
    }
    let remaining = robot.reload_remaining.unwrap_or(reload_ticks);
    if remaining <= 1 {
        robot.ammo = robot.max_ammo;
        robot.reload_remaining = None;
    } else {
        robot.reload_remaining = Some(remaining - 1);
    }
}

fn split_pair(robots: &mut [RobotState; 2], side: Side) -> (&mut RobotState, &mut RobotState) {
    let [a, b] = robots;
    match side {
        Side::A => (a, b),
        Side::B => (b, a),
    }
}
