//! # AutoMgr module
//!
//! This module implements the [`AutoMgr`] state machine, which runs the autonomous routine of the
//! robot. States are held on a stack, the top of which is stepped once per cycle. When the stack
//! is empty the manager is off.
//!
//! The only routine state is [`FollowPath`](states::FollowPath), which starts a trajectory on its
//! first step and is done once the trajectory follower is no longer following it. A `FollowPath`
//! may be given a state to run after it, which replaces it on the stack when it is done.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod follow_path;
mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use comms_if::{eqpt::drive::DriveSensData, tc::auto::AutoCmd};
use log::{info, warn};

use crate::traj_follow::TrajFollower;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use self::params::AutoMgrParams;

pub mod states {
    pub use super::follow_path::{FollowPath, FollowPhase};
}

use states::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Autonomy Manager
pub struct AutoMgr {
    pub params: AutoMgrParams,

    /// Name of the path followed when the routine is next started.
    selected_path: String,

    stack: AutoMgrStack,
}

/// Modules the states act on during a step.
pub struct StepContext<'a> {
    pub traj_follower: &'a mut TrajFollower,

    /// Drivetrain sensor data for this cycle.
    pub sens_data: &'a DriveSensData,
}

/// State stacking abstraction.
#[derive(Debug, Default)]
pub struct AutoMgrStack(Vec<AutoMgrState>);

/// Output of a state's step function.
pub struct StepOutput {
    /// Action to perform on the stack itself
    pub action: StackAction,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AutoMgrError {
    #[error("Failed to load AutoMgrParams: {0}")]
    ParamLoadError(util::params::LoadError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AutoMgrState {
    FollowPath(FollowPath),
}

/// Actions that can be performed on the Stack at the end of a state's step function.
#[derive(Debug)]
pub enum StackAction {
    None,
    Abort,
    Pop,
    Replace(AutoMgrState),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AutoMgr {
    pub fn init(params_path: &str) -> Result<Self, AutoMgrError> {
        let params: AutoMgrParams =
            util::params::load(params_path).map_err(AutoMgrError::ParamLoadError)?;

        Ok(Self::new(params))
    }

    pub fn new(params: AutoMgrParams) -> Self {
        Self {
            selected_path: params.default_path.clone(),
            params,
            stack: AutoMgrStack::new(),
        }
    }

    /// Start the autonomous routine, following the selected path.
    ///
    /// Any routine already running is discarded.
    pub fn start(&mut self) {
        self.stack.clear();
        self.stack
            .push_above(AutoMgrState::FollowPath(FollowPath::new(&self.selected_path)));
        info!("AutoMgr started, following {:?}", self.selected_path);
    }

    /// Start the given state as the routine.
    pub fn start_with(&mut self, state: AutoMgrState) {
        self.stack.clear();
        info!("AutoMgr started in {}", state);
        self.stack.push_above(state);
    }

    /// Turn the manager off without stepping the current state.
    pub fn stop(&mut self) {
        if self.is_on() {
            info!("AutoMgr stopped");
        }
        self.stack.clear();
    }

    /// Step the current state.
    pub fn step(&mut self, cmd: Option<AutoCmd>, ctx: &mut StepContext) {
        let output = match self.stack.top() {
            Some(top) => top.step(ctx, cmd),
            // If there is no top the mgr is off, but path selection is still accepted
            None => {
                match cmd {
                    Some(AutoCmd::Select { path }) => self.select(path),
                    Some(AutoCmd::Abort) => {
                        warn!("Cannot abort the autonomous routine as the AutoMgr is Off")
                    }
                    None => (),
                }
                return;
            }
        };

        let is_action = output.action.is_some();

        match output.action {
            StackAction::None => (),
            StackAction::Abort => {
                warn!("Autonomous routine aborted");
                self.stack.clear();
            }
            StackAction::Pop => {
                self.stack.pop();
            }
            StackAction::Replace(s) => {
                self.stack.pop();
                self.stack.push_above(s)
            }
        }

        if is_action {
            match self.stack.top() {
                Some(top) => info!("AutoMgr state change to: {}", top),
                None => info!("Autonomous routine complete, AutoMgr off"),
            }
        }
    }

    /// Select the path followed when the routine is next started.
    pub fn select(&mut self, path: String) {
        info!("Autonomous path {:?} selected", path);
        self.selected_path = path;
    }

    pub fn selected_path(&self) -> &str {
        &self.selected_path
    }

    pub fn is_off(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn is_on(&self) -> bool {
        !self.stack.is_empty()
    }

    /// The state which will be stepped next, if any.
    pub fn current(&self) -> Option<&AutoMgrState> {
        self.stack.0.last()
    }
}

impl AutoMgrStack {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a mutable reference of the top state in the stack. Returns None if the stack is
    /// empty.
    pub fn top(&mut self) -> Option<&mut AutoMgrState> {
        self.0.last_mut()
    }

    pub fn push_above(&mut self, new: AutoMgrState) {
        self.0.push(new)
    }

    pub fn pop(&mut self) -> Option<AutoMgrState> {
        self.0.pop()
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }
}

impl Display for AutoMgrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AutoMgrState::FollowPath(s) => {
                write!(f, "AutoMgrState::FollowPath({:?})", s.path_name())
            }
        }
    }
}

impl AutoMgrState {
    fn step(&mut self, ctx: &mut StepContext, cmd: Option<AutoCmd>) -> StepOutput {
        match self {
            AutoMgrState::FollowPath(follow) => follow.step(ctx, cmd),
        }
    }
}

impl StepOutput {
    pub fn none() -> Self {
        Self {
            action: StackAction::None,
        }
    }

    pub fn action(action: StackAction) -> Self {
        Self { action }
    }
}

impl StackAction {
    pub fn is_some(&self) -> bool {
        !matches!(self, &StackAction::None)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
