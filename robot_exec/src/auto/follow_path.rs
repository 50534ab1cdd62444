//! # [`FollowPath`] AutoMgr state

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use comms_if::tc::auto::AutoCmd;
use log::{info, warn};

use super::{AutoMgrState, StackAction, StepContext, StepOutput};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Drives a single named trajectory to completion.
///
/// The trajectory is started on the first step, and the state is done once the follower no longer
/// reports that it is following it.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowPath {
    path_name: String,
    phase: FollowPhase,

    /// State which replaces this one once it is done.
    next: Option<Box<AutoMgrState>>,
}

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FollowPhase {
    /// The trajectory has not been started yet.
    Entry,

    /// The trajectory has been started and has not finished.
    Following,

    /// Terminal phase.
    Done,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl FollowPath {
    pub fn new(path_name: &str) -> Self {
        Self {
            path_name: path_name.to_string(),
            phase: FollowPhase::Entry,
            next: None,
        }
    }

    /// Run `next` once this state is done.
    pub fn then(mut self, next: AutoMgrState) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn path_name(&self) -> &str {
        &self.path_name
    }

    pub fn phase(&self) -> FollowPhase {
        self.phase
    }

    pub fn step(&mut self, ctx: &mut StepContext, cmd: Option<AutoCmd>) -> StepOutput {
        match cmd {
            Some(AutoCmd::Abort) => {
                ctx.traj_follower.stop();
                self.phase = FollowPhase::Done;
                return StepOutput::action(StackAction::Abort);
            }
            Some(c) => warn!("Only Abort is accepted in FollowPath state, {:?} ignored", c),
            None => (),
        }

        if self.phase == FollowPhase::Entry {
            ctx.traj_follower.follow_trajectory(&self.path_name, ctx.sens_data);
            self.phase = FollowPhase::Following;
        }

        if self.phase == FollowPhase::Following
            && !ctx.traj_follower.is_following(&self.path_name)
        {
            info!("Path {:?} no longer being followed, FollowPath done", self.path_name);
            self.phase = FollowPhase::Done;
        }

        match self.phase {
            FollowPhase::Done => match self.next.take() {
                Some(next) => StepOutput::action(StackAction::Replace(*next)),
                None => StepOutput::action(StackAction::Pop),
            },
            _ => StepOutput::none(),
        }
    }
}
